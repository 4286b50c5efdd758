//! Wire types of the Calendar v3 API that are not core types.

use serde::Deserialize;

/// One page of a `list` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,

    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiError,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
}
