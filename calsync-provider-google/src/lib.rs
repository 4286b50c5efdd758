//! Google Calendar provider for calsync.

mod api;
mod session;
mod types;

pub use api::GoogleCalendar;
pub use session::{Session, TokenFile};
