use anyhow::{Context, Result};
use calsync_core::RuleConfig;
use calsync_core::context::DEFAULT_MAX_CALENDARS;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file name looked up in the working directory.
const LOCAL_CONFIG: &str = "calsync.yaml";

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub google: GoogleConfig,

    /// Rules, run in order
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Deserialize)]
pub struct GoogleConfig {
    /// Authorized-user token file
    #[serde(default = "default_token_file")]
    pub token_file: String,

    #[serde(default = "default_max_calendars")]
    pub max_calendars: u32,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        GoogleConfig {
            token_file: default_token_file(),
            max_calendars: default_max_calendars(),
        }
    }
}

fn default_token_file() -> String {
    "~/.config/calsync/token.json".to_string()
}

fn default_max_calendars() -> u32 {
    DEFAULT_MAX_CALENDARS
}

impl GoogleConfig {
    /// Token file path with `~` and environment variables expanded.
    pub fn token_path(&self) -> Result<PathBuf> {
        expand_path(&self.token_file)
    }
}

pub fn expand_path(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path)
        .with_context(|| format!("Failed to expand path {}", path))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Get the user-level config directory path (~/.config/calsync)
pub fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not determine config directory")?
        .join("calsync"))
}

/// Pick the config file: the explicit path, then ./calsync.yaml, then
/// ~/.config/calsync/config.yaml.
pub fn find_config(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let local = PathBuf::from(LOCAL_CONFIG);
    if local.exists() {
        return Ok(local);
    }

    let user = config_dir()?.join("config.yaml");
    if user.exists() {
        return Ok(user);
    }

    anyhow::bail!(
        "No config file found.\n\n\
        Looked for ./{} and {}.\n\
        Pass --config <path> or create one of them with a `rules:` list.",
        LOCAL_CONFIG,
        user.display()
    )
}

/// Load the config file at `path`. `.toml` files are read as TOML, anything
/// else as YAML.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!("Config file not found at {}", path.display());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    parse_config(&contents, path)
        .with_context(|| format!("Failed to parse config from {}", path.display()))
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let is_toml = path.extension().is_some_and(|ext| ext == "toml");

    let config: Config = if is_toml {
        toml::from_str(contents)?
    } else {
        serde_yaml::from_str(contents)?
    };

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calsync_core::rule::CalendarRefs;
    use std::io::Write;

    fn write_config(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_yaml() {
        let file = write_config(
            ".yaml",
            r#"
google:
  token_file: /tmp/token.json
rules:
  - method: copy
    src: Work
    dst: Personal
    look_back: 1 week
    filter:
      not:
        summary: "Your order from Amazon*"
    transform:
      - description_append: "Copied from $calendar_name"
  - method: remove_deleted
    src: [Work, Travel]
    dst: Personal
"#,
        );

        let config = load_config(file.path()).unwrap();

        assert_eq!(config.google.token_file, "/tmp/token.json");
        assert_eq!(config.google.max_calendars, 50);
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[0].method, "copy");
        assert_eq!(config.rules[0].src, Some(CalendarRefs::One("Work".into())));
        assert_eq!(config.rules[0].look_back.as_deref(), Some("1 week"));
        assert_eq!(
            config.rules[1].src,
            Some(CalendarRefs::Many(vec!["Work".into(), "Travel".into()]))
        );

        let rules = calsync_core::rule::build_rules(&config.rules).unwrap();
        assert_eq!(rules[0].transforms.len(), 1);
        assert!(rules[0].filter.is_some());
    }

    #[test]
    fn test_load_toml() {
        let file = write_config(
            ".toml",
            r#"
[[rules]]
method = "copy"
src = "Work"
dst = "Personal"
private_copy = false

[rules.filter]
all_day_event = false
"#,
        );

        let config = load_config(file.path()).unwrap();

        assert_eq!(config.google.token_file, "~/.config/calsync/token.json");
        assert_eq!(config.rules[0].private_copy, Some(false));

        let rules = calsync_core::rule::build_rules(&config.rules).unwrap();
        assert_eq!(rules[0].filter, Some(calsync_core::Filter::AllDayEvent(false)));
    }

    #[test]
    fn test_empty_yaml_has_no_rules() {
        let file = write_config(".yaml", "google:\n  max_calendars: 10\n");
        let config = load_config(file.path()).unwrap();
        assert!(config.rules.is_empty());
        assert_eq!(config.google.max_calendars, 10);
    }

    #[test]
    fn test_malformed_config_names_the_file() {
        let file = write_config(".yaml", "rules: [method: copy\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(format!("{}", err).contains("Failed to parse config"));
    }

    #[test]
    fn test_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_explicit_config_wins() {
        let path = Path::new("/somewhere/else.yaml");
        assert_eq!(find_config(Some(path)).unwrap(), path);
    }

    #[test]
    fn test_expand_path() {
        assert_eq!(expand_path("/tmp/token.json").unwrap(), PathBuf::from("/tmp/token.json"));
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand_path("~/token.json").unwrap(), home.join("token.json"));
    }
}
