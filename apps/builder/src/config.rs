use std::path::PathBuf;

use anyhow::Result;

/// Application configuration loaded from environment variables.
/// Every variable has a default; a present but empty value is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub state_path: PathBuf,
    pub theme_path: PathBuf,
    pub export_dir: PathBuf,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from("resume.json"),
            theme_path: PathBuf::from("theme.json"),
            export_dir: PathBuf::from("exports"),
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();
        Ok(Config {
            state_path: path_or("BUILDER_STATE_PATH", &lookup, defaults.state_path)?,
            theme_path: path_or("BUILDER_THEME_PATH", &lookup, defaults.theme_path)?,
            export_dir: path_or("BUILDER_EXPORT_DIR", &lookup, defaults.export_dir)?,
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
        })
    }
}

fn path_or(
    key: &str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: PathBuf,
) -> Result<PathBuf> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => non_empty(key, value).map(PathBuf::from),
    }
}

fn non_empty(key: &str, value: String) -> Result<String> {
    let trimmed = value.trim();
    anyhow::ensure!(!trimmed.is_empty(), "Environment variable '{key}' is set but empty");
    Ok(trimmed.to_string())
}
