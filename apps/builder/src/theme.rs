//! Theme flag — a single boolean persisted as `{"darkMode": bool}`.
//!
//! Read once at startup, written on every change. A missing file or a missing
//! key means the default (dark) theme.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::PersistError;
use crate::persist::write_atomic;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Dark)
    }

    pub fn from_dark(dark: bool) -> Self {
        if dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn toggled(&self) -> Self {
        Theme::from_dark(!self.is_dark())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeFile {
    #[serde(default)]
    dark_mode: Option<bool>,
}

pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Never fails: an unreadable or malformed file falls back to the default.
    pub fn load(&self) -> Theme {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Theme::default(),
            Err(e) => {
                warn!("Could not read theme file {}: {e}", self.path.display());
                return Theme::default();
            }
        };

        match serde_json::from_slice::<ThemeFile>(&raw) {
            Ok(file) => file.dark_mode.map(Theme::from_dark).unwrap_or_default(),
            Err(e) => {
                warn!("Ignoring malformed theme file {}: {e}", self.path.display());
                Theme::default()
            }
        }
    }

    pub fn save(&self, theme: Theme) -> Result<(), PersistError> {
        let body = serde_json::to_vec(&ThemeFile {
            dark_mode: Some(theme.is_dark()),
        })?;
        write_atomic(&self.path, &body)?;
        debug!("Theme saved: {theme:?}");
        Ok(())
    }
}
