use std::path::PathBuf;

use serde_json::{json, Value};
use thiserror::Error;

use crate::models::Section;

/// A form submit that is missing required fields. The form buffer is kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{section} entry is missing required fields: {}", fields.join(", "))]
    MissingFields {
        section: Section,
        fields: Vec<&'static str>,
    },
}

#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("Could not read photo {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported photo type '{0}' (expected an image)")]
    UnsupportedType(String),

    #[error("Malformed data URI: {0}")]
    MalformedDataUri(String),

    #[error("Photo payload is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("An export is already in progress")]
    InProgress,

    #[error("Nothing to export: the resume is empty")]
    NothingToExport,

    #[error("Export IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not persist export file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Export task aborted: {0}")]
    Aborted(String),
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Could not access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid state file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not encode state: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Could not replace {path}: {source}")]
    Replace {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },

    #[error("Photo in state file rejected: {0}")]
    Photo(#[from] PhotoError),
}

/// Everything a session can report back for one intent.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Photo(#[from] PhotoError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error("Invalid intent: {0}")]
    InvalidIntent(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Form(_) => "VALIDATION_ERROR",
            AppError::Photo(_) => "PHOTO_ERROR",
            AppError::Export(ExportError::InProgress) => "EXPORT_IN_PROGRESS",
            AppError::Export(ExportError::NothingToExport) => "NOTHING_TO_EXPORT",
            AppError::Export(_) => "EXPORT_ERROR",
            AppError::Persist(_) => "PERSIST_ERROR",
            AppError::InvalidIntent(_) => "INVALID_INTENT",
        }
    }

    /// The user-visible failure notice. Export IO failures are logged in full
    /// and shown with a generic message.
    pub fn notice(&self) -> Value {
        let message = match self {
            AppError::Export(
                e @ (ExportError::Io(_) | ExportError::Persist(_) | ExportError::Aborted(_)),
            ) => {
                tracing::error!("Export error: {e}");
                "The PDF could not be generated. Please try again.".to_string()
            }
            other => other.to_string(),
        };

        json!({
            "error": {
                "code": self.code(),
                "message": message
            }
        })
    }
}
