//! State file import/export.
//!
//! The file layout is the flat persisted structure (`resumeData`,
//! `selectedTemplate`, `templateCategory`, `customization`, `isDarkMode`). On
//! disk the photo is an inline data URI; in memory it is a `PhotoRef` into the
//! photo library, so both directions convert at this boundary.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{info, warn};

use crate::errors::PersistError;
use crate::models::{BuilderState, PersistedState};
use crate::photo::PhotoLibrary;

/// Writes `body` through a temp file in the target directory, then renames it
/// into place.
pub fn write_atomic(path: &Path, body: &[u8]) -> Result<(), PersistError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let io_err = |source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(&dir).map_err(io_err)?;
    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(io_err)?;
    tmp.write_all(body).map_err(io_err)?;
    tmp.persist(path).map_err(|source| PersistError::Replace {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Serializes every persisted key, inlining the photo as a data URI.
pub fn encode_state(
    state: &BuilderState,
    is_dark_mode: bool,
    photos: &PhotoLibrary,
) -> Result<Vec<u8>, PersistError> {
    let mut value = serde_json::to_value(PersistedState::from_state(state, is_dark_mode))?;

    if let Some(slot) = photo_slot(&mut value) {
        let inline = state
            .resume_data
            .personal_info
            .photo
            .as_ref()
            .and_then(|photo| photos.to_data_uri(photo));
        *slot = inline.map(Value::String).unwrap_or(Value::Null);
    }

    Ok(serde_json::to_vec_pretty(&value)?)
}

/// Parses a persisted state. An inline photo is moved into `photos` and
/// replaced by its reference; a photo that is not a data URI is dropped.
pub fn decode_state(raw: &[u8], photos: &mut PhotoLibrary) -> Result<PersistedState, PersistError> {
    let mut value: Value = serde_json::from_slice(raw)?;

    if let Some(slot) = photo_slot(&mut value) {
        *slot = match slot.take() {
            Value::String(uri) if uri.trim().is_empty() => Value::Null,
            Value::String(uri) => {
                let photo = photos.ingest_data_uri(&uri)?;
                serde_json::to_value(photo)?
            }
            Value::Null => Value::Null,
            other => {
                warn!("Dropping photo of unexpected shape: {other}");
                Value::Null
            }
        };
    }

    Ok(serde_json::from_value(value)?)
}

fn photo_slot(value: &mut Value) -> Option<&mut Value> {
    value
        .get_mut("resumeData")?
        .get_mut("personalInfo")?
        .as_object_mut()
        .map(|info| info.entry("photo").or_insert(Value::Null))
}

/// The state file on disk.
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when the file does not exist.
    pub fn load(&self, photos: &mut PhotoLibrary) -> Result<Option<PersistedState>, PersistError> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(PersistError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let state = decode_state(&raw, photos).map_err(|e| match e {
            PersistError::Encode(source) => PersistError::Parse {
                path: self.path.clone(),
                source,
            },
            other => other,
        })?;
        info!("Loaded state from {}", self.path.display());
        Ok(Some(state))
    }

    pub fn save(
        &self,
        state: &BuilderState,
        is_dark_mode: bool,
        photos: &PhotoLibrary,
    ) -> Result<(), PersistError> {
        let body = encode_state(state, is_dark_mode, photos)?;
        write_atomic(&self.path, &body)?;
        info!("Saved state to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Experience, PhotoRef, Template};

    const PNG_URI: &str = "data:image/png;base64,iVBORw0KGgo=";

    fn populated(photos: &mut PhotoLibrary) -> BuilderState {
        let mut state = BuilderState::default();
        state.resume_data.personal_info.first_name = "Ada".to_string();
        state.resume_data.personal_info.photo = Some(photos.ingest_data_uri(PNG_URI).unwrap());
        state.resume_data.experience.push(Experience {
            company: "Acme".to_string(),
            ..Experience::default()
        });
        state.selected_template = Template::Minimal;
        state
    }

    #[test]
    fn test_photo_is_inlined_on_save() {
        let mut photos = PhotoLibrary::new();
        let state = populated(&mut photos);
        let body = encode_state(&state, false, &photos).unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["resumeData"]["personalInfo"]["photo"], PNG_URI);
        assert_eq!(value["isDarkMode"], false);
        assert_eq!(value["selectedTemplate"], "minimal");
    }

    #[test]
    fn test_photo_is_ingested_on_load() {
        let mut saved = PhotoLibrary::new();
        let body = encode_state(&populated(&mut saved), true, &saved).unwrap();

        let mut fresh = PhotoLibrary::new();
        let state = decode_state(&body, &mut fresh).unwrap();
        let photo: &PhotoRef = state
            .resume_data
            .as_ref()
            .and_then(|d| d.personal_info.photo.as_ref())
            .unwrap();
        assert_eq!(photo.mime_type, "image/png");
        assert_eq!(fresh.to_data_uri(photo).unwrap(), PNG_URI);
        assert_eq!(state.is_dark_mode, Some(true));
    }

    #[test]
    fn test_empty_photo_string_reads_as_none() {
        let raw = br#"{"resumeData":{"personalInfo":{"firstName":"Ada","photo":""}}}"#;
        let mut photos = PhotoLibrary::new();
        let state = decode_state(raw, &mut photos).unwrap();
        let doc = state.resume_data.unwrap();
        assert_eq!(doc.personal_info.first_name, "Ada");
        assert!(doc.personal_info.photo.is_none());
        assert!(doc.experience.is_empty());
        assert!(photos.is_empty());
    }

    #[test]
    fn test_partial_file_leaves_other_keys_absent() {
        let raw = br#"{"templateCategory":"with-photo"}"#;
        let state = decode_state(raw, &mut PhotoLibrary::new()).unwrap();
        assert!(state.resume_data.is_none());
        assert!(state.customization.is_none());
        assert!(state.template_category.is_some());
    }

    #[test]
    fn test_bad_photo_uri_fails_the_load() {
        let raw = br#"{"resumeData":{"personalInfo":{"photo":"http://example.com/me.png"}}}"#;
        let err = decode_state(raw, &mut PhotoLibrary::new()).unwrap_err();
        assert!(matches!(err, PersistError::Photo(_)));
    }

    #[test]
    fn test_state_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path().join("nested").join("resume.json"));
        let mut photos = PhotoLibrary::new();
        assert!(file.load(&mut photos).unwrap().is_none());

        let state = populated(&mut photos);
        file.save(&state, false, &photos).unwrap();

        let mut fresh = PhotoLibrary::new();
        let loaded = file.load(&mut fresh).unwrap().unwrap();
        let doc = loaded.resume_data.unwrap();
        assert_eq!(doc.experience[0].company, "Acme");
        assert_eq!(loaded.selected_template, Some(Template::Minimal));
        assert_eq!(fresh.len(), 1);
    }

    #[test]
    fn test_garbage_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.json");
        std::fs::write(&path, "{").unwrap();
        let err = StateFile::new(&path).load(&mut PhotoLibrary::new()).unwrap_err();
        assert!(matches!(err, PersistError::Parse { .. }));
    }
}
