//! Photo library — holds encoded photo bytes outside the document.
//!
//! The document only carries a `PhotoRef`; the bytes are kept here keyed by
//! its id. Data URIs exist only at the edges: ingesting a persisted state and
//! writing one back.

use std::collections::HashMap;
use std::path::Path;

use base64::Engine;
use bytes::Bytes;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::PhotoError;
use crate::models::PhotoRef;

#[derive(Debug, Clone)]
struct StoredPhoto {
    mime_type: String,
    data: Bytes,
}

#[derive(Debug, Default)]
pub struct PhotoLibrary {
    photos: HashMap<Uuid, StoredPhoto>,
}

impl PhotoLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// Reads an image file. The MIME type is guessed from the extension and
    /// must be `image/*`.
    pub fn ingest_file(&mut self, path: &Path) -> Result<PhotoRef, PhotoError> {
        let mime = mime_guess::from_path(path)
            .first()
            .ok_or_else(|| PhotoError::UnsupportedType(path.display().to_string()))?;
        if mime.type_() != mime_guess::mime::IMAGE {
            return Err(PhotoError::UnsupportedType(mime.essence_str().to_string()));
        }

        let data = std::fs::read(path).map_err(|source| PhotoError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Read photo {} ({} bytes)", path.display(), data.len());
        self.ingest_bytes(mime.essence_str(), Bytes::from(data))
    }

    /// Accepts `data:<mime>;base64,<payload>`.
    pub fn ingest_data_uri(&mut self, uri: &str) -> Result<PhotoRef, PhotoError> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| PhotoError::MalformedDataUri("missing 'data:' prefix".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| PhotoError::MalformedDataUri("missing ','".to_string()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| PhotoError::MalformedDataUri("only base64 payloads are supported".to_string()))?;

        let data = base64::engine::general_purpose::STANDARD.decode(payload.trim())?;
        self.ingest_bytes(mime, Bytes::from(data))
    }

    pub fn ingest_bytes(&mut self, mime_type: &str, data: Bytes) -> Result<PhotoRef, PhotoError> {
        let mime_type = mime_type.trim().to_ascii_lowercase();
        if !mime_type.starts_with("image/") {
            return Err(PhotoError::UnsupportedType(mime_type));
        }

        let id = Uuid::new_v4();
        debug!("Stored photo {id} ({mime_type}, {} bytes)", data.len());
        self.photos.insert(
            id,
            StoredPhoto {
                mime_type: mime_type.clone(),
                data,
            },
        );
        Ok(PhotoRef { id, mime_type })
    }

    pub fn get(&self, photo: &PhotoRef) -> Option<Bytes> {
        self.photos.get(&photo.id).map(|p| p.data.clone())
    }

    /// Encodes the referenced photo back into a data URI.
    pub fn to_data_uri(&self, photo: &PhotoRef) -> Option<String> {
        self.photos.get(&photo.id).map(|stored| {
            format!(
                "data:{};base64,{}",
                stored.mime_type,
                base64::engine::general_purpose::STANDARD.encode(&stored.data)
            )
        })
    }

    /// Drops every photo except the one the document currently references.
    pub fn retain_referenced(&mut self, current: Option<&PhotoRef>) -> usize {
        let before = self.photos.len();
        self.photos
            .retain(|id, _| current.map(|p| p.id == *id).unwrap_or(false));
        before - self.photos.len()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const PNG_URI: &str = "data:image/png;base64,iVBORw0KGgo=";

    #[test]
    fn test_data_uri_round_trips_through_library() {
        let mut library = PhotoLibrary::new();
        let photo = library.ingest_data_uri(PNG_URI).unwrap();
        assert_eq!(photo.mime_type, "image/png");
        assert_eq!(library.to_data_uri(&photo).unwrap(), PNG_URI);
        assert_eq!(&library.get(&photo).unwrap()[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_malformed_uris_are_rejected() {
        let mut library = PhotoLibrary::new();
        assert!(matches!(
            library.ingest_data_uri("image/png;base64,AA=="),
            Err(PhotoError::MalformedDataUri(_))
        ));
        assert!(matches!(
            library.ingest_data_uri("data:image/png,AA=="),
            Err(PhotoError::MalformedDataUri(_))
        ));
        assert!(matches!(
            library.ingest_data_uri("data:image/png;base64,***"),
            Err(PhotoError::Decode(_))
        ));
        assert!(matches!(
            library.ingest_data_uri("data:text/plain;base64,AA=="),
            Err(PhotoError::UnsupportedType(_))
        ));
        assert!(library.is_empty());
    }

    #[test]
    fn test_file_ingest_guesses_mime_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("me.jpg");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF]).unwrap();

        let mut library = PhotoLibrary::new();
        let photo = library.ingest_file(&path).unwrap();
        assert_eq!(photo.mime_type, "image/jpeg");
        assert_eq!(library.get(&photo).unwrap().len(), 3);
    }

    #[test]
    fn test_non_image_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();
        let mut library = PhotoLibrary::new();
        assert!(matches!(
            library.ingest_file(&path),
            Err(PhotoError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let mut library = PhotoLibrary::new();
        let err = library
            .ingest_file(Path::new("/definitely/not/here.png"))
            .unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.png"));
    }

    #[test]
    fn test_retain_referenced_drops_replaced_photos() {
        let mut library = PhotoLibrary::new();
        let old = library.ingest_data_uri(PNG_URI).unwrap();
        let new = library.ingest_data_uri(PNG_URI).unwrap();
        assert_eq!(library.retain_referenced(Some(&new)), 1);
        assert!(library.get(&old).is_none());
        assert!(library.get(&new).is_some());
        assert_eq!(library.retain_referenced(None), 1);
        assert!(library.is_empty());
    }
}
