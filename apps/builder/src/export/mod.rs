// Export: turns a finalized snapshot of the resume into a paginated file.
// The collaborator never sees the live store, only its own captured copy.
// Layout and file writing are CPU/IO-bound and run on the blocking pool.

pub mod controller;
pub mod pdf;

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::errors::ExportError;
use crate::forms::Forms;
use crate::layout::StyledLine;
use crate::preview::{render, Presentation, ResumeView};
use crate::store::Snapshot;

pub use controller::{ExportController, ExportHandle};
pub use pdf::PdfExporter;

// ────────────────────────────────────────────────────────────────────────────
// Snapshot handed to the collaborator
// ────────────────────────────────────────────────────────────────────────────

/// A fully rendered, owned copy of the resume at one revision.
#[derive(Debug, Clone)]
pub struct RenderedSnapshot {
    revision: u64,
    view: ResumeView,
    captured_at: DateTime<Local>,
}

impl RenderedSnapshot {
    /// Blurs any focused form, then renders `snapshot`. An empty resume
    /// cannot be exported.
    pub fn capture(snapshot: &Snapshot, forms: &mut Forms) -> Result<Self, ExportError> {
        forms.blur();
        match render(snapshot.state()) {
            Presentation::Empty => Err(ExportError::NothingToExport),
            Presentation::Populated(view) => Ok(Self {
                revision: snapshot.revision(),
                view,
                captured_at: Local::now(),
            }),
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn view(&self) -> &ResumeView {
        &self.view
    }

    pub fn captured_at(&self) -> DateTime<Local> {
        self.captured_at
    }

    pub fn lines(&self) -> Vec<StyledLine> {
        self.view.to_lines()
    }
}

/// Confirmation of a saved export.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReceipt {
    pub path: PathBuf,
    pub pages: usize,
    pub bytes: u64,
    pub revision: u64,
}

/// Produces a paginated document from a rendered snapshot.
///
/// Held by the controller as `Arc<dyn ExportCollaborator>`.
#[async_trait]
pub trait ExportCollaborator: Send + Sync {
    fn name(&self) -> &str;

    async fn export(&self, snapshot: RenderedSnapshot) -> Result<ExportReceipt, ExportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::patch::ExperiencePatch;
    use crate::models::{EntryPatch, PersonalInfoPatch};
    use crate::store::DocumentStore;

    #[test]
    fn test_empty_document_is_not_exportable() {
        let store = DocumentStore::new();
        let mut forms = Forms::new();
        let err = RenderedSnapshot::capture(&store.snapshot(), &mut forms).unwrap_err();
        assert!(matches!(err, ExportError::NothingToExport));
    }

    #[test]
    fn test_capture_blurs_forms_and_keeps_its_own_copy() {
        let mut store = DocumentStore::new();
        let mut forms = Forms::new();
        store.update_personal_info(PersonalInfoPatch {
            first_name: Some("Ada".to_string()),
            ..PersonalInfoPatch::default()
        });
        forms.edit(EntryPatch::Experience(ExperiencePatch {
            company: Some("Acme".to_string()),
            ..ExperiencePatch::default()
        }));

        let captured = RenderedSnapshot::capture(&store.snapshot(), &mut forms).unwrap();
        assert_eq!(forms.focused(), None);

        store.update_personal_info(PersonalInfoPatch {
            first_name: Some("Grace".to_string()),
            ..PersonalInfoPatch::default()
        });

        assert_eq!(captured.view().header.full_name, "Ada");
        assert_eq!(captured.revision(), 1);
        assert_eq!(captured.lines()[0].text, "Ada");
    }
}
