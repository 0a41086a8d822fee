//! Session — the single thread of control that applies user intents.
//!
//! Owns the document store, form buffers, photo library, theme, bound views
//! and the export controller. Intents are applied one at a time; each yields
//! an `IntentOutcome`, and user-facing failures are reported as outcomes
//! rather than ending the session.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::AppError;
use crate::export::{
    ExportCollaborator, ExportController, ExportHandle, ExportReceipt, PdfExporter,
    RenderedSnapshot,
};
use crate::forms::Forms;
use crate::models::{
    CustomizationPatch, EntryId, EntryPatch, NewEntry, PersistedState, PersonalInfoPatch, Section,
    SectionKey, Skill, Template, TemplateCategory,
};
use crate::persist::StateFile;
use crate::photo::PhotoLibrary;
use crate::store::{DocumentStore, EditOutcome, PreviewPanel, SectionOutline};
use crate::theme::{Theme, ThemeStore};

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

/// One user action. JSON form: `{"type": "addEntry", ...}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Intent {
    UpdatePersonalInfo { fields: PersonalInfoPatch },
    AddEntry { entry: NewEntry },
    UpdateEntry { id: EntryId, patch: EntryPatch },
    DeleteEntry { section: Section, id: EntryId },
    ReplaceSkills { skills: Vec<Skill> },
    SetTemplate { template: Template },
    SetTemplateCategory { category: TemplateCategory },
    UpdateCustomization { fields: CustomizationPatch },
    ReorderSections { order: Vec<SectionKey> },
    Reset,
    /// Reads a state file (the configured one when `path` is absent).
    Load { path: Option<PathBuf> },
    Save { path: Option<PathBuf> },
    SetTheme { theme: Theme },
    ToggleTheme,
    EditForm { patch: EntryPatch },
    SubmitForm { section: Section },
    DiscardForm { section: Section },
    Blur,
    AttachPhoto { path: PathBuf },
    RemovePhoto,
    Export,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum IntentOutcome {
    Updated { revision: u64 },
    Unchanged { revision: u64 },
    EntryAdded { section: Section, id: EntryId, revision: u64 },
    /// The id did not match any entry of that section; nothing changed.
    NotFound { section: Section, id: EntryId },
    FormEdited { section: Section },
    Blurred,
    ThemeChanged { theme: Theme },
    Loaded { path: PathBuf, revision: u64 },
    Saved { path: PathBuf },
    ExportStarted { revision: u64 },
    ExportFinished { receipt: ExportReceipt },
    Failed { notice: Value },
}

impl IntentOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, IntentOutcome::Failed { .. })
    }
}

impl From<AppError> for IntentOutcome {
    fn from(err: AppError) -> Self {
        IntentOutcome::Failed {
            notice: err.notice(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Session
// ────────────────────────────────────────────────────────────────────────────

pub struct Session {
    store: DocumentStore,
    forms: Forms,
    photos: PhotoLibrary,
    theme: Theme,
    theme_store: ThemeStore,
    state_file: StateFile,
    preview: Arc<PreviewPanel>,
    outline: Arc<SectionOutline>,
    export: ExportController,
    pending_export: Option<ExportHandle>,
}

impl Session {
    /// A session exporting PDFs into the configured directory.
    pub fn new(config: &Config) -> Self {
        Self::with_exporter(config, Arc::new(PdfExporter::new(config.export_dir.clone())))
    }

    pub fn with_exporter(config: &Config, exporter: Arc<dyn ExportCollaborator>) -> Self {
        let theme_store = ThemeStore::new(config.theme_path.clone());
        let theme = theme_store.load();
        info!("Theme: {theme:?}");

        let mut store = DocumentStore::new();
        let preview = Arc::new(PreviewPanel::new());
        let outline = Arc::new(SectionOutline::new());
        store.subscribe(preview.clone());
        store.subscribe(outline.clone());

        Self {
            store,
            forms: Forms::new(),
            photos: PhotoLibrary::new(),
            theme,
            theme_store,
            state_file: StateFile::new(config.state_path.clone()),
            preview,
            outline,
            export: ExportController::new(exporter),
            pending_export: None,
        }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn forms(&self) -> &Forms {
        &self.forms
    }

    pub fn photos(&self) -> &PhotoLibrary {
        &self.photos
    }

    pub fn preview(&self) -> &PreviewPanel {
        &self.preview
    }

    pub fn outline(&self) -> &SectionOutline {
        &self.outline
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn is_exporting(&self) -> bool {
        self.export.is_generating()
    }

    /// Applies one intent. Export intents start work on the current Tokio
    /// runtime and return immediately.
    pub fn apply(&mut self, intent: Intent) -> IntentOutcome {
        debug!("Applying {intent:?}");
        let outcome = self.try_apply(intent).unwrap_or_else(IntentOutcome::from);

        let current = self.store.snapshot().document().personal_info.photo.clone();
        let dropped = self.photos.retain_referenced(current.as_ref());
        if dropped > 0 {
            debug!("Released {dropped} unreferenced photo(s)");
        }
        outcome
    }

    fn try_apply(&mut self, intent: Intent) -> Result<IntentOutcome, AppError> {
        let before = self.store.revision();
        let outcome = match intent {
            Intent::UpdatePersonalInfo { fields } => {
                self.store.update_personal_info(fields);
                self.revision_outcome(before)
            }
            Intent::AddEntry { entry } => {
                let section = entry.section();
                let id = self.store.add(entry);
                IntentOutcome::EntryAdded {
                    section,
                    id,
                    revision: self.store.revision(),
                }
            }
            Intent::UpdateEntry { id, patch } => {
                let section = patch.section();
                let outcome = self.store.update(id, patch);
                self.edit_outcome(outcome, section, id, before)
            }
            Intent::DeleteEntry { section, id } => {
                let outcome = self.store.delete_entry(section, id);
                self.edit_outcome(outcome, section, id, before)
            }
            Intent::ReplaceSkills { skills } => {
                self.store.replace_skills(skills);
                self.revision_outcome(before)
            }
            Intent::SetTemplate { template } => {
                self.store.set_template(template);
                self.revision_outcome(before)
            }
            Intent::SetTemplateCategory { category } => {
                self.store.set_template_category(category);
                self.revision_outcome(before)
            }
            Intent::UpdateCustomization { fields } => {
                self.store.update_customization(fields);
                self.revision_outcome(before)
            }
            Intent::ReorderSections { order } => {
                self.store.reorder_sections(order);
                self.revision_outcome(before)
            }
            Intent::Reset => {
                self.store.reset_document();
                self.revision_outcome(before)
            }
            Intent::Load { path } => self.load(path)?,
            Intent::Save { path } => self.save(path)?,
            Intent::SetTheme { theme } => self.set_theme(theme)?,
            Intent::ToggleTheme => self.set_theme(self.theme.toggled())?,
            Intent::EditForm { patch } => {
                let section = patch.section();
                self.forms.edit(patch);
                IntentOutcome::FormEdited { section }
            }
            Intent::SubmitForm { section } => {
                let id = self.forms.submit(section, &mut self.store)?;
                IntentOutcome::EntryAdded {
                    section,
                    id,
                    revision: self.store.revision(),
                }
            }
            Intent::DiscardForm { section } => {
                self.forms.discard(section);
                IntentOutcome::FormEdited { section }
            }
            Intent::Blur => {
                self.forms.blur();
                IntentOutcome::Blurred
            }
            Intent::AttachPhoto { path } => {
                let photo = self.photos.ingest_file(&path)?;
                self.store.update_personal_info(PersonalInfoPatch {
                    photo: Some(Some(photo)),
                    ..PersonalInfoPatch::default()
                });
                self.revision_outcome(before)
            }
            Intent::RemovePhoto => {
                self.store.update_personal_info(PersonalInfoPatch {
                    photo: Some(None),
                    ..PersonalInfoPatch::default()
                });
                self.revision_outcome(before)
            }
            Intent::Export => {
                let snapshot = RenderedSnapshot::capture(&self.store.snapshot(), &mut self.forms)?;
                let handle = self.export.start(snapshot)?;
                let revision = handle.revision();
                if let Some(previous) = self.pending_export.replace(handle) {
                    debug!("Dropping finished export handle for revision {}", previous.revision());
                }
                IntentOutcome::ExportStarted { revision }
            }
        };
        Ok(outcome)
    }

    fn revision_outcome(&self, before: u64) -> IntentOutcome {
        let revision = self.store.revision();
        if revision == before {
            IntentOutcome::Unchanged { revision }
        } else {
            IntentOutcome::Updated { revision }
        }
    }

    fn edit_outcome(
        &self,
        outcome: EditOutcome,
        section: Section,
        id: EntryId,
        before: u64,
    ) -> IntentOutcome {
        match outcome {
            EditOutcome::Applied => self.revision_outcome(before),
            EditOutcome::NotFound => IntentOutcome::NotFound { section, id },
        }
    }

    // ── Persistence ────────────────────────────────────────────────────────

    /// Loads the configured state file at startup. A missing file is not an
    /// error.
    pub fn restore(&mut self) -> Result<bool, AppError> {
        match self.state_file.load(&mut self.photos)? {
            Some(state) => {
                self.apply_loaded(state)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn load(&mut self, path: Option<PathBuf>) -> Result<IntentOutcome, AppError> {
        let file = path.map(StateFile::new);
        let file = file.as_ref().unwrap_or(&self.state_file);
        let path = file.path().to_path_buf();
        match file.load(&mut self.photos)? {
            Some(state) => {
                self.apply_loaded(state)?;
                Ok(IntentOutcome::Loaded {
                    path,
                    revision: self.store.revision(),
                })
            }
            None => {
                warn!("No state file at {}", path.display());
                Err(AppError::InvalidIntent(format!(
                    "no state file at {}",
                    path.display()
                )))
            }
        }
    }

    fn apply_loaded(&mut self, mut state: PersistedState) -> Result<(), AppError> {
        let dark = state.is_dark_mode.take();
        self.store.load_document(state);
        if let Some(dark) = dark {
            self.set_theme(Theme::from_dark(dark))?;
        }
        Ok(())
    }

    fn save(&self, path: Option<PathBuf>) -> Result<IntentOutcome, AppError> {
        let file = path.map(StateFile::new);
        let file = file.as_ref().unwrap_or(&self.state_file);
        let snapshot = self.store.snapshot();
        file.save(snapshot.state(), self.theme.is_dark(), &self.photos)?;
        Ok(IntentOutcome::Saved {
            path: file.path().to_path_buf(),
        })
    }

    fn set_theme(&mut self, theme: Theme) -> Result<IntentOutcome, AppError> {
        if theme != self.theme {
            self.theme_store.save(theme)?;
            self.theme = theme;
            info!("Theme changed to {theme:?}");
        }
        Ok(IntentOutcome::ThemeChanged { theme })
    }

    // ── Export results ─────────────────────────────────────────────────────

    /// Collects the export result if it has already finished.
    pub async fn poll_export(&mut self) -> Option<IntentOutcome> {
        if !self.pending_export.as_ref()?.is_finished() {
            return None;
        }
        self.finish_export().await
    }

    /// Waits for the in-flight export, if any.
    pub async fn finish_export(&mut self) -> Option<IntentOutcome> {
        let handle = self.pending_export.take()?;
        Some(match handle.wait().await {
            Ok(receipt) => IntentOutcome::ExportFinished { receipt },
            Err(e) => AppError::from(e).into(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Event loop
// ────────────────────────────────────────────────────────────────────────────

/// Reads intents as JSON lines and writes one JSON outcome line per intent
/// (plus one per finished export). Blank lines and `#` comments are skipped.
pub async fn run_script<R, W>(session: &mut Session, input: R, mut output: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let outcome = match serde_json::from_str::<Intent>(line) {
            Ok(intent) => session.apply(intent),
            Err(e) => AppError::InvalidIntent(e.to_string()).into(),
        };
        emit(&mut output, &outcome).await?;

        tokio::task::yield_now().await;
        if let Some(finished) = session.poll_export().await {
            emit(&mut output, &finished).await?;
        }
    }

    if let Some(finished) = session.finish_export().await {
        emit(&mut output, &finished).await?;
    }
    output.flush().await
}

async fn emit<W: AsyncWrite + Unpin>(output: &mut W, outcome: &IntentOutcome) -> std::io::Result<()> {
    let mut line = serde_json::to_vec(outcome)?;
    line.push(b'\n');
    output.write_all(&line).await
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use async_trait::async_trait;

    use super::*;
    use crate::errors::ExportError;
    use crate::models::{Experience, Skill};

    struct Recorder;

    #[async_trait]
    impl ExportCollaborator for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        async fn export(&self, snapshot: RenderedSnapshot) -> Result<ExportReceipt, ExportError> {
            Ok(ExportReceipt {
                path: PathBuf::from(format!("{}.pdf", snapshot.view().header.full_name)),
                pages: 1,
                bytes: 0,
                revision: snapshot.revision(),
            })
        }
    }

    fn config(dir: &std::path::Path) -> Config {
        Config {
            state_path: dir.join("resume.json"),
            theme_path: dir.join("theme.json"),
            export_dir: dir.join("exports"),
            rust_log: "info".to_string(),
        }
    }

    fn session(dir: &std::path::Path) -> Session {
        Session::with_exporter(&config(dir), Arc::new(Recorder))
    }

    fn intent(json: Value) -> Intent {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_add_update_delete_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());

        let added = session.apply(intent(serde_json::json!({
            "type": "addEntry",
            "entry": { "section": "experience", "fields": { "company": "Acme" } }
        })));
        let IntentOutcome::EntryAdded { id, .. } = added else {
            panic!("expected an added entry");
        };

        let updated = session.apply(intent(serde_json::json!({
            "type": "updateEntry",
            "id": id,
            "patch": { "section": "experience", "fields": { "current": true } }
        })));
        assert!(matches!(updated, IntentOutcome::Updated { .. }));
        assert!(session.store().snapshot().find::<Experience>(id).unwrap().current);

        let deleted = session.apply(Intent::DeleteEntry {
            section: Section::Experience,
            id,
        });
        assert!(matches!(deleted, IntentOutcome::Updated { .. }));

        let missed = session.apply(Intent::DeleteEntry {
            section: Section::Experience,
            id,
        });
        assert!(matches!(missed, IntentOutcome::NotFound { .. }));
    }

    #[test]
    fn test_form_failure_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        session.apply(intent(serde_json::json!({
            "type": "editForm",
            "patch": { "section": "education", "fields": { "degree": "BSc" } }
        })));

        let outcome = session.apply(Intent::SubmitForm {
            section: Section::Education,
        });
        let IntentOutcome::Failed { notice } = outcome else {
            panic!("expected failure");
        };
        assert_eq!(notice["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(session.forms().education.draft().degree, "BSc");
        assert!(session.preview().presentation().is_empty());
    }

    #[test]
    fn test_preview_and_outline_follow_intents() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        session.apply(Intent::ReplaceSkills {
            skills: vec![Skill {
                name: "Go".to_string(),
                ..Skill::default()
            }],
        });
        assert!(!session.preview().presentation().is_empty());
        assert_eq!(session.outline().section(Section::Skills).len(), 1);
        assert_eq!(session.preview().revision(), session.store().revision());
    }

    #[test]
    fn test_theme_is_persisted_on_change() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        assert_eq!(session.theme(), Theme::Dark);

        session.apply(Intent::ToggleTheme);
        assert_eq!(session.theme(), Theme::Light);
        assert_eq!(ThemeStore::new(dir.path().join("theme.json")).load(), Theme::Light);

        let reopened = self::session(dir.path());
        assert_eq!(reopened.theme(), Theme::Light);
    }

    #[test]
    fn test_failed_theme_write_keeps_current_theme() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let mut config = config(dir.path());
        config.theme_path = blocker.join("theme.json");
        let mut session = Session::with_exporter(&config, Arc::new(Recorder));

        let outcome = session.apply(Intent::ToggleTheme);
        assert!(outcome.is_failure());
        assert_eq!(session.theme(), Theme::Dark);
    }

    #[test]
    fn test_photo_attach_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let photo_path = dir.path().join("me.png");
        let mut file = std::fs::File::create(&photo_path).unwrap();
        file.write_all(&[0x89, b'P', b'N', b'G']).unwrap();

        let mut session = session(dir.path());
        let outcome = session.apply(Intent::AttachPhoto { path: photo_path });
        assert!(matches!(outcome, IntentOutcome::Updated { .. }));
        let photo = session
            .store()
            .snapshot()
            .document()
            .personal_info
            .photo
            .clone()
            .unwrap();
        assert_eq!(photo.mime_type, "image/png");
        assert_eq!(session.photos().len(), 1);

        session.apply(Intent::RemovePhoto);
        assert!(session.store().snapshot().document().personal_info.photo.is_none());
        assert!(session.photos().is_empty());
    }

    #[test]
    fn test_bad_photo_leaves_document_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        let outcome = session.apply(Intent::AttachPhoto {
            path: dir.path().join("missing.png"),
        });
        assert!(outcome.is_failure());
        assert_eq!(session.store().revision(), 0);
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = session(dir.path());
        first.apply(Intent::UpdatePersonalInfo {
            fields: PersonalInfoPatch {
                first_name: Some("Ada".to_string()),
                ..PersonalInfoPatch::default()
            },
        });
        first.apply(Intent::SetTemplate {
            template: Template::Creative,
        });
        assert!(matches!(
            first.apply(Intent::Save { path: None }),
            IntentOutcome::Saved { .. }
        ));

        let mut second = session(dir.path());
        assert!(second.restore().unwrap());
        let snapshot = second.store().snapshot();
        assert_eq!(snapshot.document().personal_info.first_name, "Ada");
        assert_eq!(snapshot.state().selected_template, Template::Creative);
    }

    #[test]
    fn test_load_applies_dark_mode_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("import.json");
        std::fs::write(&path, r#"{"isDarkMode": false}"#).unwrap();

        let mut session = session(dir.path());
        let outcome = session.apply(Intent::Load { path: Some(path) });
        assert!(matches!(outcome, IntentOutcome::Loaded { .. }));
        assert_eq!(session.theme(), Theme::Light);
        assert_eq!(session.store().revision(), 0);
    }

    #[test]
    fn test_load_of_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        assert!(session.apply(Intent::Load { path: None }).is_failure());
    }

    #[test]
    fn test_export_of_empty_resume_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        let IntentOutcome::Failed { notice } = session.apply(Intent::Export) else {
            panic!("expected failure");
        };
        assert_eq!(notice["error"]["code"], "NOTHING_TO_EXPORT");
    }

    #[tokio::test]
    async fn test_export_runs_in_background_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        session.apply(Intent::UpdatePersonalInfo {
            fields: PersonalInfoPatch {
                first_name: Some("Ada".to_string()),
                ..PersonalInfoPatch::default()
            },
        });
        session.apply(intent(serde_json::json!({
            "type": "editForm",
            "patch": { "section": "skills", "fields": { "name": "Rust" } }
        })));

        let started = session.apply(Intent::Export);
        assert!(matches!(started, IntentOutcome::ExportStarted { revision: 1 }));
        assert_eq!(session.forms().focused(), None);

        let finished = session.finish_export().await.unwrap();
        let IntentOutcome::ExportFinished { receipt } = finished else {
            panic!("expected a receipt");
        };
        assert_eq!(receipt.path, PathBuf::from("Ada.pdf"));
        assert!(!session.is_exporting());
        assert!(session.finish_export().await.is_none());
    }

    #[tokio::test]
    async fn test_run_script_reports_each_line() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        let script = concat!(
            "# comment\n",
            "{\"type\":\"updatePersonalInfo\",\"fields\":{\"firstName\":\"Ada\"}}\n",
            "\n",
            "{\"type\":\"nope\"}\n",
            "{\"type\":\"export\"}\n",
        );
        let mut output = Vec::new();

        run_script(&mut session, script.as_bytes(), &mut output)
            .await
            .unwrap();

        let outcomes: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(outcomes.len(), 4);
        assert_eq!(outcomes[0]["outcome"], "updated");
        assert_eq!(outcomes[1]["notice"]["error"]["code"], "INVALID_INTENT");
        assert_eq!(outcomes[2]["outcome"], "exportStarted");
        assert_eq!(outcomes[3]["outcome"], "exportFinished");
        assert_eq!(outcomes[3]["receipt"]["path"], "Ada.pdf");
    }
}
