//! Document store — the single owner of the resume state.
//!
//! Every operation builds a new `BuilderState` value and swaps it in; snapshots
//! handed out earlier keep pointing at the old value. Subscribers are told
//! about each new snapshot right after the swap. Nothing here blocks or does IO.

pub mod subscriber;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::models::{
    document::backfill, BuilderState, CustomizationPatch, EntryId, EntryPatch, NewEntry,
    PersistedState, PersonalInfoPatch, ResumeDocument, Section, SectionEntry, SectionKey, Skill,
    Template, TemplateCategory,
};
use crate::models::{Achievement, Certification, Education, Experience, Language, Project};

pub use subscriber::{OutlineEntry, PreviewPanel, SectionOutline, Subscriber, SubscriptionId};

// ────────────────────────────────────────────────────────────────────────────
// Snapshot
// ────────────────────────────────────────────────────────────────────────────

/// An immutable view of the store at one revision. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Snapshot {
    revision: u64,
    state: Arc<BuilderState>,
}

impl Snapshot {
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn state(&self) -> &BuilderState {
        &self.state
    }

    pub fn document(&self) -> &ResumeDocument {
        &self.state.resume_data
    }

    pub fn entries<E: SectionEntry>(&self) -> &[E] {
        E::entries(&self.state.resume_data)
    }

    pub fn find<E: SectionEntry>(&self, id: EntryId) -> Option<&E> {
        self.entries::<E>().iter().find(|e| e.id() == id)
    }
}

/// Result of an id-addressed edit. A miss is not an error at this layer, but it
/// is reported so callers can notice stale ids.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    NotFound,
}

impl EditOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, EditOutcome::Applied)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Store
// ────────────────────────────────────────────────────────────────────────────

pub struct DocumentStore {
    state: Arc<BuilderState>,
    revision: u64,
    subscribers: Vec<(SubscriptionId, Arc<dyn Subscriber>)>,
    next_subscription: u64,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore {
    /// A store holding the canonical empty document and default selections.
    pub fn new() -> Self {
        Self {
            state: Arc::new(BuilderState::default()),
            revision: 0,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            revision: self.revision,
            state: Arc::clone(&self.state),
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ── View binding ───────────────────────────────────────────────────────

    /// Registers a subscriber and immediately hands it the current snapshot.
    pub fn subscribe(&mut self, subscriber: Arc<dyn Subscriber>) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        subscriber.on_snapshot(&self.snapshot());
        debug!("Subscriber '{}' registered as {:?}", subscriber.name(), id);
        self.subscribers.push((id, subscriber));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        before != self.subscribers.len()
    }

    /// Applies `mutate` to a copy of the state and publishes it if anything changed.
    fn commit(&mut self, operation: &'static str, mutate: impl FnOnce(&mut BuilderState)) -> bool {
        let mut next = BuilderState::clone(&self.state);
        mutate(&mut next);
        if next == *self.state {
            debug!("{operation}: no change");
            return false;
        }

        self.state = Arc::new(next);
        self.revision += 1;
        debug!("{operation}: revision {}", self.revision);

        let snapshot = self.snapshot();
        for (_, subscriber) in &self.subscribers {
            subscriber.on_snapshot(&snapshot);
        }
        true
    }

    // ── Personal info ──────────────────────────────────────────────────────

    pub fn update_personal_info(&mut self, patch: PersonalInfoPatch) {
        self.commit("update_personal_info", |s| {
            patch.apply_to(&mut s.resume_data.personal_info)
        });
    }

    // ── Entries ────────────────────────────────────────────────────────────

    /// Appends `entry` to its section and returns the id it was given.
    /// Required fields are not checked here; that is the form layer's job.
    pub fn add_entry<E: SectionEntry>(&mut self, mut entry: E) -> EntryId {
        let id = EntryId::generate();
        entry.set_id(id);
        self.commit("add_entry", |s| E::entries_mut(&mut s.resume_data).push(entry));
        debug!("Added {} entry {id}", E::SECTION);
        id
    }

    /// Merges `patch` into the entry with `id`.
    pub fn update_entry<E: SectionEntry>(&mut self, id: EntryId, patch: E::Patch) -> EditOutcome {
        if self.snapshot().find::<E>(id).is_none() {
            warn!("update_entry: no {} entry with id {id}", E::SECTION);
            return EditOutcome::NotFound;
        }
        self.commit("update_entry", |s| {
            if let Some(entry) = E::entries_mut(&mut s.resume_data)
                .iter_mut()
                .find(|e| e.id() == id)
            {
                entry.apply(patch);
            }
        });
        EditOutcome::Applied
    }

    /// Removes the entry with `id`; the rest keep their relative order.
    pub fn delete_entry(&mut self, section: Section, id: EntryId) -> EditOutcome {
        match section {
            Section::Experience => self.remove::<Experience>(id),
            Section::Education => self.remove::<Education>(id),
            Section::Skills => self.remove::<Skill>(id),
            Section::Certifications => self.remove::<Certification>(id),
            Section::Achievements => self.remove::<Achievement>(id),
            Section::Projects => self.remove::<Project>(id),
            Section::Languages => self.remove::<Language>(id),
        }
    }

    fn remove<E: SectionEntry>(&mut self, id: EntryId) -> EditOutcome {
        if self.snapshot().find::<E>(id).is_none() {
            warn!("delete_entry: no {} entry with id {id}", E::SECTION);
            return EditOutcome::NotFound;
        }
        self.commit("delete_entry", |s| {
            E::entries_mut(&mut s.resume_data).retain(|e| e.id() != id)
        });
        EditOutcome::Applied
    }

    /// Section-tagged form of [`add_entry`](Self::add_entry).
    pub fn add(&mut self, entry: NewEntry) -> EntryId {
        match entry {
            NewEntry::Experience(e) => self.add_entry(e),
            NewEntry::Education(e) => self.add_entry(e),
            NewEntry::Skills(e) => self.add_entry(e),
            NewEntry::Certifications(e) => self.add_entry(e),
            NewEntry::Achievements(e) => self.add_entry(e),
            NewEntry::Projects(e) => self.add_entry(e),
            NewEntry::Languages(e) => self.add_entry(e),
        }
    }

    /// Section-tagged form of [`update_entry`](Self::update_entry).
    pub fn update(&mut self, id: EntryId, patch: EntryPatch) -> EditOutcome {
        match patch {
            EntryPatch::Experience(p) => self.update_entry::<Experience>(id, p),
            EntryPatch::Education(p) => self.update_entry::<Education>(id, p),
            EntryPatch::Skills(p) => self.update_entry::<Skill>(id, p),
            EntryPatch::Certifications(p) => self.update_entry::<Certification>(id, p),
            EntryPatch::Achievements(p) => self.update_entry::<Achievement>(id, p),
            EntryPatch::Projects(p) => self.update_entry::<Project>(id, p),
            EntryPatch::Languages(p) => self.update_entry::<Language>(id, p),
        }
    }

    /// Replaces the whole skills sequence. Skills without an id, or repeating
    /// an earlier one, get a fresh id.
    pub fn replace_skills(&mut self, mut skills: Vec<Skill>) {
        backfill(&mut skills);
        self.commit("replace_skills", |s| s.resume_data.skills = skills);
    }

    // ── Selection and customization ────────────────────────────────────────

    pub fn set_template(&mut self, template: Template) {
        self.commit("set_template", |s| s.selected_template = template);
    }

    pub fn set_template_category(&mut self, category: TemplateCategory) {
        self.commit("set_template_category", |s| s.template_category = category);
    }

    pub fn update_customization(&mut self, patch: CustomizationPatch) {
        self.commit("update_customization", |s| patch.apply_to(&mut s.customization));
    }

    pub fn reorder_sections(&mut self, order: Vec<SectionKey>) {
        self.update_customization(CustomizationPatch {
            section_order: Some(order),
            ..CustomizationPatch::default()
        });
    }

    // ── Whole-document operations ──────────────────────────────────────────

    /// Puts the canonical empty document back. Template and customization stay.
    pub fn reset_document(&mut self) {
        if self.commit("reset_document", |s| s.resume_data = ResumeDocument::default()) {
            info!("Resume document reset");
        }
    }

    /// Top-level merge of a persisted state: each key present replaces the
    /// current value wholesale, absent keys are left alone. The theme flag is
    /// not store state and is ignored here.
    pub fn load_document(&mut self, incoming: PersistedState) {
        let PersistedState {
            resume_data,
            selected_template,
            template_category,
            customization,
            is_dark_mode: _,
        } = incoming;

        self.commit("load_document", |s| {
            if let Some(mut document) = resume_data {
                let assigned = document.backfill_ids();
                if assigned > 0 {
                    info!("Assigned ids to {assigned} imported entries");
                }
                s.resume_data = document;
            }
            if let Some(template) = selected_template {
                s.selected_template = template;
            }
            if let Some(category) = template_category {
                s.template_category = category;
            }
            if let Some(custom) = customization {
                s.customization = custom.normalized();
            }
        });
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
