//! Views bound to the store. Each one derives its own read-only data from the
//! snapshot it is handed and never writes back.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use serde::Serialize;

use crate::models::{EntryId, Section, SectionEntry};
use crate::models::{Achievement, Certification, Education, Experience, Language, Project, Skill};
use crate::preview::{render, Presentation};
use crate::store::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

/// Called synchronously after every state change, in registration order.
pub trait Subscriber: Send + Sync {
    fn name(&self) -> &str;
    fn on_snapshot(&self, snapshot: &Snapshot);
}

// ────────────────────────────────────────────────────────────────────────────
// Preview panel
// ────────────────────────────────────────────────────────────────────────────

/// Holds the most recent rendered presentation.
#[derive(Debug)]
pub struct PreviewPanel {
    current: RwLock<(u64, Presentation)>,
    renders: AtomicU64,
}

impl Default for PreviewPanel {
    fn default() -> Self {
        Self {
            current: RwLock::new((0, Presentation::Empty)),
            renders: AtomicU64::new(0),
        }
    }
}

impl PreviewPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn presentation(&self) -> Presentation {
        match self.current.read() {
            Ok(guard) => guard.1.clone(),
            Err(poisoned) => poisoned.into_inner().1.clone(),
        }
    }

    /// Revision of the snapshot the current presentation was rendered from.
    pub fn revision(&self) -> u64 {
        match self.current.read() {
            Ok(guard) => guard.0,
            Err(poisoned) => poisoned.into_inner().0,
        }
    }

    pub fn render_count(&self) -> u64 {
        self.renders.load(Ordering::Relaxed)
    }
}

impl Subscriber for PreviewPanel {
    fn name(&self) -> &str {
        "preview"
    }

    fn on_snapshot(&self, snapshot: &Snapshot) {
        let presentation = render(snapshot.state());
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = (snapshot.revision(), presentation);
        self.renders.fetch_add(1, Ordering::Relaxed);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Section outline
// ────────────────────────────────────────────────────────────────────────────

/// One row of the editor sidebar: an entry's id and a short label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineEntry {
    pub section: Section,
    pub id: EntryId,
    pub label: String,
}

/// Flat list of every entry in the document, grouped by section.
#[derive(Debug, Default)]
pub struct SectionOutline {
    entries: RwLock<Vec<OutlineEntry>>,
}

impl SectionOutline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<OutlineEntry> {
        match self.entries.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn section(&self, section: Section) -> Vec<OutlineEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.section == section)
            .collect()
    }
}

fn outline_of<E: SectionEntry>(snapshot: &Snapshot, out: &mut Vec<OutlineEntry>) {
    out.extend(snapshot.entries::<E>().iter().map(|entry| OutlineEntry {
        section: E::SECTION,
        id: entry.id(),
        label: entry.label(),
    }));
}

impl Subscriber for SectionOutline {
    fn name(&self) -> &str {
        "outline"
    }

    fn on_snapshot(&self, snapshot: &Snapshot) {
        let mut rows = Vec::new();
        outline_of::<Experience>(snapshot, &mut rows);
        outline_of::<Education>(snapshot, &mut rows);
        outline_of::<Skill>(snapshot, &mut rows);
        outline_of::<Project>(snapshot, &mut rows);
        outline_of::<Certification>(snapshot, &mut rows);
        outline_of::<Achievement>(snapshot, &mut rows);
        outline_of::<Language>(snapshot, &mut rows);

        let mut guard = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = rows;
    }
}
