//! The resume document: personal info plus the ordered, list-backed sections.
//!
//! Every field is always present. Strings default to empty and sequences to
//! empty vectors, so a document deserialized from a partial JSON object is still
//! fully defined.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::models::patch::{
    AchievementPatch, CertificationPatch, EducationPatch, ExperiencePatch, LanguagePatch,
    ProjectPatch, SkillPatch,
};

// ────────────────────────────────────────────────────────────────────────────
// Identity
// ────────────────────────────────────────────────────────────────────────────

/// Stable identity of an entry, assigned by the store when the entry is added.
///
/// The nil id marks an entry that has not been through the store yet (a form
/// draft, or a legacy import). Legacy files carried numeric timestamps or no id
/// at all; both deserialize to nil and are backfilled on load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

}

impl From<Uuid> for EntryId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for EntryId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Uuid(Uuid),
            Legacy(serde_json::Value),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Uuid(id) => Self(id),
            RawId::Legacy(_) => Self::default(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

/// The list-backed sections of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    Experience,
    Education,
    Skills,
    Certifications,
    Achievements,
    Projects,
    Languages,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::Experience,
        Section::Education,
        Section::Skills,
        Section::Certifications,
        Section::Achievements,
        Section::Projects,
        Section::Languages,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Experience => "experience",
            Section::Education => "education",
            Section::Skills => "skills",
            Section::Certifications => "certifications",
            Section::Achievements => "achievements",
            Section::Projects => "projects",
            Section::Languages => "languages",
        }
    }

    /// Heading shown above the section in the preview and the export.
    pub fn heading(&self) -> &'static str {
        match self {
            Section::Experience => "Professional Experience",
            Section::Education => "Education",
            Section::Skills => "Skills",
            Section::Certifications => "Certifications",
            Section::Achievements => "Achievements",
            Section::Projects => "Projects",
            Section::Languages => "Languages",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Personal info
// ────────────────────────────────────────────────────────────────────────────

/// Reference to a photo held in the photo library. The document never carries
/// the encoded image itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRef {
    pub id: Uuid,
    pub mime_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin: String,
    pub website: String,
    pub summary: String,
    pub photo: Option<PhotoRef>,
}

impl PersonalInfo {
    pub fn full_name(&self) -> String {
        [self.first_name.trim(), self.last_name.trim()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_blank(&self) -> bool {
        [
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.phone,
            &self.location,
            &self.linkedin,
            &self.website,
            &self.summary,
        ]
        .iter()
        .all(|field| field.trim().is_empty())
            && self.photo.is_none()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entries
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Experience {
    pub id: EntryId,
    pub company: String,
    pub position: String,
    pub location: String,
    /// "YYYY-MM" or empty.
    pub start_date: String,
    pub end_date: String,
    pub current: bool,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Education {
    pub id: EntryId,
    pub degree: String,
    pub institution: String,
    pub location: String,
    pub graduation_date: String,
    pub cgpa: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Skill {
    pub id: EntryId,
    pub name: String,
    /// Beginner, Intermediate, Advanced or Expert; kept as entered.
    pub level: String,
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Certification {
    pub id: EntryId,
    pub name: String,
    pub issuer: String,
    pub date: String,
    pub expiration_date: String,
    #[serde(rename = "credentialID")]
    pub credential_id: String,
    #[serde(rename = "credentialURL")]
    pub credential_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Achievement {
    pub id: EntryId,
    pub title: String,
    pub date: String,
    pub organization: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    pub id: EntryId,
    pub name: String,
    pub description: String,
    pub technologies: String,
    pub link: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Language {
    pub id: EntryId,
    pub name: String,
    pub proficiency: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Document
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResumeDocument {
    pub personal_info: PersonalInfo,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<Skill>,
    pub projects: Vec<Project>,
    pub certifications: Vec<Certification>,
    pub achievements: Vec<Achievement>,
    pub languages: Vec<Language>,
}

impl ResumeDocument {
    /// True when every personal field is empty and every section has no entries.
    pub fn is_blank(&self) -> bool {
        self.personal_info.is_blank() && Section::ALL.iter().all(|s| self.len(*s) == 0)
    }

    pub fn len(&self, section: Section) -> usize {
        match section {
            Section::Experience => self.experience.len(),
            Section::Education => self.education.len(),
            Section::Skills => self.skills.len(),
            Section::Certifications => self.certifications.len(),
            Section::Achievements => self.achievements.len(),
            Section::Projects => self.projects.len(),
            Section::Languages => self.languages.len(),
        }
    }

    /// Gives every entry still carrying the nil id a fresh one. Returns how many
    /// ids were assigned.
    pub fn backfill_ids(&mut self) -> usize {
        backfill(&mut self.experience)
            + backfill(&mut self.education)
            + backfill(&mut self.skills)
            + backfill(&mut self.projects)
            + backfill(&mut self.certifications)
            + backfill(&mut self.achievements)
            + backfill(&mut self.languages)
    }
}

/// Gives every nil or repeated id a fresh one, so ids are unique per section.
/// The first holder of a repeated id keeps it.
pub(crate) fn backfill<E: SectionEntry>(entries: &mut [E]) -> usize {
    let mut seen = HashSet::with_capacity(entries.len());
    let mut assigned = 0;
    for entry in entries.iter_mut() {
        if entry.id().is_nil() || !seen.insert(entry.id()) {
            let fresh = EntryId::generate();
            entry.set_id(fresh);
            seen.insert(fresh);
            assigned += 1;
        }
    }
    assigned
}

// ────────────────────────────────────────────────────────────────────────────
// Entry trait
// ────────────────────────────────────────────────────────────────────────────

/// An entry of one list-backed section. Ties each entry type to its section,
/// its patch type and its sequence inside the document, so section mix-ups are
/// rejected at compile time.
pub trait SectionEntry: Clone + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    const SECTION: Section;
    type Patch: Clone + Default + fmt::Debug;

    fn id(&self) -> EntryId;
    fn set_id(&mut self, id: EntryId);
    fn apply(&mut self, patch: Self::Patch);
    /// Short label used by outlines and logs.
    fn label(&self) -> String;
    fn entries(document: &ResumeDocument) -> &Vec<Self>;
    fn entries_mut(document: &mut ResumeDocument) -> &mut Vec<Self>;
}

impl SectionEntry for Experience {
    const SECTION: Section = Section::Experience;
    type Patch = ExperiencePatch;

    fn id(&self) -> EntryId {
        self.id
    }
    fn set_id(&mut self, id: EntryId) {
        self.id = id;
    }
    fn apply(&mut self, patch: ExperiencePatch) {
        patch.apply_to(self);
    }
    fn label(&self) -> String {
        format!("{} at {}", self.position, self.company)
    }
    fn entries(document: &ResumeDocument) -> &Vec<Self> {
        &document.experience
    }
    fn entries_mut(document: &mut ResumeDocument) -> &mut Vec<Self> {
        &mut document.experience
    }
}

impl SectionEntry for Education {
    const SECTION: Section = Section::Education;
    type Patch = EducationPatch;

    fn id(&self) -> EntryId {
        self.id
    }
    fn set_id(&mut self, id: EntryId) {
        self.id = id;
    }
    fn apply(&mut self, patch: EducationPatch) {
        patch.apply_to(self);
    }
    fn label(&self) -> String {
        format!("{}, {}", self.degree, self.institution)
    }
    fn entries(document: &ResumeDocument) -> &Vec<Self> {
        &document.education
    }
    fn entries_mut(document: &mut ResumeDocument) -> &mut Vec<Self> {
        &mut document.education
    }
}

impl SectionEntry for Skill {
    const SECTION: Section = Section::Skills;
    type Patch = SkillPatch;

    fn id(&self) -> EntryId {
        self.id
    }
    fn set_id(&mut self, id: EntryId) {
        self.id = id;
    }
    fn apply(&mut self, patch: SkillPatch) {
        patch.apply_to(self);
    }
    fn label(&self) -> String {
        format!("{} ({})", self.name, self.level)
    }
    fn entries(document: &ResumeDocument) -> &Vec<Self> {
        &document.skills
    }
    fn entries_mut(document: &mut ResumeDocument) -> &mut Vec<Self> {
        &mut document.skills
    }
}

impl SectionEntry for Certification {
    const SECTION: Section = Section::Certifications;
    type Patch = CertificationPatch;

    fn id(&self) -> EntryId {
        self.id
    }
    fn set_id(&mut self, id: EntryId) {
        self.id = id;
    }
    fn apply(&mut self, patch: CertificationPatch) {
        patch.apply_to(self);
    }
    fn label(&self) -> String {
        format!("{} ({})", self.name, self.issuer)
    }
    fn entries(document: &ResumeDocument) -> &Vec<Self> {
        &document.certifications
    }
    fn entries_mut(document: &mut ResumeDocument) -> &mut Vec<Self> {
        &mut document.certifications
    }
}

impl SectionEntry for Achievement {
    const SECTION: Section = Section::Achievements;
    type Patch = AchievementPatch;

    fn id(&self) -> EntryId {
        self.id
    }
    fn set_id(&mut self, id: EntryId) {
        self.id = id;
    }
    fn apply(&mut self, patch: AchievementPatch) {
        patch.apply_to(self);
    }
    fn label(&self) -> String {
        self.title.clone()
    }
    fn entries(document: &ResumeDocument) -> &Vec<Self> {
        &document.achievements
    }
    fn entries_mut(document: &mut ResumeDocument) -> &mut Vec<Self> {
        &mut document.achievements
    }
}

impl SectionEntry for Project {
    const SECTION: Section = Section::Projects;
    type Patch = ProjectPatch;

    fn id(&self) -> EntryId {
        self.id
    }
    fn set_id(&mut self, id: EntryId) {
        self.id = id;
    }
    fn apply(&mut self, patch: ProjectPatch) {
        patch.apply_to(self);
    }
    fn label(&self) -> String {
        self.name.clone()
    }
    fn entries(document: &ResumeDocument) -> &Vec<Self> {
        &document.projects
    }
    fn entries_mut(document: &mut ResumeDocument) -> &mut Vec<Self> {
        &mut document.projects
    }
}

impl SectionEntry for Language {
    const SECTION: Section = Section::Languages;
    type Patch = LanguagePatch;

    fn id(&self) -> EntryId {
        self.id
    }
    fn set_id(&mut self, id: EntryId) {
        self.id = id;
    }
    fn apply(&mut self, patch: LanguagePatch) {
        patch.apply_to(self);
    }
    fn label(&self) -> String {
        format!("{} ({})", self.name, self.proficiency)
    }
    fn entries(document: &ResumeDocument) -> &Vec<Self> {
        &document.languages
    }
    fn entries_mut(document: &mut ResumeDocument) -> &mut Vec<Self> {
        &mut document.languages
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
