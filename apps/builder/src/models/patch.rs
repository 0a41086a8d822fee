//! Partial updates. A `None` field leaves the target untouched.

use serde::Deserialize;

use crate::models::document::{
    Achievement, Certification, Education, Experience, Language, PersonalInfo, PhotoRef, Project,
    Section, Skill,
};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalInfoPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub linkedin: Option<String>,
    pub website: Option<String>,
    pub summary: Option<String>,
    /// Only the photo library sets this; `Some(None)` clears the photo.
    #[serde(skip)]
    pub photo: Option<Option<PhotoRef>>,
}

impl PersonalInfoPatch {
    pub fn apply_to(self, info: &mut PersonalInfo) {
        set(&mut info.first_name, self.first_name);
        set(&mut info.last_name, self.last_name);
        set(&mut info.email, self.email);
        set(&mut info.phone, self.phone);
        set(&mut info.location, self.location);
        set(&mut info.linkedin, self.linkedin);
        set(&mut info.website, self.website);
        set(&mut info.summary, self.summary);
        set(&mut info.photo, self.photo);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExperiencePatch {
    pub company: Option<String>,
    pub position: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub current: Option<bool>,
    pub description: Option<String>,
}

impl ExperiencePatch {
    pub fn apply_to(self, entry: &mut Experience) {
        set(&mut entry.company, self.company);
        set(&mut entry.position, self.position);
        set(&mut entry.location, self.location);
        set(&mut entry.start_date, self.start_date);
        set(&mut entry.end_date, self.end_date);
        set(&mut entry.current, self.current);
        set(&mut entry.description, self.description);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EducationPatch {
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub location: Option<String>,
    pub graduation_date: Option<String>,
    pub cgpa: Option<String>,
    pub description: Option<String>,
}

impl EducationPatch {
    pub fn apply_to(self, entry: &mut Education) {
        set(&mut entry.degree, self.degree);
        set(&mut entry.institution, self.institution);
        set(&mut entry.location, self.location);
        set(&mut entry.graduation_date, self.graduation_date);
        set(&mut entry.cgpa, self.cgpa);
        set(&mut entry.description, self.description);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SkillPatch {
    pub name: Option<String>,
    pub level: Option<String>,
    pub category: Option<String>,
}

impl SkillPatch {
    pub fn apply_to(self, entry: &mut Skill) {
        set(&mut entry.name, self.name);
        set(&mut entry.level, self.level);
        set(&mut entry.category, self.category);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CertificationPatch {
    pub name: Option<String>,
    pub issuer: Option<String>,
    pub date: Option<String>,
    pub expiration_date: Option<String>,
    #[serde(rename = "credentialID")]
    pub credential_id: Option<String>,
    #[serde(rename = "credentialURL")]
    pub credential_url: Option<String>,
}

impl CertificationPatch {
    pub fn apply_to(self, entry: &mut Certification) {
        set(&mut entry.name, self.name);
        set(&mut entry.issuer, self.issuer);
        set(&mut entry.date, self.date);
        set(&mut entry.expiration_date, self.expiration_date);
        set(&mut entry.credential_id, self.credential_id);
        set(&mut entry.credential_url, self.credential_url);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AchievementPatch {
    pub title: Option<String>,
    pub date: Option<String>,
    pub organization: Option<String>,
    pub description: Option<String>,
}

impl AchievementPatch {
    pub fn apply_to(self, entry: &mut Achievement) {
        set(&mut entry.title, self.title);
        set(&mut entry.date, self.date);
        set(&mut entry.organization, self.organization);
        set(&mut entry.description, self.description);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub technologies: Option<String>,
    pub link: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl ProjectPatch {
    pub fn apply_to(self, entry: &mut Project) {
        set(&mut entry.name, self.name);
        set(&mut entry.description, self.description);
        set(&mut entry.technologies, self.technologies);
        set(&mut entry.link, self.link);
        set(&mut entry.start_date, self.start_date);
        set(&mut entry.end_date, self.end_date);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LanguagePatch {
    pub name: Option<String>,
    pub proficiency: Option<String>,
}

impl LanguagePatch {
    pub fn apply_to(self, entry: &mut Language) {
        set(&mut entry.name, self.name);
        set(&mut entry.proficiency, self.proficiency);
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Section-tagged wrappers (wire form of add/update intents)
// ────────────────────────────────────────────────────────────────────────────

/// A complete entry addressed to its section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "section", content = "fields", rename_all = "camelCase")]
pub enum NewEntry {
    Experience(Experience),
    Education(Education),
    Skills(Skill),
    Certifications(Certification),
    Achievements(Achievement),
    Projects(Project),
    Languages(Language),
}

impl NewEntry {
    pub fn section(&self) -> Section {
        match self {
            NewEntry::Experience(_) => Section::Experience,
            NewEntry::Education(_) => Section::Education,
            NewEntry::Skills(_) => Section::Skills,
            NewEntry::Certifications(_) => Section::Certifications,
            NewEntry::Achievements(_) => Section::Achievements,
            NewEntry::Projects(_) => Section::Projects,
            NewEntry::Languages(_) => Section::Languages,
        }
    }
}

/// A partial entry addressed to its section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "section", content = "fields", rename_all = "camelCase")]
pub enum EntryPatch {
    Experience(ExperiencePatch),
    Education(EducationPatch),
    Skills(SkillPatch),
    Certifications(CertificationPatch),
    Achievements(AchievementPatch),
    Projects(ProjectPatch),
    Languages(LanguagePatch),
}

impl EntryPatch {
    pub fn section(&self) -> Section {
        match self {
            EntryPatch::Experience(_) => Section::Experience,
            EntryPatch::Education(_) => Section::Education,
            EntryPatch::Skills(_) => Section::Skills,
            EntryPatch::Certifications(_) => Section::Certifications,
            EntryPatch::Achievements(_) => Section::Achievements,
            EntryPatch::Projects(_) => Section::Projects,
            EntryPatch::Languages(_) => Section::Languages,
        }
    }
}
