//! Form buffers — one in-progress draft per entry kind.
//!
//! Edits merge into the draft; submitting checks the required fields, hands
//! the draft to the store and clears the buffer. A failed submit leaves both
//! the buffer and the document untouched.

use tracing::{debug, info};

use crate::errors::FormError;
use crate::models::{
    Achievement, Certification, Education, EntryId, EntryPatch, Experience, Language, Project,
    Section, SectionEntry, Skill,
};
use crate::store::DocumentStore;

/// Fields that must be non-blank before an entry can be added.
pub trait RequiredFields {
    /// Wire names of the required fields that are blank, in form order.
    fn missing_fields(&self) -> Vec<&'static str>;
}

fn blank_of(fields: &[(&'static str, &str)]) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect()
}

impl RequiredFields for Experience {
    fn missing_fields(&self) -> Vec<&'static str> {
        blank_of(&[
            ("company", self.company.as_str()),
            ("position", self.position.as_str()),
            ("startDate", self.start_date.as_str()),
        ])
    }
}

impl RequiredFields for Education {
    fn missing_fields(&self) -> Vec<&'static str> {
        blank_of(&[("degree", self.degree.as_str()), ("institution", self.institution.as_str())])
    }
}

impl RequiredFields for Skill {
    fn missing_fields(&self) -> Vec<&'static str> {
        blank_of(&[("name", self.name.as_str())])
    }
}

impl RequiredFields for Certification {
    fn missing_fields(&self) -> Vec<&'static str> {
        blank_of(&[("name", self.name.as_str()), ("issuer", self.issuer.as_str())])
    }
}

impl RequiredFields for Achievement {
    fn missing_fields(&self) -> Vec<&'static str> {
        blank_of(&[("title", self.title.as_str())])
    }
}

impl RequiredFields for Project {
    fn missing_fields(&self) -> Vec<&'static str> {
        blank_of(&[("name", self.name.as_str())])
    }
}

impl RequiredFields for Language {
    fn missing_fields(&self) -> Vec<&'static str> {
        blank_of(&[("name", self.name.as_str())])
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Single form
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct EntryForm<E> {
    blank: E,
    draft: E,
}

impl<E: SectionEntry + RequiredFields> Default for EntryForm<E> {
    fn default() -> Self {
        Self::with_defaults(E::default())
    }
}

impl<E: SectionEntry + RequiredFields> EntryForm<E> {
    /// A form whose buffer starts from (and resets to) `blank`.
    pub fn with_defaults(blank: E) -> Self {
        Self {
            draft: blank.clone(),
            blank,
        }
    }

    pub fn draft(&self) -> &E {
        &self.draft
    }

    pub fn is_pristine(&self) -> bool {
        self.draft == self.blank
    }

    pub fn edit(&mut self, patch: E::Patch) {
        self.draft.apply(patch);
    }

    pub fn clear(&mut self) {
        self.draft = self.blank.clone();
    }

    pub fn submit(&mut self, store: &mut DocumentStore) -> Result<EntryId, FormError> {
        let missing = self.draft.missing_fields();
        if !missing.is_empty() {
            debug!("{} form rejected, missing {:?}", E::SECTION, missing);
            return Err(FormError::MissingFields {
                section: E::SECTION,
                fields: missing,
            });
        }

        let id = store.add_entry(self.draft.clone());
        self.clear();
        Ok(id)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// All forms
// ────────────────────────────────────────────────────────────────────────────

/// Default skill draft: Intermediate, in the Technical category.
pub fn default_skill() -> Skill {
    Skill {
        level: "Intermediate".to_string(),
        category: "Technical".to_string(),
        ..Skill::default()
    }
}

#[derive(Debug, Clone)]
pub struct Forms {
    pub experience: EntryForm<Experience>,
    pub education: EntryForm<Education>,
    pub skills: EntryForm<Skill>,
    pub certifications: EntryForm<Certification>,
    pub achievements: EntryForm<Achievement>,
    pub projects: EntryForm<Project>,
    pub languages: EntryForm<Language>,
    focused: Option<Section>,
}

impl Default for Forms {
    fn default() -> Self {
        Self {
            experience: EntryForm::default(),
            education: EntryForm::default(),
            skills: EntryForm::with_defaults(default_skill()),
            certifications: EntryForm::default(),
            achievements: EntryForm::default(),
            projects: EntryForm::default(),
            languages: EntryForm::default(),
            focused: None,
        }
    }
}

impl Forms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Section whose form currently holds input focus.
    pub fn focused(&self) -> Option<Section> {
        self.focused
    }

    pub fn blur(&mut self) {
        if let Some(section) = self.focused.take() {
            debug!("{section} form blurred");
        }
    }

    /// Merges a field edit into the matching draft and focuses that form.
    pub fn edit(&mut self, patch: EntryPatch) {
        self.focused = Some(patch.section());
        match patch {
            EntryPatch::Experience(p) => self.experience.edit(p),
            EntryPatch::Education(p) => self.education.edit(p),
            EntryPatch::Skills(p) => self.skills.edit(p),
            EntryPatch::Certifications(p) => self.certifications.edit(p),
            EntryPatch::Achievements(p) => self.achievements.edit(p),
            EntryPatch::Projects(p) => self.projects.edit(p),
            EntryPatch::Languages(p) => self.languages.edit(p),
        }
    }

    pub fn submit(
        &mut self,
        section: Section,
        store: &mut DocumentStore,
    ) -> Result<EntryId, FormError> {
        let id = match section {
            Section::Experience => self.experience.submit(store),
            Section::Education => self.education.submit(store),
            Section::Skills => self.skills.submit(store),
            Section::Certifications => self.certifications.submit(store),
            Section::Achievements => self.achievements.submit(store),
            Section::Projects => self.projects.submit(store),
            Section::Languages => self.languages.submit(store),
        }?;
        info!("Added {section} entry {id} from form");
        Ok(id)
    }

    /// Clears one draft without submitting it.
    pub fn discard(&mut self, section: Section) {
        match section {
            Section::Experience => self.experience.clear(),
            Section::Education => self.education.clear(),
            Section::Skills => self.skills.clear(),
            Section::Certifications => self.certifications.clear(),
            Section::Achievements => self.achievements.clear(),
            Section::Projects => self.projects.clear(),
            Section::Languages => self.languages.clear(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::patch::{
        AchievementPatch, EducationPatch, ExperiencePatch, LanguagePatch, ProjectPatch, SkillPatch,
    };

    fn experience_patch(company: &str, position: &str, start: &str) -> EntryPatch {
        EntryPatch::Experience(ExperiencePatch {
            company: Some(company.to_string()),
            position: Some(position.to_string()),
            start_date: Some(start.to_string()),
            ..ExperiencePatch::default()
        })
    }

    #[test]
    fn test_missing_fields_keep_buffer_and_document() {
        let mut store = DocumentStore::new();
        let mut forms = Forms::new();
        forms.edit(experience_patch("Acme", "", "2020-01"));
        let revision = store.revision();

        let err = forms.submit(Section::Experience, &mut store).unwrap_err();

        assert_eq!(
            err,
            FormError::MissingFields {
                section: Section::Experience,
                fields: vec!["position"],
            }
        );
        assert_eq!(forms.experience.draft().company, "Acme");
        assert_eq!(store.revision(), revision);
        assert!(store.snapshot().entries::<Experience>().is_empty());
    }

    #[test]
    fn test_successful_submit_adds_and_clears() {
        let mut store = DocumentStore::new();
        let mut forms = Forms::new();
        forms.edit(experience_patch("Acme", "Engineer", "2020-01"));

        let id = forms.submit(Section::Experience, &mut store).unwrap();

        assert!(forms.experience.is_pristine());
        let snapshot = store.snapshot();
        let added = snapshot.find::<Experience>(id).unwrap();
        assert_eq!(added.company, "Acme");
        assert_eq!(added.position, "Engineer");
    }

    #[test]
    fn test_whitespace_does_not_satisfy_required_fields() {
        let mut store = DocumentStore::new();
        let mut forms = Forms::new();
        forms.edit(EntryPatch::Education(EducationPatch {
            degree: Some("   ".to_string()),
            institution: Some("MIT".to_string()),
            ..EducationPatch::default()
        }));
        let err = forms.submit(Section::Education, &mut store).unwrap_err();
        assert!(err.to_string().contains("degree"));
    }

    #[test]
    fn test_required_sets_per_kind() {
        assert_eq!(
            Experience::default().missing_fields(),
            vec!["company", "position", "startDate"]
        );
        assert_eq!(Education::default().missing_fields(), vec!["degree", "institution"]);
        assert_eq!(Certification::default().missing_fields(), vec!["name", "issuer"]);
        assert_eq!(Achievement::default().missing_fields(), vec!["title"]);
        assert_eq!(Skill::default().missing_fields(), vec!["name"]);
        assert_eq!(Project::default().missing_fields(), vec!["name"]);
        assert_eq!(Language::default().missing_fields(), vec!["name"]);
    }

    #[test]
    fn test_skill_form_resets_to_defaults() {
        let mut store = DocumentStore::new();
        let mut forms = Forms::new();
        forms.edit(EntryPatch::Skills(SkillPatch {
            name: Some("Go".to_string()),
            level: Some("Expert".to_string()),
            ..SkillPatch::default()
        }));
        let id = forms.submit(Section::Skills, &mut store).unwrap();

        let snapshot = store.snapshot();
        let skill = snapshot.find::<Skill>(id).unwrap();
        assert_eq!(skill.level, "Expert");
        assert_eq!(skill.category, "Technical");
        assert_eq!(forms.skills.draft(), &default_skill());
    }

    #[test]
    fn test_edit_focuses_and_blur_clears() {
        let mut forms = Forms::new();
        assert_eq!(forms.focused(), None);
        forms.edit(EntryPatch::Achievements(AchievementPatch {
            title: Some("Winner".to_string()),
            ..AchievementPatch::default()
        }));
        assert_eq!(forms.focused(), Some(Section::Achievements));
        forms.blur();
        assert_eq!(forms.focused(), None);
        assert_eq!(forms.achievements.draft().title, "Winner");
    }

    #[test]
    fn test_discard_clears_only_that_form() {
        let mut forms = Forms::new();
        forms.edit(EntryPatch::Projects(ProjectPatch {
            name: Some("CLI".to_string()),
            ..ProjectPatch::default()
        }));
        forms.edit(EntryPatch::Languages(LanguagePatch {
            name: Some("French".to_string()),
            ..LanguagePatch::default()
        }));
        forms.discard(Section::Projects);
        assert!(forms.projects.is_pristine());
        assert_eq!(forms.languages.draft().name, "French");
    }
}
