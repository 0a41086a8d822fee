pub mod document;
pub mod patch;
pub mod state;

pub use document::{
    Achievement, Certification, Education, EntryId, Experience, Language, PersonalInfo, PhotoRef,
    Project, ResumeDocument, Section, SectionEntry, Skill,
};
pub use patch::{EntryPatch, NewEntry, PersonalInfoPatch};
pub use state::{
    BuilderState, ColorTheme, Customization, CustomizationPatch, PersistedState, SectionKey,
    Template, TemplateCategory,
};
