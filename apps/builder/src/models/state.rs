//! Everything the store owns besides the document: template selection and
//! visual customization. None of it changes document content.

use serde::{Deserialize, Serialize};

use crate::layout::FontFamily;
use crate::models::document::{ResumeDocument, Section};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Template {
    #[default]
    Modern,
    Minimal,
    Creative,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateCategory {
    WithPhoto,
    #[default]
    WithoutPhoto,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTheme {
    #[default]
    Blue,
    Green,
    Purple,
    Red,
    Gray,
}

impl ColorTheme {
    /// Accent colour as RGB components in 0.0..=1.0.
    pub fn accent_rgb(&self) -> (f32, f32, f32) {
        match self {
            ColorTheme::Blue => (0.15, 0.39, 0.92),
            ColorTheme::Green => (0.09, 0.64, 0.29),
            ColorTheme::Purple => (0.49, 0.23, 0.93),
            ColorTheme::Red => (0.86, 0.15, 0.15),
            ColorTheme::Gray => (0.29, 0.33, 0.39),
        }
    }
}

/// Keys of the render order. `PersonalInfo` is the header, `Summary` the
/// profile paragraph; the rest map onto list-backed sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionKey {
    PersonalInfo,
    Summary,
    Experience,
    Education,
    Skills,
    Projects,
    Certifications,
    Achievements,
    Languages,
}

impl SectionKey {
    pub const CANONICAL: [SectionKey; 9] = [
        SectionKey::PersonalInfo,
        SectionKey::Summary,
        SectionKey::Experience,
        SectionKey::Education,
        SectionKey::Skills,
        SectionKey::Projects,
        SectionKey::Certifications,
        SectionKey::Achievements,
        SectionKey::Languages,
    ];

    pub fn section(&self) -> Option<Section> {
        match self {
            SectionKey::PersonalInfo | SectionKey::Summary => None,
            SectionKey::Experience => Some(Section::Experience),
            SectionKey::Education => Some(Section::Education),
            SectionKey::Skills => Some(Section::Skills),
            SectionKey::Projects => Some(Section::Projects),
            SectionKey::Certifications => Some(Section::Certifications),
            SectionKey::Achievements => Some(Section::Achievements),
            SectionKey::Languages => Some(Section::Languages),
        }
    }
}

/// Turns any key list into a permutation of all section keys: the first
/// occurrence of each key wins, missing keys follow in canonical order.
pub fn normalize_section_order(order: &[SectionKey]) -> Vec<SectionKey> {
    let mut normalized: Vec<SectionKey> = Vec::with_capacity(SectionKey::CANONICAL.len());
    for key in order.iter().chain(SectionKey::CANONICAL.iter()) {
        if !normalized.contains(key) {
            normalized.push(*key);
        }
    }
    normalized
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Customization {
    pub font_family: FontFamily,
    pub color_theme: ColorTheme,
    pub section_order: Vec<SectionKey>,
}

impl Default for Customization {
    fn default() -> Self {
        Self {
            font_family: FontFamily::Inter,
            color_theme: ColorTheme::Blue,
            section_order: SectionKey::CANONICAL.to_vec(),
        }
    }
}

impl Customization {
    pub fn normalized(mut self) -> Self {
        self.section_order = normalize_section_order(&self.section_order);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomizationPatch {
    pub font_family: Option<FontFamily>,
    pub color_theme: Option<ColorTheme>,
    pub section_order: Option<Vec<SectionKey>>,
}

impl CustomizationPatch {
    pub fn apply_to(self, customization: &mut Customization) {
        if let Some(font) = self.font_family {
            customization.font_family = font;
        }
        if let Some(theme) = self.color_theme {
            customization.color_theme = theme;
        }
        if let Some(order) = self.section_order {
            customization.section_order = normalize_section_order(&order);
        }
    }
}

/// The full value held by the document store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuilderState {
    pub resume_data: ResumeDocument,
    pub selected_template: Template,
    pub template_category: TemplateCategory,
    pub customization: Customization,
}

/// The persisted layout. Any key may be missing; missing keys leave the
/// current state untouched on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_data: Option<ResumeDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_template: Option<Template>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_category: Option<TemplateCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customization: Option<Customization>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_dark_mode: Option<bool>,
}

impl PersistedState {
    pub fn from_state(state: &BuilderState, is_dark_mode: bool) -> Self {
        Self {
            resume_data: Some(state.resume_data.clone()),
            selected_template: Some(state.selected_template),
            template_category: Some(state.template_category),
            customization: Some(state.customization.clone()),
            is_dark_mode: Some(is_dark_mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_order_is_canonical_permutation() {
        let custom = Customization::default();
        assert_eq!(custom.section_order, SectionKey::CANONICAL.to_vec());
    }

    #[test]
    fn test_normalize_drops_duplicates_and_appends_missing() {
        let order = normalize_section_order(&[
            SectionKey::Skills,
            SectionKey::Experience,
            SectionKey::Skills,
        ]);
        assert_eq!(order.len(), SectionKey::CANONICAL.len());
        assert_eq!(order[0], SectionKey::Skills);
        assert_eq!(order[1], SectionKey::Experience);
        assert_eq!(order[2], SectionKey::PersonalInfo);
        assert_eq!(order.iter().filter(|k| **k == SectionKey::Skills).count(), 1);
    }

    #[test]
    fn test_customization_patch_keeps_unnamed_fields() {
        let mut custom = Customization::default();
        CustomizationPatch {
            color_theme: Some(ColorTheme::Green),
            ..CustomizationPatch::default()
        }
        .apply_to(&mut custom);
        assert_eq!(custom.color_theme, ColorTheme::Green);
        assert_eq!(custom.font_family, FontFamily::Inter);
        assert_eq!(custom.section_order, SectionKey::CANONICAL.to_vec());
    }

    #[test]
    fn test_template_wire_names() {
        assert_eq!(
            serde_json::to_value(TemplateCategory::WithoutPhoto).unwrap(),
            "without-photo"
        );
        assert_eq!(serde_json::to_value(Template::Creative).unwrap(), "creative");
    }

    #[test]
    fn test_persisted_state_accepts_any_subset() {
        let json = serde_json::json!({ "selectedTemplate": "minimal" });
        let state: PersistedState = serde_json::from_value(json).unwrap();
        assert_eq!(state.selected_template, Some(Template::Minimal));
        assert!(state.resume_data.is_none());
        assert!(state.customization.is_none());
        assert!(state.is_dark_mode.is_none());
    }

    #[test]
    fn test_persisted_state_uses_original_keys() {
        let state = PersistedState::from_state(&BuilderState::default(), true);
        let value = serde_json::to_value(&state).unwrap();
        for key in [
            "resumeData",
            "selectedTemplate",
            "templateCategory",
            "customization",
            "isDarkMode",
        ] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
    }
}
