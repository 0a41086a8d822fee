//! Preview renderer — a pure function from a store snapshot to a read-only
//! presentation. The live preview panel and the PDF export both consume it.

pub mod dates;
pub mod skills;

use serde::Serialize;

use crate::layout::{FontFamily, LineStyle, StyledLine};
use crate::models::{BuilderState, ColorTheme, EntryId, PhotoRef, Section, SectionKey, Template};

pub use skills::{group_by_category, proficiency_weight, SkillGroup, SkillView};

// ────────────────────────────────────────────────────────────────────────────
// Presentation types
// ────────────────────────────────────────────────────────────────────────────

/// What a view should show. `Empty` means there is nothing at all to lay out,
/// and callers should show a placeholder instead of a blank page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum Presentation {
    Empty,
    Populated(ResumeView),
}

impl Presentation {
    pub fn is_empty(&self) -> bool {
        matches!(self, Presentation::Empty)
    }

    pub fn as_view(&self) -> Option<&ResumeView> {
        match self {
            Presentation::Empty => None,
            Presentation::Populated(view) => Some(view),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleView {
    pub template: Template,
    pub font_family: FontFamily,
    pub color_theme: ColorTheme,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderView {
    pub full_name: String,
    /// Email, phone and location, in that order, empty ones left out.
    pub contact: Vec<String>,
    /// LinkedIn and website.
    pub links: Vec<String>,
    pub photo: Option<PhotoRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeView {
    pub style: StyleView,
    pub header: HeaderView,
    pub sections: Vec<SectionView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SectionView {
    Summary { text: String },
    Experience { items: Vec<ExperienceView> },
    Education { items: Vec<EducationView> },
    Skills { groups: Vec<SkillGroup> },
    Projects { items: Vec<ProjectView> },
    Certifications { items: Vec<CertificationView> },
    Achievements { items: Vec<AchievementView> },
    Languages { items: Vec<LanguageView> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceView {
    pub id: EntryId,
    pub position: String,
    pub company: String,
    pub location: String,
    pub date_range: String,
    pub description_lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationView {
    pub id: EntryId,
    pub degree: String,
    pub institution: String,
    pub location: String,
    pub graduation: String,
    pub cgpa: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub id: EntryId,
    pub name: String,
    pub description: String,
    pub technologies: String,
    pub link: String,
    pub date_range: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificationView {
    pub id: EntryId,
    pub name: String,
    pub issuer: String,
    pub issued: String,
    pub expires: String,
    pub credential_id: String,
    pub credential_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementView {
    pub id: EntryId,
    pub title: String,
    pub organization: String,
    pub date: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageView {
    pub id: EntryId,
    pub name: String,
    pub proficiency: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Render
// ────────────────────────────────────────────────────────────────────────────

fn non_empty<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.as_ref().trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Renders a snapshot. Equal inputs always produce equal presentations.
pub fn render(state: &BuilderState) -> Presentation {
    let doc = &state.resume_data;
    if doc.is_blank() {
        return Presentation::Empty;
    }

    let info = &doc.personal_info;
    let header = HeaderView {
        full_name: info.full_name(),
        contact: non_empty(&[&info.email, &info.phone, &info.location]),
        links: non_empty(&[&info.linkedin, &info.website]),
        photo: info.photo.clone(),
    };

    let mut sections = Vec::new();
    for key in &state.customization.section_order {
        let section = match key {
            SectionKey::PersonalInfo => continue,
            SectionKey::Summary => {
                let text = info.summary.trim();
                if text.is_empty() {
                    continue;
                }
                SectionView::Summary {
                    text: text.to_string(),
                }
            }
            SectionKey::Experience if !doc.experience.is_empty() => SectionView::Experience {
                items: doc
                    .experience
                    .iter()
                    .map(|e| ExperienceView {
                        id: e.id,
                        position: e.position.clone(),
                        company: e.company.clone(),
                        location: e.location.clone(),
                        date_range: dates::format_range(&e.start_date, &e.end_date, e.current),
                        description_lines: e
                            .description
                            .lines()
                            .map(|l| l.trim().to_string())
                            .filter(|l| !l.is_empty())
                            .collect(),
                    })
                    .collect(),
            },
            SectionKey::Education if !doc.education.is_empty() => SectionView::Education {
                items: doc
                    .education
                    .iter()
                    .map(|e| EducationView {
                        id: e.id,
                        degree: e.degree.clone(),
                        institution: e.institution.clone(),
                        location: e.location.clone(),
                        graduation: dates::format_month(&e.graduation_date),
                        cgpa: e.cgpa.trim().to_string(),
                        description: e.description.clone(),
                    })
                    .collect(),
            },
            SectionKey::Skills if !doc.skills.is_empty() => SectionView::Skills {
                groups: group_by_category(&doc.skills),
            },
            SectionKey::Projects if !doc.projects.is_empty() => SectionView::Projects {
                items: doc
                    .projects
                    .iter()
                    .map(|p| ProjectView {
                        id: p.id,
                        name: p.name.clone(),
                        description: p.description.clone(),
                        technologies: p.technologies.clone(),
                        link: p.link.clone(),
                        date_range: dates::format_range(&p.start_date, &p.end_date, false),
                    })
                    .collect(),
            },
            SectionKey::Certifications if !doc.certifications.is_empty() => {
                SectionView::Certifications {
                    items: doc
                        .certifications
                        .iter()
                        .map(|c| CertificationView {
                            id: c.id,
                            name: c.name.clone(),
                            issuer: c.issuer.clone(),
                            issued: dates::format_month(&c.date),
                            expires: dates::format_month(&c.expiration_date),
                            credential_id: c.credential_id.clone(),
                            credential_url: c.credential_url.clone(),
                        })
                        .collect(),
                }
            }
            SectionKey::Achievements if !doc.achievements.is_empty() => {
                SectionView::Achievements {
                    items: doc
                        .achievements
                        .iter()
                        .map(|a| AchievementView {
                            id: a.id,
                            title: a.title.clone(),
                            organization: a.organization.clone(),
                            date: dates::format_month(&a.date),
                            description: a.description.clone(),
                        })
                        .collect(),
                }
            }
            SectionKey::Languages if !doc.languages.is_empty() => SectionView::Languages {
                items: doc
                    .languages
                    .iter()
                    .map(|l| LanguageView {
                        id: l.id,
                        name: l.name.clone(),
                        proficiency: l.proficiency.clone(),
                    })
                    .collect(),
            },
            _ => continue,
        };
        sections.push(section);
    }

    Presentation::Populated(ResumeView {
        style: StyleView {
            template: state.selected_template,
            font_family: state.customization.font_family,
            color_theme: state.customization.color_theme,
        },
        header,
        sections,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Flattening for export
// ────────────────────────────────────────────────────────────────────────────

fn joined<S: AsRef<str>>(parts: &[S], separator: &str) -> String {
    non_empty(parts).join(separator)
}

impl SectionView {
    pub fn heading(&self) -> &'static str {
        let section = match self {
            SectionView::Summary { .. } => return "Summary",
            SectionView::Experience { .. } => Section::Experience,
            SectionView::Education { .. } => Section::Education,
            SectionView::Skills { .. } => Section::Skills,
            SectionView::Projects { .. } => Section::Projects,
            SectionView::Certifications { .. } => Section::Certifications,
            SectionView::Achievements { .. } => Section::Achievements,
            SectionView::Languages { .. } => Section::Languages,
        };
        section.heading()
    }
}

impl ResumeView {
    /// Flattens the view into styled text lines, top to bottom.
    pub fn to_lines(&self) -> Vec<StyledLine> {
        let mut out = Vec::new();
        let push = |out: &mut Vec<StyledLine>, style: LineStyle, text: String| {
            if !text.trim().is_empty() {
                out.push(StyledLine::new(style, text));
            }
        };

        push(&mut out, LineStyle::Title, self.header.full_name.clone());
        push(&mut out, LineStyle::Meta, self.header.contact.join("  |  "));
        push(&mut out, LineStyle::Meta, self.header.links.join("  |  "));

        for section in &self.sections {
            push(&mut out, LineStyle::Heading, section.heading().to_string());
            match section {
                SectionView::Summary { text } => {
                    push(&mut out, LineStyle::Body, text.clone());
                }
                SectionView::Experience { items } => {
                    for item in items {
                        push(
                            &mut out,
                            LineStyle::Subheading,
                            joined(&[&item.position, &item.company], " - "),
                        );
                        push(
                            &mut out,
                            LineStyle::Meta,
                            joined(&[&item.date_range, &item.location], "  |  "),
                        );
                        for line in &item.description_lines {
                            push(&mut out, LineStyle::Body, line.clone());
                        }
                    }
                }
                SectionView::Education { items } => {
                    for item in items {
                        push(
                            &mut out,
                            LineStyle::Subheading,
                            joined(&[&item.degree, &item.institution], " - "),
                        );
                        let cgpa = if item.cgpa.is_empty() {
                            String::new()
                        } else {
                            format!("CGPA: {}", item.cgpa)
                        };
                        push(
                            &mut out,
                            LineStyle::Meta,
                            joined(&[&item.graduation, &item.location, &cgpa], "  |  "),
                        );
                        push(&mut out, LineStyle::Body, item.description.clone());
                    }
                }
                SectionView::Skills { groups } => {
                    for group in groups {
                        let names: Vec<String> = group
                            .skills
                            .iter()
                            .map(|s| format!("{} ({}/{})", s.name, s.weight, skills::MAX_PROFICIENCY))
                            .collect();
                        push(
                            &mut out,
                            LineStyle::Body,
                            format!("{}: {}", group.category, names.join(", ")),
                        );
                    }
                }
                SectionView::Projects { items } => {
                    for item in items {
                        push(&mut out, LineStyle::Subheading, item.name.clone());
                        push(
                            &mut out,
                            LineStyle::Meta,
                            joined(&[&item.date_range, &item.technologies, &item.link], "  |  "),
                        );
                        push(&mut out, LineStyle::Body, item.description.clone());
                    }
                }
                SectionView::Certifications { items } => {
                    for item in items {
                        push(
                            &mut out,
                            LineStyle::Subheading,
                            joined(&[&item.name, &item.issuer], " - "),
                        );
                        let issued = if item.issued.is_empty() {
                            String::new()
                        } else {
                            format!("Issued: {}", item.issued)
                        };
                        let expires = if item.expires.is_empty() {
                            String::new()
                        } else {
                            format!("Expires: {}", item.expires)
                        };
                        push(
                            &mut out,
                            LineStyle::Meta,
                            joined(&[&issued, &expires, &item.credential_id, &item.credential_url], "  |  "),
                        );
                    }
                }
                SectionView::Achievements { items } => {
                    for item in items {
                        push(&mut out, LineStyle::Subheading, item.title.clone());
                        push(
                            &mut out,
                            LineStyle::Meta,
                            joined(&[&item.organization, &item.date], "  |  "),
                        );
                        push(&mut out, LineStyle::Body, item.description.clone());
                    }
                }
                SectionView::Languages { items } => {
                    let names: Vec<String> = items
                        .iter()
                        .map(|l| {
                            if l.proficiency.trim().is_empty() {
                                l.name.clone()
                            } else {
                                format!("{} ({})", l.name, l.proficiency)
                            }
                        })
                        .collect();
                    push(&mut out, LineStyle::Body, names.join(", "));
                }
            }
        }
        out
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
