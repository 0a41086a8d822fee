//! Derived skill views: category grouping and proficiency weights.
//! Nothing here is stored; it is recomputed from the skills sequence on every render.

use serde::Serialize;

use crate::models::{EntryId, Skill};

pub const DEFAULT_CATEGORY: &str = "Technical";
pub const MAX_PROFICIENCY: u8 = 4;

/// Maps a level name onto 1..=4. Unknown or empty levels weigh 2, like Intermediate.
pub fn proficiency_weight(level: &str) -> u8 {
    match level.trim().to_ascii_lowercase().as_str() {
        "beginner" => 1,
        "intermediate" => 2,
        "advanced" => 3,
        "expert" => 4,
        _ => 2,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillView {
    pub id: EntryId,
    pub name: String,
    pub level: String,
    pub weight: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillGroup {
    pub category: String,
    pub skills: Vec<SkillView>,
}

fn category_of(skill: &Skill) -> &str {
    let category = skill.category.trim();
    if category.is_empty() {
        DEFAULT_CATEGORY
    } else {
        category
    }
}

/// Groups skills by category. Groups appear in the order their category is
/// first seen; skills keep their sequence order inside a group.
pub fn group_by_category(skills: &[Skill]) -> Vec<SkillGroup> {
    let mut groups: Vec<SkillGroup> = Vec::new();
    for skill in skills {
        let category = category_of(skill);
        let view = SkillView {
            id: skill.id,
            name: skill.name.clone(),
            level: skill.level.clone(),
            weight: proficiency_weight(&skill.level),
        };
        match groups.iter_mut().find(|g| g.category == category) {
            Some(group) => group.skills.push(view),
            None => groups.push(SkillGroup {
                category: category.to_string(),
                skills: vec![view],
            }),
        }
    }
    groups
}

/// Flattens groups back into a skill sequence (group order, then member order).
pub fn flatten_groups(groups: &[SkillGroup]) -> Vec<Skill> {
    groups
        .iter()
        .flat_map(|group| {
            group.skills.iter().map(move |view| Skill {
                id: view.id,
                name: view.name.clone(),
                level: view.level.clone(),
                category: group.category.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(name: &str, category: &str, level: &str) -> Skill {
        Skill {
            id: EntryId::generate(),
            name: name.to_string(),
            level: level.to_string(),
            category: category.to_string(),
        }
    }

    #[test]
    fn test_weights_for_known_levels() {
        assert_eq!(proficiency_weight("Beginner"), 1);
        assert_eq!(proficiency_weight("Intermediate"), 2);
        assert_eq!(proficiency_weight("Advanced"), 3);
        assert_eq!(proficiency_weight("Expert"), 4);
        assert_eq!(proficiency_weight(" expert "), 4);
    }

    #[test]
    fn test_unknown_level_defaults_to_two() {
        assert_eq!(proficiency_weight(""), 2);
        assert_eq!(proficiency_weight("Wizard"), 2);
    }

    #[test]
    fn test_two_categories_two_groups() {
        let skills = vec![
            skill("Go", "Technical", "Advanced"),
            skill("Spanish", "Languages", "Intermediate"),
        ];
        let groups = group_by_category(&skills);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, "Technical");
        assert_eq!(groups[0].skills.len(), 1);
        assert_eq!(groups[1].category, "Languages");
        assert_eq!(groups[1].skills.len(), 1);
    }

    #[test]
    fn test_groups_follow_first_seen_order() {
        let skills = vec![
            skill("Figma", "Tools", ""),
            skill("Rust", "Technical", ""),
            skill("Docker", "Tools", ""),
        ];
        let groups = group_by_category(&skills);
        assert_eq!(groups[0].category, "Tools");
        let names: Vec<_> = groups[0].skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Figma", "Docker"]);
    }

    #[test]
    fn test_empty_category_reads_as_technical() {
        let groups = group_by_category(&[skill("SQL", "", "Expert")]);
        assert_eq!(groups[0].category, DEFAULT_CATEGORY);
    }

    #[test]
    fn test_regrouping_flattened_groups_is_stable() {
        let skills = vec![
            skill("A", "X", "Beginner"),
            skill("B", "Y", "Expert"),
            skill("C", "X", "Advanced"),
            skill("D", "", "Intermediate"),
            skill("E", "Y", "nonsense"),
        ];
        let once = group_by_category(&skills);
        let twice = group_by_category(&flatten_groups(&once));
        assert_eq!(once, twice);
    }
}
