//! Gap Recommender — recommended skills the resume does not mention.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::analysis::matcher::FoundSkill;
use crate::analysis::taxonomy::SkillCategory;

/// Hard cap on recommendations, applied in iteration order.
pub const MAX_GAPS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Demand {
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GapPriority {
    Critical,
    Important,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillGap {
    pub name: String,
    pub demand: Demand,
    pub priority: GapPriority,
}

/// Per-category recommended skills, independent of the taxonomy table.
#[derive(Debug, Clone)]
pub struct RecommendationTable {
    categories: Vec<(SkillCategory, Vec<String>)>,
}

impl RecommendationTable {
    pub fn builtin() -> Self {
        let table: [(SkillCategory, &[&str]); 5] = [
            (
                SkillCategory::Frontend,
                &["TypeScript", "React", "Vue.js", "Tailwind CSS"],
            ),
            (
                SkillCategory::Backend,
                &["Node.js", "PostgreSQL", "Redis", "API Design"],
            ),
            (
                SkillCategory::DevOps,
                &["Docker", "Kubernetes", "AWS", "CI/CD"],
            ),
            (
                SkillCategory::DataScience,
                &["Machine Learning", "TensorFlow", "Data Visualization"],
            ),
            (
                SkillCategory::Mobile,
                &["React Native", "Flutter", "Mobile Performance"],
            ),
        ];
        Self::new(
            table
                .into_iter()
                .map(|(category, skills)| {
                    (category, skills.iter().map(|s| s.to_string()).collect())
                })
                .collect(),
        )
    }

    pub fn new(categories: Vec<(SkillCategory, Vec<String>)>) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &[(SkillCategory, Vec<String>)] {
        &self.categories
    }
}

/// Backend and DevOps gaps block more roles than the rest.
fn priority_for(category: SkillCategory) -> GapPriority {
    match category {
        SkillCategory::Backend | SkillCategory::DevOps => GapPriority::Critical,
        _ => GapPriority::Important,
    }
}

/// Walks the table in declaration order and returns the first `MAX_GAPS`
/// recommended skills whose name (case-insensitive) was not found.
pub fn recommend_gaps(found: &[FoundSkill], table: &RecommendationTable) -> Vec<SkillGap> {
    let found_names: HashSet<String> = found.iter().map(|s| s.name.to_lowercase()).collect();

    table
        .categories()
        .iter()
        .flat_map(|(category, skills)| skills.iter().map(move |skill| (*category, skill)))
        .filter(|(_, skill)| !found_names.contains(&skill.to_lowercase()))
        .take(MAX_GAPS)
        .map(|(category, skill)| SkillGap {
            name: skill.clone(),
            demand: Demand::High,
            priority: priority_for(category),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::matcher::MATCH_CONFIDENCE;

    fn found(names: &[(&str, SkillCategory)]) -> Vec<FoundSkill> {
        names
            .iter()
            .map(|(name, category)| FoundSkill {
                name: name.to_string(),
                category: *category,
                confidence: MATCH_CONFIDENCE,
            })
            .collect()
    }

    fn gap_names(gaps: &[SkillGap]) -> Vec<&str> {
        gaps.iter().map(|g| g.name.as_str()).collect()
    }

    #[test]
    fn test_nothing_found_takes_first_five_in_order() {
        let gaps = recommend_gaps(&[], &RecommendationTable::builtin());
        assert_eq!(
            gap_names(&gaps),
            vec!["TypeScript", "React", "Vue.js", "Tailwind CSS", "Node.js"]
        );
        assert!(gaps[..4].iter().all(|g| g.priority == GapPriority::Important));
        assert_eq!(gaps[4].priority, GapPriority::Critical);
        assert!(gaps.iter().all(|g| g.demand == Demand::High));
    }

    #[test]
    fn test_found_names_are_skipped_case_insensitively() {
        let skills = found(&[
            ("Typescript", SkillCategory::FullStackHint),
            ("React", SkillCategory::Frontend),
        ]);
        let gaps = recommend_gaps(&skills, &RecommendationTable::builtin());
        assert_eq!(
            gap_names(&gaps),
            vec!["Vue.js", "Tailwind CSS", "Node.js", "PostgreSQL", "Redis"]
        );
    }

    #[test]
    fn test_devops_gaps_are_critical() {
        let table = RecommendationTable::new(vec![
            (SkillCategory::DevOps, vec!["Docker".to_string()]),
            (SkillCategory::Mobile, vec!["Flutter".to_string()]),
        ]);
        let gaps = recommend_gaps(&[], &table);
        assert_eq!(gaps[0].priority, GapPriority::Critical);
        assert_eq!(gaps[1].priority, GapPriority::Important);
    }

    #[test]
    fn test_never_more_than_five() {
        let table = RecommendationTable::new(vec![(
            SkillCategory::Backend,
            (0..20).map(|i| format!("Skill {i}")).collect(),
        )]);
        assert_eq!(recommend_gaps(&[], &table).len(), MAX_GAPS);
    }

    #[test]
    fn test_everything_found_yields_no_gaps() {
        let table = RecommendationTable::builtin();
        let all: Vec<FoundSkill> = table
            .categories()
            .iter()
            .flat_map(|(category, skills)| {
                skills.iter().map(move |s| FoundSkill {
                    name: s.to_uppercase(),
                    category: *category,
                    confidence: MATCH_CONFIDENCE,
                })
            })
            .collect();
        assert!(recommend_gaps(&all, &table).is_empty());
    }
}
