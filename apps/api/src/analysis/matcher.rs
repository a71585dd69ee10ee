//! Skill Matcher — plain substring search of taxonomy keys in resume text.
//!
//! Matching is NOT word-boundary aware: "java" hits inside "javascript" and
//! "go" hits inside "google". Known false-positive source, kept for
//! compatibility with stored analyses.

use serde::{Deserialize, Serialize};

use crate::analysis::taxonomy::{SkillCategory, SkillTaxonomy};

/// Fixed placeholder confidence attached to every match.
pub const MATCH_CONFIDENCE: u8 = 85;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundSkill {
    /// Taxonomy key in title case ("machine learning" → "Machine Learning").
    pub name: String,
    pub category: SkillCategory,
    pub confidence: u8,
}

/// Returns one `FoundSkill` per taxonomy key contained in `text_lower`,
/// in taxonomy order.
///
/// `text_lower` must already be lower-cased; keys are lowercase by
/// construction of `SkillTaxonomy`.
pub fn match_skills(text_lower: &str, taxonomy: &SkillTaxonomy) -> Vec<FoundSkill> {
    taxonomy
        .entries()
        .iter()
        .filter(|entry| text_lower.contains(entry.canonical_key.as_str()))
        .map(|entry| FoundSkill {
            name: title_case(&entry.canonical_key),
            category: entry.category,
            confidence: MATCH_CONFIDENCE,
        })
        .collect()
}

/// Uppercases the first letter of every alphabetic run and lowercases the
/// rest: "scikit-learn" → "Scikit-Learn".
pub fn title_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut prev_alpha = false;
    for c in key.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::taxonomy::SkillTaxonomyEntry;

    fn names(found: &[FoundSkill]) -> Vec<&str> {
        found.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("python"), "Python");
        assert_eq!(title_case("machine learning"), "Machine Learning");
        assert_eq!(title_case("scikit-learn"), "Scikit-Learn");
        assert_eq!(title_case("react native"), "React Native");
        assert_eq!(title_case("c3po"), "C3Po");
    }

    #[test]
    fn test_order_follows_taxonomy_not_text() {
        let taxonomy = SkillTaxonomy::builtin();
        let found = match_skills("docker, then react, then python", &taxonomy);
        assert_eq!(names(&found), vec!["Python", "React", "Docker"]);
    }

    #[test]
    fn test_repeated_key_reported_once() {
        let taxonomy = SkillTaxonomy::builtin();
        let found = match_skills("flask flask flask and more flask", &taxonomy);
        assert_eq!(
            found.iter().filter(|s| s.name == "Flask").count(),
            1,
            "found: {:?}",
            names(&found)
        );
    }

    #[test]
    fn test_substring_hits_inside_longer_words() {
        let taxonomy = SkillTaxonomy::builtin();
        let found = match_skills("javascript", &taxonomy);
        // "java" is a prefix of "javascript"
        assert_eq!(names(&found), vec!["Javascript", "Java"]);
    }

    #[test]
    fn test_multi_word_keys_match_with_spaces() {
        let taxonomy = SkillTaxonomy::builtin();
        let found = match_skills("built apps in react native with machine learning", &taxonomy);
        let found_names = names(&found);
        assert!(found_names.contains(&"Machine Learning"));
        assert!(found_names.contains(&"React Native"));
        // "react" itself is also a substring
        assert!(found_names.contains(&"React"));

        let split = match_skills("machine\nlearning", &taxonomy);
        assert!(!names(&split).contains(&"Machine Learning"));
    }

    #[test]
    fn test_category_and_confidence() {
        let taxonomy = SkillTaxonomy::builtin();
        let found = match_skills("kubernetes", &taxonomy);
        assert_eq!(
            found,
            vec![FoundSkill {
                name: "Kubernetes".to_string(),
                category: SkillCategory::DevOps,
                confidence: 85,
            }]
        );
    }

    #[test]
    fn test_no_matches_is_empty() {
        let taxonomy = SkillTaxonomy::builtin();
        assert!(match_skills("barista with a love of latte art", &taxonomy).is_empty());
    }

    #[test]
    fn test_substitute_taxonomy() {
        let taxonomy = SkillTaxonomy::from_entries(vec![SkillTaxonomyEntry {
            canonical_key: "haskell".to_string(),
            category: SkillCategory::Backend,
        }])
        .unwrap();
        let found = match_skills("python and haskell", &taxonomy);
        assert_eq!(names(&found), vec!["Haskell"]);
    }
}
