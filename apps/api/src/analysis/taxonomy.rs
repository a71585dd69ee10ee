//! Skill taxonomy — the fixed keyword → category table the matcher scans for.
//!
//! Loaded once at startup (built-in or from a JSON file) and shared read-only
//! behind an `Arc`. Entry order is significant: it is the order in which
//! found skills are reported.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillCategory {
    Frontend,
    Backend,
    /// Languages used on both sides of the stack (JavaScript, TypeScript).
    #[serde(rename = "Frontend/Backend")]
    FullStackHint,
    Mobile,
    #[serde(rename = "Data Science")]
    DataScience,
    DevOps,
    #[serde(rename = "Soft Skills")]
    SoftSkills,
}

impl SkillCategory {
    pub fn label(&self) -> &'static str {
        match self {
            SkillCategory::Frontend => "Frontend",
            SkillCategory::Backend => "Backend",
            SkillCategory::FullStackHint => "Frontend/Backend",
            SkillCategory::Mobile => "Mobile",
            SkillCategory::DataScience => "Data Science",
            SkillCategory::DevOps => "DevOps",
            SkillCategory::SoftSkills => "Soft Skills",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillTaxonomyEntry {
    /// Lowercase keyword, may contain spaces ("machine learning").
    #[serde(rename = "key")]
    pub canonical_key: String,
    pub category: SkillCategory,
}

/// Ordered, validated set of taxonomy entries.
#[derive(Debug, Clone)]
pub struct SkillTaxonomy {
    entries: Vec<SkillTaxonomyEntry>,
}

const BUILTIN: &[(&str, SkillCategory)] = {
    use SkillCategory::*;
    &[
        // Programming languages
        ("python", Backend),
        ("javascript", FullStackHint),
        ("typescript", FullStackHint),
        ("java", Backend),
        ("csharp", Backend),
        ("cpp", Backend),
        ("go", Backend),
        ("rust", Backend),
        ("ruby", Backend),
        ("php", Backend),
        // Frontend
        ("react", Frontend),
        ("vue", Frontend),
        ("angular", Frontend),
        ("html", Frontend),
        ("css", Frontend),
        ("tailwind", Frontend),
        ("bootstrap", Frontend),
        ("webpack", Frontend),
        // Backend frameworks
        ("django", Backend),
        ("flask", Backend),
        ("fastapi", Backend),
        ("express", Backend),
        ("spring", Backend),
        ("rails", Backend),
        ("laravel", Backend),
        ("nest", Backend),
        // Databases
        ("sql", Backend),
        ("postgresql", Backend),
        ("mysql", Backend),
        ("mongodb", Backend),
        ("redis", Backend),
        ("firebase", Backend),
        ("elasticsearch", Backend),
        // DevOps
        ("docker", DevOps),
        ("kubernetes", DevOps),
        ("aws", DevOps),
        ("gcp", DevOps),
        ("azure", DevOps),
        ("terraform", DevOps),
        ("jenkins", DevOps),
        ("git", DevOps),
        ("linux", DevOps),
        // Data science
        ("machine learning", DataScience),
        ("tensorflow", DataScience),
        ("pytorch", DataScience),
        ("pandas", DataScience),
        ("numpy", DataScience),
        ("sklearn", DataScience),
        ("scikit-learn", DataScience),
        ("keras", DataScience),
        // Mobile
        ("react native", Mobile),
        ("flutter", Mobile),
        ("swift", Mobile),
        ("kotlin", Mobile),
        ("ios", Mobile),
        ("android", Mobile),
        // Soft skills
        ("communication", SoftSkills),
        ("teamwork", SoftSkills),
        ("leadership", SoftSkills),
        ("project management", SoftSkills),
        ("problem solving", SoftSkills),
    ]
};

impl SkillTaxonomy {
    /// The default table shipped with the service.
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN
                .iter()
                .map(|(key, category)| SkillTaxonomyEntry {
                    canonical_key: key.to_string(),
                    category: *category,
                })
                .collect(),
        }
    }

    /// Validates and wraps an ordered list of entries.
    ///
    /// Keys are trimmed. Empty keys, keys with uppercase characters and
    /// duplicate keys are rejected.
    pub fn from_entries(entries: Vec<SkillTaxonomyEntry>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut validated = Vec::with_capacity(entries.len());

        for mut entry in entries {
            entry.canonical_key = entry.canonical_key.trim().to_string();
            let key = &entry.canonical_key;
            if key.is_empty() {
                bail!("taxonomy contains an empty key");
            }
            if *key != key.to_lowercase() {
                bail!("taxonomy key '{key}' must be lowercase");
            }
            if !seen.insert(key.clone()) {
                bail!("taxonomy key '{key}' is listed more than once");
            }
            validated.push(entry);
        }

        Ok(Self { entries: validated })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: Vec<SkillTaxonomyEntry> =
            serde_json::from_str(json).context("taxonomy must be a JSON array of {key, category}")?;
        Self::from_entries(entries)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read taxonomy file '{}'", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("Invalid taxonomy file '{}'", path.display()))
    }

    pub fn entries(&self) -> &[SkillTaxonomyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_table_is_valid_and_ordered() {
        let builtin = SkillTaxonomy::builtin();
        let revalidated = SkillTaxonomy::from_entries(builtin.entries().to_vec()).unwrap();
        assert_eq!(revalidated.len(), 61);
        assert_eq!(builtin.entries()[0].canonical_key, "python");
        assert_eq!(builtin.entries()[60].canonical_key, "problem solving");
    }

    #[test]
    fn test_category_json_labels() {
        let json = serde_json::to_string(&SkillCategory::FullStackHint).unwrap();
        assert_eq!(json, r#""Frontend/Backend""#);
        let parsed: SkillCategory = serde_json::from_str(r#""Data Science""#).unwrap();
        assert_eq!(parsed, SkillCategory::DataScience);
        assert_eq!(SkillCategory::SoftSkills.label(), "Soft Skills");
    }

    #[test]
    fn test_from_json_preserves_file_order_and_trims() {
        let taxonomy = SkillTaxonomy::from_json_str(
            r#"[
                {"key": " zig ", "category": "Backend"},
                {"key": "svelte", "category": "Frontend"}
            ]"#,
        )
        .unwrap();
        let keys: Vec<_> = taxonomy
            .entries()
            .iter()
            .map(|e| e.canonical_key.as_str())
            .collect();
        assert_eq!(keys, vec!["zig", "svelte"]);
    }

    #[test]
    fn test_rejects_uppercase_empty_and_duplicate_keys() {
        let upper = r#"[{"key": "Python", "category": "Backend"}]"#;
        let empty = r#"[{"key": "  ", "category": "Backend"}]"#;
        let dup = r#"[{"key": "go", "category": "Backend"}, {"key": "go", "category": "DevOps"}]"#;

        assert!(SkillTaxonomy::from_json_str(upper).is_err());
        assert!(SkillTaxonomy::from_json_str(empty).is_err());
        let err = SkillTaxonomy::from_json_str(dup).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_rejects_unknown_category() {
        let json = r#"[{"key": "cobol", "category": "Mainframe"}]"#;
        assert!(SkillTaxonomy::from_json_str(json).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"key": "elixir", "category": "Backend"}}]"#).unwrap();

        let taxonomy = SkillTaxonomy::load(file.path()).unwrap();
        assert_eq!(taxonomy.len(), 1);
        assert_eq!(taxonomy.entries()[0].category, SkillCategory::Backend);
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let err = SkillTaxonomy::load(Path::new("/nonexistent/taxonomy.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/taxonomy.json"));
    }
}
