use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SkillRow {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSkillRow {
    pub user_id: Uuid,
    pub skill_id: Uuid,
    pub proficiency_level: String,
    pub years_of_experience: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Proficiency recorded on a user's skill profile, ordered lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProficiencyLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl ProficiencyLevel {
    /// Maps a 0–100 match confidence onto a proficiency bucket.
    pub fn from_confidence(confidence: u8) -> Self {
        match confidence {
            90.. => ProficiencyLevel::Expert,
            70..=89 => ProficiencyLevel::Advanced,
            50..=69 => ProficiencyLevel::Intermediate,
            _ => ProficiencyLevel::Beginner,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProficiencyLevel::Beginner => "beginner",
            ProficiencyLevel::Intermediate => "intermediate",
            ProficiencyLevel::Advanced => "advanced",
            ProficiencyLevel::Expert => "expert",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "beginner" => Some(ProficiencyLevel::Beginner),
            "intermediate" => Some(ProficiencyLevel::Intermediate),
            "advanced" => Some(ProficiencyLevel::Advanced),
            "expert" => Some(ProficiencyLevel::Expert),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_buckets() {
        assert_eq!(ProficiencyLevel::from_confidence(95), ProficiencyLevel::Expert);
        assert_eq!(ProficiencyLevel::from_confidence(85), ProficiencyLevel::Advanced);
        assert_eq!(ProficiencyLevel::from_confidence(50), ProficiencyLevel::Intermediate);
        assert_eq!(ProficiencyLevel::from_confidence(10), ProficiencyLevel::Beginner);
    }

    #[test]
    fn test_levels_are_ordered_for_upgrades() {
        assert!(ProficiencyLevel::Expert > ProficiencyLevel::Advanced);
        assert!(ProficiencyLevel::Beginner < ProficiencyLevel::Intermediate);
    }

    #[test]
    fn test_parse_round_trips_labels() {
        for level in [
            ProficiencyLevel::Beginner,
            ProficiencyLevel::Intermediate,
            ProficiencyLevel::Advanced,
            ProficiencyLevel::Expert,
        ] {
            assert_eq!(ProficiencyLevel::parse(level.as_str()), Some(level));
        }
        assert_eq!(ProficiencyLevel::parse("guru"), None);
    }
}
