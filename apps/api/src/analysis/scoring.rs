//! Score Aggregator — folds matcher, recommender and estimator output into
//! one `AnalysisResult`.

use serde::{Deserialize, Serialize};

use crate::analysis::experience::ExperienceLevel;
use crate::analysis::gaps::SkillGap;
use crate::analysis::matcher::FoundSkill;

/// Characters (not bytes) of raw text kept as a preview.
pub const PREVIEW_CHARS: usize = 1000;

const POINTS_PER_SKILL: u32 = 10;
const MAX_SKILL_SCORE: u32 = 100;
const SKILL_WEIGHT: f64 = 0.6;
const POINTS_PER_GAP: f64 = 5.0;

/// The sole output of a resume analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub truncated_text: String,
    pub found_skills: Vec<FoundSkill>,
    pub gaps: Vec<SkillGap>,
    pub experience_level: ExperienceLevel,
    /// 0–100.
    pub skill_score: u32,
    /// Not clamped on its own; bounded in practice by 60 + 5 * MAX_GAPS.
    pub total_score: f64,
}

/// `min(100, 10 * skill_count)`.
pub fn skill_score(skill_count: usize) -> u32 {
    let raw = u32::try_from(skill_count)
        .unwrap_or(u32::MAX)
        .saturating_mul(POINTS_PER_SKILL);
    raw.min(MAX_SKILL_SCORE)
}

/// `0.6 * skill_score + 5 * gap_count`.
pub fn total_score(skill_score: u32, gap_count: usize) -> f64 {
    SKILL_WEIGHT * f64::from(skill_score) + POINTS_PER_GAP * gap_count as f64
}

/// First `PREVIEW_CHARS` characters of `raw_text`.
pub fn truncate_preview(raw_text: &str) -> String {
    raw_text.chars().take(PREVIEW_CHARS).collect()
}

pub fn aggregate(
    raw_text: &str,
    found_skills: Vec<FoundSkill>,
    gaps: Vec<SkillGap>,
    experience_level: ExperienceLevel,
) -> AnalysisResult {
    let skill_score = skill_score(found_skills.len());
    let total_score = total_score(skill_score, gaps.len());

    AnalysisResult {
        truncated_text: truncate_preview(raw_text),
        found_skills,
        gaps,
        experience_level,
        skill_score,
        total_score,
    }
}
