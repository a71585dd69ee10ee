//! Experience Estimator — buckets the first "N years of experience" phrase.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Digits, optional `+`, then year/years/yr/yrs, optional "of", then
/// experience/exp. Whitespace between parts is optional.
static YEARS_OF_EXPERIENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+)\+?\s*(?:years?|yrs?)\s*(?:of\s*)?(?:experience|exp)")
        .expect("experience pattern is valid")
});

static DECIMAL_DIGIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\p{Nd}$").expect("digit pattern is valid"));

/// Coarse seniority bucket. Serialized with the labels stored on resume
/// records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExperienceLevel {
    EntryLevel,
    Junior,
    MidLevel,
    Senior,
}

impl ExperienceLevel {
    pub fn from_years(years: u32) -> Self {
        match years {
            10.. => ExperienceLevel::Senior,
            5..=9 => ExperienceLevel::MidLevel,
            _ => ExperienceLevel::Junior,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::EntryLevel => "entry-level",
            ExperienceLevel::Junior => "junior",
            ExperienceLevel::MidLevel => "mid-level",
            ExperienceLevel::Senior => "senior",
        }
    }
}

/// Classifies by the first match only. No phrase at all means entry level.
pub fn estimate_experience(text_lower: &str) -> ExperienceLevel {
    let Some(caps) = YEARS_OF_EXPERIENCE.captures(text_lower) else {
        return ExperienceLevel::EntryLevel;
    };
    ExperienceLevel::from_years(parse_years(&caps[1]))
}

/// Value of a run of Unicode decimal digits (`\d` is not ASCII-only).
/// Saturates at `u32::MAX` instead of overflowing.
fn parse_years(digits: &str) -> u32 {
    digits
        .chars()
        .fold(0u32, |acc, c| acc.saturating_mul(10).saturating_add(digit_value(c)))
}

/// Every Unicode decimal digit set is a contiguous 0..=9 run, and adjacent
/// sets (the mathematical digit styles) each start at zero, so the distance
/// to the start of the run, mod 10, is the digit's value.
fn digit_value(c: char) -> u32 {
    if let Some(d) = c.to_digit(10) {
        return d;
    }
    let mut offset = 0;
    let mut cp = c as u32;
    while let Some(prev) = cp.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        cp -= 1;
        offset += 1;
    }
    offset % 10
}

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    DECIMAL_DIGIT.is_match(c.encode_utf8(&mut buf))
}
