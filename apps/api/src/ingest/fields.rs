//! Field extractor: heuristic name/email/skill extraction from resume text.
//!
//! No scoring: the email is the first address in the text, the name is the first
//! plausible heading line, and the skill is the first configured skill that
//! appears anywhere. A candidate without both an email and a skill is rejected.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

use crate::models::batch::ExtractedCandidate;
use crate::provisioning::names::{name_from_email, random_name};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

/// Lines made only of single letters, e.g. `J O H N   D O E`.
static SPACED_LETTERS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z](?:\s+[A-Za-z])+$").unwrap());

static WORD_GAP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

const HEADING_STOPWORDS: [&str; 2] = ["resume", "curriculum"];

pub fn extract_email(text: &str) -> Option<String> {
    EMAIL_RE.find(text).map(|m| m.as_str().to_lowercase())
}

/// First non-empty line with at least two words that is not a document heading
/// and does not hold an email address.
pub fn guess_name(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .find(|line| {
            let lower = line.to_lowercase();
            line.split_whitespace().count() >= 2
                && !HEADING_STOPWORDS.iter().any(|w| lower.contains(w))
                && !line.contains('@')
        })
        .map(collapse_spaced_letters)
}

/// Joins letter-spaced headings into words; word breaks are runs of 2+ spaces.
pub fn collapse_spaced_letters(line: &str) -> String {
    if !SPACED_LETTERS_RE.is_match(line) {
        return line.to_string();
    }
    WORD_GAP_RE
        .split(line)
        .map(|word| word.split_whitespace().collect::<String>())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// First skill in priority order that occurs as a substring of the text.
pub fn find_priority_skill(text: &str, skill_priority: &[String]) -> Option<String> {
    let lower = text.to_lowercase();
    skill_priority
        .iter()
        .find(|skill| !skill.is_empty() && lower.contains(skill.to_lowercase().as_str()))
        .map(|skill| skill.to_lowercase())
}

pub fn extract_fields(
    text: &str,
    skill_priority: &[String],
    source_file: &str,
) -> Option<ExtractedCandidate> {
    extract_fields_with_rng(text, skill_priority, source_file, &mut rand::rng())
}

pub fn extract_fields_with_rng<R: Rng + ?Sized>(
    text: &str,
    skill_priority: &[String],
    source_file: &str,
    rng: &mut R,
) -> Option<ExtractedCandidate> {
    if text.trim().is_empty() {
        return None;
    }

    let email = extract_email(text)?;
    let skill = find_priority_skill(text, skill_priority)?;
    let name = guess_name(text)
        .or_else(|| name_from_email(&email))
        .unwrap_or_else(|| random_name(rng));

    Some(ExtractedCandidate {
        name,
        email,
        skills: BTreeSet::from([skill]),
        source_file: source_file.to_string(),
    })
}
