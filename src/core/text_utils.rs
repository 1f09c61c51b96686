use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

use super::models::ResumeAnalysis;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static DISALLOWED_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s.,;:!?\-()]").unwrap());
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").unwrap());
static EMAIL_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
    "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did",
    "will", "would", "could", "should", "may", "might", "must", "can", "this", "that", "these",
    "those",
];

const CONTACT_MARKERS: &[&str] = &["email", "phone", "address", "@", "linkedin", "github"];
const EXPERIENCE_MARKERS: &[&str] = &[
    "experience",
    "work",
    "employment",
    "job",
    "position",
    "role",
];
const EDUCATION_MARKERS: &[&str] = &[
    "education",
    "degree",
    "university",
    "college",
    "bachelor",
    "master",
    "phd",
];
const SKILLS_MARKERS: &[&str] = &["skills", "technical", "programming", "software", "tools"];

/// Collapses whitespace to single spaces and drops symbols other than basic punctuation.
pub fn clean_text(text: &str) -> String {
    let stripped = DISALLOWED_CHARS_RE.replace_all(text, "");
    WHITESPACE_RE
        .replace_all(&stripped, " ")
        .trim()
        .to_string()
}

/// Distinct lowercase words of at least `min_length` characters, stop words removed.
pub fn extract_keywords(text: &str, min_length: usize) -> BTreeSet<String> {
    let lowered = text.to_lowercase();
    WORD_RE
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|word| word.chars().count() >= min_length && !STOP_WORDS.contains(word))
        .map(str::to_string)
        .collect()
}

/// Jaccard overlap of the two texts' keyword sets, in `[0, 1]`.
pub fn calculate_similarity(first: &str, second: &str) -> f64 {
    let left = extract_keywords(first, 3);
    let right = extract_keywords(second, 3);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let intersection = left.intersection(&right).count();
    let union = left.union(&right).count();
    intersection as f64 / union as f64
}

pub fn format_file_size(size_bytes: u64) -> String {
    if size_bytes == 0 {
        return "0 B".to_string();
    }

    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = size_bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    format!("{size:.1} {}", UNITS[unit])
}

pub fn file_hash(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

pub fn validate_email(email: &str) -> bool {
    EMAIL_SHAPE_RE.is_match(email)
}

pub fn validate_phone(phone: &str) -> bool {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    (7..=15).contains(&digits)
}

/// Cuts `text` to at most `max_chars` characters, ending with `suffix` when shortened.
pub fn truncate_text(text: &str, max_chars: usize, suffix: &str) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let keep = max_chars.saturating_sub(suffix.chars().count());
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(suffix);
    truncated
}

/// Coarse completeness check of a resume's raw text.
///
/// More than two issues marks the resume invalid; text under 50 characters is invalid outright.
pub fn validate_resume_content(resume_text: &str) -> ResumeAnalysis {
    let mut analysis = ResumeAnalysis {
        is_valid: true,
        ..ResumeAnalysis::default()
    };

    if resume_text.trim().chars().count() < 50 {
        analysis.is_valid = false;
        analysis.issues.push("Resume content is too short".to_string());
        return analysis;
    }

    analysis.word_count = resume_text.split_whitespace().count();
    if analysis.word_count < 100 {
        analysis
            .issues
            .push("Resume is very short (less than 100 words)".to_string());
    }

    let lowered = resume_text.to_lowercase();
    let mentions = |markers: &[&str]| markers.iter().any(|marker| lowered.contains(marker));

    analysis.has_contact = mentions(CONTACT_MARKERS);
    if !analysis.has_contact {
        analysis
            .issues
            .push("No contact information found".to_string());
    }

    analysis.has_experience = mentions(EXPERIENCE_MARKERS);
    if !analysis.has_experience {
        analysis
            .issues
            .push("No work experience section found".to_string());
    }

    analysis.has_education = mentions(EDUCATION_MARKERS);
    if !analysis.has_education {
        analysis.issues.push("No education section found".to_string());
    }

    analysis.has_skills = mentions(SKILLS_MARKERS);
    if !analysis.has_skills {
        analysis.issues.push("No skills section found".to_string());
    }

    if analysis.issues.len() > 2 {
        analysis.is_valid = false;
    }

    analysis
}
