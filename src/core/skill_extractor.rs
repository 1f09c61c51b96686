use once_cell::sync::Lazy;
use regex::Regex;

use super::models::{SectionKind, SkillSet};
use super::segmenter::section_body;
use super::taxonomy::SKILL_CATEGORIES;

static SKILL_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)[,\n•]|^\s*[-*]\s+|\s[-*]\s").unwrap());

const MIN_PHRASE_CHARS: usize = 2;
const MAX_PHRASE_CHARS: usize = 50;
const SHORT_TERM_CHARS: usize = 2;

/// Vocabulary matches over `full_text` plus free-form phrases mined from the skills section.
pub fn extract_skills(full_text: &str, skills_section: &str) -> SkillSet {
    let mut skills: SkillSet = vocabulary_matches(full_text).into_iter().collect();

    let body = section_body(SectionKind::Skills, skills_section);
    if !body.trim().is_empty() {
        skills.extend(skill_phrases(body));
    }

    skills
}

/// Vocabulary terms present in `text`, in vocabulary iteration order.
///
/// Matching is substring containment ("javascript" also yields "java"). Terms of at most
/// two characters must stand alone, so "go" does not fire on "good". Each category contributes
/// a term at most once; nothing is deduplicated across categories.
pub fn vocabulary_matches(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut found = Vec::new();

    for (_category, terms) in SKILL_CATEGORIES {
        for term in terms {
            if contains_term(&lowered, term) {
                found.push(term.to_string());
            }
        }
    }

    found
}

fn contains_term(haystack: &str, term: &str) -> bool {
    if term.chars().count() > SHORT_TERM_CHARS {
        return haystack.contains(term);
    }

    haystack.match_indices(term).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(|c| c.is_ascii_alphanumeric())
            && !after.is_some_and(|c| c.is_ascii_alphanumeric())
    })
}

fn skill_phrases(body: &str) -> Vec<String> {
    SKILL_SPLIT_RE
        .split(body)
        .map(str::trim)
        .filter(|phrase| {
            let chars = phrase.chars().count();
            chars > MIN_PHRASE_CHARS && chars < MAX_PHRASE_CHARS
        })
        .map(str::to_string)
        .collect()
}
