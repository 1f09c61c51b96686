//! Best-effort structured entries from the experience, education and projects sections.
//!
//! Each section is cut into candidate entries, short candidates are discarded as noise, and
//! every field pattern is tried independently. A pattern miss leaves the field as `""`.

use once_cell::sync::Lazy;
use regex::Regex;

use super::models::{EducationEntry, ExperienceEntry, ProjectEntry, SectionKind};
use super::segmenter::section_body;
use super::skill_extractor::vocabulary_matches;

const MIN_EXPERIENCE_CHARS: usize = 20;
const MIN_EDUCATION_CHARS: usize = 10;
const MIN_PROJECT_CHARS: usize = 15;

static BLANK_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());
static EXPERIENCE_START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][a-z]+.*\d{4}").unwrap());
static PROJECT_START_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][a-z]+.*:").unwrap());

static FIRST_TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([^,\n]+)").unwrap());
static TITLE_AT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+at\s+").unwrap());
static ORGANIZATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bat\s+([^,\n]+)|([^,\n]+)\s*,\s*([^,\n]+)").unwrap());
static DATE_RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{4})\s*[-–]\s*(\d{4}|present|current)").unwrap());

static DEGREE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)((?:[a-z][^,\n]*)?\b(?:degree|bachelor|master|phd|doctorate)[^,\n]*)")
        .unwrap()
});
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").unwrap());

static PROJECT_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([^:\n]+)").unwrap());

pub fn extract_experience(section_text: &str) -> Vec<ExperienceEntry> {
    let body = section_body(SectionKind::Experience, section_text);

    split_entries(body, Some(&*EXPERIENCE_START_RE), MIN_EXPERIENCE_CHARS)
        .into_iter()
        .map(|entry| {
            let (start_date, end_date) = DATE_RANGE_RE
                .captures(entry)
                .map(|captures| (captures[1].to_string(), captures[2].to_string()))
                .unwrap_or_default();

            ExperienceEntry {
                title: title_of(entry),
                company: organization_of(entry),
                start_date,
                end_date,
                description: entry.to_string(),
            }
        })
        .collect()
}

pub fn extract_education(section_text: &str) -> Vec<EducationEntry> {
    let body = section_body(SectionKind::Education, section_text);

    split_entries(body, None, MIN_EDUCATION_CHARS)
        .into_iter()
        .map(|entry| EducationEntry {
            degree: DEGREE_RE
                .captures(entry)
                .map(|captures| captures[1].trim().to_string())
                .unwrap_or_default(),
            institution: organization_of(entry),
            year: YEAR_RE
                .find(entry)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            description: entry.to_string(),
        })
        .collect()
}

pub fn extract_projects(section_text: &str) -> Vec<ProjectEntry> {
    let body = section_body(SectionKind::Projects, section_text);

    split_entries(body, Some(&*PROJECT_START_RE), MIN_PROJECT_CHARS)
        .into_iter()
        .map(|entry| ProjectEntry {
            name: PROJECT_NAME_RE
                .captures(entry)
                .map(|captures| captures[1].trim().to_string())
                .unwrap_or_default(),
            description: entry.to_string(),
            technologies: vocabulary_matches(entry),
        })
        .collect()
}

/// Cuts `text` at blank lines and, when `entry_start` is given, before any non-first line that
/// looks like the heading of a new entry. Returns trimmed candidates of at least `min_chars`.
fn split_entries<'a>(
    text: &'a str,
    entry_start: Option<&Regex>,
    min_chars: usize,
) -> Vec<&'a str> {
    let mut entries = Vec::new();

    for block in BLANK_LINE_RE.split(text) {
        let mut entry_begin = 0;
        let mut offset = 0;

        for line in block.split_inclusive('\n') {
            let starts_entry = offset > 0
                && entry_start
                    .is_some_and(|regex| regex.is_match(line.trim_end_matches(['\n', '\r'])));
            if starts_entry {
                entries.push(&block[entry_begin..offset]);
                entry_begin = offset;
            }
            offset += line.len();
        }
        entries.push(&block[entry_begin..]);
    }

    entries
        .into_iter()
        .map(str::trim)
        .filter(|entry| entry.chars().count() >= min_chars)
        .collect()
}

/// First comma/newline token, cut before a standalone "at" so "Engineer at Acme" yields "Engineer".
fn title_of(entry: &str) -> String {
    let Some(captures) = FIRST_TOKEN_RE.captures(entry) else {
        return String::new();
    };

    let token = &captures[1];
    let title = match TITLE_AT_RE.find(token) {
        Some(m) if m.start() > 0 => &token[..m.start()],
        _ => token,
    };

    title.trim().to_string()
}

/// Text after "at", or else the part before the first comma, whichever appears first.
fn organization_of(entry: &str) -> String {
    ORGANIZATION_RE
        .captures(entry)
        .and_then(|captures| captures.get(1).or_else(|| captures.get(2)))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn experience_entry_fields_are_extracted() {
        let entries =
            extract_experience("Software Engineer at Acme Corp\n2019 - 2022\nBuilt things.");

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.title, "Software Engineer");
        assert!(entry.company.contains("Acme Corp"));
        assert_eq!(entry.start_date, "2019");
        assert_eq!(entry.end_date, "2022");
        assert_eq!(
            entry.description,
            "Software Engineer at Acme Corp\n2019 - 2022\nBuilt things."
        );
    }

    #[test]
    fn heading_line_is_not_mistaken_for_an_entry_title() {
        let entries = extract_experience(
            "Experience\nSoftware Engineer at Acme Corp\n2019 - 2022\nBuilt things.",
        );
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Software Engineer");
    }

    #[test]
    fn entries_split_on_blank_lines_and_dated_headings() {
        let section = "Backend Developer, Globex 2018 – Present\nMaintained billing services.\n\n\
                       Intern at Initech 2016 - 2017\nWrote reports for managers.\n\
                       Contractor for Hooli 2015 - 2016 remote work";
        let entries = extract_experience(section);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].title, "Backend Developer");
        assert_eq!(entries[0].company, "Backend Developer");
        assert_eq!(entries[0].start_date, "2018");
        assert_eq!(entries[0].end_date, "Present");
        assert_eq!(entries[1].title, "Intern");
        assert_eq!(entries[1].company, "Initech 2016 - 2017");
        assert_eq!(entries[2].start_date, "2015");
        assert_eq!(entries[2].end_date, "2016");
    }

    #[test]
    fn short_candidates_are_dropped() {
        let entries = extract_experience("Stray\n\nSenior Engineer at Umbrella\nLed the platform team.");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Senior Engineer");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let entries = extract_experience("freelance consulting for local shops");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].company, "");
        assert_eq!(entries[0].start_date, "");
        assert_eq!(entries[0].end_date, "");
        assert_eq!(entries[0].title, "freelance consulting for local shops");
    }

    #[test]
    fn education_entries_capture_degree_institution_and_year() {
        let entries = extract_education(
            "Education\nBachelor of Science in Physics, State University, 2015\n\nMIT\n\nMaster degree at Tech Institute 2018",
        );

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].degree, "Bachelor of Science in Physics");
        assert_eq!(entries[0].institution, "Bachelor of Science in Physics");
        assert_eq!(entries[0].year, "2015");
        assert_eq!(entries[1].degree, "Master degree at Tech Institute 2018");
        assert_eq!(entries[1].institution, "Tech Institute 2018");
        assert_eq!(entries[1].year, "2018");
    }

    #[test]
    fn project_entries_carry_vocabulary_technologies() {
        let section = "Projects\nShopfront: online store built with React and PostgreSQL\n\
                       Telemetry: pipeline in Rust using Docker and Redis";
        let projects = extract_projects(section);

        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].name, "Shopfront");
        assert_eq!(projects[0].technologies, vec!["react", "sql", "postgresql"]);
        assert_eq!(projects[1].name, "Telemetry");
        assert_eq!(projects[1].technologies, vec!["rust", "redis", "docker"]);
    }

    #[test]
    fn empty_sections_produce_no_entries() {
        assert!(extract_experience("").is_empty());
        assert!(extract_education("").is_empty());
        assert!(extract_projects("").is_empty());
    }
}
