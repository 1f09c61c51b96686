use tracing::debug;

use super::entry_extractor::{extract_education, extract_experience, extract_projects};
use super::errors::CoreError;
use super::field_extractor::extract_contact;
use super::models::{ParsedResume, RawDocument, SectionKind};
use super::segmenter::segment;
use super::skill_extractor::extract_skills;

/// Decoded text shorter than this (after trimming) carries no usable resume.
pub const MIN_TEXT_CHARS: usize = 50;

/// Runs the full extraction pipeline on decoded text.
///
/// Sections are computed once and every extractor reads from them; a missing section simply
/// yields no entries. The only failure is text too short to be a resume.
pub fn parse_document(raw: RawDocument) -> Result<ParsedResume, CoreError> {
    let length = raw.text.trim().chars().count();
    if length < MIN_TEXT_CHARS {
        return Err(CoreError::EmptyOrTooShortInput { length });
    }

    let sections = segment(&raw.text);
    let section = |kind: SectionKind| sections.get(&kind).map(String::as_str).unwrap_or("");

    let skills = extract_skills(&raw.text, section(SectionKind::Skills));
    let experience = extract_experience(section(SectionKind::Experience));
    let education = extract_education(section(SectionKind::Education));
    let projects = extract_projects(section(SectionKind::Projects));
    let contact = extract_contact(&raw.text);

    debug!(
        file_name = %raw.file_name,
        sections = sections.len(),
        skills = skills.len(),
        experience = experience.len(),
        education = education.len(),
        projects = projects.len(),
        "parsed resume text"
    );

    Ok(ParsedResume {
        raw_text: raw.text,
        sections,
        skills,
        experience,
        education,
        projects,
        contact,
        file_type: raw.file_type,
        file_name: raw.file_name,
    })
}
