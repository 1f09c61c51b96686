//! Splits raw resume text into contiguous section spans keyed by heading keywords.
//!
//! Heading keywords are matched literally and case-insensitively anywhere in the text, so a
//! body word such as "network" also opens an experience span. That coarseness is accepted:
//! downstream extractors only ever produce best-effort structure.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;

use super::models::{SectionKind, SectionSpan};
use super::taxonomy::SECTION_HEADINGS;

static HEADING_RES: Lazy<Vec<(SectionKind, Regex)>> = Lazy::new(|| {
    SECTION_HEADINGS
        .iter()
        .map(|(kind, keywords)| {
            let pattern = format!(r"(?i)(?:{})\s*:?", alternation(keywords));
            (*kind, Regex::new(&pattern).unwrap())
        })
        .collect()
});

static HEADING_LINE_RES: Lazy<HashMap<SectionKind, Regex>> = Lazy::new(|| {
    SECTION_HEADINGS
        .iter()
        .map(|(kind, keywords)| {
            let pattern = format!(
                r"(?i)^[\s&/:,\-]*(?:(?:{})[\s&/:,\-]*)+$",
                alternation(keywords)
            );
            (*kind, Regex::new(&pattern).unwrap())
        })
        .collect()
});

fn alternation(keywords: &[&str]) -> String {
    keywords
        .iter()
        .map(|keyword| regex::escape(keyword))
        .collect::<Vec<_>>()
        .join("|")
}

/// Returns every section span in document order.
pub fn segment_spans(text: &str) -> Vec<SectionSpan> {
    let mut positions: Vec<(usize, SectionKind)> = Vec::new();
    for (kind, regex) in HEADING_RES.iter() {
        for m in regex.find_iter(text) {
            positions.push((m.start(), *kind));
        }
    }

    // Stable sort keeps taxonomy order among equal offsets; the first kind wins the tie.
    positions.sort_by_key(|(offset, _)| *offset);
    positions.dedup_by_key(|(offset, _)| *offset);

    positions
        .iter()
        .enumerate()
        .map(|(i, (start, kind))| {
            let end = positions
                .get(i + 1)
                .map(|(next, _)| *next)
                .unwrap_or(text.len());
            SectionSpan {
                kind: *kind,
                start: *start,
                end,
            }
        })
        .collect()
}

/// Maps each section kind to the concatenated text of its spans.
/// Kinds without a heading are absent.
pub fn segment(text: &str) -> BTreeMap<SectionKind, String> {
    let mut sections: BTreeMap<SectionKind, String> = BTreeMap::new();
    for span in segment_spans(text) {
        sections
            .entry(span.kind)
            .or_default()
            .push_str(&text[span.start..span.end]);
    }

    sections
}

/// Drops a leading line made only of `kind`'s heading keywords, e.g. "Work Experience:".
pub fn section_body(kind: SectionKind, section_text: &str) -> &str {
    let trimmed = section_text.trim_start();
    let (first_line, rest) = match trimmed.split_once('\n') {
        Some((line, rest)) => (line, rest),
        None => (trimmed, ""),
    };

    match HEADING_LINE_RES.get(&kind) {
        Some(regex) if regex.is_match(first_line.trim_end()) => rest,
        _ => section_text,
    }
}
