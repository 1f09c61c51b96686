use once_cell::sync::Lazy;
use regex::Regex;

use super::models::JobInsight;
use super::prompt::{
    CHANGES_MADE_MARKER, CONFIDENCE_SCORE_MARKER, OPTIMIZED_RESUME_MARKER, RESPONSE_MARKERS,
    SUGGESTIONS_MARKER,
};

static DECIMAL_SCORE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"0\.\d+|1\.0").unwrap());
static PERCENT_SCORE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)%").unwrap());

const DEFAULT_CONFIDENCE: f64 = 0.5;
const LIST_PREFIX_CHARS: &[char] = &['•', '-', '*', '.', ' ', '\t'];
const INSIGHT_KEYWORDS: [&str; 6] = [
    "key skills",
    "experience",
    "industry",
    "salary",
    "growth",
    "culture",
];

/// The model's answer split into its marked sections.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResponse {
    pub optimized_resume: String,
    pub changes_made: Vec<String>,
    pub suggestions: Vec<String>,
    pub confidence_score: f64,
}

pub fn parse_optimization_response(text: &str, original_resume: &str) -> OptimizationResponse {
    let optimized = extract_section(text, OPTIMIZED_RESUME_MARKER);
    let optimized_resume = if optimized.is_empty() {
        original_resume.to_string()
    } else {
        optimized
    };

    OptimizationResponse {
        optimized_resume,
        changes_made: parse_list(&extract_section(text, CHANGES_MADE_MARKER)),
        suggestions: parse_list(&extract_section(text, SUGGESTIONS_MARKER)),
        confidence_score: parse_confidence_score(&extract_section(text, CONFIDENCE_SCORE_MARKER)),
    }
}

/// Lines after the first line containing `header`, up to the next line containing any marker.
pub fn extract_section(text: &str, header: &str) -> String {
    let mut lines = text.lines();
    if lines.by_ref().find(|line| line.contains(header)).is_none() {
        return String::new();
    }

    lines
        .take_while(|line| !RESPONSE_MARKERS.iter().any(|marker| line.contains(marker)))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

pub fn parse_list(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(|c: char| c.is_ascii_digit() || LIST_PREFIX_CHARS.contains(&c))
        })
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_confidence_score(text: &str) -> f64 {
    let score = if let Some(found) = DECIMAL_SCORE_RE.find(text) {
        found.as_str().parse::<f64>().unwrap_or(DEFAULT_CONFIDENCE)
    } else if let Some(captures) = PERCENT_SCORE_RE.captures(text) {
        captures[1]
            .parse::<f64>()
            .map(|percent| percent / 100.0)
            .unwrap_or(DEFAULT_CONFIDENCE)
    } else {
        DEFAULT_CONFIDENCE
    };

    score.clamp(0.0, 1.0)
}

/// Groups non-empty lines under the most recent line naming one of the insight topics.
/// Headings with no body are dropped.
pub fn parse_insights(text: &str) -> Vec<JobInsight> {
    let mut insights = Vec::new();
    let mut heading: Option<String> = None;
    let mut body: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let lowered = line.to_lowercase();
        if INSIGHT_KEYWORDS
            .iter()
            .any(|keyword| lowered.contains(keyword))
        {
            flush_insight(&mut insights, heading.take(), &mut body);
            heading = Some(line.to_string());
        } else if heading.is_some() {
            body.push(line);
        }
    }
    flush_insight(&mut insights, heading, &mut body);

    insights
}

fn flush_insight(insights: &mut Vec<JobInsight>, heading: Option<String>, body: &mut Vec<&str>) {
    if let Some(heading) = heading {
        if !body.is_empty() {
            insights.push(JobInsight {
                heading,
                content: body.join("\n"),
            });
        }
    }
    body.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = "Sure, here is the result.\n\
        OPTIMIZED_RESUME:\n\
        Jane Smith\n\
        Platform Engineer with Kubernetes focus\n\
        \n\
        CHANGES_MADE:\n\
        - Reworded summary\n\
        2. Added Kubernetes keyword\n\
        \n\
        SUGGESTIONS:\n\
        • Quantify the billing migration\n\
        CONFIDENCE_SCORE:\n\
        0.85\n";

    #[test]
    fn response_sections_are_split_on_markers() {
        let parsed = parse_optimization_response(RESPONSE, "original");
        assert_eq!(
            parsed.optimized_resume,
            "Jane Smith\nPlatform Engineer with Kubernetes focus"
        );
        assert_eq!(
            parsed.changes_made,
            vec!["Reworded summary", "Added Kubernetes keyword"]
        );
        assert_eq!(parsed.suggestions, vec!["Quantify the billing migration"]);
        assert!((parsed.confidence_score - 0.85).abs() < 1e-9);
    }

    #[test]
    fn missing_resume_section_falls_back_to_original() {
        let parsed = parse_optimization_response("CHANGES_MADE:\n- nothing", "original text");
        assert_eq!(parsed.optimized_resume, "original text");
        assert!(parsed.suggestions.is_empty());
        assert!((parsed.confidence_score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn confidence_accepts_decimals_and_percentages() {
        assert!((parse_confidence_score("about 0.72 overall") - 0.72).abs() < 1e-9);
        assert!((parse_confidence_score("1.0") - 1.0).abs() < 1e-9);
        assert!((parse_confidence_score("85%") - 0.85).abs() < 1e-9);
        assert!((parse_confidence_score("250%") - 1.0).abs() < 1e-9);
        assert!((parse_confidence_score("high") - 0.5).abs() < 1e-9);
        assert!((parse_confidence_score("") - 0.5).abs() < 1e-9);
    }

    #[test]
    fn list_items_lose_bullets_and_numbering() {
        assert_eq!(
            parse_list("  * first\n\n10. second\n-- third\n   "),
            vec!["first", "second", "third"]
        );
    }

    #[test]
    fn insights_group_lines_under_topic_headings() {
        let text = "Intro line without a heading\n\
            ## Key Skills Required\n\
            Rust, Kubernetes\n\
            Distributed systems\n\
            ## Salary Range\n\
            ## Growth Opportunities\n\
            Path to staff engineer\n";
        let insights = parse_insights(text);

        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].heading, "## Key Skills Required");
        assert_eq!(insights[0].content, "Rust, Kubernetes\nDistributed systems");
        assert_eq!(insights[1].heading, "## Growth Opportunities");
    }
}
