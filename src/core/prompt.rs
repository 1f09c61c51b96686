use std::collections::BTreeMap;
use std::fmt::Write;

use super::models::{ContextEntry, JobDescription, OptimizationRequest, ParsedResume};
use super::text_utils::clean_text;

pub const OPTIMIZED_RESUME_MARKER: &str = "OPTIMIZED_RESUME:";
pub const CHANGES_MADE_MARKER: &str = "CHANGES_MADE:";
pub const SUGGESTIONS_MARKER: &str = "SUGGESTIONS:";
pub const CONFIDENCE_SCORE_MARKER: &str = "CONFIDENCE_SCORE:";

pub const RESPONSE_MARKERS: [&str; 4] = [
    OPTIMIZED_RESUME_MARKER,
    CHANGES_MADE_MARKER,
    SUGGESTIONS_MARKER,
    CONFIDENCE_SCORE_MARKER,
];

const NO_CONTEXT: &str = "No additional context provided.";

const SYSTEM_PREAMBLE: &str = "You are an expert resume optimization specialist. Your task is to \
optimize a resume to better match a specific job description while keeping it truthful.

Key principles:
1. Only use information provided in the resume and user context
2. Never fabricate or exaggerate experiences
3. Focus on relevant skills and experiences
4. Use action verbs and quantifiable achievements
5. Match keywords from the job description
6. Maintain professional tone and formatting";

pub fn build_optimization_prompt(request: &OptimizationRequest) -> String {
    let resume = &request.resume;
    let job = &request.job;

    let mut prompt = String::new();
    prompt.push_str(SYSTEM_PREAMBLE);
    prompt.push_str("\n\nProvide your response in the following format:\n");
    let _ = writeln!(prompt, "{OPTIMIZED_RESUME_MARKER}\n[The optimized resume content]\n");
    let _ = writeln!(prompt, "{CHANGES_MADE_MARKER}\n- [List of specific changes made]\n");
    let _ = writeln!(
        prompt,
        "{SUGGESTIONS_MARKER}\n- [Additional suggestions for improvement]\n"
    );
    let _ = writeln!(
        prompt,
        "{CONFIDENCE_SCORE_MARKER}\n[Score from 0.0 to 1.0 indicating confidence in the optimization]\n"
    );

    prompt.push_str("JOB DESCRIPTION:\n");
    let _ = writeln!(prompt, "Title: {}", job.title.trim());
    let _ = writeln!(prompt, "Company: {}", job.company.trim());
    let _ = writeln!(prompt, "Description: {}", clean_text(&job.description));
    if !job.skills_mentioned.is_empty() {
        let _ = writeln!(prompt, "Skills mentioned: {}", job.skills_mentioned.join(", "));
        let missing = missing_skills(resume, job);
        if !missing.is_empty() {
            let _ = writeln!(prompt, "Skills not found in resume: {}", missing.join(", "));
        }
    }

    prompt.push_str("\nRESUME TO OPTIMIZE:\n");
    prompt.push_str(resume.raw_text.trim());
    prompt.push('\n');
    if !resume.skills.is_empty() {
        let skills: Vec<&str> = resume.skills.iter().map(String::as_str).collect();
        let _ = writeln!(prompt, "\nDetected skills: {}", skills.join(", "));
    }
    let _ = writeln!(
        prompt,
        "Detected entries: {} experience, {} education, {} projects",
        resume.experience.len(),
        resume.education.len(),
        resume.projects.len()
    );

    prompt.push_str("\nUSER CONTEXT (Additional Information):\n");
    prompt.push_str(&render_context(&request.context));
    prompt.push('\n');

    let _ = writeln!(prompt, "\nOPTIMIZATION FOCUS: {}", request.focus.as_str());
    prompt.push_str(
        "\nPlease optimize the resume to better match the job description while following the \
         principles above.",
    );

    prompt
}

pub fn build_insights_prompt(job: &JobDescription) -> String {
    format!(
        "Analyze this job description and provide insights:\n\n\
         JOB DESCRIPTION:\n\
         Title: {}\n\
         Company: {}\n\
         Description: {}\n\n\
         Please provide:\n\
         1. Key skills required\n\
         2. Experience level expected\n\
         3. Industry/sector\n\
         4. Salary range estimate (if possible)\n\
         5. Growth opportunities\n\
         6. Company culture indicators\n\n\
         Format your response clearly with headers for each section.",
        job.title.trim(),
        job.company.trim(),
        clean_text(&job.description)
    )
}

/// Context grouped by category in first-seen order, one `- item` line per entry.
fn render_context(entries: &[ContextEntry]) -> String {
    if entries.is_empty() {
        return NO_CONTEXT.to_string();
    }

    let mut order = Vec::new();
    let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for entry in entries {
        let category = entry.category.as_str();
        if !grouped.contains_key(category) {
            order.push(category);
        }
        grouped
            .entry(category)
            .or_default()
            .push(entry.content.as_str());
    }

    let mut rendered = String::new();
    for category in order {
        let _ = writeln!(rendered, "{}:", category.to_uppercase());
        for content in &grouped[category] {
            let _ = writeln!(rendered, "- {content}");
        }
    }

    rendered.trim_end().to_string()
}

fn missing_skills<'a>(resume: &ParsedResume, job: &'a JobDescription) -> Vec<&'a str> {
    job.skills_mentioned
        .iter()
        .filter(|skill| {
            !resume
                .skills
                .iter()
                .any(|owned| owned.eq_ignore_ascii_case(skill))
        })
        .map(String::as_str)
        .collect()
}
