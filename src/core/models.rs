use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::CoreError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Docx,
}

impl FileType {
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let extension = std::path::Path::new(file_name)
            .extension()
            .and_then(|v| v.to_str())
            .map(|v| v.to_ascii_lowercase())?;

        match extension.as_str() {
            "pdf" => Some(FileType::Pdf),
            "docx" => Some(FileType::Docx),
            _ => None,
        }
    }
}

/// Plain text handed over by a document decoder, before any segmentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub text: String,
    pub file_type: FileType,
    pub file_name: String,
}

/// Resume section categories. Declaration order is the taxonomy order used for tie-breaking.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Contact,
    Summary,
    Experience,
    Education,
    Skills,
    Projects,
    Certifications,
    Achievements,
    Publications,
    Volunteer,
}

impl SectionKind {
    pub const ALL: [SectionKind; 10] = [
        SectionKind::Contact,
        SectionKind::Summary,
        SectionKind::Experience,
        SectionKind::Education,
        SectionKind::Skills,
        SectionKind::Projects,
        SectionKind::Certifications,
        SectionKind::Achievements,
        SectionKind::Publications,
        SectionKind::Volunteer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Contact => "contact",
            SectionKind::Summary => "summary",
            SectionKind::Experience => "experience",
            SectionKind::Education => "education",
            SectionKind::Skills => "skills",
            SectionKind::Projects => "projects",
            SectionKind::Certifications => "certifications",
            SectionKind::Achievements => "achievements",
            SectionKind::Publications => "publications",
            SectionKind::Volunteer => "volunteer",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Half-open byte range `[start, end)` of the source text attributed to one section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SectionSpan {
    pub kind: SectionKind,
    pub start: usize,
    pub end: usize,
}

pub type SkillSet = BTreeSet<String>;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EducationEntry {
    pub degree: String,
    pub institution: String,
    pub year: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectEntry {
    pub name: String,
    pub description: String,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
    pub linkedin: String,
    pub github: String,
    pub website: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedResume {
    pub raw_text: String,
    pub sections: BTreeMap<SectionKind, String>,
    pub skills: SkillSet,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub projects: Vec<ProjectEntry>,
    pub contact: ContactInfo,
    pub file_type: FileType,
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobDescription {
    pub title: String,
    pub company: String,
    pub description: String,
    #[serde(default)]
    pub skills_mentioned: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContextCategory {
    Experience,
    Project,
    Achievement,
    Skill,
    Certification,
    Education,
    Volunteer,
    Publication,
    Award,
    Other,
}

impl ContextCategory {
    pub const ALL: [ContextCategory; 10] = [
        ContextCategory::Experience,
        ContextCategory::Project,
        ContextCategory::Achievement,
        ContextCategory::Skill,
        ContextCategory::Certification,
        ContextCategory::Education,
        ContextCategory::Volunteer,
        ContextCategory::Publication,
        ContextCategory::Award,
        ContextCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContextCategory::Experience => "experience",
            ContextCategory::Project => "project",
            ContextCategory::Achievement => "achievement",
            ContextCategory::Skill => "skill",
            ContextCategory::Certification => "certification",
            ContextCategory::Education => "education",
            ContextCategory::Volunteer => "volunteer",
            ContextCategory::Publication => "publication",
            ContextCategory::Award => "award",
            ContextCategory::Other => "other",
        }
    }
}

impl fmt::Display for ContextCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ContextCategory {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        ContextCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| CoreError::InvalidRequest(format!("unknown context category: {value}")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContextEntry {
    pub id: i64,
    pub category: ContextCategory,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedJobDescription {
    pub id: i64,
    pub job_title: String,
    pub company: String,
    pub description: String,
    pub optimized_resume: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationFocus {
    Skills,
    Experience,
    Achievements,
    #[default]
    All,
}

impl OptimizationFocus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizationFocus::Skills => "skills",
            OptimizationFocus::Experience => "experience",
            OptimizationFocus::Achievements => "achievements",
            OptimizationFocus::All => "all",
        }
    }
}

impl FromStr for OptimizationFocus {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "skills" => Ok(OptimizationFocus::Skills),
            "experience" => Ok(OptimizationFocus::Experience),
            "achievements" => Ok(OptimizationFocus::Achievements),
            "all" => Ok(OptimizationFocus::All),
            other => Err(CoreError::InvalidRequest(format!(
                "unknown optimization focus: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OptimizationRequest {
    pub resume: ParsedResume,
    pub job: JobDescription,
    pub context: Vec<ContextEntry>,
    pub focus: OptimizationFocus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub original_resume: String,
    pub optimized_resume: String,
    pub changes_made: Vec<String>,
    pub suggestions: Vec<String>,
    pub confidence_score: f64,
    pub processing_time_seconds: f64,
    pub keyword_overlap_before: f64,
    pub keyword_overlap_after: f64,
}

/// One headed block of a job-insights response, in response order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobInsight {
    pub heading: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResumeAnalysis {
    pub is_valid: bool,
    pub word_count: usize,
    pub has_contact: bool,
    pub has_experience: bool,
    pub has_education: bool,
    pub has_skills: bool,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimeSettings {
    pub gemini_model: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub max_file_size_mb: u64,
    pub max_retries: usize,
    pub retry_delay_seconds: f64,
    pub context_store_path: Option<PathBuf>,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            gemini_model: "gemini-1.5-flash".to_string(),
            max_output_tokens: 1000,
            temperature: 0.7,
            max_file_size_mb: 10,
            max_retries: 3,
            retry_delay_seconds: 1.0,
            context_store_path: None,
        }
    }
}

impl RuntimeSettings {
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.max(1) * 1024 * 1024
    }
}
