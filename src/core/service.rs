use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::context_store::ContextStore;
use super::document_parser::ResumeDocumentParser;
use super::errors::CoreError;
use super::gemini::{GeminiClient, GenerationConfig, TextGenerator};
use super::models::{
    JobDescription, JobInsight, OptimizationFocus, OptimizationRequest, OptimizationResult,
    ParsedResume, ResumeAnalysis, RuntimeSettings,
};
use super::pdf::PdfTextExtractor;
use super::prompt::{build_insights_prompt, build_optimization_prompt};
use super::response_parser::{parse_insights, parse_optimization_response};
use super::settings_store::{gemini_api_key, SettingsStore};
use super::skill_extractor::vocabulary_matches;
use super::text_utils::{
    calculate_similarity, file_hash, format_file_size, truncate_text, validate_email,
    validate_phone, validate_resume_content,
};

const API_KEY_PROBE_PROMPT: &str = "Hello, this is a test.";
const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

/// A resume file's parsed structure plus its content checks.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeReport {
    pub file_name: String,
    pub file_size: String,
    pub sha256: String,
    pub analysis: ResumeAnalysis,
    pub parsed: ParsedResume,
}

pub struct CoreService {
    settings_store: SettingsStore,
    settings: RwLock<RuntimeSettings>,
    context_store: ContextStore,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl CoreService {
    pub fn new(
        settings_store: SettingsStore,
        settings: RuntimeSettings,
        context_store: ContextStore,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        Self {
            settings_store,
            settings: RwLock::new(settings),
            context_store,
            generator,
        }
    }

    /// Loads persisted settings, opens the context store, and wires up Gemini when
    /// `GEMINI_API_KEY` is set. Without a key, everything except AI calls still works.
    pub async fn from_environment() -> anyhow::Result<Self> {
        let settings_store = SettingsStore::new();
        let settings = settings_store.load().await.unwrap_or_else(|err| {
            warn!("falling back to default settings: {err:#}");
            RuntimeSettings::default()
        });

        let store_path = settings
            .context_store_path
            .clone()
            .unwrap_or_else(ContextStore::default_path);
        let context_store = ContextStore::open(store_path).await?;

        let generator = match gemini_api_key() {
            Some(api_key) => {
                let client = reqwest::Client::builder()
                    .user_agent("ResumeTailor/1.0")
                    .timeout(HTTP_TIMEOUT)
                    .build()
                    .context("failed to build HTTP client")?;
                let gemini = GeminiClient::new(client, api_key, generation_config(&settings));
                Some(Arc::new(gemini) as Arc<dyn TextGenerator>)
            }
            None => {
                debug!("GEMINI_API_KEY not set; AI features disabled");
                None
            }
        };

        Ok(Self::new(settings_store, settings, context_store, generator))
    }

    pub fn context_store(&self) -> &ContextStore {
        &self.context_store
    }

    pub async fn close(self) -> anyhow::Result<()> {
        self.context_store.close().await
    }

    pub async fn get_settings(&self) -> RuntimeSettings {
        self.settings.read().await.clone()
    }

    pub async fn save_settings(
        &self,
        new_settings: RuntimeSettings,
    ) -> anyhow::Result<RuntimeSettings> {
        let defaults = RuntimeSettings::default();
        let runtime = RuntimeSettings {
            gemini_model: if new_settings.gemini_model.trim().is_empty() {
                defaults.gemini_model
            } else {
                new_settings.gemini_model.trim().to_string()
            },
            max_output_tokens: new_settings.max_output_tokens.max(1),
            temperature: new_settings.temperature.clamp(0.0, 2.0),
            max_file_size_mb: new_settings.max_file_size_mb.max(1),
            max_retries: new_settings.max_retries.max(1),
            retry_delay_seconds: new_settings.retry_delay_seconds.max(0.1),
            context_store_path: new_settings.context_store_path,
        };

        self.settings_store.save(&runtime).await?;
        let mut settings = self.settings.write().await;
        *settings = runtime.clone();

        info!(model = %runtime.gemini_model, "saved settings");
        Ok(runtime)
    }

    pub async fn parse_single(
        &self,
        file_name: &str,
        file_bytes: &[u8],
    ) -> anyhow::Result<ParsedResume> {
        let settings = self.settings.read().await.clone();
        let parser = build_parser(&settings);
        parser.parse_resume_bytes(file_name, file_bytes)
    }

    /// Reads a resume from disk, rejecting oversized files before reading them.
    pub async fn parse_file(&self, path: &Path) -> anyhow::Result<ParsedResume> {
        let (file_name, bytes) = self.read_resume_file(path).await?;
        self.parse_single(&file_name, &bytes).await
    }

    pub async fn analyze_file(&self, path: &Path) -> anyhow::Result<ResumeReport> {
        let (file_name, bytes) = self.read_resume_file(path).await?;
        let parsed = self.parse_single(&file_name, &bytes).await?;

        let mut analysis = validate_resume_content(&parsed.raw_text);
        if !parsed.contact.email.is_empty() && !validate_email(&parsed.contact.email) {
            analysis
                .issues
                .push(format!("Email looks malformed: {}", parsed.contact.email));
        }
        if !parsed.contact.phone.is_empty() && !validate_phone(&parsed.contact.phone) {
            analysis
                .issues
                .push(format!("Phone number looks malformed: {}", parsed.contact.phone));
        }

        Ok(ResumeReport {
            file_name,
            file_size: format_file_size(bytes.len() as u64),
            sha256: file_hash(&bytes),
            analysis,
            parsed,
        })
    }

    pub async fn optimize(
        &self,
        resume: ParsedResume,
        job: JobDescription,
        focus: OptimizationFocus,
    ) -> anyhow::Result<OptimizationResult> {
        let generator = self.generator()?;
        let started = Instant::now();

        let job = with_detected_skills(job);
        let context = self.context_store.get_all_context().await?;
        let request = OptimizationRequest {
            resume,
            job,
            context,
            focus,
        };

        let prompt = build_optimization_prompt(&request);
        debug!(
            chars = prompt.len(),
            context_entries = request.context.len(),
            "built optimization prompt"
        );

        let response = generator
            .generate(&prompt)
            .await
            .context("resume optimization request failed")?;

        let original = request.resume.raw_text;
        let parsed = parse_optimization_response(&response, &original);
        let description = &request.job.description;
        let result = OptimizationResult {
            keyword_overlap_before: calculate_similarity(&original, description),
            keyword_overlap_after: calculate_similarity(&parsed.optimized_resume, description),
            original_resume: original,
            optimized_resume: parsed.optimized_resume,
            changes_made: parsed.changes_made,
            suggestions: parsed.suggestions,
            confidence_score: parsed.confidence_score,
            processing_time_seconds: started.elapsed().as_secs_f64(),
        };

        self.context_store
            .save_job_description(
                &request.job.title,
                &request.job.company,
                description,
                Some(&result.optimized_resume),
            )
            .await?;

        info!(
            job_title = %request.job.title,
            company = %request.job.company,
            confidence = result.confidence_score,
            overlap_before = result.keyword_overlap_before,
            overlap_after = result.keyword_overlap_after,
            "optimized resume: {}",
            truncate_text(result.changes_made.first().map(String::as_str).unwrap_or(""), 80, "...")
        );

        Ok(result)
    }

    pub async fn job_insights(&self, job: &JobDescription) -> anyhow::Result<Vec<JobInsight>> {
        let generator = self.generator()?;
        let response = generator
            .generate(&build_insights_prompt(job))
            .await
            .context("job insights request failed")?;

        let insights = parse_insights(&response);
        debug!(sections = insights.len(), "parsed job insights");
        Ok(insights)
    }

    /// Sends a trivial prompt; any failure (including a missing key) reads as invalid.
    pub async fn validate_api_key(&self) -> bool {
        let Ok(generator) = self.generator() else {
            return false;
        };

        match generator.generate(API_KEY_PROBE_PROMPT).await {
            Ok(_) => true,
            Err(err) => {
                warn!("API key validation failed: {err:#}");
                false
            }
        }
    }

    fn generator(&self) -> Result<&Arc<dyn TextGenerator>, CoreError> {
        self.generator.as_ref().ok_or(CoreError::MissingApiKey)
    }

    async fn read_resume_file(&self, path: &Path) -> anyhow::Result<(String, Vec<u8>)> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| CoreError::InvalidRequest(format!("not a file path: {}", path.display())))?
            .to_string();

        let metadata = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let settings = self.settings.read().await.clone();
        build_parser(&settings).validate(&file_name, metadata.len())?;

        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok((file_name, bytes))
    }
}

/// Loads a job description from a text file.
pub async fn load_job_description(
    title: &str,
    company: &str,
    description_path: &Path,
) -> anyhow::Result<JobDescription> {
    let description = tokio::fs::read_to_string(description_path)
        .await
        .with_context(|| format!("failed to read job description {}", description_path.display()))?;

    if description.trim().is_empty() {
        return Err(CoreError::InvalidRequest("job description is empty".to_string()).into());
    }

    Ok(with_detected_skills(JobDescription {
        title: title.trim().to_string(),
        company: company.trim().to_string(),
        description,
        skills_mentioned: Vec::new(),
    }))
}

fn with_detected_skills(mut job: JobDescription) -> JobDescription {
    if job.skills_mentioned.is_empty() {
        job.skills_mentioned = vocabulary_matches(&job.description);
    }
    job
}

fn generation_config(settings: &RuntimeSettings) -> GenerationConfig {
    GenerationConfig {
        model: settings.gemini_model.clone(),
        max_output_tokens: settings.max_output_tokens,
        temperature: settings.temperature,
        max_retries: settings.max_retries,
        retry_delay_seconds: settings.retry_delay_seconds,
    }
}

fn build_parser(settings: &RuntimeSettings) -> ResumeDocumentParser {
    ResumeDocumentParser::new(PdfTextExtractor::new(), settings.max_file_size_bytes())
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::*;
    use crate::core::models::ContextCategory;

    struct CannedGenerator {
        response: String,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedGenerator {
        fn new(response: &str) -> Arc<Self> {
            Arc::new(Self {
                response: response.to_string(),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
            self.prompts.lock().await.push(prompt.to_string());
            Ok(self.response.clone())
        }
    }

    const RESUME_TEXT: &str = "Jane Smith\n\
        jane@example.com | (555) 123-4567\n\
        \n\
        Experience\n\
        Software Engineer at Acme Corp\n\
        2019 - 2022\n\
        Built billing pipelines in Python.\n\
        \n\
        Skills\n\
        Python, Docker\n";

    const MODEL_RESPONSE: &str = "OPTIMIZED_RESUME:\n\
        Jane Smith\n\
        Software Engineer building Kubernetes platforms in Python\n\
        CHANGES_MADE:\n\
        - Emphasized Kubernetes platform work\n\
        SUGGESTIONS:\n\
        - Add metrics for uptime\n\
        CONFIDENCE_SCORE:\n\
        0.8\n";

    fn docx_bytes(text: &str) -> Vec<u8> {
        let paragraphs: String = text
            .lines()
            .map(|line| format!("<w:p><w:r><w:t>{line}</w:t></w:r></w:p>"))
            .collect();
        let xml = format!(
            r#"<w:document xmlns:w="urn:w"><w:body>{paragraphs}</w:body></w:document>"#
        );

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    async fn service(
        temp: &tempfile::TempDir,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> CoreService {
        let settings_store = SettingsStore::new_with_path(temp.path().join("settings.json"));
        let context_store = ContextStore::open(temp.path().join("context.json"))
            .await
            .unwrap();
        CoreService::new(
            settings_store,
            RuntimeSettings::default(),
            context_store,
            generator,
        )
    }

    fn job() -> JobDescription {
        JobDescription {
            title: "Platform Engineer".to_string(),
            company: "Initech".to_string(),
            description: "Build Kubernetes platforms with Python and Docker.".to_string(),
            skills_mentioned: Vec::new(),
        }
    }

    #[tokio::test]
    async fn optimize_uses_context_and_caches_the_job() {
        let temp = tempfile::tempdir().unwrap();
        let generator = CannedGenerator::new(MODEL_RESPONSE);
        let service = service(&temp, Some(generator.clone() as Arc<dyn TextGenerator>)).await;

        service
            .context_store()
            .add_context(ContextCategory::Skill, "Ran a Kubernetes homelab")
            .await
            .unwrap();

        let resume = service
            .parse_single("resume.docx", &docx_bytes(RESUME_TEXT))
            .await
            .unwrap();
        let result = service
            .optimize(resume, job(), OptimizationFocus::Skills)
            .await
            .unwrap();

        assert_eq!(
            result.optimized_resume,
            "Jane Smith\nSoftware Engineer building Kubernetes platforms in Python"
        );
        assert_eq!(result.changes_made, vec!["Emphasized Kubernetes platform work"]);
        assert!((result.confidence_score - 0.8).abs() < 1e-9);
        assert!(result.keyword_overlap_after > result.keyword_overlap_before);
        assert!(result.processing_time_seconds >= 0.0);

        let prompts = generator.prompts.lock().await;
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("SKILL:\n- Ran a Kubernetes homelab"));
        assert!(prompts[0].contains("Skills not found in resume: kubernetes"));

        let cached = service
            .context_store()
            .get_similar_job_descriptions("platform", "")
            .await
            .unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].optimized_resume.as_deref(), Some(result.optimized_resume.as_str()));
    }

    #[tokio::test]
    async fn ai_features_need_a_generator() {
        let temp = tempfile::tempdir().unwrap();
        let service = service(&temp, None).await;
        let resume = service
            .parse_single("resume.docx", &docx_bytes(RESUME_TEXT))
            .await
            .unwrap();

        let err = service
            .optimize(resume, job(), OptimizationFocus::All)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::MissingApiKey)
        ));
        assert!(!service.validate_api_key().await);
    }

    #[tokio::test]
    async fn insights_come_back_grouped() {
        let temp = tempfile::tempdir().unwrap();
        let generator = CannedGenerator::new("Key Skills\nRust\nGo\nCompany Culture\nRemote-first");
        let service = service(&temp, Some(generator as Arc<dyn TextGenerator>)).await;

        let insights = service.job_insights(&job()).await.unwrap();
        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].content, "Rust\nGo");
        assert!(service.validate_api_key().await);
    }

    #[tokio::test]
    async fn analyze_reports_size_hash_and_checks() {
        let temp = tempfile::tempdir().unwrap();
        let service = service(&temp, None).await;
        let path = temp.path().join("jane.docx");
        let bytes = docx_bytes(RESUME_TEXT);
        tokio::fs::write(&path, &bytes).await.unwrap();

        let report = service.analyze_file(&path).await.unwrap();
        assert_eq!(report.file_name, "jane.docx");
        assert_eq!(report.sha256, file_hash(&bytes));
        assert!(report.analysis.has_contact);
        assert!(report.analysis.has_experience);
        assert_eq!(report.parsed.contact.email, "jane@example.com");
    }

    #[tokio::test]
    async fn oversized_files_are_rejected_before_reading() {
        let temp = tempfile::tempdir().unwrap();
        let service = service(&temp, None).await;
        let path = temp.path().join("big.pdf");
        tokio::fs::write(&path, vec![0_u8; 2 * 1024 * 1024]).await.unwrap();

        service
            .save_settings(RuntimeSettings {
                max_file_size_mb: 1,
                ..RuntimeSettings::default()
            })
            .await
            .unwrap();

        let err = service.parse_file(&path).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::FileTooLarge { .. })
        ));
    }

    #[tokio::test]
    async fn saved_settings_are_sanitized() {
        let temp = tempfile::tempdir().unwrap();
        let service = service(&temp, None).await;

        let saved = service
            .save_settings(RuntimeSettings {
                gemini_model: "  ".to_string(),
                max_retries: 0,
                retry_delay_seconds: 0.0,
                ..RuntimeSettings::default()
            })
            .await
            .unwrap();

        assert_eq!(saved.gemini_model, "gemini-1.5-flash");
        assert_eq!(saved.max_retries, 1);
        assert!((saved.retry_delay_seconds - 0.1).abs() < 1e-9);
        assert_eq!(service.get_settings().await, saved);
    }

    #[tokio::test]
    async fn job_files_detect_skills() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("job.txt");
        tokio::fs::write(&path, "We use Rust and PostgreSQL.").await.unwrap();

        let job = load_job_description(" Backend ", "Initech", &path).await.unwrap();
        assert_eq!(job.title, "Backend");
        assert!(job.skills_mentioned.contains(&"rust".to_string()));
        assert!(job.skills_mentioned.contains(&"postgresql".to_string()));
    }
}
