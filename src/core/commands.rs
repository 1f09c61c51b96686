use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::models::{
    ContextCategory, OptimizationFocus, OptimizationResult, ParsedResume, RuntimeSettings,
};
use super::service::{load_job_description, CoreService};
use super::text_utils::truncate_text;

const LIST_PREVIEW_CHARS: usize = 80;

#[derive(Parser)]
#[command(name = "resume-tailor")]
#[command(about = "Parse resumes and tailor them to a job description")]
#[command(version)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a PDF or DOCX resume into structured sections
    Parse {
        file: PathBuf,
        /// Print the full structure as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check a resume for missing sections and malformed contact details
    Analyze { file: PathBuf },
    /// Rewrite a resume for a job using stored context
    Optimize {
        file: PathBuf,
        #[command(flatten)]
        job: JobArgs,
        #[arg(long, default_value = "all")]
        focus: OptimizationFocus,
        /// Write the optimized resume here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Summarize skills, level, and culture signals in a job description
    Insights {
        #[command(flatten)]
        job: JobArgs,
    },
    /// Manage stored background context
    #[command(subcommand)]
    Context(ContextCommands),
    /// Show or change persisted settings
    #[command(subcommand)]
    Settings(SettingsCommands),
}

#[derive(Args)]
pub struct JobArgs {
    #[arg(long)]
    pub job_title: String,
    #[arg(long)]
    pub company: String,
    /// Plain-text file holding the job description
    #[arg(long)]
    pub job_file: PathBuf,
}

#[derive(Subcommand)]
pub enum ContextCommands {
    Add {
        #[arg(short, long)]
        category: ContextCategory,
        content: String,
    },
    List {
        #[arg(short, long)]
        category: Option<ContextCategory>,
    },
    Update { id: i64, content: String },
    Delete { id: i64 },
    /// Categories that currently hold entries
    Categories,
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    Show,
    Set(SettingsUpdate),
}

#[derive(Args)]
pub struct SettingsUpdate {
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub max_output_tokens: Option<u32>,
    #[arg(long)]
    pub temperature: Option<f32>,
    #[arg(long)]
    pub max_file_size_mb: Option<u64>,
    #[arg(long)]
    pub max_retries: Option<usize>,
    #[arg(long)]
    pub retry_delay_seconds: Option<f64>,
    #[arg(long)]
    pub context_store_path: Option<PathBuf>,
}

impl SettingsUpdate {
    fn apply(self, current: RuntimeSettings) -> RuntimeSettings {
        RuntimeSettings {
            gemini_model: self.model.unwrap_or(current.gemini_model),
            max_output_tokens: self.max_output_tokens.unwrap_or(current.max_output_tokens),
            temperature: self.temperature.unwrap_or(current.temperature),
            max_file_size_mb: self.max_file_size_mb.unwrap_or(current.max_file_size_mb),
            max_retries: self.max_retries.unwrap_or(current.max_retries),
            retry_delay_seconds: self
                .retry_delay_seconds
                .unwrap_or(current.retry_delay_seconds),
            context_store_path: self.context_store_path.or(current.context_store_path),
        }
    }
}

pub async fn execute(core: &CoreService, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Parse { file, json } => {
            let parsed = core.parse_file(&file).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&parsed)?);
            } else {
                print_summary(&parsed);
            }
        }
        Commands::Analyze { file } => {
            let report = core.analyze_file(&file).await?;
            println!("{} ({}, sha256 {})", report.file_name, report.file_size, report.sha256);
            println!(
                "valid: {}  words: {}",
                report.analysis.is_valid, report.analysis.word_count
            );
            for issue in &report.analysis.issues {
                println!("  - {issue}");
            }
            print_summary(&report.parsed);
        }
        Commands::Optimize {
            file,
            job,
            focus,
            output,
        } => {
            let resume = core.parse_file(&file).await?;
            let job = load_job_description(&job.job_title, &job.company, &job.job_file).await?;
            let result = core.optimize(resume, job, focus).await?;

            match output {
                Some(path) => {
                    tokio::fs::write(&path, &result.optimized_resume).await?;
                    println!("Optimized resume written to {}", path.display());
                }
                None => println!("{}\n", result.optimized_resume),
            }
            print_optimization(&result);
        }
        Commands::Insights { job } => {
            let job = load_job_description(&job.job_title, &job.company, &job.job_file).await?;
            for insight in core.job_insights(&job).await? {
                println!("{}\n{}\n", insight.heading, insight.content);
            }
        }
        Commands::Context(command) => execute_context(core, command).await?,
        Commands::Settings(SettingsCommands::Show) => {
            println!("{}", serde_json::to_string_pretty(&core.get_settings().await)?);
        }
        Commands::Settings(SettingsCommands::Set(update)) => {
            let current = core.get_settings().await;
            let saved = core.save_settings(update.apply(current)).await?;
            println!("{}", serde_json::to_string_pretty(&saved)?);
        }
    }

    Ok(())
}

async fn execute_context(core: &CoreService, command: ContextCommands) -> anyhow::Result<()> {
    let store = core.context_store();
    match command {
        ContextCommands::Add { category, content } => {
            let id = store.add_context(category, &content).await?;
            println!("Added context entry {id}");
        }
        ContextCommands::List { category } => {
            let entries = match category {
                Some(category) => store.get_context_by_category(category).await?,
                None => store.get_all_context().await?,
            };
            if entries.is_empty() {
                println!("No context entries.");
            }
            for entry in entries {
                println!(
                    "[{}] {:<13} {}",
                    entry.id,
                    entry.category,
                    truncate_text(&entry.content, LIST_PREVIEW_CHARS, "...")
                );
            }
        }
        ContextCommands::Update { id, content } => {
            store.update_context(id, &content).await?;
            println!("Updated context entry {id}");
        }
        ContextCommands::Delete { id } => {
            store.delete_context(id).await?;
            println!("Deleted context entry {id}");
        }
        ContextCommands::Categories => {
            for category in store.get_categories().await? {
                println!("{category}");
            }
        }
    }

    Ok(())
}

fn print_summary(parsed: &ParsedResume) {
    let contact = &parsed.contact;
    for (label, value) in [
        ("email", &contact.email),
        ("phone", &contact.phone),
        ("linkedin", &contact.linkedin),
        ("github", &contact.github),
        ("website", &contact.website),
    ] {
        if !value.is_empty() {
            println!("{label:<9} {value}");
        }
    }

    let sections: Vec<&str> = parsed.sections.keys().map(|kind| kind.as_str()).collect();
    println!("sections  {}", sections.join(", "));
    let skills: Vec<&str> = parsed.skills.iter().map(String::as_str).collect();
    println!("skills    {}", skills.join(", "));

    for entry in &parsed.experience {
        println!(
            "experience: {} | {} | {} - {}",
            entry.title, entry.company, entry.start_date, entry.end_date
        );
    }
    for entry in &parsed.education {
        println!(
            "education:  {} | {} | {}",
            entry.degree, entry.institution, entry.year
        );
    }
    for entry in &parsed.projects {
        println!(
            "project:    {} [{}]",
            entry.name,
            entry.technologies.join(", ")
        );
    }
}

fn print_optimization(result: &OptimizationResult) {
    println!("Changes made:");
    for change in &result.changes_made {
        println!("  - {change}");
    }
    println!("Suggestions:");
    for suggestion in &result.suggestions {
        println!("  - {suggestion}");
    }
    println!(
        "Confidence {:.0}%  keyword overlap {:.0}% -> {:.0}%  ({:.1}s)",
        result.confidence_score * 100.0,
        result.keyword_overlap_before * 100.0,
        result.keyword_overlap_after * 100.0,
        result.processing_time_seconds
    );
}
