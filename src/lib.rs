pub mod core;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::core::commands::{execute, Cli};
use crate::core::service::CoreService;

const DEFAULT_LOG_FILTER: &str = "resume_tailor=info";
const VERBOSE_LOG_FILTER: &str = "resume_tailor=debug";

pub async fn run() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let fallback = if cli.verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();

    let core = CoreService::from_environment().await?;
    let outcome = execute(&core, cli.command).await;
    core.close().await?;
    outcome
}
