use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Context;

use super::models::RuntimeSettings;

pub const DATA_DIR_ENV: &str = "RESUME_TAILOR_DATA_DIR";
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

pub struct SettingsStore {
    file_path: PathBuf,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self {
            file_path: settings_path(),
        }
    }

    pub fn new_with_path(file_path: PathBuf) -> Self {
        Self { file_path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.file_path
    }

    pub async fn load(&self) -> anyhow::Result<RuntimeSettings> {
        if !tokio::fs::try_exists(&self.file_path)
            .await
            .unwrap_or(false)
        {
            return Ok(RuntimeSettings::default());
        }

        let content = tokio::fs::read_to_string(&self.file_path)
            .await
            .with_context(|| {
                format!("failed to read settings file {}", self.file_path.display())
            })?;

        let parsed = serde_json::from_str::<RuntimeSettings>(&content).with_context(|| {
            format!("invalid JSON in settings file {}", self.file_path.display())
        })?;

        Ok(parsed)
    }

    pub async fn save(&self, settings: &RuntimeSettings) -> anyhow::Result<()> {
        if let Some(parent) = self.file_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(settings)?;
        tokio::fs::write(&self.file_path, json).await?;
        Ok(())
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

/// The Gemini key is only ever read from the environment (or a `.env` loaded into it).
pub fn gemini_api_key() -> Option<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn settings_path() -> PathBuf {
    app_data_root().join("settings.json")
}

/// `RESUME_TAILOR_DATA_DIR` when set, else `ResumeTailor` under the platform data directory.
pub fn app_data_root() -> PathBuf {
    data_root_from(std::env::var_os(DATA_DIR_ENV))
}

fn data_root_from(override_dir: Option<OsString>) -> PathBuf {
    match override_dir.filter(|value| !value.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ResumeTailor"),
    }
}
