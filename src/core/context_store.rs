use std::cmp::Reverse;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::errors::CoreError;
use super::models::{CachedJobDescription, ContextCategory, ContextEntry};
use super::settings_store::app_data_root;

const SIMILAR_JOBS_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoreState {
    next_context_id: i64,
    next_job_id: i64,
    context: Vec<ContextEntry>,
    job_descriptions: Vec<CachedJobDescription>,
}

impl StoreState {
    fn allocate_context_id(&mut self) -> i64 {
        let id = self.next_context_id.max(1);
        self.next_context_id = id + 1;
        id
    }

    fn allocate_job_id(&mut self) -> i64 {
        let id = self.next_job_id.max(1);
        self.next_job_id = id + 1;
        id
    }
}

/// User context entries and cached job descriptions, persisted as one JSON document.
///
/// The store is opened explicitly and every mutation is written through before it returns.
pub struct ContextStore {
    path: PathBuf,
    state: Mutex<StoreState>,
}

impl ContextStore {
    pub fn default_path() -> PathBuf {
        app_data_root().join("context.json")
    }

    pub async fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let state = if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            let json = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed reading context store {}", path.display()))?;
            serde_json::from_str::<StoreState>(&json)
                .with_context(|| format!("invalid JSON in context store {}", path.display()))?
        } else {
            StoreState::default()
        };

        debug!(
            path = %path.display(),
            entries = state.context.len(),
            jobs = state.job_descriptions.len(),
            "opened context store"
        );

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes the current state and releases the store.
    pub async fn close(self) -> anyhow::Result<()> {
        let state = self.state.into_inner();
        persist(&self.path, &state).await
    }

    pub async fn add_context(
        &self,
        category: ContextCategory,
        content: &str,
    ) -> anyhow::Result<i64> {
        let content = content.trim();
        if content.is_empty() {
            return Err(CoreError::InvalidRequest("context content is empty".to_string()).into());
        }

        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let id = next.allocate_context_id();
        let now = Utc::now();
        next.context.push(ContextEntry {
            id,
            category,
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        });
        self.commit(&mut state, next).await?;

        info!(id, %category, "added context entry");
        Ok(id)
    }

    pub async fn get_context_by_category(
        &self,
        category: ContextCategory,
    ) -> anyhow::Result<Vec<ContextEntry>> {
        let state = self.state.lock().await;
        let mut entries: Vec<ContextEntry> = state
            .context
            .iter()
            .filter(|entry| entry.category == category)
            .cloned()
            .collect();
        entries.sort_by_key(|entry| Reverse((entry.created_at, entry.id)));
        Ok(entries)
    }

    /// Every entry, grouped by category name and newest first inside each group.
    pub async fn get_all_context(&self) -> anyhow::Result<Vec<ContextEntry>> {
        let state = self.state.lock().await;
        let mut entries = state.context.clone();
        entries.sort_by(|a, b| {
            a.category
                .as_str()
                .cmp(b.category.as_str())
                .then_with(|| (b.created_at, b.id).cmp(&(a.created_at, a.id)))
        });
        Ok(entries)
    }

    pub async fn update_context(&self, id: i64, content: &str) -> anyhow::Result<()> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let entry = next
            .context
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(CoreError::ContextNotFound(id))?;
        entry.content = content.trim().to_string();
        entry.updated_at = Utc::now();
        self.commit(&mut state, next).await?;

        info!(id, "updated context entry");
        Ok(())
    }

    pub async fn delete_context(&self, id: i64) -> anyhow::Result<()> {
        let mut state = self.state.lock().await;
        if !state.context.iter().any(|entry| entry.id == id) {
            return Err(CoreError::ContextNotFound(id).into());
        }
        let mut next = state.clone();
        next.context.retain(|entry| entry.id != id);
        self.commit(&mut state, next).await?;

        info!(id, "deleted context entry");
        Ok(())
    }

    /// Distinct categories that currently hold at least one entry, by name.
    pub async fn get_categories(&self) -> anyhow::Result<Vec<ContextCategory>> {
        let state = self.state.lock().await;
        let mut categories: Vec<ContextCategory> =
            state.context.iter().map(|entry| entry.category).collect();
        categories.sort_by_key(|category| category.as_str());
        categories.dedup();
        Ok(categories)
    }

    pub async fn save_job_description(
        &self,
        job_title: &str,
        company: &str,
        description: &str,
        optimized_resume: Option<&str>,
    ) -> anyhow::Result<i64> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let id = next.allocate_job_id();
        next.job_descriptions.push(CachedJobDescription {
            id,
            job_title: job_title.to_string(),
            company: company.to_string(),
            description: description.to_string(),
            optimized_resume: optimized_resume.map(str::to_string),
            created_at: Utc::now(),
        });
        self.commit(&mut state, next).await?;

        info!(id, job_title, company, "cached job description");
        Ok(id)
    }

    /// Writes `next` to disk and only then makes it the live state.
    async fn commit(&self, state: &mut StoreState, next: StoreState) -> anyhow::Result<()> {
        persist(&self.path, &next).await?;
        *state = next;
        Ok(())
    }

    /// Up to five cached jobs whose title or company contains the given text, newest first.
    pub async fn get_similar_job_descriptions(
        &self,
        job_title: &str,
        company: &str,
    ) -> anyhow::Result<Vec<CachedJobDescription>> {
        let title = job_title.to_lowercase();
        let company = company.to_lowercase();

        let state = self.state.lock().await;
        let mut matches: Vec<CachedJobDescription> = state
            .job_descriptions
            .iter()
            .filter(|job| {
                job.job_title.to_lowercase().contains(&title)
                    || job.company.to_lowercase().contains(&company)
            })
            .cloned()
            .collect();
        matches.sort_by_key(|job| Reverse((job.created_at, job.id)));
        matches.truncate(SIMILAR_JOBS_LIMIT);
        Ok(matches)
    }
}

async fn persist(path: &Path, state: &StoreState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_string_pretty(state)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("failed writing context store {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open_temp() -> (tempfile::TempDir, ContextStore) {
        let temp = tempfile::tempdir().unwrap();
        let store = ContextStore::open(temp.path().join("store").join("context.json"))
            .await
            .unwrap();
        (temp, store)
    }

    #[tokio::test]
    async fn ids_start_at_one_and_increment() {
        let (_temp, store) = open_temp().await;

        let first = store
            .add_context(ContextCategory::Skill, "Kubernetes operators")
            .await
            .unwrap();
        let second = store
            .add_context(ContextCategory::Award, "Hackathon winner 2021")
            .await
            .unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[tokio::test]
    async fn entries_survive_close_and_reopen() {
        let (temp, store) = open_temp().await;
        let path = store.path().to_path_buf();
        store
            .add_context(ContextCategory::Project, "Open-source CLI for log triage")
            .await
            .unwrap();
        store.close().await.unwrap();

        let reopened = ContextStore::open(&path).await.unwrap();
        let entries = reopened.get_all_context().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].content, "Open-source CLI for log triage");

        let next = reopened
            .add_context(ContextCategory::Other, "Speaks Spanish")
            .await
            .unwrap();
        assert_eq!(next, 2);
        drop(temp);
    }

    #[tokio::test]
    async fn listing_orders_by_category_then_newest() {
        let (_temp, store) = open_temp().await;
        store
            .add_context(ContextCategory::Skill, "older skill")
            .await
            .unwrap();
        store
            .add_context(ContextCategory::Award, "an award")
            .await
            .unwrap();
        store
            .add_context(ContextCategory::Skill, "newer skill")
            .await
            .unwrap();

        let all = store.get_all_context().await.unwrap();
        let contents: Vec<&str> = all.iter().map(|entry| entry.content.as_str()).collect();
        assert_eq!(contents, vec!["an award", "newer skill", "older skill"]);

        let skills = store
            .get_context_by_category(ContextCategory::Skill)
            .await
            .unwrap();
        assert_eq!(skills.len(), 2);
        assert_eq!(skills[0].content, "newer skill");

        let categories = store.get_categories().await.unwrap();
        assert_eq!(
            categories,
            vec![ContextCategory::Award, ContextCategory::Skill]
        );
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_ids() {
        let (_temp, store) = open_temp().await;
        let id = store
            .add_context(ContextCategory::Experience, "Led a team of four")
            .await
            .unwrap();

        store.update_context(id, "Led a team of six").await.unwrap();
        let entries = store.get_all_context().await.unwrap();
        assert_eq!(entries[0].content, "Led a team of six");
        assert!(entries[0].updated_at >= entries[0].created_at);

        store.delete_context(id).await.unwrap();
        let err = store.delete_context(id).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::ContextNotFound(missing)) if *missing == id
        ));

        let err = store.update_context(42, "nothing").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::ContextNotFound(42))
        ));
    }

    #[tokio::test]
    async fn failed_writes_leave_state_untouched() {
        let temp = tempfile::tempdir().unwrap();
        let blocker = temp.path().join("store");
        tokio::fs::write(&blocker, "not a directory").await.unwrap();
        let store = ContextStore::open(blocker.join("context.json"))
            .await
            .unwrap();

        assert!(store
            .add_context(ContextCategory::Skill, "Terraform")
            .await
            .is_err());
        assert!(store.get_all_context().await.unwrap().is_empty());

        tokio::fs::remove_file(&blocker).await.unwrap();
        let id = store
            .add_context(ContextCategory::Skill, "Terraform")
            .await
            .unwrap();
        assert_eq!(id, 1);

        tokio::fs::remove_dir_all(&blocker).await.unwrap();
        tokio::fs::write(&blocker, "not a directory").await.unwrap();

        assert!(store.update_context(id, "Pulumi").await.is_err());
        assert!(store.delete_context(id).await.is_err());
        assert!(store
            .save_job_description("Engineer", "Initech", "Rust", None)
            .await
            .is_err());

        let entries = store.get_all_context().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].content, "Terraform");
        assert!(store
            .get_similar_job_descriptions("engineer", "initech")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn blank_content_is_rejected() {
        let (_temp, store) = open_temp().await;
        let err = store
            .add_context(ContextCategory::Other, "   ")
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn similar_jobs_match_title_or_company_and_cap_at_five() {
        let (_temp, store) = open_temp().await;
        for index in 0..6 {
            store
                .save_job_description(
                    &format!("Backend Engineer {index}"),
                    "Initech",
                    "Rust services",
                    None,
                )
                .await
                .unwrap();
        }
        store
            .save_job_description("Designer", "Globex", "Figma", Some("tailored"))
            .await
            .unwrap();

        let similar = store
            .get_similar_job_descriptions("backend engineer", "nobody")
            .await
            .unwrap();
        assert_eq!(similar.len(), 5);
        assert_eq!(similar[0].job_title, "Backend Engineer 5");

        let by_company = store
            .get_similar_job_descriptions("nothing", "GLOBEX")
            .await
            .unwrap();
        assert_eq!(by_company.len(), 1);
        assert_eq!(by_company[0].optimized_resume.as_deref(), Some("tailored"));
    }
}
