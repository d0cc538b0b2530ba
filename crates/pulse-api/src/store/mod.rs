//! Document-store client
//!
//! The persistence layer is an external REST document store with
//! PostgREST-style query parameters (`field=eq.value`, `order=...`,
//! `limit=N`). Each write is a single call; no transaction spans two of
//! them. Responses at or above 400 become [`StoreError::Api`] carrying
//! the response body.

pub mod records;

use crate::config::AppConfig;
use chrono::{Duration, SecondsFormat, Utc};
use pulse_core::{Achievement, AnalysisRun, CategoryScore};
use records::{
    AnalysisResultRow, CategoryScoreRow, NewAnalysisResult, NewCategoryScore, NewProject, NewScan,
    ProjectPathRow, ProjectRecord,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Store response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Store returned no rows")]
    Empty,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Client for the document-store collaborator
#[derive(Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl StoreClient {
    pub fn new(config: &AppConfig) -> StoreResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: config.store_url.trim_end_matches('/').to_string(),
            api_key: config.store_api_key.clone(),
        })
    }

    fn url(&self, path_and_query: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, path_and_query)
    }

    async fn get_rows<T: DeserializeOwned>(&self, path_and_query: &str) -> StoreResult<Vec<T>> {
        let response = self
            .http
            .get(self.url(path_and_query))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        decode(response).await
    }

    async fn insert<T: DeserializeOwned, B: Serialize>(
        &self,
        collection: &str,
        body: &B,
    ) -> StoreResult<T> {
        let response = self
            .http
            .post(self.url(collection))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        let rows: Vec<T> = decode(response).await?;
        rows.into_iter().next().ok_or(StoreError::Empty)
    }

    async fn patch<B: Serialize>(&self, path_and_query: &str, body: &B) -> StoreResult<()> {
        let response = self
            .http
            .patch(self.url(path_and_query))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Api { status: status.as_u16(), body });
        }
        Ok(())
    }

    /// Cheap connectivity probe used by the health endpoint
    pub async fn health_probe(&self) -> StoreResult<()> {
        self.get_rows::<serde_json::Value>("projects?limit=1").await.map(|_| ())
    }

    pub async fn list_projects(&self) -> StoreResult<Vec<ProjectRecord>> {
        self.get_rows("projects?order=created_at.desc&limit=50").await
    }

    pub async fn create_project(&self, name: &str, path: &str) -> StoreResult<ProjectRecord> {
        self.insert("projects", &NewProject { name, path }).await
    }

    pub async fn project_path(&self, project_id: &str) -> StoreResult<Option<String>> {
        let rows: Vec<ProjectPathRow> = self
            .get_rows(&format!("projects?select=path&id=eq.{project_id}"))
            .await?;
        Ok(rows.into_iter().next().map(|r| r.path))
    }

    pub async fn insert_scan(
        &self,
        run: &AnalysisRun,
        user_id: Option<&str>,
    ) -> StoreResult<AnalysisRun> {
        self.insert("analysis_scans", &NewScan { run, user_id }).await
    }

    pub async fn list_project_scans(
        &self,
        project_id: &str,
        limit: u32,
    ) -> StoreResult<Vec<AnalysisRun>> {
        self.get_rows(&format!(
            "analysis_scans?project_id=eq.{project_id}&order=created_at.desc&limit={limit}"
        ))
        .await
    }

    pub async fn latest_scan(&self, project_id: &str) -> StoreResult<Option<AnalysisRun>> {
        let rows = self.list_project_scans(project_id, 1).await?;
        Ok(rows.into_iter().next())
    }

    pub async fn insert_category_score(
        &self,
        scan_id: &str,
        project_id: &str,
        score: &CategoryScore,
    ) -> StoreResult<()> {
        let row = NewCategoryScore {
            scan_id,
            project_id,
            category_name: &score.category_name,
            score: score.score,
            issue_count: score.issue_count,
            critical_issues: score.critical_issues,
            warning_issues: score.warning_issues,
            info_issues: score.info_issues,
        };
        let _: serde_json::Value = self.insert("category_scores", &row).await?;
        Ok(())
    }

    pub async fn category_history(
        &self,
        project_id: &str,
        category: &str,
        days: i64,
    ) -> StoreResult<Vec<CategoryScoreRow>> {
        // "Z" suffix: a "+00:00" offset would decode as a space in the query
        let since = (Utc::now() - Duration::days(days)).to_rfc3339_opts(SecondsFormat::Secs, true);
        self.get_rows(&format!(
            "category_scores?project_id=eq.{project_id}&category_name=eq.{category}\
             &created_at=gte.{since}&order=created_at.desc"
        ))
        .await
    }

    pub async fn achievement_exists(
        &self,
        user_id: &str,
        achievement_type: &str,
        category: &str,
    ) -> StoreResult<bool> {
        let rows: Vec<serde_json::Value> = self
            .get_rows(&format!(
                "achievements?select=id&user_id=eq.{user_id}\
                 &achievement_type=eq.{achievement_type}&category=eq.{category}&limit=1"
            ))
            .await?;
        Ok(!rows.is_empty())
    }

    pub async fn insert_achievement(&self, achievement: &Achievement) -> StoreResult<()> {
        let _: serde_json::Value = self.insert("achievements", achievement).await?;
        Ok(())
    }

    pub async fn list_achievements(&self, user_id: &str) -> StoreResult<Vec<Achievement>> {
        self.get_rows(&format!(
            "achievements?user_id=eq.{user_id}&order=earned_at.desc"
        ))
        .await
    }

    pub async fn insert_analysis_result(
        &self,
        payload: &NewAnalysisResult<'_>,
    ) -> StoreResult<AnalysisResultRow> {
        self.insert("analysis_results", payload).await
    }

    pub async fn list_analysis_history(&self) -> StoreResult<Vec<AnalysisResultRow>> {
        self.get_rows("analysis_results?select=*,projects(name)&order=created_at.desc&limit=100")
            .await
    }

    pub async fn get_analysis(&self, analysis_id: &str) -> StoreResult<Option<AnalysisResultRow>> {
        let rows = self
            .get_rows(&format!(
                "analysis_results?select=*,projects(name)&id=eq.{analysis_id}"
            ))
            .await?;
        Ok(rows.into_iter().next())
    }

    pub async fn set_report_path(&self, analysis_id: &str, path: &str) -> StoreResult<()> {
        self.patch(
            &format!("analysis_results?id=eq.{analysis_id}"),
            &serde_json::json!({ "report_path": path }),
        )
        .await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> StoreResult<T> {
    let status = response.status();
    let body = response.text().await?;

    if status.as_u16() >= 400 {
        return Err(StoreError::Api { status: status.as_u16(), body });
    }

    Ok(serde_json::from_str(&body)?)
}
