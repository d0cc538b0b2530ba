//! Typed records for the document-store collections
//!
//! Every payload that crosses the store boundary has an explicit shape;
//! responses that fail to decode surface as typed errors instead of
//! silently passing malformed data through.

use chrono::{DateTime, Utc};
use pulse_core::{AnalysisRecord, AnalysisRun, EngineReport};
use serde::{Deserialize, Serialize};

/// Row in the `projects` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_analyzed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert payload for `projects`
#[derive(Debug, Serialize)]
pub struct NewProject<'a> {
    pub name: &'a str,
    pub path: &'a str,
}

/// Projection used when only the project path is needed
#[derive(Debug, Deserialize)]
pub struct ProjectPathRow {
    pub path: String,
}

/// Insert payload for `analysis_scans`: a finished run plus the
/// triggering user, when known
#[derive(Debug, Serialize)]
pub struct NewScan<'a> {
    #[serde(flatten)]
    pub run: &'a AnalysisRun,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<&'a str>,
}

/// Row in the `category_scores` collection (longitudinal history)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryScoreRow {
    pub category_name: String,
    pub score: f64,
    pub issue_count: u32,
    pub critical_issues: u32,
    #[serde(default)]
    pub warning_issues: u32,
    #[serde(default)]
    pub info_issues: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert payload for `category_scores`
#[derive(Debug, Serialize)]
pub struct NewCategoryScore<'a> {
    pub scan_id: &'a str,
    pub project_id: &'a str,
    pub category_name: &'a str,
    pub score: f64,
    pub issue_count: u32,
    pub critical_issues: u32,
    pub warning_issues: u32,
    pub info_issues: u32,
}

/// Row in the `analysis_results` collection, optionally joined with the
/// owning project's name
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisResultRow {
    #[serde(flatten)]
    pub record: AnalysisRecord,
    #[serde(default)]
    pub projects: Option<ProjectName>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectName {
    pub name: String,
}

/// Insert payload for `analysis_results`
#[derive(Debug, Serialize)]
pub struct NewAnalysisResult<'a> {
    pub project_id: &'a str,
    pub scan_type: &'a str,
    pub results: &'a EngineReport,
    pub issues_count: u32,
}
