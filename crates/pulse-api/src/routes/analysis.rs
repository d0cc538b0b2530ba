//! Analysis-result routes: history and client-submitted results

use super::ApiResponse;
use crate::error::ApiError;
use crate::store::records::NewAnalysisResult;
use crate::AppState;
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use pulse_core::{AnalysisRecord, EngineReport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize)]
pub struct HistoryEntry {
    pub id: Option<String>,
    pub project_id: String,
    pub project_name: String,
    pub scan_type: String,
    pub scan_result: EngineReport,
    pub issues_found: u32,
    pub created_at: Option<DateTime<Utc>>,
}

pub async fn history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<HistoryEntry>>>, ApiError> {
    let rows = state.store.list_analysis_history().await?;

    let entries = rows
        .into_iter()
        .map(|row| {
            let project_name = row
                .projects
                .map(|p| p.name)
                .unwrap_or_else(|| "Unknown".to_string());
            HistoryEntry {
                id: row.record.id,
                project_id: row.record.project_id,
                project_name,
                scan_type: row.record.scan_type,
                scan_result: row.record.results,
                issues_found: row.record.issues_count,
                created_at: row.record.created_at,
            }
        })
        .collect();

    Ok(ApiResponse::ok(entries))
}

#[derive(Deserialize)]
pub struct SubmitAnalysisRequest {
    pub project_id: String,
    #[serde(default)]
    pub scan_type: String,
    pub results: EngineReport,
    pub issues_count: Option<u32>,
}

/// Desktop clients run the engine locally and push the finished report
/// here for storage.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubmitAnalysisRequest>,
) -> Result<Json<ApiResponse<AnalysisRecord>>, ApiError> {
    if request.project_id.trim().is_empty() {
        return Err(ApiError::BadRequest("project_id required".to_string()));
    }

    let scan_type = if request.scan_type.is_empty() {
        "full".to_string()
    } else {
        request.scan_type
    };
    let issues_count = request
        .issues_count
        .unwrap_or(request.results.summary.issues_found);

    let row = state
        .store
        .insert_analysis_result(&NewAnalysisResult {
            project_id: &request.project_id,
            scan_type: &scan_type,
            results: &request.results,
            issues_count,
        })
        .await?;

    Ok(ApiResponse::ok(row.record))
}
