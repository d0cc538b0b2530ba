//! Project routes: CRUD, scan history, category history, progress messages

use super::ApiResponse;
use crate::error::ApiError;
use crate::store::records::{CategoryScoreRow, ProjectRecord};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use pulse_core::messages::{messages_for, MotivationalMessage};
use pulse_core::{category_info, AnalysisRun};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const SCAN_HISTORY_LIMIT: u32 = 20;
const DEFAULT_HISTORY_DAYS: i64 = 30;
const COMPARISON_WINDOW_DAYS: i64 = 7;

pub async fn list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ProjectRecord>>>, ApiError> {
    let projects = state.store.list_projects().await?;
    Ok(ApiResponse::ok(projects))
}

#[derive(Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub path: String,
}

pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateProjectRequest>,
) -> Result<Json<ApiResponse<ProjectRecord>>, ApiError> {
    if request.name.trim().is_empty() || request.path.trim().is_empty() {
        return Err(ApiError::BadRequest("Name and path required".to_string()));
    }

    let project = state.store.create_project(&request.name, &request.path).await?;
    Ok(ApiResponse::ok(project))
}

#[derive(Serialize)]
pub struct ProjectScans {
    pub scans: Vec<AnalysisRun>,
}

pub async fn project_scans(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
) -> Result<Json<ApiResponse<ProjectScans>>, ApiError> {
    let scans = state
        .store
        .list_project_scans(&project_id, SCAN_HISTORY_LIMIT)
        .await?;
    Ok(ApiResponse::ok(ProjectScans { scans }))
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub days: Option<i64>,
}

#[derive(Serialize)]
pub struct CategoryHistory {
    pub category: String,
    pub history: Vec<CategoryScoreRow>,
}

pub async fn category_history(
    State(state): State<Arc<AppState>>,
    Path((project_id, category)): Path<(String, String)>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<CategoryHistory>>, ApiError> {
    if category_info(&category).is_none() {
        return Err(ApiError::BadRequest(format!("unknown category: {category}")));
    }

    let days = query.days.unwrap_or(DEFAULT_HISTORY_DAYS).clamp(1, 365);
    let history = state.store.category_history(&project_id, &category, days).await?;
    Ok(ApiResponse::ok(CategoryHistory { category, history }))
}

#[derive(Serialize)]
pub struct MotivationalMessages {
    pub messages: Vec<MotivationalMessage>,
    pub project_id: String,
    pub generated_at: DateTime<Utc>,
}

/// Progress messages compare each category in the latest run with the
/// previous run's history row.
pub async fn motivational_messages(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
) -> Result<Json<ApiResponse<MotivationalMessages>>, ApiError> {
    let latest = state
        .store
        .latest_scan(&project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("no scans for project".to_string()))?;

    let mut messages = Vec::new();
    for score in &latest.category_scores {
        let history = state
            .store
            .category_history(&project_id, &score.category_name, COMPARISON_WINDOW_DAYS)
            .await
            .unwrap_or_default();

        // Newest row mirrors the current scan; the one after it is the
        // previous run.
        let previous = history.get(1).map(|row| row.score);
        messages.extend(messages_for(
            &score.category_name,
            &score.display_name,
            score.score,
            previous,
        ));
    }

    Ok(ApiResponse::ok(MotivationalMessages {
        messages,
        project_id,
        generated_at: Utc::now(),
    }))
}
