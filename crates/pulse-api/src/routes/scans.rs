//! Scan trigger route

use super::ApiResponse;
use crate::error::ApiError;
use crate::validate::validate_project_path;
use crate::workers::analysis::{spawn_run, RunRequest};
use crate::AppState;
use axum::{extract::State, Json};
use pulse_core::ScanType;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct ScanRequest {
    pub project_id: String,
    pub scan_type: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Serialize)]
pub struct ScanAck {
    pub status: String,
    pub project_id: String,
    pub scan_type: String,
    pub message: String,
}

/// Kick off one analysis run. The response never waits for the run; the
/// outcome is observable via scan history or the live channel.
pub async fn trigger_scan(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScanRequest>,
) -> Result<Json<ApiResponse<ScanAck>>, ApiError> {
    if request.project_id.trim().is_empty() {
        return Err(ApiError::BadRequest("project_id required".to_string()));
    }

    let scan_type = match request.scan_type.as_deref() {
        None | Some("") => ScanType::Full,
        Some(raw) => ScanType::parse(raw)
            .ok_or_else(|| ApiError::BadRequest(format!("invalid scan type: {raw}")))?,
    };

    let project_path = state
        .store
        .project_path(&request.project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    validate_project_path(&project_path, &state.config.allowed_project_paths)
        .map_err(|err| ApiError::BadRequest(format!("invalid project path: {err}")))?;

    spawn_run(
        state.clone(),
        RunRequest {
            project_id: request.project_id.clone(),
            project_path,
            scan_type,
            user_id: request.user_id.filter(|u| !u.is_empty()),
        },
    );

    Ok(ApiResponse::ok(ScanAck {
        status: "scan_initiated".to_string(),
        project_id: request.project_id,
        scan_type: scan_type.to_string(),
        message: "Analysis started in background. Results will be available shortly.".to_string(),
    }))
}
