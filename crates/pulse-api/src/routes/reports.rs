//! Report generation and download routes

use super::ApiResponse;
use crate::error::ApiError;
use crate::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use chrono::Utc;
use pulse_core::report::{self, ReportFormat};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

#[derive(Deserialize)]
pub struct GenerateReportRequest {
    pub analysis_id: String,
    pub format: Option<String>,
}

#[derive(Serialize)]
pub struct GeneratedReport {
    pub report_path: String,
    pub download_url: String,
    pub message: String,
}

pub async fn generate_report(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateReportRequest>,
) -> Result<Json<ApiResponse<GeneratedReport>>, ApiError> {
    if request.analysis_id.trim().is_empty() {
        return Err(ApiError::BadRequest("analysis_id required".to_string()));
    }

    let row = state
        .store
        .get_analysis(&request.analysis_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Analysis not found".to_string()))?;

    let format = ReportFormat::parse(request.format.as_deref().unwrap_or("markdown"));
    let project_name = row
        .projects
        .map(|p| p.name)
        .unwrap_or_else(|| "Unknown Project".to_string());

    let content = report::generate(&row.record, &project_name, format)
        .map_err(|err| ApiError::Internal(format!("Failed to render report: {err}")))?;

    tokio::fs::create_dir_all(&state.config.reports_dir)
        .await
        .map_err(|err| ApiError::Internal(format!("Failed to create reports dir: {err}")))?;

    let path = format!(
        "{}/analysis_report_{}_{}.{}",
        state.config.reports_dir,
        row.record.project_id,
        Utc::now().format("%Y%m%d_%H%M%S"),
        format.extension()
    );
    tokio::fs::write(&path, content)
        .await
        .map_err(|err| ApiError::Internal(format!("Failed to save report: {err}")))?;

    if let Err(err) = state.store.set_report_path(&request.analysis_id, &path).await {
        warn!("Failed to update report path for analysis {}: {}", request.analysis_id, err);
    }

    Ok(ApiResponse::ok(GeneratedReport {
        report_path: path,
        download_url: format!("/api/reports/{}/download", request.analysis_id),
        message: "Report generated successfully".to_string(),
    }))
}

pub async fn download_report(
    State(state): State<Arc<AppState>>,
    Path(analysis_id): Path<String>,
) -> Result<Response, ApiError> {
    let row = state
        .store
        .get_analysis(&analysis_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Analysis not found".to_string()))?;

    let path = row
        .record
        .report_path
        .ok_or_else(|| ApiError::NotFound("Report not generated yet".to_string()))?;

    let content = tokio::fs::read(&path)
        .await
        .map_err(|_| ApiError::NotFound("Report artifact missing".to_string()))?;

    let (content_type, filename) = if path.ends_with(".json") {
        ("application/json", format!("analysis_report_{analysis_id}.json"))
    } else {
        ("text/markdown", format!("analysis_report_{analysis_id}.md"))
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from(content))
        .map_err(|err| ApiError::Internal(format!("Failed to build response: {err}")))
}
