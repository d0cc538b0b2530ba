//! API routes

pub mod achievements;
pub mod analysis;
pub mod projects;
pub mod reports;
pub mod scans;
pub mod ws;

use crate::AppState;
use axum::{extract::State, Json};
use chrono::Utc;
use pulse_core::ScanType;
use serde::Serialize;
use std::sync::Arc;

/// Standard response envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

impl ApiResponse<()> {
    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

#[derive(Serialize)]
pub struct HealthData {
    pub status: String,
    pub database: String,
    pub timestamp: i64,
}

/// Liveness plus a document-store connectivity probe
pub async fn health(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    match state.store.health_probe().await {
        Ok(()) => ApiResponse::ok(HealthData {
            status: "healthy".to_string(),
            database: "store_connected".to_string(),
            timestamp: Utc::now().timestamp(),
        }),
        Err(err) => Json(ApiResponse {
            success: false,
            data: None,
            error: Some(format!("Store connection failed: {err}")),
        }),
    }
}

#[derive(Serialize)]
pub struct EngineInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub scan_types: &'static [&'static str],
    pub categories: usize,
}

/// Public engine metadata (the endpoint with the relaxed rate limit)
pub async fn engine_info() -> Json<ApiResponse<EngineInfo>> {
    ApiResponse::ok(EngineInfo {
        name: "pulse-engine",
        version: env!("CARGO_PKG_VERSION"),
        scan_types: ScanType::all(),
        categories: pulse_core::CATEGORY_CATALOG.len(),
    })
}
