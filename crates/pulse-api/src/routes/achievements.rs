//! User achievement routes

use super::ApiResponse;
use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use pulse_core::Achievement;
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub struct UserAchievements {
    pub achievements: Vec<Achievement>,
    pub total: usize,
    pub user_id: String,
}

pub async fn user_achievements(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<UserAchievements>>, ApiError> {
    let achievements = state.store.list_achievements(&user_id).await?;
    let total = achievements.len();

    Ok(ApiResponse::ok(UserAchievements {
        achievements,
        total,
        user_id,
    }))
}
