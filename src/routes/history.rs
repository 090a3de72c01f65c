use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    db::HistoryStore, error::AppResult, models::ComparisonHistoryEntry, routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    20
}

/// Handler for a user's recent comparison history, newest first
pub async fn recent(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(params): Query<HistoryQuery>,
) -> AppResult<Json<Vec<ComparisonHistoryEntry>>> {
    let entries = state.history.recent(&user_id, params.limit).await?;
    Ok(Json(entries))
}
