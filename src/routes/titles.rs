use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Category, ListKind, MediaItem},
    routes::AppState,
    services::providers::MetadataProvider,
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub category: Category,
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_page() -> u32 {
    1
}

/// Handler for title search, used to populate the selectable item pool
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<MediaItem>>> {
    let items = state.provider.search(params.category, &params.q).await?;
    Ok(Json(items))
}

/// Handler for curated list pages (popular, top rated, trending)
pub async fn list(
    State(state): State<Arc<AppState>>,
    Path((category, list)): Path<(Category, ListKind)>,
    Query(params): Query<ListQuery>,
) -> AppResult<Json<Vec<MediaItem>>> {
    let items = state.provider.fetch_list(category, list, params.page).await?;
    Ok(Json(items))
}
