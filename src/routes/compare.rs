use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Category, Criterion, CriterionKey, MediaItem},
    routes::AppState,
    services::ranking,
    services::scoring::ScoreRow,
    services::session::{ComparisonSession, ViewState},
};

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub category: Category,
    /// Signed-in user identity; absent for guests (no history records)
    pub user_id: Option<String>,
    /// Selection cap, clamped to [2,30]; defaults to 15
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub category: Category,
    pub view: ViewState,
    pub limit: usize,
    pub items: Vec<MediaItem>,
    pub criteria: Vec<Criterion>,
}

impl From<&ComparisonSession> for SessionResponse {
    fn from(session: &ComparisonSession) -> Self {
        Self {
            id: session.id,
            category: session.category,
            view: session.view(),
            limit: session.limit(),
            items: session.items().to_vec(),
            criteria: session.criteria().to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RankingResponse {
    pub view: ViewState,
    pub top_pick: Option<ScoreRow>,
    /// Full breakdown rows, present only while the session is expanded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<ScoreRow>>,
}

#[derive(Debug, Deserialize)]
pub struct SetWeightRequest {
    pub weight: u8,
}

// Handlers

/// Creates a comparison session seeded with the device's stored weights
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateSessionRequest>,
) -> (StatusCode, Json<SessionResponse>) {
    let session = ComparisonSession::new(
        request.category,
        request.user_id,
        request.limit,
        &state.criteria_store,
        Arc::clone(&state.provider),
    );

    tracing::info!(
        session_id = %session.id,
        category = %session.category,
        "Comparison session created"
    );

    let response = SessionResponse::from(&session);
    state.sessions.write().await.insert(session.id, session);

    (StatusCode::CREATED, Json(response))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SessionResponse>> {
    let sessions = state.sessions.read().await;
    let session = lookup(&sessions, id)?;
    Ok(Json(SessionResponse::from(session)))
}

pub async fn end_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state
        .sessions
        .write()
        .await
        .remove(&id)
        .ok_or_else(|| not_found(id))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Adds an item to the selection
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(item): Json<MediaItem>,
) -> AppResult<Json<SessionResponse>> {
    let mut sessions = state.sessions.write().await;
    let session = lookup_mut(&mut sessions, id)?;
    session.add_item(item)?;
    Ok(Json(SessionResponse::from(&*session)))
}

pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    Path((id, item_id)): Path<(Uuid, u64)>,
) -> AppResult<Json<SessionResponse>> {
    let mut sessions = state.sessions.write().await;
    let session = lookup_mut(&mut sessions, id)?;
    session.remove_item(item_id);
    Ok(Json(SessionResponse::from(&*session)))
}

pub async fn clear_items(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SessionResponse>> {
    let mut sessions = state.sessions.write().await;
    let session = lookup_mut(&mut sessions, id)?;
    session.clear();
    Ok(Json(SessionResponse::from(&*session)))
}

/// Current ranking. Collapsed sessions expose only the top pick; the full
/// breakdown requires an expanded session.
pub async fn ranking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RankingResponse>> {
    let sessions = state.sessions.read().await;
    let session = lookup(&sessions, id)?;

    let ranked = session.ranking().await;
    let view = session.view();
    let top_pick = ranking::top_pick(&ranked).cloned();
    let rows = (view == ViewState::Expanded).then_some(ranked);

    Ok(Json(RankingResponse {
        view,
        top_pick,
        rows,
    }))
}

/// Opens the full breakdown; the first expansion for a selection records a
/// history entry for signed-in users
pub async fn expand(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RankingResponse>> {
    let mut sessions = state.sessions.write().await;
    let session = lookup_mut(&mut sessions, id)?;

    let ranked = session.expand(Arc::clone(&state.history)).await;

    Ok(Json(RankingResponse {
        view: session.view(),
        top_pick: ranking::top_pick(&ranked).cloned(),
        rows: Some(ranked),
    }))
}

pub async fn collapse(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SessionResponse>> {
    let mut sessions = state.sessions.write().await;
    let session = lookup_mut(&mut sessions, id)?;
    session.collapse();
    Ok(Json(SessionResponse::from(&*session)))
}

pub async fn get_criteria(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<Criterion>>> {
    let sessions = state.sessions.read().await;
    let session = lookup(&sessions, id)?;
    Ok(Json(session.criteria().to_vec()))
}

/// Sets one criterion weight and persists the configuration as the new
/// device default
pub async fn set_weight(
    State(state): State<Arc<AppState>>,
    Path((id, key)): Path<(Uuid, CriterionKey)>,
    Json(request): Json<SetWeightRequest>,
) -> AppResult<Json<Vec<Criterion>>> {
    let mut sessions = state.sessions.write().await;
    let session = lookup_mut(&mut sessions, id)?;
    session.set_weight(key, request.weight, &state.criteria_store)?;
    Ok(Json(session.criteria().to_vec()))
}

pub async fn reset_criteria(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<Criterion>>> {
    let mut sessions = state.sessions.write().await;
    let session = lookup_mut(&mut sessions, id)?;
    session.reset_criteria(&state.criteria_store);
    Ok(Json(session.criteria().to_vec()))
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("No comparison session {}", id))
}

fn lookup(
    sessions: &std::collections::HashMap<Uuid, ComparisonSession>,
    id: Uuid,
) -> AppResult<&ComparisonSession> {
    sessions.get(&id).ok_or_else(|| not_found(id))
}

fn lookup_mut(
    sessions: &mut std::collections::HashMap<Uuid, ComparisonSession>,
    id: Uuid,
) -> AppResult<&mut ComparisonSession> {
    sessions.get_mut(&id).ok_or_else(|| not_found(id))
}
