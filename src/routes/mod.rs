use axum::{
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::db::HistoryStore;
use crate::services::criteria_store::CriteriaStore;
use crate::services::providers::MetadataProvider;
use crate::services::session::ComparisonSession;

pub mod compare;
pub mod history;
pub mod titles;

/// Shared application state
pub struct AppState {
    pub provider: Arc<dyn MetadataProvider>,
    pub criteria_store: CriteriaStore,
    pub history: Arc<dyn HistoryStore>,
    /// Live comparison sessions, each owning its own selection, weights and
    /// resolver cache
    pub sessions: RwLock<HashMap<Uuid, ComparisonSession>>,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        criteria_store: CriteriaStore,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            provider,
            criteria_store,
            history,
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Catalog pool
        .route("/titles/search", get(titles::search))
        .route("/titles/:category/:list", get(titles::list))
        // Comparison sessions
        .route("/compare/sessions", post(compare::create_session))
        .route(
            "/compare/sessions/:id",
            get(compare::get_session).delete(compare::end_session),
        )
        .route(
            "/compare/sessions/:id/items",
            post(compare::add_item).delete(compare::clear_items),
        )
        .route(
            "/compare/sessions/:id/items/:item_id",
            delete(compare::remove_item),
        )
        .route("/compare/sessions/:id/ranking", get(compare::ranking))
        .route("/compare/sessions/:id/expand", post(compare::expand))
        .route("/compare/sessions/:id/collapse", post(compare::collapse))
        .route("/compare/sessions/:id/criteria", get(compare::get_criteria))
        .route(
            "/compare/sessions/:id/criteria/reset",
            post(compare::reset_criteria),
        )
        .route(
            "/compare/sessions/:id/criteria/:key",
            put(compare::set_weight),
        )
        // Comparison history
        .route("/history/:user_id", get(history::recent))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
