use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Datelike, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::db::HistoryStore;
use crate::error::{AppError, AppResult};
use crate::models::{
    Category, ComparisonHistoryEntry, Criterion, CriterionKey, MediaItem, MAX_WEIGHT, MIN_WEIGHT,
};
use crate::services::criteria_store::CriteriaStore;
use crate::services::providers::MetadataProvider;
use crate::services::ranking;
use crate::services::resolver::AttributeResolver;
use crate::services::scoring::{self, ScoreRow};

/// Default cap on the number of items in one comparison
pub const DEFAULT_SELECTION_LIMIT: usize = 15;
const MIN_SELECTION_LIMIT: usize = 2;
const MAX_SELECTION_LIMIT: usize = 30;

/// Presentation state of one comparison session
///
/// `Idle` until two items are selected, `Collapsed` shows only the top pick,
/// `Expanded` shows the full breakdown. The first transition into `Expanded`
/// for a given selection records the comparison to the user's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    Idle,
    Collapsed,
    Expanded,
}

/// One user-selected set of items being actively compared
///
/// Owns all mutable comparison state: the selection, the criteria weights,
/// the resolver's detail cache, the view state, and the set of selection
/// keys already recorded to history. Nothing lives in module scope, so
/// sessions cannot leak state into each other.
pub struct ComparisonSession {
    pub id: Uuid,
    pub category: Category,
    /// Present for signed-in users; guests get no history records
    pub user_id: Option<String>,
    items: Vec<MediaItem>,
    criteria: Vec<Criterion>,
    view: ViewState,
    emitted: HashSet<String>,
    resolver: AttributeResolver,
    limit: usize,
}

impl ComparisonSession {
    /// Creates a session with the persisted (or default) weights for the
    /// category. `limit` is clamped to [2,30]; absent means 15.
    pub fn new(
        category: Category,
        user_id: Option<String>,
        limit: Option<usize>,
        criteria_store: &CriteriaStore,
        provider: Arc<dyn MetadataProvider>,
    ) -> Self {
        let limit = limit
            .unwrap_or(DEFAULT_SELECTION_LIMIT)
            .clamp(MIN_SELECTION_LIMIT, MAX_SELECTION_LIMIT);

        Self {
            id: Uuid::new_v4(),
            category,
            user_id,
            items: Vec::new(),
            criteria: criteria_store.load(category),
            view: ViewState::Idle,
            emitted: HashSet::new(),
            resolver: AttributeResolver::new(provider),
            limit,
        }
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Adds an item to the selection. Re-adding a selected item is a no-op;
    /// a full selection is rejected.
    pub fn add_item(&mut self, item: MediaItem) -> AppResult<()> {
        if item.category != self.category {
            return Err(AppError::InvalidInput(format!(
                "Cannot add a {} item to a {} comparison",
                item.category, self.category
            )));
        }

        if self.items.iter().any(|existing| existing.id == item.id) {
            return Ok(());
        }

        if self.items.len() >= self.limit {
            return Err(AppError::InvalidInput(format!(
                "Selection is limited to {} items",
                self.limit
            )));
        }

        self.items.push(item);
        self.refresh_view();
        Ok(())
    }

    pub fn remove_item(&mut self, id: u64) {
        self.items.retain(|item| item.id != id);
        self.refresh_view();
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.refresh_view();
    }

    /// Idle below two items; otherwise a fresh selection starts Collapsed.
    /// An already-expanded breakdown stays expanded while the selection is
    /// still comparable.
    fn refresh_view(&mut self) {
        if self.items.len() < MIN_SELECTION_LIMIT {
            self.view = ViewState::Idle;
        } else if self.view == ViewState::Idle {
            self.view = ViewState::Collapsed;
        }
    }

    /// Sets one criterion weight, clamped to [1,10], and persists the
    /// configuration as the device default.
    pub fn set_weight(
        &mut self,
        key: CriterionKey,
        weight: u8,
        criteria_store: &CriteriaStore,
    ) -> AppResult<()> {
        let weight = weight.clamp(MIN_WEIGHT, MAX_WEIGHT);

        let Some(criterion) = self.criteria.iter_mut().find(|c| c.key == key) else {
            return Err(AppError::NotFound(format!(
                "No {:?} criterion in a {} comparison",
                key, self.category
            )));
        };

        criterion.weight = weight;
        criteria_store.save(self.category, &self.criteria);
        Ok(())
    }

    /// Restores the built-in default weights and persists them
    pub fn reset_criteria(&mut self, criteria_store: &CriteriaStore) {
        self.criteria = criteria_store.reset(self.category);
    }

    /// Recomputes the ranking for the current snapshot: backfill missing
    /// attributes, score, sort. Deterministic for a fixed (items, criteria,
    /// cache) tuple; attributes whose backfill is still unresolved score 0
    /// until a later recomputation sees them.
    pub async fn ranking(&self) -> Vec<ScoreRow> {
        self.resolver.resolve(&self.items).await;
        let merged = self.resolver.merged(&self.items);
        let rows = scoring::score(&merged, &self.criteria, Utc::now().year());
        ranking::rank(rows)
    }

    /// Opens the full breakdown and returns it.
    ///
    /// The first expansion for a given selection key records a history entry
    /// (signed-in users only); re-expanding the same selection emits nothing
    /// further. Expanding an Idle session just returns the degenerate result
    /// without a state change.
    pub async fn expand(&mut self, history: Arc<dyn HistoryStore>) -> Vec<ScoreRow> {
        if self.view != ViewState::Idle {
            self.view = ViewState::Expanded;
            self.record_history(history);
        }
        self.ranking().await
    }

    pub fn collapse(&mut self) {
        if self.view == ViewState::Expanded {
            self.view = ViewState::Collapsed;
        }
    }

    /// Fire-and-forget history append, at most once per selection key per
    /// session. Failures are logged and never surface to the caller.
    fn record_history(&mut self, history: Arc<dyn HistoryStore>) {
        let Some(user_id) = self.user_id.clone() else {
            return;
        };

        let key = ranking::selection_key(&self.items.iter().map(|i| i.id).collect::<Vec<_>>());
        if !self.emitted.insert(key) {
            return;
        }

        let entry = ComparisonHistoryEntry {
            category: self.category,
            titles: self.items.iter().map(|i| i.title.clone()).collect(),
            ids: self.items.iter().map(|i| i.id).collect(),
            timestamp: Utc::now(),
        };

        tokio::spawn(async move {
            if let Err(e) = history.append(&user_id, &entry).await {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to record comparison history");
            }
        });
    }
}
