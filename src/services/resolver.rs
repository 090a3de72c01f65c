use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::models::{Category, DetailAttributes, MediaItem};
use crate::services::providers::MetadataProvider;

/// Lazily completes the attribute tuples of the items under comparison
///
/// Summary records routinely omit runtime/revenue/budget (films) or
/// season/episode counts (series). The resolver fetches the detail record for
/// any item still missing one of those and memoizes the result per item id,
/// so repeated resolution of the same selection is free. One resolver lives
/// per comparison session; its cache is session state, not a process global.
///
/// Fetch failures are swallowed: the attribute stays absent and scores 0
/// until a later resolution succeeds.
pub struct AttributeResolver {
    provider: Arc<dyn MetadataProvider>,
    state: Mutex<ResolverState>,
}

#[derive(Default)]
struct ResolverState {
    cache: HashMap<u64, DetailAttributes>,
    /// Ids with a fetch currently in flight; a concurrent resolve for one of
    /// these must not issue a duplicate fetch
    in_flight: HashSet<u64>,
}

impl AttributeResolver {
    pub fn new(provider: Arc<dyn MetadataProvider>) -> Self {
        Self {
            provider,
            state: Mutex::new(ResolverState::default()),
        }
    }

    /// Backfills missing attributes for `items`, fetching concurrently.
    ///
    /// Fetches for distinct ids are independent and may complete in any
    /// order; each lands in its own cache slot. An id already cached or in
    /// flight is skipped. A successful fetch marks the id resolved even if
    /// some fields are genuinely null upstream; that is what makes
    /// resolution idempotent.
    pub async fn resolve(&self, items: &[MediaItem]) {
        let pending: Vec<(u64, Category)> = {
            let mut state = self.state.lock().expect("resolver state poisoned");
            let mut pending = Vec::new();
            for item in items {
                if item.missing_details()
                    && !state.cache.contains_key(&item.id)
                    && !state.in_flight.contains(&item.id)
                {
                    state.in_flight.insert(item.id);
                    pending.push((item.id, item.category));
                }
            }
            pending
        };

        if pending.is_empty() {
            return;
        }

        tracing::debug!(count = pending.len(), "Backfilling item details");

        let mut tasks = Vec::with_capacity(pending.len());
        for (id, category) in pending {
            let provider = Arc::clone(&self.provider);
            let task = tokio::spawn(async move { provider.fetch_detail(category, id).await });
            tasks.push((id, task));
        }

        for (id, task) in tasks {
            let outcome = task.await;
            let mut state = self.state.lock().expect("resolver state poisoned");
            state.in_flight.remove(&id);
            match outcome {
                Ok(Ok(details)) => {
                    state.cache.insert(id, details);
                }
                Ok(Err(e)) => {
                    tracing::debug!(id = id, error = %e, "Detail backfill failed; attributes stay absent");
                }
                Err(e) => {
                    tracing::debug!(id = id, error = %e, "Detail backfill task panicked");
                }
            }
        }
    }

    /// Copies of `items` with cached detail attributes merged in. Known
    /// values are never contradicted; unresolved attributes stay absent.
    pub fn merged(&self, items: &[MediaItem]) -> Vec<MediaItem> {
        let state = self.state.lock().expect("resolver state poisoned");
        items
            .iter()
            .map(|item| {
                let mut merged = item.clone();
                if let Some(details) = state.cache.get(&item.id) {
                    merged.merge_details(details);
                }
                merged
            })
            .collect()
    }

    /// Cached detail record for an id, if one has been fetched
    pub fn cached(&self, id: u64) -> Option<DetailAttributes> {
        self.state
            .lock()
            .expect("resolver state poisoned")
            .cache
            .get(&id)
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::providers::MockMetadataProvider;

    fn incomplete_film(id: u64) -> MediaItem {
        MediaItem {
            id,
            category: Category::Film,
            title: format!("Film {}", id),
            rating: 7.0,
            release_date: None,
            popularity: 10.0,
            vote_count: 100,
            poster_path: None,
            runtime: None,
            revenue: None,
            budget: None,
            seasons: None,
            episodes: None,
            episode_runtime: None,
        }
    }

    fn film_details() -> DetailAttributes {
        DetailAttributes {
            runtime: Some(148),
            revenue: Some(825_000_000),
            budget: Some(160_000_000),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_resolve_backfills_missing_attributes() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_fetch_detail()
            .times(1)
            .returning(|_, _| Ok(film_details()));

        let resolver = AttributeResolver::new(Arc::new(provider));
        let items = vec![incomplete_film(1)];

        resolver.resolve(&items).await;

        let merged = resolver.merged(&items);
        assert_eq!(merged[0].runtime, Some(148));
        assert_eq!(merged[0].revenue, Some(825_000_000));
        assert_eq!(merged[0].budget, Some(160_000_000));
        // The selection itself is untouched
        assert_eq!(items[0].runtime, None);
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_fetch_detail()
            .times(1)
            .returning(|_, _| Ok(film_details()));

        let resolver = AttributeResolver::new(Arc::new(provider));
        let items = vec![incomplete_film(1)];

        resolver.resolve(&items).await;
        resolver.resolve(&items).await;

        assert!(resolver.cached(1).is_some());
    }

    #[tokio::test]
    async fn test_complete_items_issue_no_fetch() {
        // No expectation registered: any fetch would panic the mock
        let provider = MockMetadataProvider::new();
        let resolver = AttributeResolver::new(Arc::new(provider));

        let mut item = incomplete_film(1);
        item.runtime = Some(120);
        item.revenue = Some(1_000_000);
        item.budget = Some(500_000);

        resolver.resolve(&[item]).await;
        assert!(resolver.cached(1).is_none());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_swallowed() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_fetch_detail()
            .times(1)
            .returning(|_, _| Err(AppError::ExternalApi("503".to_string())));

        let resolver = AttributeResolver::new(Arc::new(provider));
        let items = vec![incomplete_film(1)];

        resolver.resolve(&items).await;

        // The attribute stays absent and nothing is cached for the id
        let merged = resolver.merged(&items);
        assert_eq!(merged[0].runtime, None);
        assert!(resolver.cached(1).is_none());
    }

    #[tokio::test]
    async fn test_failed_fetch_retried_on_next_resolve() {
        let mut provider = MockMetadataProvider::new();
        let mut attempts = 0;
        provider.expect_fetch_detail().times(2).returning(move |_, _| {
            attempts += 1;
            if attempts == 1 {
                Err(AppError::ExternalApi("503".to_string()))
            } else {
                Ok(film_details())
            }
        });

        let resolver = AttributeResolver::new(Arc::new(provider));
        let items = vec![incomplete_film(1)];

        resolver.resolve(&items).await;
        resolver.resolve(&items).await;

        assert_eq!(resolver.cached(1), Some(film_details()));
    }

    #[tokio::test]
    async fn test_distinct_ids_fetched_independently() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_fetch_detail()
            .times(3)
            .returning(|_, id| {
                Ok(DetailAttributes {
                    runtime: Some(100 + id as u32),
                    revenue: Some(0),
                    budget: Some(0),
                    ..Default::default()
                })
            });

        let resolver = AttributeResolver::new(Arc::new(provider));
        let items: Vec<MediaItem> = (1..=3).map(incomplete_film).collect();

        resolver.resolve(&items).await;

        let merged = resolver.merged(&items);
        assert_eq!(merged[0].runtime, Some(101));
        assert_eq!(merged[1].runtime, Some(102));
        assert_eq!(merged[2].runtime, Some(103));
    }
}
