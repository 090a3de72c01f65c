/// Metadata provider abstraction
///
/// The comparison engine consumes catalog metadata through this trait so the
/// concrete source (TMDB today) stays pluggable. Summary records come from
/// search and curated lists; `fetch_detail` supplies the attributes those
/// records omit, which the resolver backfills on demand.
use crate::{
    error::AppResult,
    models::{Category, DetailAttributes, ListKind, MediaItem},
};

pub mod tmdb;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Search for items by name within one category
    async fn search(&self, category: Category, query: &str) -> AppResult<Vec<MediaItem>>;

    /// Fetch one page of a curated list (popular, top rated, trending)
    async fn fetch_list(
        &self,
        category: Category,
        list: ListKind,
        page: u32,
    ) -> AppResult<Vec<MediaItem>>;

    /// Fetch the full detail record for one item id
    ///
    /// Failure leaves the affected attributes absent downstream; callers are
    /// expected to degrade rather than surface the error.
    async fn fetch_detail(&self, category: Category, id: u64) -> AppResult<DetailAttributes>;
}
