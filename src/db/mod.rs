pub mod cache;
pub mod history;
pub mod postgres;
pub mod preferences;

pub use cache::create_redis_client;
pub use cache::Cache;
pub use cache::CacheKey;
pub use history::{HistoryStore, PgHistoryStore};
#[cfg(test)]
pub use history::MockHistoryStore;
pub use postgres::create_pool;
pub use preferences::{JsonFilePreferences, MemoryPreferences, PreferenceStore};
