use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::error::AppResult;
use crate::models::ComparisonHistoryEntry;

/// Append-only store of performed comparisons, kept per signed-in user
///
/// Writes are fire-and-forget from the engine's perspective: a failed append
/// never blocks or rolls back the ranking that triggered it.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, user_id: &str, entry: &ComparisonHistoryEntry) -> AppResult<()>;

    /// Most recent entries for a user, newest first
    async fn recent(&self, user_id: &str, limit: i64) -> AppResult<Vec<ComparisonHistoryEntry>>;
}

/// PostgreSQL-backed history store
pub struct PgHistoryStore {
    pool: PgPool,
}

impl PgHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl HistoryStore for PgHistoryStore {
    async fn append(&self, user_id: &str, entry: &ComparisonHistoryEntry) -> AppResult<()> {
        let ids: Vec<i64> = entry.ids.iter().map(|id| *id as i64).collect();

        sqlx::query(
            r#"
            INSERT INTO comparison_history (user_id, category, titles, ids, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(entry.category.to_string())
        .bind(&entry.titles)
        .bind(&ids)
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await?;

        tracing::info!(
            user_id = %user_id,
            category = %entry.category,
            items = entry.ids.len(),
            "Comparison recorded"
        );

        Ok(())
    }

    async fn recent(&self, user_id: &str, limit: i64) -> AppResult<Vec<ComparisonHistoryEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT category, titles, ids, created_at
            FROM comparison_history
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let category: String = row.try_get("category")?;
            let titles: Vec<String> = row.try_get("titles")?;
            let ids: Vec<i64> = row.try_get("ids")?;
            let created_at: DateTime<Utc> = row.try_get("created_at")?;

            let Ok(category) = category.parse() else {
                tracing::warn!(category = %category, "Skipping history row with unknown category");
                continue;
            };

            entries.push(ComparisonHistoryEntry {
                category,
                titles,
                ids: ids.into_iter().map(|id| id as u64).collect(),
                timestamp: created_at,
            });
        }

        Ok(entries)
    }
}
