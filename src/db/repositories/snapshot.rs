use sqlx::{PgPool, Result as SqlxResult};
use tracing::instrument;

use crate::db::prelude::UserId;

/// Writes computed category totals back to `score_snapshots`. The caller
/// treats failures as non-fatal; nothing in the scoring path reads these
/// rows back.
pub struct SnapshotRepository {
    pool: &'static PgPool,
}

impl SnapshotRepository {
    pub fn new(pool: &'static PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, totals), fields(count = totals.len()))]
    pub async fn upsert_all(
        &self,
        user_id: &UserId,
        totals: &[(&'static str, i64)],
    ) -> SqlxResult<()> {
        let mut tx = self.pool.begin().await?;

        for (category, points) in totals {
            sqlx::query(
                r#"
                INSERT INTO score_snapshots (user_id, category, points)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id, category)
                DO UPDATE SET
                    points = $3,
                    updated_at = NOW()
                "#,
            )
            .bind(user_id)
            .bind(category)
            .bind(points)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
