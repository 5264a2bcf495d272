use chrono::NaiveDateTime;
use sqlx::{PgPool, Result as SqlxResult};
use tracing::instrument;
use uuid::Uuid;

use crate::db::prelude::*;

/// Read-only access to the activity tables the scoring engine consumes.
///
/// Every fetch takes an optional user-id filter (`None` = unscoped, the
/// whole population) and an optional `created_at` lower bound used by the
/// period-filtered leaderboards.
pub struct ActivityRepository {
    pool: &'static PgPool,
}

fn raw_ids(ids: Option<&[UserId]>) -> Option<Vec<Uuid>> {
    ids.map(|ids| ids.iter().map(|id| id.0).collect())
}

impl ActivityRepository {
    pub fn new(pool: &'static PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, user_ids))]
    pub async fn consumption_items(
        &self,
        user_ids: Option<&[UserId]>,
        since: Option<NaiveDateTime>,
    ) -> SqlxResult<Vec<ConsumptionItem>> {
        sqlx::query_as::<_, ConsumptionItem>(
            r#"
            SELECT id, user_id, media_type, note, created_at
            FROM consumption_items
            WHERE ($1::uuid[] IS NULL OR user_id = ANY($1))
            AND ($2::timestamp IS NULL OR created_at >= $2)
            "#,
        )
        .bind(raw_ids(user_ids))
        .bind(since)
        .fetch_all(self.pool)
        .await
    }

    #[instrument(skip(self, user_ids))]
    pub async fn posts(
        &self,
        user_ids: Option<&[UserId]>,
        since: Option<NaiveDateTime>,
    ) -> SqlxResult<Vec<Post>> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, like_count, comment_count, created_at
            FROM posts
            WHERE ($1::uuid[] IS NULL OR user_id = ANY($1))
            AND ($2::timestamp IS NULL OR created_at >= $2)
            "#,
        )
        .bind(raw_ids(user_ids))
        .bind(since)
        .fetch_all(self.pool)
        .await
    }

    #[instrument(skip(self, user_ids))]
    pub async fn likes_given(
        &self,
        user_ids: Option<&[UserId]>,
        since: Option<NaiveDateTime>,
    ) -> SqlxResult<Vec<PostLike>> {
        sqlx::query_as::<_, PostLike>(
            r#"
            SELECT id, user_id, post_id, created_at
            FROM post_likes
            WHERE ($1::uuid[] IS NULL OR user_id = ANY($1))
            AND ($2::timestamp IS NULL OR created_at >= $2)
            "#,
        )
        .bind(raw_ids(user_ids))
        .bind(since)
        .fetch_all(self.pool)
        .await
    }

    #[instrument(skip(self, user_ids))]
    pub async fn comments_made(
        &self,
        user_ids: Option<&[UserId]>,
        since: Option<NaiveDateTime>,
    ) -> SqlxResult<Vec<PostComment>> {
        sqlx::query_as::<_, PostComment>(
            r#"
            SELECT id, user_id, post_id, created_at
            FROM post_comments
            WHERE ($1::uuid[] IS NULL OR user_id = ANY($1))
            AND ($2::timestamp IS NULL OR created_at >= $2)
            "#,
        )
        .bind(raw_ids(user_ids))
        .bind(since)
        .fetch_all(self.pool)
        .await
    }

    #[instrument(skip(self, user_ids))]
    pub async fn pool_entries(
        &self,
        user_ids: Option<&[UserId]>,
        since: Option<NaiveDateTime>,
    ) -> SqlxResult<Vec<PoolEntry>> {
        sqlx::query_as::<_, PoolEntry>(
            r#"
            SELECT id, user_id, pool_type, points_earned, is_correct, created_at
            FROM pool_entries
            WHERE ($1::uuid[] IS NULL OR user_id = ANY($1))
            AND ($2::timestamp IS NULL OR created_at >= $2)
            "#,
        )
        .bind(raw_ids(user_ids))
        .bind(since)
        .fetch_all(self.pool)
        .await
    }

    #[instrument(skip(self, user_ids))]
    pub async fn rank_lists(
        &self,
        user_ids: Option<&[UserId]>,
        since: Option<NaiveDateTime>,
    ) -> SqlxResult<Vec<RankList>> {
        sqlx::query_as::<_, RankList>(
            r#"
            SELECT id, user_id, title, created_at
            FROM rank_lists
            WHERE ($1::uuid[] IS NULL OR user_id = ANY($1))
            AND ($2::timestamp IS NULL OR created_at >= $2)
            "#,
        )
        .bind(raw_ids(user_ids))
        .bind(since)
        .fetch_all(self.pool)
        .await
    }

    #[instrument(skip(self, user_ids))]
    pub async fn wager_wins(
        &self,
        user_ids: Option<&[UserId]>,
        since: Option<NaiveDateTime>,
    ) -> SqlxResult<Vec<WagerWin>> {
        sqlx::query_as::<_, WagerWin>(
            r#"
            SELECT id, user_id, points_awarded, created_at
            FROM wager_wins
            WHERE ($1::uuid[] IS NULL OR user_id = ANY($1))
            AND ($2::timestamp IS NULL OR created_at >= $2)
            "#,
        )
        .bind(raw_ids(user_ids))
        .bind(since)
        .fetch_all(self.pool)
        .await
    }

    /// Accepted friendship rows touching any of `user_ids`, from either
    /// directional column.
    #[instrument(skip(self, user_ids))]
    pub async fn accepted_friendships(
        &self,
        user_ids: &[UserId],
        since: Option<NaiveDateTime>,
    ) -> SqlxResult<Vec<Friendship>> {
        let ids: Vec<Uuid> = user_ids.iter().map(|id| id.0).collect();
        sqlx::query_as::<_, Friendship>(
            r#"
            SELECT id, user_id, friend_id, status, created_at
            FROM friendships
            WHERE status = 'accepted'
            AND (user_id = ANY($1) OR friend_id = ANY($1))
            AND ($2::timestamp IS NULL OR created_at >= $2)
            "#,
        )
        .bind(ids)
        .bind(since)
        .fetch_all(self.pool)
        .await
    }

    /// Rewarded referrals credited to any of `referrer_ids`.
    #[instrument(skip(self, referrer_ids))]
    pub async fn rewarded_referrals(
        &self,
        referrer_ids: &[UserId],
        since: Option<NaiveDateTime>,
    ) -> SqlxResult<Vec<Referral>> {
        let ids: Vec<Uuid> = referrer_ids.iter().map(|id| id.0).collect();
        sqlx::query_as::<_, Referral>(
            r#"
            SELECT id, referrer_id, referred_id, rewarded, created_at
            FROM referrals
            WHERE rewarded = TRUE
            AND referrer_id = ANY($1)
            AND ($2::timestamp IS NULL OR created_at >= $2)
            "#,
        )
        .bind(ids)
        .bind(since)
        .fetch_all(self.pool)
        .await
    }
}
