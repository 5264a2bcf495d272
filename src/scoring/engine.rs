use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use crate::db::prelude::*;
use crate::scoring::breakdown::{ActivitySet, ScoreBreakdown};
use crate::scoring::rank::{RankPlacement, rank_among, ranking_totals};

pub type ScoringResult<T> = core::result::Result<T, ScoringError>;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("failed to fetch consumption items for user {0}: {1}")]
    FailedToFetchUserItems(UserId, sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct ScoreProfile {
    pub breakdown: ScoreBreakdown,
    pub rank: RankPlacement,
}

/// Full-scan scoring: every request recomputes every category from the raw
/// activity tables, so the result is a pure function of current state.
pub struct ScoringEngine {
    pool: &'static PgPool,
}

fn soft<T>(table: &'static str, result: sqlx::Result<Vec<T>>) -> Vec<T> {
    match result {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(error = ?e, table, "activity read failed, scoring category as empty");
            Vec::new()
        }
    }
}

impl ScoringEngine {
    pub fn new(pool: &'static PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn compute_score_and_rank(&self, target: UserId) -> ScoringResult<ScoreProfile> {
        let repo = ActivityRepository::new(self.pool);
        let ids = [target];

        // The one fatal read: without the target's consumption items there
        // is no meaningful score to return.
        let items = repo
            .consumption_items(Some(&ids), None)
            .await
            .map_err(|e| ScoringError::FailedToFetchUserItems(target, e))?;

        let (posts, likes_given, comments_made, pool_entries, rank_lists, wager_wins, friendships, referrals) =
            futures::join!(
                repo.posts(Some(&ids), None),
                repo.likes_given(Some(&ids), None),
                repo.comments_made(Some(&ids), None),
                repo.pool_entries(Some(&ids), None),
                repo.rank_lists(Some(&ids), None),
                repo.wager_wins(Some(&ids), None),
                repo.accepted_friendships(&ids, None),
                repo.rewarded_referrals(&ids, None),
            );

        let activity = ActivitySet {
            items,
            posts: soft("posts", posts),
            likes_given: soft("post_likes", likes_given),
            comments_made: soft("post_comments", comments_made),
            pool_entries: soft("pool_entries", pool_entries),
            rank_lists: soft("rank_lists", rank_lists),
            wager_wins: soft("wager_wins", wager_wins),
            friendships: soft("friendships", friendships),
            referrals: soft("referrals", referrals),
        };

        let breakdown = ScoreBreakdown::compute(target, &activity);

        // Unscoped population scan for the global rank. Each read degrades
        // to empty on failure, same as the per-user soft reads.
        let (all_items, all_entries, all_wins) = futures::join!(
            repo.consumption_items(None, None),
            repo.pool_entries(None, None),
            repo.wager_wins(None, None),
        );
        let totals = ranking_totals(
            &soft("consumption_items", all_items),
            &soft("pool_entries", all_entries),
            &soft("wager_wins", all_wins),
        );
        let rank = rank_among(&totals, target);

        // Snapshot persistence is fire-and-forget: the response below is
        // already final, so a failed write only gets logged.
        let snapshot_rows = breakdown.points.as_snapshot_rows();
        if let Err(e) = SnapshotRepository::new(self.pool)
            .upsert_all(&target, &snapshot_rows)
            .await
        {
            tracing::warn!(error = ?e, user_id = %target, "score snapshot upsert failed");
        }

        Ok(ScoreProfile { breakdown, rank })
    }
}
