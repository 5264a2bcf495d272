use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Extension, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::api::middleware::auth::Caller;
use crate::api::server::{AppState, JsonResult, RouteError};
use crate::db::prelude::*;
use crate::leaderboard::{LeaderboardEntry, LeaderboardQuery, LeaderboardService};
use crate::scoring::breakdown::{CategoryCounts, CategoryPoints, EngagementBreakdown};
use crate::scoring::engine::ScoringEngine;
use crate::scoring::rank::RankPlacement;

#[derive(Debug, Deserialize)]
pub struct ComputeParams {
    pub user_id: Option<UserId>,
}

#[derive(Debug, Serialize)]
pub struct PointsResponse {
    pub success: bool,
    pub points: CategoryPoints,
    pub counts: CategoryCounts,
    #[serde(rename = "engagementBreakdown")]
    pub engagement_breakdown: EngagementBreakdown,
    pub rank: RankPlacement,
}

/// Recomputes the full score profile for the caller, or for `user_id`
/// when the param names someone else. A missing caller profile is only
/// created lazily on self-scoring, never for a third-party target.
#[instrument(skip(state, caller))]
pub async fn compute_points(
    State(state): State<Arc<AppState>>,
    Extension(Caller(caller)): Extension<Caller>,
    Query(params): Query<ComputeParams>,
) -> JsonResult<PointsResponse> {
    let users = UserRepository::new(state.db_pool);
    let caller_id = UserId::from(caller.id);

    let target = match params.user_id {
        Some(target) => target,
        None => {
            let existing = users
                .get_by_id(&caller_id)
                .await
                .map_err(RouteError::UserLookupFailed)?;

            if existing.is_none() {
                users
                    .create_from_identity(&caller)
                    .await
                    .map_err(RouteError::UserCreationFailed)?;
            }

            caller_id
        }
    };

    let profile = ScoringEngine::new(state.db_pool)
        .compute_score_and_rank(target)
        .await?;

    Ok(Json(PointsResponse {
        success: true,
        points: profile.breakdown.points,
        counts: profile.breakdown.counts,
        engagement_breakdown: profile.breakdown.engagement,
        rank: profile.rank,
    }))
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub categories: BTreeMap<&'static str, Vec<LeaderboardEntry>>,
    #[serde(rename = "currentUserId")]
    pub current_user_id: UserId,
    pub scope: &'static str,
    pub period: &'static str,
}

#[instrument(skip(state, caller))]
pub async fn get_leaderboards(
    State(state): State<Arc<AppState>>,
    Extension(Caller(caller)): Extension<Caller>,
    Query(query): Query<LeaderboardQuery>,
) -> JsonResult<LeaderboardResponse> {
    let caller_id = UserId::from(caller.id);

    UserRepository::new(state.db_pool)
        .get_by_id(&caller_id)
        .await
        .map_err(RouteError::ProfileLookupFailed)?
        .ok_or(RouteError::UnknownUser)?;

    let categories = LeaderboardService::new(state.db_pool)
        .compute(caller_id, &query)
        .await?;

    Ok(Json(LeaderboardResponse {
        categories,
        current_user_id: caller_id,
        scope: query.scope.as_str(),
        period: query.period.as_str(),
    }))
}
