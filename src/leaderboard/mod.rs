use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::instrument;

use crate::db::prelude::*;
use crate::db::PgResult;
use crate::leaderboard::shape::ScoredUser;

pub mod shape;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    All,
    Overall,
    Predictions,
    Trivia,
    Polls,
    Bets,
    Books,
    Movies,
    Tv,
    Music,
    Podcasts,
    Games,
    Reviews,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeFilter {
    Global,
    Friends,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodFilter {
    AllTime,
    Weekly,
    Monthly,
}

impl CategoryFilter {
    const BOARDS: [CategoryFilter; 12] = [
        CategoryFilter::Overall,
        CategoryFilter::Predictions,
        CategoryFilter::Trivia,
        CategoryFilter::Polls,
        CategoryFilter::Bets,
        CategoryFilter::Books,
        CategoryFilter::Movies,
        CategoryFilter::Tv,
        CategoryFilter::Music,
        CategoryFilter::Podcasts,
        CategoryFilter::Games,
        CategoryFilter::Reviews,
    ];

    /// The concrete boards this filter selects; `all` fans out to every one.
    pub fn boards(&self) -> Vec<CategoryFilter> {
        match self {
            Self::All => Self::BOARDS.to_vec(),
            single => vec![*single],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Overall => "overall",
            Self::Predictions => "predictions",
            Self::Trivia => "trivia",
            Self::Polls => "polls",
            Self::Bets => "bets",
            Self::Books => "books",
            Self::Movies => "movies",
            Self::Tv => "tv",
            Self::Music => "music",
            Self::Podcasts => "podcasts",
            Self::Games => "games",
            Self::Reviews => "reviews",
        }
    }

    fn media(&self) -> Option<MediaType> {
        match self {
            Self::Books => Some(MediaType::Book),
            Self::Movies => Some(MediaType::Movie),
            Self::Tv => Some(MediaType::Tv),
            Self::Music => Some(MediaType::Music),
            Self::Podcasts => Some(MediaType::Podcast),
            Self::Games => Some(MediaType::Game),
            _ => None,
        }
    }
}

impl ScopeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Friends => "friends",
        }
    }
}

impl PeriodFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllTime => "all_time",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Lower bound on `created_at` for every underlying read, relative to
    /// `now`; `all_time` applies no bound.
    pub fn cutoff_from(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            Self::AllTime => None,
            Self::Weekly => Some(now - Duration::days(7)),
            Self::Monthly => Some(now - Duration::days(30)),
        }
    }
}

#[inline]
const fn default_category() -> CategoryFilter {
    CategoryFilter::All
}

#[inline]
const fn default_scope() -> ScopeFilter {
    ScopeFilter::Global
}

#[inline]
const fn default_period() -> PeriodFilter {
    PeriodFilter::AllTime
}

#[inline]
const fn default_limit() -> i64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default = "default_category")]
    pub category: CategoryFilter,
    #[serde(default = "default_scope")]
    pub scope: ScopeFilter,
    #[serde(default = "default_period")]
    pub period: PeriodFilter,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub user_id: UserId,
    pub username: String,
    pub display_name: Option<String>,
    pub score: i64,
    pub rank: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

pub struct LeaderboardService {
    pool: &'static PgPool,
}

fn soft<T>(table: &'static str, result: sqlx::Result<Vec<T>>) -> Vec<T> {
    match result {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(error = ?e, table, "leaderboard read failed, board scored as empty");
            Vec::new()
        }
    }
}

impl LeaderboardService {
    pub fn new(pool: &'static PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn compute(
        &self,
        caller: UserId,
        query: &LeaderboardQuery,
    ) -> PgResult<BTreeMap<&'static str, Vec<LeaderboardEntry>>> {
        let repo = ActivityRepository::new(self.pool);
        let boards = query.category.boards();
        let since = query.period.cutoff_from(Utc::now().naive_utc());

        let scope_ids: Option<Vec<UserId>> = match query.scope {
            ScopeFilter::Global => None,
            ScopeFilter::Friends => {
                // scope membership ignores the period bound; the window
                // narrows what gets scored, not who counts as a friend
                let edges = repo.accepted_friendships(&[caller], None).await?;
                Some(shape::friend_circle(caller, &edges))
            }
        };
        let scope = scope_ids.as_deref();

        let needs_items = boards
            .iter()
            .any(|b| b.media().is_some() || *b == CategoryFilter::Reviews);
        let needs_entries = boards.iter().any(|b| {
            matches!(
                b,
                CategoryFilter::Predictions
                    | CategoryFilter::Trivia
                    | CategoryFilter::Polls
                    | CategoryFilter::Overall
            )
        });
        let needs_wins = boards.contains(&CategoryFilter::Bets);
        let needs_social = boards.contains(&CategoryFilter::Overall);

        let items = if needs_items {
            soft("consumption_items", repo.consumption_items(scope, since).await)
        } else {
            Vec::new()
        };
        let entries = if needs_entries {
            soft("pool_entries", repo.pool_entries(scope, since).await)
        } else {
            Vec::new()
        };
        let wins = if needs_wins {
            soft("wager_wins", repo.wager_wins(scope, since).await)
        } else {
            Vec::new()
        };
        let (posts, likes, comments, ranks) = if needs_social {
            let (posts, likes, comments, ranks) = futures::join!(
                repo.posts(scope, since),
                repo.likes_given(scope, since),
                repo.comments_made(scope, since),
                repo.rank_lists(scope, since),
            );
            (
                soft("posts", posts),
                soft("post_likes", likes),
                soft("post_comments", comments),
                soft("rank_lists", ranks),
            )
        } else {
            Default::default()
        };

        let mut ranked: BTreeMap<&'static str, Vec<(i64, ScoredUser)>> = BTreeMap::new();
        for board in boards {
            let scored = if let Some(media) = board.media() {
                shape::consumption_board(&items, media)
            } else {
                match board {
                    CategoryFilter::Reviews => shape::review_board(&items),
                    CategoryFilter::Predictions => shape::pool_board(&entries, PoolKind::Prediction),
                    CategoryFilter::Trivia => shape::pool_board(&entries, PoolKind::Trivia),
                    CategoryFilter::Polls => shape::pool_board(&entries, PoolKind::Poll),
                    CategoryFilter::Bets => shape::bets_board(&wins),
                    CategoryFilter::Overall => {
                        shape::overall_board(&posts, &likes, &comments, &entries, &ranks)
                    }
                    // `all` has already been fanned out, media boards handled above
                    _ => continue,
                }
            };

            ranked.insert(board.as_str(), shape::rank_entries(scored, query.limit));
        }

        let mut seen: HashSet<UserId> = HashSet::new();
        let user_ids: Vec<UserId> = ranked
            .values()
            .flatten()
            .map(|(_, s)| s.user_id)
            .filter(|id| seen.insert(*id))
            .collect();

        let users: HashMap<UserId, User> = UserRepository::new(self.pool)
            .get_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let categories = ranked
            .into_iter()
            .map(|(name, board)| {
                let entries = board
                    .into_iter()
                    .map(|(rank, scored)| {
                        let profile = users.get(&scored.user_id);
                        LeaderboardEntry {
                            user_id: scored.user_id,
                            username: profile
                                .map(|u| u.username.clone())
                                .unwrap_or_else(|| scored.user_id.to_string()),
                            display_name: profile.and_then(|u| u.display_name.clone()),
                            score: scored.score,
                            rank,
                            detail: scored.detail,
                        }
                    })
                    .collect();
                (name, entries)
            })
            .collect();

        Ok(categories)
    }
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;

    use super::*;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn period_cutoffs() {
        let now = at(2025, 6, 20);
        assert_eq!(PeriodFilter::AllTime.cutoff_from(now), None);
        assert_eq!(PeriodFilter::Weekly.cutoff_from(now), Some(at(2025, 6, 13)));
        assert_eq!(PeriodFilter::Monthly.cutoff_from(now), Some(at(2025, 5, 21)));
    }

    #[test]
    fn ten_day_old_item_is_outside_the_weekly_window() {
        let now = at(2025, 6, 20);
        let created = at(2025, 6, 10);
        let weekly = PeriodFilter::Weekly.cutoff_from(now).unwrap();

        assert!(created < weekly);
        assert!(PeriodFilter::AllTime.cutoff_from(now).is_none_or(|c| created >= c));
    }

    #[test]
    fn all_filter_fans_out_to_every_board() {
        let boards = CategoryFilter::All.boards();
        assert_eq!(boards.len(), 12);
        assert!(!boards.contains(&CategoryFilter::All));
        assert_eq!(CategoryFilter::Trivia.boards(), vec![CategoryFilter::Trivia]);
    }

    #[test]
    fn query_defaults_from_empty_params() {
        let query: LeaderboardQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.category, CategoryFilter::All);
        assert_eq!(query.scope, ScopeFilter::Global);
        assert_eq!(query.period, PeriodFilter::AllTime);
        assert_eq!(query.limit, 10);

        let query: LeaderboardQuery =
            serde_json::from_str(r#"{"category":"tv","scope":"friends","period":"weekly","limit":3}"#)
                .unwrap();
        assert_eq!(query.category, CategoryFilter::Tv);
        assert_eq!(query.scope, ScopeFilter::Friends);
        assert_eq!(query.period, PeriodFilter::Weekly);
        assert_eq!(query.limit, 3);
    }
}
