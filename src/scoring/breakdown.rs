use std::collections::HashSet;

use serde::Serialize;

use crate::db::prelude::*;
use crate::scoring::{Category, weights};

/// Everything the engine reads about one user, gathered up front so the
/// aggregation itself is a pure function of current state.
#[derive(Debug, Clone, Default)]
pub struct ActivitySet {
    pub items: Vec<ConsumptionItem>,
    pub posts: Vec<Post>,
    pub likes_given: Vec<PostLike>,
    pub comments_made: Vec<PostComment>,
    pub pool_entries: Vec<PoolEntry>,
    pub rank_lists: Vec<RankList>,
    pub wager_wins: Vec<WagerWin>,
    pub friendships: Vec<Friendship>,
    pub referrals: Vec<Referral>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryPoints {
    pub all_time: i64,
    pub books: i64,
    pub movies: i64,
    pub tv: i64,
    pub music: i64,
    pub podcasts: i64,
    pub games: i64,
    pub reviews: i64,
    pub predictions: i64,
    pub trivia: i64,
    pub polls: i64,
    pub bets: i64,
    pub friends: i64,
    pub referrals: i64,
    pub engagement: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub books: i64,
    pub movies: i64,
    pub tv: i64,
    pub music: i64,
    pub podcasts: i64,
    pub games: i64,
    pub reviews: i64,
    pub predictions: i64,
    pub trivia: i64,
    pub polls: i64,
    pub bets: i64,
    pub friends: i64,
    pub referrals: i64,
    pub engagement: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementBreakdown {
    pub posts: i64,
    pub likes_received: i64,
    pub comments_received: i64,
    pub likes_given: i64,
    pub comments_made: i64,
    pub predictions_participated: i64,
    pub ranks_created: i64,
}

#[derive(Debug, Clone, Default)]
pub struct ScoreBreakdown {
    pub points: CategoryPoints,
    pub counts: CategoryCounts,
    pub engagement: EngagementBreakdown,
}

impl CategoryPoints {
    pub fn get(&self, category: Category) -> i64 {
        match category {
            Category::AllTime => self.all_time,
            Category::Books => self.books,
            Category::Movies => self.movies,
            Category::Tv => self.tv,
            Category::Music => self.music,
            Category::Podcasts => self.podcasts,
            Category::Games => self.games,
            Category::Reviews => self.reviews,
            Category::Predictions => self.predictions,
            Category::Trivia => self.trivia,
            Category::Polls => self.polls,
            Category::Bets => self.bets,
            Category::Friends => self.friends,
            Category::Referrals => self.referrals,
            Category::Engagement => self.engagement,
        }
    }

    pub fn as_snapshot_rows(&self) -> Vec<(&'static str, i64)> {
        Category::ALL
            .iter()
            .map(|c| (c.as_str(), self.get(*c)))
            .collect()
    }
}

/// A note counts as a review only when non-empty after trimming.
pub fn has_review_note(note: Option<&str>) -> bool {
    note.is_some_and(|n| !n.trim().is_empty())
}

/// Counts distinct accepted friends of `target`, regardless of which
/// directional column the target appears in. A mutual pair of rows still
/// counts as one friend.
pub fn distinct_friend_count(target: UserId, friendships: &[Friendship]) -> i64 {
    let mut counterparties: HashSet<UserId> = HashSet::new();
    for edge in friendships {
        if edge.status != "accepted" {
            continue;
        }
        let other = if edge.user_id == target {
            edge.friend_id
        } else if edge.friend_id == target {
            edge.user_id
        } else {
            continue;
        };
        if other != target {
            counterparties.insert(other);
        }
    }

    counterparties.len() as i64
}

impl ScoreBreakdown {
    /// Weighted aggregation over one user's activity. Pure: calling this
    /// twice over the same rows yields identical totals.
    pub fn compute(target: UserId, activity: &ActivitySet) -> Self {
        let mut points = CategoryPoints::default();
        let mut counts = CategoryCounts::default();

        for item in &activity.items {
            if let Some(media) = MediaType::from_tag(&item.media_type) {
                let weight = weights::media_weight(media);
                match media {
                    MediaType::Book => {
                        counts.books += 1;
                        points.books += weight;
                    }
                    MediaType::Movie => {
                        counts.movies += 1;
                        points.movies += weight;
                    }
                    MediaType::Tv => {
                        counts.tv += 1;
                        points.tv += weight;
                    }
                    MediaType::Music => {
                        counts.music += 1;
                        points.music += weight;
                    }
                    MediaType::Podcast => {
                        counts.podcasts += 1;
                        points.podcasts += weight;
                    }
                    MediaType::Game => {
                        counts.games += 1;
                        points.games += weight;
                    }
                }
            }

            // Review points stack on top of the media-type points.
            if has_review_note(item.note.as_deref()) {
                counts.reviews += 1;
                points.reviews += weights::REVIEW;
            }
        }

        for entry in &activity.pool_entries {
            match PoolKind::from_tag(&entry.pool_type) {
                PoolKind::Trivia => {
                    counts.trivia += 1;
                    points.trivia += entry.points_earned;
                }
                PoolKind::Poll => {
                    counts.polls += 1;
                    points.polls += entry.points_earned;
                }
                PoolKind::Prediction => {
                    counts.predictions += 1;
                    points.predictions += entry.points_earned;
                }
            }
        }

        counts.bets = activity.wager_wins.len() as i64;
        points.bets = activity.wager_wins.iter().map(|w| w.points_awarded).sum();

        counts.friends = distinct_friend_count(target, &activity.friendships);
        points.friends = counts.friends * weights::FRIEND;

        counts.referrals = activity
            .referrals
            .iter()
            .filter(|r| r.rewarded && r.referrer_id == target)
            .count() as i64;
        points.referrals = counts.referrals * weights::REFERRAL;

        let engagement = EngagementBreakdown {
            posts: activity.posts.len() as i64,
            likes_received: activity.posts.iter().map(|p| p.like_count).sum(),
            comments_received: activity.posts.iter().map(|p| p.comment_count).sum(),
            likes_given: activity.likes_given.len() as i64,
            comments_made: activity.comments_made.len() as i64,
            predictions_participated: activity.pool_entries.len() as i64,
            ranks_created: activity.rank_lists.len() as i64,
        };

        // Pool participation is intentionally credited here a second time
        // on top of the predictions/trivia/polls categories.
        points.engagement = engagement.posts * weights::POST_CREATED
            + engagement.likes_received * weights::LIKE_RECEIVED
            + engagement.comments_received * weights::COMMENT_RECEIVED
            + engagement.likes_given * weights::LIKE_GIVEN
            + engagement.comments_made * weights::COMMENT_MADE
            + engagement.predictions_participated * weights::POOL_PARTICIPATION
            + engagement.ranks_created * weights::RANK_LIST_CREATED;

        counts.engagement = engagement.posts
            + engagement.likes_given
            + engagement.comments_made
            + engagement.predictions_participated
            + engagement.ranks_created;

        points.all_time = points.books
            + points.movies
            + points.tv
            + points.music
            + points.podcasts
            + points.games
            + points.reviews
            + points.predictions
            + points.trivia
            + points.polls
            + points.bets
            + points.friends
            + points.referrals
            + points.engagement;

        counts.total = counts.books
            + counts.movies
            + counts.tv
            + counts.music
            + counts.podcasts
            + counts.games
            + counts.reviews
            + counts.predictions
            + counts.trivia
            + counts.polls
            + counts.bets
            + counts.friends
            + counts.referrals
            + counts.engagement;

        Self {
            points,
            counts,
            engagement,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{NaiveDateTime, Utc};
    use uuid::Uuid;

    use crate::db::prelude::*;

    pub fn now() -> NaiveDateTime {
        Utc::now().naive_utc()
    }

    pub fn user() -> UserId {
        UserId(Uuid::new_v4())
    }

    pub fn item(user_id: UserId, media_type: &str, note: Option<&str>) -> ConsumptionItem {
        ConsumptionItem {
            id: Uuid::new_v4(),
            user_id,
            media_type: media_type.to_string(),
            note: note.map(str::to_owned),
            created_at: now(),
        }
    }

    pub fn post(user_id: UserId, like_count: i64, comment_count: i64) -> Post {
        Post {
            id: Uuid::new_v4(),
            user_id,
            like_count,
            comment_count,
            created_at: now(),
        }
    }

    pub fn like(user_id: UserId) -> PostLike {
        PostLike {
            id: Uuid::new_v4(),
            user_id,
            post_id: Uuid::new_v4(),
            created_at: now(),
        }
    }

    pub fn comment(user_id: UserId) -> PostComment {
        PostComment {
            id: Uuid::new_v4(),
            user_id,
            post_id: Uuid::new_v4(),
            created_at: now(),
        }
    }

    pub fn entry(user_id: UserId, pool_type: &str, points: i64, correct: Option<bool>) -> PoolEntry {
        PoolEntry {
            id: Uuid::new_v4(),
            user_id,
            pool_type: pool_type.to_string(),
            points_earned: points,
            is_correct: correct,
            created_at: now(),
        }
    }

    pub fn rank_list(user_id: UserId) -> RankList {
        RankList {
            id: Uuid::new_v4(),
            user_id,
            title: "top albums".to_string(),
            created_at: now(),
        }
    }

    pub fn win(user_id: UserId, points: i64) -> WagerWin {
        WagerWin {
            id: Uuid::new_v4(),
            user_id,
            points_awarded: points,
            created_at: now(),
        }
    }

    pub fn friendship(user_id: UserId, friend_id: UserId, status: &str) -> Friendship {
        Friendship {
            id: Uuid::new_v4(),
            user_id,
            friend_id,
            status: status.to_string(),
            created_at: now(),
        }
    }

    pub fn referral(referrer_id: UserId, rewarded: bool) -> Referral {
        Referral {
            id: Uuid::new_v4(),
            referrer_id,
            referred_id: user(),
            rewarded,
            created_at: now(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn zero_activity_scores_zero() {
        let target = user();
        let breakdown = ScoreBreakdown::compute(target, &ActivitySet::default());

        assert_eq!(breakdown.points, CategoryPoints::default());
        assert_eq!(breakdown.counts, CategoryCounts::default());
        assert_eq!(breakdown.engagement, EngagementBreakdown::default());
    }

    #[test]
    fn weighted_example() {
        // 2 movies, 1 reviewed book, 3 accepted friends:
        // movies=16, books=15, reviews=10, friends=15, all_time=56
        let target = user();
        let (a, b, c) = (user(), user(), user());
        let activity = ActivitySet {
            items: vec![
                item(target, "movie", None),
                item(target, "movie", Some("   ")),
                item(target, "book", Some("devastating ending")),
            ],
            friendships: vec![
                friendship(target, a, "accepted"),
                friendship(b, target, "accepted"),
                friendship(target, c, "accepted"),
            ],
            ..Default::default()
        };

        let breakdown = ScoreBreakdown::compute(target, &activity);
        assert_eq!(breakdown.points.movies, 16);
        assert_eq!(breakdown.points.books, 15);
        assert_eq!(breakdown.points.reviews, 10);
        assert_eq!(breakdown.points.friends, 15);
        assert_eq!(breakdown.points.all_time, 56);
        assert_eq!(breakdown.points.engagement, 0);
    }

    #[test]
    fn review_points_stack_on_media_points() {
        let target = user();
        let activity = ActivitySet {
            items: vec![item(target, "book", Some("a review"))],
            ..Default::default()
        };

        let breakdown = ScoreBreakdown::compute(target, &activity);
        assert_eq!(breakdown.points.books, 15);
        assert_eq!(breakdown.points.reviews, 10);
        assert_eq!(breakdown.points.all_time, 25);
    }

    #[test]
    fn whitespace_only_note_is_not_a_review() {
        assert!(!has_review_note(None));
        assert!(!has_review_note(Some("")));
        assert!(!has_review_note(Some("  \n\t ")));
        assert!(has_review_note(Some(" ok ")));
    }

    #[test]
    fn adding_a_book_adds_exactly_fifteen() {
        let target = user();
        let mut activity = ActivitySet {
            items: vec![item(target, "music", None), item(target, "game", None)],
            pool_entries: vec![entry(target, "trivia", 7, Some(true))],
            ..Default::default()
        };

        let before = ScoreBreakdown::compute(target, &activity);
        activity.items.push(item(target, "book", None));
        let after = ScoreBreakdown::compute(target, &activity);

        assert_eq!(after.points.books, before.points.books + 15);
        assert_eq!(after.points.all_time, before.points.all_time + 15);
        assert_eq!(after.counts.books, before.counts.books + 1);
    }

    #[test]
    fn all_time_is_the_sum_of_the_categories() {
        let target = user();
        let activity = ActivitySet {
            items: vec![
                item(target, "book", Some("note")),
                item(target, "tv", None),
                item(target, "podcast", None),
            ],
            posts: vec![post(target, 4, 2)],
            likes_given: vec![like(target)],
            comments_made: vec![comment(target), comment(target)],
            pool_entries: vec![
                entry(target, "predict", 30, Some(true)),
                entry(target, "vote", 5, None),
                entry(target, "trivia", 12, Some(false)),
            ],
            rank_lists: vec![rank_list(target)],
            wager_wins: vec![win(target, 40)],
            friendships: vec![friendship(target, user(), "accepted")],
            referrals: vec![referral(target, true)],
            ..Default::default()
        };

        let b = ScoreBreakdown::compute(target, &activity);
        let summed = b.points.books
            + b.points.movies
            + b.points.tv
            + b.points.music
            + b.points.podcasts
            + b.points.games
            + b.points.reviews
            + b.points.predictions
            + b.points.trivia
            + b.points.polls
            + b.points.bets
            + b.points.friends
            + b.points.referrals
            + b.points.engagement;

        assert_eq!(b.points.all_time, summed);
    }

    #[test]
    fn pool_entries_split_by_kind_and_sum_their_own_points() {
        let target = user();
        let activity = ActivitySet {
            pool_entries: vec![
                entry(target, "trivia", 10, Some(true)),
                entry(target, "trivia", 0, Some(false)),
                entry(target, "vote", 5, None),
                entry(target, "predict", 25, Some(true)),
                entry(target, "weekly", 15, Some(true)),
                entry(target, "awards", 0, Some(false)),
                entry(target, "bracket", 8, Some(true)),
            ],
            ..Default::default()
        };

        let b = ScoreBreakdown::compute(target, &activity);
        assert_eq!(b.points.trivia, 10);
        assert_eq!(b.counts.trivia, 2);
        assert_eq!(b.points.polls, 5);
        assert_eq!(b.counts.polls, 1);
        // predict/weekly/awards/bracket all land in the prediction bucket
        assert_eq!(b.points.predictions, 48);
        assert_eq!(b.counts.predictions, 4);
        // every entry also feeds the engagement composite at 5 pts each
        assert_eq!(b.engagement.predictions_participated, 7);
        assert_eq!(b.points.engagement, 35);
    }

    #[test]
    fn friend_edges_dedupe_across_directions() {
        let target = user();
        let friend = user();
        let other = user();
        let activity = ActivitySet {
            friendships: vec![
                // mutual pair: both directions inserted, still one friend
                friendship(target, friend, "accepted"),
                friendship(friend, target, "accepted"),
                friendship(other, target, "accepted"),
                // non-accepted rows never count
                friendship(target, user(), "pending"),
            ],
            ..Default::default()
        };

        let b = ScoreBreakdown::compute(target, &activity);
        assert_eq!(b.counts.friends, 2);
        assert_eq!(b.points.friends, 10);
    }

    #[test]
    fn referrals_only_count_rewarded_rows_for_the_referrer() {
        let target = user();
        let activity = ActivitySet {
            referrals: vec![
                referral(target, true),
                referral(target, false),
                referral(user(), true),
            ],
            ..Default::default()
        };

        let b = ScoreBreakdown::compute(target, &activity);
        assert_eq!(b.counts.referrals, 1);
        assert_eq!(b.points.referrals, 25);
    }

    #[test]
    fn engagement_composite_arithmetic() {
        let target = user();
        let activity = ActivitySet {
            posts: vec![post(target, 3, 1), post(target, 0, 2)],
            likes_given: vec![like(target), like(target), like(target)],
            comments_made: vec![comment(target)],
            rank_lists: vec![rank_list(target), rank_list(target)],
            ..Default::default()
        };

        let b = ScoreBreakdown::compute(target, &activity);
        // 2 posts * 10 + 3 likes-received * 2 + 3 comments-received * 3
        // + 3 likes-given * 2 + 1 comment-made * 5 + 2 rank lists * 10
        assert_eq!(b.points.engagement, 20 + 6 + 9 + 6 + 5 + 20);
        assert_eq!(
            b.engagement,
            EngagementBreakdown {
                posts: 2,
                likes_received: 3,
                comments_received: 3,
                likes_given: 3,
                comments_made: 1,
                predictions_participated: 0,
                ranks_created: 2,
            }
        );
    }

    #[test]
    fn unknown_media_types_are_ignored() {
        let target = user();
        let activity = ActivitySet {
            items: vec![item(target, "vhs", None), item(target, "movie", None)],
            ..Default::default()
        };

        let b = ScoreBreakdown::compute(target, &activity);
        assert_eq!(b.points.movies, 8);
        assert_eq!(b.points.all_time, 8);
        assert_eq!(b.counts.total, 1);
    }

    #[test]
    fn snapshot_rows_cover_every_category() {
        let target = user();
        let activity = ActivitySet {
            items: vec![item(target, "book", None)],
            ..Default::default()
        };

        let rows = ScoreBreakdown::compute(target, &activity).points.as_snapshot_rows();
        assert_eq!(rows.len(), Category::ALL.len());
        assert!(rows.contains(&("books", 15)));
        assert!(rows.contains(&("all_time", 15)));
        assert!(rows.contains(&("polls", 0)));
    }
}
