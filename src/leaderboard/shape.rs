//! Pure shaping for the per-category leaderboards: group raw rows per
//! user, attach the category detail string, then sort/rank/cap.

use std::collections::{BTreeMap, HashSet};

use crate::db::prelude::*;
use crate::scoring::weights;
use crate::scoring::breakdown::has_review_note;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredUser {
    pub user_id: UserId,
    pub score: i64,
    pub detail: Option<String>,
}

/// Drops zero scores, sorts descending (stable, so equal scores keep their
/// grouping order) and assigns 1-based position ranks up to `limit`.
pub fn rank_entries(mut scored: Vec<ScoredUser>, limit: i64) -> Vec<(i64, ScoredUser)> {
    scored.retain(|s| s.score > 0);
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(limit.max(0) as usize);

    scored
        .into_iter()
        .enumerate()
        .map(|(i, s)| (i as i64 + 1, s))
        .collect()
}

pub fn consumption_board(items: &[ConsumptionItem], media: MediaType) -> Vec<ScoredUser> {
    let mut counts: BTreeMap<UserId, i64> = BTreeMap::new();
    for item in items {
        if MediaType::from_tag(&item.media_type) == Some(media) {
            *counts.entry(item.user_id).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .map(|(user_id, n)| ScoredUser {
            user_id,
            score: n * weights::media_weight(media),
            detail: Some(format!("{n} {}", media.label_for(n))),
        })
        .collect()
}

pub fn review_board(items: &[ConsumptionItem]) -> Vec<ScoredUser> {
    let mut counts: BTreeMap<UserId, i64> = BTreeMap::new();
    for item in items {
        if has_review_note(item.note.as_deref()) {
            *counts.entry(item.user_id).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .map(|(user_id, n)| ScoredUser {
            user_id,
            score: n * weights::REVIEW,
            detail: Some(format!("{n} {}", if n == 1 { "review" } else { "reviews" })),
        })
        .collect()
}

pub fn pool_board(entries: &[PoolEntry], kind: PoolKind) -> Vec<ScoredUser> {
    // points, correct answers, total entries
    let mut per_user: BTreeMap<UserId, (i64, i64, i64)> = BTreeMap::new();
    for entry in entries {
        if PoolKind::from_tag(&entry.pool_type) != kind {
            continue;
        }
        let slot = per_user.entry(entry.user_id).or_default();
        slot.0 += entry.points_earned;
        slot.1 += i64::from(entry.is_correct == Some(true));
        slot.2 += 1;
    }

    per_user
        .into_iter()
        .map(|(user_id, (points, correct, total))| ScoredUser {
            user_id,
            score: points,
            detail: Some(accuracy_detail(correct, total)),
        })
        .collect()
}

pub fn bets_board(wins: &[WagerWin]) -> Vec<ScoredUser> {
    let mut per_user: BTreeMap<UserId, (i64, i64)> = BTreeMap::new();
    for win in wins {
        let slot = per_user.entry(win.user_id).or_default();
        slot.0 += win.points_awarded;
        slot.1 += 1;
    }

    per_user
        .into_iter()
        .map(|(user_id, (points, n))| ScoredUser {
            user_id,
            score: points,
            detail: Some(format!("{n} {}", if n == 1 { "bet won" } else { "bets won" })),
        })
        .collect()
}

/// The engagement composite computed straight over the raw tables, same
/// formula as the profile's engagement category.
pub fn overall_board(
    posts: &[Post],
    likes_given: &[PostLike],
    comments_made: &[PostComment],
    entries: &[PoolEntry],
    rank_lists: &[RankList],
) -> Vec<ScoredUser> {
    // engagement points, posts created
    let mut per_user: BTreeMap<UserId, (i64, i64)> = BTreeMap::new();

    for post in posts {
        let slot = per_user.entry(post.user_id).or_default();
        slot.0 += weights::POST_CREATED
            + post.like_count * weights::LIKE_RECEIVED
            + post.comment_count * weights::COMMENT_RECEIVED;
        slot.1 += 1;
    }
    for like in likes_given {
        per_user.entry(like.user_id).or_default().0 += weights::LIKE_GIVEN;
    }
    for comment in comments_made {
        per_user.entry(comment.user_id).or_default().0 += weights::COMMENT_MADE;
    }
    for entry in entries {
        per_user.entry(entry.user_id).or_default().0 += weights::POOL_PARTICIPATION;
    }
    for list in rank_lists {
        per_user.entry(list.user_id).or_default().0 += weights::RANK_LIST_CREATED;
    }

    per_user
        .into_iter()
        .map(|(user_id, (points, posts))| ScoredUser {
            user_id,
            score: points,
            detail: Some(format!("{posts} {}", if posts == 1 { "post" } else { "posts" })),
        })
        .collect()
}

pub fn accuracy_detail(correct: i64, total: i64) -> String {
    let pct = if total > 0 {
        ((correct as f64 / total as f64) * 100.0).round() as i64
    } else {
        0
    };
    format!("{pct}% accuracy ({correct}/{total})")
}

/// The caller plus every distinct accepted counterparty, regardless of
/// edge direction. Used for `scope=friends`.
pub fn friend_circle(caller: UserId, friendships: &[Friendship]) -> Vec<UserId> {
    let mut seen: HashSet<UserId> = HashSet::new();
    let mut circle = vec![caller];
    seen.insert(caller);

    for edge in friendships {
        if edge.status != "accepted" {
            continue;
        }
        let other = if edge.user_id == caller {
            edge.friend_id
        } else if edge.friend_id == caller {
            edge.user_id
        } else {
            continue;
        };
        if seen.insert(other) {
            circle.push(other);
        }
    }

    circle
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::scoring::breakdown::fixtures::*;

    #[test]
    fn rank_entries_sorts_caps_and_drops_zero_scores() {
        let (a, b, c, d) = (user(), user(), user(), user());
        let scored = vec![
            ScoredUser { user_id: a, score: 5, detail: None },
            ScoredUser { user_id: b, score: 0, detail: None },
            ScoredUser { user_id: c, score: 40, detail: None },
            ScoredUser { user_id: d, score: 12, detail: None },
        ];

        let ranked = rank_entries(scored, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].0, 1);
        assert_eq!(ranked[0].1.user_id, c);
        assert_eq!(ranked[1].0, 2);
        assert_eq!(ranked[1].1.user_id, d);
    }

    #[test]
    fn consumption_board_counts_one_media_type() {
        let a = user();
        let b = user();
        let items = vec![
            item(a, "book", None),
            item(a, "book", Some("great")),
            item(a, "movie", None),
            item(b, "book", None),
        ];

        let mut board = consumption_board(&items, MediaType::Book);
        board.sort_by(|x, y| y.score.cmp(&x.score));

        assert_eq!(board.len(), 2);
        assert_eq!(board[0].score, 30);
        assert_eq!(board[0].detail.as_deref(), Some("2 books"));
        assert_eq!(board[1].score, 15);
        assert_eq!(board[1].detail.as_deref(), Some("1 book"));
    }

    #[test]
    fn pool_board_reports_accuracy() {
        let a = user();
        let entries = vec![
            entry(a, "predict", 30, Some(true)),
            entry(a, "weekly", 0, Some(false)),
            entry(a, "bracket", 10, Some(true)),
            // trivia entries belong to a different board
            entry(a, "trivia", 99, Some(true)),
        ];

        let board = pool_board(&entries, PoolKind::Prediction);
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].score, 40);
        assert_eq!(board[0].detail.as_deref(), Some("67% accuracy (2/3)"));
    }

    #[test]
    fn accuracy_detail_formatting() {
        assert_eq!(accuracy_detail(5, 12), "42% accuracy (5/12)");
        assert_eq!(accuracy_detail(0, 4), "0% accuracy (0/4)");
        assert_eq!(accuracy_detail(0, 0), "0% accuracy (0/0)");
    }

    #[test]
    fn overall_board_matches_engagement_formula() {
        let a = user();
        let board = overall_board(
            &[post(a, 4, 2)],
            &[like(a)],
            &[comment(a)],
            &[entry(a, "vote", 5, None)],
            &[rank_list(a)],
        );

        // 10 + 4*2 + 2*3 + 2 + 5 + 5 + 10
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].score, 46);
        assert_eq!(board[0].detail.as_deref(), Some("1 post"));
    }

    #[test]
    fn friend_circle_dedupes_and_always_contains_the_caller() {
        let caller = user();
        let friend = user();
        let edges = vec![
            friendship(caller, friend, "accepted"),
            friendship(friend, caller, "accepted"),
            friendship(caller, user(), "pending"),
        ];

        let circle = friend_circle(caller, &edges);
        assert_eq!(circle.len(), 2);
        assert_eq!(circle[0], caller);
        assert!(circle.contains(&friend));

        // a lonely user still gets a circle of one, never an error
        assert_eq!(friend_circle(caller, &[]), vec![caller]);
    }

    #[test]
    fn bets_board_sums_awarded_points() {
        let a = user();
        let board = bets_board(&[win(a, 25), win(a, 15)]);
        assert_eq!(board[0].score, 40);
        assert_eq!(board[0].detail.as_deref(), Some("2 bets won"));
    }
}
