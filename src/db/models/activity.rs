use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::db::models::user::UserId;

/// Media kinds a consumption item can be tagged with. Anything else in the
/// `media_type` column is ignored by the scoring engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Book,
    Movie,
    Tv,
    Music,
    Podcast,
    Game,
}

impl MediaType {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "book" => Some(Self::Book),
            "movie" => Some(Self::Movie),
            "tv" => Some(Self::Tv),
            "music" => Some(Self::Music),
            "podcast" => Some(Self::Podcast),
            "game" => Some(Self::Game),
            _ => None,
        }
    }

    /// Human label for leaderboard detail strings, e.g. "3 books" / "1 book".
    pub fn label_for(&self, n: i64) -> &'static str {
        match (self, n) {
            (Self::Book, 1) => "book",
            (Self::Book, _) => "books",
            (Self::Movie, 1) => "movie",
            (Self::Movie, _) => "movies",
            (Self::Tv, 1) => "tv show",
            (Self::Tv, _) => "tv shows",
            (Self::Music, 1) => "track",
            (Self::Music, _) => "tracks",
            (Self::Podcast, 1) => "podcast",
            (Self::Podcast, _) => "podcasts",
            (Self::Game, 1) => "game",
            (Self::Game, _) => "games",
        }
    }
}

/// Game families a pool entry can belong to. `trivia` and `vote` are
/// explicit; every other pool type (predict, weekly, awards, bracket, ...)
/// lands in the prediction bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKind {
    Trivia,
    Poll,
    Prediction,
}

impl PoolKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "trivia" => Self::Trivia,
            "vote" => Self::Poll,
            _ => Self::Prediction,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ConsumptionItem {
    pub id: Uuid,
    pub user_id: UserId,
    pub media_type: String,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: UserId,
    pub like_count: i64,
    pub comment_count: i64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostLike {
    pub id: Uuid,
    pub user_id: UserId,
    pub post_id: Uuid,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostComment {
    pub id: Uuid,
    pub user_id: UserId,
    pub post_id: Uuid,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PoolEntry {
    pub id: Uuid,
    pub user_id: UserId,
    pub pool_type: String,
    pub points_earned: i64,
    pub is_correct: Option<bool>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RankList {
    pub id: Uuid,
    pub user_id: UserId,
    pub title: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WagerWin {
    pub id: Uuid,
    pub user_id: UserId,
    pub points_awarded: i64,
    pub created_at: NaiveDateTime,
}

/// A directional friendship row; the edge may exist in either direction (or
/// both), so consumers must dedupe per counterparty.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Friendship {
    pub id: Uuid,
    pub user_id: UserId,
    pub friend_id: UserId,
    pub status: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Referral {
    pub id: Uuid,
    pub referrer_id: UserId,
    pub referred_id: UserId,
    pub rewarded: bool,
    pub created_at: NaiveDateTime,
}
