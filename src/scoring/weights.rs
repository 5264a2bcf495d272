//! Fixed per-category point weights. These are product constants; the
//! engine never infers them from data.

use crate::db::prelude::MediaType;

pub const BOOK: i64 = 15;
pub const MOVIE: i64 = 8;
pub const TV: i64 = 10;
pub const MUSIC: i64 = 1;
pub const PODCAST: i64 = 3;
pub const GAME: i64 = 5;

/// Bonus for a consumption item carrying a non-empty note, on top of the
/// media-type weight.
pub const REVIEW: i64 = 10;

pub const FRIEND: i64 = 5;
pub const REFERRAL: i64 = 25;

// Engagement composite components.
pub const POST_CREATED: i64 = 10;
pub const LIKE_RECEIVED: i64 = 2;
pub const COMMENT_RECEIVED: i64 = 3;
pub const LIKE_GIVEN: i64 = 2;
pub const COMMENT_MADE: i64 = 5;
pub const POOL_PARTICIPATION: i64 = 5;
pub const RANK_LIST_CREATED: i64 = 10;

pub fn media_weight(media: MediaType) -> i64 {
    match media {
        MediaType::Book => BOOK,
        MediaType::Movie => MOVIE,
        MediaType::Tv => TV,
        MediaType::Music => MUSIC,
        MediaType::Podcast => PODCAST,
        MediaType::Game => GAME,
    }
}
