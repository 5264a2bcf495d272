use serde::Serialize;

pub mod breakdown;
pub mod engine;
pub mod rank;
pub mod weights;

/// Every category the engine scores. `AllTime` is the additive grand total
/// of the other fourteen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    AllTime,
    Books,
    Movies,
    Tv,
    Music,
    Podcasts,
    Games,
    Reviews,
    Predictions,
    Trivia,
    Polls,
    Bets,
    Friends,
    Referrals,
    Engagement,
}

impl Category {
    pub const ALL: [Category; 15] = [
        Category::AllTime,
        Category::Books,
        Category::Movies,
        Category::Tv,
        Category::Music,
        Category::Podcasts,
        Category::Games,
        Category::Reviews,
        Category::Predictions,
        Category::Trivia,
        Category::Polls,
        Category::Bets,
        Category::Friends,
        Category::Referrals,
        Category::Engagement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllTime => "all_time",
            Self::Books => "books",
            Self::Movies => "movies",
            Self::Tv => "tv",
            Self::Music => "music",
            Self::Podcasts => "podcasts",
            Self::Games => "games",
            Self::Reviews => "reviews",
            Self::Predictions => "predictions",
            Self::Trivia => "trivia",
            Self::Polls => "polls",
            Self::Bets => "bets",
            Self::Friends => "friends",
            Self::Referrals => "referrals",
            Self::Engagement => "engagement",
        }
    }
}
