use std::collections::HashMap;

use serde::Serialize;

use crate::db::prelude::*;
use crate::scoring::weights;
use crate::scoring::breakdown::has_review_note;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RankPlacement {
    pub global: i64,
    pub total_users: i64,
}

/// Builds the cross-user total map the global rank is derived from. Only
/// consumption, pool and wager activity feed the ranking population;
/// friendship/referral/social credit is a per-profile concern.
pub fn ranking_totals(
    items: &[ConsumptionItem],
    entries: &[PoolEntry],
    wins: &[WagerWin],
) -> HashMap<UserId, i64> {
    let mut totals: HashMap<UserId, i64> = HashMap::new();

    for item in items {
        let mut points = MediaType::from_tag(&item.media_type)
            .map(weights::media_weight)
            .unwrap_or(0);
        if has_review_note(item.note.as_deref()) {
            points += weights::REVIEW;
        }
        *totals.entry(item.user_id).or_default() += points;
    }

    for entry in entries {
        *totals.entry(entry.user_id).or_default() += entry.points_earned;
    }

    for win in wins {
        *totals.entry(win.user_id).or_default() += win.points_awarded;
    }

    totals
}

/// Rank = 1 + number of other users whose total is strictly greater.
/// Equal-scored users share the position; a target with no qualifying
/// records ranks below everyone with a positive total.
pub fn rank_among(all_scores: &HashMap<UserId, i64>, target: UserId) -> RankPlacement {
    let target_total = all_scores.get(&target).copied().unwrap_or(0);
    let above = all_scores
        .iter()
        .filter(|(id, total)| **id != target && **total > target_total)
        .count() as i64;

    RankPlacement {
        global: above + 1,
        total_users: all_scores.len() as i64,
    }
}
