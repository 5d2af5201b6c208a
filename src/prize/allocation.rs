use crate::competition::models::MatchFormat;
use crate::stats::primitives::ordinal_suffix;

/// Share of the pool per final placement, best rank first.
pub const DISTRIBUTION_CURVE: [f64; 4] = [0.4, 0.3, 0.2, 0.1];

/// Per-match pool multipliers for the tournament formula.
pub const DOUBLES_POOL_MULTIPLIER: i64 = 150;
pub const SINGLES_POOL_MULTIPLIER: i64 = 25;

/// One participant's ranking inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub user_id: String,
    pub wins: u32,
    pub total_point_difference: i32,
    pub experience_points: i64,
}

/// Sorts entries best-first: wins descending, tie-broken by total point
/// differential, then by experience-point total.
pub fn rank_entries(mut entries: Vec<RankedEntry>) -> Vec<RankedEntry> {
    entries.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then(b.total_point_difference.cmp(&a.total_point_difference))
            .then(b.experience_points.cmp(&a.experience_points))
    });
    entries
}

/// League pool: floor((participants * games + total winner points) / 2).
pub fn league_prize_pool(
    participant_count: usize,
    games_played: usize,
    total_winner_points: i64,
) -> i64 {
    ((participant_count * games_played) as i64 + total_winner_points) / 2
}

/// Tournament pool: match count times a per-format multiplier. Intentionally
/// a different formula from the league one; the two are not unified.
pub fn tournament_prize_pool(match_count: usize, format: MatchFormat) -> i64 {
    let multiplier = match format {
        MatchFormat::Doubles => DOUBLES_POOL_MULTIPLIER,
        MatchFormat::Singles => SINGLES_POOL_MULTIPLIER,
    };
    match_count as i64 * multiplier
}

/// A prize assigned to one ranked participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementAward {
    pub user_id: String,
    /// Zero-indexed final rank.
    pub rank: usize,
    /// Display label, e.g. "1st".
    pub label: String,
    pub amount: i64,
}

/// Splits the pool over the top `curve.len()` ranked entries, flooring each
/// share to an integer. Entries beyond the curve receive nothing.
pub fn allocate(pool: i64, curve: &[f64], ranked: &[RankedEntry]) -> Vec<PlacementAward> {
    ranked
        .iter()
        .take(curve.len())
        .enumerate()
        .map(|(rank, entry)| PlacementAward {
            user_id: entry.user_id.clone(),
            rank,
            label: format!("{}{}", rank + 1, ordinal_suffix(rank)),
            amount: (pool as f64 * curve[rank]).floor() as i64,
        })
        .collect()
}
