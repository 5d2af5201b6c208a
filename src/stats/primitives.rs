use super::models::Outcome;

/// Win-streak lengths at which a threshold counter is bumped.
pub const WIN_STREAK_THRESHOLDS: [u32; 3] = [3, 5, 7];

/// Suffix for a zero-indexed rank: 0 -> "st", 1 -> "nd", 2 -> "rd", else "th".
///
/// This is positional suffixing over the zero-indexed rank, not English
/// ordinal rules; rank 10 (displayed "11th") still yields "th".
pub fn ordinal_suffix(rank: usize) -> &'static str {
    match rank {
        0 => "st",
        1 => "nd",
        2 => "rd",
        _ => "th",
    }
}

/// Point margin of a finished game; always >= 1 for a valid result.
pub fn point_difference(winner_score: i32, loser_score: i32) -> i32 {
    winner_score - loser_score
}

/// Streak value after appending `current` to a log whose newest prior entry
/// was `previous`. Positive values are win streaks, negative loss streaks.
pub fn next_streak(previous: Option<Outcome>, current: Outcome, streak: i32) -> i32 {
    match (current, previous) {
        (Outcome::Win, Some(Outcome::Win)) => streak + 1,
        (Outcome::Win, _) => 1,
        (Outcome::Loss, Some(Outcome::Loss)) => streak - 1,
        (Outcome::Loss, _) => -1,
    }
}

/// True when the positive streak length crossed `threshold` on this update.
/// Fires exactly once per crossing: `before < threshold <= after`.
pub fn crossed_threshold(before: i32, after: i32, threshold: u32) -> bool {
    let before = before.max(0) as u32;
    let after = after.max(0) as u32;
    before < threshold && threshold <= after
}

/// Streak fields reconstructed from a full result log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreakSnapshot {
    pub current: i32,
    pub highest_win: u32,
    pub highest_loss: u32,
}

/// Replays a result log from scratch. The reversal path uses this instead of
/// an incremental inverse: streak transitions depend on the entry two back,
/// which a single decrement cannot see.
pub fn replay_streaks<'a>(results: impl IntoIterator<Item = &'a Outcome>) -> StreakSnapshot {
    let mut snapshot = StreakSnapshot::default();
    let mut previous = None;
    for &outcome in results {
        snapshot.current = next_streak(previous, outcome, snapshot.current);
        if snapshot.current > 0 {
            snapshot.highest_win = snapshot.highest_win.max(snapshot.current as u32);
        } else {
            snapshot.highest_loss = snapshot.highest_loss.max(snapshot.current.unsigned_abs());
        }
        previous = Some(outcome);
    }
    snapshot
}
