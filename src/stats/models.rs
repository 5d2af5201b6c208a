use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::primitives::{self, WIN_STREAK_THRESHOLDS};
use super::window::BoundedLog;

/// Point margin at or above which a win counts as a demon win.
pub const DEMON_WIN_MARGIN: i32 = 10;

/// Separator used when joining sorted member ids into a group key.
pub const GROUP_KEY_SEPARATOR: &str = "-";

/// One entry of the bounded result log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "L")]
    Loss,
}

/// Order-independent identity for a side: sorted member ids joined with "-".
pub fn group_key(members: &[String]) -> String {
    let mut sorted: Vec<&str> = members.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.join(GROUP_KEY_SEPARATOR)
}

/// The opponent a team or player has lost to most often.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rival {
    pub key: String,
    pub players: Vec<String>,
}

impl Rival {
    fn from_key(key: &str) -> Self {
        Self {
            key: key.to_string(),
            players: key.split(GROUP_KEY_SEPARATOR).map(str::to_string).collect(),
        }
    }
}

/// Rival rule: the unique holder of the strict maximum of `losses_to`, and
/// only once that maximum exceeds 1. A single loss never creates a rival, and
/// a tied maximum yields none.
pub fn compute_rival(losses_to: &HashMap<String, u32>) -> Option<Rival> {
    let max = losses_to.values().copied().max()?;
    if max <= 1 {
        return None;
    }
    let mut holders = losses_to.iter().filter(|(_, count)| **count == max);
    let (key, _) = holders.next()?;
    if holders.next().is_some() {
        return None;
    }
    Some(Rival::from_key(key))
}

/// Running statistics shared by the team and player granularities.
///
/// All fields are concrete and defaulted; a zero-valued summary is the seed
/// for a first-time team or player.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceSummary {
    pub wins: u32,
    pub losses: u32,
    pub games_played: u32,
    pub results: BoundedLog<Outcome>,
    pub point_differences: BoundedLog<i32>,
    pub total_point_difference: i32,
    pub average_point_difference: f64,
    pub current_streak: i32,
    pub highest_win_streak: u32,
    pub highest_loss_streak: u32,
    pub win_streaks_of_3: u32,
    pub win_streaks_of_5: u32,
    pub win_streaks_of_7: u32,
    pub demon_wins: u32,
    pub losses_to: HashMap<String, u32>,
    pub rival: Option<Rival>,
}

impl PerformanceSummary {
    /// Applies a win with the given (positive) point margin.
    pub fn record_win(&mut self, margin: i32) {
        self.record(Outcome::Win, margin);
        if margin >= DEMON_WIN_MARGIN {
            self.demon_wins += 1;
        }
    }

    /// Applies a loss with the given (positive) point margin against the side
    /// identified by `winner_key`.
    pub fn record_loss(&mut self, margin: i32, winner_key: &str) {
        self.record(Outcome::Loss, -margin);
        *self.losses_to.entry(winner_key.to_string()).or_insert(0) += 1;
        self.rival = compute_rival(&self.losses_to);
    }

    fn record(&mut self, outcome: Outcome, signed_margin: i32) {
        self.games_played += 1;
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
        }

        let streak_before = self.current_streak;
        self.current_streak =
            primitives::next_streak(self.results.last().copied(), outcome, streak_before);

        self.results.push(outcome);
        self.point_differences.push(signed_margin);
        self.rebuild_differentials();

        if self.current_streak > 0 {
            self.highest_win_streak = self.highest_win_streak.max(self.current_streak as u32);
            let counters = [
                &mut self.win_streaks_of_3,
                &mut self.win_streaks_of_5,
                &mut self.win_streaks_of_7,
            ];
            for (threshold, counter) in WIN_STREAK_THRESHOLDS.into_iter().zip(counters) {
                if primitives::crossed_threshold(streak_before, self.current_streak, threshold) {
                    *counter += 1;
                }
            }
        } else {
            self.highest_loss_streak = self
                .highest_loss_streak
                .max(self.current_streak.unsigned_abs());
        }
    }

    /// Undoes a previously recorded win with the given margin.
    pub fn unrecord_win(&mut self, margin: i32) {
        self.unrecord(Outcome::Win);
        if margin >= DEMON_WIN_MARGIN && self.demon_wins > 0 {
            self.demon_wins -= 1;
        }
    }

    /// Undoes a previously recorded loss against `winner_key`.
    pub fn unrecord_loss(&mut self, winner_key: &str) {
        self.unrecord(Outcome::Loss);
        if let Some(count) = self.losses_to.get_mut(winner_key) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.losses_to.remove(winner_key);
            }
        }
        self.rival = compute_rival(&self.losses_to);
    }

    fn unrecord(&mut self, outcome: Outcome) {
        self.games_played = self.games_played.saturating_sub(1);
        match outcome {
            Outcome::Win => self.wins = self.wins.saturating_sub(1),
            Outcome::Loss => self.losses = self.losses.saturating_sub(1),
        }

        self.results.pop();
        self.point_differences.pop();
        self.rebuild_differentials();

        // Streak history is not invertible by a single decrement; replay the
        // remaining window from scratch.
        let snapshot = primitives::replay_streaks(self.results.iter());
        self.current_streak = snapshot.current;
        self.highest_win_streak = snapshot.highest_win;
        self.highest_loss_streak = snapshot.highest_loss;
    }

    /// Rebuilds the total and average from the current differential window.
    /// Both the apply and reversal paths use this same reconstruction.
    fn rebuild_differentials(&mut self) {
        self.total_point_difference = self.point_differences.iter().sum();
        self.average_point_difference = if self.point_differences.is_empty() {
            0.0
        } else {
            f64::from(self.total_point_difference) / self.point_differences.len() as f64
        };
    }
}

/// Running statistics for one team (one or two players) within a competition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamAggregate {
    pub key: String,
    pub players: Vec<String>,
    #[serde(flatten)]
    pub summary: PerformanceSummary,
}

impl TeamAggregate {
    /// Zero-valued aggregate seeded with the sorted member list.
    pub fn seed(players: &[String]) -> Self {
        let mut sorted = players.to_vec();
        sorted.sort_unstable();
        Self {
            key: group_key(players),
            players: sorted,
            summary: PerformanceSummary::default(),
        }
    }
}

/// Running statistics for one player within a competition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerAggregate {
    pub user_id: String,
    #[serde(flatten)]
    pub summary: PerformanceSummary,
}

impl PlayerAggregate {
    pub fn seed(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            summary: PerformanceSummary::default(),
        }
    }
}
