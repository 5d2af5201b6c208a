use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use uuid::Uuid;

use crate::stats::{PlayerAggregate, StatsError, TeamAggregate};

/// Approval lifecycle of a submitted score. Transitions only
/// pending -> approved or pending -> rejected; terminal states are never
/// reprocessed except through the explicit reversal path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl Default for ApprovalStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// One side of a game as submitted: one or two player ids and the score.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamSlot {
    pub players: Vec<String>,
    pub score: i32,
}

/// One side of the finalized result.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SideResult {
    pub team: String,
    pub score: i32,
    pub players: Vec<String>,
}

/// Winner/loser sides of a finalized game.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOutcome {
    pub winner: SideResult,
    pub loser: SideResult,
}

/// A finalized match record as stored on the competition document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameResult {
    pub game_id: String,
    pub side_one: TeamSlot,
    pub side_two: TeamSlot,
    pub result: Option<MatchOutcome>,
    pub status: ApprovalStatus,
    pub approvals: u32,
    pub declines: u32,
    pub auto_approved: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl GameResult {
    /// A finished game between `winners` and `losers`, pending approval.
    pub fn finished(winners: &[String], winner_score: i32, losers: &[String], loser_score: i32) -> Self {
        Self {
            game_id: Uuid::new_v4().to_string(),
            side_one: TeamSlot {
                players: winners.to_vec(),
                score: winner_score,
            },
            side_two: TeamSlot {
                players: losers.to_vec(),
                score: loser_score,
            },
            result: Some(MatchOutcome {
                winner: SideResult {
                    team: crate::stats::group_key(winners),
                    score: winner_score,
                    players: winners.to_vec(),
                },
                loser: SideResult {
                    team: crate::stats::group_key(losers),
                    score: loser_score,
                    players: losers.to_vec(),
                },
            }),
            status: ApprovalStatus::Pending,
            approvals: 0,
            declines: 0,
            auto_approved: false,
            created_at: Some(Utc::now()),
        }
    }

    /// The result sides, validated for engine consumption. Callers skip (and
    /// log) games that fail here; a malformed record is never fatal.
    pub fn validated_outcome(&self) -> Result<&MatchOutcome, StatsError> {
        let outcome = self
            .result
            .as_ref()
            .ok_or_else(|| StatsError::MissingResult(self.game_id.clone()))?;

        if outcome.winner.players.is_empty() || outcome.loser.players.is_empty() {
            return Err(StatsError::Validation(format!(
                "game {} is missing player ids",
                self.game_id
            )));
        }
        if outcome.winner.score <= outcome.loser.score {
            return Err(StatsError::Validation(format!(
                "game {} has winner score {} <= loser score {}",
                self.game_id, outcome.winner.score, outcome.loser.score
            )));
        }
        let winners: HashSet<&String> = outcome.winner.players.iter().collect();
        if outcome.loser.players.iter().any(|p| winners.contains(p)) {
            return Err(StatsError::Validation(format!(
                "game {} has overlapping sides",
                self.game_id
            )));
        }

        Ok(outcome)
    }
}

/// Competition flavor; the prize-pool formula differs per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CompetitionKind {
    League,
    Tournament,
}

/// Singles or doubles; drives the tournament pool multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MatchFormat {
    Singles,
    Doubles,
}

/// A tournament round with its games.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub round: u32,
    pub games: Vec<GameResult>,
}

/// A league or tournament document: participants, aggregates, games and the
/// prize-settlement state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Competition {
    pub competition_id: String,
    pub name: String,
    pub kind: CompetitionKind,
    pub format: MatchFormat,
    /// Textual end date; one of the two accepted formats in
    /// [`crate::competition::schedule`].
    pub end_date: Option<String>,
    /// Flat game list (leagues).
    pub games: Vec<GameResult>,
    /// Fixture-grouped games (tournaments).
    pub fixtures: Vec<Fixture>,
    pub participants: Vec<PlayerAggregate>,
    pub teams: Vec<TeamAggregate>,
    /// Transitions false -> true exactly once, gated by the end-date check.
    pub prizes_distributed: bool,
    pub prize_distribution_date: Option<DateTime<Utc>>,
    /// Optimistic-concurrency token checked on every save.
    pub revision: u64,
}

impl Default for Competition {
    fn default() -> Self {
        Self {
            competition_id: String::new(),
            name: String::new(),
            kind: CompetitionKind::League,
            format: MatchFormat::Doubles,
            end_date: None,
            games: Vec::new(),
            fixtures: Vec::new(),
            participants: Vec::new(),
            teams: Vec::new(),
            prizes_distributed: false,
            prize_distribution_date: None,
            revision: 0,
        }
    }
}

impl Competition {
    pub fn new(name: &str, kind: CompetitionKind, format: MatchFormat) -> Self {
        Self {
            competition_id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            kind,
            format,
            ..Self::default()
        }
    }

    /// All games, whether stored flat or grouped into fixtures.
    pub fn all_games(&self) -> impl Iterator<Item = &GameResult> {
        self.games
            .iter()
            .chain(self.fixtures.iter().flat_map(|fixture| fixture.games.iter()))
    }

    pub fn all_games_mut(&mut self) -> impl Iterator<Item = &mut GameResult> {
        self.games.iter_mut().chain(
            self.fixtures
                .iter_mut()
                .flat_map(|fixture| fixture.games.iter_mut()),
        )
    }

    /// Update-or-insert by team key.
    pub fn merge_team(&mut self, updated: TeamAggregate) {
        match self.teams.iter_mut().find(|team| team.key == updated.key) {
            Some(existing) => *existing = updated,
            None => self.teams.push(updated),
        }
    }

    /// Update-or-insert by user id.
    pub fn merge_player(&mut self, updated: PlayerAggregate) {
        match self
            .participants
            .iter_mut()
            .find(|player| player.user_id == updated.user_id)
        {
            Some(existing) => *existing = updated,
            None => self.participants.push(updated),
        }
    }

    /// Number of games with an approved result.
    pub fn approved_game_count(&self) -> usize {
        self.all_games()
            .filter(|game| game.status == ApprovalStatus::Approved)
            .count()
    }

    /// Sum of winner scores across approved games (league pool input).
    pub fn total_winner_points(&self) -> i64 {
        self.all_games()
            .filter(|game| game.status == ApprovalStatus::Approved)
            .filter_map(|game| game.result.as_ref())
            .map(|outcome| i64::from(outcome.winner.score))
            .sum()
    }
}
