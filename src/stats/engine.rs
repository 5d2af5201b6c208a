use crate::competition::models::GameResult;

use super::models::{group_key, PlayerAggregate, TeamAggregate};
use super::primitives::point_difference;
use super::StatsError;

/// The two team aggregates touched by one game, ready to be merged back into
/// the competition's stored collection.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamImpact {
    pub winner: TeamAggregate,
    pub loser: TeamAggregate,
}

/// Applies one finalized game to the team-granularity aggregates.
///
/// Pure relative to its inputs: looks up (or seeds) the two affected
/// aggregates, applies the win/loss updates and returns them. The caller is
/// responsible for merging and persisting.
pub struct TeamPerformanceEngine;

impl TeamPerformanceEngine {
    pub fn apply(game: &GameResult, teams: &[TeamAggregate]) -> Result<TeamImpact, StatsError> {
        let outcome = game.validated_outcome()?;
        let winner_key = group_key(&outcome.winner.players);
        let loser_key = group_key(&outcome.loser.players);
        let margin = point_difference(outcome.winner.score, outcome.loser.score);

        let mut winner = lookup_or_seed(teams, &winner_key, &outcome.winner.players);
        let mut loser = lookup_or_seed(teams, &loser_key, &outcome.loser.players);

        winner.summary.record_win(margin);
        loser.summary.record_loss(margin, &winner_key);

        Ok(TeamImpact { winner, loser })
    }
}

/// Applies one finalized game at the individual-player granularity: every
/// player on the winning side gets the win update, every player on the losing
/// side the loss update, keyed against the winning side's group key.
pub struct PlayerPerformanceEngine;

impl PlayerPerformanceEngine {
    pub fn apply(
        game: &GameResult,
        players: &[PlayerAggregate],
    ) -> Result<Vec<PlayerAggregate>, StatsError> {
        let outcome = game.validated_outcome()?;
        let winner_key = group_key(&outcome.winner.players);
        let margin = point_difference(outcome.winner.score, outcome.loser.score);

        let mut touched = Vec::with_capacity(outcome.winner.players.len() + outcome.loser.players.len());

        for user_id in &outcome.winner.players {
            let mut aggregate = lookup_or_seed_player(players, user_id);
            aggregate.summary.record_win(margin);
            touched.push(aggregate);
        }
        for user_id in &outcome.loser.players {
            let mut aggregate = lookup_or_seed_player(players, user_id);
            aggregate.summary.record_loss(margin, &winner_key);
            touched.push(aggregate);
        }

        Ok(touched)
    }
}

/// First sight of a team is the default case, not an error: a zero-valued
/// aggregate is seeded with the sorted member list.
fn lookup_or_seed(teams: &[TeamAggregate], key: &str, players: &[String]) -> TeamAggregate {
    teams
        .iter()
        .find(|team| team.key == key)
        .cloned()
        .unwrap_or_else(|| TeamAggregate::seed(players))
}

fn lookup_or_seed_player(players: &[PlayerAggregate], user_id: &str) -> PlayerAggregate {
    players
        .iter()
        .find(|player| player.user_id == user_id)
        .cloned()
        .unwrap_or_else(|| PlayerAggregate::seed(user_id))
}
