use crate::competition::models::GameResult;

use super::engine::TeamImpact;
use super::models::{group_key, PlayerAggregate, TeamAggregate};
use super::primitives::point_difference;
use super::StatsError;

/// Undoes the effect of a previously applied game on the stored aggregates,
/// used when an approved game is later edited or deleted.
///
/// Inverse of the performance engines for the log-bounded fields. When the
/// 10-entry window already evicted an older entry, those evicted values cannot
/// be restored; that is the accepted tradeoff of the bounded window.
pub struct ReversalEngine;

impl ReversalEngine {
    pub fn reverse_teams(
        game: &GameResult,
        teams: &[TeamAggregate],
    ) -> Result<TeamImpact, StatsError> {
        let outcome = game.validated_outcome()?;
        let winner_key = group_key(&outcome.winner.players);
        let loser_key = group_key(&outcome.loser.players);
        let margin = point_difference(outcome.winner.score, outcome.loser.score);

        let mut winner = find_team(teams, &winner_key, &outcome.winner.players);
        let mut loser = find_team(teams, &loser_key, &outcome.loser.players);

        winner.summary.unrecord_win(margin);
        loser.summary.unrecord_loss(&winner_key);

        Ok(TeamImpact { winner, loser })
    }

    pub fn reverse_players(
        game: &GameResult,
        players: &[PlayerAggregate],
    ) -> Result<Vec<PlayerAggregate>, StatsError> {
        let outcome = game.validated_outcome()?;
        let winner_key = group_key(&outcome.winner.players);
        let margin = point_difference(outcome.winner.score, outcome.loser.score);

        let mut touched =
            Vec::with_capacity(outcome.winner.players.len() + outcome.loser.players.len());

        for user_id in &outcome.winner.players {
            let mut aggregate = find_player(players, user_id);
            aggregate.summary.unrecord_win(margin);
            touched.push(aggregate);
        }
        for user_id in &outcome.loser.players {
            let mut aggregate = find_player(players, user_id);
            aggregate.summary.unrecord_loss(&winner_key);
            touched.push(aggregate);
        }

        Ok(touched)
    }
}

// Reversing a game whose aggregate was never stored should not happen, but a
// zero seed keeps the path total: every decrement below saturates at zero.
fn find_team(teams: &[TeamAggregate], key: &str, players: &[String]) -> TeamAggregate {
    teams
        .iter()
        .find(|team| team.key == key)
        .cloned()
        .unwrap_or_else(|| TeamAggregate::seed(players))
}

fn find_player(players: &[PlayerAggregate], user_id: &str) -> PlayerAggregate {
    players
        .iter()
        .find(|player| player.user_id == user_id)
        .cloned()
        .unwrap_or_else(|| PlayerAggregate::seed(user_id))
}
