use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde_json::json;
use tokio::time::interval;
use tracing::{error, info, instrument, warn};

use crate::competition::models::{ApprovalStatus, Competition, GameResult};
use crate::competition::repository::CompetitionRepository;
use crate::notify::{Notification, NotificationKind, NotificationSender};
use crate::shared::AppError;
use crate::stats::{PlayerPerformanceEngine, TeamPerformanceEngine};

/// Configuration for the auto-approval task
#[derive(Debug, Clone)]
pub struct AutoApprovalConfig {
    /// How often to scan for stale pending games
    pub scan_interval: Duration,
    /// How long a game may sit pending before the system approves it
    pub approval_timeout: Duration,
}

impl Default for AutoApprovalConfig {
    fn default() -> Self {
        Self {
            scan_interval: Duration::from_secs(15 * 60),          // 15 minutes
            approval_timeout: Duration::from_secs(24 * 60 * 60), // 24 hours
        }
    }
}

/// Starts the background task that approves stale pending games and folds
/// them into the stored aggregates.
#[instrument(skip(competitions, notifier))]
pub async fn start_auto_approval_task(
    competitions: Arc<dyn CompetitionRepository>,
    notifier: Arc<dyn NotificationSender>,
    config: AutoApprovalConfig,
) {
    info!(
        scan_interval_secs = config.scan_interval.as_secs(),
        approval_timeout_secs = config.approval_timeout.as_secs(),
        "Starting auto-approval background task"
    );

    let mut scan_interval = interval(config.scan_interval);

    loop {
        scan_interval.tick().await;

        match run_auto_approval_cycle(&competitions, &notifier, config.approval_timeout, Utc::now())
            .await
        {
            Ok(approved_count) => {
                info!(approved_count, "Auto-approval cycle completed");
            }
            Err(e) => {
                error!(error = %e, "Auto-approval cycle failed");
            }
        }
    }
}

/// One scan over every competition. Competitions are processed as independent
/// concurrent units; a failure in one never stops the others. Returns the
/// number of games approved.
#[instrument(skip(competitions, notifier))]
pub async fn run_auto_approval_cycle(
    competitions: &Arc<dyn CompetitionRepository>,
    notifier: &Arc<dyn NotificationSender>,
    approval_timeout: Duration,
    now: DateTime<Utc>,
) -> Result<usize, AppError> {
    let all = competitions.list_competitions().await?;

    let counts = join_all(all.into_iter().map(|competition| {
        approve_stale_games(competitions, notifier, competition, approval_timeout, now)
    }))
    .await;

    Ok(counts.into_iter().sum())
}

/// A game qualifies once it has sat pending with zero declines for the full
/// timeout. A missing creation timestamp disqualifies it rather than crashing
/// the scan; already-terminal games are never reprocessed.
fn eligible_for_auto_approval(game: &GameResult, now: DateTime<Utc>, timeout: Duration) -> bool {
    if game.status != ApprovalStatus::Pending || game.declines != 0 {
        return false;
    }
    let Some(created_at) = game.created_at else {
        return false;
    };
    let Ok(timeout) = chrono::Duration::from_std(timeout) else {
        return false;
    };
    now.signed_duration_since(created_at) >= timeout
}

async fn approve_stale_games(
    competitions: &Arc<dyn CompetitionRepository>,
    notifier: &Arc<dyn NotificationSender>,
    mut competition: Competition,
    timeout: Duration,
    now: DateTime<Utc>,
) -> usize {
    let stale: Vec<GameResult> = competition
        .all_games()
        .filter(|game| eligible_for_auto_approval(game, now, timeout))
        .cloned()
        .collect();

    if stale.is_empty() {
        return 0;
    }

    let mut approved_ids = Vec::new();
    for game in &stale {
        let impact = match TeamPerformanceEngine::apply(game, &competition.teams) {
            Ok(impact) => impact,
            Err(err) => {
                warn!(
                    competition_id = %competition.competition_id,
                    game_id = %game.game_id,
                    error = %err,
                    "skipping malformed game"
                );
                continue;
            }
        };
        let players = match PlayerPerformanceEngine::apply(game, &competition.participants) {
            Ok(players) => players,
            Err(err) => {
                warn!(
                    competition_id = %competition.competition_id,
                    game_id = %game.game_id,
                    error = %err,
                    "skipping malformed game"
                );
                continue;
            }
        };

        competition.merge_team(impact.winner);
        competition.merge_team(impact.loser);
        for player in players {
            competition.merge_player(player);
        }
        approved_ids.push(game.game_id.clone());
    }

    if approved_ids.is_empty() {
        return 0;
    }

    for game in competition.all_games_mut() {
        if approved_ids.contains(&game.game_id) {
            game.status = ApprovalStatus::Approved;
            game.auto_approved = true;
        }
    }

    if let Err(err) = competitions.save_competition(&competition).await {
        warn!(
            competition_id = %competition.competition_id,
            error = %err,
            "failed to persist auto-approved games; next cycle will retry"
        );
        return 0;
    }

    info!(
        competition_id = %competition.competition_id,
        approved = approved_ids.len(),
        "auto-approved stale pending games"
    );

    notify_participants(notifier, &competition, &stale, &approved_ids).await;

    approved_ids.len()
}

async fn notify_participants(
    notifier: &Arc<dyn NotificationSender>,
    competition: &Competition,
    stale: &[GameResult],
    approved_ids: &[String],
) {
    for game in stale {
        if !approved_ids.contains(&game.game_id) {
            continue;
        }
        let Some(outcome) = game.result.as_ref() else {
            continue;
        };
        let recipients = outcome
            .winner
            .players
            .iter()
            .chain(outcome.loser.players.iter());
        for recipient_id in recipients {
            let notification = Notification {
                recipient_id: recipient_id.clone(),
                kind: NotificationKind::GameAutoApproved,
                message: format!("A game in {} was approved automatically.", competition.name),
                data: json!({
                    "competitionId": competition.competition_id,
                    "gameId": game.game_id,
                }),
            };
            if let Err(err) = notifier.send(notification).await {
                warn!(
                    competition_id = %competition.competition_id,
                    game_id = %game.game_id,
                    error = %err,
                    "auto-approval notification failed"
                );
            }
        }
    }
}
