use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde_json::json;
use tracing::{info, warn};

use crate::competition::models::{Competition, CompetitionKind};
use crate::competition::repository::CompetitionRepository;
use crate::competition::schedule;
use crate::notify::{Notification, NotificationKind, NotificationSender};
use crate::shared::AppError;
use crate::users::UserDirectory;

use super::allocation::{
    allocate, league_prize_pool, rank_entries, tournament_prize_pool, PlacementAward, RankedEntry,
    DISTRIBUTION_CURVE,
};

/// Settles finished competitions: ranks participants, splits the pool,
/// credits awards, notifies winners and flags the competition as distributed.
pub struct PrizeService {
    competitions: Arc<dyn CompetitionRepository>,
    users: Arc<dyn UserDirectory>,
    notifier: Arc<dyn NotificationSender>,
}

impl PrizeService {
    pub fn new(
        competitions: Arc<dyn CompetitionRepository>,
        users: Arc<dyn UserDirectory>,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            competitions,
            users,
            notifier,
        }
    }

    /// One distribution pass over every stored competition. Competitions are
    /// settled independently and concurrently; a failure in one is logged and
    /// does not stop the others. Returns how many were settled.
    pub async fn settle_due_competitions(&self, now: DateTime<Utc>) -> Result<usize, AppError> {
        let competitions = self.competitions.list_competitions().await?;
        let settled = join_all(
            competitions
                .into_iter()
                .map(|competition| self.settle_if_due(competition, now)),
        )
        .await;
        Ok(settled.into_iter().filter(|done| *done).count())
    }

    async fn settle_if_due(&self, competition: Competition, now: DateTime<Utc>) -> bool {
        if competition.prizes_distributed {
            return false;
        }

        match schedule::prizes_due(competition.end_date.as_deref(), now) {
            Ok(true) => {}
            Ok(false) => return false,
            Err(err) => {
                warn!(
                    competition_id = %competition.competition_id,
                    error = %err,
                    "skipping competition with unusable end date"
                );
                return false;
            }
        }

        let competition_id = competition.competition_id.clone();
        match self.settle_competition(competition, now).await {
            Ok(awards) => {
                info!(
                    competition_id = %competition_id,
                    awards = awards.len(),
                    "prizes distributed"
                );
                true
            }
            Err(err) => {
                warn!(
                    competition_id = %competition_id,
                    error = %err,
                    "prize distribution failed; will retry next cycle"
                );
                false
            }
        }
    }

    /// Settles one competition unconditionally (the due-date gate is the
    /// caller's responsibility) and persists the result.
    pub async fn settle_competition(
        &self,
        mut competition: Competition,
        now: DateTime<Utc>,
    ) -> Result<Vec<PlacementAward>, AppError> {
        let pool = match competition.kind {
            CompetitionKind::League => league_prize_pool(
                competition.participants.len(),
                competition.approved_game_count(),
                competition.total_winner_points(),
            ),
            CompetitionKind::Tournament => {
                tournament_prize_pool(competition.all_games().count(), competition.format)
            }
        };

        let entries = self.ranking_entries(&competition).await;
        let ranked = rank_entries(entries);
        let awards = allocate(pool, &DISTRIBUTION_CURVE, &ranked);

        for award in &awards {
            if let Err(err) = self
                .users
                .credit_award(&award.user_id, award.amount, &award.label)
                .await
            {
                warn!(
                    competition_id = %competition.competition_id,
                    user_id = %award.user_id,
                    error = %err,
                    "failed to credit award"
                );
                continue;
            }
            self.notify_award(&competition, award).await;
        }

        competition.prizes_distributed = true;
        competition.prize_distribution_date = Some(now);
        self.competitions.save_competition(&competition).await?;

        Ok(awards)
    }

    /// Ranking inputs for every participant; users missing from the directory
    /// are skipped, the rest of the batch continues.
    async fn ranking_entries(&self, competition: &Competition) -> Vec<RankedEntry> {
        let mut entries = Vec::with_capacity(competition.participants.len());
        for participant in &competition.participants {
            let profile = match self.users.get_user(&participant.user_id).await {
                Ok(Some(profile)) => profile,
                Ok(None) => {
                    warn!(
                        competition_id = %competition.competition_id,
                        user_id = %participant.user_id,
                        "participant not found in user directory; skipping"
                    );
                    continue;
                }
                Err(err) => {
                    warn!(
                        competition_id = %competition.competition_id,
                        user_id = %participant.user_id,
                        error = %err,
                        "user lookup failed; skipping"
                    );
                    continue;
                }
            };
            entries.push(RankedEntry {
                user_id: participant.user_id.clone(),
                wins: participant.summary.wins,
                total_point_difference: participant.summary.total_point_difference,
                experience_points: profile.experience_points,
            });
        }
        entries
    }

    async fn notify_award(&self, competition: &Competition, award: &PlacementAward) {
        let notification = Notification {
            recipient_id: award.user_id.clone(),
            kind: NotificationKind::PrizeAwarded,
            message: format!(
                "You finished {} in {} and won {} XP!",
                award.label, competition.name, award.amount
            ),
            data: json!({
                "competitionId": competition.competition_id,
                "placement": award.label,
                "amount": award.amount,
            }),
        };
        if let Err(err) = self.notifier.send(notification).await {
            warn!(
                competition_id = %competition.competition_id,
                user_id = %award.user_id,
                error = %err,
                "prize notification failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::competition::models::{ApprovalStatus, CompetitionKind, GameResult, MatchFormat};
    use crate::competition::repository::InMemoryCompetitionRepository;
    use crate::notify::RecordingNotificationSender;
    use crate::stats::PlayerAggregate;
    use crate::users::{InMemoryUserDirectory, UserProfile};
    use chrono::TimeZone;

    fn participant(user_id: &str, wins: u32) -> PlayerAggregate {
        let mut aggregate = PlayerAggregate::seed(user_id);
        for _ in 0..wins {
            aggregate.summary.record_win(2);
        }
        aggregate
    }

    fn approved_game(winner: &str, loser: &str) -> GameResult {
        let mut game =
            GameResult::finished(&[winner.to_string()], 21, &[loser.to_string()], 15);
        game.status = ApprovalStatus::Approved;
        game
    }

    fn profile(user_id: &str) -> UserProfile {
        UserProfile {
            user_id: user_id.to_string(),
            display_name: user_id.to_string(),
            experience_points: 0,
            placements: Default::default(),
        }
    }

    struct Setup {
        repository: Arc<InMemoryCompetitionRepository>,
        users: Arc<InMemoryUserDirectory>,
        notifier: Arc<RecordingNotificationSender>,
        service: PrizeService,
    }

    fn setup() -> Setup {
        let repository = Arc::new(InMemoryCompetitionRepository::new());
        let users = Arc::new(InMemoryUserDirectory::new());
        let notifier = Arc::new(RecordingNotificationSender::new());
        let service = PrizeService::new(repository.clone(), users.clone(), notifier.clone());
        Setup {
            repository,
            users,
            notifier,
            service,
        }
    }

    async fn league_with_five_players(setup: &Setup, end_date: &str) -> Competition {
        let mut competition =
            Competition::new("City League", CompetitionKind::League, MatchFormat::Singles);
        competition.end_date = Some(end_date.to_string());
        for (user_id, wins) in [("a", 9), ("b", 7), ("c", 5), ("d", 3), ("e", 1)] {
            competition.participants.push(participant(user_id, wins));
            setup.users.insert_user(profile(user_id)).await;
        }
        for loser in ["b", "c", "d", "e"] {
            competition.games.push(approved_game("a", loser));
        }
        setup
            .repository
            .create_competition(&competition)
            .await
            .unwrap();
        competition
    }

    #[tokio::test]
    async fn settles_a_due_league() {
        let setup = setup();
        let competition = league_with_five_players(&setup, "2026-03-14").await;
        let after_end = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();

        let settled = setup.service.settle_due_competitions(after_end).await.unwrap();
        assert_eq!(settled, 1);

        let stored = setup
            .repository
            .get_competition(&competition.competition_id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.prizes_distributed);
        assert_eq!(stored.prize_distribution_date, Some(after_end));

        // Pool = floor((5 * 4 + 84) / 2) = 52; first place takes 40% of it.
        let first = setup.users.get_user("a").await.unwrap().unwrap();
        assert_eq!(first.experience_points, 20);
        assert_eq!(first.placements.get("1st"), Some(&1));
        let fifth = setup.users.get_user("e").await.unwrap().unwrap();
        assert_eq!(fifth.experience_points, 0);

        let sent = setup.notifier.sent().await;
        assert_eq!(sent.len(), 4);
        assert!(sent[0].message.contains("1st"));
    }

    #[tokio::test]
    async fn competition_before_its_end_date_is_left_alone() {
        let setup = setup();
        let competition = league_with_five_players(&setup, "2026-03-14").await;
        let before_end = Utc.with_ymd_and_hms(2026, 3, 13, 12, 0, 0).unwrap();

        let settled = setup.service.settle_due_competitions(before_end).await.unwrap();
        assert_eq!(settled, 0);

        let stored = setup
            .repository
            .get_competition(&competition.competition_id)
            .await
            .unwrap()
            .unwrap();
        assert!(!stored.prizes_distributed);
    }

    #[tokio::test]
    async fn already_settled_competition_is_not_reprocessed() {
        let setup = setup();
        league_with_five_players(&setup, "2026-03-14").await;
        let after_end = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();

        assert_eq!(setup.service.settle_due_competitions(after_end).await.unwrap(), 1);
        assert_eq!(setup.service.settle_due_competitions(after_end).await.unwrap(), 0);

        // XP was credited exactly once.
        let first = setup.users.get_user("a").await.unwrap().unwrap();
        assert_eq!(first.placements.get("1st"), Some(&1));
    }

    #[tokio::test]
    async fn unparseable_end_date_is_skipped() {
        let setup = setup();
        league_with_five_players(&setup, "March 14, 2026").await;

        let settled = setup
            .service
            .settle_due_competitions(Utc::now())
            .await
            .unwrap();
        assert_eq!(settled, 0);
    }

    #[tokio::test]
    async fn missing_user_is_skipped_not_fatal() {
        let setup = setup();
        let mut competition =
            Competition::new("City League", CompetitionKind::League, MatchFormat::Singles);
        competition.end_date = Some("2026-03-14".to_string());
        competition.participants.push(participant("known", 5));
        competition.participants.push(participant("ghost", 9));
        setup.users.insert_user(profile("known")).await;
        setup
            .repository
            .create_competition(&competition)
            .await
            .unwrap();

        let after_end = Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap();
        let settled = setup.service.settle_due_competitions(after_end).await.unwrap();
        assert_eq!(settled, 1);

        // The ghost never ranked; the known player took first.
        let known = setup.users.get_user("known").await.unwrap().unwrap();
        assert_eq!(known.placements.get("1st"), Some(&1));
    }

    #[tokio::test]
    async fn tournament_pool_uses_match_count() {
        let setup = setup();
        let mut competition =
            Competition::new("Spring Open", CompetitionKind::Tournament, MatchFormat::Doubles);
        competition.end_date = Some("14/03/2026".to_string());
        for _ in 0..4 {
            competition.games.push(GameResult::finished(
                &["Sam".to_string(), "Lee".to_string()],
                21,
                &["Ray".to_string(), "Kim".to_string()],
                15,
            ));
        }
        competition.participants.push(participant("Sam", 4));
        setup.users.insert_user(profile("Sam")).await;
        setup
            .repository
            .create_competition(&competition)
            .await
            .unwrap();

        let after_end = Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap();
        setup.service.settle_due_competitions(after_end).await.unwrap();

        // Pool = 4 matches * 150; first place takes 40%.
        let sam = setup.users.get_user("Sam").await.unwrap().unwrap();
        assert_eq!(sam.experience_points, 240);
    }
}
