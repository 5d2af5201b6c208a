//! End-to-end flows over the in-memory repositories: stale games are
//! auto-approved into the aggregates, a finished league is settled, and an
//! approved game can be reversed back out.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};

use rallyrank::competition::repository::CompetitionRepository;
use rallyrank::jobs::run_auto_approval_cycle;
use rallyrank::notify::{NotificationKind, NotificationSender};
use rallyrank::stats::ReversalEngine;
use rallyrank::{
    ApprovalStatus, Competition, CompetitionKind, GameResult, InMemoryCompetitionRepository,
    InMemoryUserDirectory, MatchFormat, PrizeService, RecordingNotificationSender, UserDirectory,
    UserProfile,
};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

fn stale_game(winners: [&str; 2], losers: [&str; 2], score: (i32, i32)) -> GameResult {
    let mut game = GameResult::finished(
        &winners.map(str::to_string),
        score.0,
        &losers.map(str::to_string),
        score.1,
    );
    game.created_at = Some(Utc::now() - chrono::Duration::hours(25));
    game
}

fn fresh_game(winners: [&str; 2], losers: [&str; 2], score: (i32, i32)) -> GameResult {
    let mut game = stale_game(winners, losers, score);
    game.created_at = Some(Utc::now() - chrono::Duration::hours(1));
    game
}

async fn profile(users: &InMemoryUserDirectory, user_id: &str, xp: i64) {
    users
        .insert_user(UserProfile {
            user_id: user_id.to_string(),
            display_name: user_id.to_string(),
            experience_points: xp,
            placements: Default::default(),
        })
        .await;
}

#[tokio::test]
async fn auto_approval_feeds_prize_distribution() {
    let concrete = Arc::new(InMemoryCompetitionRepository::new());
    let repository: Arc<dyn CompetitionRepository> = concrete.clone();
    let recording = Arc::new(RecordingNotificationSender::new());
    let notifier: Arc<dyn NotificationSender> = recording.clone();
    let users = Arc::new(InMemoryUserDirectory::new());

    let mut competition =
        Competition::new("City League", CompetitionKind::League, MatchFormat::Doubles);
    competition.end_date = Some("2026-03-14".to_string());
    competition.games = vec![
        stale_game(["Sam", "Lee"], ["Ray", "Kim"], (21, 10)),
        stale_game(["Sam", "Lee"], ["Ray", "Kim"], (21, 15)),
        fresh_game(["Ray", "Kim"], ["Sam", "Lee"], (21, 19)),
    ];
    concrete.create_competition(&competition).await.unwrap();

    // Sam outranks Lee on the XP tie-break; both have identical aggregates.
    profile(&users, "Sam", 500).await;
    profile(&users, "Lee", 100).await;
    profile(&users, "Ray", 0).await;
    profile(&users, "Kim", 0).await;

    let approved = run_auto_approval_cycle(&repository, &notifier, DAY, Utc::now())
        .await
        .unwrap();
    assert_eq!(approved, 2);

    let stored = concrete
        .get_competition(&competition.competition_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.approved_game_count(), 2);
    assert_eq!(stored.games[2].status, ApprovalStatus::Pending);

    let winners = stored.teams.iter().find(|t| t.key == "Lee-Sam").unwrap();
    assert_eq!(winners.summary.wins, 2);
    assert_eq!(winners.summary.current_streak, 2);
    assert_eq!(winners.summary.demon_wins, 1);

    let losers = stored.teams.iter().find(|t| t.key == "Kim-Ray").unwrap();
    assert_eq!(losers.summary.losses, 2);
    // Two losses to the same pair makes them the rival.
    assert_eq!(losers.summary.rival.as_ref().unwrap().key, "Lee-Sam");

    // Settle after the end date: pool = floor((4 * 2 + 42) / 2) = 25.
    let service = PrizeService::new(repository.clone(), users.clone(), notifier.clone());
    let after_end = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
    let settled = service.settle_due_competitions(after_end).await.unwrap();
    assert_eq!(settled, 1);

    let sam = users.get_user("Sam").await.unwrap().unwrap();
    assert_eq!(sam.experience_points, 500 + 10);
    assert_eq!(sam.placements.get("1st"), Some(&1));

    let lee = users.get_user("Lee").await.unwrap().unwrap();
    assert_eq!(lee.experience_points, 100 + 7);
    assert_eq!(lee.placements.get("2nd"), Some(&1));

    let stored = concrete
        .get_competition(&competition.competition_id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.prizes_distributed);
    assert_eq!(stored.prize_distribution_date, Some(after_end));

    let sent = recording.sent().await;
    let prize_notes: Vec<_> = sent
        .iter()
        .filter(|n| n.kind == NotificationKind::PrizeAwarded)
        .collect();
    assert_eq!(prize_notes.len(), 4);
    let approval_notes = sent
        .iter()
        .filter(|n| n.kind == NotificationKind::GameAutoApproved)
        .count();
    assert_eq!(approval_notes, 8);
}

#[tokio::test]
async fn approved_game_can_be_reversed_out_of_the_aggregates() {
    let concrete = Arc::new(InMemoryCompetitionRepository::new());
    let repository: Arc<dyn CompetitionRepository> = concrete.clone();
    let notifier: Arc<dyn NotificationSender> = Arc::new(RecordingNotificationSender::new());

    let mut competition =
        Competition::new("City League", CompetitionKind::League, MatchFormat::Doubles);
    competition.games = vec![
        stale_game(["Sam", "Lee"], ["Ray", "Kim"], (21, 15)),
        stale_game(["Sam", "Lee"], ["Ray", "Kim"], (21, 8)),
    ];
    concrete.create_competition(&competition).await.unwrap();

    run_auto_approval_cycle(&repository, &notifier, DAY, Utc::now())
        .await
        .unwrap();

    let mut stored = concrete
        .get_competition(&competition.competition_id)
        .await
        .unwrap()
        .unwrap();
    let second = stored.games[1].clone();

    // An admin invalidates the second game: roll its effect back out.
    let impact = ReversalEngine::reverse_teams(&second, &stored.teams).unwrap();
    stored.merge_team(impact.winner);
    stored.merge_team(impact.loser);
    for player in ReversalEngine::reverse_players(&second, &stored.participants).unwrap() {
        stored.merge_player(player);
    }
    stored.games[1].status = ApprovalStatus::Rejected;
    concrete.save_competition(&stored).await.unwrap();

    let stored = concrete
        .get_competition(&competition.competition_id)
        .await
        .unwrap()
        .unwrap();
    let winners = stored.teams.iter().find(|t| t.key == "Lee-Sam").unwrap();
    assert_eq!(winners.summary.wins, 1);
    assert_eq!(winners.summary.games_played, 1);
    assert_eq!(winners.summary.current_streak, 1);
    assert_eq!(winners.summary.demon_wins, 0);
    assert_eq!(winners.summary.total_point_difference, 6);

    let sam = stored
        .participants
        .iter()
        .find(|p| p.user_id == "Sam")
        .unwrap();
    assert_eq!(sam.summary.wins, 1);
}
