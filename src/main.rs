use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rallyrank::competition::InMemoryCompetitionRepository;
use rallyrank::http::router;
use rallyrank::jobs::{start_auto_approval_task, start_prize_distribution_task};
use rallyrank::notify::LoggingNotificationSender;
use rallyrank::prize::PrizeService;
use rallyrank::shared::AppState;
use rallyrank::users::InMemoryUserDirectory;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rallyrank=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting rallyrank league service");

    // Create shared application state with dependency injection.
    // Easy to switch between implementations once a real document store
    // backend exists.
    let competitions = Arc::new(InMemoryCompetitionRepository::new());
    let users = Arc::new(InMemoryUserDirectory::new());
    let notifier = Arc::new(LoggingNotificationSender::new());

    let app_state = AppState::new(competitions.clone(), users.clone(), notifier.clone());

    // Scheduled jobs run in-process on fixed intervals; the HTTP routes below
    // expose the same cycles to an external cron-style invoker.
    tokio::spawn(start_auto_approval_task(
        app_state.competitions.clone(),
        app_state.notifier.clone(),
        app_state.auto_approval.clone(),
    ));
    tokio::spawn(start_prize_distribution_task(
        PrizeService::new(
            app_state.competitions.clone(),
            app_state.users.clone(),
            app_state.notifier.clone(),
        ),
        app_state.prize_distribution.clone(),
    ));

    let app = router(app_state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("Server running on http://localhost:3000");
    axum::serve(listener, app).await.unwrap();
}
