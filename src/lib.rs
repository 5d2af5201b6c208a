// Library crate for the rallyrank league service
// This file exposes the public API for integration tests

pub mod competition;
pub mod http;
pub mod jobs;
pub mod notify;
pub mod prize;
pub mod shared;
pub mod stats;
pub mod users;

// Re-export commonly used types for easier access in tests
pub use competition::{
    ApprovalStatus, Competition, CompetitionKind, GameResult, InMemoryCompetitionRepository,
    MatchFormat,
};
pub use jobs::{AutoApprovalConfig, PrizeDistributionConfig};
pub use notify::{NotificationSender, RecordingNotificationSender};
pub use prize::PrizeService;
pub use shared::{AppError, AppState};
pub use stats::{PlayerAggregate, ReversalEngine, TeamAggregate, TeamPerformanceEngine};
pub use users::{InMemoryUserDirectory, UserDirectory, UserProfile};
