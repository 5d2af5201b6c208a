pub mod models;
pub mod repository;
pub mod schedule;

pub use models::{
    ApprovalStatus, Competition, CompetitionKind, Fixture, GameResult, MatchFormat, MatchOutcome,
    SideResult, TeamSlot,
};
pub use repository::{CompetitionRepository, InMemoryCompetitionRepository};
pub use schedule::{parse_end_date, prizes_due, ScheduleError};
