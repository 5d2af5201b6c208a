pub mod engine;
pub mod models;
pub mod primitives;
pub mod reversal;
pub mod window;

mod errors;

pub use engine::{PlayerPerformanceEngine, TeamImpact, TeamPerformanceEngine};
pub use errors::StatsError;
pub use models::{
    compute_rival, group_key, Outcome, PerformanceSummary, PlayerAggregate, Rival, TeamAggregate,
    DEMON_WIN_MARGIN,
};
pub use reversal::ReversalEngine;
pub use window::BoundedLog;
