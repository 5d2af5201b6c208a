pub mod allocation;
pub mod service;

pub use allocation::{
    allocate, league_prize_pool, rank_entries, tournament_prize_pool, PlacementAward, RankedEntry,
    DISTRIBUTION_CURVE, DOUBLES_POOL_MULTIPLIER, SINGLES_POOL_MULTIPLIER,
};
pub use service::PrizeService;
