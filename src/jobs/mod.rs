pub mod auto_approval;
pub mod prize_distribution;

pub use auto_approval::{run_auto_approval_cycle, start_auto_approval_task, AutoApprovalConfig};
pub use prize_distribution::{start_prize_distribution_task, PrizeDistributionConfig};
