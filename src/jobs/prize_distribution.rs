use std::time::Duration;

use chrono::Utc;
use tokio::time::interval;
use tracing::{error, info, instrument};

use crate::prize::PrizeService;

/// Configuration for the prize-distribution task
#[derive(Debug, Clone)]
pub struct PrizeDistributionConfig {
    /// How often to scan for competitions past their end date
    pub scan_interval: Duration,
}

impl Default for PrizeDistributionConfig {
    fn default() -> Self {
        Self {
            scan_interval: Duration::from_secs(30 * 60), // 30 minutes
        }
    }
}

/// Starts the background task that settles competitions past their end date.
#[instrument(skip(service))]
pub async fn start_prize_distribution_task(service: PrizeService, config: PrizeDistributionConfig) {
    info!(
        scan_interval_secs = config.scan_interval.as_secs(),
        "Starting prize-distribution background task"
    );

    let mut scan_interval = interval(config.scan_interval);

    loop {
        scan_interval.tick().await;

        match service.settle_due_competitions(Utc::now()).await {
            Ok(settled_count) => {
                info!(settled_count, "Prize-distribution cycle completed");
            }
            Err(e) => {
                error!(error = %e, "Prize-distribution cycle failed");
            }
        }
    }
}
