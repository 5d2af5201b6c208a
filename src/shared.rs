use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::competition::repository::CompetitionRepository;
use crate::competition::schedule::ScheduleError;
use crate::jobs::{AutoApprovalConfig, PrizeDistributionConfig};
use crate::notify::NotificationSender;
use crate::stats::StatsError;
use crate::users::UserDirectory;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub competitions: Arc<dyn CompetitionRepository>,
    pub users: Arc<dyn UserDirectory>,
    pub notifier: Arc<dyn NotificationSender>,
    pub auto_approval: AutoApprovalConfig,
    pub prize_distribution: PrizeDistributionConfig,
}

impl AppState {
    pub fn new(
        competitions: Arc<dyn CompetitionRepository>,
        users: Arc<dyn UserDirectory>,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            competitions,
            users,
            notifier,
            auto_approval: AutoApprovalConfig::default(),
            prize_distribution: PrizeDistributionConfig::default(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Revision conflict on competition {competition_id}")]
    RevisionConflict { competition_id: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Stats(#[from] StatsError),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::RevisionConflict { competition_id } => (
                StatusCode::CONFLICT,
                format!("Revision conflict on competition {}", competition_id),
            ),
            AppError::Storage(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Storage error: {}", msg),
            ),
            AppError::Schedule(err) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            AppError::Stats(err) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
