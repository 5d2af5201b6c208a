use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("game {0} has no result")]
    MissingResult(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
