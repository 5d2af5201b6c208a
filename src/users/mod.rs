use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::shared::AppError;

/// The slice of a user document the stats layer touches: experience points
/// and how often the user has finished at each placement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub user_id: String,
    pub display_name: String,
    pub experience_points: i64,
    /// Placement label ("1st", "2nd", ...) to number of finishes there.
    pub placements: HashMap<String, u32>,
}

/// Lookup/award boundary over the user store. A missing user is a soft
/// failure: callers skip that user and continue with the rest of the batch.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>, AppError>;

    /// Credits a prize award: bumps experience points and the placement
    /// counter for the given label.
    async fn credit_award(
        &self,
        user_id: &str,
        amount: i64,
        placement: &str,
    ) -> Result<(), AppError>;
}

/// In-memory implementation for development and tests.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<String, UserProfile>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, profile: UserProfile) {
        let mut users = self.users.write().await;
        users.insert(profile.user_id.clone(), profile);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    #[instrument(skip(self))]
    async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>, AppError> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }

    #[instrument(skip(self))]
    async fn credit_award(
        &self,
        user_id: &str,
        amount: i64,
        placement: &str,
    ) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        let profile = users
            .get_mut(user_id)
            .ok_or_else(|| AppError::NotFound(user_id.to_string()))?;

        profile.experience_points += amount;
        *profile.placements.entry(placement.to_string()).or_insert(0) += 1;

        debug!(amount, placement, "award credited");
        Ok(())
    }
}
