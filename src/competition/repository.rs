use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::Competition;
use crate::shared::AppError;

/// Storage boundary for competition documents.
///
/// Saves are revision-checked: a caller reads a competition, mutates its own
/// copy and saves it back with the revision it read. A concurrent writer makes
/// the save fail with [`AppError::RevisionConflict`] instead of silently
/// clobbering the other write; jobs log the conflict and let the next cycle
/// retry.
#[async_trait]
pub trait CompetitionRepository: Send + Sync {
    async fn get_competition(&self, competition_id: &str)
        -> Result<Option<Competition>, AppError>;

    async fn list_competitions(&self) -> Result<Vec<Competition>, AppError>;

    async fn create_competition(&self, competition: &Competition) -> Result<(), AppError>;

    /// Persists the competition if its revision still matches the stored one.
    /// Returns the new revision.
    async fn save_competition(&self, competition: &Competition) -> Result<u64, AppError>;
}

/// In-memory implementation for development and tests.
#[derive(Debug, Default)]
pub struct InMemoryCompetitionRepository {
    competitions: RwLock<HashMap<String, Competition>>,
}

impl InMemoryCompetitionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompetitionRepository for InMemoryCompetitionRepository {
    #[instrument(skip(self))]
    async fn get_competition(
        &self,
        competition_id: &str,
    ) -> Result<Option<Competition>, AppError> {
        let competitions = self.competitions.read().await;
        Ok(competitions.get(competition_id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_competitions(&self) -> Result<Vec<Competition>, AppError> {
        let competitions = self.competitions.read().await;
        Ok(competitions.values().cloned().collect())
    }

    #[instrument(skip(self, competition), fields(competition_id = %competition.competition_id))]
    async fn create_competition(&self, competition: &Competition) -> Result<(), AppError> {
        let mut competitions = self.competitions.write().await;
        if competitions.contains_key(&competition.competition_id) {
            warn!("competition already exists");
            return Err(AppError::Storage("competition already exists".to_string()));
        }
        competitions.insert(competition.competition_id.clone(), competition.clone());
        debug!("competition created");
        Ok(())
    }

    #[instrument(skip(self, competition), fields(competition_id = %competition.competition_id))]
    async fn save_competition(&self, competition: &Competition) -> Result<u64, AppError> {
        let mut competitions = self.competitions.write().await;
        let stored = competitions
            .get_mut(&competition.competition_id)
            .ok_or_else(|| AppError::NotFound(competition.competition_id.clone()))?;

        if stored.revision != competition.revision {
            warn!(
                stored_revision = stored.revision,
                caller_revision = competition.revision,
                "revision conflict on save"
            );
            return Err(AppError::RevisionConflict {
                competition_id: competition.competition_id.clone(),
            });
        }

        let mut updated = competition.clone();
        updated.revision += 1;
        let new_revision = updated.revision;
        *stored = updated;

        debug!(revision = new_revision, "competition saved");
        Ok(new_revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::competition::models::{CompetitionKind, MatchFormat};

    fn competition(name: &str) -> Competition {
        Competition::new(name, CompetitionKind::League, MatchFormat::Doubles)
    }

    #[tokio::test]
    async fn create_and_get_round_trip() {
        let repo = InMemoryCompetitionRepository::new();
        let competition = competition("City League");
        repo.create_competition(&competition).await.unwrap();

        let stored = repo
            .get_competition(&competition.competition_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.name, "City League");
        assert_eq!(stored.revision, 0);
    }

    #[tokio::test]
    async fn duplicate_create_is_rejected() {
        let repo = InMemoryCompetitionRepository::new();
        let competition = competition("City League");
        repo.create_competition(&competition).await.unwrap();

        assert!(repo.create_competition(&competition).await.is_err());
    }

    #[tokio::test]
    async fn save_bumps_the_revision() {
        let repo = InMemoryCompetitionRepository::new();
        let competition = competition("City League");
        repo.create_competition(&competition).await.unwrap();

        let mut loaded = repo
            .get_competition(&competition.competition_id)
            .await
            .unwrap()
            .unwrap();
        loaded.name = "Summer League".to_string();
        let revision = repo.save_competition(&loaded).await.unwrap();
        assert_eq!(revision, 1);

        let stored = repo
            .get_competition(&competition.competition_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.name, "Summer League");
        assert_eq!(stored.revision, 1);
    }

    #[tokio::test]
    async fn stale_revision_is_a_conflict() {
        let repo = InMemoryCompetitionRepository::new();
        let competition = competition("City League");
        repo.create_competition(&competition).await.unwrap();

        let first = repo
            .get_competition(&competition.competition_id)
            .await
            .unwrap()
            .unwrap();
        let second = first.clone();

        repo.save_competition(&first).await.unwrap();
        let result = repo.save_competition(&second).await;
        assert!(matches!(result, Err(AppError::RevisionConflict { .. })));
    }

    #[tokio::test]
    async fn saving_an_unknown_competition_is_not_found() {
        let repo = InMemoryCompetitionRepository::new();
        let result = repo.save_competition(&competition("Ghost")).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
