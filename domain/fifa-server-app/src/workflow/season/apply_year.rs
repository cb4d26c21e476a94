use std::sync::Arc;

use crate::domain::{
    PlayerId, RepoUpdateError,
    catalog::{SkillCatalog, SkillCatalogRepository},
    yearly::{SeasonRepository, YearlyFacts},
};

#[async_trait::async_trait]
pub trait ApplyYearWorkflow {
    /// Merges one season of facts into the player's version and skill series.
    /// Applying the same facts twice leaves the store unchanged.
    async fn apply_year(&self, player_id: PlayerId, facts: YearlyFacts)
    -> Result<(), ApplyYearError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyYearError {
    #[error("jugador no encontrado")]
    PlayerNotFound,
    #[error("error de almacenamiento: {0}")]
    RepositoryError(String),
}

pub struct ApplyYearWorkflowImpl<C: SkillCatalogRepository, S: SeasonRepository> {
    catalog_repository: Arc<C>,
    season_repository: Arc<S>,
}

impl<C: SkillCatalogRepository, S: SeasonRepository> ApplyYearWorkflowImpl<C, S> {
    pub fn new(catalog_repository: Arc<C>, season_repository: Arc<S>) -> Self {
        Self {
            catalog_repository,
            season_repository,
        }
    }
}

#[async_trait::async_trait]
impl<
    C: SkillCatalogRepository + Send + Sync + 'static,
    S: SeasonRepository + Send + Sync + 'static,
> ApplyYearWorkflow for ApplyYearWorkflowImpl<C, S>
{
    async fn apply_year(
        &self,
        player_id: PlayerId,
        facts: YearlyFacts,
    ) -> Result<(), ApplyYearError> {
        let skills = self.catalog_repository.list_skills().await.map_err(|e| {
            log::error!("Failed to load skill catalog: {}", e);
            ApplyYearError::RepositoryError(e.to_string())
        })?;
        let write = facts.resolve(&SkillCatalog::new(skills));
        if write.is_empty() {
            return Ok(());
        }

        match self.season_repository.apply_year(player_id, &write).await {
            Ok(()) => {
                log::debug!(
                    "Applied season {} for player {} ({} skill values)",
                    write.year,
                    player_id,
                    write.skill_values.len()
                );
                Ok(())
            }
            Err(RepoUpdateError::NotFound) => Err(ApplyYearError::PlayerNotFound),
            Err(RepoUpdateError::StorageError(e)) => {
                log::error!(
                    "Failed to apply season {} for player {}: {}",
                    write.year,
                    player_id,
                    e
                );
                Err(ApplyYearError::RepositoryError(e))
            }
        }
    }
}
