use std::{collections::BTreeMap, sync::Arc};

use validator::Validate;

use crate::{
    domain::{
        PlayerId, RepoUpdateError, Year,
        catalog::SkillCode,
        player::{Player, PlayerRepository, PlayerUpdate},
        yearly::YearlyFacts,
    },
    workflow::season::{
        apply_year::{ApplyYearError, ApplyYearWorkflow},
        current_year,
    },
};

#[derive(Clone, Debug, Default)]
pub struct UpdatePlayerRequest {
    pub update: PlayerUpdate,
    pub year: Option<Year>,
    pub skills: Option<BTreeMap<SkillCode, i32>>,
}

#[async_trait::async_trait]
pub trait PlayerUpdateUseCase {
    /// Patches the profile. History is only touched when skills are sent.
    async fn update_player(
        &self,
        player_id: PlayerId,
        request: UpdatePlayerRequest,
    ) -> Result<Player, UpdatePlayerError>;
}

#[derive(Debug, PartialEq, Eq)]
pub enum UpdatePlayerError {
    NotFound,
    InvalidInput(String),
    RepositoryError,
}

pub struct PlayerUpdateUseCaseImpl<P: PlayerRepository, A: ApplyYearWorkflow> {
    player_repository: Arc<P>,
    apply_year_workflow: Arc<A>,
}

impl<P: PlayerRepository, A: ApplyYearWorkflow> PlayerUpdateUseCaseImpl<P, A> {
    pub fn new(player_repository: Arc<P>, apply_year_workflow: Arc<A>) -> Self {
        Self {
            player_repository,
            apply_year_workflow,
        }
    }
}

#[async_trait::async_trait]
impl<
    P: PlayerRepository + Send + Sync + 'static,
    A: ApplyYearWorkflow + Send + Sync + 'static,
> PlayerUpdateUseCase for PlayerUpdateUseCaseImpl<P, A>
{
    async fn update_player(
        &self,
        player_id: PlayerId,
        request: UpdatePlayerRequest,
    ) -> Result<Player, UpdatePlayerError> {
        request
            .update
            .validate()
            .map_err(|e| UpdatePlayerError::InvalidInput(e.to_string()))?;
        if request.year.is_some_and(|year| year <= 0) {
            return Err(UpdatePlayerError::InvalidInput("year inválido".to_string()));
        }

        let player = match self
            .player_repository
            .update_player(player_id, &request.update)
            .await
        {
            Ok(player) => player,
            Err(RepoUpdateError::NotFound) => return Err(UpdatePlayerError::NotFound),
            Err(RepoUpdateError::StorageError(e)) => {
                log::error!("Error updating player {}: {}", player_id, e);
                return Err(UpdatePlayerError::RepositoryError);
            }
        };

        if let Some(skills) = request.skills {
            let facts = YearlyFacts::new(request.year.unwrap_or_else(current_year))
                .with_rating(request.update.rating)
                .with_skills(skills);
            match self.apply_year_workflow.apply_year(player_id, facts).await {
                Ok(()) => {}
                Err(ApplyYearError::PlayerNotFound) => return Err(UpdatePlayerError::NotFound),
                Err(ApplyYearError::RepositoryError(_)) => {
                    return Err(UpdatePlayerError::RepositoryError);
                }
            }
        }

        Ok(player)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        domain::{
            player::NewPlayer, skill_value::SkillValueRepository, version::VersionRepository,
        },
        testing::MockStore,
        workflow::season::apply_year::ApplyYearWorkflowImpl,
    };

    use super::*;

    fn use_case(
        store: &Arc<MockStore>,
    ) -> PlayerUpdateUseCaseImpl<MockStore, ApplyYearWorkflowImpl<MockStore, MockStore>> {
        PlayerUpdateUseCaseImpl::new(
            store.clone(),
            Arc::new(ApplyYearWorkflowImpl::new(store.clone(), store.clone())),
        )
    }

    #[tokio::test]
    async fn test_partial_update_preserves_other_fields() {
        let store = Arc::new(MockStore::seeded());
        let created = store
            .create_player(&NewPlayer {
                name: "Lionel Messi".to_string(),
                club: Some("PSG".to_string()),
                position: Some("RW".to_string()),
                rating: Some(91),
                nationality: Some("Argentina".to_string()),
            })
            .await
            .unwrap();

        let updated = use_case(&store)
            .update_player(
                created.id,
                UpdatePlayerRequest {
                    update: PlayerUpdate {
                        club: Some("Inter Miami".to_string()),
                        ..Default::default()
                    },
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.club.as_deref(), Some("Inter Miami"));
        assert_eq!(updated.position.as_deref(), Some("RW"));
        assert_eq!(updated.rating, 91);
        assert_eq!(updated.nationality.as_deref(), Some("Argentina"));
        assert_eq!(store.version_count(), 0);
    }

    #[tokio::test]
    async fn test_update_with_skills_applies_season() {
        let store = Arc::new(MockStore::seeded());
        let player = store.insert_player("Rodri");

        use_case(&store)
            .update_player(
                player,
                UpdatePlayerRequest {
                    update: PlayerUpdate {
                        rating: Some(91),
                        ..Default::default()
                    },
                    year: Some(2024),
                    skills: Some(BTreeMap::from([(SkillCode::Def, 87)])),
                },
            )
            .await
            .unwrap();

        let versions = store.list_versions(player).await.unwrap();
        assert_eq!(versions[0].rating, Some(91));
        let skills = store.list_skill_values(player).await.unwrap();
        assert_eq!((skills[0].year, skills[0].value), (2024, 87));
    }

    #[tokio::test]
    async fn test_year_without_skills_is_ignored() {
        let store = Arc::new(MockStore::seeded());
        let player = store.insert_player("Phil Foden");
        use_case(&store)
            .update_player(
                player,
                UpdatePlayerRequest {
                    update: PlayerUpdate {
                        rating: Some(85),
                        ..Default::default()
                    },
                    year: Some(2023),
                    skills: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(store.version_count(), 0);
    }

    #[tokio::test]
    async fn test_update_unknown_player() {
        let store = Arc::new(MockStore::seeded());
        let result = use_case(&store)
            .update_player(PlayerId(7), UpdatePlayerRequest::default())
            .await;
        assert_eq!(result.unwrap_err(), UpdatePlayerError::NotFound);
    }
}
