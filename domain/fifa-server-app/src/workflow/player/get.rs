use std::sync::Arc;

use crate::domain::{
    PlayerId, RepoError, RepoRetrieveError,
    player::{Player, PlayerRepository},
    skill_value::SkillValueRepository,
    snapshot::{PlayerSnapshot, aggregate},
    version::VersionRepository,
};

#[derive(Clone, Debug)]
pub struct PlayerDetailView {
    pub player: Player,
    pub snapshot: PlayerSnapshot,
}

#[async_trait::async_trait]
pub trait PlayerGetDetailUseCase {
    async fn get_player(&self, player_id: PlayerId) -> Result<PlayerDetailView, GetPlayerError>;
}

#[derive(Debug, PartialEq, Eq)]
pub enum GetPlayerError {
    NotFound,
    RepositoryError,
}

impl From<RepoError> for GetPlayerError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::StorageError(e) => {
                log::error!("Error loading player history: {}", e);
                GetPlayerError::RepositoryError
            }
        }
    }
}

pub struct PlayerGetDetailUseCaseImpl<
    P: PlayerRepository,
    V: VersionRepository,
    S: SkillValueRepository,
> {
    player_repository: Arc<P>,
    version_repository: Arc<V>,
    skill_value_repository: Arc<S>,
}

impl<P: PlayerRepository, V: VersionRepository, S: SkillValueRepository>
    PlayerGetDetailUseCaseImpl<P, V, S>
{
    pub fn new(
        player_repository: Arc<P>,
        version_repository: Arc<V>,
        skill_value_repository: Arc<S>,
    ) -> Self {
        Self {
            player_repository,
            version_repository,
            skill_value_repository,
        }
    }
}

#[async_trait::async_trait]
impl<
    P: PlayerRepository + Send + Sync + 'static,
    V: VersionRepository + Send + Sync + 'static,
    S: SkillValueRepository + Send + Sync + 'static,
> PlayerGetDetailUseCase for PlayerGetDetailUseCaseImpl<P, V, S>
{
    async fn get_player(&self, player_id: PlayerId) -> Result<PlayerDetailView, GetPlayerError> {
        let player = match self.player_repository.get_player(player_id).await {
            Ok(player) => player,
            Err(RepoRetrieveError::NotFound) => return Err(GetPlayerError::NotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Error getting player {}: {}", player_id, e);
                return Err(GetPlayerError::RepositoryError);
            }
        };
        let versions = self.version_repository.list_versions(player_id).await?;
        let skill_values = self
            .skill_value_repository
            .list_skill_values(player_id)
            .await?;

        Ok(PlayerDetailView {
            player,
            snapshot: aggregate(versions, skill_values),
        })
    }
}
