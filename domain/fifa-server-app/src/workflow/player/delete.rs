use std::sync::Arc;

use crate::domain::{
    PlayerId, RepoUpdateError,
    player::PlayerRepository,
};

#[async_trait::async_trait]
pub trait PlayerDeleteUseCase {
    /// Removes the player together with every version and skill value.
    async fn delete_player(&self, player_id: PlayerId) -> Result<(), DeletePlayerError>;
}

#[derive(Debug, PartialEq, Eq)]
pub enum DeletePlayerError {
    NotFound,
    RepositoryError,
}

pub struct PlayerDeleteUseCaseImpl<P: PlayerRepository> {
    player_repository: Arc<P>,
}

impl<P: PlayerRepository> PlayerDeleteUseCaseImpl<P> {
    pub fn new(player_repository: Arc<P>) -> Self {
        Self { player_repository }
    }
}

#[async_trait::async_trait]
impl<P: PlayerRepository + Send + Sync + 'static> PlayerDeleteUseCase
    for PlayerDeleteUseCaseImpl<P>
{
    async fn delete_player(&self, player_id: PlayerId) -> Result<(), DeletePlayerError> {
        match self.player_repository.delete_player(player_id).await {
            Ok(()) => {
                log::info!("Deleted player {}", player_id);
                Ok(())
            }
            Err(RepoUpdateError::NotFound) => Err(DeletePlayerError::NotFound),
            Err(RepoUpdateError::StorageError(e)) => {
                log::error!("Error deleting player {}: {}", player_id, e);
                Err(DeletePlayerError::RepositoryError)
            }
        }
    }
}
