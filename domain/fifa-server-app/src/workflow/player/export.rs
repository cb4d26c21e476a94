use std::sync::Arc;

use crate::{
    domain::{
        Pagination, RepoError,
        player::{Player, PlayerFilter, PlayerQuery, PlayerRepository},
    },
    workflow::player::search::normalize_filter,
};

#[async_trait::async_trait]
pub trait PlayerExportUseCase {
    /// Every matching player ordered by name, without pagination.
    async fn export(&self, filter: PlayerFilter) -> Result<Vec<Player>, PlayerExportError>;
}

#[derive(Debug, PartialEq, Eq)]
pub enum PlayerExportError {
    RepositoryError,
}

pub struct PlayerExportUseCaseImpl<P: PlayerRepository> {
    player_repository: Arc<P>,
}

impl<P: PlayerRepository> PlayerExportUseCaseImpl<P> {
    pub fn new(player_repository: Arc<P>) -> Self {
        Self { player_repository }
    }
}

#[async_trait::async_trait]
impl<P: PlayerRepository + Send + Sync + 'static> PlayerExportUseCase
    for PlayerExportUseCaseImpl<P>
{
    async fn export(&self, filter: PlayerFilter) -> Result<Vec<Player>, PlayerExportError> {
        let query = PlayerQuery {
            filter: normalize_filter(filter),
            pagination: Pagination::default(),
        };
        match self.player_repository.query_players(query).await {
            Ok(result) => Ok(result.items),
            Err(RepoError::StorageError(e)) => {
                log::error!("Error exporting players: {}", e);
                Err(PlayerExportError::RepositoryError)
            }
        }
    }
}
