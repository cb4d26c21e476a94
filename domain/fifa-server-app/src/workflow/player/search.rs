use std::sync::Arc;

use crate::domain::{
    Pagination, RepoError,
    player::{Player, PlayerFilter, PlayerQuery, PlayerRepository},
};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Clone, Debug, Default)]
pub struct PlayerSearchRequest {
    pub filter: PlayerFilter,
    /// Raw values as sent by the client; see [`normalize_page`].
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Clone, Debug)]
pub struct PlayerPage {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub players: Vec<Player>,
}

#[async_trait::async_trait]
pub trait PlayerSearchUseCase {
    async fn search(&self, request: PlayerSearchRequest) -> Result<PlayerPage, PlayerSearchError>;
}

#[derive(Debug, PartialEq, Eq)]
pub enum PlayerSearchError {
    RepositoryError,
}

pub struct PlayerSearchUseCaseImpl<P: PlayerRepository> {
    player_repository: Arc<P>,
}

impl<P: PlayerRepository> PlayerSearchUseCaseImpl<P> {
    pub fn new(player_repository: Arc<P>) -> Self {
        Self { player_repository }
    }
}

/// Blank filters match everything.
pub fn normalize_filter(filter: PlayerFilter) -> PlayerFilter {
    fn clean(value: Option<String>) -> Option<String> {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
    PlayerFilter {
        name: clean(filter.name),
        club: clean(filter.club),
        position: clean(filter.position),
    }
}

/// Page defaults to 1 and never goes below it. A missing or zero limit
/// falls back to the default; any other value is clamped to
/// `1..=MAX_PAGE_SIZE`.
pub fn normalize_page(page: Option<i64>, limit: Option<i64>) -> (usize, usize) {
    let page = page.unwrap_or(1).max(1) as usize;
    let limit = match limit {
        None | Some(0) => DEFAULT_PAGE_SIZE,
        Some(l) => l.clamp(1, MAX_PAGE_SIZE as i64) as usize,
    };
    (page, limit)
}

#[async_trait::async_trait]
impl<P: PlayerRepository + Send + Sync + 'static> PlayerSearchUseCase
    for PlayerSearchUseCaseImpl<P>
{
    async fn search(&self, request: PlayerSearchRequest) -> Result<PlayerPage, PlayerSearchError> {
        let (page, limit) = normalize_page(request.page, request.limit);
        let query = PlayerQuery {
            filter: normalize_filter(request.filter),
            pagination: Pagination {
                offset: Some((page - 1) * limit),
                limit: Some(limit),
            },
        };
        match self.player_repository.query_players(query).await {
            Ok(result) => Ok(PlayerPage {
                page,
                limit,
                total: result.total_count,
                players: result.items,
            }),
            Err(RepoError::StorageError(e)) => {
                log::error!("Error searching players: {}", e);
                Err(PlayerSearchError::RepositoryError)
            }
        }
    }
}
