use crate::domain::{PlayerId, RepoError, Year};

/// Overall state of a player in one season.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerVersion {
    pub player_id: PlayerId,
    pub year: Year,
    pub age: Option<i32>,
    pub rating: Option<i32>,
}

#[async_trait::async_trait]
pub trait VersionRepository {
    /// Insert-or-update on `(player, year)`. On conflict the rating is
    /// overwritten and the age only when one is supplied.
    async fn upsert_version(
        &self,
        player_id: PlayerId,
        year: Year,
        rating: i32,
        age: Option<i32>,
    ) -> Result<PlayerVersion, RepoError>;
    /// Ascending by year.
    async fn list_versions(&self, player_id: PlayerId) -> Result<Vec<PlayerVersion>, RepoError>;
}
