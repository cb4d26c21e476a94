use chrono::{DateTime, Utc};
use validator::Validate;

use crate::domain::{
    PaginatedResponse, Pagination, PlayerId, RepoError, RepoRetrieveError, RepoUpdateError,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub club: Option<String>,
    pub position: Option<String>,
    pub rating: i32,
    pub nationality: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Validate)]
pub struct NewPlayer {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(max = 120))]
    pub club: Option<String>,
    #[validate(length(max = 10))]
    pub position: Option<String>,
    #[validate(range(min = 0, max = 99))]
    pub rating: Option<i32>,
    #[validate(length(max = 80))]
    pub nationality: Option<String>,
}

/// A partial profile patch. `None` leaves the stored value untouched.
#[derive(Clone, Debug, Default, Validate)]
pub struct PlayerUpdate {
    #[validate(length(max = 120))]
    pub club: Option<String>,
    #[validate(length(max = 10))]
    pub position: Option<String>,
    #[validate(range(min = 0, max = 99))]
    pub rating: Option<i32>,
    #[validate(length(max = 80))]
    pub nationality: Option<String>,
}

impl PlayerUpdate {
    pub fn is_empty(&self) -> bool {
        self.club.is_none()
            && self.position.is_none()
            && self.rating.is_none()
            && self.nationality.is_none()
    }
}

/// Case-insensitive substring filters; `None` matches everything.
#[derive(Clone, Debug, Default)]
pub struct PlayerFilter {
    pub name: Option<String>,
    pub club: Option<String>,
    pub position: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct PlayerQuery {
    pub filter: PlayerFilter,
    pub pagination: Pagination,
}

#[async_trait::async_trait]
pub trait PlayerRepository {
    async fn create_player(&self, player: &NewPlayer) -> Result<Player, RepoError>;
    async fn get_player(&self, player_id: PlayerId) -> Result<Player, RepoRetrieveError>;
    /// Exact name match. When several players share a name the oldest one wins.
    async fn find_player_by_name(&self, name: &str) -> Result<Player, RepoRetrieveError>;
    async fn update_player(
        &self,
        player_id: PlayerId,
        update: &PlayerUpdate,
    ) -> Result<Player, RepoUpdateError>;
    async fn delete_player(&self, player_id: PlayerId) -> Result<(), RepoUpdateError>;
    /// Rows ordered by name ascending; `total_count` ignores pagination.
    async fn query_players(
        &self,
        query: PlayerQuery,
    ) -> Result<PaginatedResponse<Player>, RepoError>;
}
