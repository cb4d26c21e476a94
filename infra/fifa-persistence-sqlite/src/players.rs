use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use fifa_server_app::domain::{
    PaginatedResponse, PlayerId, RepoError, RepoRetrieveError, RepoUpdateError,
    player::{NewPlayer, Player, PlayerQuery, PlayerRepository, PlayerUpdate},
};
use sqlx::SqlitePool;

use crate::fold;

const PLAYER_COLUMNS: &str =
    "id, name, club, position, rating, nationality, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct PlayerRow {
    id: i64,
    name: String,
    club: Option<String>,
    position: Option<String>,
    rating: i32,
    nationality: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PlayerRow> for Player {
    fn from(row: PlayerRow) -> Self {
        Player {
            id: PlayerId(row.id),
            name: row.name,
            club: row.club,
            position: row.position,
            rating: row.rating,
            nationality: row.nationality,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct SqlitePlayerRepository {
    pool: SqlitePool,
    player_cache: Arc<moka::future::Cache<PlayerId, Player>>,
}

impl SqlitePlayerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        let player_cache = Arc::new(
            moka::future::Cache::builder()
                .max_capacity(10_000)
                .time_to_live(Duration::from_secs(60 * 60))
                .build(),
        );
        Self { pool, player_cache }
    }
}

#[async_trait::async_trait]
impl PlayerRepository for SqlitePlayerRepository {
    async fn create_player(&self, player: &NewPlayer) -> Result<Player, RepoError> {
        let now = Utc::now();
        let row: PlayerRow = sqlx::query_as(&format!(
            "INSERT INTO players (name, club, position, rating, nationality, \
             name_folded, club_folded, position_folded, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {}",
            PLAYER_COLUMNS
        ))
        .bind(&player.name)
        .bind(&player.club)
        .bind(&player.position)
        .bind(player.rating.unwrap_or(0))
        .bind(&player.nationality)
        .bind(fold(&player.name))
        .bind(player.club.as_deref().map(fold))
        .bind(player.position.as_deref().map(fold))
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::StorageError(e.to_string()))?;

        let player = Player::from(row);
        self.player_cache.insert(player.id, player.clone()).await;
        Ok(player)
    }

    async fn get_player(&self, player_id: PlayerId) -> Result<Player, RepoRetrieveError> {
        if let Some(player) = self.player_cache.get(&player_id).await {
            return Ok(player);
        }

        let row: Option<PlayerRow> = sqlx::query_as(&format!(
            "SELECT {} FROM players WHERE id = ?",
            PLAYER_COLUMNS
        ))
        .bind(player_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoRetrieveError::StorageError(e.to_string()))?;

        match row {
            Some(row) => {
                let player = Player::from(row);
                self.player_cache.insert(player_id, player.clone()).await;
                Ok(player)
            }
            None => Err(RepoRetrieveError::NotFound),
        }
    }

    async fn find_player_by_name(&self, name: &str) -> Result<Player, RepoRetrieveError> {
        let row: Option<PlayerRow> = sqlx::query_as(&format!(
            "SELECT {} FROM players WHERE name = ? ORDER BY id ASC LIMIT 1",
            PLAYER_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoRetrieveError::StorageError(e.to_string()))?;

        row.map(Player::from).ok_or(RepoRetrieveError::NotFound)
    }

    async fn update_player(
        &self,
        player_id: PlayerId,
        update: &PlayerUpdate,
    ) -> Result<Player, RepoUpdateError> {
        let mut sets = Vec::new();
        if update.club.is_some() {
            sets.push("club = ?, club_folded = ?");
        }
        if update.position.is_some() {
            sets.push("position = ?, position_folded = ?");
        }
        if update.rating.is_some() {
            sets.push("rating = ?");
        }
        if update.nationality.is_some() {
            sets.push("nationality = ?");
        }
        sets.push("updated_at = ?");

        let query_str = format!(
            "UPDATE players SET {} WHERE id = ? RETURNING {}",
            sets.join(", "),
            PLAYER_COLUMNS
        );
        let mut query = sqlx::query_as::<_, PlayerRow>(&query_str);
        for field in [&update.club, &update.position] {
            if let Some(value) = field {
                query = query.bind(value).bind(fold(value));
            }
        }
        if let Some(rating) = update.rating {
            query = query.bind(rating);
        }
        if let Some(nationality) = &update.nationality {
            query = query.bind(nationality);
        }
        query = query.bind(Utc::now()).bind(player_id.0);

        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?;
        self.player_cache.invalidate(&player_id).await;

        let player = Player::from(row.ok_or(RepoUpdateError::NotFound)?);
        self.player_cache.insert(player_id, player.clone()).await;
        Ok(player)
    }

    async fn delete_player(&self, player_id: PlayerId) -> Result<(), RepoUpdateError> {
        let result = sqlx::query("DELETE FROM players WHERE id = ?")
            .bind(player_id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?;
        self.player_cache.invalidate(&player_id).await;

        if result.rows_affected() == 0 {
            return Err(RepoUpdateError::NotFound);
        }
        Ok(())
    }

    async fn query_players(
        &self,
        query: PlayerQuery,
    ) -> Result<PaginatedResponse<Player>, RepoError> {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        let pairs = [
            ("name", query.filter.name),
            ("club", query.filter.club),
            ("position", query.filter.position),
        ];
        for (field, value) in pairs {
            if let Some(v) = value {
                conditions.push(format!("instr({}_folded, ?) > 0", field));
                params.push(fold(&v));
            }
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let count_query_str = format!("SELECT COUNT(*) FROM players{}", where_clause);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_query_str);
        for param in &params {
            count_query = count_query.bind(param);
        }
        let total_count = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;

        let mut select_query_str = format!(
            "SELECT {} FROM players{} ORDER BY name_folded ASC, id ASC",
            PLAYER_COLUMNS, where_clause
        );
        // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded.
        match (query.pagination.limit, query.pagination.offset) {
            (Some(_), Some(_)) => select_query_str.push_str(" LIMIT ? OFFSET ?"),
            (Some(_), None) => select_query_str.push_str(" LIMIT ?"),
            (None, Some(_)) => select_query_str.push_str(" LIMIT -1 OFFSET ?"),
            (None, None) => {}
        }
        let mut select_query = sqlx::query_as::<_, PlayerRow>(&select_query_str);
        for param in &params {
            select_query = select_query.bind(param);
        }
        if let Some(limit) = query.pagination.limit {
            select_query = select_query.bind(limit as i64);
        }
        if let Some(offset) = query.pagination.offset {
            select_query = select_query.bind(offset as i64);
        }
        let rows = select_query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;

        Ok(PaginatedResponse {
            total_count: total_count as usize,
            items: rows.into_iter().map(Player::from).collect(),
        })
    }
}
