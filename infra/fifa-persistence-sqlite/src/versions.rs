use fifa_server_app::domain::{
    PlayerId, RepoError, Year,
    version::{PlayerVersion, VersionRepository},
};
use sqlx::{Sqlite, SqlitePool};

#[derive(sqlx::FromRow)]
struct VersionRow {
    player_id: i64,
    year: i32,
    age: Option<i32>,
    rating: Option<i32>,
}

impl From<VersionRow> for PlayerVersion {
    fn from(row: VersionRow) -> Self {
        PlayerVersion {
            player_id: PlayerId(row.player_id),
            year: row.year,
            age: row.age,
            rating: row.rating,
        }
    }
}

/// Shared with the season transaction so both paths run the same statement.
pub(crate) async fn upsert_version_row<'e, E>(
    executor: E,
    player_id: PlayerId,
    year: Year,
    rating: i32,
    age: Option<i32>,
) -> Result<PlayerVersion, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row: VersionRow = sqlx::query_as(
        r#"
        INSERT INTO player_versions (player_id, year, rating, age)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (player_id, year) DO UPDATE SET
            rating = excluded.rating,
            age = COALESCE(excluded.age, player_versions.age)
        RETURNING player_id, year, age, rating
        "#,
    )
    .bind(player_id.0)
    .bind(year)
    .bind(rating)
    .bind(age)
    .fetch_one(executor)
    .await?;
    Ok(row.into())
}

pub struct SqliteVersionRepository {
    pool: SqlitePool,
}

impl SqliteVersionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl VersionRepository for SqliteVersionRepository {
    async fn upsert_version(
        &self,
        player_id: PlayerId,
        year: Year,
        rating: i32,
        age: Option<i32>,
    ) -> Result<PlayerVersion, RepoError> {
        upsert_version_row(&self.pool, player_id, year, rating, age)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))
    }

    async fn list_versions(&self, player_id: PlayerId) -> Result<Vec<PlayerVersion>, RepoError> {
        let rows: Vec<VersionRow> = sqlx::query_as(
            "SELECT player_id, year, age, rating FROM player_versions WHERE player_id = ? ORDER BY year ASC",
        )
        .bind(player_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Ok(rows.into_iter().map(PlayerVersion::from).collect())
    }
}
