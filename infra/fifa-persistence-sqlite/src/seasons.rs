use fifa_server_app::domain::{
    PlayerId, RepoUpdateError,
    yearly::{SeasonRepository, YearlyWrite},
};
use sqlx::SqlitePool;

use crate::{skill_values::upsert_skill_value_row, versions::upsert_version_row};

pub struct SqliteSeasonRepository {
    pool: SqlitePool,
}

impl SqliteSeasonRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn apply_in_transaction(
        &self,
        player_id: PlayerId,
        write: &YearlyWrite,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM players WHERE id = ?")
            .bind(player_id.0)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Ok(false);
        }

        if let Some(rating) = write.overall_rating {
            upsert_version_row(&mut *tx, player_id, write.year, rating, None).await?;
        }
        for (skill_id, value) in &write.skill_values {
            upsert_skill_value_row(&mut *tx, player_id, *skill_id, write.year, *value).await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}

#[async_trait::async_trait]
impl SeasonRepository for SqliteSeasonRepository {
    async fn apply_year(
        &self,
        player_id: PlayerId,
        write: &YearlyWrite,
    ) -> Result<(), RepoUpdateError> {
        match self.apply_in_transaction(player_id, write).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(RepoUpdateError::NotFound),
            Err(e) => Err(RepoUpdateError::StorageError(e.to_string())),
        }
    }
}
