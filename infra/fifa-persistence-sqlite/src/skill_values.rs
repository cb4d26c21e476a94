use fifa_server_app::domain::{
    PlayerId, RepoError, SkillId, Year,
    skill_value::{SkillValue, SkillValueRepository},
};
use sqlx::{Sqlite, SqlitePool};

const SKILL_VALUE_SELECT: &str = r#"
    SELECT ps.player_id, ps.skill_id, s.code, s.name, ps.year, ps.value
    FROM player_skills ps
    JOIN skills s ON s.id = ps.skill_id
"#;

#[derive(sqlx::FromRow)]
struct SkillValueRow {
    player_id: i64,
    skill_id: i64,
    code: String,
    name: String,
    year: i32,
    value: i32,
}

impl From<SkillValueRow> for SkillValue {
    fn from(row: SkillValueRow) -> Self {
        SkillValue {
            player_id: PlayerId(row.player_id),
            skill_id: SkillId(row.skill_id),
            code: row.code,
            name: row.name,
            year: row.year,
            value: row.value,
        }
    }
}

pub(crate) async fn upsert_skill_value_row<'e, E>(
    executor: E,
    player_id: PlayerId,
    skill_id: SkillId,
    year: Year,
    value: i32,
) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO player_skills (player_id, skill_id, year, value)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (player_id, skill_id, year) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(player_id.0)
    .bind(skill_id.0)
    .bind(year)
    .bind(value)
    .execute(executor)
    .await?;
    Ok(())
}

pub struct SqliteSkillValueRepository {
    pool: SqlitePool,
}

impl SqliteSkillValueRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SkillValueRepository for SqliteSkillValueRepository {
    async fn upsert_skill_value(
        &self,
        player_id: PlayerId,
        skill_id: SkillId,
        year: Year,
        value: i32,
    ) -> Result<SkillValue, RepoError> {
        upsert_skill_value_row(&self.pool, player_id, skill_id, year, value)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;

        let row: SkillValueRow = sqlx::query_as(&format!(
            "{} WHERE ps.player_id = ? AND ps.skill_id = ? AND ps.year = ?",
            SKILL_VALUE_SELECT
        ))
        .bind(player_id.0)
        .bind(skill_id.0)
        .bind(year)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Ok(row.into())
    }

    async fn list_skill_values(&self, player_id: PlayerId) -> Result<Vec<SkillValue>, RepoError> {
        let rows: Vec<SkillValueRow> =
            sqlx::query_as(&format!("{} WHERE ps.player_id = ?", SKILL_VALUE_SELECT))
                .bind(player_id.0)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Ok(rows.into_iter().map(SkillValue::from).collect())
    }
}
