use std::{sync::Arc, time::Duration};

use fifa_server_app::domain::{
    RepoError, SkillId,
    catalog::{Skill, SkillCatalogRepository, SkillSeed},
};
use sqlx::SqlitePool;

const CATALOG_KEY: &str = "skills";

#[derive(sqlx::FromRow)]
struct SkillRow {
    id: i64,
    code: String,
    name: String,
}

pub struct SqliteSkillCatalogRepository {
    pool: SqlitePool,
    catalog_cache: Arc<moka::future::Cache<&'static str, Vec<Skill>>>,
}

impl SqliteSkillCatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        let catalog_cache = Arc::new(
            moka::future::Cache::builder()
                .max_capacity(1)
                .time_to_live(Duration::from_secs(5 * 60))
                .build(),
        );
        Self {
            pool,
            catalog_cache,
        }
    }
}

#[async_trait::async_trait]
impl SkillCatalogRepository for SqliteSkillCatalogRepository {
    async fn insert_missing_skills(&self, seeds: &[SkillSeed]) -> Result<usize, RepoError> {
        let mut created = 0;
        for seed in seeds {
            let result = sqlx::query(
                "INSERT INTO skills (code, name) VALUES (?, ?) ON CONFLICT (code) DO NOTHING",
            )
            .bind(seed.code.as_str())
            .bind(seed.name)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
            created += result.rows_affected() as usize;
        }
        if created > 0 {
            self.catalog_cache.invalidate(&CATALOG_KEY).await;
        }
        Ok(created)
    }

    async fn list_skills(&self) -> Result<Vec<Skill>, RepoError> {
        if let Some(skills) = self.catalog_cache.get(&CATALOG_KEY).await {
            return Ok(skills);
        }

        let rows: Vec<SkillRow> = sqlx::query_as("SELECT id, code, name FROM skills ORDER BY code")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        let skills: Vec<Skill> = rows
            .into_iter()
            .map(|row| Skill {
                id: SkillId(row.id),
                code: row.code,
                name: row.name,
            })
            .collect();
        self.catalog_cache.insert(CATALOG_KEY, skills.clone()).await;
        Ok(skills)
    }
}

#[cfg(test)]
mod tests {
    use fifa_server_app::domain::catalog::{SkillCode, base_skill_seeds};

    use crate::create_in_memory_pool;

    use super::*;

    #[tokio::test]
    async fn test_seeding_is_idempotent_and_keeps_names() {
        let pool = create_in_memory_pool().await.unwrap();
        sqlx::query("INSERT INTO skills (code, name) VALUES ('PAC', 'Speed')")
            .execute(&pool)
            .await
            .unwrap();
        let repo = SqliteSkillCatalogRepository::new(pool.clone());

        assert_eq!(repo.insert_missing_skills(&base_skill_seeds()).await.unwrap(), 5);
        assert_eq!(repo.insert_missing_skills(&base_skill_seeds()).await.unwrap(), 0);

        let skills = repo.list_skills().await.unwrap();
        assert_eq!(skills.len(), 6);
        let pac = skills
            .iter()
            .find(|s| s.code == SkillCode::Pac.as_str())
            .unwrap();
        assert_eq!(pac.name, "Speed");
    }

    #[tokio::test]
    async fn test_cache_refreshes_after_seeding() {
        let pool = create_in_memory_pool().await.unwrap();
        let repo = SqliteSkillCatalogRepository::new(pool);
        assert!(repo.list_skills().await.unwrap().is_empty());
        repo.insert_missing_skills(&base_skill_seeds()).await.unwrap();
        assert_eq!(repo.list_skills().await.unwrap().len(), 6);
    }
}
