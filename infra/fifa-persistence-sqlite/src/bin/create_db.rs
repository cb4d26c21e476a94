use fifa_persistence_sqlite::{create_db_pool, run_migrations, skills::SqliteSkillCatalogRepository};
use fifa_server_app::domain::catalog::{base_skill_seeds, ensure_seeded};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let pool = create_db_pool()
        .await
        .expect("Failed to open database");

    run_migrations(&pool)
        .await
        .expect("Failed to create database tables");

    let catalog = SqliteSkillCatalogRepository::new(pool.clone());
    ensure_seeded(&catalog, &base_skill_seeds())
        .await
        .expect("Failed to seed skill catalog");

    println!("Created database tables successfully");
}
