use std::sync::Arc;

use fifa_persistence_sqlite::{
    create_db_pool, players::SqlitePlayerRepository, run_migrations,
    seasons::SqliteSeasonRepository, skill_values::SqliteSkillValueRepository,
    skills::SqliteSkillCatalogRepository, versions::SqliteVersionRepository,
};
use fifa_server_app::build_application;
use log::info;

mod logs;

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received. Preparing graceful exit...");
}

#[tokio::main]
async fn main() {
    if dotenvy::dotenv().is_err() {
        eprintln!("No .env file found, using process environment");
    }

    logs::init_logger();

    let pool = create_db_pool()
        .await
        .expect("Failed to open player database");
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let player_repo = Arc::new(SqlitePlayerRepository::new(pool.clone()));
    let version_repo = Arc::new(SqliteVersionRepository::new(pool.clone()));
    let skill_value_repo = Arc::new(SqliteSkillValueRepository::new(pool.clone()));
    let skill_catalog_repo = Arc::new(SqliteSkillCatalogRepository::new(pool.clone()));
    let season_repo = Arc::new(SqliteSeasonRepository::new(pool.clone()));

    let app = Arc::new(
        build_application(
            player_repo,
            version_repo,
            skill_value_repo,
            skill_catalog_repo,
            season_repo,
        )
        .await
        .expect("Failed to seed skill catalog"),
    );

    info!("Starting application");

    fifa_server_http_api::run(app, shutdown_signal()).await;

    pool.close().await;
    info!("Database pool closed");
}
