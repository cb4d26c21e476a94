use std::str::FromStr;

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
};

pub mod players;
pub mod seasons;
pub mod skill_values;
pub mod skills;
pub mod versions;


const DEFAULT_DB_PATH: &str = "fifa.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Opens the database named by `FIFA_DB_PATH`, creating the file when it
/// does not exist yet.
pub async fn create_db_pool() -> Result<SqlitePool, sqlx::Error> {
    let db_path = std::env::var("FIFA_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
    let max_connections = std::env::var("FIFA_DB_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(DEFAULT_MAX_CONNECTIONS);

    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true);

    log::info!(
        "Opening database {} with up to {} connections",
        db_path,
        max_connections
    );
    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

/// A private database that lives as long as the pool. The single connection
/// is never recycled, otherwise the data would vanish with it.
pub async fn create_in_memory_pool() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    run_migrations(&pool)
        .await
        .map_err(|e| sqlx::Error::Migrate(Box::new(e)))?;
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Unicode lowercase used for the `*_folded` columns and for filter needles.
pub(crate) fn fold(value: &str) -> String {
    value.to_lowercase()
}
