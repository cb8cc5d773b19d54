use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::info;

pub mod entities;
pub mod models;
pub mod schema;
pub mod services;

/// Opens the connection pool for `database_url`.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url.to_owned());
    opt.max_connections(max_connections)
        .sqlx_logging(false);

    let db_pool = Database::connect(opt).await?;
    info!(backend = ?db_pool.get_database_backend(), "Database connection established.");
    Ok(db_pool)
}

/// In-memory SQLite database with the schema applied, for tests.
#[cfg(test)]
pub async fn test_db() -> DatabaseConnection {
    // A single connection keeps every query on the same in-memory database.
    let db = connect("sqlite::memory:", 1).await.unwrap();
    schema::ensure_schema(&db).await.unwrap();
    db
}
