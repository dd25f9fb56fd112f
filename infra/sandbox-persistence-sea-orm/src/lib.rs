use async_lock::OnceCell;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

pub mod accounts;
pub mod activities;
pub mod armor;
pub mod characters;
pub mod commands;
pub mod entity;
pub mod equipment;
pub mod schema;
pub mod stats;
pub mod weapons;

#[cfg(test)]
mod testing;

static DB_POOL: OnceCell<DatabaseConnection> = OnceCell::new();

/// Connection url from `DATABASE_URL`, or assembled from the `MARIADB_*`
/// variables. The error names the first missing variable.
pub fn database_url(lookup: impl Fn(&str) -> Option<String>) -> Result<String, &'static str> {
    if let Some(url) = lookup("DATABASE_URL") {
        return Ok(url);
    }
    let var = |name: &'static str| lookup(name).ok_or(name);
    let mariadb_database = var("MARIADB_DATABASE")?;
    let mariadb_user = var("MARIADB_USER")?;
    let mariadb_password = var("MARIADB_PASSWORD")?;
    let mariadb_host = var("MARIADB_HOST")?;
    let mariadb_port = var("MARIADB_PORT")?;
    Ok(format!(
        "mysql://{}:{}@{}:{}/{}",
        mariadb_user, mariadb_password, mariadb_host, mariadb_port, mariadb_database
    ))
}

pub fn database_url_from_env() -> Result<String, &'static str> {
    database_url(|name| std::env::var(name).ok())
}

pub async fn connect(db_url: &str, max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url);
    opt.max_connections(max_connections)
        .sqlx_logging_level(log::LevelFilter::Debug);
    Database::connect(opt).await
}

/// Process-wide pool. The first caller's url wins.
pub async fn create_db_pool(db_url: &str) -> DatabaseConnection {
    DB_POOL
        .get_or_init(|| async move {
            connect(db_url, 5)
                .await
                .expect("Failed to connect to database")
        })
        .await
        .clone()
}

/// A catalog name read back from a text column. Unknown names mean the row
/// was written by something else.
pub(crate) fn stored_name<T>(
    parsed: Option<T>,
    column: &str,
    raw: &str,
) -> Result<T, sandbox_app::domain::RepoError> {
    parsed.ok_or_else(|| {
        sandbox_app::domain::RepoError::StorageError(format!("Unknown {} {}", column, raw))
    })
}

/// Upstream hashes are unsigned 32-bit and stored widened.
pub(crate) fn stored_hash(raw: i64) -> Result<u32, sandbox_app::domain::RepoError> {
    u32::try_from(raw).map_err(|_| {
        sandbox_app::domain::RepoError::StorageError(format!("Hash {} out of range", raw))
    })
}
