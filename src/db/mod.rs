pub mod days;
pub mod disciplines;
pub mod tasks;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    // every connection to an in-memory database sees its own schema
    if database_url.contains(":memory:") {
        return SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await;
    }

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

pub async fn migrate(db: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(db).await
}

#[cfg(test)]
pub(crate) async fn setup_test_db() -> SqlitePool {
    let pool = connect("sqlite::memory:")
        .await
        .expect("Failed to create test db");

    migrate(&pool).await.expect("Failed to run migrations");

    pool
}
