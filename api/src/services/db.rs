//! Database pool setup
//!
//! Domain query functions use sqlx's generic Executor, so they accept both
//! `&PgPool` and `&mut PgConnection` (transactions):
//!
//! ```ignore
//! pub async fn my_query<'e, E>(executor: E, id: i64) -> Result<MyType, sqlx::Error>
//! where
//!     E: Executor<'e, Database = Postgres>,
//! ```

use std::str::FromStr;

use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::info;

use crate::config::Config;

/// Connect to PostgreSQL and apply pending migrations.
///
/// `store_timeout` bounds both pool acquisition and each statement.
pub async fn connect(config: &Config) -> Result<PgPool, sqlx::Error> {
    let statement_timeout = config.store_timeout.as_millis().to_string();
    let options = PgConnectOptions::from_str(&config.database_url)?
        .options([("statement_timeout", statement_timeout.as_str())]);

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.store_timeout)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database connected, migrations applied");

    Ok(pool)
}
