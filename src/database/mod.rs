pub(crate) mod content;
mod filter;
mod misc;
mod notifications;
pub(crate) mod profiles;
pub(crate) mod requests;

pub use filter::FilterBuilder;
pub use notifications::insert_notification;

use std::borrow::Cow;
use std::time::Duration;

use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    Connection, Executor, PgConnection, PgPool, Postgres,
};

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = match Self::pool_options().connect(database_url).await {
            Ok(pool) => pool,
            Err(sqlx::Error::Database(db_err)) if db_err.code() == Some(Cow::Borrowed("3D000")) => {
                log::info!("Database missing, attempting to create it");
                create_database_if_missing(database_url).await?;
                Self::pool_options().connect(database_url).await?
            }
            Err(err) => return Err(err),
        };

        // Run embedded migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    fn pool_options() -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(10)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Some(Duration::from_secs(600)))
            .test_before_acquire(true)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn begin(&self) -> Result<sqlx::Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }
}

async fn create_database_if_missing(database_url: &str) -> Result<(), sqlx::Error> {
    let options: PgConnectOptions = database_url.parse()?;
    let db_name = options
        .get_database()
        .map(str::to_string)
        .unwrap_or_else(|| "postgres".to_string());

    let admin_options = options.database("postgres");
    let mut conn = PgConnection::connect_with(&admin_options).await?;
    let quoted = db_name.replace('"', "\"\"");
    conn.execute(format!("CREATE DATABASE \"{quoted}\"").as_str())
        .await?;
    conn.close().await?;
    Ok(())
}
