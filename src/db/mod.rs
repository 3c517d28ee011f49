//! The data accessor: every read/write against the relational store, with
//! ownership enforced at the query level and every mutation wrapped in an
//! explicit transaction.

pub mod rows;

mod action_handler_configurations;
mod actions;
mod response_chunks;
mod thread_actions;
mod threads;
mod users;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

#[derive(Clone)]
pub struct DataAccessor {
    pool: PgPool,
}

impl DataAccessor {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new().max_connections(10).connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
