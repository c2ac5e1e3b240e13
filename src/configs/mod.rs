use deadpool_redis::{Runtime, redis::AsyncCommands};
use serde::{Serialize, de::DeserializeOwned};
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::api::error;

pub async fn connect_database(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, error::SystemError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_slow_threshold(std::time::Duration::from_secs(3))
        .connect(database_url)
        .await?;
    log::info!("Connected to Postgres (max {} connections)", max_connections);
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), error::SystemError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    log::info!("Database migrations applied");
    Ok(())
}

/// JSON values in Redis: cached profiles and refresh-token ids.
pub struct RedisCache {
    pool: deadpool_redis::Pool,
}

impl RedisCache {
    pub fn connect(redis_url: &str) -> Result<Self, error::SystemError> {
        let mut cfg = deadpool_redis::Config::from_url(redis_url);
        cfg.pool = Some(deadpool_redis::PoolConfig { max_size: 16, ..Default::default() });
        let pool = cfg.create_pool(Some(Runtime::Tokio1))?;
        Ok(Self { pool })
    }

    fn decode<T: DeserializeOwned>(raw: Option<Vec<u8>>) -> Result<Option<T>, error::SystemError> {
        Ok(raw.map(|bytes| serde_json::from_slice(&bytes)).transpose()?)
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, error::SystemError> {
        let mut conn = self.pool.get().await?;
        let raw: Option<Vec<u8>> = conn.get(key).await?;
        Self::decode(raw)
    }

    /// Reads and deletes in one command, so a value can be consumed only once.
    pub async fn take<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, error::SystemError> {
        let mut conn = self.pool.get().await?;
        let raw: Option<Vec<u8>> = conn.get_del(key).await?;
        Self::decode(raw)
    }

    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
    ) -> Result<(), error::SystemError> {
        let mut conn = self.pool.get().await?;
        conn.set_ex::<_, _, ()>(key, serde_json::to_vec(value)?, ttl_seconds).await?;
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<(), error::SystemError> {
        let mut conn = self.pool.get().await?;
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}
