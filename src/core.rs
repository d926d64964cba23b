//! Core Remark Store functionality
//!
//! [`RemarkStore`] owns the connection pool and hands out typed stores that
//! share it.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use store_object::generic_store::{GenericStore, PgAdapter, PgConnectionFactory, PgStore};
use store_object::query_builder::{Dialect, StatementBuilder};
use store_object::traits::TableMetadata;

use crate::errors::RemarkStoreError;
use config::DatabaseConfig;

/// Coordinator that manages the database connection and builds stores
pub struct RemarkStore {
    pool: PgPool,
    dialect: Dialect,
    factory: Arc<PgConnectionFactory>,
    adapter: Arc<PgAdapter>,
}

impl std::fmt::Debug for RemarkStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemarkStore")
            .field("dialect", &self.dialect)
            .field("max_row_count", &self.max_row_count())
            .finish()
    }
}

impl RemarkStore {
    /// Connect using `config`
    pub async fn new(config: DatabaseConfig) -> Result<Self, RemarkStoreError> {
        let dialect = Self::prepare(&config)?;
        let pool = Self::pool_options(&config)
            .connect(&config.connection_string())
            .await?;

        Ok(Self::from_pool(pool, dialect, config.max_row_count))
    }

    /// Build the pool without opening a connection until first use
    pub fn connect_lazy(config: DatabaseConfig) -> Result<Self, RemarkStoreError> {
        let dialect = Self::prepare(&config)?;
        let pool = Self::pool_options(&config).connect_lazy(&config.connection_string())?;

        Ok(Self::from_pool(pool, dialect, config.max_row_count))
    }

    fn prepare(config: &DatabaseConfig) -> Result<Dialect, RemarkStoreError> {
        config.validate()?;
        let dialect: Dialect = config.dialect.parse()?;

        crate::debug_log!(
            "[REMARK_STORE] {}:{}/{} dialect={} max_row_count={}",
            config.host,
            config.port,
            config.database,
            dialect,
            config.max_row_count
        );

        // Only the PostgreSQL adapter ships with the crate
        if dialect != Dialect::PostgreSql {
            return Err(RemarkStoreError::AdapterUnavailable(dialect));
        }
        Ok(dialect)
    }

    fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
        let mut pool_options = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds));

        if config.max_lifetime_seconds > 0 {
            pool_options =
                pool_options.max_lifetime(Duration::from_secs(config.max_lifetime_seconds));
        }

        pool_options
    }

    fn from_pool(pool: PgPool, dialect: Dialect, max_row_count: u32) -> Self {
        Self {
            factory: Arc::new(PgConnectionFactory::new(pool.clone(), max_row_count)),
            adapter: Arc::new(PgAdapter::new()),
            pool,
            dialect,
        }
    }

    /// Get database pool reference
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn max_row_count(&self) -> u32 {
        store_object::traits::ConnectionFactory::max_row_count(self.factory.as_ref())
    }

    /// Statement builder for the configured dialect
    pub fn statements(&self) -> StatementBuilder {
        StatementBuilder::new(self.dialect)
    }

    /// Data provider for `T` sharing this store's pool
    pub fn store<T: TableMetadata>(&self) -> PgStore<T> {
        crate::trace_log!("[REMARK_STORE] store for {}", T::table_name());
        GenericStore::new(Arc::clone(&self.factory), Arc::clone(&self.adapter))
    }

    /// Check database connection health
    pub async fn health_check(&self) -> Result<(), RemarkStoreError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
