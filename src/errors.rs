//! Error types for the Remark Store crate

use config::ConfigError;
use store_object::query_builder::Dialect;
use store_object::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemarkStoreError {
    #[error("Database connection error: {0}")]
    DatabaseConnection(#[from] sqlx::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No bundled execution adapter for the {0} dialect")]
    AdapterUnavailable(Dialect),
}
