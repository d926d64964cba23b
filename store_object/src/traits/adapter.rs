//! Execution seams
//!
//! The compiler only produces SQL text and parameters. Connections, pooling,
//! timeouts and row materialization live behind these two traits.

use crate::errors::StoreError;
use crate::query_builder::{Dialect, QueryParameters};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Hands out connections and describes the target database
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    type Connection: Send;

    async fn connection(&self) -> Result<Self::Connection, StoreError>;

    fn dialect(&self) -> Dialect;

    /// Advisory cap for callers; statements are not limited by it
    fn max_row_count(&self) -> u32;
}

/// Runs rendered statements on a connection
#[async_trait]
pub trait QueryAdapter: Send + Sync {
    type Connection: Send;

    /// Run a row-returning statement and materialize each row as `R`.
    async fn query<R>(
        &self,
        connection: &mut Self::Connection,
        sql: &str,
        parameters: &QueryParameters,
    ) -> Result<Vec<R>, StoreError>
    where
        R: DeserializeOwned + Send + 'static;

    /// Run a statement and return the number of affected rows.
    async fn execute(
        &self,
        connection: &mut Self::Connection,
        sql: &str,
        parameters: &QueryParameters,
    ) -> Result<u64, StoreError>;
}
