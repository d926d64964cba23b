//! Data provider contract

use crate::errors::StoreError;
use crate::query_builder::FilterGroup;
use crate::traits::{Projection, TableMetadata};
use async_trait::async_trait;

/// CRUD and query operations for one entity type
#[async_trait]
pub trait DataProvider: Send + Sync {
    type Model: TableMetadata;

    /// Insert and return the stored row, with any generated identity filled in
    async fn add(&self, model: Self::Model) -> Result<Self::Model, StoreError>;

    async fn get(&self) -> Result<Vec<Self::Model>, StoreError>;

    /// Fails with `EntityNotFound` when no row has this identity
    async fn get_by_id(
        &self,
        id: &<Self::Model as TableMetadata>::Id,
    ) -> Result<Self::Model, StoreError>;

    /// Fails with `MissingIdentity` when the model's identity is the default
    async fn update(&self, model: Self::Model) -> Result<Self::Model, StoreError>;

    /// Delete by identity and return the affected row count.
    ///
    /// Default identities are ignored; if none remain nothing is executed.
    async fn delete(
        &self,
        ids: &[<Self::Model as TableMetadata>::Id],
    ) -> Result<u64, StoreError>;

    async fn find(&self, filter: &FilterGroup) -> Result<Vec<Self::Model>, StoreError>;

    /// Select a projection shape, joining related tables as it registers
    async fn select<P: Projection>(&self, filter: &FilterGroup) -> Result<Vec<P>, StoreError>;

    fn max_row_count(&self) -> u32;
}
