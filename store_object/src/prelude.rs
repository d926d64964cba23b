//! Convenience re-exports for common store-object usage

pub use crate::traits::{ConnectionFactory, DataProvider, Projection, QueryAdapter, TableMetadata};

pub use crate::errors::StoreError;

pub use crate::generic_store::{GenericStore, PgAdapter, PgConnectionFactory, PgStore};

pub use crate::id_type::{HasUniversalId, UniversalId};

pub use crate::query_builder::{
    ColumnType, ComparisonKind, Dialect, FilterGroup, FilterItem, JoinPathField, LogicalJoin,
    StatementBuilder,
};

pub use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
pub use sqlx::PgPool;
pub use uuid::Uuid;
