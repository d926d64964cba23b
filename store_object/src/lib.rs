//! Store Object - query compilation and data access core for Remark Store
//!
//! Filter trees, join paths and CRUD intents compile to parameterized SQL for
//! SQL Server or PostgreSQL. A generic store runs the statements through a
//! pluggable execution adapter; a sqlx PostgreSQL adapter is included.

pub mod errors;
pub mod generic_store;
pub mod id_type;
pub mod prelude;
pub mod query_builder;
pub mod traits;
pub mod validation;

pub use errors::StoreError;
pub use generic_store::{GenericStore, PgAdapter, PgConnectionFactory, PgStore};
pub use id_type::{HasUniversalId, UniversalId};
pub use query_builder::{
    ColumnType, ComparisonKind, Dialect, FilterCompiler, FilterGroup, FilterItem, JoinKind, JoinPathField,
    LogicalJoin, QueryParameters, SqlStatement, StatementBuilder,
};
pub use traits::*;
pub use validation::{ValidatedIdentifier, ValidationError};
