//! Query compilation
//!
//! Filter trees, join paths and CRUD intents become parameterized SQL for a
//! chosen [`Dialect`]. Nothing here touches a connection.

pub mod builder;
pub mod column_type;
pub mod dialect;
pub mod filter;
pub mod join;
pub mod operators;
pub mod parameters;
pub mod projection;
pub mod sql_generation;
pub mod statement;


pub use builder::StatementBuilder;
pub use column_type::{lookup_column_type, ColumnType};
pub use dialect::{render, Dialect, QueryPart};
pub use filter::{FilterGroup, FilterItem};
pub use join::{parse_join_path, JoinDescriptor, JoinPath, DEFAULT_JOIN_KIND};
pub use operators::{ComparisonKind, JoinKind, LogicalJoin};
pub use parameters::{QueryParameter, QueryParameters};
pub use projection::{resolve_projection, ColumnReference, JoinPathField, ProjectionQueryData};
pub use sql_generation::FilterCompiler;
pub use statement::{SqlStatement, Statement};
