//! Static table and projection metadata
//!
//! Both traits are meant to be derived. The generated implementations return
//! `'static` data, so no reflection happens while building statements.

use crate::id_type::HasUniversalId;
use crate::query_builder::column_type::{lookup_column_type, ColumnType};
use crate::query_builder::projection::JoinPathField;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Table layout of an entity
///
/// Column names are the serialized field names, so a serialized entity is a
/// column-to-value map and a JSON row deserializes straight into the entity.
///
/// ```ignore
/// use remark_store::prelude::*;
///
/// #[model]
/// #[table(name = "comments", entity = "Comment", auto_increment)]
/// pub struct Comment {
///     #[primary_key]
///     pub id: i64,
///     pub message: String,
/// }
/// ```
pub trait TableMetadata:
    Clone + Send + Sync + Debug + Serialize + DeserializeOwned + 'static
{
    type Id: Clone + Send + Sync + Debug + HasUniversalId;

    fn table_name() -> &'static str;

    /// Name used in errors and logs
    fn entity_name() -> &'static str;

    fn primary_key_field() -> &'static str;

    /// Every column in declaration order, identity included
    fn fields() -> &'static [&'static str];

    /// Declared types of the columns whose Rust type maps to one; columns
    /// missing here bind by JSON shape
    fn column_types() -> &'static [(&'static str, ColumnType)] {
        &[]
    }

    fn column_type(column: &str) -> Option<ColumnType> {
        lookup_column_type(Self::column_types(), column)
    }

    /// Whether the store assigns the identity on insert
    fn identity_generated() -> bool;

    fn extract_id(&self) -> Self::Id;

    /// Columns written by an insert
    fn insert_fields() -> Vec<&'static str> {
        Self::fields()
            .iter()
            .copied()
            .filter(|field| !(Self::identity_generated() && *field == Self::primary_key_field()))
            .collect()
    }

    /// Columns written by an update; never the identity
    fn update_fields() -> Vec<&'static str> {
        Self::fields()
            .iter()
            .copied()
            .filter(|field| *field != Self::primary_key_field())
            .collect()
    }
}

/// Read-only result shape that may pull columns from related tables
///
/// Fields annotated with `#[join_path("[Table:RightColumn:LeftColumn].Column")]`
/// are registered here; the remaining fields come from the source table.
pub trait Projection: DeserializeOwned + Send + Sync + 'static {
    fn join_path_fields() -> &'static [JoinPathField];
}
