//! Declared column types
//!
//! Parameter values travel as JSON. A bound value only becomes a timestamp,
//! UUID or number on the wire when its column declares that type; values
//! without a declared type bind by their JSON shape, so strings stay text.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnType {
    SmallInt,
    Integer,
    BigInt,
    Float,
    Boolean,
    Text,
    Uuid,
    /// Timestamp with time zone
    Timestamp,
    Date,
    Json,
}

/// Look up `column` in a `(column, type)` registration list.
pub fn lookup_column_type(
    column_types: &[(&'static str, ColumnType)],
    column: &str,
) -> Option<ColumnType> {
    column_types
        .iter()
        .find(|(name, _)| *name == column)
        .map(|(_, column_type)| *column_type)
}
