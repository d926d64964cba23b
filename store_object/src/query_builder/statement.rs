//! Logical statements
//!
//! A [`Statement`] names tables, columns and parameter slots without any
//! dialect syntax. [`Dialect::render`](crate::query_builder::dialect::Dialect::render)
//! turns it into text.

use crate::query_builder::join::JoinDescriptor;
use crate::query_builder::parameters::QueryParameters;
use crate::query_builder::projection::ColumnReference;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Returns the inserted row
    Insert {
        table: String,
        columns: Vec<String>,
        /// Parameter name per column, same order
        parameters: Vec<String>,
    },
    /// Returns the updated row
    Update {
        table: String,
        /// `(column, parameter name)` pairs for the SET clause
        assignments: Vec<(String, String)>,
        identity: String,
        parameter: String,
    },
    /// Deletes every row whose identity is among `parameters`: a single
    /// array parameter for PostgreSQL, one per identity for SQL Server
    Delete {
        table: String,
        identity: String,
        parameters: Vec<String>,
    },
    Select {
        table: String,
        /// Extra columns; empty selects `*`, otherwise `<table>.*` plus these
        columns: Vec<ColumnReference>,
        joins: Vec<JoinDescriptor>,
        /// Compiled boolean expression; `None` or empty omits WHERE
        filter: Option<String>,
    },
}

/// Rendered SQL text with the parameters it references
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub parameters: QueryParameters,
}

impl SqlStatement {
    pub fn new(sql: String, parameters: QueryParameters) -> Self {
        Self { sql, parameters }
    }
}
