//! Complex-column resolution for projection shapes
//!
//! A projection registers one join path per field that lives on a related
//! table. Resolving the shape parses every path, keeps each distinct join
//! once and yields one column reference per registered field.
//!
//! Aliases are unique within the resolved set. Distinct hops whose alias
//! rule yields the same name (same right table and left column, different
//! right column) get a numeric suffix, and later hops on that path build on
//! the suffixed alias.

use crate::errors::StoreError;
use crate::query_builder::join::{hop_alias, parse_join_path, JoinDescriptor};
use std::collections::{HashMap, HashSet};

/// Static registration of a projection field reached through a join path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinPathField {
    /// Projection field name, used as the column alias
    pub field: &'static str,
    pub path: &'static str,
}

impl JoinPathField {
    pub const fn new(field: &'static str, path: &'static str) -> Self {
        Self { field, path }
    }
}

/// Column selected from a (possibly joined) table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnReference {
    pub table_alias: String,
    /// Source column
    pub name: String,
    /// Projected name; not rendered when equal to `name`
    pub alias: String,
}

impl ColumnReference {
    pub fn new(
        table_alias: impl Into<String>,
        name: impl Into<String>,
        alias: impl Into<String>,
    ) -> Self {
        Self {
            table_alias: table_alias.into(),
            name: name.into(),
            alias: alias.into(),
        }
    }
}

/// Joins and columns needed to select one projection shape
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectionQueryData {
    pub joins: Vec<JoinDescriptor>,
    pub columns: Vec<ColumnReference>,
}

impl ProjectionQueryData {
    /// Nothing to select through join paths; callers fall back to `SELECT *`
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Resolve registered join-path fields against `source_table`.
pub fn resolve_projection(
    fields: &[JoinPathField],
    source_table: &str,
) -> Result<ProjectionQueryData, StoreError> {
    let mut data = ProjectionQueryData::default();
    // path identity -> alias assigned in this projection
    let mut aliases: HashMap<String, String> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::from([source_table.to_string()]);

    for field in fields {
        let parsed = parse_join_path(field.path, source_table)?;
        let mut previous: Option<String> = None;

        for mut join in parsed.joins {
            if let Some(alias) = aliases.get(&join.path) {
                previous = Some(alias.clone());
                continue;
            }

            if let Some(left_alias) = previous.take() {
                join.alias = hop_alias(
                    Some(&left_alias),
                    &join.right_table,
                    &join.left_relation_column,
                );
                join.left_alias = left_alias;
            }
            join.alias = unique_alias(&join.alias, &taken);

            taken.insert(join.alias.clone());
            aliases.insert(join.path.clone(), join.alias.clone());
            previous = Some(join.alias.clone());
            data.joins.push(join);
        }

        data.columns.push(ColumnReference::new(
            previous.as_deref().unwrap_or(source_table),
            parsed.column.as_str(),
            field.field,
        ));
    }

    Ok(data)
}

fn unique_alias(alias: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(alias) {
        return alias.to_string();
    }
    (2..)
        .map(|suffix| format!("{}_{}", alias, suffix))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| alias.to_string())
}
