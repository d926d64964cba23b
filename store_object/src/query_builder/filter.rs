//! Filter expression trees
//!
//! A [`FilterGroup`] holds comparison items and nested groups joined by one
//! logical operator. Groups are plain data: they deserialize from request
//! payloads and compile to SQL through
//! [`FilterCompiler`](crate::query_builder::sql_generation::FilterCompiler).

use crate::query_builder::column_type::ColumnType;
use crate::query_builder::operators::{ComparisonKind, LogicalJoin};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Single comparison against one column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterItem {
    /// Binding key for the value; keep unique within the tree
    pub name: String,
    /// Unqualified column name
    pub field_name: String,
    pub value: Value,
    pub comparison_kind: ComparisonKind,
    /// Overrides the column type registered for `field_name`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_type: Option<ColumnType>,
}

impl FilterItem {
    pub fn new(
        name: &str,
        field_name: &str,
        comparison_kind: ComparisonKind,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            name: name.to_string(),
            field_name: field_name.to_string(),
            value: value.into(),
            comparison_kind,
            column_type: None,
        }
    }

    /// Bind the value as `column_type`, e.g. for a column on a joined table
    pub fn typed(mut self, column_type: ColumnType) -> Self {
        self.column_type = Some(column_type);
        self
    }

    pub fn equal(name: &str, field_name: &str, value: impl Into<Value>) -> Self {
        Self::new(name, field_name, ComparisonKind::Equal, value)
    }

    pub fn not_equal(name: &str, field_name: &str, value: impl Into<Value>) -> Self {
        Self::new(name, field_name, ComparisonKind::NotEqual, value)
    }

    pub fn greater(name: &str, field_name: &str, value: impl Into<Value>) -> Self {
        Self::new(name, field_name, ComparisonKind::Greater, value)
    }

    pub fn greater_or_equal(name: &str, field_name: &str, value: impl Into<Value>) -> Self {
        Self::new(name, field_name, ComparisonKind::GreaterOrEqual, value)
    }

    pub fn less(name: &str, field_name: &str, value: impl Into<Value>) -> Self {
        Self::new(name, field_name, ComparisonKind::Less, value)
    }

    pub fn less_or_equal(name: &str, field_name: &str, value: impl Into<Value>) -> Self {
        Self::new(name, field_name, ComparisonKind::LessOrEqual, value)
    }
}

/// Items and nested groups combined by a single logical operator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterGroup {
    pub name: String,
    pub logical_join: LogicalJoin,
    /// Qualifies the items directly in this group, not those of nested groups
    pub table_alias: Option<String>,
    pub items: Option<Vec<FilterItem>>,
    pub groups: Option<Vec<FilterGroup>>,
}

impl FilterGroup {
    pub fn new(logical_join: LogicalJoin) -> Self {
        Self {
            logical_join,
            ..Self::default()
        }
    }

    /// Group whose members are joined with AND
    pub fn and() -> Self {
        Self::new(LogicalJoin::And)
    }

    /// Group whose members are joined with OR
    pub fn or() -> Self {
        Self::new(LogicalJoin::Or)
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_alias(mut self, table_alias: &str) -> Self {
        self.table_alias = Some(table_alias.to_string());
        self
    }

    pub fn item(mut self, item: FilterItem) -> Self {
        self.items.get_or_insert_with(Vec::new).push(item);
        self
    }

    pub fn group(mut self, group: FilterGroup) -> Self {
        self.groups.get_or_insert_with(Vec::new).push(group);
        self
    }

    pub fn items(&self) -> &[FilterItem] {
        self.items.as_deref().unwrap_or_default()
    }

    pub fn groups(&self) -> &[FilterGroup] {
        self.groups.as_deref().unwrap_or_default()
    }

    /// No items and no nested groups, whether the lists are absent or empty.
    ///
    /// A group holding only empty nested groups is not empty by this
    /// definition, but still compiles to an empty fragment.
    pub fn is_empty(&self) -> bool {
        self.items().is_empty() && self.groups().is_empty()
    }

    /// Distinct non-empty column names referenced anywhere in the tree,
    /// in first-seen order.
    pub fn filter_columns(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        self.collect_columns(&mut seen, &mut columns);
        columns
    }

    fn collect_columns(&self, seen: &mut HashSet<String>, columns: &mut Vec<String>) {
        for item in self.items() {
            if !item.field_name.is_empty() && seen.insert(item.field_name.clone()) {
                columns.push(item.field_name.clone());
            }
        }
        for group in self.groups() {
            group.collect_columns(seen, columns);
        }
    }
}
