//! Filter compilation
//!
//! Turns a [`FilterGroup`] tree into a boolean SQL expression. The parameter
//! accumulator is threaded through the recursion by value and handed back
//! with the SQL, so callers can keep binding into the same slots afterwards.

use crate::errors::StoreError;
use crate::query_builder::column_type::{lookup_column_type, ColumnType};
use crate::query_builder::dialect::{Dialect, QueryPart};
use crate::query_builder::filter::{FilterGroup, FilterItem};
use crate::query_builder::parameters::QueryParameters;

/// Compiles filter trees for one dialect
#[derive(Debug, Clone)]
pub struct FilterCompiler {
    dialect: Dialect,
    /// Qualifier for items whose group has no `table_alias`
    default_alias: Option<String>,
    /// Table whose registered column types apply to its items
    typed_table: Option<String>,
    column_types: &'static [(&'static str, ColumnType)],
}

impl FilterCompiler {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            default_alias: None,
            typed_table: None,
            column_types: &[],
        }
    }

    pub fn with_default_alias(mut self, alias: impl Into<String>) -> Self {
        self.default_alias = Some(alias.into());
        self
    }

    /// Type items that are unqualified or qualified by `table` from
    /// `column_types`. An item's own `column_type` still wins.
    pub fn with_column_types(
        mut self,
        table: impl Into<String>,
        column_types: &'static [(&'static str, ColumnType)],
    ) -> Self {
        self.typed_table = Some(table.into());
        self.column_types = column_types;
        self
    }

    /// Compile `group` with a fresh parameter set.
    pub fn compile(&self, group: &FilterGroup) -> Result<(String, QueryParameters), StoreError> {
        self.compile_into(group, QueryParameters::new())
    }

    /// Compile `group`, binding into `parameters`.
    ///
    /// An empty group yields an empty string and leaves `parameters` unchanged.
    pub fn compile_into(
        &self,
        group: &FilterGroup,
        parameters: QueryParameters,
    ) -> Result<(String, QueryParameters), StoreError> {
        let (parts, parameters) = self.compile_parts(group, parameters)?;
        Ok((parts.join(joiner(group).as_str()), parameters))
    }

    /// Sub-expressions of `group` in declared order: items first, then nested
    /// groups that produced any SQL.
    fn compile_parts(
        &self,
        group: &FilterGroup,
        mut parameters: QueryParameters,
    ) -> Result<(Vec<String>, QueryParameters), StoreError> {
        let mut parts = Vec::with_capacity(group.items().len() + group.groups().len());
        let qualifier = group
            .table_alias
            .as_deref()
            .filter(|alias| !alias.trim().is_empty())
            .or(self.default_alias.as_deref());

        for item in group.items() {
            parts.push(self.compile_item(item, qualifier, &mut parameters)?);
        }

        for nested in group.groups() {
            let (nested_parts, returned) = self.compile_parts(nested, parameters)?;
            parameters = returned;

            match nested_parts.len() {
                0 => {}
                1 => parts.extend(nested_parts),
                _ => parts.push(format!("({})", nested_parts.join(joiner(nested).as_str()))),
            }
        }

        Ok((parts, parameters))
    }

    fn compile_item(
        &self,
        item: &FilterItem,
        qualifier: Option<&str>,
        parameters: &mut QueryParameters,
    ) -> Result<String, StoreError> {
        if item.name.trim().is_empty() {
            return Err(StoreError::invalid_configuration(format!(
                "filter item on '{}' has no binding name",
                item.field_name
            )));
        }

        let symbol = item.comparison_kind.to_sql()?;
        let field = self.dialect.render(QueryPart::Field {
            table: qualifier,
            column: &item.field_name,
        })?;
        let column_type = item
            .column_type
            .or_else(|| self.registered_type(qualifier, &item.field_name));
        let parameter_name = parameters.set_typed(&item.name, item.value.clone(), column_type);
        let placeholder = self.dialect.placeholder(parameter_name)?;

        Ok(format!("{} {} {}", field, symbol, placeholder))
    }

    fn registered_type(&self, qualifier: Option<&str>, column: &str) -> Option<ColumnType> {
        match qualifier {
            Some(alias) if Some(alias) != self.typed_table.as_deref() => None,
            _ => lookup_column_type(self.column_types, column),
        }
    }
}

fn joiner(group: &FilterGroup) -> String {
    format!(" {} ", group.logical_join.to_sql())
}
