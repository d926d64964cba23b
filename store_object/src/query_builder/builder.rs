//! Statement assembly
//!
//! [`StatementBuilder`] turns CRUD intents on a [`TableMetadata`] entity into
//! rendered SQL and the parameters it references.

use crate::errors::StoreError;
use crate::id_type::HasUniversalId;
use crate::query_builder::dialect::{Dialect, QueryPart};
use crate::query_builder::filter::{FilterGroup, FilterItem};
use crate::query_builder::parameters::QueryParameters;
use crate::query_builder::projection::resolve_projection;
use crate::query_builder::sql_generation::FilterCompiler;
use crate::query_builder::statement::{SqlStatement, Statement};
use crate::traits::{Projection, TableMetadata};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementBuilder {
    dialect: Dialect,
}

impl StatementBuilder {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn insert<T: TableMetadata>(&self, entity: &T) -> Result<SqlStatement, StoreError> {
        let mut row = to_row(entity)?;
        let mut parameters = QueryParameters::new();
        let columns = T::insert_fields();
        let mut names = Vec::with_capacity(columns.len());

        for column in &columns {
            let value = row.remove(*column).unwrap_or(Value::Null);
            names.push(
                parameters
                    .set_typed(column, value, T::column_type(column))
                    .to_string(),
            );
        }

        let statement = Statement::Insert {
            table: T::table_name().to_string(),
            columns: columns.iter().map(|column| column.to_string()).collect(),
            parameters: names,
        };
        self.finish(&statement, parameters)
    }

    /// Fails with `MissingIdentity` when the entity's identity is the default.
    pub fn update<T: TableMetadata>(&self, entity: &T) -> Result<SqlStatement, StoreError> {
        let id = entity.extract_id();
        if id.is_default_id() {
            return Err(StoreError::MissingIdentity {
                entity: T::entity_name().to_string(),
                operation: "update".to_string(),
            });
        }

        let mut row = to_row(entity)?;
        let mut parameters = QueryParameters::new();
        let mut assignments = Vec::new();

        for column in T::update_fields() {
            let value = row.remove(column).unwrap_or(Value::Null);
            let name = parameters
                .set_typed(column, value, T::column_type(column))
                .to_string();
            assignments.push((column.to_string(), name));
        }

        let identity = T::primary_key_field();
        let parameter = parameters
            .set_typed(
                identity,
                id.universal_id().to_value(),
                T::column_type(identity),
            )
            .to_string();

        let statement = Statement::Update {
            table: T::table_name().to_string(),
            assignments,
            identity: identity.to_string(),
            parameter,
        };
        self.finish(&statement, parameters)
    }

    /// Delete the rows whose identities are in `ids`.
    ///
    /// Default identities are dropped first; `None` means nothing is left to
    /// delete and no statement should run. PostgreSQL binds the identities as
    /// one array parameter, SQL Server as one parameter per identity.
    pub fn delete<T: TableMetadata>(
        &self,
        ids: &[T::Id],
    ) -> Result<Option<SqlStatement>, StoreError> {
        let values: Vec<Value> = ids
            .iter()
            .filter(|id| !id.is_default_id())
            .map(|id| id.universal_id().to_value())
            .collect();

        if values.is_empty() {
            return Ok(None);
        }

        let identity = T::primary_key_field();
        let identity_type = T::column_type(identity);
        let mut parameters = QueryParameters::new();

        let names = match self.dialect {
            Dialect::PostgreSql => vec![parameters
                .set_typed(identity, Value::Array(values), identity_type)
                .to_string()],
            Dialect::SqlServer => values
                .into_iter()
                .enumerate()
                .map(|(position, value)| {
                    let key = format!("{}_{}", identity, position + 1);
                    parameters.set_typed(&key, value, identity_type).to_string()
                })
                .collect(),
        };

        let statement = Statement::Delete {
            table: T::table_name().to_string(),
            identity: identity.to_string(),
            parameters: names,
        };
        self.finish(&statement, parameters).map(Some)
    }

    pub fn select_all<T: TableMetadata>(&self) -> Result<SqlStatement, StoreError> {
        self.select_where::<T>(&FilterGroup::default())
    }

    pub fn select_by_id<T: TableMetadata>(&self, id: &T::Id) -> Result<SqlStatement, StoreError> {
        let identity = T::primary_key_field();
        let filter = FilterGroup::and().item(FilterItem::equal(
            identity,
            identity,
            id.universal_id().to_value(),
        ));
        self.select_where::<T>(&filter)
    }

    /// `SELECT *` narrowed by `filter`; an empty filter selects every row.
    pub fn select_where<T: TableMetadata>(
        &self,
        filter: &FilterGroup,
    ) -> Result<SqlStatement, StoreError> {
        let (sql, parameters) = FilterCompiler::new(self.dialect)
            .with_column_types(T::table_name(), T::column_types())
            .compile(filter)?;

        let statement = Statement::Select {
            table: T::table_name().to_string(),
            columns: Vec::new(),
            joins: Vec::new(),
            filter: Some(sql),
        };
        self.finish(&statement, parameters)
    }

    /// Select the projection shape `P` from `T`'s table.
    ///
    /// Falls back to [`select_where`](Self::select_where) when `P` registers
    /// no join-path fields.
    pub fn select_projection<T: TableMetadata, P: Projection>(
        &self,
        filter: &FilterGroup,
    ) -> Result<SqlStatement, StoreError> {
        let table = T::table_name();
        let data = resolve_projection(P::join_path_fields(), table)?;
        if data.is_empty() {
            return self.select_where::<T>(filter);
        }

        let (sql, parameters) = FilterCompiler::new(self.dialect)
            .with_default_alias(table)
            .with_column_types(table, T::column_types())
            .compile(filter)?;

        let statement = Statement::Select {
            table: table.to_string(),
            columns: data.columns,
            joins: data.joins,
            filter: Some(sql),
        };
        self.finish(&statement, parameters)
    }

    fn finish(
        &self,
        statement: &Statement,
        parameters: QueryParameters,
    ) -> Result<SqlStatement, StoreError> {
        let sql = self.dialect.render(QueryPart::Statement(statement))?;
        Ok(SqlStatement::new(sql, parameters))
    }
}

fn to_row<T: TableMetadata>(entity: &T) -> Result<Map<String, Value>, StoreError> {
    match serde_json::to_value(entity)? {
        Value::Object(row) => Ok(row),
        other => Err(StoreError::invalid_configuration(format!(
            "{} must serialize to an object, got {}",
            T::entity_name(),
            other
        ))),
    }
}
