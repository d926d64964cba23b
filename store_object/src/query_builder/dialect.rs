//! Dialect rendering
//!
//! Every logical query part renders through [`render`], which switches on the
//! dialect and the part together. The two dialects differ in identifier
//! quoting, the table hint on joined tables, list membership and how
//! modified rows are returned.

use crate::errors::StoreError;
use crate::query_builder::join::JoinDescriptor;
use crate::query_builder::projection::ColumnReference;
use crate::query_builder::statement::Statement;
use crate::validation::ValidatedIdentifier;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported SQL rendering targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    /// `[bracket]` identifiers, `WITH (NOLOCK)` on joins
    SqlServer,
    /// `"double quoted"` identifiers
    PostgreSql,
}

impl FromStr for Dialect {
    type Err = StoreError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "sqlserver" | "mssql" => Ok(Dialect::SqlServer),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::PostgreSql),
            _ => Err(StoreError::UnsupportedDialect(tag.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::SqlServer => write!(f, "sqlserver"),
            Dialect::PostgreSql => write!(f, "postgres"),
        }
    }
}

/// A logical piece of SQL awaiting a dialect
#[derive(Debug, Clone, Copy)]
pub enum QueryPart<'a> {
    Identifier(&'a str),
    /// Column, optionally qualified by a table or alias
    Field {
        table: Option<&'a str>,
        column: &'a str,
    },
    Placeholder(&'a str),
    Column(&'a ColumnReference),
    Join(&'a JoinDescriptor),
    /// `column` is one of the bound values. PostgreSQL takes exactly one
    /// array parameter; SQL Server takes one scalar parameter per value.
    Membership {
        column: &'a str,
        parameters: &'a [String],
    },
    Statement(&'a Statement),
}

impl Dialect {
    pub fn render(&self, part: QueryPart<'_>) -> Result<String, StoreError> {
        render(*self, part)
    }

    pub fn quote(&self, identifier: &str) -> Result<String, StoreError> {
        render(*self, QueryPart::Identifier(identifier))
    }

    pub fn placeholder(&self, parameter_name: &str) -> Result<String, StoreError> {
        render(*self, QueryPart::Placeholder(parameter_name))
    }
}

pub fn render(dialect: Dialect, part: QueryPart<'_>) -> Result<String, StoreError> {
    match part {
        QueryPart::Identifier(name) => {
            let name = ValidatedIdentifier::new(name)?;
            Ok(match dialect {
                Dialect::SqlServer => format!("[{}]", name.as_str()),
                Dialect::PostgreSql => format!("\"{}\"", name.as_str()),
            })
        }
        QueryPart::Field { table, column } => {
            let column = dialect.quote(column)?;
            match table {
                Some(table) => Ok(format!("{}.{}", dialect.quote(table)?, column)),
                None => Ok(column),
            }
        }
        QueryPart::Placeholder(name) => {
            if name.trim().is_empty() {
                return Err(StoreError::invalid_configuration(
                    "parameter placeholder requires a name",
                ));
            }
            Ok(format!("@{}", name))
        }
        QueryPart::Column(column) => render_column(dialect, column),
        QueryPart::Join(join) => render_join(dialect, join),
        QueryPart::Membership { column, parameters } => {
            let column = dialect.quote(column)?;
            match (dialect, parameters) {
                (_, []) => Err(StoreError::invalid_configuration(format!(
                    "membership test on {} has no parameters",
                    column
                ))),
                (Dialect::PostgreSql, [parameter]) => Ok(format!(
                    "{} = ANY({})",
                    column,
                    dialect.placeholder(parameter)?
                )),
                (Dialect::PostgreSql, _) => Err(StoreError::invalid_configuration(format!(
                    "membership test on {} binds {} parameters; expected one array",
                    column,
                    parameters.len()
                ))),
                (Dialect::SqlServer, _) => {
                    let placeholders = parameters
                        .iter()
                        .map(|parameter| dialect.placeholder(parameter))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(format!("{} IN ({})", column, placeholders.join(", ")))
                }
            }
        }
        QueryPart::Statement(statement) => render_statement(dialect, statement),
    }
}

fn require<'a>(value: &'a str, what: &str) -> Result<&'a str, StoreError> {
    if value.trim().is_empty() {
        Err(StoreError::invalid_configuration(format!(
            "{} cannot be empty",
            what
        )))
    } else {
        Ok(value)
    }
}

fn render_column(dialect: Dialect, column: &ColumnReference) -> Result<String, StoreError> {
    let table_alias = require(&column.table_alias, "column reference table alias")?;
    let name = require(&column.name, "column reference name")?;

    let mut sql = dialect.render(QueryPart::Field {
        table: Some(table_alias),
        column: name,
    })?;

    if !column.alias.is_empty() && column.alias != column.name {
        sql.push_str(" AS ");
        sql.push_str(&dialect.quote(&column.alias)?);
    }

    Ok(sql)
}

fn render_join(dialect: Dialect, join: &JoinDescriptor) -> Result<String, StoreError> {
    let keyword = join.join_kind.to_sql()?;
    let right_table = require(&join.right_table, "join right table")?;
    let right_column = require(&join.right_relation_column, "join right relation column")?;
    let left_reference = require(join.left_reference(), "join left table")?;
    let left_column = require(&join.left_relation_column, "join left relation column")?;
    let alias = require(&join.alias, "join alias")?;

    let hint = match dialect {
        Dialect::SqlServer => " WITH (NOLOCK)",
        Dialect::PostgreSql => "",
    };

    Ok(format!(
        "{} {} AS {}{} ON {} = {}",
        keyword,
        dialect.quote(right_table)?,
        dialect.quote(alias)?,
        hint,
        dialect.render(QueryPart::Field {
            table: Some(alias),
            column: right_column,
        })?,
        dialect.render(QueryPart::Field {
            table: Some(left_reference),
            column: left_column,
        })?,
    ))
}

fn render_statement(dialect: Dialect, statement: &Statement) -> Result<String, StoreError> {
    match statement {
        Statement::Insert {
            table,
            columns,
            parameters,
        } => {
            let table = dialect.quote(table)?;
            if columns.is_empty() {
                return Ok(match dialect {
                    Dialect::SqlServer => {
                        format!("INSERT INTO {} OUTPUT INSERTED.* DEFAULT VALUES", table)
                    }
                    Dialect::PostgreSql => {
                        format!("INSERT INTO {} DEFAULT VALUES RETURNING *", table)
                    }
                });
            }
            if columns.len() != parameters.len() {
                return Err(StoreError::invalid_configuration(format!(
                    "insert into {} binds {} columns to {} parameters",
                    table,
                    columns.len(),
                    parameters.len()
                )));
            }

            let column_list = columns
                .iter()
                .map(|column| dialect.quote(column))
                .collect::<Result<Vec<_>, _>>()?
                .join(", ");
            let value_list = parameters
                .iter()
                .map(|parameter| dialect.placeholder(parameter))
                .collect::<Result<Vec<_>, _>>()?
                .join(", ");

            Ok(match dialect {
                Dialect::SqlServer => format!(
                    "INSERT INTO {} ({}) OUTPUT INSERTED.* VALUES ({})",
                    table, column_list, value_list
                ),
                Dialect::PostgreSql => format!(
                    "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
                    table, column_list, value_list
                ),
            })
        }
        Statement::Update {
            table,
            assignments,
            identity,
            parameter,
        } => {
            if assignments.is_empty() {
                return Err(StoreError::invalid_configuration(format!(
                    "update of {} has no columns to set",
                    table
                )));
            }

            let set_clause = assignments
                .iter()
                .map(|(column, parameter)| {
                    Ok(format!(
                        "{} = {}",
                        dialect.quote(column)?,
                        dialect.placeholder(parameter)?
                    ))
                })
                .collect::<Result<Vec<_>, StoreError>>()?
                .join(", ");
            let condition = format!(
                "{} = {}",
                dialect.quote(identity)?,
                dialect.placeholder(parameter)?
            );
            let table = dialect.quote(table)?;

            Ok(match dialect {
                Dialect::SqlServer => format!(
                    "UPDATE {} SET {} OUTPUT INSERTED.* WHERE {}",
                    table, set_clause, condition
                ),
                Dialect::PostgreSql => format!(
                    "UPDATE {} SET {} WHERE {} RETURNING *",
                    table, set_clause, condition
                ),
            })
        }
        Statement::Delete {
            table,
            identity,
            parameters,
        } => Ok(format!(
            "DELETE FROM {} WHERE {}",
            dialect.quote(table)?,
            dialect.render(QueryPart::Membership {
                column: identity,
                parameters,
            })?
        )),
        Statement::Select {
            table,
            columns,
            joins,
            filter,
        } => {
            let table_sql = dialect.quote(table)?;
            let mut sql = String::from("SELECT ");

            if columns.is_empty() {
                sql.push('*');
            } else {
                sql.push_str(&table_sql);
                sql.push_str(".*");
                for column in columns {
                    sql.push_str(", ");
                    sql.push_str(&dialect.render(QueryPart::Column(column))?);
                }
            }

            sql.push_str(" FROM ");
            sql.push_str(&table_sql);

            for join in joins {
                sql.push(' ');
                sql.push_str(&dialect.render(QueryPart::Join(join))?);
            }

            if let Some(filter) = filter.as_deref().filter(|f| !f.is_empty()) {
                sql.push_str(" WHERE ");
                sql.push_str(filter);
            }

            Ok(sql)
        }
    }
}
