use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Unsupported SQL dialect: '{0}'")]
    UnsupportedDialect(String),

    #[error("Invalid join path '{path}': {reason}")]
    InvalidJoinPath { path: String, reason: String },

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(#[from] ValidationError),

    #[error("{entity} requires a non-default identity for {operation}")]
    MissingIdentity { entity: String, operation: String },

    #[error("{entity} with id {id} was not found")]
    EntityNotFound { entity: String, id: String },

    #[error("{operation} on {entity} returned no row")]
    NoRowsReturned { entity: String, operation: String },

    #[error("Parameter '{parameter}' cannot be bound: {reason}")]
    InvalidParameter { parameter: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Connection error: {source}")]
    Connection {
        #[source]
        source: sqlx::Error,
    },

    #[error("Query execution failed: {source}")]
    QueryExecution {
        sql: String,
        #[source]
        source: sqlx::Error,
    },
}

impl StoreError {
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    pub fn invalid_join_path(path: &str, reason: impl Into<String>) -> Self {
        Self::InvalidJoinPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::EntityNotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn no_rows_returned(entity: &str, operation: &str) -> Self {
        Self::NoRowsReturned {
            entity: entity.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn invalid_parameter(parameter: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.to_string(),
            reason: reason.into(),
        }
    }

    pub fn query_execution(sql: &str, source: sqlx::Error) -> Self {
        Self::QueryExecution {
            sql: sql.to_string(),
            source,
        }
    }

    /// Configuration errors are caller bugs and never worth retrying.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration { .. }
                | Self::UnsupportedDialect(_)
                | Self::InvalidJoinPath { .. }
                | Self::InvalidIdentifier(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::EntityNotFound { .. })
    }
}
