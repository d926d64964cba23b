//! PostgreSQL execution through sqlx
//!
//! Statements arrive with `@Pn` placeholders. They are rewritten to `$n`
//! before execution, and row-returning statements are wrapped so each row
//! comes back as one JSON object. Parameters bind with the type their column
//! declares.

use crate::errors::StoreError;
use crate::query_builder::{ColumnType, Dialect, QueryParameter, QueryParameters};
use crate::traits::{ConnectionFactory, QueryAdapter};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

pub type PgConnection = PoolConnection<Postgres>;

/// Pooled connections for the PostgreSQL dialect
#[derive(Debug, Clone)]
pub struct PgConnectionFactory {
    pool: PgPool,
    max_row_count: u32,
}

impl PgConnectionFactory {
    pub fn new(pool: PgPool, max_row_count: u32) -> Self {
        Self {
            pool,
            max_row_count,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ConnectionFactory for PgConnectionFactory {
    type Connection = PgConnection;

    async fn connection(&self) -> Result<PgConnection, StoreError> {
        self.pool
            .acquire()
            .await
            .map_err(|source| StoreError::Connection { source })
    }

    fn dialect(&self) -> Dialect {
        Dialect::PostgreSql
    }

    fn max_row_count(&self) -> u32 {
        self.max_row_count
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PgAdapter;

impl PgAdapter {
    pub fn new() -> Self {
        Self
    }
}

/// A parameter converted to the Rust type sqlx binds for its column
#[derive(Debug, Clone, PartialEq)]
pub enum PgValue {
    Text(Option<String>),
    SmallInt(Option<i16>),
    Integer(Option<i32>),
    BigInt(Option<i64>),
    Float(Option<f64>),
    Boolean(Option<bool>),
    Uuid(Option<Uuid>),
    Timestamp(Option<DateTime<Utc>>),
    Date(Option<NaiveDate>),
    Json(Option<Value>),
    TextArray(Vec<String>),
    IntegerArray(Vec<i32>),
    BigIntArray(Vec<i64>),
    UuidArray(Vec<Uuid>),
    TimestampArray(Vec<DateTime<Utc>>),
}

impl PgValue {
    /// Convert `parameter` by its declared column type, or by JSON shape when
    /// it has none. Strings never change type by content.
    pub fn from_parameter(parameter: &QueryParameter) -> Result<Self, StoreError> {
        let value = &parameter.value;
        let converted = match (parameter.column_type, value) {
            (Some(column_type), Value::Array(items)) if column_type != ColumnType::Json => {
                typed_array(column_type, items)
            }
            (Some(column_type), _) => typed_scalar(column_type, value),
            (None, _) => Some(untyped(value)),
        };

        converted.ok_or_else(|| match parameter.column_type {
            Some(column_type) => StoreError::invalid_parameter(
                &parameter.column_name,
                format!("{} is not a valid {:?} value", value, column_type),
            ),
            None => StoreError::invalid_parameter(&parameter.column_name, "unsupported value"),
        })
    }
}

fn nullable<T>(value: &Value, convert: impl Fn(&Value) -> Option<T>) -> Option<Option<T>> {
    if value.is_null() {
        Some(None)
    } else {
        convert(value).map(Some)
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn small_int(value: &Value) -> Option<i16> {
    value.as_i64().and_then(|n| i16::try_from(n).ok())
}

fn integer(value: &Value) -> Option<i32> {
    value.as_i64().and_then(|n| i32::try_from(n).ok())
}

fn uuid(value: &Value) -> Option<Uuid> {
    value.as_str().and_then(|s| Uuid::parse_str(s).ok())
}

/// RFC3339, or a naive `YYYY-MM-DDTHH:MM:SS[.f]` taken as UTC
fn timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let s = value.as_str()?;
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.and_utc()))
        .ok()
}

fn date(value: &Value) -> Option<NaiveDate> {
    value
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

fn typed_scalar(column_type: ColumnType, value: &Value) -> Option<PgValue> {
    Some(match column_type {
        ColumnType::Text => PgValue::Text(nullable(value, text)?),
        ColumnType::SmallInt => PgValue::SmallInt(nullable(value, small_int)?),
        ColumnType::Integer => PgValue::Integer(nullable(value, integer)?),
        ColumnType::BigInt => PgValue::BigInt(nullable(value, Value::as_i64)?),
        ColumnType::Float => PgValue::Float(nullable(value, Value::as_f64)?),
        ColumnType::Boolean => PgValue::Boolean(nullable(value, Value::as_bool)?),
        ColumnType::Uuid => PgValue::Uuid(nullable(value, uuid)?),
        ColumnType::Timestamp => PgValue::Timestamp(nullable(value, timestamp)?),
        ColumnType::Date => PgValue::Date(nullable(value, date)?),
        ColumnType::Json => PgValue::Json(nullable(value, |v| Some(v.clone()))?),
    })
}

/// Arrays bound for `= ANY(..)` membership tests
fn typed_array(column_type: ColumnType, items: &[Value]) -> Option<PgValue> {
    Some(match column_type {
        ColumnType::Text => PgValue::TextArray(items.iter().map(text).collect::<Option<_>>()?),
        ColumnType::SmallInt | ColumnType::Integer => {
            PgValue::IntegerArray(items.iter().map(integer).collect::<Option<_>>()?)
        }
        ColumnType::BigInt => {
            PgValue::BigIntArray(items.iter().map(Value::as_i64).collect::<Option<_>>()?)
        }
        ColumnType::Uuid => PgValue::UuidArray(items.iter().map(uuid).collect::<Option<_>>()?),
        ColumnType::Timestamp => {
            PgValue::TimestampArray(items.iter().map(timestamp).collect::<Option<_>>()?)
        }
        ColumnType::Float | ColumnType::Boolean | ColumnType::Date | ColumnType::Json => {
            return None
        }
    })
}

fn untyped(value: &Value) -> PgValue {
    match value {
        Value::Null => PgValue::Text(None),
        Value::Bool(b) => PgValue::Boolean(Some(*b)),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => match i32::try_from(i) {
                Ok(small) => PgValue::Integer(Some(small)),
                Err(_) => PgValue::BigInt(Some(i)),
            },
            (None, Some(f)) => PgValue::Float(Some(f)),
            (None, None) => PgValue::Text(Some(n.to_string())),
        },
        Value::String(s) => PgValue::Text(Some(s.clone())),
        Value::Array(items) => {
            if let Some(numbers) = items.iter().map(Value::as_i64).collect::<Option<Vec<_>>>() {
                PgValue::BigIntArray(numbers)
            } else if let Some(strings) = items.iter().map(text).collect::<Option<Vec<_>>>() {
                PgValue::TextArray(strings)
            } else {
                PgValue::Json(Some(value.clone()))
            }
        }
        Value::Object(_) => PgValue::Json(Some(value.clone())),
    }
}

macro_rules! bind_pg_value {
    ($query:expr, $value:expr) => {
        match $value {
            PgValue::Text(v) => $query.bind(v),
            PgValue::SmallInt(v) => $query.bind(v),
            PgValue::Integer(v) => $query.bind(v),
            PgValue::BigInt(v) => $query.bind(v),
            PgValue::Float(v) => $query.bind(v),
            PgValue::Boolean(v) => $query.bind(v),
            PgValue::Uuid(v) => $query.bind(v),
            PgValue::Timestamp(v) => $query.bind(v),
            PgValue::Date(v) => $query.bind(v),
            PgValue::Json(v) => $query.bind(v.map(sqlx::types::Json)),
            PgValue::TextArray(v) => $query.bind(v),
            PgValue::IntegerArray(v) => $query.bind(v),
            PgValue::BigIntArray(v) => $query.bind(v),
            PgValue::UuidArray(v) => $query.bind(v),
            PgValue::TimestampArray(v) => $query.bind(v),
        }
    };
}

fn pg_values(parameters: &QueryParameters) -> Result<Vec<PgValue>, StoreError> {
    parameters.iter().map(PgValue::from_parameter).collect()
}

/// Rewrite `@Pn` placeholders to `$n`, highest number first so `@P1` never
/// matches inside `@P10`.
pub fn to_positional(sql: &str, parameters: &QueryParameters) -> String {
    let mut positional = sql.to_string();
    for (position, parameter) in parameters.iter().enumerate().rev() {
        positional = positional.replace(
            &format!("@{}", parameter.parameter_name),
            &format!("${}", position + 1),
        );
    }
    positional
}

/// Wrap a row-returning statement so every row arrives as a JSON object.
pub fn json_rows(sql: &str) -> String {
    format!("WITH q AS ({}) SELECT row_to_json(q) FROM q", sql)
}

#[async_trait]
impl QueryAdapter for PgAdapter {
    type Connection = PgConnection;

    async fn query<R>(
        &self,
        connection: &mut PgConnection,
        sql: &str,
        parameters: &QueryParameters,
    ) -> Result<Vec<R>, StoreError>
    where
        R: DeserializeOwned + Send + 'static,
    {
        let values = pg_values(parameters)?;
        let wrapped = json_rows(&to_positional(sql, parameters));

        let mut query = sqlx::query_scalar::<_, Value>(&wrapped);
        for value in values {
            query = bind_pg_value!(query, value);
        }

        let rows = query
            .fetch_all(&mut **connection)
            .await
            .map_err(|source| StoreError::query_execution(sql, source))?;

        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(StoreError::from))
            .collect()
    }

    async fn execute(
        &self,
        connection: &mut PgConnection,
        sql: &str,
        parameters: &QueryParameters,
    ) -> Result<u64, StoreError> {
        let values = pg_values(parameters)?;
        let positional = to_positional(sql, parameters);

        let mut query = sqlx::query(&positional);
        for value in values {
            query = bind_pg_value!(query, value);
        }

        let result = query
            .execute(&mut **connection)
            .await
            .map_err(|source| StoreError::query_execution(sql, source))?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_positional_rewrite_handles_double_digits() {
        let mut parameters = QueryParameters::new();
        let mut sql = Vec::new();
        for n in 1..=11 {
            let name = parameters.set(&format!("c{}", n), json!(n)).to_string();
            sql.push(format!("\"c{}\" = @{}", n, name));
        }

        let positional = to_positional(&sql.join(" AND "), &parameters);

        assert!(positional.starts_with("\"c1\" = $1 AND \"c2\" = $2"));
        assert!(positional.contains("\"c10\" = $10"));
        assert!(positional.ends_with("\"c11\" = $11"));
        assert!(!positional.contains('@'));
    }

    fn converted(value: Value, column_type: Option<ColumnType>) -> Result<PgValue, StoreError> {
        let mut parameters = QueryParameters::new();
        parameters.set_typed("value", value, column_type);
        PgValue::from_parameter(parameters.get("value").unwrap())
    }

    #[test]
    fn test_text_columns_keep_timestamp_and_uuid_like_strings() {
        let stamp = "2024-05-01T00:00:00Z";
        let upper_uuid = "A0EEBC99-9C0B-4EF8-BB6D-6BB9BD380A11";

        for column_type in [Some(ColumnType::Text), None] {
            assert_eq!(
                converted(json!(stamp), column_type).unwrap(),
                PgValue::Text(Some(stamp.to_string()))
            );
            assert_eq!(
                converted(json!(upper_uuid), column_type).unwrap(),
                PgValue::Text(Some(upper_uuid.to_string()))
            );
        }

        assert_eq!(
            converted(json!([upper_uuid, stamp]), Some(ColumnType::Text)).unwrap(),
            PgValue::TextArray(vec![upper_uuid.to_string(), stamp.to_string()])
        );
        assert_eq!(
            converted(json!([upper_uuid]), None).unwrap(),
            PgValue::TextArray(vec![upper_uuid.to_string()])
        );
    }

    #[test]
    fn test_declared_types_bind_typed() {
        let stamp = "2024-05-01T10:30:00+02:00";
        let expected = DateTime::parse_from_rfc3339(stamp).unwrap().with_timezone(&Utc);
        assert_eq!(
            converted(json!(stamp), Some(ColumnType::Timestamp)).unwrap(),
            PgValue::Timestamp(Some(expected))
        );

        let token = Uuid::new_v4();
        assert_eq!(
            converted(json!(token.to_string()), Some(ColumnType::Uuid)).unwrap(),
            PgValue::Uuid(Some(token))
        );
        assert_eq!(
            converted(json!([token.to_string()]), Some(ColumnType::Uuid)).unwrap(),
            PgValue::UuidArray(vec![token])
        );
        assert_eq!(
            converted(json!(7), Some(ColumnType::BigInt)).unwrap(),
            PgValue::BigInt(Some(7))
        );
        assert_eq!(
            converted(json!([1, 2]), Some(ColumnType::Integer)).unwrap(),
            PgValue::IntegerArray(vec![1, 2])
        );
        assert_eq!(
            converted(json!("2024-05-01"), Some(ColumnType::Date)).unwrap(),
            PgValue::Date(NaiveDate::from_ymd_opt(2024, 5, 1))
        );
        assert_eq!(
            converted(json!([1, "a"]), Some(ColumnType::Json)).unwrap(),
            PgValue::Json(Some(json!([1, "a"])))
        );
    }

    #[test]
    fn test_nulls_keep_their_column_type() {
        assert_eq!(
            converted(Value::Null, Some(ColumnType::Timestamp)).unwrap(),
            PgValue::Timestamp(None)
        );
        assert_eq!(
            converted(Value::Null, Some(ColumnType::Uuid)).unwrap(),
            PgValue::Uuid(None)
        );
        assert_eq!(converted(Value::Null, None).unwrap(), PgValue::Text(None));
    }

    #[test]
    fn test_untyped_values_bind_by_shape() {
        assert_eq!(converted(json!(5), None).unwrap(), PgValue::Integer(Some(5)));
        assert_eq!(
            converted(json!(5_000_000_000i64), None).unwrap(),
            PgValue::BigInt(Some(5_000_000_000))
        );
        assert_eq!(converted(json!(1.5), None).unwrap(), PgValue::Float(Some(1.5)));
        assert_eq!(converted(json!(true), None).unwrap(), PgValue::Boolean(Some(true)));
        assert_eq!(
            converted(json!([3, 4]), None).unwrap(),
            PgValue::BigIntArray(vec![3, 4])
        );
        assert_eq!(
            converted(json!({ "a": 1 }), None).unwrap(),
            PgValue::Json(Some(json!({ "a": 1 })))
        );
    }

    #[test]
    fn test_values_that_do_not_fit_the_column_fail() {
        let cases = [
            (json!("last week"), ColumnType::Timestamp),
            (json!("not-a-uuid"), ColumnType::Uuid),
            (json!(70_000), ColumnType::SmallInt),
            (json!("7"), ColumnType::BigInt),
            (json!([true]), ColumnType::Boolean),
        ];

        for (value, column_type) in cases {
            let err = converted(value.clone(), Some(column_type)).unwrap_err();
            assert!(
                matches!(err, StoreError::InvalidParameter { ref parameter, .. } if parameter == "value"),
                "{} as {:?}: {:?}",
                value,
                column_type,
                err
            );
        }
    }

    #[test]
    fn test_json_rows_wraps_statement() {
        assert_eq!(
            json_rows("SELECT * FROM \"comments\""),
            "WITH q AS (SELECT * FROM \"comments\") SELECT row_to_json(q) FROM q"
        );
    }
}
