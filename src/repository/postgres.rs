//! Table-driven PostgreSQL repository over JSON rows.

use crate::case::{keys_to_camel_case, keys_to_snake_case, to_snake_case};
use crate::config::TableSpec;
use crate::error::RepositoryError;
use crate::repository::{Filter, FindMany, JsonRow, Repository};
use crate::sql::{self, PgBindValue, QueryBuf};
use crate::validation::formats::coerce_number;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// One resource table. Accepts and returns camelCase keys; columns are snake_case.
pub struct PgRepository {
    pool: PgPool,
    table: TableSpec,
}

impl PgRepository {
    pub fn new(pool: PgPool, table: TableSpec) -> Self {
        Self { pool, table }
    }

    pub fn table(&self) -> &TableSpec {
        &self.table
    }

    fn filters(&self, filter: &Filter) -> Vec<(String, Value)> {
        filter
            .iter()
            .map(|(k, v)| {
                let col = to_snake_case(k);
                let v = self.column_value(&col, v.clone());
                (col, v)
            })
            .collect()
    }

    /// camelCase request row to snake_case columns, each value in a shape its column cast accepts.
    fn to_columns(&self, data: JsonRow) -> JsonRow {
        keys_to_snake_case(data)
            .into_iter()
            .map(|(col, v)| {
                let v = self.column_value(&col, v);
                (col, v)
            })
            .collect()
    }

    fn column_value(&self, col: &str, v: Value) -> Value {
        match self.table.column(col) {
            Some(c) => normalize_for_column(c.pg_type, v),
            None => v,
        }
    }

    fn bind_all<'q>(
        q: &'q QueryBuf,
    ) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from(p));
        }
        query
    }

    async fn fetch_many(&self, q: &QueryBuf) -> Result<Vec<JsonRow>, RepositoryError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = Self::bind_all(q).fetch_all(&self.pool).await.map_err(classify)?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn fetch_optional(&self, q: &QueryBuf) -> Result<Option<JsonRow>, RepositoryError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = Self::bind_all(q).fetch_optional(&self.pool).await.map_err(classify)?;
        Ok(row.as_ref().map(row_to_json))
    }
}

/// Validation accepts numeric strings and epoch-millisecond dates; PostgreSQL casts accept neither
/// for integer and date columns. Values that need no conversion are returned unchanged.
fn normalize_for_column(pg_type: &str, v: Value) -> Value {
    let converted = match pg_type {
        "bigint" | "integer" | "smallint" if !v.is_i64() => coerce_number(&v)
            .filter(|n| n.fract() == 0.0 && n.abs() < i64::MAX as f64)
            .map(|n| Value::from(n as i64)),
        "double precision" | "real" | "numeric" if v.is_string() => {
            coerce_number(&v).and_then(serde_json::Number::from_f64).map(Value::Number)
        }
        "boolean" => match v.as_str() {
            Some("true") => Some(Value::Bool(true)),
            Some("false") => Some(Value::Bool(false)),
            _ => None,
        },
        "date" => epoch_millis(&v).map(|dt| Value::String(dt.format("%Y-%m-%d").to_string())),
        "timestamptz" => epoch_millis(&v).map(|dt| Value::String(dt.to_rfc3339())),
        _ => None,
    };
    converted.unwrap_or(v)
}

fn epoch_millis(v: &Value) -> Option<DateTime<Utc>> {
    let Value::Number(n) = v else {
        return None;
    };
    n.as_i64()
        .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
        .and_then(DateTime::from_timestamp_millis)
}

/// Constraint violations become conflicts; everything else stays a database error.
fn classify(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db) = &e {
        match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                return RepositoryError::Conflict(format!("duplicate value: {}", db.message()))
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                return RepositoryError::Conflict(format!(
                    "referenced record does not exist: {}",
                    db.message()
                ))
            }
            _ => {}
        }
    }
    RepositoryError::Db(e)
}

#[async_trait]
impl Repository for PgRepository {
    type Entity = JsonRow;
    type CreateDto = JsonRow;
    type UpdateDto = JsonRow;

    async fn find_many(&self, args: FindMany) -> Result<Vec<JsonRow>, RepositoryError> {
        let q = sql::select_list(&self.table, &self.filters(&args.filter), args.take, args.skip);
        self.fetch_many(&q).await
    }

    async fn find_unique(&self, id: i64) -> Result<Option<JsonRow>, RepositoryError> {
        let mut q = sql::select_by_id(&self.table);
        q.params.push(Value::from(id));
        self.fetch_optional(&q).await
    }

    async fn create(&self, data: JsonRow) -> Result<JsonRow, RepositoryError> {
        let q = sql::insert(&self.table, &self.to_columns(data));
        self.fetch_optional(&q)
            .await?
            .ok_or_else(|| RepositoryError::Backend("insert returned no row".into()))
    }

    async fn update(&self, id: i64, data: JsonRow) -> Result<Option<JsonRow>, RepositoryError> {
        let q = sql::update(&self.table, id, &self.to_columns(data));
        self.fetch_optional(&q).await
    }

    async fn delete(&self, id: i64) -> Result<Option<JsonRow>, RepositoryError> {
        let q = sql::delete(&self.table, id);
        self.fetch_optional(&q).await
    }

    fn supports_count(&self) -> bool {
        true
    }

    async fn count(&self, filter: &Filter) -> Result<u64, RepositoryError> {
        let q = sql::count(&self.table, &self.filters(filter));
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_scalar::<_, i64>(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from(p));
        }
        let n = query.fetch_one(&self.pool).await.map_err(classify)?;
        Ok(n.max(0) as u64)
    }
}

fn row_to_json(row: &PgRow) -> JsonRow {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = JsonRow::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    keys_to_camel_case(map)
}

fn cell_to_value(row: &PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::from(n);
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::from(n);
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDate>, _>(name) {
        return Value::String(d.format("%Y-%m-%d").to_string());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<Value>, _>(name) {
        return j;
    }
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integer_columns_get_whole_numbers() {
        assert_eq!(normalize_for_column("bigint", json!("1.0")), json!(1));
        assert_eq!(normalize_for_column("bigint", json!(" 42 ")), json!(42));
        assert_eq!(normalize_for_column("integer", json!(7.0)), json!(7));
        assert_eq!(normalize_for_column("bigint", json!(9007199254740993_i64)), json!(9007199254740993_i64));
        assert_eq!(normalize_for_column("bigint", json!(1.5)), json!(1.5));
    }

    #[test]
    fn epoch_millis_become_date_text() {
        assert_eq!(
            normalize_for_column("timestamptz", json!(1700000000000_i64)),
            json!("2023-11-14T22:13:20+00:00")
        );
        assert_eq!(normalize_for_column("date", json!(1700000000000_i64)), json!("2023-11-14"));
        assert_eq!(normalize_for_column("date", json!("2024-04-01")), json!("2024-04-01"));
    }

    #[test]
    fn other_scalars() {
        assert_eq!(normalize_for_column("double precision", json!("12.50")), json!(12.5));
        assert_eq!(normalize_for_column("boolean", json!("true")), json!(true));
        assert_eq!(normalize_for_column("text", json!("1.0")), json!("1.0"));
        assert_eq!(normalize_for_column("jsonb", json!([1, 2])), json!([1, 2]));
    }
}
