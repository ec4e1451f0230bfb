//! Builds parameterized SELECT, COUNT, INSERT, UPDATE, DELETE from a table descriptor.

use crate::config::{TableSpec, CREATED_AT, PRIMARY_KEY, UPDATED_AT};
use serde_json::{Map, Value};

/// Quote identifier for PostgreSQL (safe: only from the catalog).
pub(crate) fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

pub(crate) fn qualified_table(table: &TableSpec) -> String {
    format!("{}.{}", quoted(&table.schema_name), quoted(table.table_name))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Pushes a parameter and returns its placeholder, cast to `pg_type` when given.
    fn placeholder(&mut self, v: Value, pg_type: Option<&str>) -> String {
        self.params.push(v);
        let n = self.params.len();
        match pg_type {
            Some(t) => format!("${}::{}", n, t),
            None => format!("${}", n),
        }
    }
}

fn select_column_list(table: &TableSpec) -> String {
    std::iter::once(PRIMARY_KEY)
        .chain(table.columns.iter().map(|c| c.name))
        .chain([CREATED_AT, UPDATED_AT])
        .map(quoted)
        .collect::<Vec<_>>()
        .join(", ")
}

/// WHERE clause over known columns; unknown filter keys are ignored.
fn where_clause(q: &mut QueryBuf, table: &TableSpec, filters: &[(String, Value)]) -> String {
    let mut parts = Vec::new();
    for (col, val) in filters {
        let pg_type = if col == PRIMARY_KEY {
            Some("bigint")
        } else {
            match table.column(col) {
                Some(c) => Some(c.pg_type),
                None => continue,
            }
        };
        let ph = q.placeholder(val.clone(), pg_type);
        parts.push(format!("{} = {}", quoted(col), ph));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

/// SELECT by primary key. Caller binds the id as the sole param.
pub fn select_by_id(table: &TableSpec) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = $1",
        select_column_list(table),
        qualified_table(table),
        quoted(PRIMARY_KEY)
    );
    q
}

/// SELECT list with exact-match filters, ORDER BY id, optional LIMIT/OFFSET.
pub fn select_list(
    table: &TableSpec,
    filters: &[(String, Value)],
    limit: Option<u64>,
    offset: Option<u64>,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&mut q, table, filters);
    let limit_clause = limit.map(|n| format!(" LIMIT {}", n)).unwrap_or_default();
    let offset_clause = offset
        .filter(|n| *n > 0)
        .map(|n| format!(" OFFSET {}", n))
        .unwrap_or_default();
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {}{}{}",
        select_column_list(table),
        qualified_table(table),
        where_sql,
        quoted(PRIMARY_KEY),
        limit_clause,
        offset_clause
    );
    q
}

pub fn count(table: &TableSpec, filters: &[(String, Value)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&mut q, table, filters);
    q.sql = format!("SELECT COUNT(*) FROM {}{}", qualified_table(table), where_sql);
    q
}

/// INSERT the known columns present in `body`; absent columns take their DB default or NULL.
pub fn insert(table: &TableSpec, body: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in &table.columns {
        let Some(val) = body.get(c.name) else { continue };
        placeholders.push(q.placeholder(val.clone(), Some(c.pg_type)));
        cols.push(quoted(c.name));
    }
    q.sql = if cols.is_empty() {
        format!(
            "INSERT INTO {} DEFAULT VALUES RETURNING {}",
            qualified_table(table),
            select_column_list(table)
        )
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            qualified_table(table),
            cols.join(", "),
            placeholders.join(", "),
            select_column_list(table)
        )
    };
    q
}

/// UPDATE by id: SET the known columns present in `body`, and always touch updated_at.
pub fn update(table: &TableSpec, id: i64, body: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for (k, v) in body {
        let Some(c) = table.column(k) else { continue };
        let rhs = q.placeholder(v.clone(), Some(c.pg_type));
        sets.push(format!("{} = {}", quoted(k), rhs));
    }
    sets.push(format!("{} = NOW()", quoted(UPDATED_AT)));
    let id_ph = q.placeholder(Value::from(id), None);
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {} RETURNING {}",
        qualified_table(table),
        sets.join(", "),
        quoted(PRIMARY_KEY),
        id_ph,
        select_column_list(table)
    );
    q
}

pub fn delete(table: &TableSpec, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let id_ph = q.placeholder(Value::from(id), None);
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {} RETURNING {}",
        qualified_table(table),
        quoted(PRIMARY_KEY),
        id_ph,
        select_column_list(table)
    );
    q
}
