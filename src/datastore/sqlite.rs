//! SQLite binding of the [`Datastore`] boundary.
//!
//! rusqlite understands `:name` placeholders natively, so statements from the
//! query builder run unchanged. Driver calls are blocking and are moved onto
//! tokio's blocking pool.

use super::schema::{schema_sql, TableNames};
use super::{Datastore, Row};
use crate::query::BindMap;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Connection, Statement};
use serde_json::{Number, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub struct SqliteDatastore {
    path: PathBuf,
    connection: Arc<Mutex<Option<Connection>>>,
}

impl std::fmt::Debug for SqliteDatastore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteDatastore")
            .field("path", &self.path)
            .field("connected", &self.is_open())
            .finish()
    }
}

impl SqliteDatastore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            connection: Arc::new(Mutex::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_open(&self) -> bool {
        self.connection
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Creates the access-control tables if they do not exist yet.
    ///
    /// Opens and closes its own connection.
    pub async fn apply_schema(&self, tables: &TableNames) -> Result<()> {
        let ddl = schema_sql(tables)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            let connection = Connection::open(&path)
                .with_context(|| format!("opening {}", path.display()))?;
            connection.execute_batch(&ddl).context("applying schema")?;
            Ok(())
        })
        .await
        .context("schema task failed")?
    }

    /// Runs `work` against the open connection on the blocking pool.
    async fn with_connection<T, F>(&self, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let connection = self.connection.clone();
        tokio::task::spawn_blocking(move || {
            let guard = connection
                .lock()
                .map_err(|_| anyhow!("sqlite connection lock poisoned"))?;
            let conn = guard
                .as_ref()
                .ok_or_else(|| anyhow!("datastore is not connected"))?;
            work(conn)
        })
        .await
        .context("sqlite task failed")?
    }
}

#[async_trait]
impl Datastore for SqliteDatastore {
    async fn connect(&self) -> Result<()> {
        let path = self.path.clone();
        let connection = self.connection.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = Connection::open(&path)
                .with_context(|| format!("opening {}", path.display()))?;
            let mut guard = connection
                .lock()
                .map_err(|_| anyhow!("sqlite connection lock poisoned"))?;
            *guard = Some(conn);
            Ok(())
        })
        .await
        .context("sqlite connect task failed")?
    }

    async fn disconnect(&self) -> Result<()> {
        let connection = self.connection.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut guard = connection
                .lock()
                .map_err(|_| anyhow!("sqlite connection lock poisoned"))?;
            if let Some(conn) = guard.take() {
                conn.close().map_err(|(_, e)| e).context("closing sqlite")?;
            }
            Ok(())
        })
        .await
        .context("sqlite disconnect task failed")?
    }

    async fn fetch_one(&self, sql: &str, binds: &BindMap) -> Result<Option<Row>> {
        let sql = sql.to_string();
        let params = named_params(binds);
        self.with_connection(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = read_rows(&mut stmt, &params, Some(1))?;
            Ok(rows.pop())
        })
        .await
    }

    async fn fetch_all(&self, sql: &str, binds: &BindMap) -> Result<Vec<Row>> {
        let sql = sql.to_string();
        let params = named_params(binds);
        self.with_connection(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            read_rows(&mut stmt, &params, None)
        })
        .await
    }

    async fn execute(&self, sql: &str, binds: &BindMap) -> Result<u64> {
        let sql = sql.to_string();
        let params = named_params(binds);
        self.with_connection(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            bind_named(&mut stmt, &params)?;
            let affected = stmt.raw_execute()?;
            Ok(affected as u64)
        })
        .await
    }
}

fn named_params(binds: &BindMap) -> Vec<(String, SqlValue)> {
    binds
        .iter()
        .map(|(key, value)| (format!(":{}", key), to_sql(value)))
        .collect()
}

/// Binds every parameter the statement names. Extra bind values are ignored.
fn bind_named(stmt: &mut Statement<'_>, params: &[(String, SqlValue)]) -> Result<()> {
    for (name, value) in params {
        if let Some(index) = stmt.parameter_index(name)? {
            stmt.raw_bind_parameter(index, value)?;
        }
    }
    Ok(())
}

fn read_rows(
    stmt: &mut Statement<'_>,
    params: &[(String, SqlValue)],
    limit: Option<usize>,
) -> Result<Vec<Row>> {
    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    bind_named(stmt, params)?;
    let mut rows = stmt.raw_query();
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = Row::new();
        for (index, name) in names.iter().enumerate() {
            record.insert(name.clone(), from_sql(row.get_ref(index)?));
        }
        out.push(record);
        if limit.is_some_and(|limit| out.len() >= limit) {
            break;
        }
    }
    Ok(out)
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
    }
}

#[cfg(test)]
#[path = "tests/sqlite_tests.rs"]
mod tests;
