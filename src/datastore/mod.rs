//! Datastore boundary consumed by the transactional query executor.
//!
//! Statements arrive fully built by [`QueryModel`](crate::query::QueryModel);
//! bind placeholders use the `:name` syntax and resolve against a
//! [`BindMap`].

pub mod schema;
pub mod sqlite;

pub use schema::TableNames;
pub use sqlite::SqliteDatastore;

use crate::query::BindMap;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// One result row, column name to value, in column order.
pub type Row = Map<String, Value>;

#[async_trait]
pub trait Datastore: Send + Sync {
    async fn connect(&self) -> anyhow::Result<()>;

    /// Releases the connection. Must tolerate being called when no
    /// connection, or only a partially opened one, exists.
    async fn disconnect(&self) -> anyhow::Result<()>;

    async fn fetch_one(&self, sql: &str, binds: &BindMap) -> anyhow::Result<Option<Row>>;

    async fn fetch_all(&self, sql: &str, binds: &BindMap) -> anyhow::Result<Vec<Row>>;

    /// Runs a statement without fetching rows, returning the affected row count.
    async fn execute(&self, sql: &str, binds: &BindMap) -> anyhow::Result<u64>;
}
