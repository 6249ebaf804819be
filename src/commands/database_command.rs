//! Transactional query executor.
//!
//! Each call is a full cycle: connect, run one statement, release. There is
//! no pooling, every call pays for its own connection. Connect and the
//! statement each run as an [`AsyncCommand`], so driver errors and panics
//! are contained the same way as any other wrapped operation.

use super::async_command::AsyncCommand;
use super::errors::CommandError;
use super::fault::contain_async;
use super::outcome::Outcome;
use crate::datastore::{Datastore, Row};
use crate::query::QueryModel;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// How the statement's result is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    One,
    All,
    /// Run without fetching rows; reports the affected row count.
    Execute,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    Row(Option<Row>),
    Rows(Vec<Row>),
    Affected(u64),
}

impl QueryOutput {
    pub fn into_row(self) -> Option<Row> {
        match self {
            Self::Row(row) => row,
            Self::Rows(rows) => rows.into_iter().next(),
            Self::Affected(_) => None,
        }
    }

    pub fn into_rows(self) -> Vec<Row> {
        match self {
            Self::Row(row) => row.into_iter().collect(),
            Self::Rows(rows) => rows,
            Self::Affected(_) => Vec::new(),
        }
    }

    pub fn affected(&self) -> Option<u64> {
        match self {
            Self::Affected(count) => Some(*count),
            _ => None,
        }
    }
}

pub const CONNECT_FAILED: &str = "Erro ao conectar ao banco de dados";
pub const QUERY_FAILED: &str = "Erro ao executar a query";
pub const DISCONNECT_FAILED: &str = "Erro ao desconectar do DB";
const CONNECTED: &str = "Conexão bem-sucedida";
const DISCONNECTED: &str = "Desconexão bem-sucedida";

/// Runs built [`QueryModel`] statements against a [`Datastore`].
///
/// The connection flag is a plain atomic, not a lock. Callers sharing one
/// executor across concurrent tasks can interleave connect and release; give
/// each task its own executor when that matters.
pub struct DatabaseCommand {
    datastore: Arc<dyn Datastore>,
    connected: AtomicBool,
}

impl std::fmt::Debug for DatabaseCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseCommand")
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl DatabaseCommand {
    pub fn new(datastore: Arc<dyn Datastore>) -> Self {
        Self {
            datastore,
            connected: AtomicBool::new(false),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub async fn connect(&self) -> Outcome<String, String> {
        let mut open = AsyncCommand::<String, String>::new();
        let opened = open
            .execute_async_with_param(self.datastore.clone(), |datastore| async move {
                datastore.connect().await?;
                Ok::<_, anyhow::Error>(Outcome::success(CONNECTED.to_string()))
            })
            .await
            .unwrap_or_else(|e| Outcome::fault(e.to_string()));
        self.connected.store(opened.is_success(), Ordering::Release);
        rewrap_failure(opened, "Erro ao se conectar ao DB")
    }

    /// Closes the connection if one is open; a no-op success otherwise.
    pub async fn disconnect(&self) -> Outcome<String, String> {
        if !self.is_connected() {
            return Outcome::success("DB já desconectado".to_string());
        }
        self.release().await
    }

    /// Always reaches the datastore, even after a partial connect. Errors and
    /// panics from the driver come back as a critical failure.
    async fn release(&self) -> Outcome<String, String> {
        let closed = contain_async(async {
            self.datastore.disconnect().await?;
            Ok::<_, anyhow::Error>(Outcome::success(DISCONNECTED.to_string()))
        })
        .await;
        self.connected.store(false, Ordering::Release);
        rewrap_failure(closed, DISCONNECT_FAILED)
    }

    /// Connects, runs the query's built statement once and releases.
    ///
    /// Release runs exactly once per call whatever happened before it, and a
    /// failed release is never silent: it fails the whole call.
    /// Errors and panics from the statement become critical failures.
    pub async fn execute_query(
        &self,
        query: &QueryModel,
        mode: FetchMode,
    ) -> Result<Outcome<QueryOutput, String>, CommandError> {
        let sql = query
            .query()
            .ok_or_else(|| CommandError::UnbuiltQuery {
                table: query.table.clone(),
            })?
            .to_string();
        let binds = query.binds();

        let connected = self.connect().await;
        if connected.is_failure() {
            let released = self.release().await;
            let details = with_release(connected.details().unwrap_or_default(), &released);
            return Ok(Outcome::fault(CONNECT_FAILED.to_string()).with_details(details));
        }

        tracing::debug!(sql = %sql, mode = ?mode, "executing statement");
        let datastore = self.datastore.clone();
        let mut statement = AsyncCommand::<QueryOutput, String>::new();
        let outcome = statement
            .execute_async_with(move || {
                let datastore = datastore.clone();
                let (sql, binds) = (sql.clone(), binds.clone());
                async move {
                    let output = match mode {
                        FetchMode::One => {
                            QueryOutput::Row(datastore.fetch_one(&sql, &binds).await?)
                        }
                        FetchMode::All => {
                            QueryOutput::Rows(datastore.fetch_all(&sql, &binds).await?)
                        }
                        FetchMode::Execute => {
                            QueryOutput::Affected(datastore.execute(&sql, &binds).await?)
                        }
                    };
                    Ok::<_, anyhow::Error>(Outcome::success(output))
                }
            })
            .await
            .unwrap_or_else(|e| Outcome::fault(e.to_string()));

        let released = self.release().await;

        Ok(match outcome {
            Outcome::Failure { value, details, .. } => {
                let details = with_release(&details.unwrap_or(value), &released);
                Outcome::fault(QUERY_FAILED.to_string()).with_details(details)
            }
            _ if released.is_failure() => {
                tracing::error!("statement ran but the connection was not released");
                Outcome::fault(DISCONNECT_FAILED.to_string())
                    .with_details(released.details().unwrap_or_default())
            }
            other => other,
        })
    }
}

/// Replaces a failure's value with `message`, keeping the cause as details.
fn rewrap_failure(outcome: Outcome<String, String>, message: &str) -> Outcome<String, String> {
    match outcome {
        Outcome::Failure { value, details, .. } => {
            Outcome::fault(message.to_string()).with_details(details.unwrap_or(value))
        }
        other => other,
    }
}

/// Appends the release failure, if any, to `details`.
fn with_release(details: &str, released: &Outcome<String, String>) -> String {
    match released.details() {
        Some(cause) if released.is_failure() => {
            format!("{}; {}: {}", details, DISCONNECT_FAILED, cause)
        }
        _ => details.to_string(),
    }
}

#[cfg(test)]
#[path = "tests/database_command_tests.rs"]
mod tests;
