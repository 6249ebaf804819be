//! Statement-level repository: builds each statement and runs it through
//! the executor.

use crate::commands::{DatabaseCommand, FetchMode, Outcome, QueryOutput};
use crate::datastore::{Datastore, Row};
use crate::query::{QueryError, QueryModel};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug)]
pub struct DatabaseRepository {
    command: DatabaseCommand,
}

fn build_failure<T>(action: &str, error: &QueryError) -> Outcome<T, String> {
    tracing::error!(action, error = %error, "statement build failed");
    Outcome::fault(format!("Erro ao montar {}", action))
        .with_details(error.to_string())
        .with_log(format!("Erro ao executar {}", action))
}

impl DatabaseRepository {
    pub fn new(datastore: Arc<dyn Datastore>) -> Self {
        Self {
            command: DatabaseCommand::new(datastore),
        }
    }

    async fn run(
        &self,
        query: &QueryModel,
        mode: FetchMode,
        action: &str,
    ) -> Outcome<QueryOutput, String> {
        match self.command.execute_query(query, mode).await {
            Ok(outcome) if outcome.is_success() => {
                tracing::debug!(action, table = %query.table, "statement executed");
                outcome.with_log(format!("{} executado com sucesso", action))
            }
            Ok(outcome) => {
                tracing::warn!(
                    action,
                    table = %query.table,
                    details = outcome.details().unwrap_or_default(),
                    "statement failed"
                );
                outcome.with_log(format!("Erro ao executar {}", action))
            }
            Err(error) => {
                Outcome::fault(error.to_string()).with_log(format!("Erro ao executar {}", action))
            }
        }
    }

    pub async fn select_one(&self, mut query: QueryModel) -> Outcome<Option<Row>, String> {
        if let Err(e) = query.select(None) {
            return build_failure("Select one", &e);
        }
        self.run(&query, FetchMode::One, "Select one")
            .await
            .map(QueryOutput::into_row)
    }

    pub async fn select(&self, mut query: QueryModel) -> Outcome<Vec<Row>, String> {
        if let Err(e) = query.select(None) {
            return build_failure("Select All", &e);
        }
        self.run(&query, FetchMode::All, "Select All")
            .await
            .map(QueryOutput::into_rows)
    }

    pub async fn insert(&self, mut query: QueryModel) -> Outcome<u64, String> {
        if let Err(e) = query.insert() {
            return build_failure("Insert", &e);
        }
        self.run(&query, FetchMode::Execute, "Insert")
            .await
            .map(|output| output.affected().unwrap_or_default())
    }

    pub async fn delete(&self, mut query: QueryModel) -> Outcome<u64, String> {
        if let Err(e) = query.delete() {
            return build_failure("Delete", &e);
        }
        self.run(&query, FetchMode::Execute, "Delete")
            .await
            .map(|output| output.affected().unwrap_or_default())
    }

    /// Rows matching `query.values` get `new_values.values`.
    pub async fn update(
        &self,
        mut query: QueryModel,
        new_values: &QueryModel,
    ) -> Outcome<u64, String> {
        if let Err(e) = query.update(new_values) {
            return build_failure("Update", &e);
        }
        self.run(&query, FetchMode::Execute, "Update")
            .await
            .map(|output| output.affected().unwrap_or_default())
    }

    pub async fn count(&self, mut query: QueryModel) -> Outcome<i64, String> {
        if let Err(e) = query.count() {
            return build_failure("Count", &e);
        }
        self.run(&query, FetchMode::One, "Count").await.map(|output| {
            output
                .into_row()
                .and_then(|row| row.get("total").and_then(Value::as_i64))
                .unwrap_or_default()
        })
    }
}

#[cfg(test)]
#[path = "tests/database_tests.rs"]
mod tests;
