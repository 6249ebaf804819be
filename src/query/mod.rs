//! Dynamic, parameterized SQL statement builder.
//!
//! A [`QueryModel`] describes a statement intent (table, columns, equality
//! values, extra condition) and derives the SQL text plus a bind map whose
//! keys match the `:name` placeholders in that text. Values never appear in
//! the SQL itself; identifiers are checked before they are interpolated.

mod errors;

pub use errors::QueryError;

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Insertion-ordered map of placeholder name to bound value.
pub type BindMap = Map<String, Value>;

/// Prefix applied to SET-clause placeholders in UPDATE statements.
pub const SET_PREFIX: &str = "set_";

/// Column selection for SELECT statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Columns {
    All,
    List(Vec<String>),
    /// Pre-joined column expression used verbatim.
    Raw(String),
}

impl From<Vec<String>> for Columns {
    fn from(columns: Vec<String>) -> Self {
        Self::List(columns)
    }
}

impl From<&[&str]> for Columns {
    fn from(columns: &[&str]) -> Self {
        Self::List(columns.iter().map(|c| c.to_string()).collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryModel {
    pub table: String,
    pub columns: Option<Columns>,
    /// Raw SQL fragment appended to the WHERE clause.
    pub condition: Option<String>,
    pub values: Option<BindMap>,
    query: Option<String>,
}

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
            .expect("identifier pattern must compile")
    })
}

pub(crate) fn check_identifier(name: &str) -> Result<(), QueryError> {
    if identifier_pattern().is_match(name) {
        Ok(())
    } else {
        Err(QueryError::InvalidIdentifier {
            name: name.to_string(),
        })
    }
}

/// `k1 = :k1`, `k2 = :k2`, ... for every key of `values`.
fn equality_terms(values: &BindMap) -> Result<Vec<String>, QueryError> {
    values
        .keys()
        .map(|key| {
            check_identifier(key)?;
            Ok(format!("{} = :{}", key, key))
        })
        .collect()
}

fn non_empty<'a>(
    values: Option<&'a BindMap>,
    operation: &'static str,
) -> Result<&'a BindMap, QueryError> {
    match values {
        Some(values) if !values.is_empty() => Ok(values),
        _ => Err(QueryError::MissingValues { operation }),
    }
}

impl QueryModel {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    pub fn with_columns(mut self, columns: impl Into<Columns>) -> Self {
        self.columns = Some(columns.into());
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_values(mut self, values: BindMap) -> Self {
        self.values = Some(values);
        self
    }

    /// Statement text produced by the last build call.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Bind values for the last built statement.
    pub fn binds(&self) -> BindMap {
        self.values.clone().unwrap_or_default()
    }

    /// Builds `SELECT <columns> FROM <table> [WHERE ...]`.
    ///
    /// `values`, when given, replaces the model's equality values. Equality
    /// terms come first, then the free-form condition, joined with AND.
    pub fn select(&mut self, values: Option<BindMap>) -> Result<&str, QueryError> {
        if values.is_some() {
            self.values = values;
        }
        check_identifier(&self.table)?;

        let columns = match self.columns.get_or_insert(Columns::All) {
            Columns::All => "*".to_string(),
            Columns::List(list) if list.is_empty() => return Err(QueryError::EmptyColumns),
            Columns::List(list) => {
                for column in list.iter() {
                    check_identifier(column)?;
                }
                list.join(", ")
            }
            Columns::Raw(raw) if raw.trim().is_empty() => return Err(QueryError::EmptyColumns),
            Columns::Raw(raw) => raw.clone(),
        };

        let mut where_parts = match &self.values {
            Some(values) => equality_terms(values)?,
            None => Vec::new(),
        };
        if let Some(condition) = &self.condition {
            where_parts.push(condition.clone());
        }

        let mut query = format!("SELECT {} FROM {}", columns, self.table);
        if !where_parts.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&where_parts.join(" AND "));
        }
        Ok(self.store(query))
    }

    /// Builds `INSERT INTO <table> (<cols>) VALUES (:<cols>)`.
    pub fn insert(&mut self) -> Result<&str, QueryError> {
        check_identifier(&self.table)?;
        let values = non_empty(self.values.as_ref(), "insert")?;
        let mut columns = Vec::with_capacity(values.len());
        for key in values.keys() {
            check_identifier(key)?;
            columns.push(key.as_str());
        }
        let placeholders: Vec<String> = columns.iter().map(|c| format!(":{}", c)).collect();
        let query = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            columns.join(", "),
            placeholders.join(", ")
        );
        Ok(self.store(query))
    }

    /// Builds `DELETE FROM <table> WHERE ...`; a WHERE map is mandatory.
    pub fn delete(&mut self) -> Result<&str, QueryError> {
        check_identifier(&self.table)?;
        let values = non_empty(self.values.as_ref(), "delete")?;
        let where_clause = equality_terms(values)?.join(" AND ");
        let query = format!("DELETE FROM {} WHERE {}", self.table, where_clause);
        Ok(self.store(query))
    }

    /// Builds `UPDATE <table> SET k = :set_k ... WHERE ...`.
    ///
    /// This model's values select the rows; `new_values.values` are the new
    /// data. The resulting bind map holds the prefixed SET values followed by
    /// the WHERE values, which win on key collision.
    pub fn update(&mut self, new_values: &QueryModel) -> Result<&str, QueryError> {
        check_identifier(&self.table)?;
        let where_values = non_empty(self.values.as_ref(), "update")?;
        let set_values = match new_values.values.as_ref() {
            Some(values) if !values.is_empty() => values,
            _ => return Err(QueryError::MissingSetValues),
        };

        let mut set_terms = Vec::with_capacity(set_values.len());
        for key in set_values.keys() {
            check_identifier(key)?;
            set_terms.push(format!("{} = :{}{}", key, SET_PREFIX, key));
        }
        let where_clause = equality_terms(where_values)?.join(" AND ");

        let mut binds = BindMap::new();
        for (key, value) in set_values {
            binds.insert(format!("{}{}", SET_PREFIX, key), value.clone());
        }
        for (key, value) in where_values {
            binds.insert(key.clone(), value.clone());
        }

        let query = format!(
            "UPDATE {} SET {} WHERE {}",
            self.table,
            set_terms.join(", "),
            where_clause
        );
        self.values = Some(binds);
        Ok(self.store(query))
    }

    /// Builds `SELECT COUNT(*) AS total FROM <table> [WHERE ...]`.
    ///
    /// Only one clause source applies: equality values when present,
    /// otherwise the free-form condition.
    pub fn count(&mut self) -> Result<&str, QueryError> {
        check_identifier(&self.table)?;
        let where_clause = match (&self.values, &self.condition) {
            (Some(values), _) if !values.is_empty() => Some(equality_terms(values)?.join(" AND ")),
            (_, Some(condition)) => Some(condition.clone()),
            _ => None,
        };

        let mut query = format!("SELECT COUNT(*) AS total FROM {}", self.table);
        if let Some(where_clause) = where_clause {
            query.push_str(" WHERE ");
            query.push_str(&where_clause);
        }
        Ok(self.store(query))
    }

    fn store(&mut self, query: String) -> &str {
        self.query.insert(query).as_str()
    }
}

/// Builds a bind map from `(key, value)` pairs, keeping their order.
pub fn binds<K, V, I>(pairs: I) -> BindMap
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
#[path = "tests/query_model_tests.rs"]
mod tests;
