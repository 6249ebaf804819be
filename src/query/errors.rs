use std::fmt::{Display, Formatter};

/// Misuse of the statement builder, detected before any SQL is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Table, column or bind key is not a plain SQL identifier.
    InvalidIdentifier { name: String },
    /// The operation needs a non-empty `values` map.
    MissingValues { operation: &'static str },
    /// UPDATE was given no data for its SET clause.
    MissingSetValues,
    /// Column selection resolved to nothing.
    EmptyColumns,
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIdentifier { name } => write!(f, "invalid SQL identifier: {:?}", name),
            Self::MissingValues { operation } => {
                write!(f, "{} requires a non-empty values map", operation)
            }
            Self::MissingSetValues => write!(f, "update requires a non-empty map of new values"),
            Self::EmptyColumns => write!(f, "column selection is empty"),
        }
    }
}

impl std::error::Error for QueryError {}
