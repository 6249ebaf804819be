//! Configuration errors raised by the command wrappers themselves.

use std::fmt::{Display, Formatter};

/// Programmer errors detected before a wrapped operation runs.
///
/// These are returned as `Err` and never folded into an [`Outcome`](super::Outcome).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// No operation was attached to the command nor supplied at call time.
    NoOperation { command: &'static str },
    /// A query was handed to the executor before any build method ran.
    UnbuiltQuery { table: String },
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoOperation { command } => {
                write!(f, "no operation supplied for execution of {}", command)
            }
            Self::UnbuiltQuery { table } => {
                write!(f, "query on table {:?} has no built statement", table)
            }
        }
    }
}

impl std::error::Error for CommandError {}
