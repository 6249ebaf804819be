//! Data access on top of the query executor.

pub mod api;
pub mod database;
pub mod face;

pub use api::{AccessGrant, ApiRepository};
pub use database::DatabaseRepository;
pub use face::FaceMatch;

use crate::commands::Outcome;

/// Reports an inner failure under a caller-level message, keeping its
/// severity. The inner message and details move into `details`.
pub(crate) fn rewrap<T, U>(inner: &Outcome<U, String>, message: &str) -> Outcome<T, String> {
    let cause = match (inner.failure_or_none(), inner.details()) {
        (Some(value), Some(details)) => format!("{}: {}", value, details),
        (Some(value), None) => value.clone(),
        (None, _) => String::new(),
    };
    let mut failure = Outcome::failure(message.to_string()).with_critical(inner.is_critical());
    if !cause.is_empty() {
        failure = failure.with_details(cause);
    }
    match inner.log() {
        Some(log) => failure.with_log(log),
        None => failure,
    }
}
