//! Conversion of faults into failure outcomes.
//!
//! This is the single place where errors and panics raised inside wrapped
//! operations are turned into `Outcome::Failure` values.

use super::outcome::Outcome;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

/// Log label attached to failures synthesized from a fault.
pub const FAULT_LOG: &str = "Erro na execucao do comando";

/// Builds the critical failure reported for a fault.
///
/// The failure value is the top-level message; details carry the full chain.
pub fn failure_from_error<T, E: From<String>>(error: &anyhow::Error) -> Outcome<T, E> {
    tracing::error!(error = %format!("{:#}", error), "command operation faulted");
    Outcome::fault(E::from(error.to_string()))
        .with_details(format!("{:#}", error))
        .with_log(FAULT_LOG)
}

pub(crate) fn failure_from_panic<T, E: From<String>>(
    payload: Box<dyn Any + Send>,
) -> Outcome<T, E> {
    let message = panic_message(payload.as_ref());
    tracing::error!(panic = %message, "command operation panicked");
    Outcome::fault(E::from(message.clone()))
        .with_details(format!("panic: {}", message))
        .with_log(FAULT_LOG)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "operation panicked".to_string()
    }
}

/// Runs a synchronous operation, containing errors and panics.
pub fn contain<T, E, F>(operation: F) -> Outcome<T, E>
where
    E: From<String>,
    F: FnOnce() -> anyhow::Result<Outcome<T, E>>,
{
    match panic::catch_unwind(AssertUnwindSafe(operation)) {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(error)) => failure_from_error(&error),
        Err(payload) => failure_from_panic(payload),
    }
}

/// Awaits an asynchronous operation, containing errors and panics.
pub async fn contain_async<T, E, Fut>(operation: Fut) -> Outcome<T, E>
where
    E: From<String>,
    Fut: Future<Output = anyhow::Result<Outcome<T, E>>>,
{
    match AssertUnwindSafe(operation).catch_unwind().await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(error)) => failure_from_error(&error),
        Err(payload) => failure_from_panic(payload),
    }
}

/// Awaits a future, returning the panic payload instead of unwinding.
pub(crate) async fn catch_panic<T, Fut>(operation: Fut) -> Result<T, Box<dyn Any + Send>>
where
    Fut: Future<Output = T>,
{
    AssertUnwindSafe(operation).catch_unwind().await
}
