//! Asynchronous single-shot command wrapper.

use super::errors::CommandError;
use super::fault::contain_async;
use super::outcome::Outcome;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;

/// Deferred asynchronous operation wrapped by an [`AsyncCommand`].
pub type AsyncOperation<T, E> =
    Box<dyn FnMut() -> BoxFuture<'static, anyhow::Result<Outcome<T, E>>> + Send>;

/// Asynchronous variant of [`Command`](super::Command).
///
/// Suspends only while awaiting the wrapped operation. Executions take
/// `&mut self`, so a single instance never has two executions in flight.
pub struct AsyncCommand<T, E = String> {
    operation: Option<AsyncOperation<T, E>>,
    result: Option<Outcome<T, E>>,
}

impl<T, E> Default for AsyncCommand<T, E> {
    fn default() -> Self {
        Self {
            operation: None,
            result: None,
        }
    }
}

fn boxed<T, E, F, Fut>(mut operation: F) -> AsyncOperation<T, E>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = anyhow::Result<Outcome<T, E>>> + Send + 'static,
{
    Box::new(move || operation().boxed())
}

impl<T, E> AsyncCommand<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + From<String> + Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_operation<F, Fut>(operation: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<Outcome<T, E>>> + Send + 'static,
    {
        Self {
            operation: Some(boxed(operation)),
            result: None,
        }
    }

    pub fn last_result(&self) -> Option<&Outcome<T, E>> {
        self.result.as_ref()
    }

    /// Awaits the stored operation.
    pub async fn execute_async(&mut self) -> Result<Outcome<T, E>, CommandError> {
        let operation = self.operation.as_mut().ok_or(CommandError::NoOperation {
            command: "AsyncCommand",
        })?;
        let outcome = contain_async(async { operation().await }).await;
        self.result = Some(outcome.clone());
        Ok(outcome)
    }

    /// Replaces the stored operation and awaits it.
    pub async fn execute_async_with<F, Fut>(
        &mut self,
        operation: F,
    ) -> Result<Outcome<T, E>, CommandError>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<Outcome<T, E>>> + Send + 'static,
    {
        self.operation = Some(boxed(operation));
        self.execute_async().await
    }

    /// Binds `param` to a one-argument operation, stores it, and awaits it once.
    pub async fn execute_async_with_param<P, F, Fut>(
        &mut self,
        param: P,
        mut operation: F,
    ) -> Result<Outcome<T, E>, CommandError>
    where
        P: Clone + Send + 'static,
        F: FnMut(P) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<Outcome<T, E>>> + Send + 'static,
    {
        self.execute_async_with(move || operation(param.clone()))
            .await
    }
}

#[cfg(test)]
#[path = "tests/async_command_tests.rs"]
mod tests;
