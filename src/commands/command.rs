//! Synchronous command wrapper.

use super::errors::CommandError;
use super::fault::contain;
use super::outcome::Outcome;

/// Deferred zero-argument operation wrapped by a [`Command`].
pub type Operation<T, E> = Box<dyn FnMut() -> anyhow::Result<Outcome<T, E>> + Send>;

/// Runs a deferred operation and converts any fault into a failure outcome.
///
/// The last outcome is kept until the next execution overwrites it.
pub struct Command<T, E = String> {
    operation: Option<Operation<T, E>>,
    result: Option<Outcome<T, E>>,
}

impl<T, E> Default for Command<T, E> {
    fn default() -> Self {
        Self {
            operation: None,
            result: None,
        }
    }
}

impl<T, E> Command<T, E>
where
    T: Clone,
    E: Clone + From<String>,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_operation<F>(operation: F) -> Self
    where
        F: FnMut() -> anyhow::Result<Outcome<T, E>> + Send + 'static,
    {
        Self {
            operation: Some(Box::new(operation)),
            result: None,
        }
    }

    /// Outcome of the most recent execution, if any.
    pub fn last_result(&self) -> Option<&Outcome<T, E>> {
        self.result.as_ref()
    }

    /// Runs the stored operation.
    pub fn execute(&mut self) -> Result<Outcome<T, E>, CommandError> {
        let operation = self
            .operation
            .as_mut()
            .ok_or(CommandError::NoOperation { command: "Command" })?;
        let outcome = contain(operation);
        self.result = Some(outcome.clone());
        Ok(outcome)
    }

    /// Replaces the stored operation and runs it.
    pub fn execute_with<F>(&mut self, operation: F) -> Result<Outcome<T, E>, CommandError>
    where
        F: FnMut() -> anyhow::Result<Outcome<T, E>> + Send + 'static,
    {
        self.operation = Some(Box::new(operation));
        self.execute()
    }

    /// Binds `param` to a one-argument operation, stores the bound operation
    /// and runs it once.
    ///
    /// The operation receives the parameter exactly once per execution; a
    /// later [`execute`](Self::execute) replays it with the same parameter.
    pub fn execute_with_param<P, F>(
        &mut self,
        param: P,
        mut operation: F,
    ) -> Result<Outcome<T, E>, CommandError>
    where
        P: Clone + Send + 'static,
        F: FnMut(P) -> anyhow::Result<Outcome<T, E>> + Send + 'static,
    {
        self.execute_with(move || operation(param.clone()))
    }
}

#[cfg(test)]
#[path = "tests/command_tests.rs"]
mod tests;
