//! Asynchronous multi-result command wrapper.
//!
//! A [`StreamCommand`] drives a lazy, finite producer of outcomes and forwards
//! each element to its caller. The first producer fault (an `Err` item or a
//! panic while polling) is reported as one final critical failure, after which
//! the producer is never polled again.

use super::errors::CommandError;
use super::fault::{catch_panic, failure_from_error, failure_from_panic};
use super::outcome::Outcome;
use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

/// Items yielded by a producer: an outcome, or a fault that ends the stream.
pub type ProducedOutcome<T, E> = anyhow::Result<Outcome<T, E>>;

/// Factory for a fresh producer stream on each execution.
pub type Producer<T, E> = Box<dyn FnMut() -> BoxStream<'static, ProducedOutcome<T, E>> + Send>;

pub struct StreamCommand<T, E = String> {
    producer: Option<Producer<T, E>>,
    result: Arc<Mutex<Option<Outcome<T, E>>>>,
}

impl<T, E> Default for StreamCommand<T, E> {
    fn default() -> Self {
        Self {
            producer: None,
            result: Arc::new(Mutex::new(None)),
        }
    }
}

struct Forwarding<T, E> {
    inner: BoxStream<'static, ProducedOutcome<T, E>>,
    finished: bool,
    last: Arc<Mutex<Option<Outcome<T, E>>>>,
}

impl<T, E> StreamCommand<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + From<String> + Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_producer<F, S>(mut producer: F) -> Self
    where
        F: FnMut() -> S + Send + 'static,
        S: Stream<Item = ProducedOutcome<T, E>> + Send + 'static,
    {
        Self {
            producer: Some(Box::new(move || producer().boxed())),
            result: Arc::new(Mutex::new(None)),
        }
    }

    /// Last element forwarded by the most recent stream.
    pub fn last_result(&self) -> Option<Outcome<T, E>> {
        self.result.lock().ok().and_then(|last| last.clone())
    }

    /// Starts the stored producer and returns the forwarding stream.
    ///
    /// The returned stream is single-pass; call again for a new run.
    pub fn execute_stream(&mut self) -> Result<BoxStream<'static, Outcome<T, E>>, CommandError> {
        let producer = self.producer.as_mut().ok_or(CommandError::NoOperation {
            command: "StreamCommand",
        })?;

        let inner = match panic::catch_unwind(AssertUnwindSafe(|| producer())) {
            Ok(inner) => inner,
            Err(payload) => {
                let failure: Outcome<T, E> = failure_from_panic(payload);
                if let Ok(mut last) = self.result.lock() {
                    *last = Some(failure.clone());
                }
                return Ok(stream::once(async move { failure }).boxed());
            }
        };

        let state = Forwarding {
            inner,
            finished: false,
            last: self.result.clone(),
        };

        Ok(stream::unfold(state, |mut state| async move {
            if state.finished {
                return None;
            }
            let outcome = match catch_panic(state.inner.next()).await {
                Ok(Some(Ok(outcome))) => outcome,
                Ok(Some(Err(error))) => {
                    state.finished = true;
                    failure_from_error(&error)
                }
                Ok(None) => return None,
                Err(payload) => {
                    state.finished = true;
                    failure_from_panic(payload)
                }
            };
            if let Ok(mut last) = state.last.lock() {
                *last = Some(outcome.clone());
            }
            Some((outcome, state))
        })
        .boxed())
    }

    /// Replaces the stored producer and starts it.
    pub fn execute_stream_with<F, S>(
        &mut self,
        mut producer: F,
    ) -> Result<BoxStream<'static, Outcome<T, E>>, CommandError>
    where
        F: FnMut() -> S + Send + 'static,
        S: Stream<Item = ProducedOutcome<T, E>> + Send + 'static,
    {
        self.producer = Some(Box::new(move || producer().boxed()));
        self.execute_stream()
    }
}

#[cfg(test)]
#[path = "tests/stream_command_tests.rs"]
mod tests;
