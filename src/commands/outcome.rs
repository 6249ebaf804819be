//! Tri-state outcome values returned by every effectful operation.
//!
//! An [`Outcome`] is either a settled `Success`, a settled `Failure`, or a
//! `Running` progress marker emitted while a multi-step workflow is still in
//! flight. Values are immutable once built: the `with_*` helpers consume the
//! outcome and return a new one.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

/// Outcome of an effect: success, failure, or in-progress marker.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T, E = String> {
    Success {
        value: T,
        details: Option<String>,
        log: Option<String>,
    },
    Failure {
        value: E,
        details: Option<String>,
        log: Option<String>,
        /// Set for execution faults; unset for recognized domain rejections.
        critical: bool,
    },
    Running {
        value: T,
    },
}

/// Returned by [`Outcome::fold_settled`] when the outcome is still `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnhandledRunning;

impl Display for UnhandledRunning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "running outcome folded without a running handler")
    }
}

impl std::error::Error for UnhandledRunning {}

impl<T, E> Outcome<T, E> {
    pub fn success(value: T) -> Self {
        Self::Success {
            value,
            details: None,
            log: None,
        }
    }

    /// Non-critical failure (domain rejection).
    pub fn failure(value: E) -> Self {
        Self::Failure {
            value,
            details: None,
            log: None,
            critical: false,
        }
    }

    /// Critical failure (execution fault).
    pub fn fault(value: E) -> Self {
        Self::Failure {
            value,
            details: None,
            log: None,
            critical: true,
        }
    }

    pub fn running(value: T) -> Self {
        Self::Running { value }
    }

    /// Returns a copy carrying `details`. No-op on `Running`.
    pub fn with_details(self, details: impl Into<String>) -> Self {
        let details = Some(details.into());
        match self {
            Self::Success { value, log, .. } => Self::Success {
                value,
                details,
                log,
            },
            Self::Failure {
                value,
                log,
                critical,
                ..
            } => Self::Failure {
                value,
                details,
                log,
                critical,
            },
            running @ Self::Running { .. } => running,
        }
    }

    /// Returns a copy carrying `log`. No-op on `Running`.
    pub fn with_log(self, log: impl Into<String>) -> Self {
        let log = Some(log.into());
        match self {
            Self::Success { value, details, .. } => Self::Success {
                value,
                details,
                log,
            },
            Self::Failure {
                value,
                details,
                critical,
                ..
            } => Self::Failure {
                value,
                details,
                log,
                critical,
            },
            running @ Self::Running { .. } => running,
        }
    }

    /// Returns a copy with the critical flag set. Only meaningful on `Failure`.
    pub fn with_critical(self, critical: bool) -> Self {
        match self {
            Self::Failure {
                value,
                details,
                log,
                ..
            } => Self::Failure {
                value,
                details,
                log,
                critical,
            },
            other => other,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    /// True only for a failure flagged as an execution fault.
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Failure { critical: true, .. })
    }

    pub fn success_or_none(&self) -> Option<&T> {
        match self {
            Self::Success { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn failure_or_none(&self) -> Option<&E> {
        match self {
            Self::Failure { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn running_or_none(&self) -> Option<&T> {
        match self {
            Self::Running { value } => Some(value),
            _ => None,
        }
    }

    /// Consumes the outcome, keeping the payload only if it is a `Success`.
    pub fn into_success(self) -> Option<T> {
        match self {
            Self::Success { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn details(&self) -> Option<&str> {
        match self {
            Self::Success { details, .. } | Self::Failure { details, .. } => details.as_deref(),
            Self::Running { .. } => None,
        }
    }

    pub fn log(&self) -> Option<&str> {
        match self {
            Self::Success { log, .. } | Self::Failure { log, .. } => log.as_deref(),
            Self::Running { .. } => None,
        }
    }

    /// Exhaustive dispatch over the three variants.
    pub fn fold<R>(
        self,
        on_success: impl FnOnce(T) -> R,
        on_failure: impl FnOnce(E) -> R,
        on_running: impl FnOnce(T) -> R,
    ) -> R {
        match self {
            Self::Success { value, .. } => on_success(value),
            Self::Failure { value, .. } => on_failure(value),
            Self::Running { value } => on_running(value),
        }
    }

    /// Dispatch for settled outcomes only.
    ///
    /// Folding a `Running` value here is a programming error and yields
    /// [`UnhandledRunning`].
    pub fn fold_settled<R>(
        self,
        on_success: impl FnOnce(T) -> R,
        on_failure: impl FnOnce(E) -> R,
    ) -> Result<R, UnhandledRunning> {
        match self {
            Self::Success { value, .. } => Ok(on_success(value)),
            Self::Failure { value, .. } => Ok(on_failure(value)),
            Self::Running { .. } => Err(UnhandledRunning),
        }
    }

    /// Transforms the `Success`/`Running` payload; `Failure` passes through untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U, E> {
        match self {
            Self::Success {
                value,
                details,
                log,
            } => Outcome::Success {
                value: f(value),
                details,
                log,
            },
            Self::Failure {
                value,
                details,
                log,
                critical,
            } => Outcome::Failure {
                value,
                details,
                log,
                critical,
            },
            Self::Running { value } => Outcome::Running { value: f(value) },
        }
    }

    /// Transforms the `Failure` payload; other variants pass through untouched.
    pub fn map_failure<F>(self, f: impl FnOnce(E) -> F) -> Outcome<T, F> {
        match self {
            Self::Success {
                value,
                details,
                log,
            } => Outcome::Success {
                value,
                details,
                log,
            },
            Self::Failure {
                value,
                details,
                log,
                critical,
            } => Outcome::Failure {
                value: f(value),
                details,
                log,
                critical,
            },
            Self::Running { value } => Outcome::Running { value },
        }
    }

    /// Short label of the active variant, used in logs and wire records.
    pub fn state_name(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::Failure { .. } => "failure",
            Self::Running { .. } => "running",
        }
    }
}

impl<T> Outcome<T, T> {
    /// Payload of whichever variant is active.
    pub fn value(&self) -> &T {
        match self {
            Self::Success { value, .. } | Self::Failure { value, .. } | Self::Running { value } => {
                value
            }
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Success { value, .. } | Self::Failure { value, .. } | Self::Running { value } => {
                value
            }
        }
    }
}

impl<T: Serialize, E: Serialize> Outcome<T, E> {
    /// Flattens the active variant into a plain field map for transport.
    ///
    /// `details` and `log` are omitted when absent; `critical` is only
    /// present on failures.
    pub fn to_map(&self) -> serde_json::Result<Map<String, Value>> {
        let mut map = Map::new();
        match self {
            Self::Success {
                value,
                details,
                log,
            } => {
                map.insert("value".to_string(), serde_json::to_value(value)?);
                insert_text(&mut map, "details", details);
                insert_text(&mut map, "log", log);
            }
            Self::Failure {
                value,
                details,
                log,
                critical,
            } => {
                map.insert("value".to_string(), serde_json::to_value(value)?);
                insert_text(&mut map, "details", details);
                insert_text(&mut map, "log", log);
                map.insert("critical".to_string(), Value::Bool(*critical));
            }
            Self::Running { value } => {
                map.insert("value".to_string(), serde_json::to_value(value)?);
            }
        }
        Ok(map)
    }
}

fn insert_text(map: &mut Map<String, Value>, key: &str, text: &Option<String>) {
    if let Some(text) = text {
        map.insert(key.to_string(), Value::String(text.clone()));
    }
}

impl<T: Display, E: Display> Display for Outcome<T, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success { value, .. } => write!(f, "Success({})", value),
            Self::Failure { value, .. } => write!(f, "Failure({})", value),
            Self::Running { value } => write!(f, "Running({})", value),
        }
    }
}

#[cfg(test)]
#[path = "tests/outcome_tests.rs"]
mod tests;
