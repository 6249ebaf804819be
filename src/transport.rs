//! Wire shape of outcomes: flat JSON records, status codes and the response
//! envelope.

use crate::commands::Outcome;
use crate::controller::AUTH_REFUSED_LOG;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Separator written after every streamed record.
pub const RECORD_SEPARATOR: &str = "\n\n";

pub const STATUS_OK: u16 = 200;
pub const STATUS_IN_PROGRESS: u16 = 102;
pub const STATUS_UNAUTHORIZED: u16 = 401;
pub const STATUS_FORBIDDEN: u16 = 403;
pub const STATUS_INTERNAL: u16 = 500;

/// HTTP-style status for an outcome.
///
/// Rejections are 403, or 401 when they carry the authentication refusal
/// log. Faults are 500. `Running` is never terminal.
pub fn status_code<T, E>(outcome: &Outcome<T, E>) -> u16 {
    match outcome {
        Outcome::Success { .. } => STATUS_OK,
        Outcome::Running { .. } => STATUS_IN_PROGRESS,
        Outcome::Failure { critical: true, .. } => STATUS_INTERNAL,
        Outcome::Failure { log, .. } if log.as_deref() == Some(AUTH_REFUSED_LOG) => {
            STATUS_UNAUTHORIZED
        }
        Outcome::Failure { .. } => STATUS_FORBIDDEN,
    }
}

/// One flat record: the outcome's field map plus its `state`.
pub fn wire_record<T: Serialize, E: Serialize>(
    outcome: &Outcome<T, E>,
) -> serde_json::Result<Map<String, Value>> {
    let mut record = Map::new();
    record.insert("state".to_string(), Value::String(outcome.state_name().to_string()));
    record.extend(outcome.to_map()?);
    Ok(record)
}

pub fn encode_record<T: Serialize, E: Serialize>(
    outcome: &Outcome<T, E>,
) -> serde_json::Result<String> {
    let record = wire_record(outcome)?;
    Ok(format!("{}{}", serde_json::to_string(&record)?, RECORD_SEPARATOR))
}

/// Writes each outcome of `stream` as it arrives and returns the last one.
pub async fn write_stream<S, T, E, W>(
    mut stream: S,
    writer: &mut W,
) -> anyhow::Result<Option<Outcome<T, E>>>
where
    S: Stream<Item = Outcome<T, E>> + Unpin,
    T: Serialize,
    E: Serialize,
    W: AsyncWrite + Unpin,
{
    let mut last = None;
    while let Some(outcome) = stream.next().await {
        writer.write_all(encode_record(&outcome)?.as_bytes()).await?;
        writer.flush().await?;
        last = Some(outcome);
    }
    Ok(last)
}

/// Envelope for single-shot results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub code: u16,
    pub log: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Response {
    pub fn from_outcome<T: Serialize>(outcome: &Outcome<T, String>) -> serde_json::Result<Self> {
        let code = status_code(outcome);
        let response = match outcome {
            Outcome::Success { value, details, log } => Self {
                code,
                log: log.clone().unwrap_or_else(|| "ok".to_string()),
                error: None,
                details: details.clone(),
                data: Some(serde_json::to_value(value)?),
            },
            Outcome::Failure {
                value, details, log, ..
            } => Self {
                code,
                log: log.clone().unwrap_or_else(|| value.clone()),
                error: Some(value.clone()),
                details: details.clone(),
                data: None,
            },
            Outcome::Running { value } => Self {
                code,
                log: "running".to_string(),
                error: None,
                details: None,
                data: Some(serde_json::to_value(value)?),
            },
        };
        Ok(response)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
