//! Domain records exchanged between the controller and the datastore.

pub mod device;
pub mod historic;
pub mod login;
pub mod permission;
pub mod profile;
pub mod user;

pub use device::DeviceModel;
pub use historic::HistoricModel;
pub use login::LoginModel;
pub use permission::PermissionLevel;
pub use profile::Profile;
pub use user::UserModel;

use crate::query::BindMap;
use crate::vision::EncodingError;
use regex::Regex;
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    MissingField { field: &'static str },
    InvalidEmail { email: String },
    TooLong { field: &'static str, max: usize },
    InvalidRow { message: String },
    Encoding(EncodingError),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField { field } => write!(f, "campo obrigatorio ausente: {}", field),
            Self::InvalidEmail { email } => write!(f, "email invalido: {:?}", email),
            Self::TooLong { field, max } => {
                write!(f, "campo {} excede {} caracteres", field, max)
            }
            Self::InvalidRow { message } => write!(f, "registro invalido: {}", message),
            Self::Encoding(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ModelError {}

impl From<EncodingError> for ModelError {
    fn from(e: EncodingError) -> Self {
        Self::Encoding(e)
    }
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
            .expect("email pattern must compile")
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

pub(crate) fn check_email(email: &str) -> Result<(), ModelError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ModelError::InvalidEmail {
            email: email.to_string(),
        })
    }
}

/// Rejects values longer than the column allows. Counts characters.
pub(crate) fn check_length(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<(), ModelError> {
    match value {
        Some(value) if value.chars().count() > max => Err(ModelError::TooLong { field, max }),
        _ => Ok(()),
    }
}

/// Inserts `value` under `key` when present.
pub(crate) fn put(map: &mut BindMap, key: &str, value: Option<impl Into<Value>>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value.into());
    }
}

#[cfg(test)]
#[path = "tests/models_tests.rs"]
mod tests;
