use super::{check_email, ModelError, PermissionLevel};
use crate::query::BindMap;
use crate::utils::password_digest;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Credentials of an acting user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginModel {
    pub email: String,
    pub senha: String,
    #[serde(default = "default_permission")]
    pub permission_level: PermissionLevel,
}

fn default_permission() -> PermissionLevel {
    PermissionLevel::Administrador
}

impl LoginModel {
    pub fn new(email: impl Into<String>, senha: impl Into<String>) -> Result<Self, ModelError> {
        let login = Self {
            email: email.into(),
            senha: senha.into(),
            permission_level: default_permission(),
        };
        login.validate()?;
        Ok(login)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        check_email(&self.email)
    }

    /// `email` and the password digest; the plain password never leaves.
    pub fn bind_values(&self) -> BindMap {
        let mut map = BindMap::new();
        map.insert("email".to_string(), Value::String(self.email.clone()));
        map.insert("senha".to_string(), Value::String(password_digest(&self.senha)));
        map
    }

    /// Credentials plus the required permission level.
    pub fn permission_values(&self) -> BindMap {
        let mut map = self.bind_values();
        map.insert(
            "permission_level".to_string(),
            Value::String(self.permission_level.as_str().to_string()),
        );
        map
    }
}
