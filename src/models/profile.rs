use super::{ModelError, PermissionLevel, UserModel};
use crate::datastore::Row;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Columns loaded when profiles are read for face matching.
pub const PROFILE_COLUMNS: &[&str] = &[
    "id",
    "nome",
    "alias",
    "email",
    "matricula",
    "icon_path",
    "permission_level",
    "encodings",
];

/// User record without sensitive fields (cpf, senha).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub matricula: Option<String>,
    #[serde(default)]
    pub icon_path: Option<String>,
    #[serde(default)]
    pub permission_level: PermissionLevel,
    #[serde(default)]
    pub encodings: Option<String>,
}

impl Profile {
    /// Reads a profile out of a `perfis` row; unknown columns are ignored.
    pub fn from_row(row: &Row) -> Result<Self, ModelError> {
        let mut row = row.clone();
        if let Some(Value::Number(id)) = row.get("id") {
            let id = id.to_string();
            row.insert("id".to_string(), Value::String(id));
        }
        if row.get("permission_level").is_some_and(Value::is_null) {
            row.remove("permission_level");
        }
        serde_json::from_value(Value::Object(row)).map_err(|e| ModelError::InvalidRow {
            message: e.to_string(),
        })
    }

    pub fn from_user(user: &UserModel) -> Result<Self, ModelError> {
        let id = user
            .id
            .clone()
            .ok_or(ModelError::MissingField { field: "id" })?;
        Ok(Self {
            id,
            nome: user.nome.clone(),
            alias: user.alias.clone(),
            email: user.email.clone(),
            matricula: user.matricula.clone(),
            icon_path: user.icon_path.clone(),
            permission_level: user.permission_level.unwrap_or_default(),
            encodings: None,
        })
    }

    pub fn without_encodings(mut self) -> Self {
        self.encodings = None;
        self
    }

    pub fn display_alias(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.id)
    }
}
