use super::{check_email, check_length, put, ModelError, PermissionLevel};
use crate::query::BindMap;
use crate::utils::{generate_id, password_digest};
use crate::vision::{EncodingError, FeatureVector, ENCODING_LEN};
use serde::{Deserialize, Serialize};

/// Full user record. Every field is optional so the same type serves as
/// insert data, lookup filter and update patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matricula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub senha: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_level: Option<PermissionLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encodings: Option<String>,
}

const NOME_MAX: usize = 100;
const ALIAS_MAX: usize = 11;
const TEXT_MAX: usize = 255;

impl UserModel {
    /// Checks the fields that are set: email format and column lengths.
    pub fn validate(&self) -> Result<(), ModelError> {
        if let Some(email) = &self.email {
            check_email(email)?;
        }
        check_length("nome", self.nome.as_deref(), NOME_MAX)?;
        check_length("alias", self.alias.as_deref(), ALIAS_MAX)?;
        check_length("email", self.email.as_deref(), TEXT_MAX)?;
        check_length("matricula", self.matricula.as_deref(), TEXT_MAX)?;
        check_length("icon_path", self.icon_path.as_deref(), TEXT_MAX)?;
        Ok(())
    }

    /// Like [`UserModel::validate`], but a new user must also carry every
    /// field needed to log in and to be audited later.
    pub fn validate_new(&self) -> Result<(), ModelError> {
        let required = [
            ("nome", &self.nome),
            ("alias", &self.alias),
            ("email", &self.email),
            ("senha", &self.senha),
        ];
        for (field, value) in required {
            match value.as_deref() {
                Some(v) if !v.trim().is_empty() => {}
                _ => return Err(ModelError::MissingField { field }),
            }
        }
        self.validate()
    }

    /// Assigns a fresh id unless one is set.
    pub fn ensure_id(&mut self) -> &str {
        self.id.get_or_insert_with(generate_id)
    }

    /// Stores `encoding` in its text form. Must hold exactly
    /// [`ENCODING_LEN`] values.
    pub fn set_encoding(&mut self, encoding: &FeatureVector) -> Result<(), EncodingError> {
        let len = encoding.as_slice().len();
        if len != ENCODING_LEN {
            return Err(EncodingError::Incomplete { len });
        }
        self.encodings = Some(encoding.to_text());
        Ok(())
    }

    /// Column values for the fields that are set. The password is always
    /// bound as its SHA-256 digest.
    pub fn bind_values(&self) -> BindMap {
        let mut map = BindMap::new();
        put(&mut map, "id", self.id.clone());
        put(&mut map, "nome", self.nome.clone());
        put(&mut map, "alias", self.alias.clone());
        put(&mut map, "cpf", self.cpf.clone());
        put(&mut map, "email", self.email.clone());
        put(&mut map, "matricula", self.matricula.clone());
        put(&mut map, "senha", self.senha.as_deref().map(password_digest));
        put(&mut map, "icon_path", self.icon_path.clone());
        put(&mut map, "permission_level", self.permission_level.map(|p| p.as_str()));
        put(&mut map, "encodings", self.encodings.clone());
        map
    }
}
