use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Access level, stored in lower case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    #[default]
    Discente,
    Docente,
    Administrador,
}

impl PermissionLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Discente => "discente",
            Self::Docente => "docente",
            Self::Administrador => "administrador",
        }
    }
}

impl Display for PermissionLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "discente" => Ok(Self::Discente),
            "docente" => Ok(Self::Docente),
            "administrador" => Ok(Self::Administrador),
            other => Err(format!("nivel de permissao desconhecido: {}", other)),
        }
    }
}
