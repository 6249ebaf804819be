//! Table names and the bootstrap schema for the access-control tables.

use crate::query::{check_identifier, QueryError};
use serde::{Deserialize, Serialize};

/// Names of the three tables the backend works with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TableNames {
    /// User profiles.
    #[serde(default = "default_profiles")]
    pub perfis: String,
    /// Door controllers.
    #[serde(default = "default_devices")]
    pub dispositivos: String,
    /// Access and action history.
    #[serde(default = "default_history")]
    pub historico: String,
}

fn default_profiles() -> String {
    "perfis".to_string()
}

fn default_devices() -> String {
    "dispositivos".to_string()
}

fn default_history() -> String {
    "historico".to_string()
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            perfis: default_profiles(),
            dispositivos: default_devices(),
            historico: default_history(),
        }
    }
}

/// DDL creating any missing table.
pub fn schema_sql(tables: &TableNames) -> Result<String, QueryError> {
    check_identifier(&tables.perfis)?;
    check_identifier(&tables.dispositivos)?;
    check_identifier(&tables.historico)?;

    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {perfis} (
            id TEXT PRIMARY KEY,
            nome TEXT,
            alias TEXT,
            cpf TEXT,
            email TEXT UNIQUE,
            matricula TEXT,
            senha TEXT,
            icon_path TEXT,
            permission_level TEXT NOT NULL DEFAULT 'discente',
            encodings TEXT
        );
        CREATE TABLE IF NOT EXISTS {dispositivos} (
            mac TEXT NOT NULL,
            local TEXT,
            ip TEXT
        );
        CREATE TABLE IF NOT EXISTS {historico} (
            registro INTEGER PRIMARY KEY AUTOINCREMENT,
            nome TEXT NOT NULL,
            alias TEXT NOT NULL,
            id TEXT,
            email TEXT NOT NULL,
            matricula TEXT,
            permission_level TEXT NOT NULL,
            mac TEXT,
            ip TEXT,
            local TEXT,
            trust INTEGER NOT NULL DEFAULT 0,
            data_acesso TEXT NOT NULL,
            horario_acesso TEXT NOT NULL,
            log TEXT
        );",
        perfis = tables.perfis,
        dispositivos = tables.dispositivos,
        historico = tables.historico,
    ))
}
