use super::{put, DeviceModel, ModelError, PermissionLevel, Profile};
use crate::query::BindMap;
use chrono::{Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::Ipv4Addr;

pub const DEFAULT_IP: Ipv4Addr = Ipv4Addr::new(0, 0, 0, 1);

/// One access or action entry in the history table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricModel {
    pub nome: String,
    pub alias: String,
    pub id: Option<String>,
    pub email: String,
    pub matricula: Option<String>,
    pub permission_level: PermissionLevel,
    pub mac: Option<String>,
    pub ip: Ipv4Addr,
    pub local: Option<String>,
    pub trust: i64,
    pub data_acesso: NaiveDate,
    pub horario_acesso: NaiveTime,
    pub log: Option<String>,
}

impl HistoricModel {
    /// Entry stamped with the current local date and time.
    pub fn new(
        nome: impl Into<String>,
        alias: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        let now = Local::now();
        Self {
            nome: nome.into(),
            alias: alias.into(),
            id: None,
            email: email.into(),
            matricula: None,
            permission_level: PermissionLevel::default(),
            mac: None,
            ip: DEFAULT_IP,
            local: None,
            trust: 0,
            data_acesso: now.date_naive(),
            horario_acesso: now.time(),
            log: None,
        }
    }

    pub fn from_profile(profile: &Profile) -> Result<Self, ModelError> {
        let nome = profile
            .nome
            .clone()
            .ok_or(ModelError::MissingField { field: "nome" })?;
        let alias = profile
            .alias
            .clone()
            .ok_or(ModelError::MissingField { field: "alias" })?;
        let email = profile
            .email
            .clone()
            .ok_or(ModelError::MissingField { field: "email" })?;

        let mut model = Self::new(nome, alias, email);
        model.id = Some(profile.id.clone());
        model.matricula = profile.matricula.clone();
        model.permission_level = profile.permission_level;
        Ok(model)
    }

    /// Copies the device fields that are set, for door-open audit entries.
    pub fn with_device(mut self, device: &DeviceModel) -> Self {
        if device.mac.is_some() {
            self.mac = device.mac.clone();
        }
        if device.local.is_some() {
            self.local = device.local.clone();
        }
        if let Some(ip) = device.ip {
            self.ip = ip;
        }
        self
    }

    pub fn with_trust(mut self, trust: i64) -> Self {
        self.trust = trust;
        self
    }

    pub fn set_log(&mut self, log: impl Into<String>) {
        self.log = Some(log.into());
    }

    pub fn bind_values(&self) -> BindMap {
        let mut map = BindMap::new();
        map.insert("nome".to_string(), Value::String(self.nome.clone()));
        map.insert("alias".to_string(), Value::String(self.alias.clone()));
        put(&mut map, "id", self.id.clone());
        map.insert("email".to_string(), Value::String(self.email.clone()));
        put(&mut map, "matricula", self.matricula.clone());
        map.insert(
            "permission_level".to_string(),
            Value::String(self.permission_level.as_str().to_string()),
        );
        put(&mut map, "mac", self.mac.clone());
        map.insert("ip".to_string(), Value::String(self.ip.to_string()));
        put(&mut map, "local", self.local.clone());
        map.insert("trust".to_string(), Value::from(self.trust));
        map.insert(
            "data_acesso".to_string(),
            Value::String(self.data_acesso.format("%Y-%m-%d").to_string()),
        );
        map.insert(
            "horario_acesso".to_string(),
            Value::String(self.horario_acesso.format("%H:%M:%S").to_string()),
        );
        put(&mut map, "log", self.log.clone());
        map
    }
}
