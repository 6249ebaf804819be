use super::{put, ModelError};
use crate::datastore::Row;
use crate::query::BindMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::Ipv4Addr;

/// Door controller installed at an access point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceModel {
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub local: Option<String>,
    #[serde(default)]
    pub ip: Option<Ipv4Addr>,
}

impl DeviceModel {
    /// Values identifying the device: `mac` and `local` only.
    pub fn lookup_values(&self) -> BindMap {
        let mut map = BindMap::new();
        put(&mut map, "mac", self.mac.clone());
        put(&mut map, "local", self.local.clone());
        map
    }

    pub fn from_row(row: &Row) -> Result<Self, ModelError> {
        let text = |key: &str| row.get(key).and_then(Value::as_str).map(str::to_string);
        let ip = match text("ip") {
            Some(ip) => Some(ip.parse().map_err(|_| ModelError::InvalidRow {
                message: format!("ip invalido: {}", ip),
            })?),
            None => None,
        };
        Ok(Self {
            mac: text("mac"),
            local: text("local"),
            ip,
        })
    }
}
