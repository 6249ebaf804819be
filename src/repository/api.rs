//! Domain-level repository: interprets rows as profiles, devices and
//! history entries.

use super::database::DatabaseRepository;
use super::face::{match_face_to_profiles, DEFAULT_TOLERANCE};
use super::rewrap;
use crate::commands::Outcome;
use crate::datastore::TableNames;
use crate::models::profile::PROFILE_COLUMNS;
use crate::models::{DeviceModel, HistoricModel, LoginModel, PermissionLevel, Profile, UserModel};
use crate::query::{BindMap, Columns, QueryModel};
use crate::vision::{FeatureVector, VisionService};
use std::sync::Arc;

/// Profile admitted through a door, with its match score in percent.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessGrant {
    pub profile: Profile,
    pub similarity: f64,
}

pub struct ApiRepository {
    db: DatabaseRepository,
    vision: Arc<dyn VisionService>,
    tables: TableNames,
    tolerance: f64,
}

impl ApiRepository {
    pub fn new(db: DatabaseRepository, vision: Arc<dyn VisionService>, tables: TableNames) -> Self {
        Self {
            db,
            vision,
            tables,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub async fn select_user_table(&self) -> Outcome<Vec<Profile>, String> {
        let query = QueryModel::new(&self.tables.perfis);
        let result = self.db.select(query).await;
        let Some(rows) = result.success_or_none() else {
            return rewrap(&result, "Erro ao coletar tabela de usuários");
        };

        let profiles: Result<Vec<Profile>, _> = rows.iter().map(Profile::from_row).collect();
        match profiles {
            Ok(profiles) => {
                Outcome::success(profiles).with_log("Tabela de usuários coletada com sucesso")
            }
            Err(e) => Outcome::fault("Erro ao coletar tabela de usuários".to_string())
                .with_details(e.to_string()),
        }
    }

    pub async fn insert_user_table(&self, user: &UserModel) -> Outcome<u64, String> {
        let query = QueryModel::new(&self.tables.perfis).with_values(user.bind_values());
        let result = self.db.insert(query).await;
        if result.is_failure() {
            return rewrap(&result, "Erro ao inserir usuário");
        }
        result.with_log("Usuário inserido com sucesso")
    }

    /// Updates the single user matching `filter`. Matching no row or more
    /// than one row is a rejection.
    pub async fn update_user_table(
        &self,
        filter: &UserModel,
        new_data: &UserModel,
    ) -> Outcome<u64, String> {
        let query = QueryModel::new(&self.tables.perfis).with_values(filter.bind_values());
        let new_query = QueryModel::new(&self.tables.perfis).with_values(new_data.bind_values());
        let result = self.db.update(query, &new_query).await;
        match result.success_or_none().copied() {
            None => rewrap(&result, "Erro ao atualizar usuário"),
            Some(0) => {
                Outcome::failure("Nenhum usuário foi atualizado".to_string()).with_details("0")
            }
            Some(n) if n >= 2 => {
                tracing::warn!(rows = n, "update matched more than one user");
                Outcome::failure("Mais de um usuário foi atualizado".to_string())
                    .with_details(n.to_string())
            }
            Some(n) => Outcome::success(n).with_log("Usuário atualizado com sucesso"),
        }
    }

    pub async fn delete_user_table(&self, filter: &UserModel) -> Outcome<u64, String> {
        let values = filter.bind_values();
        if values.is_empty() {
            return Outcome::failure("Erro ao ler dados do request".to_string());
        }
        let query = QueryModel::new(&self.tables.perfis).with_values(values);
        let result = self.db.delete(query).await;
        if result.is_failure() {
            return rewrap(&result, "Erro ao deletar usuário");
        }
        result.with_log("Usuário deletado com sucesso")
    }

    /// Looks up one profile by the given column values.
    pub async fn find_user(&self, filter: BindMap) -> Outcome<Profile, String> {
        if filter.is_empty() {
            return Outcome::failure("Erro ao ler dados do request".to_string());
        }
        let query = QueryModel::new(&self.tables.perfis).with_values(filter);
        let result = self.db.select_one(query).await;
        let row = match result.success_or_none() {
            Some(Some(row)) => row,
            Some(None) => {
                return Outcome::failure("Usuário não encontrado".to_string())
                    .with_log("Usuário não encontrado")
            }
            None => return rewrap(&result, "Erro ao encontrar usuário"),
        };
        match Profile::from_row(row) {
            Ok(profile) => Outcome::success(profile).with_log("Usuário encontrado com sucesso"),
            Err(e) => {
                Outcome::fault("Erro ao encontrar usuário".to_string()).with_details(e.to_string())
            }
        }
    }

    /// Whether `login` identifies an administrator.
    pub async fn user_is_admin(&self, login: &LoginModel) -> Outcome<bool, String> {
        let admin = LoginModel {
            permission_level: PermissionLevel::Administrador,
            ..login.clone()
        };
        let query = QueryModel::new(&self.tables.perfis).with_values(admin.permission_values());
        let result = self.db.count(query).await;
        match result.success_or_none() {
            Some(total) if *total > 0 => {
                Outcome::success(true).with_log("Usuário é um administrador")
            }
            Some(_) => Outcome::success(false).with_log("Usuário não é um administrador"),
            None => rewrap(&result, "Erro ao verificar permissões do usuário"),
        }
    }

    /// Identifies the person in front of `device` among registered profiles.
    pub async fn open_door(&self, device: &DeviceModel) -> Outcome<AccessGrant, String> {
        let lookup = device.lookup_values();
        if lookup.is_empty() {
            return Outcome::fault("Erro ao ler dados do dispositivo".to_string())
                .with_details("Dados do dispositivo inválidos")
                .with_log("Erro Device");
        }

        let devices = self
            .db
            .select(QueryModel::new(&self.tables.dispositivos).with_values(lookup))
            .await;
        match devices.success_or_none() {
            None => return rewrap(&devices, "Erro ao buscar dispositivo").with_log("Erro Device"),
            Some(rows) if rows.is_empty() => {
                return Outcome::failure("Dispositivo não cadastrado".to_string())
                    .with_details(format!("{:?} em {:?}", device.mac, device.local))
                    .with_log("Acesso Negado")
            }
            Some(_) => {}
        }

        let columns: Vec<String> = PROFILE_COLUMNS.iter().map(|c| c.to_string()).collect();
        let profiles = self
            .db
            .select(QueryModel::new(&self.tables.perfis).with_columns(Columns::List(columns)))
            .await;
        let Some(rows) = profiles.success_or_none() else {
            return rewrap(&profiles, "Erro ao encontrar perfis").with_log("Erro Perfis");
        };

        let mut candidates = Vec::with_capacity(rows.len());
        for row in rows {
            let parsed = Profile::from_row(row).map_err(|e| e.to_string()).and_then(|profile| {
                match profile.encodings.as_deref() {
                    // Profiles registered without a face cannot open doors.
                    None | Some("") => Ok(None),
                    Some(text) => FeatureVector::parse(text)
                        .map(|encoding| Some((profile.clone(), encoding)))
                        .map_err(|e| format!("perfil {}: {}", profile.id, e)),
                }
            });
            match parsed {
                Ok(Some(candidate)) => candidates.push(candidate),
                Ok(None) => {}
                Err(details) => {
                    return Outcome::fault("Erro ao processar encodings do perfil".to_string())
                        .with_details(details)
                        .with_log("Erro Encode")
                }
            }
        }

        let probe = self.vision.first_face_encoding().await;
        let Some(probe) = probe.success_or_none() else {
            return Outcome::fault("Erro ao obter rosto para comparação".to_string())
                .with_details(probe.failure_or_none().cloned().unwrap_or_default())
                .with_log("Erro Face");
        };

        let matched =
            match_face_to_profiles(self.vision.as_ref(), candidates, probe, self.tolerance).await;
        match matched {
            Outcome::Success { value, .. } => Outcome::success(AccessGrant {
                profile: value.profile.without_encodings(),
                similarity: value.similarity,
            })
            .with_details("Rosto reconhecido e comparado com sucesso")
            .with_log("Porta Aberta"),
            other if other.is_critical() => {
                rewrap(&other, "Erro ao comparar rosto com perfis").with_log("Erro Match")
            }
            other => rewrap(&other, "Rosto não reconhecido").with_log("Acesso Negado"),
        }
    }

    pub async fn insert_historic_table(&self, historic: &HistoricModel) -> Outcome<u64, String> {
        let query = QueryModel::new(&self.tables.historico).with_values(historic.bind_values());
        let result = self.db.insert(query).await;
        if result.is_failure() {
            return rewrap(&result, "Erro ao inserir histórico")
                .with_critical(true)
                .with_log("Erro Historico");
        }
        result
            .with_details("Registro de acesso criado")
            .with_log("Histórico inserido com sucesso")
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
