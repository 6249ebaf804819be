//! Business operations: admin gating, audit history and the registration
//! workflow.

pub mod registration;

use crate::commands::Outcome;
use crate::models::{DeviceModel, HistoricModel, LoginModel, Profile, UserModel};
use crate::repository::{rewrap, ApiRepository};
use crate::vision::VisionService;
use std::sync::Arc;

/// Log attached to authentication and authorization refusals.
pub const AUTH_REFUSED_LOG: &str = "Acesso Negado ...";
pub const INVALID_USER_DATA: &str = "Dados do usuario invalidos";

pub struct ApiController {
    repository: ApiRepository,
    vision: Arc<dyn VisionService>,
}

/// Name used for a user in history entries.
fn label(user: &UserModel) -> &str {
    user.alias
        .as_deref()
        .or(user.email.as_deref())
        .or(user.id.as_deref())
        .unwrap_or_default()
}

impl ApiController {
    pub fn new(repository: ApiRepository, vision: Arc<dyn VisionService>) -> Self {
        Self { repository, vision }
    }

    /// `None` when `admin` is an administrator, else the refusal to return.
    async fn authorize<T>(&self, admin: &LoginModel) -> Option<Outcome<T, String>> {
        let check = self.is_admin(admin).await;
        if check.is_success() {
            None
        } else {
            Some(rewrap(&check, "Usuario não autorizado"))
        }
    }

    /// Appends `action` to the history of the user identified by `login`.
    async fn audit_actor(&self, login: &LoginModel, action: &str) -> Outcome<u64, String> {
        let actor = self.repository.find_user(login.bind_values()).await;
        let Some(profile) = actor.success_or_none() else {
            return rewrap(&actor, "Erro ao registrar o historico ...").with_critical(true);
        };
        match HistoricModel::from_profile(profile) {
            Ok(model) => self.register_historic_from_model(model, action).await,
            Err(e) => Outcome::fault("Erro ao registrar o historico ...".to_string())
                .with_details(e.to_string()),
        }
    }

    pub async fn get_user_table(&self) -> Outcome<Vec<Profile>, String> {
        let result = self.repository.select_user_table().await;
        match result {
            Outcome::Success { value, log, .. } => {
                let profiles = value.into_iter().map(Profile::without_encodings).collect();
                let outcome = Outcome::success(profiles);
                match log {
                    Some(log) => outcome.with_log(log),
                    None => outcome,
                }
            }
            other => rewrap(&other, "Erro ao coletar tabela de usuarios ..."),
        }
    }

    /// Admin-only listing, recorded in the admin's history.
    pub async fn list_users(&self, admin: &LoginModel) -> Outcome<Vec<Profile>, String> {
        if let Some(refusal) = self.authorize(admin).await {
            return refusal;
        }
        let table = self.get_user_table().await;
        if table.is_failure() {
            return table;
        }
        let audit = self.audit_actor(admin, "consultou a tabela de usuarios !").await;
        if audit.is_failure() {
            return rewrap(&audit, "Erro ao registrar o historico ...");
        }
        table
    }

    /// Checks credentials and records the login.
    pub async fn login(&self, login: &LoginModel) -> Outcome<Profile, String> {
        let found = self.repository.find_user(login.bind_values()).await;
        let profile = match found {
            Outcome::Success { value, .. } => value,
            other if other.is_critical() => return rewrap(&other, "Erro ao Autorizar o login ..."),
            other => return rewrap(&other, "Usuario não Autorizado...").with_log(AUTH_REFUSED_LOG),
        };

        let recorded = match HistoricModel::from_profile(&profile) {
            Ok(model) => self.register_historic_from_model(model, "logou no sistema !").await,
            Err(e) => Outcome::fault(e.to_string()),
        };
        if recorded.is_failure() {
            return rewrap(&recorded, "Erro ao realizar login ..").with_critical(true);
        }

        Outcome::success(profile.without_encodings()).with_log("Usuario Autorizado ...")
    }

    pub async fn logout(&self, login: &LoginModel) -> Outcome<String, String> {
        let recorded = self.audit_actor(login, "deslogou no sistema !").await;
        if recorded.is_failure() {
            return rewrap(&recorded, "Erro ao registrar logout..");
        }
        Outcome::success("logout bem sucedido ...".to_string()).with_log("logout bem sucedido ...")
    }

    pub async fn is_admin(&self, admin: &LoginModel) -> Outcome<bool, String> {
        let result = self.repository.user_is_admin(admin).await;
        match result.success_or_none() {
            Some(true) => Outcome::success(true).with_log("Usuario autorizado ..."),
            Some(false) => Outcome::failure("Usuario não autorizado ...".to_string())
                .with_log(AUTH_REFUSED_LOG),
            None => rewrap(&result, "Erro ao verificar se o usuario é admin ..."),
        }
    }

    pub async fn find_user(
        &self,
        filter: &UserModel,
        admin: &LoginModel,
    ) -> Outcome<Profile, String> {
        if let Some(refusal) = self.authorize(admin).await {
            return refusal;
        }
        let found = self.repository.find_user(filter.bind_values()).await;
        let profile = match found {
            Outcome::Success { value, .. } => value.without_encodings(),
            other => return rewrap(&other, "Erro ao encontrar usuario ..."),
        };

        let action = format!("consultou dados do usuario {} !", profile.display_alias());
        let audit = self.audit_actor(admin, &action).await;
        if audit.is_failure() {
            return rewrap(&audit, "Erro ao registrar o historico ...");
        }
        Outcome::success(profile).with_log("Usuario encontrado com sucesso ...")
    }

    pub async fn delete_user(
        &self,
        filter: &UserModel,
        admin: &LoginModel,
    ) -> Outcome<u64, String> {
        if let Some(refusal) = self.authorize(admin).await {
            return refusal;
        }
        let deleted = self.repository.delete_user_table(filter).await;
        match deleted.success_or_none() {
            None => return rewrap(&deleted, "Erro ao deletar usuario ..."),
            Some(0) => return Outcome::failure("Usuario não encontrado ...".to_string()),
            Some(_) => {}
        }

        let action = format!("deletou o usuario {} !", label(filter));
        let audit = self.audit_actor(admin, &action).await;
        if audit.is_failure() {
            return rewrap(&audit, "Erro ao registrar o historico ...");
        }
        deleted.with_log("Usuario deletado com sucesso ...")
    }

    /// Applies `new_data` to the one user matching `filter`.
    pub async fn update_user(
        &self,
        filter: &UserModel,
        new_data: &UserModel,
        admin: &LoginModel,
    ) -> Outcome<u64, String> {
        if let Some(refusal) = self.authorize(admin).await {
            return refusal;
        }
        if let Err(e) = new_data.validate() {
            return Outcome::failure(INVALID_USER_DATA.to_string()).with_details(e.to_string());
        }
        let updated = self.repository.update_user_table(filter, new_data).await;
        if updated.is_failure() {
            return rewrap(&updated, "Erro ao atualizar usuario ...");
        }

        let fields: Vec<String> = new_data.bind_values().keys().cloned().collect();
        let subject = match fields.as_slice() {
            [single] => format!("o campo {}", single),
            many => format!("os campos {}", many.join(", ")),
        };
        let action = format!("atualizou {} do usuario {} !", subject, label(filter));
        let audit = self.audit_actor(admin, &action).await;
        if audit.is_failure() {
            return rewrap(&audit, "Erro ao registrar o historico ...");
        }
        updated.with_log("Usuario atualizado com sucesso ...")
    }

    /// Identifies the person at `device` and records the entry.
    pub async fn open_door(&self, device: &DeviceModel) -> Outcome<Profile, String> {
        let opened = self.repository.open_door(device).await;
        let (grant, details, log) = match opened {
            Outcome::Success { value, details, log } => (value, details, log),
            other => return other.map(|grant| grant.profile),
        };

        let local = device.local.as_deref().unwrap_or_default();
        let recorded = match HistoricModel::from_profile(&grant.profile) {
            Ok(model) => {
                let model = model
                    .with_device(device)
                    .with_trust(grant.similarity.round() as i64);
                self.register_historic_from_model(model, &format!("entrou em {} !", local))
                    .await
            }
            Err(e) => Outcome::fault(e.to_string()),
        };
        if recorded.is_failure() {
            return rewrap(&recorded, "Erro ao registrar historico").with_critical(true);
        }

        let mut outcome = Outcome::success(grant.profile);
        if let Some(details) = details {
            outcome = outcome.with_details(details);
        }
        match log {
            Some(log) => outcome.with_log(log),
            None => outcome,
        }
    }

    pub async fn register_historic(&self, historic: &HistoricModel) -> Outcome<u64, String> {
        let result = self.repository.insert_historic_table(historic).await;
        if result.is_failure() {
            return rewrap(&result, "Erro ao registrar historico").with_critical(true);
        }
        result.with_log("Historico registrado com sucesso")
    }

    /// Logs `Usuario <alias> <action>` on `model` and stores it.
    pub async fn register_historic_from_model(
        &self,
        mut model: HistoricModel,
        action: &str,
    ) -> Outcome<u64, String> {
        let log = format!("Usuario {} {}", model.alias, action);
        tracing::info!(entry = %log, "history entry");
        model.set_log(log);
        self.register_historic(&model).await
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
