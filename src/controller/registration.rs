//! User registration as a stream of progress outcomes.
//!
//! Steps run one per poll: authorize the acting admin, capture the new
//! user's face, then persist the user and record the action. Each step is
//! announced with a `Running` element; the first failure ends the stream.
//! Incomplete user data is refused before the camera is opened.

use super::{ApiController, AUTH_REFUSED_LOG, INVALID_USER_DATA};
use crate::commands::stream_command::ProducedOutcome;
use crate::commands::{Outcome, StreamCommand};
use crate::models::{LoginModel, Profile, UserModel};
use crate::repository::rewrap;
use anyhow::Context;
use futures::stream::{self, Stream};
use std::sync::Arc;

pub const REGISTRATION_STARTED: &str = "Iniciando registro ...";
pub const ACCESS_DENIED: &str = "Acesso Negado ao Usuario!";
pub const CAPTURE_STARTED: &str = "Iniciando coleta do rosto ...";
pub const CAPTURE_FAILED: &str = "Erro ao coletar o rosto";
pub const CAPTURE_DONE: &str = "Rosto coletado com sucesso";
pub const PERSIST_FAILED: &str = "erro ao registrar o usuario ...";
pub const HISTORY_FAILED: &str = "Erro ao registrar o historico ...";
pub const REGISTRATION_DONE: &str = "Usuario registrado com sucesso ...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Start,
    Authorize,
    Capture,
    Complete,
}

struct Registration {
    controller: Arc<ApiController>,
    user: UserModel,
    admin: LoginModel,
    /// `None` once a terminal outcome has been produced.
    step: Option<Step>,
}

impl Registration {
    /// Runs the current step. Only a `Running` result lets the next one run.
    async fn advance(&mut self, step: Step) -> ProducedOutcome<String, String> {
        match step {
            Step::Start => {
                self.step = Some(Step::Authorize);
                Ok(Outcome::running(REGISTRATION_STARTED.to_string()))
            }
            Step::Authorize => Ok(self.authorize().await),
            Step::Capture => self.capture().await,
            Step::Complete => self.complete().await,
        }
    }

    async fn authorize(&mut self) -> Outcome<String, String> {
        let check = self.controller.repository.user_is_admin(&self.admin).await;
        match check.success_or_none() {
            Some(true) => {}
            Some(false) => {
                return Outcome::failure(ACCESS_DENIED.to_string())
                    .with_details("Usuario não é um administrador")
                    .with_log(AUTH_REFUSED_LOG)
            }
            None => return rewrap(&check, ACCESS_DENIED),
        }

        if let Err(e) = self.user.validate_new() {
            tracing::warn!(error = %e, "registration refused before capture");
            return Outcome::failure(INVALID_USER_DATA.to_string()).with_details(e.to_string());
        }
        self.step = Some(Step::Capture);
        Outcome::running(CAPTURE_STARTED.to_string())
    }

    async fn capture(&mut self) -> ProducedOutcome<String, String> {
        let captured = self.controller.vision.first_face_encoding().await;
        let Some(encoding) = captured.success_or_none() else {
            let failure = Outcome::failure(CAPTURE_FAILED.to_string());
            return Ok(match captured.failure_or_none() {
                Some(cause) => failure.with_details(cause.clone()),
                None => failure,
            });
        };
        self.user
            .set_encoding(encoding)
            .context("captured encoding has the wrong size")?;
        self.step = Some(Step::Complete);
        Ok(Outcome::running(CAPTURE_DONE.to_string()))
    }

    async fn complete(&mut self) -> ProducedOutcome<String, String> {
        self.user.ensure_id();
        let inserted = self.controller.repository.insert_user_table(&self.user).await;
        if inserted.is_failure() {
            return Ok(rewrap(&inserted, PERSIST_FAILED).with_critical(true));
        }

        let alias = self.user.alias.clone().unwrap_or_default();
        let action = format!("registrou o novo usuario {} !", alias);
        let audit = self.controller.audit_actor(&self.admin, &action).await;
        if audit.is_failure() {
            return Ok(rewrap(&audit, HISTORY_FAILED).with_critical(true));
        }

        let profile = Profile::from_user(&self.user)?.without_encodings();
        let details = serde_json::to_string(&profile)?;
        tracing::info!(id = %profile.id, alias = %alias, "user registered");
        Ok(Outcome::success(REGISTRATION_DONE.to_string())
            .with_details(details)
            .with_log("Usuario registrado"))
    }
}

fn registration_steps(
    controller: Arc<ApiController>,
    user: UserModel,
    admin: LoginModel,
) -> impl Stream<Item = ProducedOutcome<String, String>> + Send + 'static {
    let state = Registration {
        controller,
        user,
        admin,
        step: Some(Step::Start),
    };
    stream::unfold(state, |mut state| async move {
        let step = state.step?;
        let item = state.advance(step).await;
        if !matches!(&item, Ok(outcome) if outcome.is_running()) {
            state.step = None;
        }
        Some((item, state))
    })
}

impl ApiController {
    /// Registration workflow for `user`, authorized by `admin`.
    ///
    /// Every execution of the returned command starts a fresh run.
    pub fn register_user(
        self: &Arc<Self>,
        user: UserModel,
        admin: LoginModel,
    ) -> StreamCommand<String> {
        let controller = Arc::clone(self);
        StreamCommand::with_producer(move || {
            registration_steps(controller.clone(), user.clone(), admin.clone())
        })
    }
}
