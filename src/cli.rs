//! Command-line surface: argument parsing and the per-command drivers.

use crate::commands::Outcome;
use crate::context::AppContext;
use crate::models::{DeviceModel, LoginModel, PermissionLevel, UserModel};
use crate::structured_logger::StructuredLogger;
use crate::transport::{
    encode_record, status_code, write_stream, Response, STATUS_FORBIDDEN, STATUS_INTERNAL,
    STATUS_OK, STATUS_UNAUTHORIZED,
};
use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use futures::{Stream, StreamExt};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Message of the fault emitted when a command outlives its deadline.
pub const TIMEOUT_MESSAGE: &str = "Tempo limite excedido";

#[derive(Debug, Parser)]
#[command(name = "facegate")]
#[command(about = "Face-recognition access control backend")]
#[command(version)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Config file (defaults to $FACEGATE_CONFIG, then the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the database, capture file and audit log
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Print single-shot results as a response envelope instead of a record
    #[arg(long, global = true)]
    pub envelope: bool,

    /// Increase diagnostic output on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Args)]
pub struct Credentials {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub senha: String,
}

#[derive(Debug, Clone, Args)]
pub struct AdminCredentials {
    /// Email of the administrator performing the operation
    #[arg(long = "admin-email")]
    pub admin_email: String,
    #[arg(long = "admin-senha")]
    pub admin_senha: String,
}

/// User fields shared by the user-management commands.
#[derive(Debug, Clone, Default, Args)]
pub struct UserFields {
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long)]
    pub nome: Option<String>,
    #[arg(long)]
    pub alias: Option<String>,
    #[arg(long)]
    pub cpf: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub matricula: Option<String>,
    #[arg(long)]
    pub senha: Option<String>,
    #[arg(long)]
    pub icon_path: Option<String>,
    /// discente, docente or administrador
    #[arg(long)]
    pub permission_level: Option<PermissionLevel>,
}

impl From<UserFields> for UserModel {
    fn from(fields: UserFields) -> Self {
        Self {
            id: fields.id,
            nome: fields.nome,
            alias: fields.alias,
            cpf: fields.cpf,
            email: fields.email,
            matricula: fields.matricula,
            senha: fields.senha,
            icon_path: fields.icon_path,
            permission_level: fields.permission_level,
            encodings: None,
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Create the database file and tables
    InitDb,
    Login(Credentials),
    Logout(Credentials),
    /// List every user (administrators only)
    ListUsers(AdminCredentials),
    /// Capture a face and register a new user
    Register {
        #[command(flatten)]
        admin: AdminCredentials,
        #[command(flatten)]
        user: UserFields,
    },
    FindUser {
        #[command(flatten)]
        admin: AdminCredentials,
        #[command(flatten)]
        filter: UserFields,
    },
    /// Update the single user matching --where-id / --where-email
    UpdateUser {
        #[command(flatten)]
        admin: AdminCredentials,
        #[arg(long = "where-id")]
        where_id: Option<String>,
        #[arg(long = "where-email")]
        where_email: Option<String>,
        #[command(flatten)]
        changes: UserFields,
    },
    DeleteUser {
        #[command(flatten)]
        admin: AdminCredentials,
        #[command(flatten)]
        filter: UserFields,
    },
    /// Identify the person in front of a door and record the entry
    OpenDoor {
        #[arg(long)]
        mac: String,
        #[arg(long)]
        local: String,
    },
}

impl CliCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::InitDb => "init-db",
            Self::Login(_) => "login",
            Self::Logout(_) => "logout",
            Self::ListUsers(_) => "list-users",
            Self::Register { .. } => "register",
            Self::FindUser { .. } => "find-user",
            Self::UpdateUser { .. } => "update-user",
            Self::DeleteUser { .. } => "delete-user",
            Self::OpenDoor { .. } => "open-door",
        }
    }
}

/// Process exit code for a terminal status.
pub fn exit_code(status: u16) -> u8 {
    match status {
        STATUS_OK => 0,
        STATUS_UNAUTHORIZED | STATUS_FORBIDDEN => 2,
        _ => 1,
    }
}

/// Writes outcomes to stdout-like sinks and mirrors them to the audit log.
pub struct Emitter<'a, W> {
    out: &'a mut W,
    envelope: bool,
    audit: Option<&'a StructuredLogger>,
    component: &'static str,
}

impl<'a, W: AsyncWrite + Unpin> Emitter<'a, W> {
    pub fn new(
        out: &'a mut W,
        envelope: bool,
        audit: Option<&'a StructuredLogger>,
        component: &'static str,
    ) -> Self {
        Self {
            out,
            envelope,
            audit,
            component,
        }
    }

    /// Emits one outcome and returns its status.
    pub async fn emit<T: Serialize>(&mut self, outcome: &Outcome<T, String>) -> Result<u16> {
        if let Some(audit) = self.audit {
            audit.log_outcome(self.component, outcome);
        }
        let text = if self.envelope && !outcome.is_running() {
            format!("{}\n", Response::from_outcome(outcome)?.to_json()?)
        } else {
            encode_record(outcome)?
        };
        self.out.write_all(text.as_bytes()).await?;
        self.out.flush().await?;
        Ok(status_code(outcome))
    }

    /// Writes every outcome of `stream` as a record as soon as it arrives.
    /// Returns the status of the last one; an empty stream is a 500.
    pub async fn emit_stream<S, T>(&mut self, stream: S) -> Result<u16>
    where
        S: Stream<Item = Outcome<T, String>> + Unpin,
        T: Serialize,
    {
        let (audit, component) = (self.audit, self.component);
        let mirrored = stream.inspect(move |outcome| {
            if let Some(audit) = audit {
                audit.log_outcome(component, outcome);
            }
        });
        let last = write_stream(mirrored, &mut *self.out).await?;
        Ok(last.as_ref().map_or(STATUS_INTERNAL, status_code))
    }
}

fn rejected<T>(error: impl std::fmt::Display) -> Outcome<T, String> {
    Outcome::failure("Erro ao ler dados do request".to_string()).with_details(error.to_string())
}

fn admin_login(admin: &AdminCredentials) -> Result<LoginModel, Outcome<String, String>> {
    LoginModel::new(admin.admin_email.as_str(), admin.admin_senha.as_str()).map_err(rejected)
}

/// Runs one command against `context` and returns the terminal status.
pub async fn execute<W: AsyncWrite + Unpin>(
    context: &AppContext,
    command: CliCommand,
    emitter: &mut Emitter<'_, W>,
) -> Result<u16> {
    let controller = &context.controller;
    match command {
        CliCommand::InitDb => {
            context.init_schema().await?;
            let done = Outcome::<String, String>::success(format!(
                "Banco de dados pronto em {}",
                context.database_path().display()
            ))
            .with_log("Tabelas criadas ...");
            emitter.emit(&done).await
        }
        CliCommand::Login(credentials) => {
            match LoginModel::new(credentials.email, credentials.senha) {
                Ok(login) => emitter.emit(&controller.login(&login).await).await,
                Err(e) => emitter.emit(&rejected::<String>(e)).await,
            }
        }
        CliCommand::Logout(credentials) => {
            match LoginModel::new(credentials.email, credentials.senha) {
                Ok(login) => emitter.emit(&controller.logout(&login).await).await,
                Err(e) => emitter.emit(&rejected::<String>(e)).await,
            }
        }
        CliCommand::ListUsers(admin) => match admin_login(&admin) {
            Ok(admin) => emitter.emit(&controller.list_users(&admin).await).await,
            Err(refusal) => emitter.emit(&refusal).await,
        },
        CliCommand::Register { admin, user } => {
            let admin = match admin_login(&admin) {
                Ok(admin) => admin,
                Err(refusal) => return emitter.emit(&refusal).await,
            };
            let mut registration = controller.register_user(UserModel::from(user), admin);
            emitter.emit_stream(registration.execute_stream()?).await
        }
        CliCommand::FindUser { admin, filter } => match admin_login(&admin) {
            Ok(admin) => {
                let found = controller.find_user(&filter.into(), &admin).await;
                emitter.emit(&found).await
            }
            Err(refusal) => emitter.emit(&refusal).await,
        },
        CliCommand::UpdateUser {
            admin,
            where_id,
            where_email,
            changes,
        } => {
            let admin = match admin_login(&admin) {
                Ok(admin) => admin,
                Err(refusal) => return emitter.emit(&refusal).await,
            };
            let filter = UserModel {
                id: where_id,
                email: where_email,
                ..UserModel::default()
            };
            let updated = controller
                .update_user(&filter, &changes.into(), &admin)
                .await;
            emitter.emit(&updated).await
        }
        CliCommand::DeleteUser { admin, filter } => match admin_login(&admin) {
            Ok(admin) => {
                let deleted = controller.delete_user(&filter.into(), &admin).await;
                emitter.emit(&deleted).await
            }
            Err(refusal) => emitter.emit(&refusal).await,
        },
        CliCommand::OpenDoor { mac, local } => {
            let device = DeviceModel {
                mac: Some(mac),
                local: Some(local),
                ip: None,
            };
            emitter.emit(&controller.open_door(&device).await).await
        }
    }
}

/// [`execute`] bounded by `timeout`. On expiry a fault record is emitted.
pub async fn execute_with_timeout<W: AsyncWrite + Unpin>(
    context: &AppContext,
    command: CliCommand,
    emitter: &mut Emitter<'_, W>,
    timeout: Duration,
) -> Result<u16> {
    let name = command.name();
    let finished = tokio::time::timeout(timeout, execute(context, command, emitter)).await;
    match finished {
        Ok(result) => result,
        Err(_) => {
            tracing::error!(command = name, secs = timeout.as_secs(), "command timed out");
            if let Some(audit) = emitter.audit {
                audit.log_timeout(name, timeout.as_secs());
            }
            let fault = Outcome::<String, String>::fault(TIMEOUT_MESSAGE.to_string())
                .with_details(format!("{} excedeu {}s", name, timeout.as_secs()));
            emitter.emit(&fault).await
        }
    }
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
