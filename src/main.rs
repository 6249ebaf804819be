use anyhow::{Context, Result};
use clap::Parser;
use facegate::cli::{execute_with_timeout, exit_code, Cli, Emitter};
use facegate::config::{data_dir, AppConfig};
use facegate::context::AppContext;
use facegate::logging::init_logging;
use facegate::structured_logger::StructuredLogger;
use std::process::ExitCode;
use std::time::Duration;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("[facegate] Warning: Failed to initialize logging: {}", e);
    }

    match run(cli).await {
        Ok(status) => ExitCode::from(exit_code(status)),
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("[facegate] Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<u16> {
    let config = AppConfig::resolve(cli.config.as_deref())?;
    let base_dir = cli.data_dir.clone().unwrap_or_else(data_dir);
    std::fs::create_dir_all(&base_dir)
        .with_context(|| format!("Failed to create data directory: {}", base_dir.display()))?;

    let context = AppContext::new(config, base_dir);
    tracing::debug!(
        version = facegate::GIT_SHA,
        database = %context.database_path().display(),
        "starting"
    );

    // The audit trail is best effort; commands still run without it.
    let audit = match StructuredLogger::with_random_session(&context.audit_log_dir()) {
        Ok(logger) => Some(logger),
        Err(e) => {
            tracing::warn!("audit log unavailable: {:#}", e);
            None
        }
    };

    let name = cli.command.name();
    if let Some(audit) = &audit {
        audit.log_command(name);
    }

    let timeout = Duration::from_secs(context.config.runtime.command_timeout_secs);
    let mut stdout = tokio::io::stdout();
    let mut emitter = Emitter::new(&mut stdout, cli.envelope, audit.as_ref(), name);
    execute_with_timeout(&context, cli.command, &mut emitter, timeout).await
}
