use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod domain;
mod services;

use cli::Cli;
use commands::{handle_admin_commands, handle_runtime_commands};
use services::dispatch::{DispatchError, Dispatcher};
use services::env::{ConfigError, EnvConfig};
use services::identity::{load_session, IdentityError};
use services::output::print_error;
use services::tenant::TenantContext;

fn main() {
    // Logs go to stderr so `--json` stdout stays machine-readable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        tracing::error!(error = %err, "command failed");
        print_error(cli.json, error_code(&err), &format!("{err:#}"));
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let env = EnvConfig::from_env();
    let mut session = load_session()?;

    let mut tenant = TenantContext::new();
    // Precedence: explicit override > profile claim > environment default.
    tenant.sync_from_auth(&session);
    if let Some(explicit) = session.tenant_override.clone() {
        tenant.set_slug(Some(&explicit));
    }
    tenant.init_from_env(&env);

    if handle_admin_commands(cli, &env, &mut tenant, &mut session)? {
        return Ok(());
    }

    // Network commands only; constructed here so config-free commands work
    // without a resolvable API base.
    let dispatcher = Dispatcher::new(&env, &session)?;
    handle_runtime_commands(cli, &tenant, &session, &dispatcher)?;
    Ok(())
}

fn error_code(err: &anyhow::Error) -> &'static str {
    if err.downcast_ref::<ConfigError>().is_some() {
        return "CONFIG";
    }
    if let Some(dispatch) = err.downcast_ref::<DispatchError>() {
        return match dispatch {
            DispatchError::Security(_) => "SECURITY_DENY",
            DispatchError::Status { .. } => "HTTP_STATUS",
            DispatchError::Header(_) => "ERROR",
            DispatchError::Transport(_) => "TRANSPORT",
        };
    }
    if let Some(identity) = err.downcast_ref::<IdentityError>() {
        return match identity {
            IdentityError::EmailNotAllowed(_) => "EMAIL_NOT_ALLOWED",
            IdentityError::BillingLocked => "BILLING_LOCKED",
            IdentityError::NotAuthenticated => "NOT_AUTHENTICATED",
        };
    }
    "ERROR"
}
