use crate::cli::{Cli, Commands, EnvCommands, TenantCommands};
use crate::domain::models::{EnvReport, TenantReport};
use crate::services::env::EnvConfig;
use crate::services::hygiene::scan_sources;
use crate::services::identity::{clear_session, login_from_profile, AuthState};
use crate::services::output::{print_one, print_out};
use crate::services::tenant::TenantContext;
use std::path::Path;

pub fn handle_admin_commands(
    cli: &Cli,
    env: &EnvConfig,
    tenant: &mut TenantContext,
    session: &mut AuthState,
) -> anyhow::Result<bool> {
    match &cli.command {
        Commands::Tenant { command } => match command {
            TenantCommands::Show => {
                let report = TenantReport {
                    slug: tenant.slug().map(str::to_string),
                };
                print_one(cli.json, report, |r| {
                    format!("tenant: {}", r.slug.as_deref().unwrap_or("<none>"))
                })?;
            }
            TenantCommands::Set { slug } => {
                tenant.set_slug(Some(slug));
                persist_tenant_override(session, tenant.slug())?;
                let report = TenantReport {
                    slug: tenant.slug().map(str::to_string),
                };
                print_one(cli.json, report, |r| {
                    format!("tenant set to {}", r.slug.as_deref().unwrap_or("<none>"))
                })?;
            }
            TenantCommands::Clear => {
                tenant.set_slug(None);
                persist_tenant_override(session, None)?;
                print_one(cli.json, TenantReport { slug: None }, |_| {
                    "tenant cleared".to_string()
                })?;
            }
        },
        Commands::Login { profile } => {
            let auth = login_from_profile(profile, &env.allowed_emails)?;
            // Profile tenant claim applies on every auth-state change.
            tenant.sync_from_auth(&auth);
            let data = serde_json::json!({
                "email": auth.email(),
                "tenant": tenant.slug(),
                "billing_locked": auth.billing_locked,
            });
            print_one(cli.json, data, |_| {
                format!("logged in as {}", auth.email().unwrap_or("<none>"))
            })?;
        }
        Commands::Logout => {
            let removed = clear_session()?;
            print_one(cli.json, removed, |r| {
                if *r {
                    "session cleared".to_string()
                } else {
                    "no active session".to_string()
                }
            })?;
        }
        Commands::Env { command } => match command {
            EnvCommands::Check => {
                let missing = env.validate();
                let report = EnvReport {
                    mode: env.mode.as_str().to_string(),
                    api_base: env.api_base.clone(),
                    api_base_secure: env.resolve_api_base().is_ok(),
                    allowed_email_count: env.allowed_emails.len(),
                    tenant_default: env.tenant_default.clone(),
                    missing: missing.iter().map(|m| m.to_string()).collect(),
                };
                print_one(cli.json, report, |r| {
                    format!(
                        "mode={} api_base_secure={} missing=[{}]",
                        r.mode,
                        r.api_base_secure,
                        r.missing.join(", ")
                    )
                })?;
            }
        },
        Commands::Check { src_dir } => {
            let report = scan_sources(Path::new(src_dir))?;
            let failed = !report.violations.is_empty();
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&crate::domain::models::JsonOut {
                        ok: !failed,
                        data: &report,
                    })?
                );
            } else {
                println!(
                    "hygiene: scanned {} files, {} violations",
                    report.scanned_files,
                    report.violations.len()
                );
                print_out(false, &report.violations, |v| v.clone())?;
            }
            if failed {
                std::process::exit(1);
            }
        }
        _ => return Ok(false),
    }
    Ok(true)
}

fn persist_tenant_override(session: &mut AuthState, value: Option<&str>) -> anyhow::Result<()> {
    session.tenant_override = value.map(str::to_string);
    crate::services::identity::save_session(session)
}
