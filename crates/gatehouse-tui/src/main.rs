//! `gatehouse` — terminal client for a token-authenticated dashboard backend.
//!
//! Built on [ratatui](https://ratatui.rs). Two views: `/login` and
//! `/dashboard`. The dashboard is driven by `gatehouse-core`'s
//! [`DashboardController`](gatehouse_core::DashboardController), whose state
//! a background data bridge forwards into the TUI action loop.
//!
//! Logs are written to a file (default `/tmp/gatehouse.log`) to avoid
//! corrupting the terminal UI.
//!
//! Entry point: CLI argument parsing, tracing setup, panic hooks, session
//! restore, and app launch.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod navigator;
mod screens;
mod theme;
mod tui;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use gatehouse_config::Config;
use gatehouse_core::{ApiSession, BackendConfig, TlsVerification};

use crate::app::{App, AppContext};

/// Terminal client for a token-authenticated dashboard backend.
#[derive(Parser, Debug)]
#[command(name = "gatehouse", version, about)]
struct Cli {
    /// Backend URL (e.g., http://localhost:3000)
    #[arg(short = 'u', long, env = "GATEHOUSE_URL")]
    url: Option<String>,

    /// Username to pre-fill on the login screen
    #[arg(long, env = "GATEHOUSE_USERNAME")]
    username: Option<String>,

    /// Config profile to use
    #[arg(short = 'p', long, env = "GATEHOUSE_PROFILE")]
    profile: Option<String>,

    /// Accept invalid TLS certificates
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Log file path (defaults to /tmp/gatehouse.log)
    #[arg(long, default_value = "/tmp/gatehouse.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr: that would
/// corrupt the TUI output. Returns a guard that must be held for the
/// lifetime of the application to ensure logs are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "gatehouse={log_level},gatehouse_core={log_level},gatehouse_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("gatehouse.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Resolve the backend: CLI flags first, then the config profile.
fn build_backend_config(cli: &Cli, cfg: &Config, profile_name: &str) -> Result<BackendConfig> {
    if let Some(raw) = cli.url.as_deref() {
        let url: url::Url = raw
            .parse()
            .wrap_err_with(|| format!("invalid backend URL: {raw}"))?;
        let mut config = BackendConfig::new(url);
        config.timeout = Duration::from_secs(cfg.defaults.timeout);
        if cli.insecure || cfg.defaults.insecure {
            config.tls = TlsVerification::DangerAcceptInvalid;
        }
        return Ok(config);
    }

    let profile = cfg.profile(profile_name).ok_or_else(|| {
        eyre!("no backend configured: pass --url or add profile '{profile_name}' to the config file")
    })?;
    let mut config = gatehouse_config::profile_to_backend_config(profile, &cfg.defaults)?;
    if cli.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    // Tracing to file: hold the guard so logs flush on exit
    let _log_guard = setup_tracing(&cli);

    let cfg = gatehouse_config::load_config_or_default();
    let profile_name = cfg.active_profile_name(cli.profile.as_deref());
    let backend = build_backend_config(&cli, &cfg, &profile_name)?;

    info!(url = %backend.url, profile = %profile_name, "starting gatehouse");

    let session = Arc::new(ApiSession::new(&backend)?);

    if let Some(token) = gatehouse_config::load_session_token(&profile_name) {
        if let Err(e) = session.restore(token).await {
            warn!(error = %e, "saved session could not be restored");
            if e.ends_session() {
                if let Err(e) = gatehouse_config::clear_session_token(&profile_name) {
                    warn!(error = %e, "failed to clear stale session token");
                }
            }
        }
    }

    let username = cli.username.clone().or_else(|| {
        cfg.profile(&profile_name)
            .and_then(gatehouse_config::resolve_username)
    });

    let password = cfg
        .profile(&profile_name)
        .and_then(|p| gatehouse_config::resolve_password(p, &profile_name).ok());

    let mut app = App::new(
        session,
        AppContext {
            profile_name,
            username,
            password,
        },
    );
    app.run().await?;

    Ok(())
}
