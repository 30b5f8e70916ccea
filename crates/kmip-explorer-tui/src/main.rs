//! `kmip-explorer` — terminal browser for objects stored on a KMIP server.
//!
//! Lists, filters and searches managed objects, shows their attributes and
//! runs lifecycle operations (create, register, activate, revoke, rekey,
//! destroy, get content) against the server.
//!
//! Logs go to a file (default `$TMPDIR/kmip-explorer.log`) so they never
//! corrupt the terminal. Connection settings come from CLI flags, `KMIP_*`
//! environment variables or a profile in the configuration file.

mod action;
mod app;
mod component;
mod event;
mod forms;
mod theme;
mod tui;
mod update_check;
mod widgets;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use color_eyre::eyre::{Result, eyre};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use kmip_explorer_config::{Config, ConfigError, ConnectionOverrides};
use kmip_explorer_core::{KmipClient, SandboxClient};

use crate::app::{App, AppOptions};

/// Terminal explorer for KMIP key management servers.
#[derive(Parser, Debug)]
#[command(name = "kmip-explorer", about, disable_version_flag = true)]
struct Cli {
    /// Server address as host:port
    #[arg(long, env = "KMIP_ADDR")]
    addr: Option<String>,

    /// Client certificate (PEM)
    #[arg(long, env = "KMIP_CERT")]
    cert: Option<PathBuf>,

    /// Client private key (PEM)
    #[arg(long, env = "KMIP_KEY")]
    key: Option<PathBuf>,

    /// Server CA bundle (PEM). System roots are used when absent
    #[arg(long, env = "KMIP_CA")]
    ca: Option<PathBuf>,

    /// Do not send correlation values with requests
    #[arg(long)]
    no_ccv: bool,

    /// Print version and exit
    #[arg(long)]
    version: bool,

    /// Do not check for a newer release
    #[arg(long)]
    no_check_update: bool,

    /// Explore an in-memory demo server instead of a real one
    #[arg(long)]
    sandbox: bool,

    /// Configuration profile to use
    #[arg(short, long, env = "KMIP_PROFILE")]
    profile: Option<String>,

    /// Log file path
    #[arg(long, default_value_os_t = std::env::temp_dir().join("kmip-explorer.log"))]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn overrides(&self) -> ConnectionOverrides {
        ConnectionOverrides {
            addr: self.addr.clone(),
            cert: self.cert.clone(),
            key: self.key.clone(),
            ca: self.ca.clone(),
            no_ccv: self.no_ccv,
        }
    }
}

/// File-based tracing. Nothing may be logged to stdout/stderr while the
/// terminal is in raw mode. The guard must live until exit to flush.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "kmip_explorer={log_level},kmip_explorer_core={log_level},kmip_explorer_config={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(std::env::temp_dir, PathBuf::from);
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("kmip-explorer.log"));

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

/// Whether the release check should run at all.
fn should_check_update(cli: &Cli, config: Option<&Config>) -> bool {
    !cli.no_check_update
        && !cfg!(debug_assertions)
        && config.is_none_or(|c| c.defaults.check_update)
}

async fn print_version(cli: &Cli, config: Option<&Config>) {
    println!("kmip-explorer {}", env!("CARGO_PKG_VERSION"));
    if !should_check_update(cli, config) {
        return;
    }
    if let Some(tag) = update_check::newer_release(env!("CARGO_PKG_VERSION")).await {
        println!("A newer release is available: {tag}");
    }
}

/// Build the client selected by the command line. `Ok(None)` means the
/// connection settings are incomplete and usage was printed.
fn build_client(cli: &Cli, config: &Config) -> Result<Option<Arc<dyn KmipClient>>> {
    if cli.sandbox {
        let mut sandbox = SandboxClient::demo();
        if cli.no_ccv {
            sandbox = sandbox.without_correlation();
        }
        info!("using in-memory sandbox server");
        return Ok(Some(Arc::new(sandbox)));
    }

    match config.resolve_connection(cli.profile.as_deref(), cli.overrides()) {
        Ok(settings) => {
            info!(addr = %settings.addr, no_ccv = settings.no_ccv, "connection resolved");
            Err(eyre!(
                "no KMIP transport is available in this build to reach {}; \
                 use --sandbox to explore the demo server",
                settings.addr
            ))
        }
        Err(
            e @ (ConfigError::Missing(_)
            | ConfigError::Validation { .. }
            | ConfigError::UnknownProfile(_)),
        ) => {
            warn!(error = %e, "incomplete connection settings");
            eprintln!("Error: {e}\n");
            Cli::command().print_help()?;
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks first so startup failures leave a usable terminal.
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let config = kmip_explorer_config::load_config();
    if let Err(e) = &config {
        warn!(error = %e, "configuration not loaded, using defaults");
    }

    if cli.version {
        print_version(&cli, config.as_ref().ok()).await;
        return Ok(());
    }

    let config = config?;
    info!(
        profile = cli.profile.as_deref().unwrap_or("(default)"),
        sandbox = cli.sandbox,
        "starting kmip-explorer"
    );

    let Some(client) = build_client(&cli, &config)? else {
        return Ok(());
    };

    let options = AppOptions {
        initial_category: config.defaults.filter,
        tick_rate: Duration::from_millis(config.defaults.tick_rate_ms),
        render_rate: Duration::from_millis(config.defaults.render_rate_ms),
        check_update: should_check_update(&cli, Some(&config)),
    };
    let mut app = App::new(client, options);
    app.run().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_parse_into_overrides() {
        let cli = Cli::parse_from([
            "kmip-explorer",
            "--addr",
            "kmip.example.com:5696",
            "--cert",
            "client.pem",
            "--key",
            "client.key",
            "--no-ccv",
        ]);
        let overrides = cli.overrides();
        assert_eq!(overrides.addr.as_deref(), Some("kmip.example.com:5696"));
        assert_eq!(overrides.cert, Some(PathBuf::from("client.pem")));
        assert!(overrides.ca.is_none());
        assert!(overrides.no_ccv);
    }

    #[test]
    fn no_check_update_disables_the_check() {
        let cli = Cli::parse_from(["kmip-explorer", "--no-check-update"]);
        assert!(!should_check_update(&cli, None));
    }
}
