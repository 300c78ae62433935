//! Charmcase studio: headless entry point.
//!
//! Runs one customizer session driven by JSON-lines commands.  Each command
//! is dispatched to the same bridge a graphical shell would call, and each
//! response is written to stdout as one JSON line.  Logs go to stderr.
//!
//! # Usage
//!
//! ```text
//! charmcase-studio [OPTIONS]
//!
//! Options:
//!   --config <PATH>        Config file [default: platform config dir]
//!   --script <PATH>        Read commands from a file instead of stdin
//!   --base-price <AMOUNT>  Override the phone case base price
//!   --init-config          Write a default config file if none exists
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable               | Description                     |
//! |------------------------|---------------------------------|
//! | `CHARMCASE_CONFIG`     | Config file path                |
//! | `CHARMCASE_SCRIPT`     | Command script path             |
//! | `CHARMCASE_BASE_PRICE` | Base price override             |
//! | `RUST_LOG`             | Log filter; overrides `log_level` |
//!
//! # Architecture overview
//!
//! ```text
//! stdin / --script  (JSON lines)
//!       ↓
//! ui_bridge::script::run_script
//!       ↓
//! ui_bridge commands ── AppState { session, catalog feeds, price format }
//!       ↓
//! stdout  (one CommandResult per line)
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use charmcase_studio::application::customize_case::CustomizerSession;
use charmcase_studio::infrastructure::catalog::{provider_from_config, CatalogFeeds};
use charmcase_studio::infrastructure::storage::config::{
    config_file_path, load_config_from, save_config_to, AppConfig,
};
use charmcase_studio::infrastructure::ui_bridge::script::run_script;
use charmcase_studio::infrastructure::ui_bridge::AppState;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Phone-case charm customizer.
#[derive(Debug, Parser)]
#[command(
    name = "charmcase-studio",
    about = "Headless phone-case charm customizer driven by JSON-lines commands",
    version
)]
struct Cli {
    /// Path of the TOML config file.
    ///
    /// Defaults to `config.toml` in the platform config directory.  A missing
    /// file means built-in defaults.
    #[arg(long, env = "CHARMCASE_CONFIG")]
    config: Option<PathBuf>,

    /// File of JSON-lines commands.  Reads stdin when absent.
    #[arg(long, env = "CHARMCASE_SCRIPT")]
    script: Option<PathBuf>,

    /// Base price of the bare case, in currency units (e.g. `19.99`).
    #[arg(long, env = "CHARMCASE_BASE_PRICE")]
    base_price: Option<f64>,

    /// Write the effective config to the config path if no file exists there.
    #[arg(long)]
    init_config: bool,
}

impl Cli {
    /// Resolves the config path: `--config` or the platform default.
    fn config_path(&self) -> anyhow::Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => config_file_path().context("cannot determine the platform config directory"),
        }
    }

    /// Applies command-line overrides on top of the loaded config.
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(base_price) = self.base_price {
            config.customizer.base_price = base_price;
        }
    }
}

fn init_logging(fallback_level: &str) {
    // `RUST_LOG` wins; otherwise the config's `log_level`.  Logs go to stderr
    // so stdout carries only command responses.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn write_default_config(config: &AppConfig, path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        info!(path = %path.display(), "config file already exists; not overwriting");
        return Ok(());
    }
    save_config_to(config, path).with_context(|| format!("failed to write config to {}", path.display()))
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// # What happens at startup
///
/// 1. CLI arguments are parsed with `clap`.
/// 2. The config file is loaded (defaults when missing) and CLI overrides
///    applied.
/// 3. Logging is initialised with the config's `log_level` as fallback.
/// 4. The catalog provider named by `[catalog]` is built and its three feeds
///    start loading.
/// 5. Once every feed has settled, the command script runs to completion.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Configuration ─────────────────────────────────────────────────────────
    let config_path = cli.config_path()?;
    let mut config = load_config_from(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    cli.apply_overrides(&mut config);

    init_logging(&config.customizer.log_level);
    info!(config = %config_path.display(), "charmcase studio starting");

    if cli.init_config {
        write_default_config(&config, &config_path)?;
    }

    let settings = config.session_settings().context("invalid customizer settings")?;
    let provider = provider_from_config(&config.catalog).context("invalid catalog settings")?;

    // ── Session and catalog ───────────────────────────────────────────────────
    let session = CustomizerSession::new(settings);
    let session_id = session.id();
    let mut catalog = CatalogFeeds::spawn(provider);
    catalog.wait_settled().await;
    let state = AppState::new(session, catalog, config.display.price_format());
    info!(session = %session_id, "catalog settled; session ready");

    // ── Command loop ──────────────────────────────────────────────────────────
    let stdout = tokio::io::stdout();
    let stats = match &cli.script {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open script {}", path.display()))?;
            run_script(state, BufReader::new(file), stdout).await
        }
        None => run_script(state, BufReader::new(tokio::io::stdin()), stdout).await,
    }
    .context("command stream failed")?;

    info!(
        commands = stats.commands,
        failures = stats.failures,
        "charmcase studio finished"
    );
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
