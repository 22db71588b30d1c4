mod config;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use engine_logging::{engine_error, engine_info};
use restock_engine::{
    load_alert_store, load_targets, save_alert_store, system_clock, ArtifactWriter, HttpBrowser,
    Monitor, MonitorConfig,
};

use crate::config::AppConfig;
use crate::logging::LogSettings;

const DEFAULT_CONFIG: &str = "restock.ron";

/// Probe every product page once, alert on new restocks, persist state and exit.
#[derive(Parser, Debug)]
#[command(name = "restock")]
struct Args {
    /// Path to the RON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log notifications instead of sending them
    #[arg(long)]
    dry_run: bool,

    /// Mirror the operational log to the terminal
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let explicit = args.config.is_some();
    let config_path = args.config.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let config = match AppConfig::load(&config_path, explicit) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("restock: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = logging::initialize(&LogSettings {
        operational: &config.operational_log,
        diagnostics: &config.diagnostics_log,
        verbose: args.verbose,
    }) {
        eprintln!("restock: {err:#}");
        return ExitCode::FAILURE;
    }

    match run(&config, args.dry_run).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            engine_error!("Fatal: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &AppConfig, dry_run: bool) -> anyhow::Result<()> {
    let targets = load_targets(&config.targets_path).context("loading target list")?;
    let mut store = load_alert_store(&config.state_path).context("loading alert state")?;
    let monitored = config.quirk_table().apply(targets.targets);

    let notifier = config.build_notifier(dry_run, |name| std::env::var(name).ok())?;
    notifier
        .verify()
        .await
        .context("verifying notification channel")?;

    let browser = HttpBrowser::new(config.fetch_settings()).context("building http client")?;
    let artifacts = match &config.screenshot_dir {
        Some(dir) => ArtifactWriter::new(dir),
        None => ArtifactWriter::disabled(),
    };
    let monitor = Monitor::new(
        Box::new(browser),
        notifier,
        MonitorConfig {
            cooldown: config.cooldown(),
            probe: config.probe_settings(),
            artifacts,
            clock: system_clock(),
        },
    );

    engine_info!("Checking {} targets", monitored.len());
    let report = monitor.run_cycle(&monitored, &mut store).await;
    for fired in report.fired() {
        engine_info!("Fired for {} ({:?})", fired.url, fired.delivery);
    }

    save_alert_store(&config.state_path, &store).context("saving alert state")?;
    Ok(())
}
