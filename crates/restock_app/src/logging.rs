//! Log stream setup for the restock binary.
//!
//! Two append-only files: the operational log (decisions, errors) and the
//! diagnostics log (false-positive timings). `--verbose` mirrors the
//! operational stream to the terminal.

use std::fs::{File, OpenOptions};
use std::path::Path;

use anyhow::Context;
use engine_logging::DIAGNOSTICS_TARGET;
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

pub struct LogSettings<'a> {
    pub operational: &'a Path,
    pub diagnostics: &'a Path,
    pub verbose: bool,
}

/// Failing to open either file is fatal.
pub fn initialize(settings: &LogSettings<'_>) -> anyhow::Result<()> {
    let level = LevelFilter::Info;

    let operational = operational_config();
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![
        WriteLogger::new(level, operational.clone(), open_append(settings.operational)?),
        WriteLogger::new(
            level,
            diagnostics_config(),
            open_append(settings.diagnostics)?,
        ),
    ];
    if settings.verbose {
        loggers.push(TermLogger::new(
            level,
            operational,
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }

    CombinedLogger::init(loggers).context("installing logger")
}

fn operational_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .add_filter_ignore_str(DIAGNOSTICS_TARGET)
        .build()
}

fn diagnostics_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str(DIAGNOSTICS_TARGET)
        .build()
}

fn open_append(path: &Path) -> anyhow::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))
}
