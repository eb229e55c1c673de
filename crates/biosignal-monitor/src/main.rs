//! Headless host for the biosignal monitor: runs simulated sessions and
//! manages the saved measurement list and preferences on disk.

mod cli;
mod commands;
mod config;

use anyhow::anyhow;
use clap::ArgMatches;
use config::MonitorConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Config file first, then command-line overrides.
fn resolve_config(matches: &ArgMatches) -> anyhow::Result<MonitorConfig> {
    let mut cfg = MonitorConfig::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    if let Some(dir) = matches.get_one::<PathBuf>("data-dir") {
        cfg.store.data_dir = dir.clone();
    }
    Ok(cfg)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches();
    init_tracing(matches.get_flag("log-json"));
    let cfg = resolve_config(&matches)?;

    match matches.subcommand() {
        Some(("monitor", args)) => commands::monitor(&cfg, args).await,
        Some(("list", args)) => commands::list(&cfg, args),
        Some(("summary", _)) => commands::summary(&cfg),
        Some(("clear", _)) => commands::clear(&cfg),
        Some(("onboarding", args)) => commands::onboarding(&cfg, args),
        Some(("settings", args)) => commands::settings(&cfg, args),
        Some(("metrics", args)) => commands::metrics(&cfg, args).await,
        Some((name, _)) => Err(anyhow!("unknown command: {name}")),
        None => Err(anyhow!("no command given")),
    }
}
