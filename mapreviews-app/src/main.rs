use anyhow::{Context, Result};
use clap::Parser;
use mapreviews_common::observability::{LogConfig, LogFormat, init_logging};
use mapreviews_config::{MapReviewsConfig, MapReviewsConfigLoader};
use mapreviews_drivers::browser::driver::FantocciniBrowser;
use mapreviews_harvest::Orchestrator;
use mapreviews_runtime::{MapReviewsRuntime, Scheduler};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "mapreviews")]
#[command(about = "Harvest map-listing reviews on a schedule")]
struct Cli {
    /// YAML or JSON config listing the businesses to scrape.
    #[arg(long, short, env = "MAPREVIEWS_CONFIG", default_value = "mapreviews.yaml")]
    config: PathBuf,

    /// Do a single run and exit instead of repeating on the schedule.
    #[arg(long)]
    once: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // File first, then `MAPREVIEWS__` environment overrides.
    let cfg: MapReviewsConfig = MapReviewsConfigLoader::new()
        .with_file(&cli.config)
        .load()
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    let log_path = init_logging(log_config(&cfg)?)?;
    info!(config = %cli.config.display(), log = %log_path.display(), "mapreviews starting");

    let runtime = MapReviewsRuntime::build("mapreviews", None)?;
    let result = serve(&runtime, &cfg, cli.once);
    runtime.shutdown(Duration::from_secs(5));
    result
}

fn log_config(cfg: &MapReviewsConfig) -> Result<LogConfig> {
    Ok(LogConfig {
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cfg.logging.stderr,
        format: cfg.logging.format.parse::<LogFormat>()?,
        default_filter: cfg.logging.filter.clone(),
        ..LogConfig::default()
    })
}

fn serve(runtime: &MapReviewsRuntime, cfg: &MapReviewsConfig, once: bool) -> Result<()> {
    let browser = FantocciniBrowser::new(cfg.browser.webdriver_url.clone(), cfg.browser.headless);
    if let Err(e) = runtime.block_on(browser.probe()) {
        error!(webdriver = %cfg.browser.webdriver_url, error = %e, "browser could not be started");
        return Err(e.context("browser startup failed"));
    }

    let orchestrator = Orchestrator::new(browser, cfg);
    let orchestrator = &orchestrator;
    let businesses = cfg.businesses.as_slice();
    runtime.cancel_on_ctrl_c();

    if once {
        match runtime.block_until_cancelled(orchestrator.run(businesses)) {
            Some(summary) => {
                summary?;
            }
            None => warn!("run interrupted before completion"),
        }
        return Ok(());
    }

    let scheduler = Scheduler::new("harvest", cfg.schedule.interval());
    info!(every_hours = cfg.schedule.interval_hours, "schedule armed");
    runtime.run_scheduled(&scheduler, move || async move {
        orchestrator.run(businesses).await?;
        Ok(())
    });

    Ok(())
}
