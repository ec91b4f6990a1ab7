use anyhow::Result;
use chrono::{Duration, Utc};
use chrono_tz::Asia::Shanghai;
use clap::Parser;
use tracing::{debug, info};

use meme_radar::config::PipelineConfig;
use meme_radar::orchestrator::run_daily;

/// Meme Radar - daily trending-meme pipeline
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory for the history table and per-day CSV snapshots
    /// (overrides [storage].data_dir)
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Directory for the display-ready JSON files
    /// (overrides [storage].display_dir)
    #[arg(short, long)]
    display_dir: Option<String>,

    /// Path to TOML config file; without one, defaults plus
    /// OPENAI_API_KEY/OPENAI_API_BASE from the environment are used
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    info!("Starting meme-radar");

    let args = Args::parse();

    let cfg = PipelineConfig::load(args.config.as_deref().map(std::path::Path::new))?;
    if let Some(ref path) = args.config {
        debug!("Loaded config from --config argument: {}", path);
    } else {
        debug!("No config file given, using defaults with environment fallback");
    }

    // Anchor the run day in China time; the sources and the history are
    // both China-local.
    let now = Utc::now().with_timezone(&Shanghai);
    let today = now.date_naive();
    let yesterday = today - Duration::days(1);
    let ymd_today = today.format("%Y-%m-%d").to_string();
    let ymd_yesterday = yesterday.format("%Y-%m-%d").to_string();

    let data_dir = args
        .output_dir
        .unwrap_or_else(|| cfg.storage.data_dir.clone());
    let display_dir = args
        .display_dir
        .unwrap_or_else(|| cfg.storage.display_dir.clone());

    info!(
        "Run setup - today={}, data_dir={}, display_dir={}",
        ymd_today, data_dir, display_dir
    );

    let summary = run_daily(
        &cfg,
        &ymd_today,
        &ymd_yesterday,
        std::path::Path::new(&data_dir),
        std::path::Path::new(&display_dir),
    )
    .await?;

    info!(
        "Run succeeded - records={}, degraded={}",
        summary.records, summary.degraded
    );
    Ok(())
}
