//! Radar frame export service.
//!
//! Periodically builds composite radar frames for a configured viewport:
//! - Refreshes the provider timestamp catalog
//! - Fetches and stitches the covering tile grid per timestamp
//! - Persists labelled composites to the frame cache directory
//! - Keeps a bounded, time-ordered animation window on disk

mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use frame_cache::FrameCache;
use mosaic::LabelStyle;
use pipeline::{HttpTransport, PipelineConfig, RadarPipeline};

use config::ExportConfig;

#[derive(Parser, Debug)]
#[command(name = "radar-export")]
#[command(about = "Composite radar frame exporter")]
struct Args {
    /// Run one fetch cycle and exit (vs continuous polling)
    #[arg(long)]
    once: bool,

    /// Configuration file
    #[arg(long, env = "RADAR_CONFIG", default_value = "config/radar.yaml")]
    config: PathBuf,

    /// Override the cache directory from the config file
    #[arg(long, env = "RADAR_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting radar frame exporter");

    let config = ExportConfig::load(&args.config)?;
    let cache_dir = args.cache_dir.unwrap_or_else(|| config.cache_dir.clone());

    let mut label = LabelStyle::new(&config.attribution);
    if let Some(font_path) = &config.font_path {
        label = label.with_font_path(font_path);
    }

    let pipeline_config = PipelineConfig {
        catalog_url: config.catalog_url.clone(),
        frame_count: config.frame_count,
        params: config.tiles.to_params(),
        ..PipelineConfig::default()
    };

    let transport = Arc::new(HttpTransport::new()?);
    let cache = FrameCache::open(&cache_dir)?;
    let mut pipeline = RadarPipeline::new(pipeline_config, transport, cache, label);
    pipeline.configure_viewport(config.viewport.to_viewport());

    info!(
        latitude = config.viewport.latitude,
        longitude = config.viewport.longitude,
        zoom = config.viewport.zoom,
        cache_dir = %cache_dir.display(),
        "Viewport configured"
    );

    if args.once {
        info!("Running single fetch cycle");
        let frames = pipeline.request_frames().await?;
        log_cycle(&frames);
        return Ok(());
    }

    info!(
        refresh_minutes = config.refresh_minutes,
        "Starting continuous polling"
    );

    let mut interval = tokio::time::interval(Duration::from_secs(config.refresh_minutes * 60));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match pipeline.request_frames().await {
                    Ok(frames) => log_cycle(&frames),
                    Err(e @ radar_core::RadarError::NotConfigured) => {
                        error!(error = %e, "Unrecoverable pipeline error");
                        return Err(e.into());
                    }
                    Err(e) => {
                        // Keep animating from the last good window.
                        warn!(error = %e, "Fetch cycle failed, retrying next interval");
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
        }
    }

    info!(frames = pipeline.frames().len(), "Export session complete");
    Ok(())
}

fn log_cycle(frames: &[radar_core::RadarFrame]) {
    let timestamps: Vec<i64> = frames.iter().map(|f| f.timestamp).collect();
    let unpersisted = frames.iter().filter(|f| f.path.is_none()).count();
    info!(
        frames = frames.len(),
        ?timestamps,
        unpersisted,
        "Fetch cycle complete"
    );
}
