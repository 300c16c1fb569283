//! Handorbit Daemon - Main entry point
//!
//! Accepts hand tracking frames over HTTP/WebSocket, drives an orbit camera
//! from pinch gestures and streams the camera pose back to clients.

mod api;
mod config;
mod replay;
mod server;
mod state;
mod ws;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "handorbit")]
#[command(about = "Pinch gesture orbit camera daemon")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "handorbit.toml")]
    config: PathBuf,

    /// Bind address for web server
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Replay a JSON Lines recording of detection frames and exit
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Write a default configuration file to the config path and exit
    #[arg(long)]
    write_default_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
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
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Handorbit v{}", env!("CARGO_PKG_VERSION"));

    if args.write_default_config {
        config::save_default_config(&args.config)?;
        println!("Wrote default configuration to {}", args.config.display());
        return Ok(());
    }

    // Load configuration
    let mut config = config::load_config(&args.config)?;

    // Override bind address if specified
    if let Some(bind) = args.bind {
        config.daemon.bind = bind;
    }

    info!(
        pinch_threshold = config.gestures.pinch_threshold,
        rotation_speed = config.gestures.rotation_speed,
        zoom_step = config.gestures.zoom_step,
        "Configuration loaded"
    );

    if let Some(path) = args.replay {
        // Offline replay mode
        let summary = replay::replay_file(&path, &config)?;
        println!(
            "Replayed {} frames ({} skipped): {} rotations, {} zoom steps",
            summary.frames, summary.skipped, summary.rotations, summary.zooms
        );
        if let Some(pose) = summary.final_pose {
            println!(
                "  Camera at ({:.3}, {:.3}, {:.3}), distance {:.3}, azimuth {:.3}, polar {:.3}",
                pose.position.x,
                pose.position.y,
                pose.position.z,
                pose.distance,
                pose.azimuth,
                pose.polar
            );
        }
    } else {
        // Daemon mode - serve frames in, camera updates out
        let bind = config.daemon.bind.clone();
        let state = state::AppState::new(config);
        server::run(state, &bind).await?;
    }

    Ok(())
}
