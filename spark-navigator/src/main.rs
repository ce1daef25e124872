//! spark-navigator - obstacle-reactive motion control
//!
//! Reads tracked obstacle detections frame by frame, estimates their distance and
//! lateral position, and stops, steers or announces a blocked path.
//!
//! Usage:
//!   spark-navigator [config.toml]
//!   spark-navigator calibrate <pixel_width> <known_distance_cm> <known_width_cm>

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{bail, Context, Result};
use log::{error, info};
use spark_detect::source::JsonLinesSource;
use spark_detect::DetectionSource;
use spark_navigator::config::{InputKind, NavigatorConfig};
use spark_navigator::navigate::property::distance::CalibrationProfile;
use spark_navigator::Navigator;
use spark_transport::logging::{LogAnnouncer, LogMotionSink};
use spark_transport::serial::SerialMotionSink;
use spark_transport::zenoh_link::ZenohLink;
use spark_transport::{AnnouncementSink, MotionSink};
use std::path::Path;

const DEFAULT_CONFIG_FILE: &str = "navigator.toml";

#[tokio::main]
async fn main() -> Result<()> {
    spark_navigator::logging::init();

    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(String::as_str) == Some("calibrate") {
        return calibrate(&args[2..]);
    }

    let config = load_config(args.get(1).map(String::as_str))?;
    info!("spark-navigator v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Calibration: moving {:?}, static {:?}",
        config.calibration.moving, config.calibration.stationary
    );
    info!(
        "Stop at {}cm (moving) / {}cm (static), congestion gap {} within {}cm",
        config.thresholds.moving_stop_cm,
        config.thresholds.static_stop_cm,
        config.thresholds.congestion_gap,
        config.thresholds.congestion_range_cm
    );
    info!(
        "Settle {:?} per hold ({:?} mode)",
        config.maneuver.settle(),
        config.maneuver.settle_mode
    );

    let link = if config.needs_zenoh() {
        Some(ZenohLink::open().await?)
    } else {
        None
    };

    let (motion, announcer): (Box<dyn MotionSink>, Box<dyn AnnouncementSink>) =
        match (&link, config.transport.dry_run) {
            (_, true) => {
                info!("Dry run: commands are logged, not sent");
                (Box::new(LogMotionSink), Box::new(LogAnnouncer))
            }
            (Some(link), false) => (
                Box::new(SerialMotionSink::open(
                    &config.transport.serial_port,
                    config.transport.baud_rate,
                    config.transport.serial_timeout(),
                )?),
                Box::new(link.announcer(config.transport.announce_key.as_str())),
            ),
            (None, false) => bail!("announcements need a zenoh session"),
        };

    match config.input.source {
        InputKind::Stdin => run(&config, JsonLinesSource::stdin(), motion, announcer).await,
        InputKind::File => {
            let path = config
                .input
                .path
                .as_ref()
                .context("input.path is required for file input")?;
            let source = JsonLinesSource::open(path).await?;
            run(&config, source, motion, announcer).await
        }
        InputKind::Zenoh => {
            let link = link.as_ref().context("zenoh input without a zenoh session")?;
            let source = link.frame_source(&config.input.key).await?;
            run(&config, source, motion, announcer).await
        }
    }
}

async fn run<S: DetectionSource>(
    config: &NavigatorConfig,
    source: S,
    motion: Box<dyn MotionSink>,
    announcer: Box<dyn AnnouncementSink>,
) -> Result<()> {
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for the stop signal: {}", e);
            std::future::pending::<()>().await;
        }
    };

    Navigator::new(config, source, motion, announcer).run(shutdown).await?;
    Ok(())
}

fn load_config(arg: Option<&str>) -> Result<NavigatorConfig> {
    match arg {
        Some(path) => {
            info!("Loading configuration from {}", path);
            NavigatorConfig::load(Path::new(path))
        }
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            info!("Loading configuration from {}", DEFAULT_CONFIG_FILE);
            NavigatorConfig::load(Path::new(DEFAULT_CONFIG_FILE))
        }
        None => {
            info!("Using default configuration");
            Ok(NavigatorConfig::default())
        }
    }
}

fn calibrate(args: &[String]) -> Result<()> {
    let [pixel_width, known_distance, known_width] = args else {
        bail!(
            "usage: spark-navigator calibrate <pixel_width> <known_distance_cm> <known_width_cm>"
        );
    };
    let pixel_width: f32 = pixel_width.parse().context("pixel_width")?;
    let known_distance: f32 = known_distance.parse().context("known_distance_cm")?;
    let known_width: f32 = known_width.parse().context("known_width_cm")?;
    if known_width <= 0.0 {
        bail!("known_width_cm must be positive");
    }

    let focal =
        CalibrationProfile::focal_length_from_reference(pixel_width, known_distance, known_width);
    println!("focal_length = {:.2}", focal);
    Ok(())
}
