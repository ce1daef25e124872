//! Configuration loading for the navigator

use crate::navigate::decision::RuleThresholds;
use crate::navigate::property::distance::CalibrationSet;
use crate::navigate::property::zone::ZoneBoundaries;
use crate::navigate::{
    DEFAULT_FRAME_WIDTH, INITIAL_SEQUENCE_ID, LATERAL_SPEED, SETTLE_TICKS, SETTLE_TICK_MS,
};
use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure. Every field falls back to the reference calibration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    pub camera: CameraConfig,
    pub calibration: CalibrationSet,
    pub thresholds: RuleThresholds,
    pub zones: ZoneBoundaries,
    pub maneuver: ManeuverConfig,
    pub transport: TransportConfig,
    pub input: InputConfig,
}

#[derive(Copy, Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Used when a frame does not report its own width.
    pub frame_width: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            frame_width: DEFAULT_FRAME_WIDTH,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettleMode {
    /// Keep reading frames during a maneuver; suppress decisions until it settles.
    #[default]
    Cooldown,
    /// Stop reading frames until the maneuver has been dispatched.
    Blocking,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ManeuverConfig {
    /// Magnitude of the lateral velocity used to steer around an obstacle.
    pub lateral_speed: i32,
    pub settle_ticks: u32,
    pub tick_ms: u64,
    pub initial_sequence_id: u32,
    pub settle_mode: SettleMode,
}

impl Default for ManeuverConfig {
    fn default() -> Self {
        Self {
            lateral_speed: LATERAL_SPEED,
            settle_ticks: SETTLE_TICKS,
            tick_ms: SETTLE_TICK_MS,
            initial_sequence_id: INITIAL_SEQUENCE_ID,
            settle_mode: SettleMode::default(),
        }
    }
}

impl ManeuverConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn settle(&self) -> Duration {
        self.tick() * self.settle_ticks
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub serial_port: String,
    pub baud_rate: u32,
    pub serial_timeout_ms: u64,
    /// Zenoh key expression the block/resume codes are published on.
    pub announce_key: String,
    /// Log commands instead of sending them.
    pub dry_run: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            serial_port: "/dev/serial/by-id/usb-FTDI_FT232R_USB_UART_A50285BI-if00-port0"
                .to_string(),
            baud_rate: 115_200,
            serial_timeout_ms: 5000,
            announce_key: "spark/navigation/block".to_string(),
            dry_run: false,
        }
    }
}

impl TransportConfig {
    pub fn serial_timeout(&self) -> Duration {
        Duration::from_millis(self.serial_timeout_ms)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Stdin,
    File,
    Zenoh,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub source: InputKind,
    /// Frame file, for `source = "file"`.
    pub path: Option<PathBuf>,
    /// Key expression detection frames arrive on, for `source = "zenoh"`.
    pub key: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            source: InputKind::default(),
            path: None,
            key: "spark/detect/frames".to_string(),
        }
    }
}

impl NavigatorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: NavigatorConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.calibration.moving.is_valid(),
            "moving calibration must be strictly positive: {:?}",
            self.calibration.moving
        );
        ensure!(
            self.calibration.stationary.is_valid(),
            "static calibration must be strictly positive: {:?}",
            self.calibration.stationary
        );
        ensure!(self.zones.is_ordered(), "zone boundaries out of order: {:?}", self.zones);
        ensure!(self.camera.frame_width > 0, "camera.frame_width must be non-zero");
        ensure!(self.maneuver.settle_ticks > 0, "maneuver.settle_ticks must be non-zero");
        ensure!(self.maneuver.tick_ms > 0, "maneuver.tick_ms must be non-zero");
        ensure!(
            self.input.source != InputKind::File || self.input.path.is_some(),
            "input.path is required for file input"
        );
        Ok(())
    }

    pub fn needs_zenoh(&self) -> bool {
        !self.transport.dry_run || self.input.source == InputKind::Zenoh
    }
}
