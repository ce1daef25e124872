pub mod decision;
pub mod engine;
pub mod pattern;
pub mod property;

// --- Calibration (reference camera, 640x480) ---
pub(crate) const DEFAULT_FRAME_WIDTH: u32 = 640;
/// Physical width of the calibration target, in centimeters.
pub(crate) const KNOWN_OBSTACLE_WIDTH_CM: f32 = 35.0;
pub(crate) const MOVING_FOCAL_LENGTH: f32 = 600.0;
pub(crate) const STATIC_FOCAL_LENGTH: f32 = 630.0;

// --- Rule thresholds ---
pub(crate) const MOVING_STOP_DISTANCE_CM: f32 = 100.0;
pub(crate) const STATIC_STOP_DISTANCE_CM: f32 = 100.0;
/// R3 is only considered for obstacles nearer than this.
pub(crate) const CONGESTION_RANGE_CM: f32 = 150.0;
/// Minimum centroid gap (pixel space) below which two obstacles block the path together.
pub(crate) const CONGESTION_GAP: u32 = 450;
pub(crate) const CONGESTION_STOP_DISTANCE_CM: f32 = 100.0;

// --- Lateral zones, pixel space ---
pub(crate) const LEFT_ZONE_MAX_X: f32 = 280.0;
pub(crate) const MID_ZONE_MIN_X: f32 = 281.0;
pub(crate) const MID_ZONE_MAX_X: f32 = 340.0;
pub(crate) const NARROW_MAX_WIDTH: f32 = 352.0;

// --- Maneuvers ---
pub(crate) const LATERAL_SPEED: i32 = 1000;
pub(crate) const SETTLE_TICKS: u32 = 5;
pub(crate) const SETTLE_TICK_MS: u64 = 1000;
pub(crate) const INITIAL_SEQUENCE_ID: u32 = 1;
