pub mod scanner;

pub use scanner::{scan_lanes, LaneRegion, LaneScanResult};

pub(crate) const SCAN_START_Y_FACTOR: f32 = 0.82; // scan origin row, close to the vehicle
pub(crate) const SCAN_FAR_Y_FACTOR: f32 = 0.22; // target row at the far end of the cone
pub(crate) const SCAN_HALF_SPAN_FACTOR: f32 = 0.35; // half-width of the look-ahead cone
pub(crate) const SCAN_MIN_HALF_SPAN: f32 = 24.0; // floor for narrow masks
pub(crate) const SCAN_CURVATURE: f32 = 0.45; // damping on the parabola coefficient
pub(crate) const SCAN_STEP_X: usize = 2; // horizontal sampling stride
pub(crate) const BARRIER_RADIUS: usize = 2; // half-size of the lane-line neighborhood
