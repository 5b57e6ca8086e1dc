/// Physical and doctrine constants used in firing solution calculations

/// Gravitational acceleration in m/s²
///
/// Rounded value used throughout the solver. Regression figures for the
/// charge tables were produced with 9.81, not the standard 9.80665.
pub const G_ACCEL_MPS2: f64 = 9.81;

/// Mils in a full circle (NATO mil)
pub const MILS_PER_CIRCLE: f64 = 6400.0;

/// Conversion factor: degrees to mils (6400 / 360)
pub const MILS_PER_DEGREE: f64 = MILS_PER_CIRCLE / 360.0;

/// Default integration time step in seconds
///
/// Value: 0.0333 s (one frame at ~30 Hz)
///
/// Note: the step is a display-cadence figure rather than an accuracy target.
/// A smaller step changes solved angles by a few hundredths of a degree and
/// shifts every regression value tied to this constant.
pub const DEFAULT_TIME_STEP_S: f64 = 0.0333;

/// Maximum simulated flight time in seconds
pub const MAX_FLIGHT_TIME_S: f64 = 100.0;

/// Golden-section search termination width in degrees
pub const ANGLE_TOLERANCE_DEG: f64 = 0.01;

/// Hard cap on golden-section iterations
///
/// A 45° bracket reaches 0.01° in about 16 iterations; the cap only trips on
/// non-finite or otherwise pathological inputs.
pub const MAX_SEARCH_ITERATIONS: usize = 200;

/// Low-angle (direct fire) search bracket in degrees
pub const DIRECT_BRACKET_DEG: (f64, f64) = (0.0, 45.0);

/// High-angle (indirect fire) search bracket in degrees
pub const INDIRECT_BRACKET_DEG: (f64, f64) = (45.0, 90.0);

// Doctrine constants
//
// These reproduce the selection rules of the M252 fire direction tables in use.
// No derivation is recorded for the tolerances or the long-range cutoff, so all
// of them are exposed through `Doctrine` and can be overridden by config.

/// Minimum tube elevation in mils (M252 mechanical limit)
pub const MIN_ELEVATION_MILS: f64 = 800.0;

/// Range beyond which a target counts as long range (meters)
pub const LONG_RANGE_THRESHOLD_M: f64 = 1000.0;

/// Accepted indirect/direct error ratio at standard range
pub const STANDARD_INDIRECT_TOLERANCE: f64 = 1.5;

/// Accepted indirect/direct error ratio at long range
pub const LONG_RANGE_INDIRECT_TOLERANCE: f64 = 2.0;

// Trajectory trace limits (display sampling only)

/// Trace stops once the round is this factor beyond the target range
pub const TRACE_RANGE_OVERSHOOT: f64 = 1.2;

/// Trace stops once the round is this far below the lower of the two elevations (meters)
pub const TRACE_FLOOR_MARGIN_M: f64 = 200.0;

/// Maximum number of trace samples
pub const TRACE_MAX_STEPS: usize = 5000;
