//! Sheaf distribution: spreading several launchers' aim points around one target.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{SolverError, SolverResult};
use crate::geometry::{
    bearing_to_mils, bearing_unit_vector, normalize_degrees, perpendicular_unit_vector,
    range_and_bearing, Point2D,
};

/// Sheaf pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheafPattern {
    /// Across the bearing, alternating right and left of the target
    #[default]
    Open,
    /// Across the bearing, centred, at half spacing
    Closed,
    /// Along the bearing, centred
    Linear,
    /// Grid of ceil(√N) columns across the bearing
    Rectangular,
}

impl SheafPattern {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" => Some(SheafPattern::Open),
            "closed" => Some(SheafPattern::Closed),
            "linear" => Some(SheafPattern::Linear),
            "rectangular" | "rect" => Some(SheafPattern::Rectangular),
            _ => None,
        }
    }

    /// (across, along) offsets in meters for launcher `index` of `count`
    pub fn offsets(&self, index: usize, count: usize, spread: f64) -> (f64, f64) {
        let i = index as f64;
        let n = count as f64;
        let centred = i - (n - 1.0) / 2.0;

        match self {
            SheafPattern::Open => {
                let side = if index % 2 == 0 { 1.0 } else { -1.0 };
                (spread * (index / 2) as f64 * side, 0.0)
            }
            SheafPattern::Closed => (spread / 2.0 * centred, 0.0),
            SheafPattern::Linear => (0.0, spread * centred),
            SheafPattern::Rectangular => {
                let cols = (count as f64).sqrt().ceil().max(1.0) as usize;
                let rows = count.div_ceil(cols);
                let col = (index % cols) as f64;
                let row = (index / cols) as f64;
                (
                    spread * (col - (cols as f64 - 1.0) / 2.0),
                    spread * (row - (rows as f64 - 1.0) / 2.0),
                )
            }
        }
    }
}

impl fmt::Display for SheafPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SheafPattern::Open => "open",
            SheafPattern::Closed => "closed",
            SheafPattern::Linear => "linear",
            SheafPattern::Rectangular => "rectangular",
        };
        write!(f, "{}", name)
    }
}

/// Aim point and laying data for one launcher in the sheaf
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SheafAssignment {
    pub launcher_index: usize,
    pub launcher: Point2D,
    pub adjusted_target: Point2D,
    /// meters, from this launcher to its own aim point
    pub range: f64,
    pub bearing_deg: f64,
    pub bearing_mils: u32,
}

/// Distribute aim points for `launchers` around `target`
///
/// `orientation_deg` is the sheaf axis; it defaults to the bearing from the
/// first launcher to the target. Each launcher's range and bearing are
/// computed from its own position to its own aim point.
pub fn compute_sheaf(
    launchers: &[Point2D],
    target: Point2D,
    spread: f64,
    pattern: SheafPattern,
    orientation_deg: Option<f64>,
) -> SolverResult<Vec<SheafAssignment>> {
    let Some(first) = launchers.first() else {
        return Ok(Vec::new());
    };
    if !target.is_finite() || launchers.iter().any(|p| !p.is_finite()) {
        return Err(SolverError::InvalidInput("sheaf coordinates must be finite".to_string()));
    }
    if !spread.is_finite() {
        return Err(SolverError::InvalidInput("sheaf spread must be finite".to_string()));
    }

    let axis_deg = match orientation_deg {
        Some(deg) if deg.is_finite() => normalize_degrees(deg),
        Some(_) => {
            return Err(SolverError::InvalidInput("sheaf orientation must be finite".to_string()))
        }
        None => range_and_bearing(*first, target).bearing_deg,
    };
    let along = bearing_unit_vector(axis_deg);
    let across = perpendicular_unit_vector(axis_deg);
    let count = launchers.len();

    debug!(
        "{} sheaf of {} launchers, spread {:.0} m, axis {:.1}°",
        pattern, count, spread, axis_deg
    );

    let assignments = launchers
        .iter()
        .enumerate()
        .map(|(index, &launcher)| {
            let (across_offset, along_offset) = pattern.offsets(index, count, spread);
            let adjusted_target = target.offset(across * across_offset + along * along_offset);
            let rb = range_and_bearing(launcher, adjusted_target);

            SheafAssignment {
                launcher_index: index,
                launcher,
                adjusted_target,
                range: rb.horizontal_distance,
                bearing_deg: rb.bearing_deg,
                bearing_mils: bearing_to_mils(rb.bearing_deg),
            }
        })
        .collect();

    Ok(assignments)
}
