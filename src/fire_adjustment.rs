//! Fire adjustment: moving the aim point from observer corrections.
//!
//! Range corrections are "add" (farther from the launcher) and "drop"
//! (closer); deflection corrections are "right" (clockwise of the bearing) and
//! "left". Corrections always apply to the original, unadjusted target, so
//! repeated adjustments never accumulate drift.

use serde::{Deserialize, Serialize};

use crate::error::{SolverError, SolverResult};
use crate::geometry::{
    bearing_unit_vector, perpendicular_unit_vector, range_and_bearing, Bearing, Point2D,
};

/// One observer correction call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Correction {
    Add,
    Drop,
    Left,
    Right,
}

/// Running total of corrections for one target
///
/// Opposing calls cancel: at most one of add/drop and one of left/right is
/// non-zero. Values are whole meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AdjustmentTally {
    pub add: f64,
    pub drop: f64,
    pub left: f64,
    pub right: f64,
}

/// Split a signed net into (positive side, negative side)
fn split_net(net: f64) -> (f64, f64) {
    if net >= 0.0 {
        (net, 0.0)
    } else {
        (0.0, -net)
    }
}

fn whole_meters(value: f64) -> f64 {
    value.round().max(0.0)
}

impl AdjustmentTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a correction of `amount` meters
    pub fn record(&mut self, correction: Correction, amount: f64) {
        match correction {
            Correction::Add => (self.add, self.drop) = split_net(self.add + amount - self.drop),
            Correction::Drop => (self.add, self.drop) = split_net(self.add - (self.drop + amount)),
            Correction::Right => (self.right, self.left) = split_net(self.right + amount - self.left),
            Correction::Left => (self.right, self.left) = split_net(self.right - (self.left + amount)),
        }

        self.add = whole_meters(self.add);
        self.drop = whole_meters(self.drop);
        self.left = whole_meters(self.left);
        self.right = whole_meters(self.right);
    }

    /// Builder form of `record`
    pub fn with(mut self, correction: Correction, amount: f64) -> Self {
        self.record(correction, amount);
        self
    }

    /// Positive = farther from the launcher
    pub fn range_correction(&self) -> f64 {
        self.add - self.drop
    }

    /// Positive = clockwise (right)
    pub fn deflection_correction(&self) -> f64 {
        self.right - self.left
    }

    pub fn is_zero(&self) -> bool {
        self.range_correction() == 0.0 && self.deflection_correction() == 0.0
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Compute the adjusted target point
///
/// With `bearing_override`, the corrections are laid off from the original
/// target along that bearing and its clockwise perpendicular. Without it, the
/// launcher→target bearing is recomputed, the range correction is added to the
/// launcher→target range, and the new point is re-derived from the launcher
/// before the deflection is applied.
pub fn apply_adjustment(
    launcher: Point2D,
    original_target: Point2D,
    range_correction: f64,
    deflection_correction: f64,
    bearing_override: Option<Bearing>,
) -> SolverResult<Point2D> {
    if !launcher.is_finite() || !original_target.is_finite() {
        return Err(SolverError::InvalidInput("adjustment coordinates must be finite".to_string()));
    }
    if !range_correction.is_finite() || !deflection_correction.is_finite() {
        return Err(SolverError::InvalidInput("adjustment amounts must be finite".to_string()));
    }

    let adjusted = match bearing_override {
        Some(bearing) => {
            if !bearing.value.is_finite() {
                return Err(SolverError::InvalidInput("adjustment bearing must be finite".to_string()));
            }
            let bearing_deg = bearing.to_degrees();
            original_target.offset(
                bearing_unit_vector(bearing_deg) * range_correction
                    + perpendicular_unit_vector(bearing_deg) * deflection_correction,
            )
        }
        None => {
            let baseline = range_and_bearing(launcher, original_target);
            let new_range = baseline.horizontal_distance + range_correction;
            launcher.offset(
                bearing_unit_vector(baseline.bearing_deg) * new_range
                    + perpendicular_unit_vector(baseline.bearing_deg) * deflection_correction,
            )
        }
    };

    Ok(adjusted)
}

/// Apply a tally of corrections to the original target
pub fn apply_tally(
    launcher: Point2D,
    original_target: Point2D,
    tally: &AdjustmentTally,
    bearing_override: Option<Bearing>,
) -> SolverResult<Point2D> {
    apply_adjustment(
        launcher,
        original_target,
        tally.range_correction(),
        tally.deflection_correction(),
        bearing_override,
    )
}
