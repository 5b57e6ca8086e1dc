//! Planar grid geometry: range, bearing and bearing unit vectors.
//!
//! Bearings are measured clockwise from grid north (the northing axis), with
//! easting as the cross axis. Everything here works on a flat local plane.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{MILS_PER_CIRCLE, MILS_PER_DEGREE};

/// A point on the local grid plane (meters)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub easting: f64,
    pub northing: f64,
}

impl Point2D {
    pub fn new(easting: f64, northing: f64) -> Self {
        Point2D { easting, northing }
    }

    /// Grid vector (easting, northing)
    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.easting, self.northing)
    }

    pub fn from_vector(v: Vector2<f64>) -> Self {
        Point2D::new(v.x, v.y)
    }

    /// Translate the point by a grid offset
    pub fn offset(self, delta: Vector2<f64>) -> Self {
        Point2D::from_vector(self.to_vector() + delta)
    }

    pub fn is_finite(&self) -> bool {
        self.easting.is_finite() && self.northing.is_finite()
    }
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:.1} N{:.1}", self.easting, self.northing)
    }
}

/// A grid point with its elevation above the common datum
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub point: Point2D,
    /// meters
    pub elevation: f64,
}

impl Position {
    pub fn new(easting: f64, northing: f64, elevation: f64) -> Self {
        Position {
            point: Point2D::new(easting, northing),
            elevation,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.point.is_finite() && self.elevation.is_finite()
    }
}

/// Horizontal range and grid bearing between two points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeBearing {
    /// meters, elevation excluded
    pub horizontal_distance: f64,
    /// degrees in [0, 360)
    pub bearing_deg: f64,
}

impl RangeBearing {
    pub fn bearing_mils(&self) -> u32 {
        bearing_to_mils(self.bearing_deg)
    }
}

/// Range and bearing from `from` to `to`
///
/// Coincident points give a zero range and a bearing of 0.
pub fn range_and_bearing(from: Point2D, to: Point2D) -> RangeBearing {
    let delta = to.to_vector() - from.to_vector();
    let horizontal_distance = delta.norm();

    // atan2(0, 0) is 0 so coincident points need no special case
    let bearing_deg = normalize_degrees(delta.x.atan2(delta.y).to_degrees());

    RangeBearing {
        horizontal_distance,
        bearing_deg,
    }
}

/// Wrap an angle into [0, 360)
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

pub fn degrees_to_mils(degrees: f64) -> f64 {
    degrees * MILS_PER_DEGREE
}

pub fn mils_to_degrees(mils: f64) -> f64 {
    mils / MILS_PER_DEGREE
}

/// Whole-mil bearing for a bearing in degrees, wrapped into [0, 6400)
pub fn bearing_to_mils(bearing_deg: f64) -> u32 {
    let mils = degrees_to_mils(normalize_degrees(bearing_deg)).round();
    (mils.rem_euclid(MILS_PER_CIRCLE)) as u32
}

/// Unit vector pointing along a grid bearing
pub fn bearing_unit_vector(bearing_deg: f64) -> Vector2<f64> {
    let rad = bearing_deg.to_radians();
    Vector2::new(rad.sin(), rad.cos())
}

/// Unit vector 90° clockwise of a grid bearing (the "right" direction)
pub fn perpendicular_unit_vector(bearing_deg: f64) -> Vector2<f64> {
    bearing_unit_vector(bearing_deg + 90.0)
}

/// Angular unit of a bearing entered by an operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BearingUnit {
    #[default]
    Degrees,
    Mils,
}

impl BearingUnit {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "deg" | "degree" | "degrees" => Some(BearingUnit::Degrees),
            "mil" | "mils" => Some(BearingUnit::Mils),
            _ => None,
        }
    }
}

/// A bearing value tagged with its unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bearing {
    pub value: f64,
    pub unit: BearingUnit,
}

impl Bearing {
    pub fn degrees(value: f64) -> Self {
        Bearing { value, unit: BearingUnit::Degrees }
    }

    pub fn mils(value: f64) -> Self {
        Bearing { value, unit: BearingUnit::Mils }
    }

    /// Bearing in degrees, normalized to [0, 360)
    pub fn to_degrees(self) -> f64 {
        let degrees = match self.unit {
            BearingUnit::Degrees => self.value,
            BearingUnit::Mils => mils_to_degrees(self.value),
        };
        normalize_degrees(degrees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_range_and_bearing_cardinal_directions() {
        let origin = Point2D::new(0.0, 0.0);

        let north = range_and_bearing(origin, Point2D::new(0.0, 1000.0));
        assert!((north.horizontal_distance - 1000.0).abs() < EPS);
        assert!(north.bearing_deg.abs() < EPS);

        let east = range_and_bearing(origin, Point2D::new(500.0, 0.0));
        assert!((east.bearing_deg - 90.0).abs() < EPS);

        let south = range_and_bearing(origin, Point2D::new(0.0, -200.0));
        assert!((south.bearing_deg - 180.0).abs() < EPS);

        let west = range_and_bearing(origin, Point2D::new(-300.0, 0.0));
        assert!((west.bearing_deg - 270.0).abs() < EPS);
    }

    #[test]
    fn test_range_ignores_elevation_and_is_symmetric() {
        let a = Point2D::new(4800.0, 11000.0);
        let b = Point2D::new(5230.0, 12150.0);

        let ab = range_and_bearing(a, b);
        let ba = range_and_bearing(b, a);

        assert!((ab.horizontal_distance - ba.horizontal_distance).abs() < EPS);
        let reverse = (ba.bearing_deg + 180.0) % 360.0;
        assert!((ab.bearing_deg - reverse).abs() < 1e-9);
    }

    #[test]
    fn test_coincident_points_bearing_zero() {
        let p = Point2D::new(123.0, 456.0);
        let rb = range_and_bearing(p, p);
        assert_eq!(rb.horizontal_distance, 0.0);
        assert_eq!(rb.bearing_deg, 0.0);
    }

    #[test]
    fn test_normalize_degrees() {
        assert!((normalize_degrees(-90.0) - 270.0).abs() < EPS);
        assert!((normalize_degrees(720.0)).abs() < EPS);
        assert!((normalize_degrees(359.5) - 359.5).abs() < EPS);
        assert!(normalize_degrees(-1e-18) < 360.0);
    }

    #[test]
    fn test_mils_conversions() {
        assert!((degrees_to_mils(360.0) - 6400.0).abs() < EPS);
        assert!((degrees_to_mils(45.0) - 800.0).abs() < EPS);
        assert!((mils_to_degrees(1600.0) - 90.0).abs() < EPS);
        assert_eq!(bearing_to_mils(90.0), 1600);
        assert_eq!(bearing_to_mils(359.999), 0);
    }

    #[test]
    fn test_bearing_units_normalize() {
        assert!((Bearing::mils(1600.0).to_degrees() - 90.0).abs() < EPS);
        assert!((Bearing::degrees(-45.0).to_degrees() - 315.0).abs() < EPS);
        assert!((Bearing::mils(6400.0).to_degrees()).abs() < EPS);
        assert_eq!(BearingUnit::from_str("MILS"), Some(BearingUnit::Mils));
        assert_eq!(BearingUnit::from_str("deg"), Some(BearingUnit::Degrees));
        assert_eq!(BearingUnit::from_str("grad"), None);
    }

    #[test]
    fn test_perpendicular_is_clockwise() {
        // facing north, right is east
        let right = perpendicular_unit_vector(0.0);
        assert!((right.x - 1.0).abs() < EPS);
        assert!(right.y.abs() < EPS);

        // facing east, right is south
        let right = perpendicular_unit_vector(90.0);
        assert!(right.x.abs() < EPS);
        assert!((right.y + 1.0).abs() < EPS);
    }

    #[test]
    fn test_point_offset() {
        let p = Point2D::new(100.0, 200.0).offset(Vector2::new(5.0, -10.0));
        assert_eq!(p, Point2D::new(105.0, 190.0));
    }
}
