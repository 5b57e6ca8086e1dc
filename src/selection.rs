//! Per-charge solving, ranking and doctrine-based selection.
//!
//! Every charge is solved in both the direct ([0°, 45°]) and indirect
//! ([45°, 90°]) brackets. Charges are ranked by their best miss distance, and
//! `select_solution` applies the doctrine rules to one ranked entry. The same
//! function serves both the automatic choice (index 0) and an operator's
//! explicit charge choice.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::angle_solver::{solve_angle, AngleSolution, FiringProblem, SearchParams};
use crate::charges::{Charge, ChargeCatalog};
use crate::constants::{
    DIRECT_BRACKET_DEG, INDIRECT_BRACKET_DEG, LONG_RANGE_INDIRECT_TOLERANCE, LONG_RANGE_THRESHOLD_M,
    MIN_ELEVATION_MILS, STANDARD_INDIRECT_TOLERANCE,
};
use crate::error::{SolverError, SolverResult};
use crate::geometry::{bearing_to_mils, Position, RangeBearing};
use crate::trajectory::SimulationParams;

/// Selection rules for choosing between direct and indirect fire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Doctrine {
    /// Lowest elevation the tube can be laid at (mils)
    pub min_elevation_mils: f64,
    /// meters
    pub long_range_threshold: f64,
    /// Indirect accepted while its error ≤ direct error × this factor
    pub standard_tolerance: f64,
    /// Same factor beyond `long_range_threshold`
    pub long_range_tolerance: f64,
}

impl Default for Doctrine {
    fn default() -> Self {
        Doctrine {
            min_elevation_mils: MIN_ELEVATION_MILS,
            long_range_threshold: LONG_RANGE_THRESHOLD_M,
            standard_tolerance: STANDARD_INDIRECT_TOLERANCE,
            long_range_tolerance: LONG_RANGE_INDIRECT_TOLERANCE,
        }
    }
}

/// Direct and indirect solutions for one charge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeSolution {
    pub charge: Charge,
    pub horizontal_distance: f64,
    pub bearing_deg: f64,
    pub direct: Option<AngleSolution>,
    pub indirect: Option<AngleSolution>,
}

impl ChargeSolution {
    /// Smallest miss distance of the two brackets, infinite if both are empty
    pub fn best_error(&self) -> f64 {
        let direct = self.direct.map_or(f64::INFINITY, |s| s.objective_error);
        let indirect = self.indirect.map_or(f64::INFINITY, |s| s.objective_error);
        direct.min(indirect)
    }

    pub fn has_solution(&self) -> bool {
        self.direct.is_some() || self.indirect.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FireType {
    Direct,
    Indirect,
}

impl fmt::Display for FireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FireType::Direct => write!(f, "Direct"),
            FireType::Indirect => write!(f, "Indirect"),
        }
    }
}

/// Why a fire type was chosen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ReasonCode {
    /// Indirect error no worse than direct
    IndirectMoreAccurate,
    /// Indirect less accurate but within the long-range tolerance
    IndirectLongRange,
    /// Indirect less accurate but within the standard tolerance
    IndirectStandardDoctrine,
    /// Indirect error beyond tolerance
    DirectIndirectTooInaccurate,
    /// Direct elevation below the minimum (or no direct solution)
    IndirectDirectBelowMinimum { direct_mils: Option<f64> },
    /// Indirect elevation below the minimum (or no indirect solution)
    DirectIndirectBelowMinimum { indirect_mils: Option<f64> },
    /// Neither bracket clears the minimum elevation
    BelowMinimumElevation,
}

impl ReasonCode {
    pub fn is_warning(&self) -> bool {
        matches!(self, ReasonCode::BelowMinimumElevation)
    }
}

fn describe_mils(mils: &Option<f64>) -> String {
    match mils {
        Some(m) => format!("{:.0} mils", m),
        None => "N/A".to_string(),
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReasonCode::IndirectMoreAccurate => {
                write!(f, "Indirect fire chosen - better accuracy than direct")
            }
            ReasonCode::IndirectLongRange => {
                write!(f, "Indirect fire chosen - preferred for long range targets")
            }
            ReasonCode::IndirectStandardDoctrine => {
                write!(f, "Indirect fire chosen - standard mortar doctrine")
            }
            ReasonCode::DirectIndirectTooInaccurate => {
                write!(f, "Direct fire chosen - indirect fire accuracy too poor")
            }
            ReasonCode::IndirectDirectBelowMinimum { direct_mils } => write!(
                f,
                "Indirect fire chosen - direct fire below minimum elevation ({})",
                describe_mils(direct_mils)
            ),
            ReasonCode::DirectIndirectBelowMinimum { indirect_mils } => write!(
                f,
                "Direct fire chosen - indirect fire below minimum elevation ({})",
                describe_mils(indirect_mils)
            ),
            ReasonCode::BelowMinimumElevation => {
                write!(f, "Warning: selected solution below minimum elevation")
            }
        }
    }
}

/// The chosen charge, fire type and laying data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiringDecision {
    pub charge_label: String,
    pub fire_type: FireType,
    pub solution: AngleSolution,
    pub bearing_deg: f64,
    pub bearing_mils: u32,
    pub range: f64,
    pub reason: ReasonCode,
    /// Set when the solution is below the minimum elevation; never fire it unflagged
    pub elevation_exceeded: bool,
}

/// Solve both brackets for one charge
///
/// A bracket whose search fails is left empty rather than failing the charge.
pub fn solve_charge(
    charge: &Charge,
    geometry: &RangeBearing,
    launcher: &Position,
    target: &Position,
    sim: &SimulationParams,
    search: &SearchParams,
) -> ChargeSolution {
    let problem = FiringProblem {
        target_range: geometry.horizontal_distance,
        launch_height: launcher.elevation,
        target_height: target.elevation,
        charge,
    };

    let solve = |bracket: (f64, f64), name: &str| match solve_angle(&problem, bracket, sim, search) {
        Ok(solution) => {
            debug!(
                "{} {}: {:.3}° ({:.0} mils), error {:.2} m, tof {:.2} s",
                charge.label, name, solution.angle_deg, solution.angle_mils, solution.objective_error,
                solution.time_of_flight
            );
            Some(solution)
        }
        Err(e) => {
            warn!("{} {} bracket dropped: {}", charge.label, name, e);
            None
        }
    };

    ChargeSolution {
        charge: charge.clone(),
        horizontal_distance: geometry.horizontal_distance,
        bearing_deg: geometry.bearing_deg,
        direct: solve(DIRECT_BRACKET_DEG, "direct"),
        indirect: solve(INDIRECT_BRACKET_DEG, "indirect"),
    }
}

/// Solve every charge in catalog order
pub fn solve_all_charges(
    catalog: &ChargeCatalog,
    geometry: &RangeBearing,
    launcher: &Position,
    target: &Position,
    sim: &SimulationParams,
    search: &SearchParams,
) -> Vec<ChargeSolution> {
    catalog
        .iter()
        .map(|charge| solve_charge(charge, geometry, launcher, target, sim, search))
        .collect()
}

/// Sort by best miss distance, ascending
///
/// The sort is stable, so equal errors keep catalog order.
pub fn rank_solutions(solutions: &mut [ChargeSolution]) {
    solutions.sort_by(|a, b| a.best_error().total_cmp(&b.best_error()));
}

/// Apply doctrine to the ranked entry at `index`
///
/// Index 0 is the best-ranked charge. Errors when no charge produced any
/// solution, when `index` is out of range, or when the chosen charge has
/// neither a direct nor an indirect solution.
pub fn select_solution(
    ranked: &[ChargeSolution],
    index: usize,
    doctrine: &Doctrine,
) -> SolverResult<FiringDecision> {
    if !ranked.iter().any(ChargeSolution::has_solution) {
        return Err(SolverError::NoViableSolution);
    }

    let entry = ranked.get(index).ok_or_else(|| {
        SolverError::InvalidInput(format!(
            "charge index {index} out of range ({} charges)",
            ranked.len()
        ))
    })?;

    let min_mils = doctrine.min_elevation_mils;
    let direct_valid = entry.direct.filter(|s| s.angle_mils >= min_mils);
    let indirect_valid = entry.indirect.filter(|s| s.angle_mils >= min_mils);

    let (fire_type, solution, reason) = match (direct_valid, indirect_valid) {
        (Some(direct), Some(indirect)) => {
            let is_long_range = entry.horizontal_distance > doctrine.long_range_threshold;
            let tolerance = if is_long_range {
                doctrine.long_range_tolerance
            } else {
                doctrine.standard_tolerance
            };

            if indirect.objective_error <= direct.objective_error * tolerance {
                let reason = if indirect.objective_error <= direct.objective_error {
                    ReasonCode::IndirectMoreAccurate
                } else if is_long_range {
                    ReasonCode::IndirectLongRange
                } else {
                    ReasonCode::IndirectStandardDoctrine
                };
                (FireType::Indirect, indirect, reason)
            } else {
                (FireType::Direct, direct, ReasonCode::DirectIndirectTooInaccurate)
            }
        }
        (None, Some(indirect)) => (
            FireType::Indirect,
            indirect,
            ReasonCode::IndirectDirectBelowMinimum {
                direct_mils: entry.direct.map(|s| s.angle_mils),
            },
        ),
        (Some(direct), None) => (
            FireType::Direct,
            direct,
            ReasonCode::DirectIndirectBelowMinimum {
                indirect_mils: entry.indirect.map(|s| s.angle_mils),
            },
        ),
        (None, None) => match (entry.indirect, entry.direct) {
            (Some(indirect), _) => (FireType::Indirect, indirect, ReasonCode::BelowMinimumElevation),
            (None, Some(direct)) => (FireType::Direct, direct, ReasonCode::BelowMinimumElevation),
            (None, None) => return Err(SolverError::ChargeWithoutSolution(entry.charge.label.clone())),
        },
    };

    let elevation_exceeded = solution.angle_mils < min_mils;
    if elevation_exceeded {
        warn!(
            "{}: {} solution at {:.0} mils is below the {:.0} mil minimum",
            entry.charge.label, fire_type, solution.angle_mils, min_mils
        );
    }

    Ok(FiringDecision {
        charge_label: entry.charge.label.clone(),
        fire_type,
        solution,
        bearing_deg: entry.bearing_deg,
        bearing_mils: bearing_to_mils(entry.bearing_deg),
        range: entry.horizontal_distance,
        reason,
        elevation_exceeded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::mils_to_degrees;

    fn angle(mils: f64, error: f64) -> AngleSolution {
        AngleSolution {
            angle_deg: mils_to_degrees(mils),
            angle_mils: mils,
            time_of_flight: 20.0,
            objective_error: error,
        }
    }

    fn entry(label: &str, distance: f64, direct: Option<AngleSolution>, indirect: Option<AngleSolution>) -> ChargeSolution {
        ChargeSolution {
            charge: Charge::new(label, 4.06, 0.000462, 100.0),
            horizontal_distance: distance,
            bearing_deg: 45.0,
            direct,
            indirect,
        }
    }

    #[test]
    fn test_indirect_below_minimum_chooses_direct() {
        let ranked = vec![entry("A", 800.0, Some(angle(900.0, 3.0)), Some(angle(750.0, 1.0)))];
        let decision = select_solution(&ranked, 0, &Doctrine::default()).unwrap();

        assert_eq!(decision.fire_type, FireType::Direct);
        assert_eq!(
            decision.reason,
            ReasonCode::DirectIndirectBelowMinimum { indirect_mils: Some(750.0) }
        );
        assert!(!decision.elevation_exceeded);
    }

    #[test]
    fn test_long_range_tolerance_prefers_indirect() {
        let ranked = vec![entry("A", 1500.0, Some(angle(820.0, 1.0)), Some(angle(1200.0, 1.4)))];
        let decision = select_solution(&ranked, 0, &Doctrine::default()).unwrap();

        assert_eq!(decision.fire_type, FireType::Indirect);
        assert_eq!(decision.reason, ReasonCode::IndirectLongRange);
    }

    #[test]
    fn test_standard_tolerance_and_too_inaccurate() {
        let doctrine = Doctrine::default();

        let within = vec![entry("A", 600.0, Some(angle(850.0, 2.0)), Some(angle(1300.0, 2.9)))];
        let decision = select_solution(&within, 0, &doctrine).unwrap();
        assert_eq!(decision.fire_type, FireType::Indirect);
        assert_eq!(decision.reason, ReasonCode::IndirectStandardDoctrine);

        // 1.8 > 1.0 × 1.5 at short range
        let beyond = vec![entry("A", 600.0, Some(angle(850.0, 1.0)), Some(angle(1300.0, 1.8)))];
        let decision = select_solution(&beyond, 0, &doctrine).unwrap();
        assert_eq!(decision.fire_type, FireType::Direct);
        assert_eq!(decision.reason, ReasonCode::DirectIndirectTooInaccurate);
    }

    #[test]
    fn test_indirect_more_accurate() {
        let ranked = vec![entry("A", 600.0, Some(angle(850.0, 2.0)), Some(angle(1300.0, 0.5)))];
        let decision = select_solution(&ranked, 0, &Doctrine::default()).unwrap();
        assert_eq!(decision.reason, ReasonCode::IndirectMoreAccurate);
    }

    #[test]
    fn test_direct_below_minimum_chooses_indirect() {
        let ranked = vec![entry("A", 600.0, Some(angle(300.0, 0.1)), Some(angle(1300.0, 5.0)))];
        let decision = select_solution(&ranked, 0, &Doctrine::default()).unwrap();
        assert_eq!(decision.fire_type, FireType::Indirect);
        assert_eq!(
            decision.reason,
            ReasonCode::IndirectDirectBelowMinimum { direct_mils: Some(300.0) }
        );
    }

    #[test]
    fn test_neither_valid_flags_degraded() {
        let ranked = vec![entry("A", 600.0, Some(angle(300.0, 0.1)), Some(angle(790.0, 5.0)))];
        let decision = select_solution(&ranked, 0, &Doctrine::default()).unwrap();
        assert_eq!(decision.fire_type, FireType::Indirect);
        assert_eq!(decision.reason, ReasonCode::BelowMinimumElevation);
        assert!(decision.elevation_exceeded);
        assert!(decision.reason.is_warning());

        let direct_only = vec![entry("A", 600.0, Some(angle(300.0, 0.1)), None)];
        let decision = select_solution(&direct_only, 0, &Doctrine::default()).unwrap();
        assert_eq!(decision.fire_type, FireType::Direct);
        assert!(decision.elevation_exceeded);
    }

    #[test]
    fn test_no_viable_solution() {
        let ranked = vec![entry("A", 600.0, None, None), entry("B", 600.0, None, None)];
        assert_eq!(
            select_solution(&ranked, 0, &Doctrine::default()),
            Err(SolverError::NoViableSolution)
        );
        assert_eq!(select_solution(&[], 0, &Doctrine::default()), Err(SolverError::NoViableSolution));
    }

    #[test]
    fn test_selected_charge_without_solution_and_bad_index() {
        let ranked = vec![entry("A", 600.0, None, Some(angle(1300.0, 1.0))), entry("B", 600.0, None, None)];
        assert_eq!(
            select_solution(&ranked, 1, &Doctrine::default()),
            Err(SolverError::ChargeWithoutSolution("B".to_string()))
        );
        assert!(matches!(
            select_solution(&ranked, 7, &Doctrine::default()),
            Err(SolverError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rank_by_best_error_with_stable_ties() {
        let mut ranked = vec![
            entry("A", 600.0, Some(angle(300.0, 4.0)), None),
            entry("B", 600.0, None, None),
            entry("C", 600.0, Some(angle(300.0, 9.0)), Some(angle(1200.0, 1.0))),
            entry("D", 600.0, Some(angle(300.0, 1.0)), None),
        ];
        rank_solutions(&mut ranked);
        let labels: Vec<&str> = ranked.iter().map(|s| s.charge.label.as_str()).collect();
        assert_eq!(labels, vec!["C", "D", "A", "B"]);
    }

    #[test]
    fn test_bearing_mils_rounded() {
        let mut ranked = vec![entry("A", 600.0, None, Some(angle(1300.0, 1.0)))];
        ranked[0].bearing_deg = 10.0;
        let decision = select_solution(&ranked, 0, &Doctrine::default()).unwrap();
        // 10° = 177.78 mils
        assert_eq!(decision.bearing_mils, 178);
    }

    #[test]
    fn test_custom_doctrine_minimum() {
        let doctrine = Doctrine { min_elevation_mils: 700.0, ..Default::default() };
        let ranked = vec![entry("A", 800.0, Some(angle(900.0, 3.0)), Some(angle(750.0, 1.0)))];
        let decision = select_solution(&ranked, 0, &doctrine).unwrap();
        assert_eq!(decision.fire_type, FireType::Indirect);
    }
}
