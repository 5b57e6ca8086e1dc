//! Fire mission pipeline: one call from positions to a ranked, selected solution.
//!
//! Callers re-run `recompute` whenever their inputs change. Nothing is cached
//! between calls; changing the selected charge is another `recompute` (or a
//! direct `select_solution` on the ranked list) with a different index.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::charges::ChargeCatalog;
use crate::config::FireControlConfig;
use crate::error::{SolverError, SolverResult};
use crate::geometry::{range_and_bearing, Position, RangeBearing};
use crate::selection::{rank_solutions, select_solution, solve_all_charges, ChargeSolution, FiringDecision};

/// Inputs for one fire mission
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MissionInputs {
    pub launcher: Position,
    pub target: Position,
    /// Index into the ranked charge list, 0 (best) when omitted
    #[serde(default)]
    pub charge_index: Option<usize>,
}

impl MissionInputs {
    pub fn new(launcher: Position, target: Position) -> Self {
        MissionInputs {
            launcher,
            target,
            charge_index: None,
        }
    }

    pub fn with_charge_index(mut self, index: usize) -> Self {
        self.charge_index = Some(index);
        self
    }
}

/// Everything the presentation layer needs for one mission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionOutputs {
    pub geometry: RangeBearing,
    /// Best miss distance first
    pub solutions: Vec<ChargeSolution>,
    pub selected_index: usize,
    /// `None` means no viable solution
    pub decision: Option<FiringDecision>,
}

impl MissionOutputs {
    pub fn selected(&self) -> Option<&ChargeSolution> {
        self.solutions.get(self.selected_index)
    }
}

/// Solve, rank and select for one launcher/target pair
pub fn recompute(
    inputs: &MissionInputs,
    catalog: &ChargeCatalog,
    config: &FireControlConfig,
) -> SolverResult<MissionOutputs> {
    if !inputs.launcher.is_finite() || !inputs.target.is_finite() {
        return Err(SolverError::InvalidInput(
            "launcher and target coordinates must be finite".to_string(),
        ));
    }

    let geometry = range_and_bearing(inputs.launcher.point, inputs.target.point);
    let mut solutions = solve_all_charges(
        catalog,
        &geometry,
        &inputs.launcher,
        &inputs.target,
        &config.solver,
        &config.search,
    );
    rank_solutions(&mut solutions);

    let selected_index = inputs.charge_index.unwrap_or(0);
    let decision = match select_solution(&solutions, selected_index, &config.doctrine) {
        Ok(decision) => {
            info!(
                "{} {} at {:.0} mils, bearing {} mils, range {:.0} m: {}",
                decision.charge_label,
                decision.fire_type,
                decision.solution.angle_mils,
                decision.bearing_mils,
                decision.range,
                decision.reason
            );
            Some(decision)
        }
        Err(SolverError::NoViableSolution) => {
            warn!(
                "no viable solution for range {:.0} m with {} charges",
                geometry.horizontal_distance,
                catalog.len()
            );
            None
        }
        Err(e) => return Err(e),
    };

    Ok(MissionOutputs {
        geometry,
        solutions,
        selected_index,
        decision,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::FireType;

    #[test]
    fn test_recompute_typical_mission() {
        let inputs = MissionInputs::new(Position::new(4800.0, 11000.0, 120.0), Position::new(5400.0, 11800.0, 95.0));
        let outputs = recompute(&inputs, &ChargeCatalog::m252(), &FireControlConfig::default()).unwrap();

        assert!((outputs.geometry.horizontal_distance - 1000.0).abs() < 1e-9);
        assert_eq!(outputs.solutions.len(), 5);
        let errors: Vec<f64> = outputs.solutions.iter().map(|s| s.best_error()).collect();
        assert!(errors.windows(2).all(|w| w[0] <= w[1]));

        let decision = outputs.decision.expect("1000 m is inside the M252 envelope");
        assert_eq!(decision.charge_label, outputs.solutions[0].charge.label);
        assert_eq!(decision.range, outputs.geometry.horizontal_distance);
        if !decision.elevation_exceeded {
            assert!(decision.solution.angle_mils >= 800.0);
        }
    }

    #[test]
    fn test_charge_index_reselects_without_resolving_policy() {
        let inputs = MissionInputs::new(Position::new(0.0, 0.0, 0.0), Position::new(0.0, 700.0, 0.0));
        let catalog = ChargeCatalog::m252();
        let config = FireControlConfig::default();

        let best = recompute(&inputs, &catalog, &config).unwrap();
        let second = recompute(&inputs.with_charge_index(1), &catalog, &config).unwrap();

        assert_eq!(best.solutions, second.solutions);
        let expected = select_solution(&best.solutions, 1, &config.doctrine).ok();
        assert_eq!(second.decision, expected);
        assert_eq!(second.selected_index, 1);
    }

    #[test]
    fn test_out_of_envelope_is_not_an_error() {
        // out-of-reach targets still get a nearest-miss angle, so force every
        // bracket search to fail with a one-iteration cap instead
        let config = FireControlConfig {
            search: crate::angle_solver::SearchParams { tolerance_deg: 1e-9, max_iterations: 1 },
            ..Default::default()
        };
        let inputs = MissionInputs::new(Position::new(0.0, 0.0, 0.0), Position::new(0.0, 500.0, 0.0));
        let outputs = recompute(&inputs, &ChargeCatalog::m252(), &config).unwrap();

        assert!(outputs.decision.is_none());
        assert!(outputs.solutions.iter().all(|s| !s.has_solution()));
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let inputs = MissionInputs::new(Position::new(f64::NAN, 0.0, 0.0), Position::new(0.0, 500.0, 0.0));
        assert!(matches!(
            recompute(&inputs, &ChargeCatalog::m252(), &FireControlConfig::default()),
            Err(SolverError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_short_range_prefers_indirect() {
        let inputs = MissionInputs::new(Position::new(0.0, 0.0, 0.0), Position::new(300.0, 400.0, 0.0));
        let outputs = recompute(&inputs, &ChargeCatalog::m252(), &FireControlConfig::default()).unwrap();
        let decision = outputs.decision.unwrap();
        // low-angle solutions at 500 m sit far below 800 mils
        assert_eq!(decision.fire_type, FireType::Indirect);
        assert!(!decision.elevation_exceeded);
    }
}
