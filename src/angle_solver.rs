use serde::{Deserialize, Serialize};

use crate::charges::Charge;
use crate::constants::{ANGLE_TOLERANCE_DEG, MAX_SEARCH_ITERATIONS};
use crate::error::{SolverError, SolverResult};
use crate::geometry::degrees_to_mils;
use crate::trajectory::{simulate, SimulationParams};

/// Golden-section search settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Stop once the interior points are this close (degrees)
    pub tolerance_deg: f64,
    pub max_iterations: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            tolerance_deg: ANGLE_TOLERANCE_DEG,
            max_iterations: MAX_SEARCH_ITERATIONS,
        }
    }
}

/// Result of a bracket search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult {
    pub x: f64,
    pub iterations_used: usize,
}

/// Solved launch angle for one bracket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleSolution {
    pub angle_deg: f64,
    pub angle_mils: f64,
    /// seconds, from a fresh simulation at the solved angle
    pub time_of_flight: f64,
    /// Miss distance in meters (range error + height error)
    pub objective_error: f64,
}

impl AngleSolution {
    /// Elevation rounded to whole mils for display
    pub fn rounded_mils(&self) -> i64 {
        self.angle_mils.round() as i64
    }
}

/// Golden-section minimisation of `f` over `[lower, upper]`
///
/// Assumes `f` is unimodal on the bracket. If it is not, the result is a local
/// minimum. The returned point is always inside the bracket.
pub fn golden_section_search<F>(
    f: F,
    mut lower: f64,
    mut upper: f64,
    tolerance: f64,
    max_iterations: usize,
) -> SolverResult<SearchResult>
where
    F: Fn(f64) -> f64,
{
    if !lower.is_finite() || !upper.is_finite() {
        return Err(SolverError::InvalidInput(format!(
            "search bracket must be finite: [{lower}, {upper}]"
        )));
    }
    if lower > upper {
        return Err(SolverError::InvalidInput(format!(
            "search bracket is inverted: [{lower}, {upper}]"
        )));
    }
    if tolerance.is_nan() || tolerance <= 0.0 {
        return Err(SolverError::InvalidInput(format!(
            "search tolerance must be positive, got {tolerance}"
        )));
    }

    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let (bracket_lower, bracket_upper) = (lower, upper);
    let mut c = upper - (upper - lower) / phi;
    let mut d = lower + (upper - lower) / phi;
    let mut iterations = 0;

    while (c - d).abs() > tolerance {
        if iterations >= max_iterations {
            return Err(SolverError::NoConvergence {
                lower: bracket_lower,
                upper: bracket_upper,
                iterations,
            });
        }
        iterations += 1;

        if f(c) < f(d) {
            upper = d;
        } else {
            lower = c;
        }

        c = upper - (upper - lower) / phi;
        d = lower + (upper - lower) / phi;
    }

    Ok(SearchResult {
        x: (upper + lower) / 2.0,
        iterations_used: iterations,
    })
}

/// Firing problem for one charge: where the round must land
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiringProblem<'a> {
    pub target_range: f64,
    pub launch_height: f64,
    pub target_height: f64,
    pub charge: &'a Charge,
}

impl FiringProblem<'_> {
    /// Miss distance at `angle_deg`: |range error| + |height error|
    pub fn objective_error(&self, angle_deg: f64, params: &SimulationParams) -> f64 {
        let result = simulate(
            angle_deg,
            self.target_range,
            self.launch_height,
            self.target_height,
            self.charge,
            params,
        );
        (result.x - self.target_range).abs() + (result.y - self.target_height).abs()
    }
}

/// Solve the launch angle inside one bracket (degrees)
pub fn solve_angle(
    problem: &FiringProblem<'_>,
    bracket: (f64, f64),
    sim: &SimulationParams,
    search: &SearchParams,
) -> SolverResult<AngleSolution> {
    let objective = |angle: f64| problem.objective_error(angle, sim);
    let found = golden_section_search(
        objective,
        bracket.0,
        bracket.1,
        search.tolerance_deg,
        search.max_iterations,
    )?;

    let angle_deg = found.x;
    let objective_error = objective(angle_deg);
    let flight = simulate(
        angle_deg,
        problem.target_range,
        problem.launch_height,
        problem.target_height,
        problem.charge,
        sim,
    );

    if !objective_error.is_finite() {
        return Err(SolverError::InvalidInput(format!(
            "non-finite miss distance at {angle_deg:.3}° for {}",
            problem.charge.label
        )));
    }

    Ok(AngleSolution {
        angle_deg,
        angle_mils: degrees_to_mils(angle_deg),
        time_of_flight: flight.time_of_flight,
        objective_error,
    })
}
