//! Fixed-step point-mass trajectory integration with quadratic drag.
//!
//! The state is planar: `x` is horizontal distance along the line of fire and
//! `y` is height above the common datum. The integrator is a semi-implicit
//! Euler step (velocity first, then position with the new velocity) at a fixed
//! `dt`, with no sub-step interpolation at the stopping condition.

use serde::{Deserialize, Serialize};

use crate::charges::Charge;
use crate::constants::{
    DEFAULT_TIME_STEP_S, G_ACCEL_MPS2, MAX_FLIGHT_TIME_S, TRACE_FLOOR_MARGIN_M, TRACE_MAX_STEPS,
    TRACE_RANGE_OVERSHOOT,
};

/// Integration parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// seconds
    pub time_step: f64,
    /// seconds
    pub max_flight_time: f64,
    /// m/s²
    pub gravity: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        SimulationParams {
            time_step: DEFAULT_TIME_STEP_S,
            max_flight_time: MAX_FLIGHT_TIME_S,
            gravity: G_ACCEL_MPS2,
        }
    }
}

impl SimulationParams {
    /// Number of steps the time cap allows
    pub fn max_steps(&self) -> usize {
        if self.time_step > 0.0 && self.max_flight_time > 0.0 {
            (self.max_flight_time / self.time_step).ceil() as usize
        } else {
            0
        }
    }
}

/// Outcome of one simulated flight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryResult {
    /// Horizontal distance reached (m)
    pub x: f64,
    /// Final height (m)
    pub y: f64,
    /// seconds
    pub time_of_flight: f64,
}

/// One sampled point of a traced flight path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample {
    pub time: f64,
    pub x: f64,
    pub y: f64,
}

/// Planar projectile state
#[derive(Debug, Clone, Copy)]
struct FlightState {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    time: f64,
}

impl FlightState {
    fn launch(angle_deg: f64, launch_height: f64, muzzle_velocity: f64) -> Self {
        let angle_rad = angle_deg.to_radians();
        FlightState {
            x: 0.0,
            y: launch_height,
            vx: muzzle_velocity * angle_rad.cos(),
            vy: muzzle_velocity * angle_rad.sin(),
            time: 0.0,
        }
    }

    /// Advance one step of `dt`
    fn step(&mut self, charge: &Charge, params: &SimulationParams) {
        let dt = params.time_step;
        self.time += dt;

        let speed = (self.vx * self.vx + self.vy * self.vy).sqrt();
        let (ax, ay) = if speed != 0.0 {
            // drag deceleration k·v²/m, split along the velocity direction
            let drag = charge.drag_coefficient * speed * speed;
            (
                -drag * self.vx / (charge.mass * speed),
                -params.gravity - drag * self.vy / (charge.mass * speed),
            )
        } else {
            (0.0, -params.gravity)
        };

        self.vx += ax * dt;
        self.vy += ay * dt;
        self.x += self.vx * dt;
        self.y += self.vy * dt;
    }
}

/// Fly one round and report where it stopped
///
/// Integration ends at the first step where the round is at or past
/// `target_range` and at or below `target_height`, or when the time cap runs
/// out. The raw state at that step is returned.
pub fn simulate(
    angle_deg: f64,
    target_range: f64,
    launch_height: f64,
    target_height: f64,
    charge: &Charge,
    params: &SimulationParams,
) -> TrajectoryResult {
    let mut state = FlightState::launch(angle_deg, launch_height, charge.muzzle_velocity);

    for _ in 0..params.max_steps() {
        state.step(charge, params);

        if state.x >= target_range && state.y <= target_height {
            break;
        }
    }

    TrajectoryResult {
        x: state.x,
        y: state.y,
        time_of_flight: state.time,
    }
}

/// Sample the full flight path for display or export
///
/// Stops once the round has overshot the target range by 20%, dropped well
/// below both the launcher and the target, or after a fixed number of samples.
pub fn trace(
    angle_deg: f64,
    target_range: f64,
    launch_height: f64,
    target_height: f64,
    charge: &Charge,
    params: &SimulationParams,
) -> Vec<TrajectorySample> {
    let mut state = FlightState::launch(angle_deg, launch_height, charge.muzzle_velocity);
    let floor = launch_height.min(target_height) - TRACE_FLOOR_MARGIN_M;
    let ceiling_range = target_range * TRACE_RANGE_OVERSHOOT;

    let mut samples = Vec::with_capacity(256);
    samples.push(TrajectorySample { time: 0.0, x: state.x, y: state.y });

    if params.time_step <= 0.0 {
        return samples;
    }

    for _ in 0..TRACE_MAX_STEPS {
        state.step(charge, params);
        samples.push(TrajectorySample {
            time: state.time,
            x: state.x,
            y: state.y,
        });

        if state.x > ceiling_range || state.y < floor {
            break;
        }
    }

    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_charge(drag: f64) -> Charge {
        Charge::new("test", 4.06, drag, 137.61)
    }

    #[test]
    fn test_max_steps_matches_cap() {
        let params = SimulationParams::default();
        // 100 / 0.0333 = 3003.003 → 3004 steps
        assert_eq!(params.max_steps(), 3004);

        let exact = SimulationParams { time_step: 0.05, ..Default::default() };
        assert_eq!(exact.max_steps(), 2000);
    }

    #[test]
    fn test_stops_past_target_at_or_below_height() {
        let charge = test_charge(0.000462);
        let params = SimulationParams::default();
        let result = simulate(60.0, 1200.0, 0.0, 0.0, &charge, &params);

        if result.time_of_flight < params.max_flight_time {
            assert!(result.x >= 1200.0 || result.y <= 0.0);
        }
        assert!(result.time_of_flight > 0.0);
        assert!(result.time_of_flight <= params.max_flight_time + params.time_step);
    }

    #[test]
    fn test_vertical_shot_hits_time_cap() {
        // straight up never advances horizontally, so only the cap stops it
        let charge = test_charge(0.0);
        let params = SimulationParams::default();
        let result = simulate(90.0, 500.0, 0.0, 0.0, &charge, &params);

        let expected = params.max_steps() as f64 * params.time_step;
        assert!((result.time_of_flight - expected).abs() < 1e-6);
        assert!(result.x.abs() < 1e-6);
    }

    #[test]
    fn test_zero_velocity_falls_under_gravity_only() {
        let charge = Charge::new("dud", 4.06, 0.000462, 0.0);
        let params = SimulationParams::default();
        let result = simulate(45.0, 0.0, 100.0, 50.0, &charge, &params);

        // x stays 0 ≥ 0, so it stops on the first step at or below 50 m
        assert!(result.y <= 50.0);
        assert!(result.x.abs() < 1e-12);
        let t = result.time_of_flight;
        let closed_form = 100.0 - 0.5 * G_ACCEL_MPS2 * t * t;
        assert!((result.y - closed_form).abs() < G_ACCEL_MPS2 * t * params.time_step);
    }

    #[test]
    fn test_drag_shortens_range() {
        let params = SimulationParams::default();
        let vacuum = simulate(45.0, 1.0e6, 0.0, 0.0, &test_charge(0.0), &params);
        let drag = simulate(45.0, 1.0e6, 0.0, 0.0, &test_charge(0.000462), &params);
        // both run to the cap; the dragged round has travelled less far
        assert!(drag.x < vacuum.x);
    }

    #[test]
    fn test_simulate_is_deterministic() {
        let charge = test_charge(0.000462);
        let params = SimulationParams::default();
        let a = simulate(52.3, 900.0, 120.0, 80.0, &charge, &params);
        let b = simulate(52.3, 900.0, 120.0, 80.0, &charge, &params);
        assert_eq!(a, b);
    }

    #[test]
    fn test_trace_starts_at_muzzle_and_stops_past_target() {
        let charge = test_charge(0.000462);
        let params = SimulationParams::default();
        let samples = trace(45.0, 800.0, 10.0, 0.0, &charge, &params);

        assert_eq!(samples[0], TrajectorySample { time: 0.0, x: 0.0, y: 10.0 });
        let last = samples.last().unwrap();
        assert!(last.x > 800.0 * TRACE_RANGE_OVERSHOOT || last.y < -TRACE_FLOOR_MARGIN_M);
        assert!(samples.windows(2).all(|w| w[1].time > w[0].time));
    }
}
