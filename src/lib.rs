//! # Fire Control
//!
//! Firing solution engine for indirect-fire weapons: quadratic-drag trajectory
//! integration, golden-section angle search, doctrine-based charge and fire type
//! selection, fire adjustment and sheaf distribution on a flat local grid.

// Re-export the main types and functions
pub use angle_solver::{golden_section_search, solve_angle, AngleSolution, FiringProblem, SearchParams};
pub use charges::{Charge, ChargeCatalog};
pub use config::FireControlConfig;
pub use error::{ConfigError, SolverError, SolverResult};
pub use fire_adjustment::{apply_adjustment, apply_tally, AdjustmentTally, Correction};
pub use geometry::{range_and_bearing, Bearing, BearingUnit, Point2D, Position, RangeBearing};
pub use mission::{recompute, MissionInputs, MissionOutputs};
pub use selection::{
    rank_solutions, select_solution, solve_all_charges, solve_charge, ChargeSolution, Doctrine, FireType,
    FiringDecision, ReasonCode,
};
pub use sheaf::{compute_sheaf, SheafAssignment, SheafPattern};
pub use trajectory::{simulate, trace, SimulationParams, TrajectoryResult, TrajectorySample};

// Module declarations
pub mod angle_solver;
pub mod charges;
pub mod config;
pub mod constants;
pub mod error;
pub mod fire_adjustment;
pub mod geometry;
pub mod grid;
pub mod mission;
pub mod selection;
pub mod sheaf;
pub mod trajectory;
