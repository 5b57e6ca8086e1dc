//! Solver configuration loaded from JSON.
//!
//! Every field is optional; anything left out falls back to the built-in
//! constants. Example:
//!
//! ```json
//! {
//!   "solver": { "time_step": 0.01 },
//!   "doctrine": { "min_elevation_mils": 800, "long_range_threshold": 1200 },
//!   "charges": [
//!     { "label": "Charge 1", "mass": 4.2, "drag_coefficient": 0.0005, "muzzle_velocity": 110.0 }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::angle_solver::SearchParams;
use crate::charges::{Charge, ChargeCatalog};
use crate::error::ConfigError;
use crate::selection::Doctrine;
use crate::trajectory::SimulationParams;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FireControlConfig {
    pub solver: SimulationParams,
    pub search: SearchParams,
    pub doctrine: Doctrine,
    /// Replaces the built-in M252 table when present
    pub charges: Option<Vec<Charge>>,
}

impl FireControlConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: FireControlConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    /// Check ranges the solver relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let solver = &self.solver;
        if !(solver.time_step.is_finite() && solver.time_step > 0.0) {
            return Err(ConfigError::Invalid("solver.time_step must be positive".to_string()));
        }
        if !(solver.max_flight_time.is_finite() && solver.max_flight_time >= solver.time_step) {
            return Err(ConfigError::Invalid(
                "solver.max_flight_time must be at least one time step".to_string(),
            ));
        }
        if !(solver.gravity.is_finite() && solver.gravity > 0.0) {
            return Err(ConfigError::Invalid("solver.gravity must be positive".to_string()));
        }
        if !(self.search.tolerance_deg.is_finite() && self.search.tolerance_deg > 0.0) {
            return Err(ConfigError::Invalid("search.tolerance_deg must be positive".to_string()));
        }
        if self.search.max_iterations == 0 {
            return Err(ConfigError::Invalid("search.max_iterations must be at least 1".to_string()));
        }

        let doctrine = &self.doctrine;
        if !(0.0..=1600.0).contains(&doctrine.min_elevation_mils) {
            return Err(ConfigError::Invalid(
                "doctrine.min_elevation_mils must be within [0, 1600]".to_string(),
            ));
        }
        if !(doctrine.long_range_threshold.is_finite() && doctrine.long_range_threshold >= 0.0) {
            return Err(ConfigError::Invalid(
                "doctrine.long_range_threshold must be non-negative".to_string(),
            ));
        }
        for (name, value) in [
            ("standard_tolerance", doctrine.standard_tolerance),
            ("long_range_tolerance", doctrine.long_range_tolerance),
        ] {
            if !(value.is_finite() && value >= 1.0) {
                return Err(ConfigError::Invalid(format!("doctrine.{name} must be at least 1.0")));
            }
        }

        if let Some(charges) = &self.charges {
            ChargeCatalog::from_charges(charges.clone())?;
        }
        Ok(())
    }

    /// The charge catalog this configuration selects
    pub fn catalog(&self) -> Result<ChargeCatalog, ConfigError> {
        match &self.charges {
            Some(charges) => ChargeCatalog::from_charges(charges.clone()),
            None => Ok(ChargeCatalog::m252()),
        }
    }
}
