//! Propellant charge catalog.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One propellant configuration (ring count) for the weapon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    pub label: String,
    /// kg
    pub mass: f64,
    /// Quadratic drag coefficient (kg/m), drag force = k·v²
    pub drag_coefficient: f64,
    /// m/s
    pub muzzle_velocity: f64,
}

impl Charge {
    pub fn new(label: impl Into<String>, mass: f64, drag_coefficient: f64, muzzle_velocity: f64) -> Self {
        Charge {
            label: label.into(),
            mass,
            drag_coefficient,
            muzzle_velocity,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.label.trim().is_empty() {
            return Err(ConfigError::Invalid("charge label must not be empty".to_string()));
        }
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(ConfigError::Invalid(format!("charge {}: mass must be positive", self.label)));
        }
        if !(self.drag_coefficient.is_finite() && self.drag_coefficient >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "charge {}: drag coefficient must be non-negative",
                self.label
            )));
        }
        if !(self.muzzle_velocity.is_finite() && self.muzzle_velocity >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "charge {}: muzzle velocity must be non-negative",
                self.label
            )));
        }
        Ok(())
    }
}

// M252 81mm: (label, mass kg, drag k, muzzle velocity m/s)
const M252_TABLE: [(&str, f64, f64, f64); 5] = [
    ("M252 Base", 4.06, 0.000462, 66.0),
    ("M252 1 Ring", 4.06, 0.000462, 101.046),
    ("M252 2 Rings", 4.06, 0.000462, 137.61),
    ("M252 3 Rings", 4.06, 0.000462, 167.706),
    ("M252 4 Rings", 4.06, 0.000462, 196.482),
];

/// Ordered, read-only set of charges
///
/// Declaration order is significant: it breaks ranking ties.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeCatalog {
    charges: Vec<Charge>,
}

impl ChargeCatalog {
    /// The standard M252 table: base charge plus four incremental rings
    pub fn m252() -> Self {
        let charges = M252_TABLE
            .iter()
            .map(|&(label, mass, drag, velocity)| Charge::new(label, mass, drag, velocity))
            .collect();
        ChargeCatalog { charges }
    }

    /// Build a catalog from user-supplied charges
    pub fn from_charges(charges: Vec<Charge>) -> Result<Self, ConfigError> {
        if charges.is_empty() {
            return Err(ConfigError::Invalid("charge catalog must not be empty".to_string()));
        }
        for charge in &charges {
            charge.validate()?;
        }
        for (i, charge) in charges.iter().enumerate() {
            if charges[..i].iter().any(|c| c.label == charge.label) {
                return Err(ConfigError::Invalid(format!("duplicate charge label: {}", charge.label)));
            }
        }
        Ok(ChargeCatalog { charges })
    }

    pub fn charges(&self) -> &[Charge] {
        &self.charges
    }

    pub fn get(&self, index: usize) -> Option<&Charge> {
        self.charges.get(index)
    }

    pub fn by_label(&self, label: &str) -> Option<&Charge> {
        self.charges.iter().find(|c| c.label.eq_ignore_ascii_case(label))
    }

    pub fn len(&self) -> usize {
        self.charges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charges.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Charge> {
        self.charges.iter()
    }
}

impl Default for ChargeCatalog {
    fn default() -> Self {
        ChargeCatalog::m252()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_m252_catalog_order() {
        let catalog = ChargeCatalog::m252();
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.get(0).unwrap().label, "M252 Base");
        assert_eq!(catalog.get(4).unwrap().label, "M252 4 Rings");

        // increasing velocity
        let velocities: Vec<f64> = catalog.iter().map(|c| c.muzzle_velocity).collect();
        assert!(velocities.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_lookup_by_label_case_insensitive() {
        let catalog = ChargeCatalog::default();
        let charge = catalog.by_label("m252 2 rings").unwrap();
        assert!((charge.muzzle_velocity - 137.61).abs() < 1e-9);
        assert!(catalog.by_label("M252 9 Rings").is_none());
    }

    #[test]
    fn test_custom_catalog_validation() {
        assert!(ChargeCatalog::from_charges(vec![]).is_err());
        assert!(ChargeCatalog::from_charges(vec![Charge::new("bad", 0.0, 0.001, 100.0)]).is_err());
        assert!(ChargeCatalog::from_charges(vec![Charge::new("bad", 1.0, -0.1, 100.0)]).is_err());
        assert!(ChargeCatalog::from_charges(vec![
            Charge::new("A", 1.0, 0.0, 100.0),
            Charge::new("A", 1.0, 0.0, 120.0),
        ])
        .is_err());

        let catalog = ChargeCatalog::from_charges(vec![Charge::new("Practice", 1.2, 0.0, 80.0)]).unwrap();
        assert_eq!(catalog.len(), 1);
    }
}
