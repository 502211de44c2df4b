//! Planning rules and thresholds.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Thresholds applied to a plan after it has been computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningRules {
    /// Minimum endurance left after landing, in minutes
    pub min_fuel_reserve_min: f64,
    /// Shortest acceptable longest-runway length at a diversion airport (ft)
    pub min_diversion_runway_ft: f64,
    /// Diversion airports farther than this from a checkpoint are ignored (NM)
    pub diversion_radius_nm: f64,
    /// Fractions of each leg sampled for diversions in addition to the
    /// checkpoints themselves
    pub diversion_fractions: Vec<f64>,
}

impl Default for PlanningRules {
    fn default() -> Self {
        Self {
            min_fuel_reserve_min: 60.0, // one hour after landing
            min_diversion_runway_ft: 2000.0,
            diversion_radius_nm: 200.0,
            diversion_fractions: vec![0.25, 0.5, 0.75],
        }
    }
}

impl PlanningRules {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_fuel_reserve_min.is_finite() || self.min_fuel_reserve_min < 0.0 {
            return Err(ConfigError::invalid(
                "min_fuel_reserve_min",
                "must be a non-negative number of minutes",
            ));
        }
        if !self.diversion_radius_nm.is_finite() || self.diversion_radius_nm <= 0.0 {
            return Err(ConfigError::invalid("diversion_radius_nm", "must be positive"));
        }
        if let Some(f) = self
            .diversion_fractions
            .iter()
            .find(|f| !(**f > 0.0 && **f < 1.0))
        {
            return Err(ConfigError::invalid(
                "diversion_fractions",
                format!("{f} is not strictly between 0 and 1"),
            ));
        }
        Ok(())
    }

    /// Minimum reserve expressed in hours.
    pub fn min_fuel_reserve_hr(&self) -> f64 {
        self.min_fuel_reserve_min / 60.0
    }
}
