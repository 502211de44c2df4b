//! Weight and balance.

use serde::{Deserialize, Serialize};

use crate::advisory::Advisory;
use crate::aircraft::{Airframe, CgLimits};
use crate::error::{ConfigError, NavError};

/// People, bags and fuel on board at engine start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadSheet {
    pub row1_lb: f64,
    pub row2_lb: f64,
    pub baggage1_lb: f64,
    pub baggage2_lb: f64,
    /// Usable fuel; absent or non-positive means full tanks
    pub fuel_gal: Option<f64>,
}

impl Default for LoadSheet {
    fn default() -> Self {
        Self {
            row1_lb: 190.0, // pilot only
            row2_lb: 0.0,
            baggage1_lb: 0.0,
            baggage2_lb: 0.0,
            fuel_gal: None,
        }
    }
}

impl LoadSheet {
    /// Fuel on board for an aircraft with `capacity_gal` usable.
    pub fn fuel_on_board(&self, capacity_gal: f64) -> f64 {
        self.fuel_gal.filter(|gal| *gal > 0.0).unwrap_or(capacity_gal)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("row1_lb", self.row1_lb),
            ("row2_lb", self.row2_lb),
            ("baggage1_lb", self.baggage1_lb),
            ("baggage2_lb", self.baggage2_lb),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(
                    format!("load.{field}"),
                    format!("must be a non-negative weight, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadItem {
    pub name: String,
    pub weight_lb: f64,
    pub arm_in: f64,
    pub moment: f64,
}

impl LoadItem {
    fn new(name: impl Into<String>, weight_lb: f64, arm_in: f64) -> Self {
        Self {
            name: name.into(),
            weight_lb,
            arm_in,
            moment: weight_lb * arm_in,
        }
    }
}

/// CG position against the envelope interpolated at the loaded weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CgCheck {
    pub condition: String,
    pub weight_lb: f64,
    pub arm_in: f64,
    pub limits: CgLimits,
    pub within: bool,
    pub percent_of_range: f64,
}

impl CgCheck {
    fn new(
        condition: &str,
        weight_lb: f64,
        moment: f64,
        airframe: &Airframe<'_>,
    ) -> Result<Self, NavError> {
        let arm_in = moment / weight_lb;
        let limits = airframe.profile.normal_cg_limits(weight_lb)?;
        Ok(Self {
            condition: condition.to_string(),
            weight_lb,
            arm_in,
            limits,
            within: limits.contains(arm_in),
            percent_of_range: limits.percent_of_range(arm_in),
        })
    }

    fn advisory(&self) -> Option<Advisory> {
        (!self.within).then(|| Advisory::CgOutOfEnvelope {
            condition: self.condition.clone(),
            arm_in: self.arm_in,
            limits: self.limits,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightAndBalance {
    pub airframe: String,
    pub fuel_gal: f64,
    pub items: Vec<LoadItem>,
    pub total_weight_lb: f64,
    pub total_moment: f64,
    pub total_arm_in: f64,
    pub max_takeoff_weight_lb: f64,
    pub takeoff: CgCheck,
    /// Same loading with all usable fuel burned
    pub zero_fuel: CgCheck,
    pub advisories: Vec<Advisory>,
}

impl WeightAndBalance {
    pub fn is_within_limits(&self) -> bool {
        self.advisories.is_empty()
    }
}

/// Itemize `load` on `airframe` and check it against the type's limits.
pub fn weight_and_balance(
    airframe: &Airframe<'_>,
    load: &LoadSheet,
) -> Result<WeightAndBalance, NavError> {
    load.validate()?;
    let profile = airframe.profile;
    let stations = &profile.stations;
    let fuel_gal = load.fuel_on_board(profile.fuel.capacity_gal);
    if fuel_gal > profile.fuel.capacity_gal {
        return Err(ConfigError::invalid(
            "load.fuel_gal",
            format!(
                "{fuel_gal} gal exceeds usable capacity of {} gal",
                profile.fuel.capacity_gal
            ),
        )
        .into());
    }

    let fuel = LoadItem::new(
        format!("Main Fuel ({fuel_gal:.0} Gallons)"),
        fuel_gal * profile.fuel.lb_per_gal,
        profile.fuel.arm_in,
    );
    let items = vec![
        LoadItem::new(
            "Empty Aircraft",
            airframe.empty_weight_lb(),
            airframe.empty_arm_in(),
        ),
        fuel.clone(),
        LoadItem::new("Seating Row 1", load.row1_lb, stations.row1.arm_in),
        LoadItem::new("Seating Row 2", load.row2_lb, stations.row2.arm_in),
        LoadItem::new("Area 1 Baggage", load.baggage1_lb, stations.baggage1.arm_in),
        LoadItem::new("Area 2 Baggage", load.baggage2_lb, stations.baggage2.arm_in),
    ];

    let total_weight_lb: f64 = items.iter().map(|i| i.weight_lb).sum();
    let total_moment: f64 = items.iter().map(|i| i.moment).sum();
    let total_arm_in = total_moment / total_weight_lb;

    let takeoff = CgCheck::new("takeoff", total_weight_lb, total_moment, airframe)?;
    let zero_fuel = CgCheck::new(
        "empty-fuel",
        total_weight_lb - fuel.weight_lb,
        total_moment - fuel.moment,
        airframe,
    )?;

    let mut advisories = Vec::new();
    let baggage = [
        ("area 1", load.baggage1_lb, stations.baggage1.max_weight_lb),
        ("area 2", load.baggage2_lb, stations.baggage2.max_weight_lb),
        (
            "area 1+2",
            load.baggage1_lb + load.baggage2_lb,
            Some(stations.baggage_combined_max_lb),
        ),
    ];
    for (area, weight_lb, max) in baggage {
        if let Some(max_lb) = max.filter(|max| weight_lb > *max) {
            advisories.push(Advisory::BaggageOverLimit {
                area: area.to_string(),
                weight_lb,
                max_lb,
            });
        }
    }
    if total_weight_lb > profile.limits.takeoff_lb {
        advisories.push(Advisory::Overweight {
            phase: "takeoff".to_string(),
            weight_lb: total_weight_lb,
            max_lb: profile.limits.takeoff_lb,
        });
    }
    advisories.extend(takeoff.advisory());
    advisories.extend(zero_fuel.advisory());

    for advisory in &advisories {
        tracing::warn!("{}: {}", airframe.label(), advisory);
    }

    Ok(WeightAndBalance {
        airframe: airframe.label().to_string(),
        fuel_gal,
        items,
        total_weight_lb,
        total_moment,
        total_arm_in,
        max_takeoff_weight_lb: profile.limits.takeoff_lb,
        takeoff,
        zero_fuel,
        advisories,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AircraftCatalog;

    #[test]
    fn default_load_in_c172s_is_within_limits() {
        let catalog = AircraftCatalog::builtin().unwrap();
        let airframe = catalog.resolve(Some("C172S"), None).unwrap();
        let wb = weight_and_balance(&airframe, &LoadSheet::default()).unwrap();

        // 1680 + 53 * 6 + 190
        assert!((wb.total_weight_lb - 2188.0).abs() < 1e-9);
        let moment = 1680.0 * 40.5 + 318.0 * 48.0 + 190.0 * 37.0;
        assert!((wb.total_moment - moment).abs() < 1e-9);
        assert_eq!(wb.total_arm_in, wb.total_moment / wb.total_weight_lb);
        assert_eq!(wb.fuel_gal, 53.0);
        assert!(wb.takeoff.within);
        assert!(wb.zero_fuel.within);
        assert!(wb.is_within_limits());
        assert_eq!(wb.items.len(), 6);
    }

    #[test]
    fn heavy_forward_load_fails_takeoff_cg() {
        let catalog = AircraftCatalog::builtin().unwrap();
        let airframe = catalog.resolve(Some("C172S"), None).unwrap();
        let load = LoadSheet {
            row1_lb: 550.0,
            row2_lb: 0.0,
            baggage1_lb: 0.0,
            baggage2_lb: 0.0,
            fuel_gal: None,
        };
        let wb = weight_and_balance(&airframe, &load).unwrap();
        // 2548 lb: forward limit 35 + 6 * (598 / 600) = 40.98
        assert!((wb.takeoff.limits.arm_min - 40.98).abs() < 1e-9);
        assert!(wb.zero_fuel.within);
        assert!(wb.takeoff.arm_in < wb.takeoff.limits.arm_min);
        assert!(!wb.takeoff.within);
        assert!(wb
            .advisories
            .iter()
            .any(|a| matches!(a, Advisory::CgOutOfEnvelope { condition, .. } if condition == "takeoff")));
    }

    #[test]
    fn baggage_and_weight_limits_are_advisories() {
        let catalog = AircraftCatalog::builtin().unwrap();
        let airframe = catalog.resolve(None, Some("N53587")).unwrap();
        let load = LoadSheet {
            row1_lb: 340.0,
            row2_lb: 300.0,
            baggage1_lb: 100.0,
            baggage2_lb: 60.0,
            fuel_gal: Some(40.0),
        };
        let wb = weight_and_balance(&airframe, &load).unwrap();
        assert_eq!(wb.airframe, "N53587");
        assert_eq!(wb.items[0].weight_lb, 1700.9);
        assert!(wb.total_weight_lb > 2550.0);

        let areas: Vec<&str> = wb
            .advisories
            .iter()
            .filter_map(|a| match a {
                Advisory::BaggageOverLimit { area, .. } => Some(area.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(areas, vec!["area 2", "area 1+2"]);
        assert!(wb
            .advisories
            .iter()
            .any(|a| matches!(a, Advisory::Overweight { .. })));
        assert!(!wb.is_within_limits());
    }

    #[test]
    fn rejects_negative_weights_and_excess_fuel() {
        let catalog = AircraftCatalog::builtin().unwrap();
        let airframe = catalog.resolve(Some("C172S"), None).unwrap();
        let negative = LoadSheet {
            row2_lb: -10.0,
            ..LoadSheet::default()
        };
        assert!(matches!(
            weight_and_balance(&airframe, &negative),
            Err(NavError::Config(ConfigError::InvalidField { .. }))
        ));
        let overfull = LoadSheet {
            fuel_gal: Some(60.0),
            ..LoadSheet::default()
        };
        assert!(weight_and_balance(&airframe, &overfull).is_err());
    }
}
