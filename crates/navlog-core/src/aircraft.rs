//! Aircraft type profiles and per-airframe overrides.
//!
//! An [`AircraftProfile`] carries everything the planner needs to know about a
//! type: loading stations, weight limits, the CG envelope, fuel constants,
//! V-speeds, the IAS to CAS calibration per flap setting and the short-field
//! performance charts. A [`TailOverride`] replaces the empty weight and arm
//! for one airframe and adds its compass card.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, NavError, TableError};
use crate::spatial::normalize_heading;
use crate::table::{Blend, Table};

/// Forward and aft CG limits at one weight, inches aft of datum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CgLimits {
    pub arm_min: f64,
    pub arm_max: f64,
}

impl CgLimits {
    pub fn contains(&self, arm: f64) -> bool {
        arm >= self.arm_min && arm <= self.arm_max
    }

    /// Position of `arm` within the envelope, 0% at the forward limit.
    pub fn percent_of_range(&self, arm: f64) -> f64 {
        let width = self.arm_max - self.arm_min;
        if width <= 0.0 {
            return 0.0;
        }
        (arm - self.arm_min) * 100.0 / width
    }
}

impl Blend for CgLimits {
    fn blend(&self, other: &Self, t: f64) -> Self {
        Self {
            arm_min: self.arm_min.blend(&other.arm_min, t),
            arm_max: self.arm_max.blend(&other.arm_max, t),
        }
    }
}

/// Short-field chart entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldDistance {
    pub ground_roll_ft: f64,
    /// Total distance to clear a 50 ft obstacle
    pub over_50ft_ft: f64,
}

impl Blend for FieldDistance {
    fn blend(&self, other: &Self, t: f64) -> Self {
        Self {
            ground_roll_ft: self.ground_roll_ft.blend(&other.ground_roll_ft, t),
            over_50ft_ft: self.over_50ft_ft.blend(&other.over_50ft_ft, t),
        }
    }
}

/// A loading station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub arm_in: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_weight_lb: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stations {
    pub row1: Station,
    pub row2: Station,
    pub baggage1: Station,
    pub baggage2: Station,
    /// Combined limit for both baggage areas
    pub baggage_combined_max_lb: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightLimits {
    pub gross_lb: f64,
    pub takeoff_lb: f64,
    pub landing_lb: f64,
}

/// Usable fuel and burn constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuelSystem {
    /// Usable capacity; unusable fuel is part of the empty weight
    pub capacity_gal: f64,
    pub arm_in: f64,
    pub lb_per_gal: f64,
    /// Default cruise burn rate
    pub burn_gph: f64,
    /// Start, taxi and runup allowance charged to the departure leg
    pub taxi_gal: f64,
}

/// Reference airspeeds in KIAS.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VSpeeds {
    pub vs0: f64,
    pub vs1: f64,
    pub vr: f64,
    pub vx: f64,
    pub vy: f64,
    pub best_glide: f64,
    pub va: f64,
    pub vfe: f64,
    pub vno: f64,
    pub vne: f64,
}

/// IAS to CAS calibration valid up to `flaps_deg`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlapCalibration {
    pub flaps_deg: f64,
    pub ias_to_cas: Table<f64>,
}

/// Performance and loading data for an aircraft type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftProfile {
    pub designator: String,
    pub empty_weight_lb: f64,
    pub empty_arm_in: f64,
    pub stations: Stations,
    pub limits: WeightLimits,
    pub fuel: FuelSystem,
    /// Normal-category envelope keyed by weight
    pub normal_cg: Table<CgLimits>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utility_cg: Option<Table<CgLimits>>,
    pub v_speeds: VSpeeds,
    pub airspeed_calibration: Vec<FlapCalibration>,
    /// Keyed by weight, OAT, pressure altitude
    pub short_field_takeoff: Table<FieldDistance>,
    /// Keyed by weight, OAT, pressure altitude
    pub short_field_landing: Table<FieldDistance>,
}

impl AircraftProfile {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = &self.designator;
        if name.trim().is_empty() {
            return Err(ConfigError::invalid("designator", "must not be empty"));
        }

        positive(name, "empty_weight_lb", self.empty_weight_lb)?;
        positive(name, "limits.gross_lb", self.limits.gross_lb)?;
        positive(name, "limits.takeoff_lb", self.limits.takeoff_lb)?;
        positive(name, "limits.landing_lb", self.limits.landing_lb)?;
        positive(name, "fuel.capacity_gal", self.fuel.capacity_gal)?;
        positive(name, "fuel.lb_per_gal", self.fuel.lb_per_gal)?;
        positive(name, "fuel.burn_gph", self.fuel.burn_gph)?;
        if !self.fuel.taxi_gal.is_finite() || self.fuel.taxi_gal < 0.0 {
            return Err(ConfigError::invalid(
                format!("{name}.fuel.taxi_gal"),
                "must not be negative",
            ));
        }

        expect_axes(name, "normal_cg", &self.normal_cg, 1)?;
        if let Some(utility) = &self.utility_cg {
            expect_axes(name, "utility_cg", utility, 1)?;
        }
        expect_axes(name, "short_field_takeoff", &self.short_field_takeoff, 3)?;
        expect_axes(name, "short_field_landing", &self.short_field_landing, 3)?;

        if self.airspeed_calibration.is_empty() {
            return Err(ConfigError::invalid(
                format!("{name}.airspeed_calibration"),
                "needs at least one flap setting",
            ));
        }
        for (idx, cal) in self.airspeed_calibration.iter().enumerate() {
            expect_axes(name, &format!("airspeed_calibration[{idx}]"), &cal.ias_to_cas, 1)?;
            if self.airspeed_calibration[..idx]
                .iter()
                .any(|other| other.flaps_deg == cal.flaps_deg)
            {
                return Err(ConfigError::invalid(
                    format!("{name}.airspeed_calibration[{idx}]"),
                    format!("duplicate flap setting {}", cal.flaps_deg),
                ));
            }
        }
        Ok(())
    }

    /// Calibration table for the smallest flap setting at or above `flaps_deg`.
    pub fn calibration_for(&self, flaps_deg: f64) -> Result<&FlapCalibration, ConfigError> {
        self.airspeed_calibration
            .iter()
            .filter(|cal| cal.flaps_deg >= flaps_deg)
            .min_by(|a, b| a.flaps_deg.total_cmp(&b.flaps_deg))
            .ok_or(ConfigError::NoCalibrationForFlaps { flaps: flaps_deg })
    }

    /// Calibrated airspeed for an indicated airspeed and flap setting.
    pub fn calibrated_airspeed(&self, ias_kt: f64, flaps_deg: f64) -> Result<f64, NavError> {
        let cal = self.calibration_for(flaps_deg)?;
        Ok(cal.ias_to_cas.lookup(&[ias_kt])?)
    }

    /// Normal-category CG limits at `weight_lb`.
    pub fn normal_cg_limits(&self, weight_lb: f64) -> Result<CgLimits, TableError> {
        self.normal_cg.lookup(&[weight_lb])
    }
}

/// Per-airframe data replacing the type defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailOverride {
    pub tail: String,
    /// Type designator this airframe belongs to
    pub aircraft_type: String,
    pub empty_weight_lb: f64,
    pub empty_arm_in: f64,
    /// Compass card: compass heading to steer for each magnetic heading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compass_card: Option<Table<f64>>,
}

impl TailOverride {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = &self.tail;
        if name.trim().is_empty() {
            return Err(ConfigError::invalid("tail", "must not be empty"));
        }
        positive(name, "empty_weight_lb", self.empty_weight_lb)?;
        if let Some(card) = &self.compass_card {
            expect_axes(name, "compass_card", card, 1)?;
            match card.wrap() {
                Some(wrap) if wrap.period == 360.0 && wrap.value_period == 360.0 => {}
                _ => {
                    return Err(ConfigError::invalid(
                        format!("{name}.compass_card"),
                        "must wrap headings at 360 degrees",
                    ))
                }
            }
        }
        Ok(())
    }

    /// Compass deviation in degrees for a magnetic heading; 0 without a card.
    pub fn deviation(&self, magnetic_heading_deg: f64) -> Result<f64, TableError> {
        let Some(card) = &self.compass_card else {
            return Ok(0.0);
        };
        let mh = normalize_heading(magnetic_heading_deg);
        let ch = card.lookup(&[mh])?;
        Ok((ch - mh + 180.0).rem_euclid(360.0) - 180.0)
    }
}

/// A type profile with the optional airframe override applied.
#[derive(Debug, Clone, Copy)]
pub struct Airframe<'a> {
    pub profile: &'a AircraftProfile,
    pub tail: Option<&'a TailOverride>,
}

impl<'a> Airframe<'a> {
    pub fn new(profile: &'a AircraftProfile, tail: Option<&'a TailOverride>) -> Self {
        Self { profile, tail }
    }

    /// Tail number when known, otherwise the type designator.
    pub fn label(&self) -> &'a str {
        match self.tail {
            Some(tail) => &tail.tail,
            None => &self.profile.designator,
        }
    }

    pub fn empty_weight_lb(&self) -> f64 {
        self.tail
            .map_or(self.profile.empty_weight_lb, |t| t.empty_weight_lb)
    }

    pub fn empty_arm_in(&self) -> f64 {
        self.tail.map_or(self.profile.empty_arm_in, |t| t.empty_arm_in)
    }

    pub fn deviation(&self, magnetic_heading_deg: f64) -> Result<f64, TableError> {
        match self.tail {
            Some(tail) => tail.deviation(magnetic_heading_deg),
            None => Ok(0.0),
        }
    }
}

fn positive(owner: &str, field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            format!("{owner}.{field}"),
            format!("must be positive, got {value}"),
        ))
    }
}

fn expect_axes<T>(owner: &str, field: &str, table: &Table<T>, axes: usize) -> Result<(), ConfigError> {
    if table.depth() == axes {
        Ok(())
    } else {
        Err(ConfigError::table(
            format!("{owner}.{field}"),
            TableError::AxisMismatch {
                expected: axes,
                given: table.depth(),
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AircraftCatalog;
    use crate::table::Wrap;

    fn c172s() -> AircraftProfile {
        AircraftCatalog::builtin()
            .unwrap()
            .profile("C172S")
            .unwrap()
            .clone()
    }

    #[test]
    fn builtin_profile_validates() {
        c172s().validate().unwrap();
    }

    #[test]
    fn calibration_uses_smallest_flap_setting_at_or_above() {
        let profile = c172s();
        assert_eq!(profile.calibration_for(0.0).unwrap().flaps_deg, 0.0);
        assert_eq!(profile.calibration_for(5.0).unwrap().flaps_deg, 10.0);
        assert_eq!(profile.calibration_for(20.0).unwrap().flaps_deg, 30.0);
        assert_eq!(
            profile.calibration_for(40.0).unwrap_err(),
            ConfigError::NoCalibrationForFlaps { flaps: 40.0 }
        );
    }

    #[test]
    fn calibrated_airspeed_interpolates() {
        let profile = c172s();
        assert_eq!(profile.calibrated_airspeed(70.0, 0.0).unwrap(), 70.0);
        let cas = profile.calibrated_airspeed(55.0, 0.0).unwrap();
        assert!((cas - 59.0).abs() < 1e-9);
        assert!(matches!(
            profile.calibrated_airspeed(70.0, 45.0),
            Err(NavError::Config(ConfigError::NoCalibrationForFlaps { .. }))
        ));
    }

    #[test]
    fn normal_envelope_narrows_with_weight() {
        let profile = c172s();
        let heavy = profile.normal_cg_limits(2550.0).unwrap();
        assert_eq!(heavy, CgLimits { arm_min: 41.0, arm_max: 47.3 });
        let mid = profile.normal_cg_limits(2250.0).unwrap();
        assert!((mid.arm_min - 38.0).abs() < 1e-9);
        assert!(mid.contains(40.0));
        assert!(!mid.contains(37.0));
        assert!((mid.percent_of_range(47.3) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn tail_without_card_has_no_deviation() {
        let tail = TailOverride {
            tail: "N1234".into(),
            aircraft_type: "C172S".into(),
            empty_weight_lb: 1650.0,
            empty_arm_in: 40.0,
            compass_card: None,
        };
        tail.validate().unwrap();
        assert_eq!(tail.deviation(123.0).unwrap(), 0.0);
    }

    #[test]
    fn compass_card_deviation_wraps_through_north() {
        let card = Table::new(vec![
            (0.0, 2.0),
            (90.0, 91.0),
            (180.0, 178.0),
            (270.0, 268.0),
        ])
        .unwrap()
        .with_wrap(Wrap::headings())
        .unwrap();
        let tail = TailOverride {
            tail: "N1234".into(),
            aircraft_type: "C172S".into(),
            empty_weight_lb: 1650.0,
            empty_arm_in: 40.0,
            compass_card: Some(card),
        };
        tail.validate().unwrap();
        assert!((tail.deviation(0.0).unwrap() - 2.0).abs() < 1e-9);
        assert!((tail.deviation(360.0).unwrap() - 2.0).abs() < 1e-9);
        // halfway between 270 (-2) and 360 (+2)
        assert!(tail.deviation(315.0).unwrap().abs() < 1e-9);
        assert!((tail.deviation(-45.0).unwrap() - tail.deviation(315.0).unwrap()).abs() < 1e-9);
        assert!((tail.deviation(135.0).unwrap() + 0.5).abs() < 1e-9);
    }

    #[test]
    fn compass_card_must_be_periodic() {
        let tail = TailOverride {
            tail: "N1234".into(),
            aircraft_type: "C172S".into(),
            empty_weight_lb: 1650.0,
            empty_arm_in: 40.0,
            compass_card: Some(Table::new(vec![(0.0, 1.0), (180.0, 181.0)]).unwrap()),
        };
        assert!(matches!(tail.validate(), Err(ConfigError::InvalidField { .. })));
    }

    #[test]
    fn airframe_prefers_tail_weights() {
        let profile = c172s();
        let tail = TailOverride {
            tail: "N1234".into(),
            aircraft_type: "C172S".into(),
            empty_weight_lb: 1650.0,
            empty_arm_in: 40.0,
            compass_card: None,
        };
        let bare = Airframe::new(&profile, None);
        assert_eq!(bare.empty_weight_lb(), 1680.0);
        assert_eq!(bare.label(), "C172S");
        let with_tail = Airframe::new(&profile, Some(&tail));
        assert_eq!(with_tail.empty_weight_lb(), 1650.0);
        assert_eq!(with_tail.empty_arm_in(), 40.0);
        assert_eq!(with_tail.label(), "N1234");
    }

    #[test]
    fn validate_rejects_bad_profiles() {
        let mut profile = c172s();
        profile.fuel.burn_gph = 0.0;
        assert!(matches!(profile.validate(), Err(ConfigError::InvalidField { .. })));

        let mut profile = c172s();
        profile.short_field_takeoff = Table::new(vec![(2550.0, FieldDistance {
            ground_roll_ft: 900.0,
            over_50ft_ft: 1500.0,
        })])
        .unwrap();
        assert!(matches!(profile.validate(), Err(ConfigError::Table { .. })));

        let mut profile = c172s();
        let first = profile.airspeed_calibration[0].clone();
        profile.airspeed_calibration.push(first);
        assert!(matches!(profile.validate(), Err(ConfigError::InvalidField { .. })));
    }
}
