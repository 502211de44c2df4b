//! Per-leg wind triangle, atmosphere and compass solve.

use chrono::NaiveDate;

use crate::aircraft::Airframe;
use crate::atmosphere::{density_altitude_ft, pressure_altitude_ft, true_airspeed};
use crate::error::{NavError, SolveError};
use crate::magvar::GeomagneticModel;
use crate::models::{Checkpoint, SegmentResult};
use crate::spatial::{distance_nm, initial_bearing, normalize_heading};

/// True and ground speeds at or below this are treated as zero.
pub const MIN_SPEED_KT: f64 = 1.0;

/// Declination is evaluated at the ellipsoid surface.
const MAGVAR_HEIGHT_KM: f64 = 0.0;

/// Heading of a runway from its number, e.g. 36 -> 360.
pub fn runway_heading_deg(runway: u16) -> f64 {
    f64::from(runway) * 10.0
}

/// Solves legs for one airframe on one date.
#[derive(Debug, Clone, Copy)]
pub struct SegmentSolver<'a> {
    airframe: Airframe<'a>,
    magvar: &'a GeomagneticModel,
    date: NaiveDate,
    runway_heading_deg: f64,
    taxi_fuel_gal: f64,
    default_gph: f64,
}

impl<'a> SegmentSolver<'a> {
    /// Solver departing runway 36 with the type's fuel constants.
    pub fn new(airframe: Airframe<'a>, magvar: &'a GeomagneticModel, date: NaiveDate) -> Self {
        Self {
            airframe,
            magvar,
            date,
            runway_heading_deg: runway_heading_deg(36),
            taxi_fuel_gal: airframe.profile.fuel.taxi_gal,
            default_gph: airframe.profile.fuel.burn_gph,
        }
    }

    /// True course flown on the departure leg.
    pub fn with_runway_heading(mut self, heading_deg: f64) -> Self {
        self.runway_heading_deg = heading_deg;
        self
    }

    /// Replace the taxi allowance; non-positive keeps the type default.
    pub fn with_taxi_fuel(mut self, gal: f64) -> Self {
        if gal > 0.0 {
            self.taxi_fuel_gal = gal;
        }
        self
    }

    /// Replace the default burn rate; non-positive keeps the type default.
    pub fn with_fuel_flow(mut self, gph: f64) -> Self {
        if gph > 0.0 {
            self.default_gph = gph;
        }
        self
    }

    pub fn airframe(&self) -> Airframe<'a> {
        self.airframe
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn runway_heading(&self) -> f64 {
        self.runway_heading_deg
    }

    pub fn taxi_fuel_gal(&self) -> f64 {
        self.taxi_fuel_gal
    }

    /// Burn rate used when a checkpoint has no override.
    pub fn default_gph(&self) -> f64 {
        self.default_gph
    }

    /// Magnetic variation for a leg: the negated mean of the declinations at
    /// both ends, so that MH = TH + MV.
    pub fn variation(&self, from: &Checkpoint, to: &Checkpoint) -> f64 {
        let d_from = self
            .magvar
            .declination(from.position, MAGVAR_HEIGHT_KM, self.date);
        let d_to = self
            .magvar
            .declination(to.position, MAGVAR_HEIGHT_KM, self.date);
        -(d_from + d_to) / 2.0
    }

    /// Solve leg `leg` from `from` to `to` using the conditions of `to`.
    ///
    /// Leg 0 is the departure: its course is the runway heading and it burns
    /// the taxi allowance instead of time-based fuel.
    pub fn solve(
        &self,
        leg: usize,
        from: &Checkpoint,
        to: &Checkpoint,
    ) -> Result<SegmentResult, NavError> {
        let distance = distance_nm(from.position, to.position);
        let true_course = if leg == 0 {
            normalize_heading(self.runway_heading_deg)
        } else {
            initial_bearing(from.position, to.position)
                .map_err(|source| SolveError::Geometry { leg, source })?
        };

        // The calibration tables extrapolate, so catch a stopped airspeed
        // before it turns into a plausible CAS.
        if !to.ias_kt.is_finite() || to.ias_kt <= MIN_SPEED_KT {
            return Err(SolveError::AirspeedTooLow {
                leg,
                kind: "indicated",
                airspeed_kt: to.ias_kt,
            }
            .into());
        }
        let cas = self
            .airframe
            .profile
            .calibrated_airspeed(to.ias_kt, to.flaps_deg)?;
        let pressure_altitude = pressure_altitude_ft(to.indicated_altitude_ft, to.altimeter_inhg);
        let density_altitude = density_altitude_ft(pressure_altitude, to.oat_c);
        let tas = true_airspeed(cas, density_altitude);
        if !tas.is_finite() || tas <= MIN_SPEED_KT {
            return Err(SolveError::AirspeedTooLow {
                leg,
                kind: "true",
                airspeed_kt: tas,
            }
            .into());
        }

        // wind triangle
        let wind_speed = to.wind_speed_kt;
        let wind_angle = normalize_heading(to.wind_dir_deg + 180.0);
        let wind_to_track = (true_course - wind_angle).to_radians();
        let crosswind = wind_speed * wind_to_track.sin();
        if crosswind.abs() > tas {
            return Err(SolveError::CrosswindExceedsAirspeed {
                leg,
                crosswind_kt: crosswind.abs(),
                tas_kt: tas,
            }
            .into());
        }
        let wca = (crosswind / tas).asin();
        let ground_speed = tas * wca.cos() + wind_speed * wind_to_track.cos();
        if !ground_speed.is_finite() || ground_speed <= MIN_SPEED_KT {
            return Err(SolveError::GroundSpeedTooLow {
                leg,
                gs_kt: ground_speed,
            }
            .into());
        }

        let wca = wca.to_degrees();
        let true_heading = true_course + wca;
        let variation = self.variation(from, to);
        let magnetic_heading = true_heading + variation;
        let deviation = self.airframe.deviation(magnetic_heading)?;
        let compass_heading = magnetic_heading + deviation;

        let time_enroute = distance / ground_speed * 60.0;
        let fuel_flow = to.fuel_flow_override().unwrap_or(self.default_gph);
        let fuel_burned = if leg == 0 {
            self.taxi_fuel_gal
        } else {
            time_enroute / 60.0 * fuel_flow
        };

        let result = SegmentResult {
            leg,
            from: from.label().to_string(),
            to: to.label().to_string(),
            true_course_deg: true_course,
            cas_kt: cas,
            tas_kt: tas,
            pressure_altitude_ft: pressure_altitude,
            density_altitude_ft: density_altitude,
            wind_correction_deg: wca,
            true_heading_deg: normalize_heading(true_heading),
            variation_deg: variation,
            magnetic_heading_deg: normalize_heading(magnetic_heading),
            deviation_deg: deviation,
            compass_heading_deg: normalize_heading(compass_heading),
            distance_nm: distance,
            ground_speed_kt: ground_speed,
            time_enroute_min: time_enroute,
            fuel_flow_gph: fuel_flow,
            fuel_burned_gal: fuel_burned,
        };

        tracing::debug!(
            leg,
            to = %result.to,
            tc = result.true_course_deg,
            ch = result.compass_heading_deg,
            gs = result.ground_speed_kt,
            ete = result.time_enroute_min,
            fuel = result.fuel_burned_gal,
            "solved leg"
        );
        Ok(result)
    }
}
