//! Short-field takeoff and landing distances.

use serde::{Deserialize, Serialize};

use crate::aircraft::{AircraftProfile, FieldDistance};
use crate::atmosphere::pressure_altitude_ft;
use crate::error::TableError;
use crate::models::{Checkpoint, Route};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldPhase {
    Takeoff,
    Landing,
}

/// Chart distances at one field for a weight and the field's conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortFieldEstimate {
    pub phase: FieldPhase,
    pub field: String,
    pub weight_lb: f64,
    pub elevation_ft: f64,
    pub altimeter_inhg: f64,
    pub oat_c: f64,
    pub pressure_altitude_ft: f64,
    #[serde(flatten)]
    pub distance: FieldDistance,
}

/// Short-field distance at `field` for `weight_lb`.
///
/// The field elevation comes from the checkpoint's airport data, falling back
/// to its indicated altitude for bare coordinates.
pub fn short_field(
    profile: &AircraftProfile,
    phase: FieldPhase,
    weight_lb: f64,
    field: &Checkpoint,
) -> Result<ShortFieldEstimate, TableError> {
    let elevation_ft = field.elevation_ft.unwrap_or(field.indicated_altitude_ft);
    let pressure_altitude = pressure_altitude_ft(elevation_ft, field.altimeter_inhg);
    let chart = match phase {
        FieldPhase::Takeoff => &profile.short_field_takeoff,
        FieldPhase::Landing => &profile.short_field_landing,
    };
    let distance = chart.lookup(&[weight_lb, field.oat_c, pressure_altitude])?;
    Ok(ShortFieldEstimate {
        phase,
        field: field.label().to_string(),
        weight_lb,
        elevation_ft,
        altimeter_inhg: field.altimeter_inhg,
        oat_c: field.oat_c,
        pressure_altitude_ft: pressure_altitude,
        distance,
    })
}

/// Takeoff from the first checkpoint and landing at the last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortFieldReport {
    pub takeoff: ShortFieldEstimate,
    pub landing: ShortFieldEstimate,
}

/// Departure and destination distances; the landing is computed at
/// `landing_weight_lb`, i.e. after the trip fuel is burned.
pub fn short_field_report(
    profile: &AircraftProfile,
    takeoff_weight_lb: f64,
    landing_weight_lb: f64,
    route: &Route,
) -> Result<ShortFieldReport, TableError> {
    Ok(ShortFieldReport {
        takeoff: short_field(profile, FieldPhase::Takeoff, takeoff_weight_lb, route.first())?,
        landing: short_field(profile, FieldPhase::Landing, landing_weight_lb, route.last())?,
    })
}
