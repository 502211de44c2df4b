//! Core data models for navigation log planning.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_IAS_KT: f64 = 110.0;
pub const STANDARD_ALTIMETER_INHG: f64 = 29.92;
pub const STANDARD_OAT_C: f64 = 15.0;
const ABSOLUTE_ZERO_C: f64 = -273.15;

/// A horizontal position in decimal degrees (+N / +E).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A route checkpoint and the flight conditions of the leg that ends there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Airport/waypoint identifier, empty for bare coordinates
    #[serde(default)]
    pub ident: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub position: GeoPoint,
    /// Field elevation when the checkpoint is an airport
    #[serde(default)]
    pub elevation_ft: Option<f64>,
    #[serde(default = "default_ias")]
    pub ias_kt: f64,
    #[serde(default)]
    pub indicated_altitude_ft: f64,
    #[serde(default = "default_altimeter")]
    pub altimeter_inhg: f64,
    #[serde(default)]
    pub flaps_deg: f64,
    /// Direction the wind blows from
    #[serde(default)]
    pub wind_dir_deg: f64,
    #[serde(default)]
    pub wind_speed_kt: f64,
    #[serde(default = "default_oat")]
    pub oat_c: f64,
    /// Overrides the aircraft's default fuel flow when positive
    #[serde(default)]
    pub fuel_flow_gph: Option<f64>,
}

fn default_ias() -> f64 {
    DEFAULT_IAS_KT
}

fn default_altimeter() -> f64 {
    STANDARD_ALTIMETER_INHG
}

fn default_oat() -> f64 {
    STANDARD_OAT_C
}

impl Checkpoint {
    /// Create a checkpoint with standard-day, no-wind conditions.
    pub fn new(name: impl Into<String>, position: GeoPoint) -> Self {
        Self {
            ident: String::new(),
            name: name.into(),
            position,
            elevation_ft: None,
            ias_kt: DEFAULT_IAS_KT,
            indicated_altitude_ft: 0.0,
            altimeter_inhg: STANDARD_ALTIMETER_INHG,
            flaps_deg: 0.0,
            wind_dir_deg: 0.0,
            wind_speed_kt: 0.0,
            oat_c: STANDARD_OAT_C,
            fuel_flow_gph: None,
        }
    }

    /// Mark this checkpoint as a known airport.
    pub fn with_airport(mut self, ident: impl Into<String>, elevation_ft: f64) -> Self {
        self.ident = ident.into();
        self.elevation_ft = Some(elevation_ft);
        self
    }

    pub fn with_airspeed(mut self, ias_kt: f64, flaps_deg: f64) -> Self {
        self.ias_kt = ias_kt;
        self.flaps_deg = flaps_deg;
        self
    }

    pub fn with_altitude(mut self, indicated_altitude_ft: f64, altimeter_inhg: f64) -> Self {
        self.indicated_altitude_ft = indicated_altitude_ft;
        self.altimeter_inhg = altimeter_inhg;
        self
    }

    pub fn with_wind(mut self, dir_deg: f64, speed_kt: f64) -> Self {
        self.wind_dir_deg = dir_deg;
        self.wind_speed_kt = speed_kt;
        self
    }

    pub fn with_oat(mut self, oat_c: f64) -> Self {
        self.oat_c = oat_c;
        self
    }

    pub fn with_fuel_flow(mut self, gph: f64) -> Self {
        self.fuel_flow_gph = Some(gph);
        self
    }

    /// Fuel flow override, ignoring non-positive values.
    pub fn fuel_flow_override(&self) -> Option<f64> {
        self.fuel_flow_gph.filter(|gph| *gph > 0.0)
    }

    /// Physically possible flight conditions. A stopped airspeed is left to
    /// the solver, which reports it per leg.
    fn check_conditions(&self) -> Result<(), (&'static str, String)> {
        let non_negative = [
            ("ias_kt", self.ias_kt),
            ("wind_speed_kt", self.wind_speed_kt),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err((field, format!("{value} must not be negative")));
            }
        }
        if !self.altimeter_inhg.is_finite() || self.altimeter_inhg <= 0.0 {
            return Err((
                "altimeter_inhg",
                format!("{} must be positive", self.altimeter_inhg),
            ));
        }
        if !self.oat_c.is_finite() || self.oat_c <= ABSOLUTE_ZERO_C {
            return Err(("oat_c", format!("{} C is below absolute zero", self.oat_c)));
        }
        Ok(())
    }

    /// Label used in logs and reports.
    pub fn label(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else if !self.ident.is_empty() {
            &self.ident
        } else {
            "<lat,lon>"
        }
    }
}

/// An ordered list of at least two checkpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Checkpoint>", into = "Vec<Checkpoint>")]
pub struct Route {
    checkpoints: Vec<Checkpoint>,
}

impl Route {
    pub fn new(checkpoints: Vec<Checkpoint>) -> Result<Self, ConfigError> {
        if checkpoints.len() < 2 {
            return Err(ConfigError::RouteTooShort(checkpoints.len()));
        }
        for (idx, cp) in checkpoints.iter().enumerate() {
            let GeoPoint { lat, lon } = cp.position;
            if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                return Err(ConfigError::invalid(
                    format!("checkpoint {idx} latitude"),
                    format!("{lat} is outside -90..90"),
                ));
            }
            if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
                return Err(ConfigError::invalid(
                    format!("checkpoint {idx} longitude"),
                    format!("{lon} is outside -180..180"),
                ));
            }
            cp.check_conditions().map_err(|(field, reason)| {
                ConfigError::invalid(format!("checkpoint {idx} {field}"), reason)
            })?;
        }
        Ok(Self { checkpoints })
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    pub fn first(&self) -> &Checkpoint {
        &self.checkpoints[0]
    }

    pub fn last(&self) -> &Checkpoint {
        &self.checkpoints[self.checkpoints.len() - 1]
    }

    /// Legs as `(index, from, to)`.
    ///
    /// Leg 0 is the takeoff leg: it starts and ends at the first checkpoint.
    pub fn legs(&self) -> impl Iterator<Item = (usize, &Checkpoint, &Checkpoint)> + '_ {
        self.checkpoints.iter().enumerate().map(move |(idx, to)| {
            let from = if idx == 0 {
                &self.checkpoints[0]
            } else {
                &self.checkpoints[idx - 1]
            };
            (idx, from, to)
        })
    }

    /// Reverse the route for the return trip.
    ///
    /// Positions travel with their checkpoints, but airspeed, altitude, wind,
    /// temperature and fuel flow stay with the forward leg index. The new
    /// departure checkpoint starts at its field elevation when it is known.
    pub fn reversed(&self) -> Self {
        let forward = &self.checkpoints;
        let mut reversed: Vec<Checkpoint> = forward
            .iter()
            .rev()
            .zip(forward.iter())
            .map(|(position, conditions)| Checkpoint {
                ias_kt: conditions.ias_kt,
                indicated_altitude_ft: conditions.indicated_altitude_ft,
                wind_dir_deg: conditions.wind_dir_deg,
                wind_speed_kt: conditions.wind_speed_kt,
                oat_c: conditions.oat_c,
                fuel_flow_gph: conditions.fuel_flow_gph,
                ..position.clone()
            })
            .collect();
        if let Some(departure) = reversed.first_mut() {
            if let Some(elevation) = departure.elevation_ft {
                departure.indicated_altitude_ft = elevation;
            }
        }
        Self {
            checkpoints: reversed,
        }
    }
}

impl TryFrom<Vec<Checkpoint>> for Route {
    type Error = ConfigError;

    fn try_from(checkpoints: Vec<Checkpoint>) -> Result<Self, Self::Error> {
        Self::new(checkpoints)
    }
}

impl From<Route> for Vec<Checkpoint> {
    fn from(route: Route) -> Self {
        route.checkpoints
    }
}

/// Computed quantities for one leg of the navigation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentResult {
    pub leg: usize,
    pub from: String,
    pub to: String,
    pub true_course_deg: f64,
    pub cas_kt: f64,
    pub tas_kt: f64,
    pub pressure_altitude_ft: f64,
    pub density_altitude_ft: f64,
    pub wind_correction_deg: f64,
    pub true_heading_deg: f64,
    /// Added to true to obtain magnetic (West positive)
    pub variation_deg: f64,
    pub magnetic_heading_deg: f64,
    pub deviation_deg: f64,
    pub compass_heading_deg: f64,
    pub distance_nm: f64,
    pub ground_speed_kt: f64,
    pub time_enroute_min: f64,
    pub fuel_flow_gph: f64,
    pub fuel_burned_gal: f64,
}

/// Running totals after a leg has been flown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteState {
    pub distance_nm: f64,
    pub time_min: f64,
    pub fuel_remaining_gal: f64,
}

impl RouteState {
    pub fn start(fuel_gal: f64) -> Self {
        Self {
            distance_nm: 0.0,
            time_min: 0.0,
            fuel_remaining_gal: fuel_gal,
        }
    }

    /// State after flying `leg`.
    pub fn advance(&self, leg: &SegmentResult) -> Self {
        Self {
            distance_nm: self.distance_nm + leg.distance_nm,
            time_min: self.time_min + leg.time_enroute_min,
            fuel_remaining_gal: self.fuel_remaining_gal - leg.fuel_burned_gal,
        }
    }
}

/// Runway record from the airport reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Runway {
    pub id: String,
    pub length_ft: f64,
    #[serde(default)]
    pub width_ft: f64,
    #[serde(default)]
    pub condition: String,
    /// Right-hand traffic pattern for the base/reciprocal ends
    #[serde(default)]
    pub right_pattern: bool,
    #[serde(default)]
    pub right_pattern_reciprocal: bool,
}

/// Airport record from the reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub ident: String,
    pub name: String,
    #[serde(flatten)]
    pub position: GeoPoint,
    pub elevation_ft: f64,
    #[serde(default)]
    pub public_use: bool,
    #[serde(default)]
    pub ctaf: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub runways: Vec<Runway>,
    #[serde(default)]
    pub frequencies: Vec<Frequency>,
    /// Navaids near the field
    #[serde(default)]
    pub navaids: Vec<Navaid>,
}

/// A published communication frequency of an airport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frequency {
    /// Service, e.g. "CTAF", "ATIS", "CLEARANCE DELIVERY"
    pub kind: String,
    /// Frequency as published, e.g. "122.800"
    pub freq: String,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub telephone: Option<String>,
}

/// A radio navigation aid listed with an airport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Navaid {
    pub ident: String,
    pub name: String,
    /// VOR, VORTAC, VOR/DME, TACAN, NDB, ...
    pub kind: String,
    pub freq: String,
    /// Distance from the field
    #[serde(default)]
    pub distance_nm: Option<f64>,
    /// Magnetic bearing of the field from the navaid
    #[serde(default)]
    pub bearing_deg: Option<f64>,
    #[serde(default)]
    pub remarks: String,
}

impl Navaid {
    /// VHF omnirange stations usable for cross-checking position.
    pub fn is_vor(&self) -> bool {
        matches!(self.kind.as_str(), "VOR" | "VORTAC" | "VOR/DME" | "TACAN")
    }
}

impl Airport {
    pub fn longest_runway(&self) -> Option<&Runway> {
        self.runways
            .iter()
            .max_by(|a, b| a.length_ft.total_cmp(&b.length_ft))
    }
}
