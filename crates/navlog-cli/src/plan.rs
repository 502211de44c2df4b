//! Flight plan files and airport reference data.
//!
//! A plan lists checkpoints as airport idents or coordinate literals. Flight
//! conditions carry forward: a checkpoint that leaves out its airspeed,
//! altitude, wind, temperature or fuel flow flies the previous checkpoint's.

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use navlog_core::{Airport, Checkpoint, GeoPoint, LoadSheet, PlanningRules, Route};

use crate::coords::parse_coordinates;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlightPlan {
    /// Type designator, e.g. "C172S"
    #[serde(default)]
    pub aircraft: Option<String>,
    #[serde(default)]
    pub tail: Option<String>,
    /// Departure runway number
    #[serde(default = "default_runway")]
    pub runway: u16,
    /// Departure runway for the return trip, if different
    #[serde(default)]
    pub return_runway: Option<u16>,
    /// Date for magnetic variation
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub load: LoadSheet,
    #[serde(default)]
    pub options: PlanOptions,
    #[serde(default)]
    pub rules: PlanningRules,
    pub checkpoints: Vec<PlanCheckpoint>,
    /// Extra airports listed in the airport information section
    #[serde(default)]
    pub alternates: Vec<String>,
}

fn default_runway() -> u16 {
    36
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlanOptions {
    /// Fly the reversed route after the outbound one
    pub round_trip: bool,
    /// Fill the tanks again before the return trip
    pub refuel: bool,
    pub taxi_fuel_gal: Option<f64>,
    /// Default burn rate for checkpoints without their own
    pub fuel_flow_gph: Option<f64>,
    /// Search the airport reference data for diversions
    pub diversions: bool,
    /// Also list the diversion airports in the airport information section
    pub diversion_detail: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            round_trip: true,
            refuel: false,
            taxi_fuel_gal: None,
            fuel_flow_gph: None,
            diversions: true,
            diversion_detail: false,
        }
    }
}

/// One `checkpoints` entry of a plan file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanCheckpoint {
    /// Airport ident or coordinate literal
    pub at: String,
    pub name: Option<String>,
    pub ias_kt: Option<f64>,
    pub altitude_ft: Option<f64>,
    pub altimeter_inhg: Option<f64>,
    pub flaps_deg: Option<f64>,
    pub wind_dir_deg: Option<f64>,
    pub wind_speed_kt: Option<f64>,
    pub oat_c: Option<f64>,
    pub fuel_flow_gph: Option<f64>,
}

impl PlanCheckpoint {
    pub fn at(at: impl Into<String>) -> Self {
        Self {
            at: at.into(),
            ..Self::default()
        }
    }

    fn resolve(&self, previous: &Checkpoint, airports: &AirportIndex) -> Result<Checkpoint> {
        let key = self.at.trim();
        let mut cp = if let Some(airport) = airports.get(key) {
            Checkpoint::new(airport.ident.clone(), airport.position)
                .with_airport(airport.ident.clone(), airport.elevation_ft)
        } else if let Some(position) = parse_coordinates(key) {
            Checkpoint::new("", position)
        } else {
            bail!("unknown airport and not a coordinate: {key:?}");
        };
        if let Some(name) = &self.name {
            cp.name = name.clone();
        }

        // Until a cruise altitude is given, airports sit at field elevation.
        cp.indicated_altitude_ft = self
            .altitude_ft
            .or_else(|| {
                let carried = previous.indicated_altitude_ft;
                (carried != 0.0).then_some(carried)
            })
            .or(cp.elevation_ft)
            .unwrap_or(0.0);
        cp.ias_kt = self.ias_kt.unwrap_or(previous.ias_kt);
        cp.altimeter_inhg = self.altimeter_inhg.unwrap_or(previous.altimeter_inhg);
        cp.flaps_deg = self.flaps_deg.unwrap_or(previous.flaps_deg);
        cp.wind_dir_deg = self.wind_dir_deg.unwrap_or(previous.wind_dir_deg);
        cp.wind_speed_kt = self.wind_speed_kt.unwrap_or(previous.wind_speed_kt);
        cp.oat_c = self.oat_c.unwrap_or(previous.oat_c);
        cp.fuel_flow_gph = self.fuel_flow_gph.or(previous.fuel_flow_gph);
        Ok(cp)
    }
}

impl FlightPlan {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("parsing flight plan")
    }

    /// Resolve every checkpoint into a route.
    pub fn route(&self, airports: &AirportIndex) -> Result<Route> {
        // Standard-day defaults for the first checkpoint to inherit.
        let mut previous = Checkpoint::new("", GeoPoint::new(0.0, 0.0));
        let mut checkpoints = Vec::with_capacity(self.checkpoints.len());
        for (idx, entry) in self.checkpoints.iter().enumerate() {
            let cp = entry
                .resolve(&previous, airports)
                .with_context(|| format!("checkpoint {}", idx + 1))?;
            previous = cp.clone();
            checkpoints.push(cp);
        }
        Ok(Route::new(checkpoints)?)
    }

    /// Alternate airports, each of which must be in the reference data.
    pub fn alternate_airports<'a>(&self, airports: &'a AirportIndex) -> Result<Vec<&'a Airport>> {
        self.alternates
            .iter()
            .map(|ident| {
                airports
                    .get(ident)
                    .with_context(|| format!("unknown alternate airport: {ident}"))
            })
            .collect()
    }
}

/// Airport reference records, looked up by ident.
#[derive(Debug, Clone, Default)]
pub struct AirportIndex {
    airports: Vec<Airport>,
    by_ident: HashMap<String, usize>,
}

impl AirportIndex {
    /// Index `airports`; a repeated ident resolves to its last record.
    pub fn new(airports: Vec<Airport>) -> Self {
        let by_ident = airports
            .iter()
            .enumerate()
            .map(|(idx, airport)| (airport.ident.to_ascii_uppercase(), idx))
            .collect();
        Self { airports, by_ident }
    }

    /// Parse a JSON array of airport records.
    pub fn from_json(json: &str) -> Result<Self> {
        let airports: Vec<Airport> =
            serde_json::from_str(json).context("parsing airport reference data")?;
        tracing::debug!("loaded {} airports", airports.len());
        Ok(Self::new(airports))
    }

    pub fn get(&self, ident: &str) -> Option<&Airport> {
        self.by_ident
            .get(&ident.trim().to_ascii_uppercase())
            .map(|&idx| &self.airports[idx])
    }

    pub fn all(&self) -> &[Airport] {
        &self.airports
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }
}
