//! Aircraft type and tail-number catalog.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aircraft::{AircraftProfile, Airframe, TailOverride};
use crate::error::ConfigError;

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    types: Vec<AircraftProfile>,
    #[serde(default)]
    tails: Vec<TailOverride>,
}

/// Validated aircraft profiles keyed by type designator and tail overrides
/// keyed by tail number. Keys are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct AircraftCatalog {
    types: BTreeMap<String, AircraftProfile>,
    tails: BTreeMap<String, TailOverride>,
}

impl AircraftCatalog {
    /// Catalog bundled with the library (C172S and club airframes).
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Parse a catalog of the form `{"types": [...], "tails": [...]}`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut catalog = Self::default();
        catalog.load_json(json)?;
        Ok(catalog)
    }

    /// Add the entries of a JSON catalog, replacing existing keys. Tails may
    /// refer to types already in this catalog.
    pub fn load_json(&mut self, json: &str) -> Result<(), ConfigError> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|e| ConfigError::Catalog(e.to_string()))?;
        for profile in file.types {
            self.insert_type(profile)?;
        }
        for tail in file.tails {
            self.insert_tail(tail)?;
        }
        Ok(())
    }

    /// Add or replace a type profile.
    pub fn insert_type(&mut self, profile: AircraftProfile) -> Result<(), ConfigError> {
        profile.validate()?;
        self.types.insert(key(&profile.designator), profile);
        Ok(())
    }

    /// Add or replace a tail override; its type must already be known.
    pub fn insert_tail(&mut self, tail: TailOverride) -> Result<(), ConfigError> {
        tail.validate()?;
        if !self.types.contains_key(&key(&tail.aircraft_type)) {
            return Err(ConfigError::UnknownAircraftType(tail.aircraft_type.clone()));
        }
        self.tails.insert(key(&tail.tail), tail);
        Ok(())
    }

    pub fn profile(&self, designator: &str) -> Result<&AircraftProfile, ConfigError> {
        self.types
            .get(&key(designator))
            .ok_or_else(|| ConfigError::UnknownAircraftType(designator.to_string()))
    }

    pub fn tail(&self, tail: &str) -> Result<&TailOverride, ConfigError> {
        self.tails
            .get(&key(tail))
            .ok_or_else(|| ConfigError::UnknownTail(tail.to_string()))
    }

    pub fn type_designators(&self) -> impl Iterator<Item = &str> + '_ {
        self.types.values().map(|p| p.designator.as_str())
    }

    pub fn tail_numbers(&self) -> impl Iterator<Item = &str> + '_ {
        self.tails.values().map(|t| t.tail.as_str())
    }

    /// Resolve a type and optional tail into an airframe.
    ///
    /// Without an explicit type the tail's own type is used. A tail that
    /// belongs to a different type than the one requested is rejected.
    pub fn resolve(
        &self,
        designator: Option<&str>,
        tail: Option<&str>,
    ) -> Result<Airframe<'_>, ConfigError> {
        let tail = tail
            .filter(|t| !t.trim().is_empty())
            .map(|t| self.tail(t))
            .transpose()?;

        let profile = match (designator.filter(|d| !d.trim().is_empty()), tail) {
            (Some(designator), Some(tail)) => {
                if key(designator) != key(&tail.aircraft_type) {
                    return Err(ConfigError::TailTypeMismatch {
                        tail: tail.tail.clone(),
                        tail_type: tail.aircraft_type.clone(),
                        requested: designator.to_string(),
                    });
                }
                self.profile(designator)?
            }
            (Some(designator), None) => self.profile(designator)?,
            (None, Some(tail)) => self.profile(&tail.aircraft_type)?,
            (None, None) => {
                return Err(ConfigError::invalid(
                    "aircraft",
                    "either a type designator or a tail number is required",
                ))
            }
        };

        Ok(Airframe::new(profile, tail))
    }
}

fn key(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}
