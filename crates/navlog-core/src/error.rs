//! Error types for navigation log computations.

use thiserror::Error;

/// Degenerate great-circle geometry.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeodesyError {
    /// Bearing between two identical points is undefined.
    #[error("initial bearing is undefined for coincident points")]
    CoincidentPoints,

    /// The great circle through two antipodal points is not unique.
    #[error("great-circle path is undefined for antipodal points")]
    AntipodalPoints,
}

/// Malformed interpolation table or query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("interpolation table has no rows")]
    Empty,

    #[error("interpolation table key {0} is not finite")]
    NonFiniteKey(f64),

    #[error("interpolation table has duplicate key {0}")]
    DuplicateKey(f64),

    #[error("wraparound period must be positive and finite, got {0}")]
    InvalidPeriod(f64),

    #[error("nested rows have inconsistent axis counts ({expected} vs {found})")]
    RaggedDepth { expected: usize, found: usize },

    #[error("query has {given} axis values but table has {expected} axes")]
    AxisMismatch { expected: usize, given: usize },
}

/// Invalid aircraft, tail or route configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown aircraft type: {0}")]
    UnknownAircraftType(String),

    #[error("unknown aircraft tail number: {0}")]
    UnknownTail(String),

    #[error("tail {tail} is a {tail_type}, not a {requested}")]
    TailTypeMismatch {
        tail: String,
        tail_type: String,
        requested: String,
    },

    #[error("flaps={flaps} has no relevant entry in the airspeed calibration table")]
    NoCalibrationForFlaps { flaps: f64 },

    #[error("route needs at least two checkpoints, got {0}")]
    RouteTooShort(usize),

    #[error("{field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("table {name}: {source}")]
    Table {
        name: String,
        #[source]
        source: TableError,
    },

    #[error("failed to parse aircraft catalog: {0}")]
    Catalog(String),
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn table(name: impl Into<String>, source: TableError) -> Self {
        Self::Table {
            name: name.into(),
            source,
        }
    }
}

/// Failure while solving a single leg.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error("leg {leg}: {source}")]
    Geometry {
        leg: usize,
        #[source]
        source: GeodesyError,
    },

    #[error("leg {leg}: {kind} airspeed {airspeed_kt:.2} kt is too low to solve the wind triangle")]
    AirspeedTooLow {
        leg: usize,
        /// "indicated" or "true"
        kind: &'static str,
        airspeed_kt: f64,
    },

    #[error("leg {leg}: crosswind component {crosswind_kt:.1} kt exceeds true airspeed {tas_kt:.1} kt")]
    CrosswindExceedsAirspeed {
        leg: usize,
        crosswind_kt: f64,
        tas_kt: f64,
    },

    #[error("leg {leg}: ground speed {gs_kt:.2} kt is too low to compute time enroute")]
    GroundSpeedTooLow { leg: usize, gs_kt: f64 },
}

/// Any error raised by the navigation core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NavError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("geometry error: {0}")]
    Geodesy(#[from] GeodesyError),

    #[error("segment solve failed: {0}")]
    Solve(#[from] SolveError),

    #[error("table lookup failed: {0}")]
    Table(#[from] TableError),
}
