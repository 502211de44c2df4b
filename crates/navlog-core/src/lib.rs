pub mod advisory;
pub mod aircraft;
pub mod atmosphere;
pub mod catalog;
pub mod diversion;
pub mod error;
pub mod loading;
pub mod magvar;
pub mod models;
pub mod performance;
pub mod route_engine;
pub mod rules;
pub mod segment;
pub mod spatial;
pub mod table;

pub use advisory::Advisory;
pub use aircraft::{
    AircraftProfile, Airframe, CgLimits, FieldDistance, FlapCalibration, FuelSystem, Station,
    Stations, TailOverride, VSpeeds, WeightLimits,
};
pub use catalog::AircraftCatalog;
pub use diversion::{closest_diversions, Diversion, DiversionSample};
pub use error::{ConfigError, GeodesyError, NavError, SolveError, TableError};
pub use loading::{weight_and_balance, CgCheck, LoadItem, LoadSheet, WeightAndBalance};
pub use magvar::{CoefficientSet, FieldVector, GeomagneticModel};
pub use models::{
    Airport, Checkpoint, Frequency, GeoPoint, Navaid, Route, RouteState, Runway, SegmentResult,
};
pub use performance::{short_field, short_field_report, FieldPhase, ShortFieldEstimate, ShortFieldReport};
pub use route_engine::{FuelReserve, LegEntry, RoundTrip, RouteEngine, RouteEvaluation};
pub use rules::PlanningRules;
pub use segment::{runway_heading_deg, SegmentSolver};
pub use table::{Blend, Table, Wrap};
