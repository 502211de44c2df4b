//! Navlog CLI - flight plan files, airport reference data and report
//! rendering for the `navlog` binary.

pub mod config;
pub mod coords;
pub mod morse;
pub mod plan;
pub mod report;

pub use config::Config;
pub use coords::parse_coordinates;
pub use morse::morse_code;
pub use plan::{AirportIndex, FlightPlan, PlanCheckpoint, PlanOptions};
pub use report::NavlogReport;
