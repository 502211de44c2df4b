//! CLI configuration from environment.

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Extra aircraft types and tails merged over the built-in catalog
    pub catalog_path: Option<PathBuf>,
    /// Airport reference data used for idents and diversions
    pub airports_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let path = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
        };
        Self {
            catalog_path: path("NAVLOG_CATALOG"),
            airports_path: path("NAVLOG_AIRPORTS"),
        }
    }
}
