//! Navlog - dead-reckoning navigation log planner.
//!
//! Reads a JSON flight plan and prints the navigation log, weight and
//! balance, fuel reserve, short-field distances and closest diversions.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use navlog_cli::{AirportIndex, Config, FlightPlan, NavlogReport};
use navlog_core::{AircraftCatalog, GeomagneticModel};

/// Plan a VFR cross-country flight from a JSON flight plan
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Flight plan file
    #[arg(required_unless_present = "list_aircraft")]
    plan: Option<PathBuf>,

    /// Extra aircraft types and tails (JSON), merged over the built-in catalog
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Airport reference data (JSON array) for idents and diversions
    #[arg(long)]
    airports: Option<PathBuf>,

    /// Date for magnetic variation (YYYY-MM-DD); default is the plan's, then today
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Skip the return trip
    #[arg(long)]
    no_return: bool,

    /// Refuel before the return trip
    #[arg(long)]
    refuel: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// List the aircraft types and tails in the catalog and exit
    #[arg(long)]
    list_aircraft: bool,
}

fn main() -> Result<()> {
    // Logs go to stderr so the report can be piped.
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("navlog=info".parse()?))
        .init();

    let args = Args::parse();
    let config = Config::from_env();

    let mut catalog = AircraftCatalog::builtin()?;
    if let Some(path) = args.catalog.as_ref().or(config.catalog_path.as_ref()) {
        catalog
            .load_json(&read(path)?)
            .with_context(|| format!("loading aircraft catalog {}", path.display()))?;
    }
    if args.list_aircraft {
        for designator in catalog.type_designators() {
            println!("type {designator}");
        }
        for tail in catalog.tail_numbers() {
            println!("tail {tail}");
        }
        return Ok(());
    }

    let airports = match args.airports.as_ref().or(config.airports_path.as_ref()) {
        Some(path) => AirportIndex::from_json(&read(path)?)
            .with_context(|| format!("loading airports {}", path.display()))?,
        None => AirportIndex::default(),
    };

    let Some(plan_path) = args.plan.as_ref() else {
        bail!("a flight plan file is required");
    };
    let mut plan = FlightPlan::from_json(&read(plan_path)?)
        .with_context(|| format!("loading flight plan {}", plan_path.display()))?;
    if args.no_return {
        plan.options.round_trip = false;
    }
    if args.refuel {
        plan.options.refuel = true;
    }
    if args.date.is_some() {
        plan.date = args.date;
    }

    let model = GeomagneticModel::default();
    let report = NavlogReport::build(&catalog, &model, &airports, &plan, Local::now().date_naive())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }
    if !report.is_clear() {
        tracing::warn!("plan has advisories; review before flight");
    }
    Ok(())
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
