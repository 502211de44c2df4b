//! Assembling and printing a complete navigation log.

use std::fmt;

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

use navlog_core::{
    closest_diversions, runway_heading_deg, short_field_report, weight_and_balance, Advisory,
    AircraftCatalog, Airport, DiversionSample, FieldPhase, GeomagneticModel, Route, RouteEngine,
    RouteEvaluation, SegmentSolver, ShortFieldEstimate, ShortFieldReport, WeightAndBalance,
};

use crate::morse::morse_code;
use crate::plan::{AirportIndex, FlightPlan};

/// Everything the planner prints for one flight plan.
#[derive(Debug, Clone, Serialize)]
pub struct NavlogReport {
    pub airframe: String,
    pub date: NaiveDate,
    pub weight_and_balance: WeightAndBalance,
    pub outbound: RouteEvaluation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inbound: Option<RouteEvaluation>,
    pub refueled: bool,
    pub short_field: ShortFieldReport,
    /// Limit violations found after the route was flown
    pub advisories: Vec<Advisory>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diversions: Vec<DiversionSample>,
    /// Route airports, then alternates, then diversions when asked for
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub airport_info: Vec<Airport>,
}

impl NavlogReport {
    /// Evaluate `plan`. `today` is used when the plan carries no date.
    pub fn build(
        catalog: &AircraftCatalog,
        model: &GeomagneticModel,
        airports: &AirportIndex,
        plan: &FlightPlan,
        today: NaiveDate,
    ) -> Result<Self> {
        plan.rules.validate()?;
        let airframe = catalog.resolve(plan.aircraft.as_deref(), plan.tail.as_deref())?;
        let profile = airframe.profile;
        let route = plan.route(airports)?;
        let alternates = plan.alternate_airports(airports)?;
        let date = plan.date.unwrap_or(today);
        let wb = weight_and_balance(&airframe, &plan.load)?;

        let solver = SegmentSolver::new(airframe, model, date)
            .with_runway_heading(runway_heading_deg(plan.runway))
            .with_taxi_fuel(plan.options.taxi_fuel_gal.unwrap_or(0.0))
            .with_fuel_flow(plan.options.fuel_flow_gph.unwrap_or(0.0));
        let engine = RouteEngine::new(solver, plan.rules.clone());

        let (outbound, inbound) = if plan.options.round_trip {
            let trip = engine.plan_round_trip(
                &route,
                wb.fuel_gal,
                plan.options.refuel,
                plan.return_runway.map(runway_heading_deg),
            )?;
            (trip.outbound, Some(trip.inbound))
        } else {
            (engine.evaluate(&route, wb.fuel_gal)?, None)
        };

        let landing_weight_lb =
            wb.total_weight_lb - outbound.fuel_burned_gal() * profile.fuel.lb_per_gal;
        let mut advisories = Vec::new();
        if landing_weight_lb > profile.limits.landing_lb {
            let advisory = Advisory::Overweight {
                phase: "landing".to_string(),
                weight_lb: landing_weight_lb,
                max_lb: profile.limits.landing_lb,
            };
            tracing::warn!("{}: {}", airframe.label(), advisory);
            advisories.push(advisory);
        }
        let short_field =
            short_field_report(profile, wb.total_weight_lb, landing_weight_lb, &route)?;

        let diversions = if plan.options.diversions && !airports.is_empty() {
            closest_diversions(engine.solver(), engine.rules(), &route, airports.all())
        } else {
            Vec::new()
        };
        let detail: &[DiversionSample] = if plan.options.diversion_detail {
            &diversions
        } else {
            &[]
        };
        let airport_info = airport_information(airports, &route, &alternates, detail);

        tracing::info!(
            "{} plan for {}: {} checkpoints, {} diversion samples",
            airframe.label(),
            date,
            route.len(),
            diversions.len()
        );

        Ok(Self {
            airframe: airframe.label().to_string(),
            date,
            weight_and_balance: wb,
            outbound,
            inbound,
            refueled: plan.options.round_trip && plan.options.refuel,
            short_field,
            advisories,
            diversions,
            airport_info,
        })
    }

    /// No advisory anywhere in the report.
    pub fn is_clear(&self) -> bool {
        self.advisories.is_empty()
            && self.weight_and_balance.is_within_limits()
            && self.outbound.advisories.is_empty()
            && self
                .inbound
                .as_ref()
                .map_or(true, |inbound| inbound.advisories.is_empty())
    }
}

impl fmt::Display for NavlogReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} navigation log for {}", self.airframe, self.date)?;
        writeln!(f)?;
        write_weight_and_balance(f, &self.weight_and_balance)?;
        writeln!(f)?;
        write_route(f, "Outbound", &self.outbound)?;
        if let Some(inbound) = &self.inbound {
            writeln!(f)?;
            let title = if self.refueled {
                "Return (refueled)"
            } else {
                "Return"
            };
            write_route(f, title, inbound)?;
        }
        writeln!(f)?;
        writeln!(f, "Short field performance")?;
        write_short_field(f, &self.short_field.takeoff)?;
        write_short_field(f, &self.short_field.landing)?;
        for advisory in &self.advisories {
            writeln!(f, "WARNING: {advisory}")?;
        }
        if !self.diversions.is_empty() {
            writeln!(f)?;
            write_diversions(f, &self.diversions)?;
        }
        if !self.airport_info.is_empty() {
            writeln!(f)?;
            write_airport_information(f, &self.airport_info)?;
        }
        Ok(())
    }
}

fn write_weight_and_balance(f: &mut fmt::Formatter<'_>, wb: &WeightAndBalance) -> fmt::Result {
    writeln!(f, "Weight and balance")?;
    writeln!(f, "{:<28} {:>8} {:>7} {:>10}", "ITEM", "WEIGHT", "ARM", "MOMENT")?;
    writeln!(f, "{}", "-".repeat(56))?;
    for item in &wb.items {
        writeln!(
            f,
            "{:<28} {:>8.1} {:>7.2} {:>10.1}",
            item.name, item.weight_lb, item.arm_in, item.moment
        )?;
    }
    writeln!(
        f,
        "{:<28} {:>8.1} {:>7.2} {:>10.1}",
        "TOTAL", wb.total_weight_lb, wb.total_arm_in, wb.total_moment
    )?;
    writeln!(f, "Max takeoff weight {:.0} lb", wb.max_takeoff_weight_lb)?;
    for check in [&wb.takeoff, &wb.zero_fuel] {
        writeln!(
            f,
            "CG {:<10} {:.2} in at {:.1} lb, limits {:.2} .. {:.2} ({:.0}%): {}",
            check.condition,
            check.arm_in,
            check.weight_lb,
            check.limits.arm_min,
            check.limits.arm_max,
            check.percent_of_range,
            if check.within { "within" } else { "OUTSIDE" }
        )?;
    }
    for advisory in &wb.advisories {
        writeln!(f, "WARNING: {advisory}")?;
    }
    Ok(())
}

fn write_route(f: &mut fmt::Formatter<'_>, title: &str, eval: &RouteEvaluation) -> fmt::Result {
    writeln!(f, "{title}: departing with {:.1} gal", eval.start_fuel_gal)?;
    writeln!(
        f,
        "{:<15} {:>6} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4} {:>6} {:>4} {:>5} {:>5} {:>7} {:>7} {:>6}",
        "CHECKPOINT", "PA", "CAS", "TAS", "TC", "WCA", "TH", "VAR", "MH", "DEV", "CH",
        "DIST", "GS", "ETE", "FUEL", "TOTDIST", "TOTTIME", "REM"
    )?;
    writeln!(f, "{}", "-".repeat(120))?;
    for entry in &eval.legs {
        let leg = &entry.segment;
        writeln!(
            f,
            "{:<15} {:>6.0} {:>4.0} {:>4.0} {:>4.0} {:>4.0} {:>4.0} {:>4.0} {:>4.0} {:>4.0} {:>4.0} {:>6.1} {:>4.0} {:>5.1} {:>5.1} {:>7.1} {:>7.1} {:>6.1}",
            truncate(&leg.to, 15),
            leg.pressure_altitude_ft,
            leg.cas_kt,
            leg.tas_kt,
            leg.true_course_deg,
            leg.wind_correction_deg,
            leg.true_heading_deg,
            leg.variation_deg,
            leg.magnetic_heading_deg,
            leg.deviation_deg,
            leg.compass_heading_deg,
            leg.distance_nm,
            leg.ground_speed_kt,
            leg.time_enroute_min,
            leg.fuel_burned_gal,
            entry.totals.distance_nm,
            entry.totals.time_min,
            entry.totals.fuel_remaining_gal,
        )?;
    }
    let reserve = &eval.reserve;
    writeln!(
        f,
        "Fuel left {:.1} gal = {:.2} hr, minimum {:.2} hr: {}",
        reserve.fuel_remaining_gal,
        reserve.endurance_hr,
        reserve.required_hr,
        if reserve.is_sufficient() { "OK" } else { "LOW" }
    )?;
    for advisory in &eval.advisories {
        writeln!(f, "WARNING: {advisory}")?;
    }
    Ok(())
}

fn write_short_field(f: &mut fmt::Formatter<'_>, estimate: &ShortFieldEstimate) -> fmt::Result {
    let phase = match estimate.phase {
        FieldPhase::Takeoff => "Takeoff",
        FieldPhase::Landing => "Landing",
    };
    writeln!(
        f,
        "{phase:<8} {:<15} {:>7.1} lb  PA {:>5.0} ft  OAT {:>3.0} C  ground roll {:>5.0} ft  over 50 ft {:>5.0} ft",
        truncate(&estimate.field, 15),
        estimate.weight_lb,
        estimate.pressure_altitude_ft,
        estimate.oat_c,
        estimate.distance.ground_roll_ft,
        estimate.distance.over_50ft_ft,
    )
}

fn write_diversions(f: &mut fmt::Formatter<'_>, samples: &[DiversionSample]) -> fmt::Result {
    writeln!(f, "Closest diversions (turn time not included)")?;
    writeln!(
        f,
        "{:<15} {:<5} {:>4} {:>6} {:>5} {:>5} {:>4} {:<8} {:<7} {:>6} {:>5} {:<4} {:<7} {:>6} NAME",
        "CHECKPOINT", "ICAO", "CH", "D", "ETE", "ELEV", "PUBL", "CTAF", "LONGEST", "LENGTH",
        "WIDTH", "PATT", "COND", "XTK"
    )?;
    writeln!(f, "{}", "-".repeat(120))?;
    for sample in samples {
        let Some(div) = &sample.diversion else {
            writeln!(f, "{:<15} none within range", truncate(&sample.label, 15))?;
            continue;
        };
        let pattern = |right: bool| if right { 'R' } else { 'L' };
        writeln!(
            f,
            "{:<15} {:<5} {:>4.0} {:>6.1} {:>5.1} {:>5.0} {:>4} {:<8} {:<7} {:>6.0} {:>5.0} {}/{}  {:<7} {:>6} {}",
            truncate(&sample.label, 15),
            div.airport.ident,
            div.compass_heading_deg,
            div.distance_nm,
            div.time_enroute_min,
            div.airport.elevation_ft,
            if div.airport.public_use { "Y" } else { "N" },
            div.airport.ctaf.as_deref().unwrap_or(""),
            div.runway.id,
            div.runway.length_ft,
            div.runway.width_ft,
            pattern(div.runway.right_pattern),
            pattern(div.runway.right_pattern_reciprocal),
            div.runway.condition,
            div.cross_track_nm
                .map(|xtk| format!("{xtk:.1}"))
                .unwrap_or_default(),
            div.airport.name,
        )?;
    }
    Ok(())
}

/// Airports worth a closer look, each listed once in order of first mention.
fn airport_information(
    airports: &AirportIndex,
    route: &Route,
    alternates: &[&Airport],
    diversions: &[DiversionSample],
) -> Vec<Airport> {
    let on_route = route
        .checkpoints()
        .iter()
        .filter(|cp| cp.elevation_ft.is_some())
        .filter_map(|cp| airports.get(&cp.ident));
    let diverted = diversions
        .iter()
        .filter_map(|sample| sample.diversion.as_ref())
        .map(|div| &div.airport);

    let mut listed: Vec<Airport> = Vec::new();
    for airport in on_route.chain(alternates.iter().copied()).chain(diverted) {
        if !listed.iter().any(|seen| seen.ident.eq_ignore_ascii_case(&airport.ident)) {
            listed.push(airport.clone());
        }
    }
    listed
}

/// VHF entries only; UHF and HF frequencies are of no use in a light single.
fn is_vhf(freq: &str) -> bool {
    freq.starts_with('1')
}

fn write_airport_information(f: &mut fmt::Formatter<'_>, airports: &[Airport]) -> fmt::Result {
    writeln!(f, "Airport information")?;
    for airport in airports {
        writeln!(f)?;
        writeln!(f, "{}:", airport.ident)?;
        writeln!(
            f,
            "    {:<10} {}{}",
            "NAME",
            airport.name,
            airport
                .city
                .as_deref()
                .map(|city| format!(", {city}"))
                .unwrap_or_default()
        )?;
        writeln!(f, "    {:<10} {:.0} ft", "ELEVATION", airport.elevation_ft)?;
        for runway in &airport.runways {
            let pattern = |right: bool| if right { 'R' } else { 'L' };
            writeln!(
                f,
                "    {:<10} {:<8} {:>6.0} x {:<4.0} {}/{}  {}",
                "RUNWAY",
                runway.id,
                runway.length_ft,
                runway.width_ft,
                pattern(runway.right_pattern),
                pattern(runway.right_pattern_reciprocal),
                runway.condition,
            )?;
        }
        for freq in airport.frequencies.iter().filter(|freq| is_vhf(&freq.freq)) {
            let remarks = match &freq.telephone {
                Some(phone) => format!("{phone} {}", freq.remarks),
                None => freq.remarks.clone(),
            };
            writeln!(
                f,
                "    {:<20} {:>8}  {}",
                truncate(&freq.kind, 20),
                freq.freq,
                remarks.trim_end()
            )?;
        }
        for navaid in airport
            .navaids
            .iter()
            .filter(|navaid| navaid.is_vor() && is_vhf(&navaid.freq))
        {
            let position = match (navaid.distance_nm, navaid.bearing_deg) {
                (Some(dist), Some(brg)) => format!("{dist:.1} NM {brg:03.0}"),
                _ => String::new(),
            };
            writeln!(
                f,
                "    {:<7} {:<4} {:<16} {:>7} {:<12} {:<16} {}",
                navaid.kind,
                navaid.ident,
                truncate(&navaid.name, 16),
                navaid.freq,
                position,
                morse_code(&navaid.ident),
                navaid.remarks,
            )?;
        }
    }
    Ok(())
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn airports() -> AirportIndex {
        AirportIndex::from_json(
            r#"[
                {"ident": "KTTA", "name": "Raleigh Exec Jetport", "lat": 35.5837, "lon": -79.1010,
                 "elevation_ft": 247, "public_use": true, "ctaf": "123.000",
                 "city": "Sanford",
                 "runways": [{"id": "03/21", "length_ft": 6500, "width_ft": 100, "condition": "ASPH-G"}],
                 "frequencies": [
                    {"kind": "CTAF", "freq": "123.000"},
                    {"kind": "AWOS-3", "freq": "119.675", "telephone": "919-775-0000"},
                    {"kind": "UNICOM", "freq": "253.500", "remarks": "MIL"}
                 ],
                 "navaids": [
                    {"ident": "LIB", "name": "LIBERTY", "kind": "VORTAC", "freq": "113.000",
                     "distance_nm": 17.4, "bearing_deg": 72},
                    {"ident": "SF", "name": "SANFORD", "kind": "NDB", "freq": "350"}
                 ]},
                {"ident": "KSCR", "name": "Siler City Muni", "lat": 35.7043, "lon": -79.5042,
                 "elevation_ft": 621, "public_use": true,
                 "runways": [{"id": "04/22", "length_ft": 5000, "width_ft": 75}]},
                {"ident": "KRDU", "name": "Raleigh-Durham Intl", "lat": 35.8776, "lon": -78.7875,
                 "elevation_ft": 435, "public_use": true, "city": "Raleigh/Durham",
                 "runways": [{"id": "05L/23R", "length_ft": 10000, "width_ft": 150, "condition": "CONC-G"}]}
            ]"#,
        )
        .unwrap()
    }

    fn plan(json: &str) -> FlightPlan {
        FlightPlan::from_json(json).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn builds_round_trip_report_with_diversions() {
        let catalog = AircraftCatalog::builtin().unwrap();
        let model = GeomagneticModel::default();
        let plan = plan(
            r#"{
                "tail": "N53587",
                "runway": 3,
                "date": "2025-04-12",
                "checkpoints": [
                    {"at": "KTTA"},
                    {"at": "KSCR", "altitude_ft": 3500, "wind_dir_deg": 220, "wind_speed_kt": 12}
                ]
            }"#,
        );
        let report = NavlogReport::build(&catalog, &model, &airports(), &plan, today()).unwrap();

        assert_eq!(report.airframe, "N53587");
        assert_eq!(report.date, NaiveDate::from_ymd_opt(2025, 4, 12).unwrap());
        assert_eq!(report.outbound.legs[0].segment.true_course_deg, 30.0);
        let inbound = report.inbound.as_ref().unwrap();
        assert!(inbound.start_fuel_gal < report.outbound.start_fuel_gal);
        assert!(!report.refueled);

        // KTTA, 3 leg samples, KSCR
        assert_eq!(report.diversions.len(), 5);
        assert_ne!(
            report.diversions[0].diversion.as_ref().unwrap().airport.ident,
            "KTTA"
        );
        assert!(report.short_field.landing.weight_lb < report.short_field.takeoff.weight_lb);
        assert_eq!(report.short_field.landing.field, "KSCR");
        assert!(report.is_clear());

        let text = report.to_string();
        assert!(text.contains("N53587 navigation log for 2025-04-12"));
        assert!(text.contains("Return"));
        assert!(text.contains("Closest diversions"));
        assert!(!text.contains("WARNING"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["airframe"], "N53587");
        assert!(json["outbound"]["legs"][1]["compass_heading_deg"].is_number());
    }

    #[test]
    fn one_way_plan_without_airports() {
        let catalog = AircraftCatalog::builtin().unwrap();
        let model = GeomagneticModel::default();
        let plan = plan(
            r#"{
                "aircraft": "c172s",
                "options": {"round_trip": false, "fuel_flow_gph": 9.0},
                "checkpoints": [
                    {"at": "35.5837,-79.1010"},
                    {"at": "3542N07930W", "altitude_ft": 4500}
                ]
            }"#,
        );
        let report =
            NavlogReport::build(&catalog, &model, &AirportIndex::default(), &plan, today()).unwrap();
        assert_eq!(report.date, today());
        assert!(report.inbound.is_none());
        assert!(report.diversions.is_empty());
        assert_eq!(report.outbound.legs[1].segment.fuel_flow_gph, 9.0);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("inbound").is_none());
        assert!(json.get("diversions").is_none());
    }

    #[test]
    fn low_fuel_plan_is_reported() {
        let catalog = AircraftCatalog::builtin().unwrap();
        let model = GeomagneticModel::default();
        let plan = plan(
            r#"{
                "aircraft": "C172S",
                "load": {"fuel_gal": 8.0},
                "options": {"round_trip": false},
                "checkpoints": [{"at": "KTTA"}, {"at": "KRDU"}]
            }"#,
        );
        let report = NavlogReport::build(&catalog, &model, &airports(), &plan, today()).unwrap();
        assert!(!report.outbound.reserve.is_sufficient());
        assert!(!report.is_clear());
        assert!(report.to_string().contains("LOW"));
    }

    #[test]
    fn tail_of_another_type_is_rejected() {
        let catalog = AircraftCatalog::builtin().unwrap();
        let model = GeomagneticModel::default();
        let plan = plan(
            r#"{"aircraft": "PA28", "tail": "N53587",
                "checkpoints": [{"at": "KTTA"}, {"at": "KRDU"}]}"#,
        );
        assert!(NavlogReport::build(&catalog, &model, &airports(), &plan, today()).is_err());
    }

    #[test]
    fn airport_information_lists_route_then_alternates() {
        let catalog = AircraftCatalog::builtin().unwrap();
        let model = GeomagneticModel::default();
        let plan = plan(
            r#"{
                "aircraft": "C172S",
                "options": {"round_trip": false, "diversions": false},
                "alternates": ["krdu", "KTTA"],
                "checkpoints": [{"at": "KTTA"}, {"at": "3542N07930W"}, {"at": "KSCR"}]
            }"#,
        );
        let report = NavlogReport::build(&catalog, &model, &airports(), &plan, today()).unwrap();
        let idents: Vec<&str> = report.airport_info.iter().map(|a| a.ident.as_str()).collect();
        assert_eq!(idents, ["KTTA", "KSCR", "KRDU"]);

        let text = report.to_string();
        assert!(text.contains("Airport information"));
        assert!(text.contains("Raleigh Exec Jetport, Sanford"));
        assert!(text.contains("919-775-0000"));
        assert!(text.contains(".-.. .. -..."));
        // UHF frequency and the NDB are left out
        assert!(!text.contains("253.500"));
        assert!(!text.contains("SANFORD"));
    }

    #[test]
    fn diversion_detail_adds_diversion_airports() {
        let catalog = AircraftCatalog::builtin().unwrap();
        let model = GeomagneticModel::default();
        let json = |detail: bool| {
            format!(
                r#"{{"aircraft": "C172S",
                    "options": {{"round_trip": false, "diversion_detail": {detail}}},
                    "checkpoints": [{{"at": "KTTA"}}, {{"at": "KSCR"}}]}}"#
            )
        };
        let index = airports();

        let plain = NavlogReport::build(&catalog, &model, &index, &plan(&json(false)), today())
            .unwrap();
        assert_eq!(plain.airport_info.len(), 2);

        let detailed = NavlogReport::build(&catalog, &model, &index, &plan(&json(true)), today())
            .unwrap();
        let diverted: Vec<&str> = detailed
            .diversions
            .iter()
            .filter_map(|sample| sample.diversion.as_ref())
            .map(|div| div.airport.ident.as_str())
            .collect();
        assert!(!diverted.is_empty());
        for ident in diverted {
            assert_eq!(
                detailed.airport_info.iter().filter(|a| a.ident == ident).count(),
                1
            );
        }
    }

    #[test]
    fn unknown_alternate_fails_the_plan() {
        let catalog = AircraftCatalog::builtin().unwrap();
        let model = GeomagneticModel::default();
        let plan = plan(
            r#"{"aircraft": "C172S", "alternates": ["KXYZ"],
                "checkpoints": [{"at": "KTTA"}, {"at": "KRDU"}]}"#,
        );
        let err = NavlogReport::build(&catalog, &model, &airports(), &plan, today()).unwrap_err();
        assert!(err.to_string().contains("KXYZ"));
    }

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate("ÅNGELHOLM-HELSINGBORG", 5), "ÅNGEL");
        assert_eq!(truncate("KTTA", 15), "KTTA");
    }
}
