//! Closest diversion airports along a route.
//!
//! Every checkpoint and a few great-circle points along each leg are paired
//! with the reachable airport that has the shortest solved time enroute,
//! flying the conditions of the checkpoint the leg starts from.

use serde::{Deserialize, Serialize};

use crate::models::{Airport, Checkpoint, GeoPoint, Route, Runway};
use crate::rules::PlanningRules;
use crate::segment::SegmentSolver;
use crate::spatial::{cross_track_distance, distance_nm, intermediate_point, meters_to_nm};

/// Best diversion from one sample point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diversion {
    pub airport: Airport,
    pub runway: Runway,
    pub compass_heading_deg: f64,
    pub distance_nm: f64,
    pub time_enroute_min: f64,
    /// Offset of the airport from the leg, positive right of course
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_track_nm: Option<f64>,
}

/// A point on the route and its closest diversion, if any qualifies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiversionSample {
    pub label: String,
    /// Navlog leg the sample lies on
    pub leg: usize,
    pub position: GeoPoint,
    pub diversion: Option<Diversion>,
}

/// Sample points: each checkpoint, followed by the configured fractions of
/// the leg to the next checkpoint.
pub fn sample_points(route: &Route, fractions: &[f64]) -> Vec<(usize, Checkpoint)> {
    let cps = route.checkpoints();
    let last = cps.len() - 1;
    let mut samples = Vec::with_capacity(cps.len() * (fractions.len() + 1));
    for (idx, cp) in cps.iter().enumerate() {
        let leg = if idx == last { idx } else { idx + 1 };
        samples.push((leg, cp.clone()));
        if idx == last {
            continue;
        }
        let next = &cps[idx + 1];
        for &f in fractions {
            let Ok(position) = intermediate_point(cp.position, next.position, f) else {
                continue;
            };
            samples.push((
                leg,
                Checkpoint {
                    ident: String::new(),
                    name: format!("{:.0}%", f * 100.0),
                    position,
                    elevation_ft: None,
                    ..cp.clone()
                },
            ));
        }
    }
    samples
}

/// Closest diversion for every sample point of `route`.
pub fn closest_diversions(
    solver: &SegmentSolver<'_>,
    rules: &PlanningRules,
    route: &Route,
    airports: &[Airport],
) -> Vec<DiversionSample> {
    let candidates: Vec<(&Airport, &Runway)> = airports
        .iter()
        .filter_map(|airport| {
            airport
                .longest_runway()
                .filter(|rwy| rwy.length_ft >= rules.min_diversion_runway_ft)
                .map(|rwy| (airport, rwy))
        })
        .collect();
    tracing::debug!(
        "{} of {} airports have a runway >= {} ft",
        candidates.len(),
        airports.len(),
        rules.min_diversion_runway_ft
    );

    let cps = route.checkpoints();
    sample_points(route, &rules.diversion_fractions)
        .into_iter()
        .map(|(leg, sample)| {
            let (leg_start, leg_end) = (&cps[leg - 1], &cps[leg]);
            let diversion = candidates
                .iter()
                .filter(|(airport, _)| sample.ident.is_empty() || airport.ident != sample.ident)
                .filter(|(airport, _)| {
                    distance_nm(sample.position, airport.position) < rules.diversion_radius_nm
                })
                .filter_map(|(airport, runway)| {
                    let target = Checkpoint {
                        position: airport.position,
                        ..sample.clone()
                    };
                    match solver.solve(leg, &sample, &target) {
                        Ok(result) => Some((airport, runway, result)),
                        Err(err) => {
                            tracing::debug!("skipping diversion {}: {}", airport.ident, err);
                            None
                        }
                    }
                })
                .min_by(|a, b| a.2.time_enroute_min.total_cmp(&b.2.time_enroute_min))
                .map(|(airport, runway, result)| Diversion {
                    airport: (*airport).clone(),
                    runway: (*runway).clone(),
                    compass_heading_deg: result.compass_heading_deg,
                    distance_nm: result.distance_nm,
                    time_enroute_min: result.time_enroute_min,
                    cross_track_nm: cross_track_distance(
                        leg_start.position,
                        leg_end.position,
                        airport.position,
                    )
                    .ok()
                    .map(meters_to_nm),
                });

            DiversionSample {
                label: sample.label().to_string(),
                leg,
                position: sample.position,
                diversion,
            }
        })
        .collect()
}
