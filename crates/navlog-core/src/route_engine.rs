//! Route evaluation: the segment solver folded over a route.
//!
//! Each leg produces a new [`RouteState`] from the previous one, so fuel
//! remaining only decreases and distance and time only increase along the
//! log. Once the route is flown the remaining fuel is converted to endurance
//! at the default burn rate and checked against the minimum reserve.

use serde::{Deserialize, Serialize};

use crate::advisory::Advisory;
use crate::error::NavError;
use crate::models::{Route, RouteState, SegmentResult};
use crate::rules::PlanningRules;
use crate::segment::SegmentSolver;

/// One navlog line: the solved leg and the totals after flying it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegEntry {
    #[serde(flatten)]
    pub segment: SegmentResult,
    pub totals: RouteState,
}

/// Endurance left after landing compared with the required reserve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuelReserve {
    pub fuel_remaining_gal: f64,
    pub endurance_hr: f64,
    pub required_hr: f64,
}

impl FuelReserve {
    pub fn is_sufficient(&self) -> bool {
        self.endurance_hr >= self.required_hr
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEvaluation {
    pub start_fuel_gal: f64,
    pub legs: Vec<LegEntry>,
    pub totals: RouteState,
    pub reserve: FuelReserve,
    pub advisories: Vec<Advisory>,
}

impl RouteEvaluation {
    pub fn fuel_burned_gal(&self) -> f64 {
        self.start_fuel_gal - self.totals.fuel_remaining_gal
    }
}

/// Outbound evaluation followed by the reversed route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundTrip {
    pub outbound: RouteEvaluation,
    pub inbound: RouteEvaluation,
    pub refueled: bool,
}

#[derive(Debug, Clone)]
pub struct RouteEngine<'a> {
    solver: SegmentSolver<'a>,
    rules: PlanningRules,
}

impl<'a> RouteEngine<'a> {
    pub fn new(solver: SegmentSolver<'a>, rules: PlanningRules) -> Self {
        Self { solver, rules }
    }

    pub fn solver(&self) -> &SegmentSolver<'a> {
        &self.solver
    }

    pub fn rules(&self) -> &PlanningRules {
        &self.rules
    }

    /// Evaluate `route` departing with `start_fuel_gal` on board.
    pub fn evaluate(&self, route: &Route, start_fuel_gal: f64) -> Result<RouteEvaluation, NavError> {
        evaluate_with(&self.solver, &self.rules, route, start_fuel_gal)
    }

    /// Fly `route`, then its reverse.
    ///
    /// The return trip departs with the outbound remaining fuel unless
    /// `refuel` is set, in which case it starts with `start_fuel_gal` again.
    /// `return_runway_heading_deg` replaces the departure runway for the
    /// return; without it the outbound runway is reused.
    pub fn plan_round_trip(
        &self,
        route: &Route,
        start_fuel_gal: f64,
        refuel: bool,
        return_runway_heading_deg: Option<f64>,
    ) -> Result<RoundTrip, NavError> {
        let outbound = self.evaluate(route, start_fuel_gal)?;

        let return_fuel = if refuel {
            start_fuel_gal
        } else {
            outbound.totals.fuel_remaining_gal
        };
        let solver = match return_runway_heading_deg {
            Some(heading) => self.solver.with_runway_heading(heading),
            None => self.solver,
        };
        let inbound = evaluate_with(&solver, &self.rules, &route.reversed(), return_fuel)?;

        Ok(RoundTrip {
            outbound,
            inbound,
            refueled: refuel,
        })
    }
}

fn evaluate_with(
    solver: &SegmentSolver<'_>,
    rules: &PlanningRules,
    route: &Route,
    start_fuel_gal: f64,
) -> Result<RouteEvaluation, NavError> {
    let start = RouteState::start(start_fuel_gal);
    let (legs, totals) = route.legs().try_fold(
        (Vec::with_capacity(route.len()), start),
        |(mut legs, state), (idx, from, to)| {
            let segment = solver.solve(idx, from, to)?;
            let next = state.advance(&segment);
            legs.push(LegEntry {
                segment,
                totals: next,
            });
            Ok::<_, NavError>((legs, next))
        },
    )?;

    let reserve = FuelReserve {
        fuel_remaining_gal: totals.fuel_remaining_gal,
        endurance_hr: totals.fuel_remaining_gal / solver.default_gph(),
        required_hr: rules.min_fuel_reserve_hr(),
    };

    let mut advisories = Vec::new();
    if !reserve.is_sufficient() {
        let advisory = Advisory::FuelReserve {
            endurance_hr: reserve.endurance_hr,
            required_hr: reserve.required_hr,
        };
        tracing::warn!("{} ({} -> {})", advisory, route.first().label(), route.last().label());
        advisories.push(advisory);
    }

    tracing::info!(
        from = route.first().label(),
        to = route.last().label(),
        legs = legs.len(),
        distance_nm = totals.distance_nm,
        time_min = totals.time_min,
        fuel_remaining_gal = totals.fuel_remaining_gal,
        "route evaluated"
    );

    Ok(RouteEvaluation {
        start_fuel_gal,
        legs,
        totals,
        reserve,
        advisories,
    })
}
