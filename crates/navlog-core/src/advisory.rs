//! Non-fatal limit violations attached to plan results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::aircraft::CgLimits;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// Endurance after landing is below the required reserve.
    FuelReserve { endurance_hr: f64, required_hr: f64 },
    /// Center of gravity outside the envelope for the given loading.
    CgOutOfEnvelope {
        condition: String,
        arm_in: f64,
        limits: CgLimits,
    },
    /// Total weight above the maximum for the phase of flight.
    Overweight {
        phase: String,
        weight_lb: f64,
        max_lb: f64,
    },
    /// A baggage area (or both combined) over its structural limit.
    BaggageOverLimit {
        area: String,
        weight_lb: f64,
        max_lb: f64,
    },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::FuelReserve {
                endurance_hr,
                required_hr,
            } => write!(
                f,
                "fuel time left ({endurance_hr:.2} hr) < minimum allowed ({required_hr:.2} hr)"
            ),
            Advisory::CgOutOfEnvelope {
                condition,
                arm_in,
                limits,
            } => write!(
                f,
                "{condition} CG ({arm_in:.2}) is OUTSIDE normal range ({:.2} .. {:.2})",
                limits.arm_min, limits.arm_max
            ),
            Advisory::Overweight {
                phase,
                weight_lb,
                max_lb,
            } => write!(
                f,
                "{phase} weight ({weight_lb:.1}) > max allowed ({max_lb:.1})"
            ),
            Advisory::BaggageOverLimit {
                area,
                weight_lb,
                max_lb,
            } => write!(
                f,
                "{area} baggage weight ({weight_lb:.1}) > max allowed ({max_lb:.1})"
            ),
        }
    }
}
