//! Standard-atmosphere altitude and airspeed corrections.
//!
//! These are the flight-computer (E6B) approximations: pressure altitude from
//! the altimeter setting at 1000 ft per inHg, density altitude from the
//! standard lapse rate, and true airspeed from the density ratio.

use crate::models::STANDARD_ALTIMETER_INHG;

/// Standard temperature lapse rate, kelvin per foot.
pub const LAPSE_RATE_K_PER_FT: f64 = 0.0019812;
pub const CELSIUS_TO_KELVIN: f64 = 273.15;
/// Sea-level standard temperature, kelvin.
pub const SEA_LEVEL_TEMP_K: f64 = 288.15;
/// Exponent relating the temperature ratio to the pressure ratio.
const PRESSURE_EXPONENT: f64 = 0.234969;

/// Pressure altitude in feet for an indicated altitude and altimeter setting.
pub fn pressure_altitude_ft(indicated_altitude_ft: f64, altimeter_inhg: f64) -> f64 {
    indicated_altitude_ft + 1000.0 * (STANDARD_ALTIMETER_INHG - altimeter_inhg)
}

/// ISA temperature in Celsius at a pressure altitude.
pub fn standard_temperature_c(pressure_altitude_ft: f64) -> f64 {
    SEA_LEVEL_TEMP_K - pressure_altitude_ft * LAPSE_RATE_K_PER_FT - CELSIUS_TO_KELVIN
}

/// Density altitude in feet for a pressure altitude and outside air
/// temperature.
pub fn density_altitude_ft(pressure_altitude_ft: f64, oat_c: f64) -> f64 {
    let std_temp_k = SEA_LEVEL_TEMP_K - pressure_altitude_ft * LAPSE_RATE_K_PER_FT;
    let temp_ratio_ft = std_temp_k / LAPSE_RATE_K_PER_FT;
    let ratio = std_temp_k / (oat_c + CELSIUS_TO_KELVIN);
    pressure_altitude_ft + temp_ratio_ft * (1.0 - ratio.powf(PRESSURE_EXPONENT))
}

/// Air density relative to sea-level standard at a density altitude.
pub fn density_ratio(density_altitude_ft: f64) -> f64 {
    let temp_ratio =
        (SEA_LEVEL_TEMP_K - density_altitude_ft * LAPSE_RATE_K_PER_FT) / SEA_LEVEL_TEMP_K;
    temp_ratio.powf(1.0 / PRESSURE_EXPONENT)
}

/// True airspeed for a calibrated airspeed at a density altitude.
pub fn true_airspeed(cas_kt: f64, density_altitude_ft: f64) -> f64 {
    cas_kt / density_ratio(density_altitude_ft).sqrt()
}
