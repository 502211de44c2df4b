//! Coordinate literals accepted in place of an airport ident.

use std::sync::OnceLock;

use navlog_core::GeoPoint;
use regex::Regex;

/// Decimal degrees, e.g. `35.5837,-79.1010` or `35.5837/-79.1010`.
fn decimal_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // (-?\d+\.\d+) - latitude, a decimal point is required
        // [,/]         - separator
        // (-?\d+\.\d+) - longitude
        Regex::new(r"^(-?\d+\.\d+)[,/](-?\d+\.\d+)$").expect("valid decimal coordinate regex")
    })
}

/// Degrees and minutes, e.g. `3530N07906W`.
fn degrees_minutes_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{2})(\d{2})([NS])(\d{3})(\d{2})([EW])$")
            .expect("valid degrees-minutes coordinate regex")
    })
}

/// Parse `lat,lon` or `lat/lon` in decimal degrees, or `DDMM[N|S]DDDMM[E|W]`.
///
/// Returns `None` for anything else, including positions off the globe.
pub fn parse_coordinates(text: &str) -> Option<GeoPoint> {
    let text = text.trim().to_ascii_uppercase();
    parse_decimal(&text).or_else(|| parse_degrees_minutes(&text))
}

fn parse_decimal(text: &str) -> Option<GeoPoint> {
    let caps = decimal_pattern().captures(text)?;
    let lat: f64 = caps[1].parse().ok()?;
    let lon: f64 = caps[2].parse().ok()?;
    on_globe(lat, lon)
}

fn parse_degrees_minutes(text: &str) -> Option<GeoPoint> {
    let caps = degrees_minutes_pattern().captures(text)?;
    let number = |idx: usize| caps[idx].parse::<f64>().ok();

    let (lat_min, lon_min) = (number(2)?, number(5)?);
    if lat_min >= 60.0 || lon_min >= 60.0 {
        return None;
    }
    let mut lat = number(1)? + lat_min / 60.0;
    let mut lon = number(4)? + lon_min / 60.0;
    if &caps[3] == "S" {
        lat = -lat;
    }
    if &caps[6] == "W" {
        lon = -lon;
    }
    on_globe(lat, lon)
}

fn on_globe(lat: f64, lon: f64) -> Option<GeoPoint> {
    ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon))
        .then(|| GeoPoint::new(lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_point(text: &str, lat: f64, lon: f64) {
        let p = parse_coordinates(text).unwrap_or_else(|| panic!("{text} did not parse"));
        assert!((p.lat - lat).abs() < 1e-9, "{text}: lat {}", p.lat);
        assert!((p.lon - lon).abs() < 1e-9, "{text}: lon {}", p.lon);
    }

    #[test]
    fn decimal_pairs() {
        assert_point("35.5837,-79.1010", 35.5837, -79.1010);
        assert_point("35.5837/-79.1010", 35.5837, -79.1010);
        assert_point(" -33.9,151.2 ", -33.9, 151.2);
    }

    #[test]
    fn degrees_and_minutes() {
        assert_point("3530N07906W", 35.5, -79.1);
        assert_point("3345s15112e", -33.75, 151.2);
    }

    #[test]
    fn decimals_need_a_decimal_point_on_both_axes() {
        for text in ["35,-79", "1e1,2e1", "35.5,-79", "+35.5,-79.1", "35.5, -79.1", "inf,1.0"] {
            assert_eq!(parse_coordinates(text), None, "{text}");
        }
    }

    #[test]
    fn rejects_idents_and_impossible_positions() {
        for text in [
            "KTTA",
            "",
            "35.5",
            "95.0,10.0",
            "10.0,181.0",
            "3575N07906W",
            "9130N07906W",
            "3530X07906W",
            "3530N07906",
        ] {
            assert_eq!(parse_coordinates(text), None, "{text}");
        }
    }
}
