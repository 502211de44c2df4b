//! Great-circle math on a spherical earth.
//!
//! Formulas follow the classic spherical-trigonometry forms (haversine,
//! forward azimuth, Clairaut). Angles are in degrees and distances in meters
//! unless a function name says otherwise.

use crate::error::GeodesyError;
use crate::models::GeoPoint;

/// Mean earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;
pub const METERS_PER_NM: f64 = 1852.0;

/// Separation below which two points are treated as the same position.
const COINCIDENT_EPSILON_M: f64 = 1e-6;

pub fn meters_to_nm(meters: f64) -> f64 {
    meters / METERS_PER_NM
}

pub fn nm_to_meters(nm: f64) -> f64 {
    nm * METERS_PER_NM
}

/// Normalize a longitude to (-180, 180].
pub fn normalize_longitude(lon_deg: f64) -> f64 {
    let lon = (lon_deg + 180.0).rem_euclid(360.0) - 180.0;
    if lon <= -180.0 {
        lon + 360.0
    } else {
        lon
    }
}

/// Normalize a direction to [0, 360).
pub fn normalize_heading(deg: f64) -> f64 {
    let heading = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if heading >= 360.0 {
        0.0
    } else {
        heading
    }
}

/// Great-circle distance between two points in meters (haversine formula).
pub fn distance(p1: GeoPoint, p2: GeoPoint) -> f64 {
    EARTH_RADIUS_M * angular_distance(p1, p2)
}

/// Great-circle distance in nautical miles.
pub fn distance_nm(p1: GeoPoint, p2: GeoPoint) -> f64 {
    meters_to_nm(distance(p1, p2))
}

fn angular_distance(p1: GeoPoint, p2: GeoPoint) -> f64 {
    let phi1 = p1.lat.to_radians();
    let phi2 = p2.lat.to_radians();
    let dphi = (p2.lat - p1.lat).to_radians();
    let dlambda = (p2.lon - p1.lon).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

fn is_coincident(p1: GeoPoint, p2: GeoPoint) -> bool {
    distance(p1, p2) <= COINCIDENT_EPSILON_M
}

/// Initial bearing (forward azimuth) from `p1` toward `p2`, in [0, 360).
///
/// The bearing between coincident points is undefined and reported as
/// [`GeodesyError::CoincidentPoints`].
pub fn initial_bearing(p1: GeoPoint, p2: GeoPoint) -> Result<f64, GeodesyError> {
    if is_coincident(p1, p2) {
        return Err(GeodesyError::CoincidentPoints);
    }
    let phi1 = p1.lat.to_radians();
    let phi2 = p2.lat.to_radians();
    let delta_lambda = (p2.lon - p1.lon).to_radians();

    let y = delta_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    Ok(normalize_heading(y.atan2(x).to_degrees()))
}

/// Half-way point along the great circle between two points.
pub fn midpoint(p1: GeoPoint, p2: GeoPoint) -> GeoPoint {
    let phi1 = p1.lat.to_radians();
    let phi2 = p2.lat.to_radians();
    let lambda1 = p1.lon.to_radians();
    let delta_lambda = (p2.lon - p1.lon).to_radians();

    let bx = phi2.cos() * delta_lambda.cos();
    let by = phi2.cos() * delta_lambda.sin();
    let cb = phi1.cos() + bx;
    let phi3 = (phi1.sin() + phi2.sin()).atan2((cb * cb + by * by).sqrt());
    let lambda3 = lambda1 + by.atan2(cb);

    GeoPoint::new(phi3.to_degrees(), normalize_longitude(lambda3.to_degrees()))
}

/// Point at fraction `f` of the way along the great circle from `p1` to `p2`.
///
/// Returns `p1` exactly at `f == 0` and `p2` exactly at `f == 1`.
pub fn intermediate_point(p1: GeoPoint, p2: GeoPoint, f: f64) -> Result<GeoPoint, GeodesyError> {
    if f == 0.0 || is_coincident(p1, p2) {
        return Ok(p1);
    }
    if f == 1.0 {
        return Ok(p2);
    }

    let delta = angular_distance(p1, p2);
    let sin_delta = delta.sin();
    if sin_delta.abs() < 1e-12 {
        return Err(GeodesyError::AntipodalPoints);
    }

    let phi1 = p1.lat.to_radians();
    let phi2 = p2.lat.to_radians();
    let lambda1 = p1.lon.to_radians();
    let lambda2 = p2.lon.to_radians();

    let a = ((1.0 - f) * delta).sin() / sin_delta;
    let b = (f * delta).sin() / sin_delta;
    let x = a * phi1.cos() * lambda1.cos() + b * phi2.cos() * lambda2.cos();
    let y = a * phi1.cos() * lambda1.sin() + b * phi2.cos() * lambda2.sin();
    let z = a * phi1.sin() + b * phi2.sin();

    let phi3 = z.atan2((x * x + y * y).sqrt());
    let lambda3 = y.atan2(x);

    Ok(GeoPoint::new(
        phi3.to_degrees(),
        normalize_longitude(lambda3.to_degrees()),
    ))
}

/// Destination reached from `start` after `distance_m` along the great circle
/// with initial bearing `bearing_deg`.
pub fn destination(start: GeoPoint, bearing_deg: f64, distance_m: f64) -> GeoPoint {
    if distance_m.abs() <= f64::EPSILON {
        return start;
    }

    let lat1 = start.lat.to_radians();
    let lon1 = start.lon.to_radians();
    let bearing_rad = bearing_deg.to_radians();
    let angular_distance = distance_m / EARTH_RADIUS_M;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let lon2 = lon1 + y.atan2(x);

    GeoPoint::new(lat2.to_degrees(), normalize_longitude(lon2.to_degrees()))
}

/// Signed distance in meters of `point` from the great-circle path
/// `start` → `end`; positive to the right of the direction of travel.
pub fn cross_track_distance(
    start: GeoPoint,
    end: GeoPoint,
    point: GeoPoint,
) -> Result<f64, GeodesyError> {
    let course = initial_bearing(start, end)?;
    if is_coincident(start, point) {
        return Ok(0.0);
    }
    let delta13 = angular_distance(start, point);
    let theta13 = initial_bearing(start, point)?;
    let dxt = (delta13.sin() * (theta13 - course).to_radians().sin())
        .clamp(-1.0, 1.0)
        .asin();
    Ok(dxt * EARTH_RADIUS_M)
}

/// Signed distance in meters from `start` to the point on the path
/// `start` → `end` closest to `point`; negative when that point lies behind
/// `start`.
pub fn along_track_distance(
    start: GeoPoint,
    end: GeoPoint,
    point: GeoPoint,
) -> Result<f64, GeodesyError> {
    let course = initial_bearing(start, end)?;
    if is_coincident(start, point) {
        return Ok(0.0);
    }
    let delta13 = angular_distance(start, point);
    let theta13 = initial_bearing(start, point)?;
    let relative = (theta13 - course).to_radians();
    let dxt = (delta13.sin() * relative.sin()).clamp(-1.0, 1.0).asin();
    let dat = (delta13.cos() / dxt.cos()).clamp(-1.0, 1.0).acos();
    Ok(dat * relative.cos().signum() * EARTH_RADIUS_M)
}

/// Highest latitude reached by a great circle crossing `lat_deg` on
/// `bearing_deg` (Clairaut's formula).
pub fn maximum_latitude(bearing_deg: f64, lat_deg: f64) -> f64 {
    let value = (bearing_deg.to_radians().sin() * lat_deg.to_radians().cos()).abs();
    value.clamp(0.0, 1.0).acos().to_degrees()
}
