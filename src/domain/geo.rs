// src/domain/geo.rs
use crate::errors::ServerError;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two WGS84 points.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

pub fn validate_coordinates(lat: f64, lon: f64) -> Result<(), ServerError> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(ServerError::BadRequest("latitude must be within [-90, 90]".into()));
    }
    if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
        return Err(ServerError::BadRequest("longitude must be within [-180, 180]".into()));
    }
    Ok(())
}
