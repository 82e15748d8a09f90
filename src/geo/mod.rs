use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

const EARTH_RADIUS_KM: f64 = 6_371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(AppError::BadRequest(format!(
                "latitude {} out of range [-90, 90]",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(AppError::BadRequest(format!(
                "longitude {} out of range [-180, 180]",
                self.longitude
            )));
        }
        Ok(())
    }
}

/// Great-circle distance via the spherical law of cosines.
///
/// The `acos` argument is clamped to [-1, 1]: for identical points
/// floating-point error can push it slightly above 1, which would
/// otherwise yield NaN instead of 0.
pub fn distance_km(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    let central = lat_a.cos() * lat_b.cos() * delta_lng.cos() + lat_a.sin() * lat_b.sin();

    EARTH_RADIUS_KM * central.clamp(-1.0, 1.0).acos()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedCandidate {
    pub rider_id: Uuid,
    pub distance_km: f64,
}

/// Ranks `candidates` by distance from `origin`, ascending, keeping only
/// those within `radius_km`. Equal distances keep their input order
/// (stable sort).
pub fn nearest_within(
    origin: &Coordinate,
    candidates: &[(Uuid, Coordinate)],
    radius_km: f64,
) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .iter()
        .map(|(id, location)| RankedCandidate {
            rider_id: *id,
            distance_km: distance_km(origin, location),
        })
        .filter(|candidate| candidate.distance_km <= radius_km)
        .collect();

    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked
}
