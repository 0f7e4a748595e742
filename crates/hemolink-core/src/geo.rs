//! Great-circle distance on a spherical Earth.

use crate::error::RankError;
use serde::{Deserialize, Serialize};

/// Mean Earth radius used by every distance in the system, in km.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A validated WGS-84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPoint")]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct RawPoint {
    lat: f64,
    lon: f64,
}

impl TryFrom<RawPoint> for GeoPoint {
    type Error = RankError;

    fn try_from(raw: RawPoint) -> Result<Self, Self::Error> {
        GeoPoint::new(raw.lat, raw.lon)
    }
}

impl GeoPoint {
    /// Rejects non-finite values and anything outside [-90, 90] × [-180, 180].
    pub fn new(lat: f64, lon: f64) -> Result<Self, RankError> {
        let lat_ok = lat.is_finite() && (-90.0..=90.0).contains(&lat);
        let lon_ok = lon.is_finite() && (-180.0..=180.0).contains(&lon);
        if !(lat_ok && lon_ok) {
            return Err(RankError::InvalidCoordinate { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Spherical law of cosines. The `acos` argument is clamped to [-1, 1]
    /// so coincident points cannot produce NaN.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        if self == other {
            return 0.0;
        }

        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let delta_lon = other.lon.to_radians() - self.lon.to_radians();

        let cos_angle = lat1.cos() * lat2.cos() * delta_lon.cos() + lat1.sin() * lat2.sin();
        EARTH_RADIUS_KM * cos_angle.clamp(-1.0, 1.0).acos()
    }
}

/// Distance in km between two raw coordinates, validating both.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Result<f64, RankError> {
    let a = GeoPoint::new(lat1, lon1)?;
    let b = GeoPoint::new(lat2, lon2)?;
    Ok(a.distance_km(&b))
}

/// Rounds a distance for display (two decimal places).
pub fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}
