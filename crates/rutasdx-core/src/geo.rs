use std::fmt;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Zoom used when the map has no better idea where the user is.
pub const OVERVIEW_ZOOM: u8 = 6;
/// Zoom used after centring on a located user.
pub const LOCATED_ZOOM: u8 = 14;
/// Zoom used when jumping to the start of a selected route.
pub const ROUTE_ZOOM: u8 = 10;

/// A WGS84 coordinate. Construction through [`GeoPoint::new`] or
/// deserialization guarantees both components are in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPoint")]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Deserialize)]
struct RawPoint {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawPoint> for GeoPoint {
    type Error = CoreError;

    fn try_from(raw: RawPoint) -> Result<Self, Self::Error> {
        GeoPoint::new(raw.lat, raw.lng)
    }
}

impl GeoPoint {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinate`] when either component is
    /// non-finite or out of range.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoreError> {
        let lat_ok = lat.is_finite() && (-90.0..=90.0).contains(&lat);
        let lng_ok = lng.is_finite() && (-180.0..=180.0).contains(&lng);
        if lat_ok && lng_ok {
            Ok(Self { lat, lng })
        } else {
            Err(CoreError::InvalidCoordinate { lat, lng })
        }
    }

    /// Build from a legacy `[lat, lng]` pair.
    ///
    /// # Errors
    ///
    /// Same as [`GeoPoint::new`].
    pub fn from_pair(pair: [f64; 2]) -> Result<Self, CoreError> {
        Self::new(pair[0], pair[1])
    }

    /// Four-decimal rendering used in labels and popups.
    #[must_use]
    pub fn short(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lng)
    }
}

/// `lat,lng` with no spaces, the form deep links expect.
impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: GeoPoint,
    pub zoom: u8,
}

impl Camera {
    #[must_use]
    pub fn new(center: GeoPoint, zoom: u8) -> Self {
        Self { center, zoom }
    }

    #[must_use]
    pub fn overview(center: GeoPoint) -> Self {
        Self::new(center, OVERVIEW_ZOOM)
    }
}
