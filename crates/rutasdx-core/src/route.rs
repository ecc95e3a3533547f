//! Route data model.
//!
//! Every [`Route`] holds a canonical `waypoints` sequence. Older stored
//! records and the catalog file describe endpoints as `startCoords` /
//! `endCoords` pairs instead; [`Route::from_record`] migrates those once at
//! load time so nothing downstream has to know about the legacy shape.

use serde::{Deserialize, Serialize};

use crate::catalog::SearchParams;
use crate::geo::GeoPoint;
use crate::links::google_maps_directions_url;
use crate::CoreError;

/// Label printed for any metric the route does not know.
pub const UNKNOWN: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteWaypoint {
    #[serde(flatten)]
    pub position: GeoPoint,
    #[serde(default)]
    pub description: String,
}

impl RouteWaypoint {
    #[must_use]
    pub fn new(position: GeoPoint, description: impl Into<String>) -> Self {
        Self {
            position,
            description: description.into(),
        }
    }
}

/// Where a waypoint sits in its route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaypointRole {
    Origin,
    /// Interior point; `number` is the 1-based position in the full route.
    Via { number: usize },
    Destination,
}

impl WaypointRole {
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            WaypointRole::Origin => "Origen".to_string(),
            WaypointRole::Via { number } => format!("Punto {number}"),
            WaypointRole::Destination => "Destino".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaggedWaypoint<'a> {
    pub role: WaypointRole,
    pub waypoint: &'a RouteWaypoint,
}

/// Assign each waypoint its role. A lone point is the origin.
#[must_use]
pub fn tag_waypoints(waypoints: &[RouteWaypoint]) -> Vec<TaggedWaypoint<'_>> {
    let last = waypoints.len().saturating_sub(1);
    waypoints
        .iter()
        .enumerate()
        .map(|(index, waypoint)| {
            let role = if index == 0 {
                WaypointRole::Origin
            } else if index == last {
                WaypointRole::Destination
            } else {
                WaypointRole::Via { number: index + 1 }
            };
            TaggedWaypoint { role, waypoint }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RouteRecord")]
pub struct Route {
    pub id: String,
    pub origin: String,
    pub destination: String,
    #[serde(rename = "distance", serialize_with = "unknown::serialize")]
    pub distance_km: Option<u32>,
    #[serde(rename = "time", serialize_with = "unknown::serialize")]
    pub time_minutes: Option<u32>,
    #[serde(rename = "tolls", serialize_with = "unknown::serialize")]
    pub toll_cost: Option<u32>,
    pub restrictions: Option<String>,
    pub waypoints: Vec<RouteWaypoint>,
    pub is_custom: bool,
    pub avoid_tolls: bool,
    #[serde(rename = "searchParams", skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchParams>,
}

/// Stored or catalog shape of a route, before normalization.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RouteRecord {
    pub id: String,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default, deserialize_with = "unknown::deserialize")]
    pub distance: Option<u32>,
    #[serde(default, deserialize_with = "unknown::deserialize")]
    pub time: Option<u32>,
    #[serde(default, alias = "tollCost", deserialize_with = "unknown::deserialize")]
    pub tolls: Option<u32>,
    #[serde(default)]
    pub restrictions: Option<String>,
    #[serde(default)]
    pub waypoints: Option<Vec<RouteWaypoint>>,
    #[serde(default)]
    pub start_coords: Option<[f64; 2]>,
    #[serde(default)]
    pub end_coords: Option<[f64; 2]>,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default)]
    pub avoid_tolls: bool,
    #[serde(default)]
    pub search_params: Option<SearchParams>,
}

impl TryFrom<RouteRecord> for Route {
    type Error = CoreError;

    fn try_from(record: RouteRecord) -> Result<Self, Self::Error> {
        Route::from_record(record)
    }
}

impl Route {
    /// Normalize a stored or catalog record into the canonical shape.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for a blank id and
    /// [`CoreError::InvalidCoordinate`] for out-of-range legacy coordinates.
    pub(crate) fn from_record(record: RouteRecord) -> Result<Self, CoreError> {
        if record.id.trim().is_empty() {
            return Err(CoreError::Validation("route id must be non-empty".to_string()));
        }

        let waypoints = match record.waypoints {
            Some(waypoints) if !waypoints.is_empty() => waypoints,
            _ => match (record.start_coords, record.end_coords) {
                (Some(start), Some(end)) => vec![
                    RouteWaypoint::new(GeoPoint::from_pair(start)?, record.origin.clone()),
                    RouteWaypoint::new(GeoPoint::from_pair(end)?, record.destination.clone()),
                ],
                _ => Vec::new(),
            },
        };

        let origin = if record.origin.trim().is_empty() {
            waypoints.first().map(endpoint_label).unwrap_or_default()
        } else {
            record.origin
        };
        let destination = if record.destination.trim().is_empty() {
            waypoints.last().map(endpoint_label).unwrap_or_default()
        } else {
            record.destination
        };

        Ok(Self {
            id: record.id,
            origin,
            destination,
            distance_km: record.distance,
            time_minutes: record.time,
            toll_cost: record.tolls,
            restrictions: record.restrictions.filter(|r| !r.trim().is_empty()),
            waypoints,
            is_custom: record.is_custom,
            avoid_tolls: record.avoid_tolls,
            search: record.search_params,
        })
    }

    /// Whether the route carries enough geometry for the external map.
    #[must_use]
    pub fn has_coordinates(&self) -> bool {
        self.waypoints.len() >= 2
    }

    #[must_use]
    pub fn tagged_waypoints(&self) -> Vec<TaggedWaypoint<'_>> {
        tag_waypoints(&self.waypoints)
    }

    /// Interior points, excluding origin and destination.
    #[must_use]
    pub fn via_points(&self) -> &[RouteWaypoint] {
        if self.waypoints.len() > 2 {
            &self.waypoints[1..self.waypoints.len() - 1]
        } else {
            &[]
        }
    }

    /// Toll-free either because this route was derived that way or because
    /// the search that produced it asked for it.
    #[must_use]
    pub fn is_toll_free_request(&self) -> bool {
        self.avoid_tolls || self.search.as_ref().is_some_and(|s| s.avoid_tolls)
    }

    /// # Errors
    ///
    /// Returns [`CoreError::MissingCoordinates`] when fewer than two
    /// waypoints are known.
    pub fn directions_url(&self) -> Result<String, CoreError> {
        let points: Vec<GeoPoint> = self.waypoints.iter().map(|w| w.position).collect();
        google_maps_directions_url(&points)
            .map_err(|_| CoreError::MissingCoordinates(self.id.clone()))
    }

    #[must_use]
    pub fn distance_label(&self) -> String {
        self.distance_km
            .map_or_else(|| UNKNOWN.to_string(), |km| format!("{km} km"))
    }

    #[must_use]
    pub fn time_label(&self) -> String {
        self.time_minutes
            .map_or_else(|| UNKNOWN.to_string(), |min| format!("{min} min"))
    }

    #[must_use]
    pub fn tolls_label(&self) -> String {
        match self.toll_cost {
            None => UNKNOWN.to_string(),
            Some(0) => "Sin peajes".to_string(),
            Some(cost) => format!("${cost}"),
        }
    }
}

fn endpoint_label(waypoint: &RouteWaypoint) -> String {
    if waypoint.description.trim().is_empty() {
        format!("Coord: {}", waypoint.position.short())
    } else {
        waypoint.description.clone()
    }
}

/// Numeric route metrics that may be unknown.
///
/// Serialized as a JSON number or `"N/A"`. Deserialization also accepts
/// numeric strings and unit-suffixed text such as `"360 min"`.
mod unknown {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::UNKNOWN;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Number(f64),
        Text(String),
    }

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(value: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(n) => serializer.serialize_u32(*n),
            None => serializer.serialize_str(UNKNOWN),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
        Ok(match Option::<Loose>::deserialize(deserializer)? {
            None => None,
            Some(Loose::Number(n)) => from_f64(n),
            Some(Loose::Text(text)) => parse_leading_number(&text),
        })
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn from_f64(n: f64) -> Option<u32> {
        if n.is_finite() && n >= 0.0 && n <= f64::from(u32::MAX) {
            Some(n.round() as u32)
        } else {
            None
        }
    }

    fn parse_leading_number(text: &str) -> Option<u32> {
        let digits: String = text
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        digits.parse::<f64>().ok().and_then(from_f64)
    }
}

#[cfg(test)]
#[path = "route_test.rs"]
mod tests;
