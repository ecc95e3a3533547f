//! Built-in route catalog and the search filter over it.
//!
//! The catalog stands in for a routing backend: a fixed list of corridors
//! loaded once at startup and filtered in memory.

use std::collections::HashSet;
use std::path::Path;

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::route::{Route, RouteRecord};
use crate::{ConfigError, CoreError};

const BUILTIN_CATALOG: &str = include_str!("catalog.yaml");

/// Detour factor applied to distance when synthesizing a toll-free variant.
const TOLL_FREE_DISTANCE_FACTOR: f64 = 1.15;
/// Slowdown factor applied to travel time for a toll-free variant.
const TOLL_FREE_TIME_FACTOR: f64 = 1.2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TruckClass {
    #[default]
    Standard,
    Medium,
    Heavy,
    ExtraHeavy,
}

impl TruckClass {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            TruckClass::Standard => "Estándar (Hasta 3.5 ton)",
            TruckClass::Medium => "Mediano (3.5 - 10 ton)",
            TruckClass::Heavy => "Pesado (10 - 30 ton)",
            TruckClass::ExtraHeavy => "Extra pesado (30+ ton)",
        }
    }
}

/// Search form input. Descriptions are free text carried through to the
/// result cards; truck class and hazardous cargo do not affect matching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub origin_desc: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub destination_desc: String,
    #[serde(default, rename = "truckType")]
    pub truck_class: TruckClass,
    #[serde(default, rename = "isHazardous")]
    pub hazardous_cargo: bool,
    #[serde(default)]
    pub avoid_tolls: bool,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    routes: Vec<RouteRecord>,
}

#[derive(Debug, Clone)]
pub struct RouteCatalog {
    routes: Vec<Route>,
}

impl RouteCatalog {
    /// The catalog compiled into the crate.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Catalog`] only if the embedded document is
    /// malformed, which the test suite guards against.
    pub fn builtin() -> Result<Self, CoreError> {
        Self::from_yaml_str(BUILTIN_CATALOG).map_err(|e| CoreError::Catalog(e.to_string()))
    }

    /// Parse and validate a catalog document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the YAML does not parse or fails validation.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile = serde_yaml::from_str(content)?;
        validate_records(&file.routes)?;

        let routes = file
            .routes
            .into_iter()
            .map(|record| {
                let id = record.id.clone();
                Route::from_record(record)
                    .map_err(|e| ConfigError::Validation(format!("route '{id}': {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { routes })
    }

    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.id == id)
    }

    pub fn random_route<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Route> {
        self.routes.choose(rng)
    }

    /// Simulated route search.
    ///
    /// Origin and destination match case-insensitively as substrings of the
    /// raw text; empty text matches everything. With `avoid_tolls` only
    /// toll-free or unknown-toll routes are kept, and when that leaves
    /// nothing but the text matched something, a single toll-free variant
    /// of the first match is appended. Output keeps catalog order.
    #[must_use]
    pub fn filter(&self, params: &SearchParams) -> Vec<Route> {
        let origin = params.origin.to_lowercase();
        let destination = params.destination.to_lowercase();

        let matches: Vec<&Route> = self
            .routes
            .iter()
            .filter(|r| contains_folded(&r.origin, &origin))
            .filter(|r| contains_folded(&r.destination, &destination))
            .collect();

        let mut results: Vec<Route> = if params.avoid_tolls {
            let toll_free: Vec<Route> = matches
                .iter()
                .filter(|r| matches!(r.toll_cost, None | Some(0)))
                .map(|r| (*r).clone())
                .collect();
            if toll_free.is_empty() {
                matches.first().map(|r| toll_free_variant(r)).into_iter().collect()
            } else {
                toll_free
            }
        } else {
            matches.into_iter().cloned().collect()
        };

        for route in &mut results {
            route.avoid_tolls = params.avoid_tolls;
            route.search = Some(params.clone());
        }

        results
    }
}

/// Load and validate a catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<RouteCatalog, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let catalog = RouteCatalog::from_yaml_str(&content)?;
    tracing::info!(path = %path.display(), routes = catalog.routes.len(), "loaded route catalog");
    Ok(catalog)
}

fn validate_records(records: &[RouteRecord]) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for record in records {
        if record.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "route id must be non-empty".to_string(),
            ));
        }
        if record.origin.trim().is_empty() || record.destination.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "route '{}' must have origin and destination labels",
                record.id
            )));
        }
        if !seen_ids.insert(record.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate route id: '{}'",
                record.id
            )));
        }
    }

    Ok(())
}

fn contains_folded(label: &str, needle_lower: &str) -> bool {
    needle_lower.is_empty() || label.to_lowercase().contains(needle_lower)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale(value: u32, factor: f64) -> u32 {
    (f64::from(value) * factor).round() as u32
}

fn toll_free_variant(route: &Route) -> Route {
    let restrictions = format!(
        "{} (Ruta sin peajes)",
        route.restrictions.as_deref().unwrap_or("")
    )
    .trim()
    .to_string();

    Route {
        id: format!("{}-noToll", route.id),
        toll_cost: Some(0),
        distance_km: route.distance_km.map(|d| scale(d, TOLL_FREE_DISTANCE_FACTOR)),
        time_minutes: route.time_minutes.map(|t| scale(t, TOLL_FREE_TIME_FACTOR)),
        restrictions: Some(restrictions),
        avoid_tolls: true,
        ..route.clone()
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
