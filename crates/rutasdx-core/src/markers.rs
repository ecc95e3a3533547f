use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::GeoPoint;
use crate::store::{keys, KvStore, Persisted};
use crate::CoreError;

/// A built-in truck facility shown on every map.
#[derive(Debug, Clone, PartialEq)]
pub struct PointOfInterest {
    pub position: GeoPoint,
    pub name: &'static str,
    pub description: &'static str,
}

const POINTS_OF_INTEREST: [(f64, f64, &str, &str); 5] = [
    (
        19.4326,
        -99.1332,
        "Central de Abasto CDMX",
        "Zona de carga y descarga para camiones",
    ),
    (
        20.6597,
        -103.3496,
        "Central de Carga Guadalajara",
        "Estacionamiento y servicios para transportistas",
    ),
    (
        25.6866,
        -100.3161,
        "Terminal de Carga Monterrey",
        "Área de descanso y servicios",
    ),
    (
        19.1738,
        -96.1342,
        "Puerto de Veracruz",
        "Terminal de contenedores y carga",
    ),
    (
        22.1565,
        -100.9855,
        "Parador San Luis Potosí",
        "Estacionamiento seguro, restaurante y duchas",
    ),
];

/// A user-reported accident or road hazard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardMarker {
    pub id: String,
    #[serde(flatten)]
    pub position: GeoPoint,
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// A user-added place to rest or eat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafePlaceMarker {
    pub id: String,
    #[serde(flatten)]
    pub position: GeoPoint,
    pub name: String,
    pub description: String,
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafePlaceDetails {
    pub name: String,
    pub description: String,
}

impl SafePlaceDetails {
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Both fields are required and must contain more than whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] naming the first blank field.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation(
                "El nombre del lugar es obligatorio.".to_string(),
            ));
        }
        if self.description.trim().is_empty() {
            return Err(CoreError::Validation(
                "La descripción del lugar es obligatoria.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Static points of interest plus the two user-maintained marker
/// collections. User markers are append-only; the only way to remove them
/// is [`MarkerRegistry::clear`].
#[derive(Debug)]
pub struct MarkerRegistry {
    points_of_interest: Vec<PointOfInterest>,
    hazards: Persisted<Vec<HazardMarker>>,
    safe_places: Persisted<Vec<SafePlaceMarker>>,
}

impl MarkerRegistry {
    #[must_use]
    pub fn load(store: &KvStore) -> Self {
        let points_of_interest = POINTS_OF_INTEREST
            .iter()
            .filter_map(|&(lat, lng, name, description)| {
                GeoPoint::new(lat, lng).ok().map(|position| PointOfInterest {
                    position,
                    name,
                    description,
                })
            })
            .collect();

        Self {
            points_of_interest,
            hazards: Persisted::load_list(store, keys::HAZARD_MARKERS),
            safe_places: Persisted::load_list(store, keys::SAFE_PLACE_MARKERS),
        }
    }

    #[must_use]
    pub fn points_of_interest(&self) -> &[PointOfInterest] {
        &self.points_of_interest
    }

    #[must_use]
    pub fn hazards(&self) -> &[HazardMarker] {
        self.hazards.get()
    }

    #[must_use]
    pub fn safe_places(&self) -> &[SafePlaceMarker] {
        self.safe_places.get()
    }

    pub fn add_hazard(&mut self, store: &mut KvStore, position: GeoPoint) -> HazardMarker {
        let marker = HazardMarker {
            id: format!("acc-{}", Uuid::new_v4().simple()),
            position,
            created_at: Utc::now(),
        };
        tracing::debug!(id = %marker.id, position = %marker.position, "hazard reported");
        self.hazards.update(store, |list| list.push(marker.clone()));
        marker
    }

    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] when name or description is blank;
    /// nothing is stored in that case.
    pub fn add_safe_place(
        &mut self,
        store: &mut KvStore,
        position: GeoPoint,
        details: SafePlaceDetails,
    ) -> Result<SafePlaceMarker, CoreError> {
        details.validate()?;
        let marker = SafePlaceMarker {
            id: format!("sp-{}", Uuid::new_v4().simple()),
            position,
            name: details.name.trim().to_string(),
            description: details.description.trim().to_string(),
            created_at: Utc::now(),
        };
        tracing::debug!(id = %marker.id, name = %marker.name, "safe place added");
        self.safe_places.update(store, |list| list.push(marker.clone()));
        Ok(marker)
    }

    /// Wipe both user collections, returning how many markers were removed.
    pub fn clear(&mut self, store: &mut KvStore) -> usize {
        let hazards = self.hazards.update(store, |list| std::mem::take(list).len());
        let safe_places = self.safe_places.update(store, |list| std::mem::take(list).len());
        hazards + safe_places
    }
}

#[cfg(test)]
mod tests {
    use crate::store::{MemoryBackend, StorageBackend};

    use super::*;

    fn point(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    #[test]
    fn points_of_interest_are_builtin() {
        let store = KvStore::new(MemoryBackend::new());
        let registry = MarkerRegistry::load(&store);
        assert_eq!(registry.points_of_interest().len(), 5);
        assert_eq!(registry.points_of_interest()[0].name, "Central de Abasto CDMX");
        assert!(registry.hazards().is_empty());
        assert!(registry.safe_places().is_empty());
    }

    #[test]
    fn hazards_append_and_persist() {
        let medium = MemoryBackend::new();
        let mut store = KvStore::new(medium.clone());
        let mut registry = MarkerRegistry::load(&store);

        let first = registry.add_hazard(&mut store, point(19.5, -99.2));
        let second = registry.add_hazard(&mut store, point(19.6, -99.3));
        assert_ne!(first.id, second.id);
        assert!(first.id.starts_with("acc-"));
        assert_eq!(registry.hazards().len(), 2);

        let reopened = MarkerRegistry::load(&KvStore::new(medium));
        assert_eq!(reopened.hazards().len(), 2);
        assert_eq!(reopened.hazards()[0].position, point(19.5, -99.2));
        assert_eq!(
            reopened.hazards()[0].created_at.timestamp_millis(),
            first.created_at.timestamp_millis()
        );
    }

    #[test]
    fn safe_place_requires_name_and_description() {
        let mut store = KvStore::new(MemoryBackend::new());
        let mut registry = MarkerRegistry::load(&store);
        let result = registry.add_safe_place(
            &mut store,
            point(20.0, -100.0),
            SafePlaceDetails::new("  ", "Baños limpios"),
        );
        assert!(matches!(result, Err(CoreError::Validation(_))));
        assert!(registry.safe_places().is_empty());
    }

    #[test]
    fn safe_place_is_stored_with_details() {
        let mut store = KvStore::new(MemoryBackend::new());
        let mut registry = MarkerRegistry::load(&store);
        let marker = registry
            .add_safe_place(
                &mut store,
                point(20.0, -100.0),
                SafePlaceDetails::new("Parador La Curva", "Comida casera"),
            )
            .unwrap();
        assert!(marker.id.starts_with("sp-"));
        assert_eq!(registry.safe_places(), &[marker]);
    }

    #[test]
    fn persisted_layout_uses_flat_coordinates_and_millis() {
        let medium = MemoryBackend::new();
        let mut store = KvStore::new(medium.clone());
        let mut registry = MarkerRegistry::load(&store);
        registry.add_hazard(&mut store, point(19.5, -99.2));

        let raw = medium.get_item(keys::HAZARD_MARKERS).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json[0]["lat"], 19.5);
        assert_eq!(json[0]["lng"], -99.2);
        assert!(json[0]["timestamp"].is_i64());
    }

    #[test]
    fn legacy_stored_markers_load() {
        let medium = MemoryBackend::new();
        medium
            .insert_raw(
                keys::SAFE_PLACE_MARKERS,
                r#"[{"id":"sp-1700000000000","lat":22.1,"lng":-100.9,"name":"Parador","description":"Duchas","timestamp":1700000000000}]"#,
            )
            .unwrap();
        let registry = MarkerRegistry::load(&KvStore::new(medium));
        assert_eq!(registry.safe_places().len(), 1);
        assert_eq!(registry.safe_places()[0].name, "Parador");
        assert_eq!(registry.safe_places()[0].created_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn invalid_stored_marker_does_not_take_siblings_with_it() {
        let medium = MemoryBackend::new();
        medium
            .insert_raw(
                keys::HAZARD_MARKERS,
                r#"[{"id":"acc-1","lat":19.5,"lng":-99.2,"timestamp":1700000000000},{"id":"acc-2","lat":19.5,"lng":-459.3,"timestamp":1700000000001}]"#,
            )
            .unwrap();
        let mut store = KvStore::new(medium.clone());
        let mut registry = MarkerRegistry::load(&store);
        assert_eq!(registry.hazards().len(), 1);
        assert_eq!(registry.hazards()[0].id, "acc-1");

        registry.add_hazard(&mut store, point(20.0, -100.0));

        let reopened = MarkerRegistry::load(&KvStore::new(medium));
        let ids: Vec<&str> = reopened.hazards().iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], "acc-1");
        assert!(ids[1].starts_with("acc-"));
    }

    #[test]
    fn clear_removes_user_markers_only() {
        let medium = MemoryBackend::new();
        let mut store = KvStore::new(medium.clone());
        let mut registry = MarkerRegistry::load(&store);
        registry.add_hazard(&mut store, point(19.5, -99.2));
        registry
            .add_safe_place(
                &mut store,
                point(20.0, -100.0),
                SafePlaceDetails::new("A", "B"),
            )
            .unwrap();

        assert_eq!(registry.clear(&mut store), 2);
        assert!(registry.hazards().is_empty());
        assert_eq!(registry.points_of_interest().len(), 5);

        let reopened = MarkerRegistry::load(&KvStore::new(medium));
        assert!(reopened.safe_places().is_empty());
    }
}
