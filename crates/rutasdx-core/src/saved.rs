//! Routes the user chose to keep, persisted under one store key.

use crate::route::Route;
use crate::store::{keys, KvStore, Persisted};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// A route with the same id was already saved; nothing changed.
    AlreadySaved,
}

#[derive(Debug)]
pub struct SavedRoutes {
    routes: Persisted<Vec<Route>>,
}

impl SavedRoutes {
    /// Stored records written by older versions (separate start/end
    /// coordinates, numeric strings, missing flags) are normalized here.
    /// A record that cannot be read is dropped without losing the rest.
    #[must_use]
    pub fn load(store: &KvStore) -> Self {
        let routes = Persisted::load_list(store, keys::SAVED_ROUTES);
        tracing::debug!(count = routes.get().len(), "loaded saved routes");
        Self { routes }
    }

    /// Saved routes in the order they were saved.
    #[must_use]
    pub fn list(&self) -> &[Route] {
        self.routes.get()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Route> {
        self.routes.get().iter().find(|r| r.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn save(&mut self, store: &mut KvStore, route: Route) -> SaveOutcome {
        if self.contains(&route.id) {
            tracing::debug!(id = %route.id, "route already saved");
            return SaveOutcome::AlreadySaved;
        }
        tracing::info!(id = %route.id, custom = route.is_custom, "route saved");
        self.routes.update(store, |list| list.push(route));
        SaveOutcome::Saved
    }

    /// Remove one route by id, returning it if it was saved.
    pub fn delete(&mut self, store: &mut KvStore, id: &str) -> Option<Route> {
        let index = self.routes.get().iter().position(|r| r.id == id)?;
        let removed = self.routes.update(store, |list| list.remove(index));
        tracing::info!(id, "saved route deleted");
        Some(removed)
    }

    /// Remove every saved route, returning how many there were.
    pub fn clear(&mut self, store: &mut KvStore) -> usize {
        let removed = self.routes.update(store, |list| std::mem::take(list).len());
        tracing::info!(removed, "saved routes cleared");
        removed
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::RouteCatalog;
    use crate::store::{MemoryBackend, UnavailableBackend};

    use super::*;

    fn catalog_route(id: &str) -> Route {
        RouteCatalog::builtin().unwrap().find(id).unwrap().clone()
    }

    #[test]
    fn save_dedupes_by_id() {
        let mut store = KvStore::new(MemoryBackend::new());
        let mut saved = SavedRoutes::load(&store);

        assert_eq!(saved.save(&mut store, catalog_route("cdmx-gdl")), SaveOutcome::Saved);
        assert_eq!(
            saved.save(&mut store, catalog_route("cdmx-gdl")),
            SaveOutcome::AlreadySaved
        );
        assert_eq!(saved.save(&mut store, catalog_route("pue-oax")), SaveOutcome::Saved);

        let ids: Vec<&str> = saved.list().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["cdmx-gdl", "pue-oax"]);
    }

    #[test]
    fn saved_routes_survive_reload() {
        let medium = MemoryBackend::new();
        let mut store = KvStore::new(medium.clone());
        let mut saved = SavedRoutes::load(&store);
        saved.save(&mut store, catalog_route("slp-qro"));

        let reopened = SavedRoutes::load(&KvStore::new(medium));
        assert_eq!(reopened.list(), &[catalog_route("slp-qro")]);
    }

    #[test]
    fn delete_removes_only_the_named_route() {
        let mut store = KvStore::new(MemoryBackend::new());
        let mut saved = SavedRoutes::load(&store);
        saved.save(&mut store, catalog_route("cdmx-gdl"));
        saved.save(&mut store, catalog_route("mty-ver"));

        let removed = saved.delete(&mut store, "cdmx-gdl").unwrap();
        assert_eq!(removed.id, "cdmx-gdl");
        assert!(!saved.contains("cdmx-gdl"));
        assert!(saved.contains("mty-ver"));
        assert!(saved.delete(&mut store, "cdmx-gdl").is_none());
    }

    #[test]
    fn clear_reports_count() {
        let mut store = KvStore::new(MemoryBackend::new());
        let mut saved = SavedRoutes::load(&store);
        saved.save(&mut store, catalog_route("cdmx-gdl"));
        saved.save(&mut store, catalog_route("mty-ver"));
        assert_eq!(saved.clear(&mut store), 2);
        assert!(saved.list().is_empty());
        assert_eq!(saved.clear(&mut store), 0);
    }

    #[test]
    fn legacy_records_are_normalized() {
        let medium = MemoryBackend::new();
        medium
            .insert_raw(
                keys::SAVED_ROUTES,
                r#"[{"id":"cdmx-gdl","origin":"Ciudad de México","destination":"Guadalajara","distance":535,"time":"360","tolls":950,"restrictions":null,"startCoords":[19.4326,-99.1332],"endCoords":[20.6597,-103.3496]}]"#,
            )
            .unwrap();

        let saved = SavedRoutes::load(&KvStore::new(medium));
        let route = saved.get("cdmx-gdl").unwrap();
        assert_eq!(route.waypoints.len(), 2);
        assert_eq!(route.time_minutes, Some(360));
        assert!(!route.is_custom);
    }

    #[test]
    fn unreadable_record_is_dropped_and_siblings_are_kept() {
        let medium = MemoryBackend::new();
        medium
            .insert_raw(
                keys::SAVED_ROUTES,
                r#"[{"id":"broken","origin":"A","destination":"B","waypoints":[{"lat":95.0,"lng":0.0,"description":"x"}]},{"id":"cdmx-gdl","origin":"Ciudad de México","destination":"Guadalajara","startCoords":[19.4326,-99.1332],"endCoords":[20.6597,-103.3496]}]"#,
            )
            .unwrap();
        let mut store = KvStore::new(medium.clone());
        let mut saved = SavedRoutes::load(&store);
        assert!(saved.contains("cdmx-gdl"));
        assert!(!saved.contains("broken"));

        saved.save(&mut store, catalog_route("pue-oax"));
        let reopened = SavedRoutes::load(&KvStore::new(medium));
        let ids: Vec<&str> = reopened.list().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["cdmx-gdl", "pue-oax"]);
    }

    #[test]
    fn corrupt_collection_loads_empty() {
        let medium = MemoryBackend::new();
        medium.insert_raw(keys::SAVED_ROUTES, "{not json").unwrap();
        assert!(SavedRoutes::load(&KvStore::new(medium)).list().is_empty());
    }

    #[test]
    fn unavailable_storage_still_tracks_session_state() {
        let mut store = KvStore::new(UnavailableBackend);
        let mut saved = SavedRoutes::load(&store);
        assert_eq!(saved.save(&mut store, catalog_route("cun-mid")), SaveOutcome::Saved);
        assert!(saved.contains("cun-mid"));
    }
}
