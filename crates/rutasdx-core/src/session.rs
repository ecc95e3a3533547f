//! The map page: one session ties the interaction modes, the marker
//! collections, the saved routes and the route catalog together.
//!
//! All user input arrives as an [`Intent`]. Every handler either commits a
//! complete state change or reports the failure through the notifier and
//! leaves the previous state in place.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::catalog::RouteCatalog;
use crate::geo::{Camera, GeoPoint, LOCATED_ZOOM, ROUTE_ZOOM};
use crate::links::google_maps_directions_url;
use crate::markers::{MarkerRegistry, SafePlaceDetails};
use crate::mode::{ClickOutcome, InteractionMode, ModeError, ModeMachine};
use crate::route::{Route, TaggedWaypoint, WaypointRole};
use crate::saved::{SaveOutcome, SavedRoutes};
use crate::store::KvStore;
use crate::surface::{
    locate_with_timeout, Geolocator, LinkOpener, LocateError, MapMarker, MapScene, MapSurface,
    MarkerKind, Notification, Notifier,
};
use crate::CoreError;

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    ToggleMode(InteractionMode),
    MapClick(GeoPoint),
    ConfirmSafePlace(SafePlaceDetails),
    /// `None` or blank text falls back to `Punto N`.
    ConfirmWaypoint(Option<String>),
    DismissDialog,
    SaveCustomRoute,
    CancelCustomRoute,
    OpenCustomRouteExternally,
    SelectRandomRoute,
    SelectRoute(String),
    ClearSelection,
    OpenSelectedRouteExternally,
}

/// Which side panel the page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Info,
    SelectedRoute,
    PointToPoint { points: usize, can_save: bool },
}

/// Proof that a geolocation request was started. At most one exists per
/// session at a time.
#[derive(Debug)]
#[must_use = "pass the ticket to MapSession::finish_locate"]
pub struct LocateTicket {
    _private: (),
}

pub struct MapSession {
    store: KvStore,
    catalog: Arc<RouteCatalog>,
    markers: MarkerRegistry,
    modes: ModeMachine,
    saved: SavedRoutes,
    selected: Option<Route>,
    camera: Camera,
    view_changed: bool,
    default_center: GeoPoint,
    current_position: Option<GeoPoint>,
    locating: bool,
    rng: StdRng,
}

impl std::fmt::Debug for MapSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapSession")
            .field("mode", &self.modes.mode())
            .field("selected", &self.selected.as_ref().map(|r| &r.id))
            .field("camera", &self.camera)
            .field("locating", &self.locating)
            .finish_non_exhaustive()
    }
}

impl MapSession {
    /// Open a session, loading user markers and saved routes from `store`.
    /// The camera starts on `default_center` at overview zoom.
    pub fn new(store: KvStore, catalog: Arc<RouteCatalog>, default_center: GeoPoint) -> Self {
        let markers = MarkerRegistry::load(&store);
        let saved = SavedRoutes::load(&store);
        Self {
            store,
            catalog,
            markers,
            modes: ModeMachine::new(),
            saved,
            selected: None,
            camera: Camera::overview(default_center),
            view_changed: true,
            default_center,
            current_position: None,
            locating: false,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Seed the random route picker.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        self.modes.mode()
    }

    #[must_use]
    pub fn modes(&self) -> &ModeMachine {
        &self.modes
    }

    #[must_use]
    pub fn markers(&self) -> &MarkerRegistry {
        &self.markers
    }

    #[must_use]
    pub fn saved_routes(&self) -> &SavedRoutes {
        &self.saved
    }

    #[must_use]
    pub fn selected_route(&self) -> Option<&Route> {
        self.selected.as_ref()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    #[must_use]
    pub fn current_position(&self) -> Option<GeoPoint> {
        self.current_position
    }

    #[must_use]
    pub fn is_locating(&self) -> bool {
        self.locating
    }

    /// Apply one user intent.
    ///
    /// # Errors
    ///
    /// Returns the `CoreError` that was also reported through `notifier`.
    /// State is unchanged whenever an error is returned.
    pub fn dispatch(
        &mut self,
        intent: Intent,
        notifier: &dyn Notifier,
        opener: &dyn LinkOpener,
    ) -> Result<(), CoreError> {
        tracing::debug!(?intent, mode = ?self.modes.mode(), "dispatching intent");
        match intent {
            Intent::ToggleMode(mode) => {
                self.toggle_mode(mode, notifier);
                Ok(())
            }
            Intent::MapClick(point) => {
                self.map_click(point, notifier);
                Ok(())
            }
            Intent::ConfirmSafePlace(details) => self.confirm_safe_place(details, notifier),
            Intent::ConfirmWaypoint(description) => {
                self.confirm_waypoint(description.as_deref(), notifier)
            }
            Intent::DismissDialog => {
                self.modes.dismiss_dialog();
                Ok(())
            }
            Intent::SaveCustomRoute => self.save_custom_route(notifier),
            Intent::CancelCustomRoute => {
                self.modes.cancel();
                notifier.notify(Notification::info("Creación de Ruta Cancelada"));
                Ok(())
            }
            Intent::OpenCustomRouteExternally => {
                let points: Vec<GeoPoint> =
                    self.modes.pending().iter().map(|w| w.position).collect();
                match google_maps_directions_url(&points) {
                    Ok(url) => {
                        opener.open(&url);
                        Ok(())
                    }
                    Err(e) => fail(
                        notifier,
                        Notification::error("Error")
                            .with_description("Se necesitan al menos origen y destino."),
                        e,
                    ),
                }
            }
            Intent::SelectRandomRoute => {
                let Some(route) = self.catalog.random_route(&mut self.rng).cloned() else {
                    return fail(
                        notifier,
                        Notification::error("Sin rutas")
                            .with_description("El catálogo de rutas está vacío."),
                        CoreError::NotFound("catalog".to_string()),
                    );
                };
                self.select_route(route, notifier);
                Ok(())
            }
            Intent::SelectRoute(id) => {
                let found = self
                    .catalog
                    .find(&id)
                    .or_else(|| self.saved.get(&id))
                    .cloned();
                match found {
                    Some(route) => {
                        self.select_route(route, notifier);
                        Ok(())
                    }
                    None => fail(
                        notifier,
                        Notification::error("Ruta no encontrada")
                            .with_description(format!("No existe la ruta \"{id}\".")),
                        CoreError::NotFound(id),
                    ),
                }
            }
            Intent::ClearSelection => {
                self.selected = None;
                Ok(())
            }
            Intent::OpenSelectedRouteExternally => {
                let url = match &self.selected {
                    Some(route) => route.directions_url(),
                    None => Err(CoreError::NotFound("selection".to_string())),
                };
                match url {
                    Ok(url) => {
                        opener.open(&url);
                        Ok(())
                    }
                    Err(e) => fail(
                        notifier,
                        Notification::error("Error").with_description("Coordenadas no disponibles."),
                        e,
                    ),
                }
            }
        }
    }

    fn toggle_mode(&mut self, target: InteractionMode, notifier: &dyn Notifier) {
        let change = self.modes.toggle(target);
        if change.activated() {
            let mut n = Notification::info(format!("Modo {} Activado", change.to.title()));
            if let Some(hint) = change.to.hint() {
                n = n.with_description(hint);
            }
            notifier.notify(n);
        } else {
            notifier.notify(Notification::info(format!(
                "Modo {} Desactivado",
                change.from.title()
            )));
        }
    }

    fn map_click(&mut self, point: GeoPoint, notifier: &dyn Notifier) {
        if let ClickOutcome::HazardPlaced(at) = self.modes.on_map_click(point) {
            self.markers.add_hazard(&mut self.store, at);
            notifier.notify(
                Notification::info("Accidente reportado")
                    .with_description("Gracias por reportar el incidente."),
            );
        }
    }

    fn confirm_safe_place(
        &mut self,
        details: SafePlaceDetails,
        notifier: &dyn Notifier,
    ) -> Result<(), CoreError> {
        let (point, details) = match self.modes.confirm_safe_place(details) {
            Ok(confirmed) => confirmed,
            Err(e) => return fail(notifier, invalid_input(&e), mode_error(e)),
        };
        let marker = self
            .markers
            .add_safe_place(&mut self.store, point, details)?;
        notifier.notify(
            Notification::info("Lugar Seguro Añadido")
                .with_description(format!("Se ha añadido \"{}\" al mapa.", marker.name)),
        );
        Ok(())
    }

    fn confirm_waypoint(
        &mut self,
        description: Option<&str>,
        notifier: &dyn Notifier,
    ) -> Result<(), CoreError> {
        if let Err(e) = self.modes.confirm_waypoint(description) {
            return fail(notifier, invalid_input(&e), mode_error(e));
        }
        let added = self.modes.pending().len();
        let point_type = if added == 1 {
            "Origen".to_string()
        } else {
            format!("Punto {added}")
        };
        notifier.notify(
            Notification::info(format!("{point_type} añadido"))
                .with_description("Puedes añadir más puntos o finalizar la ruta."),
        );
        Ok(())
    }

    fn save_custom_route(&mut self, notifier: &dyn Notifier) -> Result<(), CoreError> {
        let route = match self.modes.save() {
            Ok(route) => route,
            Err(e) => {
                return fail(
                    notifier,
                    Notification::error("Error al guardar")
                        .with_description("Necesitas al menos un origen y un destino."),
                    mode_error(e),
                )
            }
        };
        let points = route.waypoints.len();
        if self.saved.save(&mut self.store, route) == SaveOutcome::Saved {
            notifier.notify(
                Notification::info("Ruta Personalizada Guardada")
                    .with_description(format!("La ruta con {points} puntos ha sido guardada.")),
            );
        }
        Ok(())
    }

    /// Show `route` in the selected-route panel and move the camera to its
    /// first point.
    pub fn select_route(&mut self, route: Route, notifier: &dyn Notifier) {
        if let Some(start) = route.waypoints.first() {
            self.set_camera(Camera::new(start.position, ROUTE_ZOOM));
        }
        notifier.notify(
            Notification::info("Ruta seleccionada")
                .with_description(format!("{} a {}", route.origin, route.destination)),
        );
        tracing::debug!(id = %route.id, "route selected");
        self.selected = Some(route);
    }

    /// Wipe user hazards and safe places, returning how many were removed.
    pub fn clear_markers(&mut self) -> usize {
        self.markers.clear(&mut self.store)
    }

    /// Start a geolocation request. Returns `None`, and does nothing, while
    /// another request is still outstanding.
    pub fn begin_locate(&mut self) -> Option<LocateTicket> {
        if self.locating {
            tracing::debug!("locate request ignored; one is already pending");
            return None;
        }
        self.locating = true;
        Some(LocateTicket { _private: () })
    }

    /// Apply the outcome of the request `ticket` stands for. Success centres
    /// the camera on the device; failure falls back to the default centre
    /// when the device has never been located.
    pub fn finish_locate(
        &mut self,
        ticket: LocateTicket,
        result: Result<GeoPoint, LocateError>,
        notifier: &dyn Notifier,
    ) {
        let LocateTicket { _private: () } = ticket;
        self.locating = false;

        match result {
            Ok(position) => {
                self.current_position = Some(position);
                self.set_camera(Camera::new(position, LOCATED_ZOOM));
                tracing::info!(%position, "device located");
                notifier.notify(
                    Notification::info("Ubicación encontrada")
                        .with_description("Mapa centrado en tu ubicación."),
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "geolocation failed");
                if self.current_position.is_none() {
                    self.set_camera(Camera::overview(self.default_center));
                }
                notifier.notify(Notification::error("Error de ubicación").with_description(e.to_string()));
            }
        }
    }

    /// Run one bounded geolocation request to completion. Returns `false`
    /// without asking the device when a request is already pending.
    pub async fn locate<G: Geolocator + ?Sized>(
        &mut self,
        geolocator: &G,
        timeout: Duration,
        notifier: &dyn Notifier,
    ) -> bool {
        let Some(ticket) = self.begin_locate() else {
            return false;
        };
        let result = locate_with_timeout(geolocator, timeout).await;
        self.finish_locate(ticket, result, notifier);
        true
    }

    fn set_camera(&mut self, camera: Camera) {
        if self.camera != camera {
            self.camera = camera;
            self.view_changed = true;
        }
    }

    /// Everything currently drawn on the map.
    #[must_use]
    pub fn scene(&self) -> MapScene {
        let mut markers: Vec<MapMarker> = self
            .markers
            .points_of_interest()
            .iter()
            .map(|poi| MapMarker {
                position: poi.position,
                kind: MarkerKind::PointOfInterest,
                label: format!("{}: {}", poi.name, poi.description),
            })
            .collect();

        markers.extend(self.markers.hazards().iter().map(|h| MapMarker {
            position: h.position,
            kind: MarkerKind::Hazard,
            label: format!("Accidente reportado {}", h.created_at.format("%Y-%m-%d %H:%M")),
        }));
        markers.extend(self.markers.safe_places().iter().map(|s| MapMarker {
            position: s.position,
            kind: MarkerKind::SafePlace,
            label: format!("{}: {}", s.name, s.description),
        }));

        if let Some(position) = self.current_position {
            markers.push(MapMarker {
                position,
                kind: MarkerKind::CurrentLocation,
                label: "Tu ubicación".to_string(),
            });
        }

        if self.modes.mode() == InteractionMode::BuildingRoute {
            markers.extend(self.modes.tagged_pending().iter().map(route_marker));
        } else if let Some(route) = &self.selected {
            markers.extend(route.tagged_waypoints().iter().map(route_marker));
        }

        MapScene {
            camera: self.camera,
            markers,
            accepts_clicks: self.modes.mode().accepts_clicks(),
        }
    }

    #[must_use]
    pub fn panel(&self) -> Panel {
        if self.modes.mode() == InteractionMode::BuildingRoute {
            Panel::PointToPoint {
                points: self.modes.pending().len(),
                can_save: self.modes.can_save(),
            }
        } else if self.selected.is_some() {
            Panel::SelectedRoute
        } else {
            Panel::Info
        }
    }

    /// Push the current scene to `surface`, moving its view first if the
    /// camera changed since the last render.
    pub fn render(&mut self, surface: &mut dyn MapSurface) {
        if self.view_changed {
            surface.set_view(self.camera);
            self.view_changed = false;
        }
        surface.render(&self.scene());
    }
}

fn route_marker(tagged: &TaggedWaypoint<'_>) -> MapMarker {
    let kind = match tagged.role {
        WaypointRole::Origin => MarkerKind::RouteOrigin,
        WaypointRole::Via { .. } => MarkerKind::RouteVia,
        WaypointRole::Destination => MarkerKind::RouteDestination,
    };
    MapMarker {
        position: tagged.waypoint.position,
        kind,
        label: format!("{}: {}", tagged.role.label(), tagged.waypoint.description),
    }
}

fn invalid_input(e: &ModeError) -> Notification {
    match e {
        ModeError::InvalidDetails(message) => {
            Notification::error("Campos requeridos").with_description(message.clone())
        }
        other => Notification::error("Error").with_description(other.to_string()),
    }
}

fn mode_error(e: ModeError) -> CoreError {
    CoreError::Validation(e.to_string())
}

fn fail(notifier: &dyn Notifier, notification: Notification, error: CoreError) -> Result<(), CoreError> {
    tracing::debug!(error = %error, "intent rejected");
    notifier.notify(notification);
    Err(error)
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
