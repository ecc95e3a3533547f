//! Terminal stand-ins for the page's collaborators.

use rutasdx_core::{
    Camera, GeoPoint, Geolocator, LinkOpener, LocateError, MapScene, MapSurface, MarkerKind,
    Notification, Notifier, Route, Severity,
};

/// Prints toasts inline with the command output.
pub(crate) struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        let marker = match notification.severity {
            Severity::Info => "*",
            Severity::Destructive => "!",
        };
        match notification.description {
            Some(description) => println!("[{marker}] {}: {description}", notification.title),
            None => println!("[{marker}] {}", notification.title),
        }
    }
}

/// There is no browser to hand the link to; print it for the user.
pub(crate) struct PrintLinkOpener;

impl LinkOpener for PrintLinkOpener {
    fn open(&self, url: &str) {
        tracing::debug!(url, "opening external link");
        println!("Abrir: {url}");
    }
}

#[derive(Default)]
pub(crate) struct TerminalMap;

impl MapSurface for TerminalMap {
    fn render(&mut self, scene: &MapScene) {
        let sections = [
            (MarkerKind::PointOfInterest, "Puntos de interés"),
            (MarkerKind::Hazard, "Accidentes"),
            (MarkerKind::SafePlace, "Lugares seguros"),
            (MarkerKind::CurrentLocation, "Ubicación"),
        ];
        for (kind, title) in sections {
            let markers: Vec<_> = scene.markers_of(kind).collect();
            if markers.is_empty() {
                continue;
            }
            println!("{title}:");
            for marker in markers {
                println!("  {:<22}{}", marker.position.short(), marker.label);
            }
        }

        let route: Vec<_> = scene
            .markers
            .iter()
            .filter(|m| {
                matches!(
                    m.kind,
                    MarkerKind::RouteOrigin | MarkerKind::RouteVia | MarkerKind::RouteDestination
                )
            })
            .collect();
        if !route.is_empty() {
            println!("Ruta:");
            for marker in route {
                println!("  {:<22}{}", marker.position.short(), marker.label);
            }
        }
    }

    fn set_view(&mut self, camera: Camera) {
        println!("Vista: {} (zoom {})", camera.center.short(), camera.zoom);
    }
}

/// Device position taken from configuration rather than hardware.
pub(crate) struct ConfiguredGeolocator {
    location: Option<GeoPoint>,
}

impl ConfiguredGeolocator {
    pub(crate) fn new(location: Option<GeoPoint>) -> Self {
        Self { location }
    }
}

impl Geolocator for ConfiguredGeolocator {
    async fn locate(&self) -> Result<GeoPoint, LocateError> {
        self.location
            .ok_or_else(|| LocateError::Unavailable("RUTASDX_LOCATION no configurada".to_string()))
    }
}

pub(crate) fn print_route_card(route: &Route) {
    let toll_free = if route.is_toll_free_request() {
        "  [sin peajes]"
    } else {
        ""
    };
    println!("{} -> {}{toll_free}", route.origin, route.destination);
    println!("  id: {}", route.id);

    if let Some(search) = &route.search {
        if !search.origin_desc.trim().is_empty() {
            println!("  Origen: {}", search.origin_desc);
        }
        if !search.destination_desc.trim().is_empty() {
            println!("  Destino: {}", search.destination_desc);
        }
    }

    let via = route.via_points();
    if !via.is_empty() {
        let names: Vec<&str> = via.iter().map(|w| w.description.as_str()).collect();
        println!("  Pasando por: {}", names.join(", "));
    }

    println!(
        "  Distancia: {:<10}Tiempo: {:<10}Peajes: {}",
        route.distance_label(),
        route.time_label(),
        route.tolls_label()
    );

    if let Some(search) = &route.search {
        let mut vehicle = format!("  Vehículo: {}", search.truck_class.label());
        if search.hazardous_cargo {
            vehicle.push_str(" (materiales peligrosos)");
        }
        println!("{vehicle}");
    }

    if let Some(restrictions) = &route.restrictions {
        println!("  Restricciones: {restrictions}");
    }
    if route.is_custom {
        println!("  Ruta personalizada con {} puntos", route.waypoints.len());
    }
}
