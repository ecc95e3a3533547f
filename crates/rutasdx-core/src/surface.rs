//! Interfaces to the collaborators the core drives but does not own: the
//! notification surface, the map renderer, the device geolocator and the
//! external link opener.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::geo::{Camera, GeoPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: Option<String>,
    pub severity: Severity,
}

impl Notification {
    #[must_use]
    pub fn info(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            severity: Severity::Info,
        }
    }

    #[must_use]
    pub fn error(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            severity: Severity::Destructive,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Fire-and-forget toast surface.
pub trait Notifier {
    fn notify(&self, notification: Notification);
}

/// Opens a URL in a new browsing context.
pub trait LinkOpener {
    fn open(&self, url: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    PointOfInterest,
    Hazard,
    SafePlace,
    CurrentLocation,
    RouteOrigin,
    RouteVia,
    RouteDestination,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub position: GeoPoint,
    pub kind: MarkerKind,
    pub label: String,
}

/// Everything the map renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MapScene {
    pub camera: Camera,
    pub markers: Vec<MapMarker>,
    /// Whether clicks currently mean something (crosshair cursor).
    pub accepts_clicks: bool,
}

impl MapScene {
    pub fn markers_of(&self, kind: MarkerKind) -> impl Iterator<Item = &MapMarker> {
        self.markers.iter().filter(move |m| m.kind == kind)
    }
}

pub trait MapSurface {
    fn render(&mut self, scene: &MapScene);
    fn set_view(&mut self, camera: Camera);
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocateError {
    #[error("permiso de ubicación denegado")]
    PermissionDenied,

    #[error("geolocalización no disponible: {0}")]
    Unavailable(String),

    #[error("tiempo de espera agotado al obtener la ubicación")]
    Timeout,
}

pub trait Geolocator {
    fn locate(&self) -> impl Future<Output = Result<GeoPoint, LocateError>>;
}

/// Bound a geolocation request. Elapsing maps to [`LocateError::Timeout`];
/// the underlying request is dropped, not cancelled at the source.
///
/// # Errors
///
/// Propagates the geolocator's error, or `Timeout`.
pub async fn locate_with_timeout<G: Geolocator + ?Sized>(
    geolocator: &G,
    timeout: Duration,
) -> Result<GeoPoint, LocateError> {
    match tokio::time::timeout(timeout, geolocator.locate()).await {
        Ok(result) => result,
        Err(_) => Err(LocateError::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Never;

    impl Geolocator for Never {
        async fn locate(&self) -> Result<GeoPoint, LocateError> {
            std::future::pending().await
        }
    }

    struct Fixed(GeoPoint);

    impl Geolocator for Fixed {
        async fn locate(&self) -> Result<GeoPoint, LocateError> {
            Ok(self.0)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn pending_locate_times_out() {
        let result = locate_with_timeout(&Never, Duration::from_secs(10)).await;
        assert_eq!(result, Err(LocateError::Timeout));
    }

    #[tokio::test]
    async fn immediate_locate_succeeds() {
        let here = GeoPoint::new(25.6866, -100.3161).unwrap();
        let result = locate_with_timeout(&Fixed(here), Duration::from_secs(10)).await;
        assert_eq!(result, Ok(here));
    }

    #[test]
    fn notification_builders() {
        let n = Notification::error("Error").with_description("Sin coordenadas");
        assert_eq!(n.severity, Severity::Destructive);
        assert_eq!(n.description.as_deref(), Some("Sin coordenadas"));
        assert_eq!(Notification::info("Hola").severity, Severity::Info);
    }
}
