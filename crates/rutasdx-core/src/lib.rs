pub mod app_config;
pub mod catalog;
pub mod config;
pub mod geo;
pub mod links;
pub mod markers;
pub mod mode;
pub mod route;
pub mod saved;
pub mod search;
pub mod session;
pub mod store;
pub mod surface;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use catalog::{load_catalog, RouteCatalog, SearchParams, TruckClass};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{Camera, GeoPoint};
pub use links::{google_maps_directions_url, share_message, whatsapp_share_url, ShareKind};
pub use markers::{HazardMarker, MarkerRegistry, PointOfInterest, SafePlaceDetails, SafePlaceMarker};
pub use mode::{ClickOutcome, DialogRequest, InteractionMode, ModeError, ModeMachine};
pub use route::{tag_waypoints, Route, RouteWaypoint, TaggedWaypoint, WaypointRole};
pub use saved::{SaveOutcome, SavedRoutes};
pub use search::SearchService;
pub use session::{Intent, LocateTicket, MapSession, Panel};
pub use store::{FileBackend, KvStore, MemoryBackend, StorageBackend, StoreError};
pub use surface::{
    Geolocator, LinkOpener, LocateError, MapMarker, MapScene, MapSurface, MarkerKind,
    Notification, Notifier, Severity,
};

/// Domain errors surfaced to the user through the notification surface.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0}")]
    Validation(String),

    #[error("invalid coordinate ({lat}, {lng}): latitude must be within [-90, 90] and longitude within [-180, 180]")]
    InvalidCoordinate { lat: f64, lng: f64 },

    #[error("coordinates not available for route '{0}'")]
    MissingCoordinates(String),

    #[error("route '{0}' not found")]
    NotFound(String),

    #[error("invalid catalog: {0}")]
    Catalog(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read catalog file {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file: {0}")]
    CatalogFileParse(#[from] serde_yaml::Error),

    #[error("catalog validation failed: {0}")]
    Validation(String),
}
