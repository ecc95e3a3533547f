use std::path::PathBuf;
use std::time::Duration;

use crate::geo::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// JSON file backing the persisted key-value store.
    pub storage_path: PathBuf,
    /// Operator-supplied route catalog; `None` uses the embedded catalog.
    pub catalog_path: Option<PathBuf>,
    pub search_delay_ms: u64,
    pub locate_timeout_secs: u64,
    /// Map centre used before geolocation succeeds and after it fails.
    pub default_center: GeoPoint,
    /// Position reported by the terminal geolocator, when configured.
    pub device_location: Option<GeoPoint>,
}

impl AppConfig {
    #[must_use]
    pub fn search_delay(&self) -> Duration {
        Duration::from_millis(self.search_delay_ms)
    }

    #[must_use]
    pub fn locate_timeout(&self) -> Duration {
        Duration::from_secs(self.locate_timeout_secs)
    }
}
