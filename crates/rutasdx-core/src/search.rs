use std::sync::Arc;
use std::time::Duration;

use crate::catalog::{RouteCatalog, SearchParams};
use crate::route::Route;
use crate::CoreError;

/// Default artificial latency of a search, standing in for a routing API.
pub const DEFAULT_SEARCH_DELAY: Duration = Duration::from_millis(1500);

/// Simulated routing backend over the in-memory catalog.
#[derive(Debug, Clone)]
pub struct SearchService {
    catalog: Arc<RouteCatalog>,
    delay: Duration,
}

impl SearchService {
    #[must_use]
    pub fn new(catalog: Arc<RouteCatalog>, delay: Duration) -> Self {
        Self { catalog, delay }
    }

    #[must_use]
    pub fn catalog(&self) -> &RouteCatalog {
        &self.catalog
    }

    /// Validate the form, wait out the artificial delay, then filter.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] when origin or destination is blank.
    /// Validation happens before the delay.
    pub async fn search(&self, params: SearchParams) -> Result<Vec<Route>, CoreError> {
        if params.origin.trim().is_empty() || params.destination.trim().is_empty() {
            return Err(CoreError::Validation(
                "Por favor ingresa origen y destino.".to_string(),
            ));
        }

        tracing::info!(
            origin = %params.origin,
            destination = %params.destination,
            truck = ?params.truck_class,
            avoid_tolls = params.avoid_tolls,
            "searching routes"
        );
        tokio::time::sleep(self.delay).await;

        let results = self.catalog.filter(&params);
        tracing::info!(results = results.len(), "route search finished");
        Ok(results)
    }
}
