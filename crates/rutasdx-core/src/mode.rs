//! Map interaction modes.
//!
//! Exactly one mode is active per map session and decides what a click on
//! the map means. Modes that need user input after a click stage the point
//! and open a single confirmation dialog; further clicks are ignored until
//! that dialog is confirmed or dismissed.

use thiserror::Error;
use uuid::Uuid;

use crate::geo::GeoPoint;
use crate::markers::SafePlaceDetails;
use crate::route::{tag_waypoints, Route, RouteWaypoint, TaggedWaypoint};

/// Minimum number of waypoints for a saveable custom route.
pub const MIN_ROUTE_POINTS: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InteractionMode {
    #[default]
    Idle,
    ReportingHazard,
    AddingSafePlace,
    BuildingRoute,
}

impl InteractionMode {
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            InteractionMode::Idle => "Vista",
            InteractionMode::ReportingHazard => "Añadir Accidente",
            InteractionMode::AddingSafePlace => "Añadir Lugar Seguro",
            InteractionMode::BuildingRoute => "Crear Ruta Punto a Punto",
        }
    }

    #[must_use]
    pub fn hint(self) -> Option<&'static str> {
        match self {
            InteractionMode::Idle => None,
            InteractionMode::ReportingHazard => {
                Some("Haz clic en el mapa para marcar la ubicación.")
            }
            InteractionMode::AddingSafePlace => {
                Some("Haz clic en el mapa para seleccionar la ubicación.")
            }
            InteractionMode::BuildingRoute => Some(
                "Haz clic en el mapa para añadir Origen, Puntos Intermedios y Destino.",
            ),
        }
    }

    #[must_use]
    pub fn accepts_clicks(self) -> bool {
        self != InteractionMode::Idle
    }
}

/// The confirmation dialog a staged click is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogRequest {
    SafePlace,
    /// `point_number` is the 1-based position the point will take.
    Waypoint { point_number: usize },
}

impl DialogRequest {
    #[must_use]
    pub fn title(self) -> String {
        match self {
            DialogRequest::SafePlace => "Añadir Lugar Seguro".to_string(),
            DialogRequest::Waypoint { point_number: 1 } => {
                "Descripción del Origen (Opcional)".to_string()
            }
            DialogRequest::Waypoint { point_number } => {
                format!("Descripción del Punto {point_number} (Intermedio/Destino)")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct StagedClick {
    point: GeoPoint,
    dialog: DialogRequest,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickOutcome {
    /// Idle mode, or a dialog is already open.
    Ignored,
    /// The caller should record a hazard here; the mode is back to Idle.
    HazardPlaced(GeoPoint),
    DialogOpened(DialogRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeChange {
    pub from: InteractionMode,
    pub to: InteractionMode,
}

impl ModeChange {
    #[must_use]
    pub fn activated(&self) -> bool {
        self.to != InteractionMode::Idle
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModeError {
    #[error("No hay ningún diálogo de confirmación abierto.")]
    NoDialogOpen,

    #[error("El diálogo abierto no es de {expected}.")]
    WrongDialog { expected: &'static str },

    #[error("Necesitas al menos un origen y un destino ({have} de 2 puntos).")]
    NotEnoughPoints { have: usize },

    #[error("{0}")]
    InvalidDetails(String),
}

#[derive(Debug, Default)]
pub struct ModeMachine {
    mode: InteractionMode,
    pending: Vec<RouteWaypoint>,
    staged: Option<StagedClick>,
}

impl ModeMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// The in-progress route; empty outside `BuildingRoute`.
    #[must_use]
    pub fn pending(&self) -> &[RouteWaypoint] {
        &self.pending
    }

    #[must_use]
    pub fn tagged_pending(&self) -> Vec<TaggedWaypoint<'_>> {
        tag_waypoints(&self.pending)
    }

    #[must_use]
    pub fn open_dialog(&self) -> Option<DialogRequest> {
        self.staged.map(|s| s.dialog)
    }

    #[must_use]
    pub fn staged_point(&self) -> Option<GeoPoint> {
        self.staged.map(|s| s.point)
    }

    #[must_use]
    pub fn can_save(&self) -> bool {
        self.pending.len() >= MIN_ROUTE_POINTS
    }

    /// Activate `target`, or return to Idle if it is already active.
    /// Leaving or entering route building always starts from an empty build;
    /// any open dialog is closed.
    pub fn toggle(&mut self, target: InteractionMode) -> ModeChange {
        let from = self.mode;
        let to = if from == target {
            InteractionMode::Idle
        } else {
            target
        };

        self.staged = None;
        if from == InteractionMode::BuildingRoute || to == InteractionMode::BuildingRoute {
            self.pending.clear();
        }
        self.mode = to;

        tracing::debug!(?from, ?to, "interaction mode changed");
        ModeChange { from, to }
    }

    pub fn on_map_click(&mut self, point: GeoPoint) -> ClickOutcome {
        if self.staged.is_some() {
            tracing::debug!(mode = ?self.mode, "map click ignored while a dialog is open");
            return ClickOutcome::Ignored;
        }

        match self.mode {
            InteractionMode::Idle => ClickOutcome::Ignored,
            InteractionMode::ReportingHazard => {
                self.mode = InteractionMode::Idle;
                ClickOutcome::HazardPlaced(point)
            }
            InteractionMode::AddingSafePlace => self.stage(point, DialogRequest::SafePlace),
            InteractionMode::BuildingRoute => {
                let point_number = self.pending.len() + 1;
                self.stage(point, DialogRequest::Waypoint { point_number })
            }
        }
    }

    fn stage(&mut self, point: GeoPoint, dialog: DialogRequest) -> ClickOutcome {
        self.staged = Some(StagedClick { point, dialog });
        ClickOutcome::DialogOpened(dialog)
    }

    /// Confirm the safe-place dialog. On success the staged point and the
    /// validated details are handed back for the caller to store and the
    /// mode returns to Idle. Blank details keep the dialog open.
    ///
    /// # Errors
    ///
    /// `NoDialogOpen`, `WrongDialog`, or `InvalidDetails` for blank fields.
    pub fn confirm_safe_place(
        &mut self,
        details: SafePlaceDetails,
    ) -> Result<(GeoPoint, SafePlaceDetails), ModeError> {
        let staged = self.staged.ok_or(ModeError::NoDialogOpen)?;
        if staged.dialog != DialogRequest::SafePlace {
            return Err(ModeError::WrongDialog {
                expected: "lugar seguro",
            });
        }
        details
            .validate()
            .map_err(|e| ModeError::InvalidDetails(e.to_string()))?;

        self.staged = None;
        self.mode = InteractionMode::Idle;
        Ok((staged.point, details))
    }

    /// Confirm the waypoint dialog, appending the staged point. A blank or
    /// missing description becomes `Punto N`.
    ///
    /// # Errors
    ///
    /// `NoDialogOpen` or `WrongDialog`.
    pub fn confirm_waypoint(&mut self, description: Option<&str>) -> Result<&RouteWaypoint, ModeError> {
        let staged = self.staged.ok_or(ModeError::NoDialogOpen)?;
        let DialogRequest::Waypoint { point_number } = staged.dialog else {
            return Err(ModeError::WrongDialog {
                expected: "punto de ruta",
            });
        };

        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map_or_else(|| format!("Punto {point_number}"), str::to_string);

        self.staged = None;
        self.pending
            .push(RouteWaypoint::new(staged.point, description));
        tracing::debug!(points = self.pending.len(), "waypoint added to route build");
        Ok(&self.pending[self.pending.len() - 1])
    }

    /// Close the open dialog without acting on the staged point. The mode
    /// and the route build are unchanged.
    pub fn dismiss_dialog(&mut self) -> bool {
        self.staged.take().is_some()
    }

    /// Turn the route build into a custom route and return to Idle.
    ///
    /// # Errors
    ///
    /// `NotEnoughPoints` when fewer than two waypoints were confirmed; no
    /// state changes in that case.
    pub fn save(&mut self) -> Result<Route, ModeError> {
        if !self.can_save() {
            return Err(ModeError::NotEnoughPoints {
                have: self.pending.len(),
            });
        }

        let waypoints = std::mem::take(&mut self.pending);
        let route = custom_route(waypoints);
        self.staged = None;
        self.mode = InteractionMode::Idle;
        tracing::debug!(id = %route.id, points = route.waypoints.len(), "custom route built");
        Ok(route)
    }

    /// Abandon the route build and return to Idle.
    pub fn cancel(&mut self) {
        self.pending.clear();
        self.staged = None;
        self.mode = InteractionMode::Idle;
    }
}

fn custom_route(waypoints: Vec<RouteWaypoint>) -> Route {
    let label = |w: Option<&RouteWaypoint>| {
        w.map(|w| {
            if w.description.trim().is_empty() {
                format!("Coord: {}", w.position.short())
            } else {
                w.description.clone()
            }
        })
        .unwrap_or_default()
    };

    Route {
        id: format!("custom-{}", Uuid::new_v4().simple()),
        origin: label(waypoints.first()),
        destination: label(waypoints.last()),
        distance_km: None,
        time_minutes: None,
        toll_cost: None,
        restrictions: Some(format!("Ruta personalizada con {} puntos", waypoints.len())),
        waypoints,
        is_custom: true,
        avoid_tolls: false,
        search: None,
    }
}

#[cfg(test)]
#[path = "mode_test.rs"]
mod tests;
