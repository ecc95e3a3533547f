//! Deep links into external apps: driving directions and chat sharing.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::geo::GeoPoint;
use crate::route::Route;
use crate::CoreError;

pub const APP_NAME: &str = "Rutas DX";

const DIRECTIONS_BASE: &str = "https://www.google.com/maps/dir/?api=1";
const WHATSAPP_BASE: &str = "https://wa.me/?text=";

/// Characters `encodeURIComponent` leaves untouched.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareKind {
    /// Route summary.
    Route,
    /// Summary phrased as driving instructions.
    Instructions,
}

/// Driving directions through `points` in order. Interior points become a
/// pipe-separated `waypoints` parameter, omitted when there are none.
///
/// # Errors
///
/// Returns [`CoreError::MissingCoordinates`] for fewer than two points.
pub fn google_maps_directions_url(points: &[GeoPoint]) -> Result<String, CoreError> {
    let (Some(origin), Some(destination)) = (points.first(), points.last()) else {
        return Err(CoreError::MissingCoordinates("route".to_string()));
    };
    if points.len() < 2 {
        return Err(CoreError::MissingCoordinates("route".to_string()));
    }

    let mut url =
        format!("{DIRECTIONS_BASE}&origin={origin}&destination={destination}&travelmode=driving");

    let interior = &points[1..points.len() - 1];
    if !interior.is_empty() {
        let waypoints = interior
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("|");
        url.push_str("&waypoints=");
        url.push_str(&waypoints);
    }

    Ok(url)
}

/// Plain-text route summary for sharing. Lines with nothing to say are
/// omitted.
#[must_use]
pub fn share_message(route: &Route, kind: ShareKind) -> String {
    let toll_free = route.is_toll_free_request();
    let via = route
        .via_points()
        .iter()
        .map(|w| w.description.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut lines: Vec<String> = Vec::new();
    lines.push(
        match kind {
            ShareKind::Route => "¡Hola! Te comparto esta ruta para camión:",
            ShareKind::Instructions => "¡Hola! Aquí están las indicaciones para la ruta de camión:",
        }
        .to_string(),
    );
    lines.push(format!("Origen: {}", route.origin));
    if !via.is_empty() {
        lines.push(format!("Pasando por: {via}"));
    }
    lines.push(format!("Destino: {}", route.destination));

    if kind == ShareKind::Instructions {
        if toll_free {
            lines.push("RUTA SIN PEAJES".to_string());
        }
        lines.push(
            "(Indicaciones detalladas paso a paso no disponibles en esta versión)".to_string(),
        );
    }

    if route.distance_km.is_some() {
        lines.push(format!("Distancia: {}", route.distance_label()));
    }
    if route.time_minutes.is_some() {
        lines.push(format!("Tiempo Estimado: {}", route.time_label()));
    }
    if route.toll_cost.is_some() {
        lines.push(format!("Peajes: {}", route.tolls_label()));
    }
    if kind == ShareKind::Route && toll_free {
        lines.push("(Ruta sin peajes solicitada)".to_string());
    }
    if let Some(restrictions) = &route.restrictions {
        lines.push(format!("Restricciones: {restrictions}"));
    }

    lines.push(match kind {
        ShareKind::Route => format!("Puedes ver más detalles en {APP_NAME}."),
        ShareKind::Instructions => format!("Consulta más en {APP_NAME}."),
    });

    lines.join("\n")
}

#[must_use]
pub fn whatsapp_share_url(message: &str) -> String {
    format!(
        "{WHATSAPP_BASE}{}",
        utf8_percent_encode(message, URI_COMPONENT)
    )
}
