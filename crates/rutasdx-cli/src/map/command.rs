use rutasdx_core::{GeoPoint, InteractionMode};

/// One line of input to the map session.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MapCommand {
    Toggle(InteractionMode),
    Click(GeoPoint),
    /// Free text for whichever dialog is open.
    Confirm(String),
    Dismiss,
    Save,
    Cancel,
    Open,
    Random,
    Select(String),
    Close,
    Locate,
    Show,
    Help,
    Quit,
}

pub(crate) const HELP: &str = "\
comandos:
  hazard | safe-place | route   activar/desactivar modo
  click <lat> <lng>             clic en el mapa
  confirm <nombre> | <desc>     confirmar lugar seguro
  confirm [descripción]         confirmar punto de ruta
  dismiss                       cerrar diálogo
  save | cancel                 guardar o cancelar ruta punto a punto
  open                          abrir ruta en Google Maps
  random | select <id> | close  ruta seleccionada
  locate | show | help | quit";

pub(crate) fn parse_command(line: &str) -> Result<MapCommand, String> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(w, r)| (w, r.trim()));

    let command = match word {
        "hazard" | "accidente" => MapCommand::Toggle(InteractionMode::ReportingHazard),
        "safe-place" | "seguro" => MapCommand::Toggle(InteractionMode::AddingSafePlace),
        "route" | "ruta" => MapCommand::Toggle(InteractionMode::BuildingRoute),
        "click" => MapCommand::Click(parse_point(rest)?),
        "confirm" => MapCommand::Confirm(rest.to_string()),
        "dismiss" => MapCommand::Dismiss,
        "save" => MapCommand::Save,
        "cancel" => MapCommand::Cancel,
        "open" => MapCommand::Open,
        "random" => MapCommand::Random,
        "select" if !rest.is_empty() => MapCommand::Select(rest.to_string()),
        "select" => return Err("uso: select <id>".to_string()),
        "close" => MapCommand::Close,
        "locate" => MapCommand::Locate,
        "show" => MapCommand::Show,
        "help" | "?" => MapCommand::Help,
        "quit" | "exit" => MapCommand::Quit,
        other => return Err(format!("comando desconocido: '{other}' (usa `help`)")),
    };
    Ok(command)
}

fn parse_point(rest: &str) -> Result<GeoPoint, String> {
    let parts: Vec<&str> = rest
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    let [lat, lng] = parts.as_slice() else {
        return Err("uso: click <lat> <lng>".to_string());
    };
    let lat: f64 = lat.parse().map_err(|_| format!("latitud inválida: '{lat}'"))?;
    let lng: f64 = lng.parse().map_err(|_| format!("longitud inválida: '{lng}'"))?;
    GeoPoint::new(lat, lng).map_err(|e| e.to_string())
}

/// Split `name | description` for the safe-place dialog.
pub(crate) fn split_details(text: &str) -> (String, String) {
    match text.split_once('|') {
        Some((name, description)) => (name.trim().to_string(), description.trim().to_string()),
        None => (text.trim().to_string(), String::new()),
    }
}
