//! Interactive map session.
//!
//! Reads one command per line from stdin and feeds it to a `MapSession`.
//! Toasts and the map are printed to stdout; logs go to stderr.

mod command;

use std::io::{BufRead, Write};

use rutasdx_core::{
    DialogRequest, Intent, InteractionMode, MapSession, Notification, Notifier, Panel, SafePlaceDetails,
    SavedRoutes,
};

use self::command::{parse_command, split_details, MapCommand, HELP};
use crate::terminal::{ConfiguredGeolocator, PrintLinkOpener, TerminalMap, TerminalNotifier};
use crate::App;

/// Run the map session until `quit` or end of input.
///
/// # Errors
///
/// Returns an error if stdout cannot be written.
pub(crate) async fn run_map(app: App, route: Option<String>) -> anyhow::Result<()> {
    let notifier = TerminalNotifier;
    let opener = PrintLinkOpener;
    let geolocator = ConfiguredGeolocator::new(app.config.device_location);
    let timeout = app.config.locate_timeout();
    let mut surface = TerminalMap;

    let saved_custom = route.as_deref().is_some_and(|id| {
        SavedRoutes::load(&app.store)
            .get(id)
            .is_some_and(|r| r.is_custom)
    });

    let mut session = MapSession::new(app.store, app.catalog, app.config.default_center);
    session.locate(&geolocator, timeout, &notifier).await;

    if let Some(id) = route {
        if saved_custom {
            notifier.notify(Notification::error("Vista no disponible").with_description(
                "La vista de mapa detallada no está disponible para rutas personalizadas.",
            ));
        } else if let Err(e) = session.dispatch(Intent::SelectRoute(id), &notifier, &opener) {
            tracing::debug!(error = %e, "initial route selection rejected");
        }
    }

    session.render(&mut surface);
    println!("{HELP}");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    prompt(&mut stdout, &session)?;

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "stdin read error");
                break;
            }
        };
        if line.trim().is_empty() {
            prompt(&mut stdout, &session)?;
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                prompt(&mut stdout, &session)?;
                continue;
            }
        };

        let intent = match command {
            MapCommand::Quit => break,
            MapCommand::Help => {
                println!("{HELP}");
                None
            }
            MapCommand::Show => {
                session.render(&mut surface);
                None
            }
            MapCommand::Locate => {
                if !session.locate(&geolocator, timeout, &notifier).await {
                    println!("ya hay una búsqueda de ubicación en curso");
                }
                session.render(&mut surface);
                None
            }
            MapCommand::Toggle(mode) => Some(Intent::ToggleMode(mode)),
            MapCommand::Click(point) => Some(Intent::MapClick(point)),
            MapCommand::Confirm(text) => Some(confirm_intent(&session, &text)),
            MapCommand::Dismiss => Some(Intent::DismissDialog),
            MapCommand::Save => Some(Intent::SaveCustomRoute),
            MapCommand::Cancel => Some(Intent::CancelCustomRoute),
            MapCommand::Open => Some(if session.mode() == InteractionMode::BuildingRoute {
                Intent::OpenCustomRouteExternally
            } else {
                Intent::OpenSelectedRouteExternally
            }),
            MapCommand::Random => Some(Intent::SelectRandomRoute),
            MapCommand::Select(id) => Some(Intent::SelectRoute(id)),
            MapCommand::Close => Some(Intent::ClearSelection),
        };

        if let Some(intent) = intent {
            if let Err(e) = session.dispatch(intent, &notifier, &opener) {
                tracing::debug!(error = %e, "map intent rejected");
            }
            describe_dialog(&session);
            session.render(&mut surface);
        }
        prompt(&mut stdout, &session)?;
    }

    tracing::debug!("map session closed");
    Ok(())
}

fn confirm_intent(session: &MapSession, text: &str) -> Intent {
    match session.modes().open_dialog() {
        Some(DialogRequest::SafePlace) => {
            let (name, description) = split_details(text);
            Intent::ConfirmSafePlace(SafePlaceDetails::new(name, description))
        }
        _ => Intent::ConfirmWaypoint((!text.is_empty()).then(|| text.to_string())),
    }
}

fn describe_dialog(session: &MapSession) {
    match session.modes().open_dialog() {
        Some(DialogRequest::SafePlace) => {
            println!("{}: confirm <nombre> | <descripción>, o dismiss", DialogRequest::SafePlace.title());
        }
        Some(dialog @ DialogRequest::Waypoint { .. }) => {
            println!("{}: confirm [descripción], o dismiss", dialog.title());
        }
        None => {}
    }
}

fn prompt(stdout: &mut std::io::Stdout, session: &MapSession) -> anyhow::Result<()> {
    let panel = match session.panel() {
        Panel::Info => String::new(),
        Panel::SelectedRoute => session
            .selected_route()
            .map(|r| format!(" {} -> {}", r.origin, r.destination))
            .unwrap_or_default(),
        Panel::PointToPoint { points, can_save } => {
            format!(" {points} puntos{}", if can_save { ", listo para guardar" } else { "" })
        }
    };
    write!(stdout, "[{}{panel}] > ", session.mode().title())?;
    stdout.flush()?;
    Ok(())
}
