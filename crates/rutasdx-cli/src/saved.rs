//! Saved-routes screen.

use clap::Subcommand;
use rutasdx_core::{
    share_message, whatsapp_share_url, LinkOpener, Notification, Notifier, Route, SavedRoutes,
    ShareKind,
};

use crate::terminal::{print_route_card, PrintLinkOpener, TerminalNotifier};
use crate::App;

/// Sub-commands available under `saved`.
#[derive(Debug, Subcommand)]
pub enum SavedCommands {
    /// List saved routes
    List,
    /// Delete one saved route
    Delete { id: String },
    /// Delete every saved route
    Clear,
    /// Share a saved route over WhatsApp
    Share {
        id: String,
        /// Share as driving instructions instead of a summary
        #[arg(long)]
        instructions: bool,
    },
    /// Open a saved route in Google Maps
    Open { id: String },
}

/// # Errors
///
/// Returns an error if the named route is not saved or has no coordinates.
pub(crate) fn run_saved(app: &mut App, command: SavedCommands) -> anyhow::Result<()> {
    let notifier = TerminalNotifier;
    let mut saved = SavedRoutes::load(&app.store);

    match command {
        SavedCommands::List => {
            if saved.list().is_empty() {
                println!("Aún no tienes rutas guardadas; busca con `rutasdx search --save <id>`");
                return Ok(());
            }
            println!("Mis Rutas Guardadas ({})", saved.list().len());
            println!();
            for route in saved.list() {
                print_route_card(route);
                println!();
            }
        }
        SavedCommands::Delete { id } => {
            let Some(route) = saved.delete(&mut app.store, &id) else {
                anyhow::bail!("route '{id}' is not saved");
            };
            notifier.notify(Notification::info("Ruta eliminada").with_description(format!(
                "La ruta {} a {} ha sido eliminada.",
                route.origin, route.destination
            )));
        }
        SavedCommands::Clear => {
            let removed = saved.clear(&mut app.store);
            tracing::debug!(removed, "cleared saved routes from cli");
            notifier.notify(
                Notification::info("Rutas eliminadas")
                    .with_description("Todas las rutas guardadas han sido eliminadas."),
            );
        }
        SavedCommands::Share { id, instructions } => {
            let route = saved
                .get(&id)
                .ok_or_else(|| anyhow::anyhow!("route '{id}' is not saved"))?;
            let kind = if instructions {
                ShareKind::Instructions
            } else {
                ShareKind::Route
            };
            share_route(route, kind);
        }
        SavedCommands::Open { id } => {
            let route = saved
                .get(&id)
                .ok_or_else(|| anyhow::anyhow!("route '{id}' is not saved"))?;
            open_route(route)?;
        }
    }

    Ok(())
}

/// Hand the route to WhatsApp as a summary or as driving instructions.
pub(crate) fn share_route(route: &Route, kind: ShareKind) {
    PrintLinkOpener.open(&whatsapp_share_url(&share_message(route, kind)));
    TerminalNotifier.notify(
        Notification::info(match kind {
            ShareKind::Instructions => "Compartiendo Indicaciones",
            ShareKind::Route => "Compartiendo Ruta",
        })
        .with_description("Se abrió WhatsApp para compartir."),
    );
}

/// # Errors
///
/// Returns an error if the route has fewer than two coordinates.
pub(crate) fn open_route(route: &Route) -> anyhow::Result<()> {
    match route.directions_url() {
        Ok(url) => {
            PrintLinkOpener.open(&url);
            Ok(())
        }
        Err(e) => {
            TerminalNotifier.notify(
                Notification::error("Error")
                    .with_description("Coordenadas no disponibles para abrir en Google Maps."),
            );
            Err(e.into())
        }
    }
}
