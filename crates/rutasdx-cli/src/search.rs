use clap::{Args, ValueEnum};
use rutasdx_core::surface::locate_with_timeout;
use rutasdx_core::{
    Notification, Notifier, Route, SaveOutcome, SavedRoutes, SearchParams, SearchService,
    ShareKind, TruckClass,
};

use crate::saved::{open_route, share_route};
use crate::terminal::{print_route_card, ConfiguredGeolocator, TerminalNotifier};
use crate::App;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TruckArg {
    Standard,
    Medium,
    Heavy,
    ExtraHeavy,
}

impl From<TruckArg> for TruckClass {
    fn from(arg: TruckArg) -> Self {
        match arg {
            TruckArg::Standard => TruckClass::Standard,
            TruckArg::Medium => TruckClass::Medium,
            TruckArg::Heavy => TruckClass::Heavy,
            TruckArg::ExtraHeavy => TruckClass::ExtraHeavy,
        }
    }
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Origin city or place
    #[arg(long, default_value = "")]
    pub origin: String,
    /// Use the device location as origin
    #[arg(long, conflicts_with = "origin")]
    pub here: bool,
    /// Free-text note about the origin (dock, gate, ...)
    #[arg(long, default_value = "")]
    pub origin_desc: String,
    /// Destination city or place
    #[arg(long, default_value = "")]
    pub destination: String,
    /// Free-text note about the destination
    #[arg(long, default_value = "")]
    pub destination_desc: String,
    /// Vehicle class
    #[arg(long, value_enum, default_value = "standard")]
    pub truck: TruckArg,
    /// Carrying hazardous materials
    #[arg(long)]
    pub hazardous: bool,
    /// Only show routes without tolls
    #[arg(long)]
    pub avoid_tolls: bool,
    /// Save the result with this id
    #[arg(long)]
    pub save: Option<String>,
    /// Share the result with this id over WhatsApp
    #[arg(long)]
    pub share: Option<String>,
    /// With --share, send driving instructions instead of a summary
    #[arg(long, requires = "share")]
    pub instructions: bool,
    /// Open the result with this id in Google Maps
    #[arg(long)]
    pub open: Option<String>,
}

/// Run a route search and print the result cards.
///
/// # Errors
///
/// Returns an error if the origin or destination is missing, or if an id
/// given to `--save`, `--share` or `--open` is not among the results.
pub(crate) async fn run_search(app: &mut App, args: SearchArgs) -> anyhow::Result<()> {
    let notifier = TerminalNotifier;

    let mut origin = args.origin;
    if args.here {
        let geolocator = ConfiguredGeolocator::new(app.config.device_location);
        match locate_with_timeout(&geolocator, app.config.locate_timeout()).await {
            Ok(position) => {
                origin = format!("Mi Ubicación ({})", position.short());
                notifier.notify(
                    Notification::info("Ubicación encontrada")
                        .with_description("Se usó tu ubicación actual como origen."),
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not locate device for search origin");
                notifier.notify(
                    Notification::error("Error de ubicación")
                        .with_description("No se pudo obtener tu ubicación actual."),
                );
            }
        }
    }

    let params = SearchParams {
        origin,
        origin_desc: args.origin_desc,
        destination: args.destination,
        destination_desc: args.destination_desc,
        truck_class: args.truck.into(),
        hazardous_cargo: args.hazardous,
        avoid_tolls: args.avoid_tolls,
    };

    let service = SearchService::new(app.catalog.clone(), app.config.search_delay());
    let results = match service.search(params.clone()).await {
        Ok(results) => results,
        Err(e) => {
            notifier.notify(Notification::error("Campos requeridos").with_description(e.to_string()));
            return Err(e.into());
        }
    };

    if results.is_empty() {
        notifier.notify(
            Notification::error("Sin resultados")
                .with_description("No se encontraron rutas que coincidan con tu búsqueda."),
        );
        return Ok(());
    }

    notifier.notify(Notification::info("Búsqueda completada").with_description(format!(
        "Mostrando rutas de {} a {}",
        params.origin, params.destination
    )));
    println!();
    for route in &results {
        print_route_card(route);
        println!();
    }

    if let Some(id) = args.save.as_deref() {
        let route = find_result(&results, id)?.clone();
        let mut saved = SavedRoutes::load(&app.store);
        let label = format!("La ruta {} a {}", route.origin, route.destination);
        match saved.save(&mut app.store, route) {
            SaveOutcome::Saved => notifier.notify(
                Notification::info("Ruta Guardada")
                    .with_description(format!("{label} ha sido guardada.")),
            ),
            SaveOutcome::AlreadySaved => notifier.notify(
                Notification::info("Ruta ya guardada")
                    .with_description(format!("{label} ya está en tus guardadas.")),
            ),
        }
    }

    if let Some(id) = args.share.as_deref() {
        let kind = if args.instructions {
            ShareKind::Instructions
        } else {
            ShareKind::Route
        };
        share_route(find_result(&results, id)?, kind);
    }

    if let Some(id) = args.open.as_deref() {
        open_route(find_result(&results, id)?)?;
    }

    Ok(())
}

fn find_result<'a>(results: &'a [Route], id: &str) -> anyhow::Result<&'a Route> {
    results
        .iter()
        .find(|r| r.id == id)
        .ok_or_else(|| anyhow::anyhow!("route '{id}' is not in the search results"))
}
