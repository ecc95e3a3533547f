mod map;
mod saved;
mod search;
mod terminal;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use rutasdx_core::{load_catalog, AppConfig, FileBackend, KvStore, MarkerRegistry, RouteCatalog};
use tracing_subscriber::EnvFilter;

use crate::saved::SavedCommands;
use crate::search::SearchArgs;

#[derive(Debug, Parser)]
#[command(name = "rutasdx")]
#[command(about = "Rutas para camiones pesados en México")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the landing summary
    Home,
    /// Search the route catalog
    Search(SearchArgs),
    /// Manage saved routes
    Saved {
        #[command(subcommand)]
        command: SavedCommands,
    },
    /// Open the interactive map session
    Map {
        /// Route id (catalog or saved) to select on open
        #[arg(long)]
        route: Option<String>,
    },
    /// Manage user-reported markers
    Markers {
        #[command(subcommand)]
        command: MarkersCommands,
    },
}

#[derive(Debug, Subcommand)]
enum MarkersCommands {
    /// List reported hazards and safe places
    List,
    /// Remove every reported hazard and safe place
    Clear,
}

/// Everything a screen needs, built once at startup.
pub(crate) struct App {
    pub config: AppConfig,
    pub store: KvStore,
    pub catalog: Arc<RouteCatalog>,
}

impl App {
    fn open(config: AppConfig) -> anyhow::Result<Self> {
        let catalog = match &config.catalog_path {
            Some(path) => load_catalog(path)?,
            None => RouteCatalog::builtin()?,
        };
        let store = KvStore::new(FileBackend::new(&config.storage_path));
        tracing::debug!(
            env = %config.env,
            storage = %config.storage_path.display(),
            routes = catalog.routes().len(),
            "application opened"
        );
        Ok(Self {
            config,
            store,
            catalog: Arc::new(catalog),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = rutasdx_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut app = App::open(config)?;

    match cli.command {
        None | Some(Commands::Home) => print_home(),
        Some(Commands::Search(args)) => search::run_search(&mut app, args).await?,
        Some(Commands::Saved { command }) => saved::run_saved(&mut app, command)?,
        Some(Commands::Map { route }) => map::run_map(app, route).await?,
        Some(Commands::Markers { command }) => run_markers(&mut app, &command),
    }

    Ok(())
}

fn print_home() {
    println!("Rutas para Camiones Pesados en México");
    println!();
    println!("Encuentra las mejores rutas para transporte de carga pesada, con información");
    println!("sobre peajes, restricciones y condiciones de carreteras.");
    println!();
    println!("  rutasdx search   Buscar rutas por origen y destino");
    println!("  rutasdx map      Mapa interactivo: accidentes, lugares seguros, rutas punto a punto");
    println!("  rutasdx saved    Tus rutas guardadas");
}

fn run_markers(app: &mut App, command: &MarkersCommands) {
    let mut registry = MarkerRegistry::load(&app.store);
    match command {
        MarkersCommands::List => {
            if registry.hazards().is_empty() && registry.safe_places().is_empty() {
                println!("no hay marcadores; repórtalos desde `rutasdx map`");
                return;
            }
            for hazard in registry.hazards() {
                println!(
                    "{:<8}{:<24}{}",
                    "ACC",
                    hazard.position.short(),
                    hazard.created_at.format("%Y-%m-%d %H:%M")
                );
            }
            for place in registry.safe_places() {
                println!(
                    "{:<8}{:<24}{}: {}",
                    "SEGURO",
                    place.position.short(),
                    place.name,
                    place.description
                );
            }
        }
        MarkersCommands::Clear => {
            let removed = registry.clear(&mut app.store);
            println!("{removed} marcadores eliminados");
        }
    }
}

#[cfg(test)]
mod tests;
