use super::*;
use crate::search::TruckArg;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["rutasdx"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_home_command() {
    let cli = Cli::try_parse_from(["rutasdx", "home"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Home)));
}

#[test]
fn parses_search_with_defaults() {
    let cli = Cli::try_parse_from([
        "rutasdx",
        "search",
        "--origin",
        "Monterrey",
        "--destination",
        "Veracruz",
    ])
    .expect("expected valid cli args");

    let Some(Commands::Search(args)) = cli.command else {
        panic!("expected search command");
    };
    assert_eq!(args.origin, "Monterrey");
    assert_eq!(args.destination, "Veracruz");
    assert_eq!(args.truck, TruckArg::Standard);
    assert!(!args.hazardous);
    assert!(!args.avoid_tolls);
    assert!(args.save.is_none());
}

#[test]
fn parses_search_with_all_flags() {
    let cli = Cli::try_parse_from([
        "rutasdx",
        "search",
        "--origin",
        "Puebla",
        "--origin-desc",
        "Bodega 4",
        "--destination",
        "Oaxaca",
        "--destination-desc",
        "Andén 2",
        "--truck",
        "extra-heavy",
        "--hazardous",
        "--avoid-tolls",
        "--save",
        "pue-oax-noToll",
    ])
    .expect("expected valid cli args");

    let Some(Commands::Search(args)) = cli.command else {
        panic!("expected search command");
    };
    assert_eq!(args.origin_desc, "Bodega 4");
    assert_eq!(args.destination_desc, "Andén 2");
    assert_eq!(args.truck, TruckArg::ExtraHeavy);
    assert!(args.hazardous);
    assert!(args.avoid_tolls);
    assert_eq!(args.save.as_deref(), Some("pue-oax-noToll"));
}

#[test]
fn search_here_conflicts_with_origin() {
    assert!(Cli::try_parse_from([
        "rutasdx",
        "search",
        "--here",
        "--origin",
        "Puebla",
        "--destination",
        "Oaxaca",
    ])
    .is_err());
    assert!(Cli::try_parse_from(["rutasdx", "search", "--here", "--destination", "Oaxaca"]).is_ok());
}

#[test]
fn parses_search_share_and_open() {
    let cli = Cli::try_parse_from([
        "rutasdx",
        "search",
        "--origin",
        "San Luis",
        "--destination",
        "Quer",
        "--share",
        "slp-qro",
        "--instructions",
        "--open",
        "slp-qro",
    ])
    .expect("expected valid cli args");

    let Some(Commands::Search(args)) = cli.command else {
        panic!("expected search command");
    };
    assert_eq!(args.share.as_deref(), Some("slp-qro"));
    assert!(args.instructions);
    assert_eq!(args.open.as_deref(), Some("slp-qro"));
    assert!(args.save.is_none());
}

#[test]
fn search_instructions_requires_share() {
    assert!(Cli::try_parse_from([
        "rutasdx",
        "search",
        "--origin",
        "Puebla",
        "--destination",
        "Oaxaca",
        "--instructions",
    ])
    .is_err());
}

#[test]
fn rejects_unknown_truck_class() {
    assert!(Cli::try_parse_from(["rutasdx", "search", "--truck", "bicycle"]).is_err());
}

#[test]
fn parses_saved_subcommands() {
    let cli = Cli::try_parse_from(["rutasdx", "saved", "list"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Saved {
            command: SavedCommands::List
        })
    ));

    let cli = Cli::try_parse_from(["rutasdx", "saved", "delete", "cdmx-gdl"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Saved {
            command: SavedCommands::Delete { ref id }
        }) if id == "cdmx-gdl"
    ));

    let cli = Cli::try_parse_from(["rutasdx", "saved", "share", "slp-qro", "--instructions"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Saved {
            command: SavedCommands::Share {
                instructions: true,
                ..
            }
        })
    ));
}

#[test]
fn saved_delete_requires_id() {
    assert!(Cli::try_parse_from(["rutasdx", "saved", "delete"]).is_err());
}

#[test]
fn parses_map_with_route() {
    let cli = Cli::try_parse_from(["rutasdx", "map", "--route", "tij-mxli"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Map { route: Some(ref r) }) if r == "tij-mxli"
    ));
}

#[test]
fn parses_markers_clear() {
    let cli = Cli::try_parse_from(["rutasdx", "markers", "clear"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Markers {
            command: MarkersCommands::Clear
        })
    ));
}
