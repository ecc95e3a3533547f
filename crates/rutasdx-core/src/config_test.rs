use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_test() {
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "RUTASDX_ENV"));
}

#[test]
fn build_app_config_defaults_from_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(
        cfg.storage_path,
        PathBuf::from("./.rutasdx/storage.json")
    );
    assert!(cfg.catalog_path.is_none());
    assert_eq!(cfg.search_delay_ms, 1500);
    assert_eq!(cfg.locate_timeout_secs, 10);
    assert!((cfg.default_center.lat - 19.4326).abs() < f64::EPSILON);
    assert!((cfg.default_center.lng - -99.1332).abs() < f64::EPSILON);
    assert!(cfg.device_location.is_none());
}

#[test]
fn search_delay_override() {
    let mut map = HashMap::new();
    map.insert("RUTASDX_SEARCH_DELAY_MS", "0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.search_delay_ms, 0);
    assert_eq!(cfg.search_delay(), std::time::Duration::ZERO);
}

#[test]
fn search_delay_invalid() {
    let mut map = HashMap::new();
    map.insert("RUTASDX_SEARCH_DELAY_MS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RUTASDX_SEARCH_DELAY_MS"),
        "expected InvalidEnvVar(RUTASDX_SEARCH_DELAY_MS), got: {result:?}"
    );
}

#[test]
fn locate_timeout_zero_is_rejected() {
    let mut map = HashMap::new();
    map.insert("RUTASDX_LOCATE_TIMEOUT_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RUTASDX_LOCATE_TIMEOUT_SECS"),
        "expected InvalidEnvVar(RUTASDX_LOCATE_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn catalog_path_blank_is_ignored() {
    let mut map = HashMap::new();
    map.insert("RUTASDX_CATALOG_PATH", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.catalog_path.is_none());
}

#[test]
fn device_location_parses_pair() {
    let mut map = HashMap::new();
    map.insert("RUTASDX_LOCATION", "25.6866, -100.3161");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let loc = cfg.device_location.expect("location should be set");
    assert!((loc.lat - 25.6866).abs() < f64::EPSILON);
    assert!((loc.lng - -100.3161).abs() < f64::EPSILON);
}

#[test]
fn default_center_out_of_range_is_rejected() {
    let mut map = HashMap::new();
    map.insert("RUTASDX_DEFAULT_CENTER", "95.0,10.0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RUTASDX_DEFAULT_CENTER"),
        "expected InvalidEnvVar(RUTASDX_DEFAULT_CENTER), got: {result:?}"
    );
}

#[test]
fn device_location_without_comma_is_rejected() {
    let mut map = HashMap::new();
    map.insert("RUTASDX_LOCATION", "19.43");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RUTASDX_LOCATION"),
        "expected InvalidEnvVar(RUTASDX_LOCATION), got: {result:?}"
    );
}
