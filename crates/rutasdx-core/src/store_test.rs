use serde::Deserialize;

use super::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Sample {
    name: String,
    values: Vec<u32>,
    nested: Option<Box<Sample>>,
}

fn sample() -> Sample {
    Sample {
        name: "Parador".to_string(),
        values: vec![1, 2, 3],
        nested: Some(Box::new(Sample {
            name: "inner".to_string(),
            values: vec![],
            nested: None,
        })),
    }
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("rutasdx_store_test_{}", uuid::Uuid::new_v4().simple()))
        .join(name)
}

#[test]
fn missing_key_returns_default() {
    let store = KvStore::new(MemoryBackend::new());
    let value: Vec<u32> = store.get("absent", vec![9]);
    assert_eq!(value, vec![9]);
}

#[test]
fn set_then_get_survives_restart_in_memory() {
    let medium = MemoryBackend::new();
    let mut first = KvStore::new(medium.clone());
    assert!(first.set("k", &sample()));
    drop(first);

    let second = KvStore::new(medium);
    let loaded: Sample = second.get("k", Sample {
        name: String::new(),
        values: vec![],
        nested: None,
    });
    assert_eq!(loaded, sample());
}

#[test]
fn set_then_get_survives_restart_on_disk() {
    let path = temp_path("storage.json");
    let mut first = KvStore::new(FileBackend::new(&path));
    assert!(first.set("savedRoutes", &vec!["a", "b"]));
    assert!(first.set("other", &42u32));
    drop(first);

    let second = KvStore::new(FileBackend::new(&path));
    let routes: Vec<String> = second.get("savedRoutes", vec![]);
    assert_eq!(routes, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(second.get("other", 0u32), 42);
    assert!(!path.with_extension("json.tmp").exists());

    let _ = fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn last_write_wins() {
    let mut store = KvStore::new(MemoryBackend::new());
    store.set("k", &1u32);
    store.set("k", &2u32);
    assert_eq!(store.get("k", 0u32), 2);
}

#[test]
fn corrupt_value_returns_default() {
    let medium = MemoryBackend::new();
    medium.insert_raw("accidentMarkers", "{not json").unwrap();
    let store = KvStore::new(medium);
    let value: Vec<u32> = store.get("accidentMarkers", vec![]);
    assert!(value.is_empty());
}

#[test]
fn wrong_shape_returns_default() {
    let medium = MemoryBackend::new();
    medium.insert_raw("k", r#"{"an": "object"}"#).unwrap();
    let store = KvStore::new(medium);
    assert_eq!(store.get::<Vec<u32>>("k", vec![7]), vec![7]);
}

#[test]
fn get_list_drops_only_records_that_fail_to_decode() {
    let medium = MemoryBackend::new();
    medium.insert_raw("k", r#"[1, "two", 3, -4]"#).unwrap();
    let store = KvStore::new(medium);
    assert_eq!(store.get_list::<u32>("k"), vec![1, 3]);
}

#[test]
fn get_list_of_non_array_is_empty() {
    let medium = MemoryBackend::new();
    medium.insert_raw("k", r#"{"an": "object"}"#).unwrap();
    medium.insert_raw("broken", "{not json").unwrap();
    let store = KvStore::new(medium);
    assert!(store.get_list::<u32>("k").is_empty());
    assert!(store.get_list::<u32>("broken").is_empty());
    assert!(store.get_list::<u32>("missing").is_empty());
}

#[test]
fn corrupt_file_returns_default_and_is_not_overwritten() {
    let path = temp_path("storage.json");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "garbage").unwrap();

    let mut store = KvStore::new(FileBackend::new(&path));
    assert_eq!(store.get("k", 5u32), 5);
    assert!(!store.set("k", &6u32));
    assert_eq!(fs::read_to_string(&path).unwrap(), "garbage");

    let _ = fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn unavailable_storage_degrades_to_defaults() {
    let mut store = KvStore::new(UnavailableBackend);
    assert_eq!(store.get("k", 3u32), 3);
    assert!(!store.set("k", &4u32));
    assert!(!store.remove("k"));
}

#[test]
fn persisted_updates_in_memory_even_when_write_fails() {
    let mut store = KvStore::new(UnavailableBackend);
    let mut items: Persisted<Vec<u32>> = Persisted::load(&store, "items", vec![]);
    items.update(&mut store, |v| v.push(1));
    items.update(&mut store, |v| v.push(2));
    assert_eq!(items.get(), &vec![1, 2]);
}

#[test]
fn persisted_writes_through() {
    let medium = MemoryBackend::new();
    let mut store = KvStore::new(medium.clone());
    let mut items: Persisted<Vec<String>> = Persisted::load(&store, "items", vec![]);
    let len = items.update(&mut store, |v| {
        v.push("x".to_string());
        v.len()
    });
    assert_eq!(len, 1);
    assert_eq!(items.key(), "items");

    let reopened = KvStore::new(medium);
    let again: Persisted<Vec<String>> = Persisted::load(&reopened, "items", vec![]);
    assert_eq!(again.get(), &vec!["x".to_string()]);
}

#[test]
fn remove_deletes_key() {
    let path = temp_path("storage.json");
    let mut store = KvStore::new(FileBackend::new(&path));
    store.set("a", &1u32);
    store.set("b", &2u32);
    assert!(store.remove("a"));
    assert_eq!(store.get("a", 0u32), 0);
    assert_eq!(store.get("b", 0u32), 2);

    let _ = fs::remove_dir_all(path.parent().unwrap());
}
