use crate::domain::{WorkoutRecord, WorkoutStore};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Fixed key the workout log is persisted under.
pub const WORKOUTS_KEY: &str = "workouts";

/// Durable key-value storage, the persistence boundary of the app.
///
/// Values survive restarts (for the file-backed implementation) and
/// are overwritten wholesale; there is exactly one writer per key.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), String>;
    fn remove(&mut self, key: &str) -> Result<(), String>;
}

/// File-backed store: one JSON file per key under a data directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        fs::create_dir_all(&self.dir).map_err(|e| e.to_string())?;
        fs::write(self.path_for(key), value).map_err(|e| e.to_string())
    }

    fn remove(&mut self, key: &str) -> Result<(), String> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.to_string()),
        }
    }
}

/// In-memory store, used as the test double and for ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), String> {
        self.values.remove(key);
        Ok(())
    }
}

pub struct WorkoutRepository;

impl WorkoutRepository {
    /// Serializes the store's records and writes them under the fixed
    /// key, overwriting any previous value.
    pub fn save(storage: &mut dyn KeyValueStore, store: &WorkoutStore) -> Result<(), String> {
        match serde_json::to_string(&store.to_records()) {
            Ok(json) => storage.set(WORKOUTS_KEY, &json),
            Err(e) => Err(format!("Serialization failed: {}", e)),
        }
    }

    /// Reads the persisted record list back. An absent key means no
    /// prior data and yields an empty list; an unparsable value is
    /// reported to the caller, which owns the recovery policy.
    pub fn load(storage: &dyn KeyValueStore) -> Result<Vec<WorkoutRecord>, String> {
        match storage.get(WORKOUTS_KEY) {
            None => Ok(Vec::new()),
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| format!("Invalid stored workouts - {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinates, Workout};

    fn sample_store() -> WorkoutStore {
        let mut store = WorkoutStore::new();
        store.add(Workout::running(Coordinates::new(51.5, -0.1), 5.0, 30.0, 160.0).unwrap());
        store.add(Workout::cycling(Coordinates::new(47.2, 9.5), 20.0, 60.0, 150.0).unwrap());
        store
    }

    #[test]
    fn test_memory_store_get_set_remove() {
        let mut storage = MemoryStore::new();
        assert_eq!(storage.get("k"), None);

        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k"), Some("v".to_string()));

        storage.set("k", "w").unwrap();
        assert_eq!(storage.get("k"), Some("w".to_string()));

        storage.remove("k").unwrap();
        assert_eq!(storage.get("k"), None);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        {
            let mut storage = FileStore::new(dir.path().to_path_buf());
            storage.set(WORKOUTS_KEY, "[1,2,3]").unwrap();
        }

        let storage = FileStore::new(dir.path().to_path_buf());
        assert_eq!(storage.get(WORKOUTS_KEY), Some("[1,2,3]".to_string()));
    }

    #[test]
    fn test_file_store_remove_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStore::new(dir.path().to_path_buf());
        assert!(storage.remove("nothing-here").is_ok());
    }

    #[test]
    fn test_save_load_round_trip() {
        let store = sample_store();
        let mut storage = MemoryStore::new();

        WorkoutRepository::save(&mut storage, &store).unwrap();
        let records = WorkoutRepository::load(&storage).unwrap();

        assert_eq!(records, store.to_records());
    }

    #[test]
    fn test_save_is_idempotent() {
        let store = sample_store();
        let mut storage = MemoryStore::new();

        WorkoutRepository::save(&mut storage, &store).unwrap();
        let first = storage.get(WORKOUTS_KEY).unwrap();
        WorkoutRepository::save(&mut storage, &store).unwrap();
        let second = storage.get(WORKOUTS_KEY).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            WorkoutRepository::load(&storage).unwrap(),
            store.to_records()
        );
    }

    #[test]
    fn test_load_absent_key_is_empty() {
        let storage = MemoryStore::new();
        assert_eq!(WorkoutRepository::load(&storage).unwrap(), Vec::new());
    }

    #[test]
    fn test_load_corrupt_value_is_reported() {
        let mut storage = MemoryStore::new();
        storage.set(WORKOUTS_KEY, "{not json").unwrap();

        let result = WorkoutRepository::load(&storage);
        assert!(result.is_err());
        assert!(result.unwrap_err().starts_with("Invalid stored workouts"));
    }
}
