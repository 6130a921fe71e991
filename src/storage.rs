//! Persistence of saved networks, training data and app settings.
//!
//! Storage is injected: [`NetworkRepository`] works over any [`KeyValueStore`],
//! so tests run against [`MemoryStore`] and a desktop host can use
//! [`FileStore`]. Values are JSON documents under fixed keys.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{Error, NetworkState, Result};

pub const NETWORKS_KEY: &str = "nn-simulator-networks";
pub const CURRENT_NETWORK_KEY: &str = "nn-simulator-current-network";
pub const TRAINING_DATA_KEY: &str = "nn-simulator-training-data";
pub const SETTINGS_KEY: &str = "nn-simulator-settings";

const ALL_KEYS: [&str; 4] = [
    NETWORKS_KEY,
    CURRENT_NETWORK_KEY,
    TRAINING_DATA_KEY,
    SETTINGS_KEY,
];

/// String key/value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    /// Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
    fn keys(&self) -> Result<Vec<String>>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates `dir` if needed.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .map_err(|e| Error::Storage(format!("failed to create {}: {e}", dir.display())))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(Error::Storage(format!("invalid storage key {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Storage(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::write(&path, value)
            .map_err(|e| Error::Storage(format!("failed to write {}: {e}", path.display())))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(format!(
                "failed to remove {}: {e}",
                path.display()
            ))),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_owned());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// A saved network with bookkeeping metadata. Timestamps are Unix milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredNetwork {
    pub id: String,
    pub name: String,
    pub created_at: u64,
    pub updated_at: u64,
    pub state: NetworkState,
}

impl StoredNetwork {
    pub fn new(id: impl Into<String>, name: impl Into<String>, state: NetworkState) -> Self {
        let now = now_millis();
        Self {
            id: id.into(),
            name: name.into(),
            created_at: now,
            updated_at: now,
            state,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingData {
    pub network_id: String,
    pub inputs: Vec<Vec<f64>>,
    pub outputs: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub theme: Theme,
    pub auto_save: bool,
    pub offline_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_install_prompt: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_dismiss_count: Option<u32>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            auto_save: true,
            offline_mode: false,
            last_install_prompt: None,
            install_dismiss_count: None,
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Typed access to everything the playground persists.
#[derive(Debug, Clone)]
pub struct NetworkRepository<S> {
    store: S,
}

impl<S: KeyValueStore> NetworkRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.store.get(key)? {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| Error::Storage(format!("corrupted value under {key}: {e}"))),
        }
    }

    fn write_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)
            .map_err(|e| Error::Storage(format!("failed to encode {key}: {e}")))?;
        self.store.set(key, &raw)
    }

    /// Inserts or replaces a network by id. Re-saving keeps the original
    /// creation time and bumps `updated_at`.
    pub fn save_network(&mut self, mut network: StoredNetwork) -> Result<StoredNetwork> {
        network.state.validate()?;

        let mut networks = self.networks()?;
        if let Some(existing) = networks.get(&network.id) {
            network.created_at = existing.created_at;
            network.updated_at = now_millis().max(existing.updated_at);
        }
        debug!("saving network id={} name={:?}", network.id, network.name);
        networks.insert(network.id.clone(), network.clone());
        self.write_json(NETWORKS_KEY, &networks)?;
        Ok(network)
    }

    pub fn networks(&self) -> Result<BTreeMap<String, StoredNetwork>> {
        Ok(self.read_json(NETWORKS_KEY)?.unwrap_or_default())
    }

    pub fn network(&self, id: &str) -> Result<Option<StoredNetwork>> {
        Ok(self.networks()?.remove(id))
    }

    /// Returns whether a network was removed.
    pub fn delete_network(&mut self, id: &str) -> Result<bool> {
        let mut networks = self.networks()?;
        let removed = networks.remove(id).is_some();
        if removed {
            self.write_json(NETWORKS_KEY, &networks)?;
        }
        Ok(removed)
    }

    pub fn set_current_network(&mut self, id: &str) -> Result<()> {
        self.store.set(CURRENT_NETWORK_KEY, id)
    }

    pub fn current_network(&self) -> Result<Option<String>> {
        self.store.get(CURRENT_NETWORK_KEY)
    }

    pub fn save_training_data(&mut self, data: TrainingData) -> Result<()> {
        let mut all = self.all_training_data()?;
        all.insert(data.network_id.clone(), data);
        self.write_json(TRAINING_DATA_KEY, &all)
    }

    pub fn training_data(&self, network_id: &str) -> Result<Option<TrainingData>> {
        Ok(self.all_training_data()?.remove(network_id))
    }

    pub fn all_training_data(&self) -> Result<BTreeMap<String, TrainingData>> {
        Ok(self.read_json(TRAINING_DATA_KEY)?.unwrap_or_default())
    }

    pub fn save_settings(&mut self, settings: &AppSettings) -> Result<()> {
        self.write_json(SETTINGS_KEY, settings)
    }

    /// Stored settings, or the defaults if none were saved or they fail to parse.
    pub fn settings(&self) -> AppSettings {
        match self.read_json(SETTINGS_KEY) {
            Ok(Some(settings)) => settings,
            Ok(None) => AppSettings::default(),
            Err(e) => {
                warn!("falling back to default settings: {e}");
                AppSettings::default()
            }
        }
    }

    /// Removes every key owned by the repository.
    pub fn clear(&mut self) -> Result<()> {
        for key in ALL_KEYS {
            self.store.remove(key)?;
        }
        Ok(())
    }

    /// Bytes stored under the repository's keys.
    pub fn usage_bytes(&self) -> Result<usize> {
        let mut total = 0;
        for key in ALL_KEYS {
            if let Some(value) = self.store.get(key)? {
                total += value.len();
            }
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Network;

    fn state(seed: u64) -> NetworkState {
        Network::with_seed(&[2, 3, 1], 0.1, seed).unwrap().state()
    }

    #[test]
    fn save_list_and_delete_networks() {
        let mut repo = NetworkRepository::new(MemoryStore::new());
        assert!(repo.networks().unwrap().is_empty());

        repo.save_network(StoredNetwork::new("a", "first", state(1))).unwrap();
        repo.save_network(StoredNetwork::new("b", "second", state(2))).unwrap();

        let all = repo.networks().unwrap();
        assert_eq!(all.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(repo.network("b").unwrap().unwrap().state, state(2));

        assert!(repo.delete_network("a").unwrap());
        assert!(!repo.delete_network("a").unwrap());
        assert!(repo.network("a").unwrap().is_none());
    }

    #[test]
    fn resave_keeps_creation_time() {
        let mut repo = NetworkRepository::new(MemoryStore::new());
        let mut first = StoredNetwork::new("net", "v1", state(1));
        first.created_at = 42;
        first.updated_at = 42;
        repo.save_network(first).unwrap();

        let saved = repo
            .save_network(StoredNetwork::new("net", "v2", state(3)))
            .unwrap();
        assert_eq!(saved.created_at, 42);
        assert!(saved.updated_at >= 42);
        assert_eq!(repo.network("net").unwrap().unwrap().name, "v2");
    }

    #[test]
    fn rejects_invalid_state_before_writing() {
        let mut repo = NetworkRepository::new(MemoryStore::new());
        let mut bad = state(1);
        bad.biases.pop();
        let err = repo
            .save_network(StoredNetwork::new("x", "bad", bad))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
        assert!(repo.store().get(NETWORKS_KEY).unwrap().is_none());
    }

    #[test]
    fn current_network_and_training_data() {
        let mut repo = NetworkRepository::new(MemoryStore::new());
        assert_eq!(repo.current_network().unwrap(), None);
        repo.set_current_network("abc").unwrap();
        assert_eq!(repo.current_network().unwrap().as_deref(), Some("abc"));

        let data = TrainingData {
            network_id: "abc".to_owned(),
            inputs: vec![vec![0.0, 1.0]],
            outputs: vec![vec![1.0]],
        };
        repo.save_training_data(data.clone()).unwrap();
        assert_eq!(repo.training_data("abc").unwrap(), Some(data));
        assert_eq!(repo.training_data("zzz").unwrap(), None);
    }

    #[test]
    fn settings_default_and_roundtrip() {
        let mut repo = NetworkRepository::new(MemoryStore::new());
        assert_eq!(repo.settings(), AppSettings::default());

        let settings = AppSettings {
            theme: Theme::Light,
            auto_save: false,
            offline_mode: true,
            last_install_prompt: Some(1_700_000_000_000),
            install_dismiss_count: Some(2),
        };
        repo.save_settings(&settings).unwrap();
        assert_eq!(repo.settings(), settings);

        let mut store = repo.into_store();
        store.set(SETTINGS_KEY, "{not json").unwrap();
        let repo = NetworkRepository::new(store);
        assert_eq!(repo.settings(), AppSettings::default());
    }

    #[test]
    fn corrupted_networks_surface_as_storage_errors() {
        let mut store = MemoryStore::new();
        store.set(NETWORKS_KEY, "[1,2,3]").unwrap();
        let repo = NetworkRepository::new(store);
        assert!(matches!(repo.networks(), Err(Error::Storage(_))));
    }

    #[test]
    fn clear_and_usage() {
        let mut repo = NetworkRepository::new(MemoryStore::new());
        repo.set_current_network("abcd").unwrap();
        repo.save_settings(&AppSettings::default()).unwrap();
        let settings_len = repo.store().get(SETTINGS_KEY).unwrap().unwrap().len();
        assert_eq!(repo.usage_bytes().unwrap(), 4 + settings_len);

        repo.clear().unwrap();
        assert_eq!(repo.usage_bytes().unwrap(), 0);
        assert!(repo.store().keys().unwrap().is_empty());
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut repo = NetworkRepository::new(FileStore::open(dir.path()).unwrap());
            repo.save_network(StoredNetwork::new("n1", "saved", state(5)))
                .unwrap();
            repo.set_current_network("n1").unwrap();
        }

        let repo = NetworkRepository::new(FileStore::open(dir.path()).unwrap());
        assert_eq!(repo.current_network().unwrap().as_deref(), Some("n1"));
        let stored = repo.network("n1").unwrap().unwrap();
        assert_eq!(stored.state, state(5));
        assert_eq!(
            repo.store().keys().unwrap(),
            vec![CURRENT_NETWORK_KEY.to_owned(), NETWORKS_KEY.to_owned()]
        );
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        assert!(matches!(store.set("../escape", "x"), Err(Error::Storage(_))));
        assert!(matches!(store.get("a/b"), Err(Error::Storage(_))));
        store.remove("never-written").unwrap();
    }
}
