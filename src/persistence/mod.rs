//! Network values document
//!
//! A JSON object keyed by network id:
//! `{ "<id>": { "shape": [..], "weights": [..], "bias": [..] } }`
//!
//! Entries are staged in memory and only hit the disk on `write_data`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{SimError, SimResult};
use crate::nn::{NetworkValues, NeuralNetwork};

#[derive(Debug, Clone)]
pub struct NetworkStore {
    path: PathBuf,
    data: BTreeMap<String, NetworkValues>,
}

impl NetworkStore {
    /// An empty store bound to a file; nothing is read yet
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            data: BTreeMap::new(),
        }
    }

    /// Bind to a file and read it
    pub fn open(path: impl Into<PathBuf>) -> SimResult<Self> {
        let mut store = Self::new(path);
        store.read_data()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored ids in sorted order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Replace the in-memory document with the file's contents
    pub fn read_data(&mut self) -> SimResult<()> {
        let json = std::fs::read_to_string(&self.path)
            .map_err(|e| SimError::storage(&self.path, e))?;
        self.data = serde_json::from_str(&json)?;
        log::info!(
            "Loaded {} network(s) from {}",
            self.data.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Write the in-memory document to the file
    pub fn write_data(&self) -> SimResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SimError::storage(parent, e))?;
        }
        let json = serde_json::to_string_pretty(&self.data)?;
        std::fs::write(&self.path, json).map_err(|e| SimError::storage(&self.path, e))?;
        log::info!(
            "Saved {} network(s) to {}",
            self.data.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Values stored under `id`
    pub fn read_values(&self, id: &str) -> SimResult<NetworkValues> {
        self.data
            .get(id)
            .cloned()
            .ok_or_else(|| SimError::UnknownNetwork(id.to_string()))
    }

    /// Stage values under `id`, replacing any previous entry
    pub fn insert_values(&mut self, id: impl Into<String>, values: NetworkValues) {
        self.data.insert(id.into(), values);
    }

    /// Stage a live network's values under `id`
    pub fn insert_network(&mut self, id: impl Into<String>, network: &NeuralNetwork) {
        self.insert_values(id, network.package_values());
    }
}
