//! Whole-object persistence of plugin data.

use crate::error::HostResult;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Host-provided storage for the plugin's settings object
#[async_trait]
pub trait PluginDataStore: Send + Sync {
    /// The stored object, or `None` when nothing has been saved yet
    fn load_data(&self) -> HostResult<Option<Value>>;

    async fn save_data(&self, data: Value) -> HostResult<()>;
}

#[derive(Debug, Default)]
pub struct MemoryDataStore {
    data: RwLock<Option<Value>>,
}

impl MemoryDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: Value) -> Self {
        Self {
            data: RwLock::new(Some(data)),
        }
    }

    pub fn snapshot(&self) -> Option<Value> {
        self.data.read().clone()
    }
}

#[async_trait]
impl PluginDataStore for MemoryDataStore {
    fn load_data(&self) -> HostResult<Option<Value>> {
        Ok(self.data.read().clone())
    }

    async fn save_data(&self, data: Value) -> HostResult<()> {
        *self.data.write() = Some(data);
        Ok(())
    }
}

/// Stores the object as pretty-printed JSON in a single file
#[derive(Debug, Clone)]
pub struct JsonFileDataStore {
    path: PathBuf,
}

impl JsonFileDataStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PluginDataStore for JsonFileDataStore {
    fn load_data(&self) -> HostResult<Option<Value>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn save_data(&self, data: Value) -> HostResult<()> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }

        let content = serde_json::to_string_pretty(&data)?;
        let temp_path = self.path.with_extension("tmp");
        std::fs::write(&temp_path, &content)?;
        std::fs::rename(&temp_path, &self.path)?;
        debug!(path = %self.path.display(), "Saved plugin data");
        Ok(())
    }
}

fn ensure_dir(dir: &Path) -> std::io::Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryDataStore::new();
        assert!(store.load_data().unwrap().is_none());
        store.save_data(json!({"debounceMs": 50})).await.unwrap();
        assert_eq!(store.load_data().unwrap(), Some(json!({"debounceMs": 50})));
    }

    #[tokio::test]
    async fn test_json_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileDataStore::new(dir.path().join("nested/data.json"));
        assert!(store.load_data().unwrap().is_none());

        store.save_data(json!({"providers": []})).await.unwrap();
        assert!(store.path().exists());
        assert_eq!(store.load_data().unwrap(), Some(json!({"providers": []})));
    }

    #[test]
    fn test_json_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(JsonFileDataStore::new(&path).load_data().is_err());
    }
}
