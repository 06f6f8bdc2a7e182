// # File State Store
//
// File-based implementation of StateStore with crash recovery.
//
// ## Crash Recovery
//
// - Atomic writes: Uses write-then-rename for atomicity
// - Corruption detection: Validates JSON on load
// - Automatic backup: Keeps .backup of last known good state
// - Recovery: Falls back to backup if corruption detected
//
// ## File Format
//
// ```json
// {
//   "version": "1",
//   "resources": {
//     "pihole_dns_record.nas": {
//       "resource_type": "pihole_dns_record",
//       "id": "nas.lan_192.168.1.10",
//       "attributes": { "domain": "nas.lan", "ip": "192.168.1.10" },
//       "last_updated": "2025-01-09T12:00:00Z"
//     }
//   }
// }
// ```

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::Error;
use crate::config::StateStoreConfig;
use crate::traits::state_store::{ResourceState, StateStore, StateStoreFactory};

/// State file format version
const STATE_FILE_VERSION: &str = "1";

/// File-based state store with crash recovery
///
/// # Example
///
/// ```rust,no_run
/// use pihole_core::state::FileStateStore;
/// use pihole_core::traits::StateStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileStateStore::new("terraform.pihole.json").await?;
///     for address in store.list().await? {
///         println!("{}", address);
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileStateStore {
    path: PathBuf,
    state: Arc<RwLock<FileState>>,
}

/// Internal state for file-based store
#[derive(Debug)]
struct FileState {
    resources: BTreeMap<String, ResourceState>,
    dirty: bool,
}

/// Serializable state file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct StateFileFormat {
    version: String,
    resources: BTreeMap<String, ResourceState>,
}

/// Failure while loading a state file
enum LoadError {
    /// The file exists but is not valid state JSON
    Corrupt(Error),
    /// The file could not be read
    Io(Error),
}

impl FileStateStore {
    /// Create or load a file state store
    ///
    /// This will:
    /// 1. Try to load existing state file
    /// 2. If corruption detected, try to load from backup
    /// 3. If both fail, start with empty state
    /// 4. Create parent directories if needed
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to create state directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let resources = Self::load_state_with_recovery(&path).await?;

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(FileState {
                resources,
                dirty: false,
            })),
        })
    }

    /// Load state from file with automatic recovery
    async fn load_state_with_recovery(
        path: &Path,
    ) -> Result<BTreeMap<String, ResourceState>, Error> {
        let err = match Self::load_state(path).await {
            Ok(resources) => {
                tracing::debug!("Loaded state from file: {} resources", resources.len());
                return Ok(resources);
            }
            Err(LoadError::Io(e)) => return Err(e),
            Err(LoadError::Corrupt(e)) => e,
        };

        tracing::warn!(
            "State file appears corrupted: {}. Attempting recovery from backup.",
            err
        );

        let backup_path = Self::backup_path(path);
        if !backup_path.exists() {
            tracing::warn!("No backup file found. Starting with empty state.");
            return Ok(BTreeMap::new());
        }

        match Self::load_state(&backup_path).await {
            Ok(resources) => {
                tracing::info!("Recovered state from backup: {} resources", resources.len());

                if let Err(restore_err) = Self::restore_from_backup(path, &backup_path).await {
                    tracing::error!("Failed to restore state file from backup: {}", restore_err);
                }

                Ok(resources)
            }
            Err(LoadError::Corrupt(backup_err)) | Err(LoadError::Io(backup_err)) => {
                tracing::error!(
                    "Backup also unreadable: {}. Starting with empty state.",
                    backup_err
                );
                Ok(BTreeMap::new())
            }
        }
    }

    /// Load state from file
    async fn load_state(path: &Path) -> Result<BTreeMap<String, ResourceState>, LoadError> {
        if !path.exists() {
            tracing::debug!("State file does not exist: {}", path.display());
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            LoadError::Io(Error::state_store(format!(
                "Failed to read state file {}: {}",
                path.display(),
                e
            )))
        })?;

        let state_file: StateFileFormat = serde_json::from_str(&content).map_err(|e| {
            LoadError::Corrupt(Error::state_store(format!(
                "Failed to parse state file {}: {}",
                path.display(),
                e
            )))
        })?;

        if state_file.version != STATE_FILE_VERSION {
            tracing::warn!(
                "State file version mismatch: expected {}, got {}. \
                Attempting to load anyway.",
                STATE_FILE_VERSION,
                state_file.version
            );
        }

        Ok(state_file.resources)
    }

    /// Write state to file atomically
    async fn write_state(&self) -> Result<(), Error> {
        let mut state_guard = self.state.write().await;

        let state_file = StateFileFormat {
            version: STATE_FILE_VERSION.to_string(),
            resources: state_guard.resources.clone(),
        };

        let json = serde_json::to_string_pretty(&state_file)
            .map_err(|e| Error::state_store(format!("Failed to serialize state: {}", e)))?;

        // Write to temporary file first
        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        if self.path.exists() {
            let backup_path = Self::backup_path(&self.path);
            if let Err(e) = fs::copy(&self.path, &backup_path).await {
                tracing::warn!("Failed to create backup: {}", e);
            }
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::state_store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        state_guard.dirty = false;

        tracing::trace!("State written to file: {}", self.path.display());
        Ok(())
    }

    /// Restore state file from backup
    async fn restore_from_backup(path: &Path, backup_path: &Path) -> Result<(), Error> {
        fs::copy(backup_path, path).await.map_err(|e| {
            Error::state_store(format!(
                "Failed to restore from backup {} to {}: {}",
                backup_path.display(),
                path.display(),
                e
            ))
        })?;

        tracing::info!("Restored state file from backup");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }

    /// Path of the state file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn get(&self, address: &str) -> Result<Option<ResourceState>, Error> {
        let state_guard = self.state.read().await;
        Ok(state_guard.resources.get(address).cloned())
    }

    async fn put(&self, address: &str, state: &ResourceState) -> Result<(), Error> {
        {
            let mut state_guard = self.state.write().await;
            state_guard
                .resources
                .insert(address.to_string(), state.clone());
            state_guard.dirty = true;
        }

        // Immediate write for durability
        self.write_state().await
    }

    async fn remove(&self, address: &str) -> Result<(), Error> {
        {
            let mut state_guard = self.state.write().await;
            if state_guard.resources.remove(address).is_none() {
                return Ok(());
            }
            state_guard.dirty = true;
        }

        self.write_state().await
    }

    async fn list(&self) -> Result<Vec<String>, Error> {
        let state_guard = self.state.read().await;
        Ok(state_guard.resources.keys().cloned().collect())
    }

    async fn flush(&self) -> Result<(), Error> {
        let dirty = self.state.read().await.dirty;
        if dirty {
            self.write_state().await
        } else {
            Ok(())
        }
    }
}

/// Factory for the "file" state store type
pub struct FileStateStoreFactory;

#[async_trait]
impl StateStoreFactory for FileStateStoreFactory {
    async fn create(&self, config: &StateStoreConfig) -> Result<Box<dyn StateStore>, Error> {
        match config {
            StateStoreConfig::File { path } => {
                if path.is_empty() {
                    return Err(Error::config("State file path cannot be empty"));
                }
                Ok(Box::new(FileStateStore::new(path).await?))
            }
            _ => Err(Error::config("Invalid config for file state store")),
        }
    }
}
