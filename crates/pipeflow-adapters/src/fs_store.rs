//! Store intermedio respaldado por filesystem.
//!
//! Un archivo JSON por handle bajo el directorio raíz
//! (`<root>/<storage_key>.json`) con el sobre `{version, value}`. Mantiene la
//! misma memoización que el store en memoria: versión idéntica ya presente no
//! escribe y no reporta registro; versión distinta avisa y sobrescribe. La
//! raíz se configura vía `PIPEFLOW_STORE_DIR` con carga perezosa de `.env`.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use dotenvy::dotenv;
use log::{debug, warn};
use once_cell::sync::Lazy;
use pipeflow_core::{IntermediateStore, ObjectStoreRecord, PipeType, StepContext, StepExecutionError,
                    StepOutputHandle};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

/// Sobre en disco de un valor almacenado.
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    #[serde(default)]
    version: Option<String>,
    value: Value,
}

/// Store intermedio durable: un archivo JSON por handle.
#[derive(Debug, Clone)]
pub struct FsIntermediateStore {
    root: PathBuf,
}

impl FsIntermediateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Construye el store desde `PIPEFLOW_STORE_DIR`; si la variable no está
    /// definida usa `pipeflow_store` relativo al directorio de trabajo.
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        let root = env::var("PIPEFLOW_STORE_DIR").unwrap_or_else(|_| "pipeflow_store".to_string());
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, handle: &StepOutputHandle) -> PathBuf {
        self.root.join(format!("{}.json", handle.storage_key()))
    }

    fn read_entry(&self, path: &Path) -> Result<Option<StoredEntry>, StepExecutionError> {
        let raw = match fs::read(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error("read", path, &e)),
        };
        let entry =
            serde_json::from_slice(&raw).map_err(|e| {
                                            StepExecutionError::storage(format!("corrupt intermediate at {}: {e}",
                                                                                path.display()))
                                        })?;
        Ok(Some(entry))
    }

    fn write_entry(&self, path: &Path, entry: &StoredEntry) -> Result<(), StepExecutionError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error("create directory for", parent, &e))?;
        }
        let raw = serde_json::to_vec_pretty(entry).map_err(|e| {
                      StepExecutionError::storage(format!("failed to encode intermediate for {}: {e}",
                                                          path.display()))
                  })?;
        fs::write(path, raw).map_err(|e| io_error("write", path, &e))
    }
}

fn io_error(action: &str, path: &Path, e: &io::Error) -> StepExecutionError {
    StepExecutionError::storage(format!("failed to {action} {}: {e}", path.display()))
}

impl IntermediateStore for FsIntermediateStore {
    fn set(&self,
           _ctx: &StepContext<'_>,
           _pipe_type: &PipeType,
           handle: &StepOutputHandle,
           value: &Value,
           version: Option<&str>)
           -> Result<Option<ObjectStoreRecord>, StepExecutionError> {
        let key = handle.storage_key();
        let path = self.path_for(handle);

        if let Some(existing) = self.read_entry(&path)? {
            match (&existing.version, version) {
                (Some(stored), Some(incoming)) if stored == incoming => {
                    debug!("skipping set for {key}: version {incoming} already present");
                    return Ok(None);
                }
                (Some(stored), Some(incoming)) => {
                    warn!("overwriting {key}: version changed from {stored} to {incoming}");
                }
                _ => {}
            }
        }

        self.write_entry(&path,
                         &StoredEntry { version: version.map(str::to_string),
                                        value: value.clone() })?;
        Ok(Some(ObjectStoreRecord::set(key).with_store_name("filesystem")
                                           .with_version(version)))
    }

    fn get(&self,
           _ctx: &StepContext<'_>,
           handle: &StepOutputHandle)
           -> Result<Option<(Value, ObjectStoreRecord)>, StepExecutionError> {
        let path = self.path_for(handle);
        Ok(self.read_entry(&path)?.map(|entry| {
                                      let record = ObjectStoreRecord::get(handle.storage_key())
                                          .with_store_name("filesystem")
                                          .with_version(entry.version.as_deref());
                                      (entry.value, record)
                                  }))
    }
}
