//! Store intermedio versionado y su implementación en memoria.
//!
//! El store direcciona valores por `StepOutputHandle` y memoiza por versión:
//! un `set` bajo una versión idéntica a la ya almacenada no escribe y no
//! reporta registro (sin evento). La implementación en memoria es la
//! referencia del contrato; backends reales (filesystem, etc.) viven en la
//! crate de adapters.
use std::collections::HashMap;
use std::sync::RwLock;

use log::{debug, warn};
use serde_json::Value;

use crate::errors::StepExecutionError;
use crate::model::context::StepContext;
use crate::model::handle::StepOutputHandle;
use crate::model::records::ObjectStoreRecord;
use crate::model::types::PipeType;

/// Backend clave-valor versionado para outputs.
///
/// Los métodos toman `&self`: cualquier mutabilidad interior (y la exclusión
/// mutua ante escritores concurrentes sobre la misma clave) es
/// responsabilidad del backend.
pub trait IntermediateStore {
    /// Persiste `value` bajo el handle y la versión dada. Devuelve el
    /// registro de la operación si hubo escritura, `None` si el backend la
    /// salteó (versión idéntica ya presente).
    fn set(&self,
           ctx: &StepContext<'_>,
           pipe_type: &PipeType,
           handle: &StepOutputHandle,
           value: &Value,
           version: Option<&str>)
           -> Result<Option<ObjectStoreRecord>, StepExecutionError>;

    /// Lee el valor bajo el handle, con el registro de la lectura.
    fn get(&self,
           ctx: &StepContext<'_>,
           handle: &StepOutputHandle)
           -> Result<Option<(Value, ObjectStoreRecord)>, StepExecutionError>;
}

#[derive(Debug, Clone)]
struct StoredObject {
    value: Value,
    version: Option<String>,
}

/// Store intermedio en memoria. Referencia del contrato de memoización;
/// útil para tests y ejecuciones efímeras.
#[derive(Debug, Default)]
pub struct InMemoryIntermediateStore {
    inner: RwLock<HashMap<StepOutputHandle, StoredObject>>,
}

impl InMemoryIntermediateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cantidad de objetos almacenados.
    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IntermediateStore for InMemoryIntermediateStore {
    fn set(&self,
           _ctx: &StepContext<'_>,
           _pipe_type: &PipeType,
           handle: &StepOutputHandle,
           value: &Value,
           version: Option<&str>)
           -> Result<Option<ObjectStoreRecord>, StepExecutionError> {
        let key = handle.storage_key();
        let mut map = self.inner
                          .write()
                          .map_err(|_| StepExecutionError::storage("in-memory store lock poisoned"))?;

        if let Some(existing) = map.get(handle) {
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

        map.insert(handle.clone(),
                   StoredObject { value: value.clone(),
                                  version: version.map(str::to_string) });
        Ok(Some(ObjectStoreRecord::set(key).with_version(version)))
    }

    fn get(&self,
           _ctx: &StepContext<'_>,
           handle: &StepOutputHandle)
           -> Result<Option<(Value, ObjectStoreRecord)>, StepExecutionError> {
        let map = self.inner
                      .read()
                      .map_err(|_| StepExecutionError::storage("in-memory store lock poisoned"))?;
        Ok(map.get(handle).map(|stored| {
                               let record = ObjectStoreRecord::get(handle.storage_key()).with_version(stored.version
                                                                                                            .as_deref());
                               (stored.value.clone(), record)
                           }))
    }
}
