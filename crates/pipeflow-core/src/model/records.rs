//! Registros de observabilidad de interacciones con los backends de
//! almacenamiento. No transportan el valor escrito/leído, sólo describen la
//! operación realizada; viajan dentro de eventos `ObjectStoreOperation` /
//! `AssetStoreOperation`.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::handle::StepOutputHandle;

/// Operación realizada contra el object store intermedio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectStoreOp {
    SetObject,
    GetObject,
    RmObject,
    CpObject,
}

/// Registro de una interacción con el object store. `value_name` lo estampa
/// el secuenciador con el nombre del input/output involucrado al momento de
/// emitir el evento; los backends lo dejan en `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectStoreRecord {
    pub op: ObjectStoreOp,
    pub key: String,
    #[serde(default)]
    pub value_name: Option<String>,
    #[serde(default)]
    pub object_store_name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl ObjectStoreRecord {
    #[inline]
    pub fn set(key: impl Into<String>) -> Self {
        Self::new(ObjectStoreOp::SetObject, key)
    }

    #[inline]
    pub fn get(key: impl Into<String>) -> Self {
        Self::new(ObjectStoreOp::GetObject, key)
    }

    pub fn new(op: ObjectStoreOp, key: impl Into<String>) -> Self {
        Self { op,
               key: key.into(),
               value_name: None,
               object_store_name: None,
               version: None }
    }

    pub fn with_value_name(mut self, value_name: impl Into<String>) -> Self {
        self.value_name = Some(value_name.into());
        self
    }

    pub fn with_store_name(mut self, name: impl Into<String>) -> Self {
        self.object_store_name = Some(name.into());
        self
    }

    pub fn with_version(mut self, version: Option<&str>) -> Self {
        self.version = version.map(str::to_string);
        self
    }
}

/// Operación realizada contra un asset store (output manager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetStoreOp {
    SetAsset,
    GetAsset,
}

/// Registro de una interacción con un output manager: qué handle se escribió
/// o leyó, bajo qué clave de manager y con qué metadata declarada.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetStoreRecord {
    pub op: AssetStoreOp,
    pub handle: StepOutputHandle,
    pub manager_key: String,
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl AssetStoreRecord {
    pub fn set(handle: StepOutputHandle, manager_key: impl Into<String>, metadata: Option<Value>) -> Self {
        Self { op: AssetStoreOp::SetAsset,
               handle,
               manager_key: manager_key.into(),
               metadata }
    }

    pub fn get(handle: StepOutputHandle, manager_key: impl Into<String>) -> Self {
        Self { op: AssetStoreOp::GetAsset,
               handle,
               manager_key: manager_key.into(),
               metadata: None }
    }
}
