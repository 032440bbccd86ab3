//! Fuentes de input: el punto de integración con el loader externo.
//!
//! Una fuente entrega el valor ya resuelto de un input más los registros de
//! las interacciones de store que hicieron falta para obtenerlo. El
//! secuenciador convierte esos registros en eventos de observabilidad antes
//! de los type checks; las colecciones fan-in se aplanan elemento a elemento
//! conservando la procedencia de cada uno.
use serde_json::Value;

use crate::errors::StepExecutionError;
use crate::model::context::StepContext;
use crate::model::records::{AssetStoreRecord, ObjectStoreRecord};

/// Un valor cargado con su procedencia.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedValue {
    /// Valor directo (literal de config, output de otro step en memoria).
    Direct(Value),
    /// Valor leído del object store intermedio.
    ObjectStore { record: ObjectStoreRecord, value: Value },
    /// Valor leído a través de un asset store.
    AssetStore { record: AssetStoreRecord, value: Value },
}

/// Resultado de resolver un input declarado.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedInput {
    Single(LoadedValue),
    /// Colección fan-in: el input se liga al array de los valores en orden.
    FanIn(Vec<LoadedValue>),
}

/// Fuente de un input declarado.
pub trait InputSource {
    fn load(&self, ctx: &StepContext<'_>) -> Result<LoadedInput, StepExecutionError>;
}
