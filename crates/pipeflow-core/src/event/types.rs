//! Tipos de evento del ciclo de vida de un step y envoltura `StepEvent`.
//!
//! Rol en la ejecución:
//! - Cada intento produce un stream ordenado de `StepEvent`s que la
//!   persistencia de run-logs (externa) consume tal cual.
//! - El enum `StepEventKind` define el contrato observable y estable del
//!   secuenciador; es cerrado y todo sitio de consumo matchea exhaustivo.
//! - Los eventos se construyen frescos por intento y no se mutan después de
//!   emitidos.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{AssetMaterialization, AssetStoreRecord, ExpectationResult, ObjectStoreRecord, StepOutputHandle,
                   TypeCheckData};

/// Eventos del ciclo de vida de un intento.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StepEventKind {
    /// Primer evento de un primer intento.
    StepStarted,
    /// Primer evento de un re-intento; transporta cuántos intentos previos
    /// hubo.
    StepRestarted { prior_attempts: u32 },
    /// Un input resuelto pasó por su type check. Se emite incluso si el
    /// check falló (el error llega después del evento).
    StepInput { input_name: String, check: TypeCheckData },
    /// Un output producido pasó por su type check. Igual que `StepInput`,
    /// se emite incluso en fallo; `version` viene del mapa precomputado.
    StepOutput {
        handle: StepOutputHandle,
        check: TypeCheckData,
        version: Option<String>,
    },
    /// Materialización declarada (por compute, manager o materializer).
    StepMaterialization { materialization: AssetMaterialization },
    /// Resultado de expectativa declarado por el compute.
    StepExpectationResult { result: ExpectationResult },
    /// Interacción observada con el object store intermedio.
    ObjectStoreOperation { record: ObjectStoreRecord },
    /// Interacción observada con un asset store (output manager).
    AssetStoreOperation { record: AssetStoreRecord },
    /// Cierre exitoso del intento. `duration_ms` cubre compute y
    /// finalización de outputs, no la carga de inputs.
    StepSuccess { duration_ms: u64 },
}

/// Envoltura de un evento: identifica el run, el step y el solid que lo
/// produjo, con timestamp de emisión.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEvent {
    pub run_id: Uuid,
    pub step_key: String,
    pub solid: String, // path de composición ("outer.inner.load")
    pub ts: DateTime<Utc>,
    pub kind: StepEventKind,
}

impl StepEvent {
    pub fn now(run_id: Uuid, step_key: impl Into<String>, solid: impl Into<String>, kind: StepEventKind) -> Self {
        Self { run_id,
               step_key: step_key.into(),
               solid: solid.into(),
               ts: Utc::now(),
               kind }
    }
}
