//! Contextos de ejecución entregados al motor y al código de usuario.
use std::collections::HashMap;

use serde_json::Value;
use uuid::Uuid;

use crate::model::config::RunConfig;
use crate::model::handle::{HandleArena, StepOutputHandle};
use crate::model::step::Step;
use crate::storage::intermediate::IntermediateStore;
use crate::storage::manager::OutputManager;

/// Recursos compartidos de la ejecución, poseídos externamente. El motor
/// sólo invoca sus operaciones; nunca los reconfigura.
#[derive(Default)]
pub struct Resources {
    output_managers: HashMap<String, Box<dyn OutputManager>>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_manager(mut self, key: impl Into<String>, manager: Box<dyn OutputManager>) -> Self {
        self.output_managers.insert(key.into(), manager);
        self
    }

    pub fn manager(&self, key: &str) -> Option<&dyn OutputManager> {
        self.output_managers.get(key).map(|m| m.as_ref())
    }
}

/// Contexto de sólo lectura de un intento de ejecución de un step.
///
/// Todo es prestado del plan/executor externo: el contexto no posee nada y
/// dos intentos nunca comparten uno concurrentemente.
pub struct StepContext<'a> {
    pub run_id: Uuid,
    pub step: &'a Step,
    pub handles: &'a HandleArena,
    pub run_config: &'a RunConfig,
    pub resources: &'a Resources,
    pub store: &'a dyn IntermediateStore,
    /// Versiones precomputadas por handle; ausencia = sin versionar.
    pub versions: &'a HashMap<StepOutputHandle, String>,
}

impl StepContext<'_> {
    /// Path de composición del solid del step (`"outer.inner.load"`).
    pub fn solid_path(&self) -> String {
        self.handles.path(self.step.solid_handle)
    }

    /// Versión precomputada para un output de este step, si hay.
    pub fn version_for(&self, output_name: &str) -> Option<&str> {
        let handle = StepOutputHandle::new(self.step.key.clone(), output_name);
        self.versions.get(&handle).map(String::as_str)
    }
}

/// Contexto de escritura entregado a un `OutputManager::handle_output`.
#[derive(Debug, Clone)]
pub struct OutputContext {
    pub run_id: Uuid,
    pub handle: StepOutputHandle,
    pub metadata: Option<Value>,
    pub version: Option<String>,
}
