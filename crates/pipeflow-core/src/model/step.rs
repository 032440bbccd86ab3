//! Descriptores de un step compilado: inputs, outputs y compute.
//!
//! Un `Step` es inmutable después de la compilación del plan: el plan lo
//! posee y el `StepContext` lo referencia. El motor recorre `inputs` y
//! `outputs` en el orden declarado.
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::UserError;
use crate::model::context::StepContext;
use crate::model::handle::HandleId;
use crate::model::types::PipeType;
use crate::model::values::UserEvent;
use crate::storage::source::InputSource;

/// Valores de input resueltos, en orden de declaración.
pub type ResolvedInputs = IndexMap<String, Value>;

/// Secuencia perezosa de eventos de usuario producida por un compute.
pub type UserEventIter = Box<dyn Iterator<Item = Result<UserEvent, UserError>>>;

/// Función de cómputo de un step. Recibe los inputs ya resueltos y devuelve
/// una secuencia perezosa de `UserEvent`s; el secuenciador la consume de a
/// uno, chequeando cancelación entre producciones.
pub trait ComputeFn {
    fn execute(&self, ctx: &StepContext<'_>, inputs: ResolvedInputs) -> Result<UserEventIter, UserError>;
}

impl<F> ComputeFn for F where F: Fn(&StepContext<'_>, ResolvedInputs) -> Result<UserEventIter, UserError>
{
    fn execute(&self, ctx: &StepContext<'_>, inputs: ResolvedInputs) -> Result<UserEventIter, UserError> {
        self(ctx, inputs)
    }
}

/// Clase de un output declarado. Decide qué pasa cuando el compute termina
/// sin haberlo producido: `Required` falta, `Optional` se saltea,
/// `NothingTyped` se sintetiza con valor nulo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputKind {
    Required,
    Optional,
    NothingTyped,
}

/// Input declarado: nombre, tipo y fuente externa que lo resuelve.
pub struct InputDef {
    pub name: String,
    pub pipe_type: Arc<PipeType>,
    pub source: Box<dyn InputSource>,
}

impl InputDef {
    pub fn new(name: impl Into<String>, pipe_type: Arc<PipeType>, source: Box<dyn InputSource>) -> Self {
        Self { name: name.into(),
               pipe_type,
               source }
    }
}

/// Output declarado. `manager_key` decide el backend de persistencia: con
/// clave va por el output manager homónimo de `Resources`, sin clave va por
/// el store intermedio versionado.
pub struct OutputDef {
    pub name: String,
    pub pipe_type: Arc<PipeType>,
    pub kind: OutputKind,
    pub manager_key: Option<String>,
    pub metadata: Option<Value>,
}

impl OutputDef {
    pub fn new(name: impl Into<String>, pipe_type: Arc<PipeType>) -> Self {
        Self { name: name.into(),
               pipe_type,
               kind: OutputKind::Required,
               manager_key: None,
               metadata: None }
    }

    /// Output de tipo "nothing": sólo expresa dependencia.
    pub fn nothing(name: impl Into<String>) -> Self {
        let mut def = Self::new(name, Arc::new(PipeType::nothing()));
        def.kind = OutputKind::NothingTyped;
        def
    }

    pub fn optional(mut self) -> Self {
        self.kind = OutputKind::Optional;
        self
    }

    pub fn with_manager(mut self, manager_key: impl Into<String>) -> Self {
        self.manager_key = Some(manager_key.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Nodo compilado del plan de ejecución.
pub struct Step {
    pub key: String,
    pub solid_handle: HandleId,
    pub inputs: Vec<InputDef>,
    pub outputs: Vec<OutputDef>,
    pub compute: Box<dyn ComputeFn>,
}

impl Step {
    pub fn new(key: impl Into<String>,
               solid_handle: HandleId,
               inputs: Vec<InputDef>,
               outputs: Vec<OutputDef>,
               compute: Box<dyn ComputeFn>)
               -> Self {
        Self { key: key.into(),
               solid_handle,
               inputs,
               outputs,
               compute }
    }

    pub fn input_def(&self, name: &str) -> Option<&InputDef> {
        self.inputs.iter().find(|i| i.name == name)
    }

    pub fn output_def(&self, name: &str) -> Option<&OutputDef> {
        self.outputs.iter().find(|o| o.name == name)
    }

    /// Nombres de output declarados, para diagnósticos.
    pub fn output_names(&self) -> Vec<&str> {
        self.outputs.iter().map(|o| o.name.as_str()).collect()
    }
}
