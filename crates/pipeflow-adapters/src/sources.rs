//! Fuentes de input concretas sobre el trait neutral del core.
//!
//! - `ValueSource`: liga el input a un valor directo (literal de config,
//!   parámetro del plan).
//! - `StoreSource`: lee el output de un step previo desde el store intermedio
//!   del contexto, con su procedencia.
//! - `FanInSource`: agrega varias sub-fuentes en una colección fan-in que el
//!   motor aplana elemento a elemento.

use pipeflow_core::{InputSource, LoadedInput, LoadedValue, StepContext, StepExecutionError,
                    StepOutputHandle};
use serde_json::Value;

/// Valor directo, sin interacción con ningún store.
#[derive(Debug, Clone)]
pub struct ValueSource {
    value: Value,
}

impl ValueSource {
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

impl InputSource for ValueSource {
    fn load(&self, _ctx: &StepContext<'_>) -> Result<LoadedInput, StepExecutionError> {
        Ok(LoadedInput::Single(LoadedValue::Direct(self.value.clone())))
    }
}

/// Lee el output identificado por `handle` desde el store intermedio del
/// contexto. Un handle sin valor almacenado es un error de plan: el step
/// productor no corrió o no persistió su output.
#[derive(Debug, Clone)]
pub struct StoreSource {
    handle: StepOutputHandle,
}

impl StoreSource {
    pub fn new(handle: StepOutputHandle) -> Self {
        Self { handle }
    }

    pub fn for_output(step_key: impl Into<String>, output_name: impl Into<String>) -> Self {
        Self::new(StepOutputHandle::new(step_key, output_name))
    }
}

impl InputSource for StoreSource {
    fn load(&self, ctx: &StepContext<'_>) -> Result<LoadedInput, StepExecutionError> {
        match ctx.store.get(ctx, &self.handle)? {
            Some((value, record)) => Ok(LoadedInput::Single(LoadedValue::ObjectStore { record, value })),
            None => Err(StepExecutionError::invariant(format!(
                "no stored value for output \"{}\" of step \"{}\"",
                self.handle.output_name, self.handle.step_key
            ))),
        }
    }
}

/// Agrega sub-fuentes en una colección fan-in. Cada sub-fuente aporta sus
/// valores en orden; las sub-colecciones se aplanan.
pub struct FanInSource {
    sources: Vec<Box<dyn InputSource>>,
}

impl FanInSource {
    pub fn new(sources: Vec<Box<dyn InputSource>>) -> Self {
        Self { sources }
    }

    /// Fan-in sobre los outputs almacenados de varios steps previos.
    pub fn over_outputs(handles: impl IntoIterator<Item = StepOutputHandle>) -> Self {
        let sources = handles.into_iter()
                             .map(|h| Box::new(StoreSource::new(h)) as Box<dyn InputSource>)
                             .collect();
        Self::new(sources)
    }
}

impl InputSource for FanInSource {
    fn load(&self, ctx: &StepContext<'_>) -> Result<LoadedInput, StepExecutionError> {
        let mut items = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            match source.load(ctx)? {
                LoadedInput::Single(item) => items.push(item),
                LoadedInput::FanIn(nested) => items.extend(nested),
            }
        }
        Ok(LoadedInput::FanIn(items))
    }
}
