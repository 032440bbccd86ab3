//! Carga de inputs vía la fuente externa de cada declaración.
//!
//! Las interacciones de store reportadas por la fuente se convierten en
//! kinds de evento (estampados con el nombre del input); las colecciones
//! fan-in se aplanan al array de sus valores en orden, un evento por
//! elemento con procedencia propia.
use serde_json::Value;

use crate::errors::StepExecutionError;
use crate::event::StepEventKind;
use crate::model::context::StepContext;
use crate::model::step::InputDef;
use crate::storage::source::{LoadedInput, LoadedValue};

pub(crate) struct ResolvedInput {
    pub kinds: Vec<StepEventKind>,
    pub value: Value,
}

pub(crate) fn load_input(ctx: &StepContext<'_>, def: &InputDef) -> Result<ResolvedInput, StepExecutionError> {
    let loaded = def.source.load(ctx)?;
    let mut kinds = Vec::new();
    let value = match loaded {
        LoadedInput::Single(loaded_value) => unwrap_value(&mut kinds, loaded_value, &def.name),
        LoadedInput::FanIn(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(unwrap_value(&mut kinds, item, &def.name));
            }
            Value::Array(values)
        }
    };
    Ok(ResolvedInput { kinds, value })
}

fn unwrap_value(kinds: &mut Vec<StepEventKind>, loaded: LoadedValue, input_name: &str) -> Value {
    match loaded {
        LoadedValue::Direct(value) => value,
        LoadedValue::ObjectStore { record, value } => {
            kinds.push(StepEventKind::ObjectStoreOperation { record: record.with_value_name(input_name) });
            value
        }
        LoadedValue::AssetStore { record, value } => {
            kinds.push(StepEventKind::AssetStoreOperation { record });
            value
        }
    }
}
