//! Tipos declarados de serie sobre el discriminante JSON.
//!
//! Cada tipo valida únicamente la forma del `Value` recibido (número, string,
//! objeto...). La semántica de negocio queda para predicados propios del
//! usuario; estos cubren el caso común de "llegó el shape correcto". Todos
//! devuelven el check canónico `{success, description?}` que el motor acepta
//! sin coerción.

use std::sync::Arc;

use pipeflow_core::{PipeType, StepContext, TypePredicate, UserError};
use serde_json::{json, Value};

/// Nombre del discriminante JSON de un valor, para descripciones de checks.
fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Predicado que exige un discriminante JSON concreto.
struct KindPredicate {
    expected: &'static str,
    accepts: fn(&Value) -> bool,
}

impl TypePredicate for KindPredicate {
    fn check(&self, _ctx: &StepContext<'_>, value: &Value) -> Result<Value, UserError> {
        if (self.accepts)(value) {
            Ok(json!({ "success": true }))
        } else {
            Ok(json!({
                "success": false,
                "description": format!("expected a value of kind {}, got {}", self.expected, kind_of(value)),
            }))
        }
    }
}

fn kind_type(name: &'static str, expected: &'static str, accepts: fn(&Value) -> bool) -> Arc<PipeType> {
    Arc::new(PipeType::new(name, Arc::new(KindPredicate { expected, accepts })))
}

pub fn number() -> Arc<PipeType> {
    kind_type("Number", "number", Value::is_number)
}

pub fn string() -> Arc<PipeType> {
    kind_type("String", "string", Value::is_string)
}

pub fn boolean() -> Arc<PipeType> {
    kind_type("Boolean", "boolean", Value::is_boolean)
}

pub fn object() -> Arc<PipeType> {
    kind_type("Object", "object", Value::is_object)
}

pub fn array() -> Arc<PipeType> {
    kind_type("Array", "array", Value::is_array)
}

/// Objeto con claves obligatorias. El check fallido lista las claves
/// ausentes en la descripción y en una entrada de metadata `missing_keys`.
pub fn schema_object(name: impl Into<String>, required: &[&str]) -> Arc<PipeType> {
    let required = required.iter().map(|k| k.to_string()).collect();
    Arc::new(PipeType::new(name, Arc::new(SchemaPredicate { required })))
}

struct SchemaPredicate {
    required: Vec<String>,
}

impl TypePredicate for SchemaPredicate {
    fn check(&self, _ctx: &StepContext<'_>, value: &Value) -> Result<Value, UserError> {
        let map = match value.as_object() {
            Some(map) => map,
            None => {
                return Ok(json!({
                    "success": false,
                    "description": format!("expected a value of kind object, got {}", kind_of(value)),
                }))
            }
        };
        let missing: Vec<&str> = self.required
                                     .iter()
                                     .filter(|k| !map.contains_key(k.as_str()))
                                     .map(|k| k.as_str())
                                     .collect();
        if missing.is_empty() {
            return Ok(json!({ "success": true }));
        }
        Ok(json!({
            "success": false,
            "description": format!("missing required keys: {}", missing.join(", ")),
            "metadata_entries": [{ "label": "missing_keys", "value": missing }],
        }))
    }
}
