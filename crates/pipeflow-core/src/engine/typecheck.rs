//! Evaluación de type checks con coerción a la forma canónica.
use serde_json::Value;

use crate::engine::boundary::user_code_boundary;
use crate::errors::{StepExecutionError, UserCodeScope};
use crate::model::context::StepContext;
use crate::model::types::PipeType;
use crate::model::values::TypeCheck;

/// Nombre del kind JSON de un valor, para diagnósticos.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Corre el predicado del tipo sobre `value` y normaliza el resultado.
///
/// El predicado corre dentro del boundary: un `UserError` del predicado
/// propaga como error (sin evento). Un retorno que no deserializa a
/// `TypeCheck` se convierte en un check fallido cuya descripción nombra el
/// tipo declarado, el kind del retorno y el kind del valor; ese camino nunca
/// falla.
pub(crate) fn do_type_check(ctx: &StepContext<'_>,
                            pipe_type: &PipeType,
                            value: &Value)
                            -> Result<TypeCheck, StepExecutionError> {
    let raw = user_code_boundary(ctx,
                                 UserCodeScope::TypeCheck,
                                 || format!("type check for \"{}\"", pipe_type.name()),
                                 || pipe_type.predicate().check(ctx, value))?;
    Ok(coerce_check(pipe_type, raw, value))
}

fn coerce_check(pipe_type: &PipeType, raw: Value, value: &Value) -> TypeCheck {
    let raw_kind = json_kind(&raw);
    match serde_json::from_value::<TypeCheck>(raw) {
        Ok(check) => check,
        Err(_) => TypeCheck::failed(format!(
            "type check for \"{}\" returned a value of kind {raw_kind} instead of a type check, for a value of kind {}",
            pipe_type.name(),
            json_kind(value)
        )),
    }
}
