//! Versionado de outputs: JSON canónico + blake3.
//!
//! La versión de un output se calcula sobre la representación canónica del
//! valor (claves de objeto ordenadas, sin espacios), de modo que dos valores
//! estructuralmente iguales produzcan siempre la misma versión sin importar
//! el orden de inserción de sus claves. El store de intermedios compara esas
//! versiones para decidir si una escritura puede saltarse.

use std::collections::BTreeMap;

use serde_json::Value;

/// Representación canónica de un `Value`: claves de objeto ordenadas,
/// strings escapados como JSON, sin espacios.
pub fn to_canonical_json(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => Value::String(s.clone()).to_string(),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(to_canonical_json).collect();
            format!("[{}]", parts.join(","))
        }
        Value::Object(map) => {
            let ordered: BTreeMap<&String, String> =
                map.iter().map(|(k, v)| (k, to_canonical_json(v))).collect();
            let parts: Vec<String> = ordered.into_iter()
                                            .map(|(k, v)| format!("{}:{}", Value::String(k.clone()), v))
                                            .collect();
            format!("{{{}}}", parts.join(","))
        }
    }
}

/// Hash blake3 en hex de un string.
fn hash_str(input: &str) -> String {
    blake3::hash(input.as_bytes()).to_hex().to_string()
}

/// Versión reproducible de un valor de output: blake3 del JSON canónico.
pub fn version_for(value: &Value) -> String {
    hash_str(&to_canonical_json(value))
}
