//! Vocabulario de valores que el código de usuario intercambia con el motor.
//!
//! Rol en la ejecución:
//! - El compute de un step produce `UserEvent`s (outputs, materializaciones,
//!   resultados de expectativas).
//! - Los predicados de tipo producen un `TypeCheck` canónico (o un valor
//!   suelto que el motor coerciona, ver `engine::typecheck`).
//! - Managers y materializers declaran `AssetMaterialization`s como JSON
//!   suelto; el motor las coerciona y rechaza formas no reconocibles.
//!
//! Todas las formas usan `#[serde(default)]` en los campos opcionales para
//! que la coerción desde `serde_json::Value` sea tolerante con campos
//! ausentes pero estricta con los obligatorios (`success`, `asset_key`).
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Entrada de metadata estructurada adjunta a checks, materializaciones y
/// resultados de expectativas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub value: Value,
}

impl MetadataEntry {
    pub fn new(label: impl Into<String>, value: Value) -> Self {
        Self { label: label.into(),
               description: None,
               value }
    }
}

/// Resultado canónico de un predicado de tipo. `success` es obligatorio;
/// cualquier retorno que no deserialice a esta forma se convierte en un
/// check fallido (nunca en un crash).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeCheck {
    pub success: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata_entries: Vec<MetadataEntry>,
}

impl TypeCheck {
    #[inline]
    pub fn passed() -> Self {
        Self { success: true,
               description: None,
               metadata_entries: Vec::new() }
    }

    #[inline]
    pub fn failed(description: impl Into<String>) -> Self {
        Self { success: false,
               description: Some(description.into()),
               metadata_entries: Vec::new() }
    }
}

/// Forma del check tal como viaja dentro de un evento (`StepInput` /
/// `StepOutput`): el check canónico más la etiqueta del tipo declarado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeCheckData {
    pub success: bool,
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata_entries: Vec<MetadataEntry>,
}

impl TypeCheckData {
    pub fn from_check(label: impl Into<String>, check: TypeCheck) -> Self {
        Self { success: check.success,
               label: label.into(),
               description: check.description,
               metadata_entries: check.metadata_entries }
    }
}

/// Registro de un artefacto persistido, para linaje y observabilidad.
/// `asset_key` es obligatorio; es el campo que distingue una
/// materialización real de un JSON arbitrario durante la coerción.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMaterialization {
    pub asset_key: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata_entries: Vec<MetadataEntry>,
    #[serde(default)]
    pub partition: Option<String>,
}

impl AssetMaterialization {
    pub fn new(asset_key: impl Into<String>) -> Self {
        Self { asset_key: asset_key.into(),
               description: None,
               metadata_entries: Vec::new(),
               partition: None }
    }
}

/// Resultado de una expectativa declarada por el compute (chequeo de calidad
/// de datos). No altera el control de flujo: se envuelve y se emite tal cual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectationResult {
    pub success: bool,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata_entries: Vec<MetadataEntry>,
}

/// Eventos que el compute de usuario puede producir. El enum es cerrado:
/// cualquier forma inesperada es irrepresentable por construcción.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UserEvent {
    /// Un output nombrado con su valor. El nombre debe corresponder a un
    /// `OutputDef` declarado y aparecer a lo sumo una vez.
    Output { output_name: String, value: Value },
    /// Materialización declarada directamente por el compute.
    Materialization(AssetMaterialization),
    /// Resultado de expectativa declarado por el compute.
    ExpectationResult(ExpectationResult),
}

impl UserEvent {
    #[inline]
    pub fn output(output_name: impl Into<String>, value: Value) -> Self {
        UserEvent::Output { output_name: output_name.into(),
                            value }
    }
}
