//! Run config relevante para esta capa: materializaciones declaradas por
//! solid. La config se direcciona por path de composición (`"outer.inner"`),
//! el mismo path que produce `HandleArena::path`.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Spec de materialización declarado por el usuario para un output de un
/// solid: par `output_name -> spec` que interpreta el materializer del tipo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterializerSpec {
    pub output_name: String,
    pub spec: Value,
}

impl MaterializerSpec {
    pub fn new(output_name: impl Into<String>, spec: Value) -> Self {
        Self { output_name: output_name.into(),
               spec }
    }
}

/// Config de un solid (o composite) individual.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolidConfig {
    #[serde(default)]
    pub outputs: Vec<MaterializerSpec>,
}

impl SolidConfig {
    pub fn with_output(mut self, spec: MaterializerSpec) -> Self {
        self.outputs.push(spec);
        self
    }

    /// Primer spec que matchea el output, en orden de declaración.
    pub fn spec_for(&self, output_name: &str) -> Option<&MaterializerSpec> {
        self.outputs.iter().find(|s| s.output_name == output_name)
    }
}

/// Run config de la ejecución, indexada por path de solid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub solids: HashMap<String, SolidConfig>,
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_solid(mut self, path: impl Into<String>, config: SolidConfig) -> Self {
        self.solids.insert(path.into(), config);
        self
    }

    #[inline]
    pub fn solid(&self, path: &str) -> Option<&SolidConfig> {
        self.solids.get(path)
    }
}
