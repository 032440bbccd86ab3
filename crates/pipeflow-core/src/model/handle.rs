//! Direccionamiento de outputs y jerarquía de composición.
//!
//! - `StepOutputHandle` identifica un artefacto producido: `(step_key,
//!   output_name)`. Es la clave de versionado y de almacenamiento intermedio.
//! - `HandleArena` modela el árbol de composición de la pipeline como un
//!   arena de nodos con índice de padre explícito: el recorrido de ancestros
//!   que usa el resolver de materializaciones es un recorrido por índices,
//!   no una búsqueda dinámica.
use serde::{Deserialize, Serialize};

/// Identifica un artefacto producido por un step: `(step_key, output_name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepOutputHandle {
    pub step_key: String,
    pub output_name: String,
}

impl StepOutputHandle {
    #[inline]
    pub fn new(step_key: impl Into<String>, output_name: impl Into<String>) -> Self {
        Self { step_key: step_key.into(),
               output_name: output_name.into() }
    }

    /// Clave plana bajo la que los stores intermedios direccionan el valor.
    pub fn storage_key(&self) -> String {
        format!("intermediates/{}/{}", self.step_key, self.output_name)
    }
}

/// Índice de un nodo dentro del `HandleArena`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandleId(pub usize);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HandleNode {
    name: String,
    parent: Option<HandleId>,
}

/// Árbol de composición de solids (posiblemente anidados en composites).
/// Los nodos se insertan en orden raíz → hojas durante la compilación del
/// plan; después es de sólo lectura.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandleArena {
    nodes: Vec<HandleNode>,
}

impl HandleArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserta un nodo raíz (solid de nivel superior).
    pub fn root(&mut self, name: impl Into<String>) -> HandleId {
        self.push(name.into(), None)
    }

    /// Inserta un hijo bajo `parent`.
    pub fn child(&mut self, parent: HandleId, name: impl Into<String>) -> HandleId {
        self.push(name.into(), Some(parent))
    }

    fn push(&mut self, name: String, parent: Option<HandleId>) -> HandleId {
        let id = HandleId(self.nodes.len());
        self.nodes.push(HandleNode { name, parent });
        id
    }

    #[inline]
    pub fn name(&self, id: HandleId) -> &str {
        &self.nodes[id.0].name
    }

    #[inline]
    pub fn parent(&self, id: HandleId) -> Option<HandleId> {
        self.nodes[id.0].parent
    }

    /// Path raíz→nodo unido con `.`, p. ej. `"outer.inner.load"`. Es la clave
    /// con la que la run config direcciona un solid.
    pub fn path(&self, id: HandleId) -> String {
        let mut parts: Vec<&str> = Vec::new();
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            parts.push(self.name(node));
            cursor = self.parent(node);
        }
        parts.reverse();
        parts.join(".")
    }

    /// Ancestros de `id` empezando por el propio nodo y terminando en la
    /// raíz. Es el orden del recorrido "el más interno gana".
    pub fn ancestors(&self, id: HandleId) -> Ancestors<'_> {
        Ancestors { arena: self,
                    cursor: Some(id) }
    }
}

pub struct Ancestors<'a> {
    arena: &'a HandleArena,
    cursor: Option<HandleId>,
}

impl Iterator for Ancestors<'_> {
    type Item = HandleId;

    fn next(&mut self) -> Option<HandleId> {
        let current = self.cursor?;
        self.cursor = self.arena.parent(current);
        Some(current)
    }
}
