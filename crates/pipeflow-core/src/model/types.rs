//! Tipos declarados de la pipeline y sus superficies de usuario.
//!
//! Un `PipeType` agrupa lo que el motor necesita de un tipo declarado:
//! - el predicado que valida valores (código de usuario, corre dentro del
//!   error boundary),
//! - el materializer opcional que la run config puede invocar,
//! - la marca "nothing" (tipos que sólo expresan dependencia, sin valor).
//!
//! El motor nunca interpreta el payload: los valores son `serde_json::Value`
//! y la semántica vive en predicados/materializers.
use std::sync::Arc;

use serde_json::{json, Value};

use crate::errors::UserError;
use crate::model::context::StepContext;

/// Predicado de un tipo declarado. El retorno es JSON suelto: la forma
/// canónica (`TypeCheck`) se acepta directa y cualquier otra forma se
/// coerciona a un check fallido. `Err` es código de usuario roto y pasa por
/// el boundary.
pub trait TypePredicate {
    fn check(&self, ctx: &StepContext<'_>, value: &Value) -> Result<Value, UserError>;
}

/// Materializer de un tipo declarado: produce cero o más materializaciones
/// (JSON suelto, coercionado por el motor) a partir de un spec de la run
/// config y el valor del output.
pub trait TypeMaterializer {
    fn materialize(&self, ctx: &StepContext<'_>, spec: &Value, value: &Value) -> Result<Vec<Value>, UserError>;
}

/// Tipo declarado de un input/output.
#[derive(Clone)]
pub struct PipeType {
    name: String,
    nothing: bool,
    predicate: Arc<dyn TypePredicate>,
    materializer: Option<Arc<dyn TypeMaterializer>>,
}

impl PipeType {
    pub fn new(name: impl Into<String>, predicate: Arc<dyn TypePredicate>) -> Self {
        Self { name: name.into(),
               nothing: false,
               predicate,
               materializer: None }
    }

    /// Tipo que acepta cualquier valor.
    pub fn any() -> Self {
        Self::new("Any", Arc::new(AcceptAny))
    }

    /// Tipo "nothing": expresa dependencia sin transportar valor. Los inputs
    /// de este tipo se saltean al cargar y los outputs no vistos se
    /// sintetizan con valor nulo.
    pub fn nothing() -> Self {
        let mut t = Self::new("Nothing", Arc::new(AcceptAny));
        t.nothing = true;
        t
    }

    pub fn with_materializer(mut self, materializer: Arc<dyn TypeMaterializer>) -> Self {
        self.materializer = Some(materializer);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn is_nothing(&self) -> bool {
        self.nothing
    }

    #[inline]
    pub fn predicate(&self) -> &dyn TypePredicate {
        self.predicate.as_ref()
    }

    #[inline]
    pub fn materializer(&self) -> Option<&dyn TypeMaterializer> {
        self.materializer.as_deref()
    }
}

impl std::fmt::Debug for PipeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeType")
         .field("name", &self.name)
         .field("nothing", &self.nothing)
         .field("has_materializer", &self.materializer.is_some())
         .finish()
    }
}

/// Predicado que acepta todo; respaldo de `Any` y `Nothing`.
struct AcceptAny;

impl TypePredicate for AcceptAny {
    fn check(&self, _ctx: &StepContext<'_>, _value: &Value) -> Result<Value, UserError> {
        Ok(json!({ "success": true }))
    }
}
