//! Output managers: backend enchufable de persistencia por output.
use serde_json::Value;

use crate::errors::UserError;
use crate::model::context::OutputContext;

/// Backend que escribe un output y opcionalmente declara materializaciones.
///
/// El retorno es JSON suelto: cada valor debe coercionar a
/// `AssetMaterialization` o la persistencia falla con violación de
/// invariante. Es código de usuario; corre dentro del error boundary.
pub trait OutputManager {
    fn handle_output(&self, ctx: &OutputContext, value: &Value) -> Result<Vec<Value>, UserError>;
}
