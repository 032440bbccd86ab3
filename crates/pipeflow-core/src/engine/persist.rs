//! Estrategias de persistencia de outputs.
//!
//! Exactamente un backend por output, elegido por configuración: con
//! `manager_key` el output va al output manager homónimo; sin clave va al
//! store intermedio versionado. Agregar un backend es agregar una
//! implementación del trait, sin tocar el secuenciador.
use serde_json::Value;

use crate::engine::boundary::user_code_boundary;
use crate::engine::typecheck::json_kind;
use crate::errors::{StepExecutionError, UserCodeScope};
use crate::event::StepEventKind;
use crate::model::context::{OutputContext, StepContext};
use crate::model::handle::StepOutputHandle;
use crate::model::records::AssetStoreRecord;
use crate::model::step::OutputDef;
use crate::model::values::AssetMaterialization;

/// Estrategia de escritura de un output finalizado. Devuelve los kinds de
/// evento a emitir, en orden.
pub(crate) trait OutputPersistence {
    fn persist(&self,
               ctx: &StepContext<'_>,
               def: &OutputDef,
               handle: &StepOutputHandle,
               value: &Value,
               version: Option<&str>)
               -> Result<Vec<StepEventKind>, StepExecutionError>;
}

/// Selección del backend, decidida sólo por la presencia de `manager_key`.
pub(crate) fn persistence_for(def: &OutputDef) -> &'static dyn OutputPersistence {
    if def.manager_key.is_some() {
        &ManagerPersistence
    } else {
        &StorePersistence
    }
}

/// Coerciona un JSON declarado por manager/materializer a
/// `AssetMaterialization`. Cualquier otra forma es un bug del código de
/// usuario aguas arriba: violación de invariante.
pub(crate) fn coerce_materialization(raw: Value, output_name: &str) -> Result<AssetMaterialization, StepExecutionError> {
    let kind = json_kind(&raw);
    serde_json::from_value(raw).map_err(|_| {
                                   StepExecutionError::invariant(format!(
            "materialization declared for output \"{output_name}\" is a value of kind {kind}, not an asset materialization"
        ))
                               })
}

/// Camino del output manager: `handle_output` dentro del boundary, las
/// materializaciones declaradas primero y al final el registro del SET en el
/// asset store.
pub(crate) struct ManagerPersistence;

impl OutputPersistence for ManagerPersistence {
    fn persist(&self,
               ctx: &StepContext<'_>,
               def: &OutputDef,
               handle: &StepOutputHandle,
               value: &Value,
               version: Option<&str>)
               -> Result<Vec<StepEventKind>, StepExecutionError> {
        let manager_key = def.manager_key.as_deref().ok_or_else(|| {
                                                        StepExecutionError::invariant(format!(
                "manager persistence selected for output \"{}\" without a manager key",
                def.name
            ))
                                                    })?;
        let manager = ctx.resources.manager(manager_key).ok_or_else(|| {
                                                            StepExecutionError::invariant(format!(
                "no output manager bound under key \"{manager_key}\" for output \"{}\" of step \"{}\"",
                def.name, ctx.step.key
            ))
                                                        })?;

        let out_ctx = OutputContext { run_id: ctx.run_id,
                                      handle: handle.clone(),
                                      metadata: def.metadata.clone(),
                                      version: version.map(str::to_string) };
        let declared = user_code_boundary(ctx,
                                          UserCodeScope::OutputManager,
                                          || format!("output manager \"{manager_key}\" handling output \"{}\"", def.name),
                                          || manager.handle_output(&out_ctx, value))?;

        let mut kinds = Vec::with_capacity(declared.len() + 1);
        for raw in declared {
            let materialization = coerce_materialization(raw, &def.name)?;
            kinds.push(StepEventKind::StepMaterialization { materialization });
        }
        kinds.push(StepEventKind::AssetStoreOperation { record: AssetStoreRecord::set(handle.clone(),
                                                                                      manager_key,
                                                                                      def.metadata.clone()) });
        Ok(kinds)
    }
}

/// Camino del store intermedio: `set` versionado; un registro reportado se
/// emite estampado con el nombre del output, un skip memoizado no emite.
pub(crate) struct StorePersistence;

impl OutputPersistence for StorePersistence {
    fn persist(&self,
               ctx: &StepContext<'_>,
               def: &OutputDef,
               handle: &StepOutputHandle,
               value: &Value,
               version: Option<&str>)
               -> Result<Vec<StepEventKind>, StepExecutionError> {
        let record = ctx.store.set(ctx, def.pipe_type.as_ref(), handle, value, version)?;
        Ok(match record {
            Some(record) => {
                vec![StepEventKind::ObjectStoreOperation { record: record.with_value_name(def.name.clone()) }]
            }
            None => Vec::new(),
        })
    }
}
