//! Resolución de materializaciones configuradas en la run config.
//!
//! Después de persistir un output, el motor recorre la jerarquía de
//! composición desde el handle del step hacia la raíz buscando un spec de
//! materialización para ese output. El nivel configurado más interno gana y
//! corta el recorrido; la ausencia en un nivel no lo corta.
use serde_json::Value;

use crate::engine::boundary::user_code_boundary;
use crate::engine::persist::coerce_materialization;
use crate::errors::{StepExecutionError, UserCodeScope};
use crate::event::StepEventKind;
use crate::model::context::StepContext;
use crate::model::step::OutputDef;

pub(crate) fn materialization_events(ctx: &StepContext<'_>,
                                     def: &OutputDef,
                                     value: &Value)
                                     -> Result<Vec<StepEventKind>, StepExecutionError> {
    for level in ctx.handles.ancestors(ctx.step.solid_handle) {
        let path = ctx.handles.path(level);
        let Some(solid_config) = ctx.run_config.solid(&path) else {
            continue;
        };
        let Some(spec) = solid_config.spec_for(&def.name) else {
            continue;
        };

        let materializer = def.pipe_type.materializer().ok_or_else(|| {
                                                           StepExecutionError::invariant(format!(
                "output \"{}\" of type \"{}\" has a materialization configured at \"{path}\" but the type has no materializer",
                def.name,
                def.pipe_type.name()
            ))
                                                       })?;

        let declared = user_code_boundary(ctx,
                                          UserCodeScope::Materializer,
                                          || {
                                              format!("materializer for type \"{}\" on output \"{}\"",
                                                      def.pipe_type.name(),
                                                      def.name)
                                          },
                                          || materializer.materialize(ctx, &spec.spec, value))?;

        let mut kinds = Vec::with_capacity(declared.len());
        for raw in declared {
            let materialization = coerce_materialization(raw, &def.name)?;
            kinds.push(StepEventKind::StepMaterialization { materialization });
        }
        return Ok(kinds);
    }
    Ok(Vec::new())
}
