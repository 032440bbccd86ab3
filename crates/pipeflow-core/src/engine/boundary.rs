//! Error boundary alrededor del código de usuario.
//!
//! Toda invocación a código de usuario (predicados, compute, managers,
//! materializers) pasa por acá. `UserError::Fatal` se convierte en
//! `StepExecutionError::UserCode` con diagnóstico de step/solid; las señales
//! `ExplicitFailure` y `RetryRequested` atraviesan sin modificarse para que
//! el executor externo las interprete como desenlaces intencionales.
use crate::errors::{StepExecutionError, UserCodeScope, UserError};
use crate::model::context::StepContext;

/// Ejecuta `f` dentro del boundary. `describe` se evalúa sólo en fallo.
pub(crate) fn user_code_boundary<T>(ctx: &StepContext<'_>,
                                    scope: UserCodeScope,
                                    describe: impl FnOnce() -> String,
                                    f: impl FnOnce() -> Result<T, UserError>)
                                    -> Result<T, StepExecutionError> {
    f().map_err(|err| map_user_error(ctx, scope, describe, err))
}

/// Mapea un `UserError` ya obtenido (p. ej. un item de la secuencia de
/// eventos de usuario) a su error de ejecución.
pub(crate) fn map_user_error(ctx: &StepContext<'_>,
                             scope: UserCodeScope,
                             describe: impl FnOnce() -> String,
                             err: UserError)
                             -> StepExecutionError {
    match err {
        UserError::Fatal(message) => StepExecutionError::UserCode { scope,
                                                                    step_key: ctx.step.key.clone(),
                                                                    solid: ctx.solid_path(),
                                                                    message: format!("{}: {message}", describe()) },
        UserError::ExplicitFailure { description, metadata_entries } => {
            StepExecutionError::ExplicitFailure { description, metadata_entries }
        }
        UserError::RetryRequested { max_retries, seconds_to_wait } => {
            StepExecutionError::RetryRequested { max_retries, seconds_to_wait }
        }
    }
}
