//! Errores del motor de ejecución por step.
//!
//! Dos familias:
//! - `UserError`: lo que devuelve el código de usuario (predicados, compute,
//!   managers, materializers). `Fatal` es un bug del usuario;
//!   `ExplicitFailure` y `RetryRequested` son señales intencionales de
//!   control de flujo.
//! - `StepExecutionError`: el error terminal del stream de eventos, que el
//!   executor externo matchea para decidir fallar o reintentar.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::MetadataEntry;

/// Resultado de error del código de usuario. El boundary convierte `Fatal`
/// en `StepExecutionError::UserCode` y deja pasar las dos señales sin tocar.
#[derive(Debug, Error, PartialEq, Clone, Serialize, Deserialize)]
pub enum UserError {
    #[error("{0}")]
    Fatal(String),
    #[error("explicit failure signaled by user code")]
    ExplicitFailure {
        description: Option<String>,
        metadata_entries: Vec<MetadataEntry>,
    },
    #[error("retry requested by user code (max_retries={max_retries})")]
    RetryRequested { max_retries: u32, seconds_to_wait: Option<u64> },
}

impl UserError {
    #[inline]
    pub fn fatal(message: impl Into<String>) -> Self {
        UserError::Fatal(message.into())
    }

    pub fn explicit_failure(description: impl Into<String>) -> Self {
        UserError::ExplicitFailure { description: Some(description.into()),
                                     metadata_entries: Vec::new() }
    }
}

/// Superficie de usuario en la que ocurrió un error fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserCodeScope {
    Compute,
    TypeCheck,
    OutputManager,
    Materializer,
}

impl std::fmt::Display for UserCodeScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UserCodeScope::Compute => "compute function",
            UserCodeScope::TypeCheck => "type check",
            UserCodeScope::OutputManager => "output manager",
            UserCodeScope::Materializer => "materializer",
        };
        f.write_str(s)
    }
}

/// Error terminal de un intento de ejecución. Siempre es el último item del
/// stream; nunca un evento emitido.
#[derive(Debug, Error, PartialEq, Clone, Serialize, Deserialize)]
pub enum StepExecutionError {
    /// Bug aguas arriba de este núcleo (plan o config malformados, output no
    /// declarado o duplicado, materialización no reconocible). Nunca se
    /// reintenta.
    #[error("invariant violation: {message}")]
    InvariantViolation { message: String },
    /// Un output requerido nunca apareció en la secuencia de usuario.
    #[error("step \"{step_key}\" did not produce required output \"{output_name}\"")]
    MissingOutput { step_key: String, output_name: String },
    /// Un input u output no pasó el predicado de su tipo. El evento con el
    /// check fallido ya fue emitido.
    #[error("type check failed: {description}")]
    TypeCheckFailed {
        description: String,
        metadata_entries: Vec<MetadataEntry>,
    },
    /// `UserError::Fatal` de cualquier superficie de usuario, con
    /// diagnóstico de step y solid.
    #[error("error in {scope} for step \"{step_key}\" (solid \"{solid}\"): {message}")]
    UserCode {
        scope: UserCodeScope,
        step_key: String,
        solid: String,
        message: String,
    },
    /// Señal intencional: el executor externo decide el desenlace.
    #[error("explicit failure signaled by user code")]
    ExplicitFailure {
        description: Option<String>,
        metadata_entries: Vec<MetadataEntry>,
    },
    /// Señal intencional: el executor externo decide si re-intentar.
    #[error("retry requested by user code (max_retries={max_retries})")]
    RetryRequested { max_retries: u32, seconds_to_wait: Option<u64> },
    /// Cancelación observada entre producciones de eventos de usuario.
    #[error("step execution interrupted")]
    Interrupted,
    /// Falla de I/O de un backend de almacenamiento intermedio.
    #[error("intermediate storage failure: {message}")]
    StorageFailure { message: String },
}

impl StepExecutionError {
    #[inline]
    pub fn invariant(message: impl Into<String>) -> Self {
        StepExecutionError::InvariantViolation { message: message.into() }
    }

    #[inline]
    pub fn storage(message: impl Into<String>) -> Self {
        StepExecutionError::StorageFailure { message: message.into() }
    }
}
