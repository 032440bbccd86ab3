//! Contrato observable del secuenciador.
pub mod types;

pub use types::{StepEvent, StepEventKind};
