//! Motor de ejecución por step: secuenciador, checker, boundary,
//! estrategias de persistencia y resolución de materializaciones.
mod boundary;
mod inputs;
mod materialize;
mod persist;
mod sequencer;
mod typecheck;

pub use sequencer::StepEventStream;
