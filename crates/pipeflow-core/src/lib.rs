//! pipeflow-core: núcleo de ejecución por step de una pipeline de datos.
//!
//! Dado un nodo compilado del plan (un step) con sus inputs resolubles,
//! produce el stream ordenado y perezoso de eventos del intento: start,
//! validación de inputs, compute de usuario, validación y persistencia de
//! outputs, materializaciones y success. El plan, el scheduler multi-step y
//! la persistencia de run-logs son colaboradores externos.
pub mod cancel;
pub mod engine;
pub mod errors;
pub mod event;
pub mod model;
pub mod storage;

pub use cancel::CancelToken;
pub use engine::StepEventStream;
pub use errors::{StepExecutionError, UserCodeScope, UserError};
pub use event::{StepEvent, StepEventKind};
pub use model::{AssetMaterialization, AssetStoreOp, AssetStoreRecord, ComputeFn, ExpectationResult, HandleArena,
                HandleId, InputDef, MaterializerSpec, MetadataEntry, ObjectStoreOp, ObjectStoreRecord, OutputContext,
                OutputDef, OutputKind, PipeType, Resources, ResolvedInputs, RunConfig, SolidConfig, Step, StepContext,
                StepOutputHandle, TypeCheck, TypeCheckData, TypeMaterializer, TypePredicate, UserEvent, UserEventIter};
pub use storage::{InMemoryIntermediateStore, InputSource, IntermediateStore, LoadedInput, LoadedValue, OutputManager};
