//! Modelo neutral del step y su vocabulario de valores.
pub mod config;
pub mod context;
pub mod handle;
pub mod records;
pub mod step;
pub mod types;
pub mod values;

pub use config::{MaterializerSpec, RunConfig, SolidConfig};
pub use context::{OutputContext, Resources, StepContext};
pub use handle::{HandleArena, HandleId, StepOutputHandle};
pub use records::{AssetStoreOp, AssetStoreRecord, ObjectStoreOp, ObjectStoreRecord};
pub use step::{ComputeFn, InputDef, OutputDef, OutputKind, ResolvedInputs, Step, UserEventIter};
pub use types::{PipeType, TypeMaterializer, TypePredicate};
pub use values::{AssetMaterialization, ExpectationResult, MetadataEntry, TypeCheck, TypeCheckData, UserEvent};
