//! pipeflow-adapters: piezas concretas de usuario sobre el core neutral
//!
//! Este crate provee:
//! - Tipos declarados de serie (`number`, `string`, `boolean`, `object`,
//!   `array`, `schema_object`) con predicados sobre el discriminante JSON.
//! - `FsIntermediateStore`: store de intermedios respaldado por filesystem,
//!   un archivo JSON por handle, configurable vía `.env`/entorno.
//! - Fuentes de input (`ValueSource`, `StoreSource`, `FanInSource`) para
//!   alimentar steps desde valores directos o desde el store.
//! - Helper de versionado: JSON canónico + blake3 para versiones de output
//!   reproducibles.
//!
//! Nota: El core sólo conoce los traits (`TypePredicate`, `InputSource`,
//! `IntermediateStore`); aquí viven las implementaciones con opiniones.

pub mod fs_store;
pub mod sources;
pub mod types;
pub mod version;

pub use fs_store::{init_dotenv, FsIntermediateStore};
pub use sources::{FanInSource, StoreSource, ValueSource};
pub use types::{array, boolean, number, object, schema_object, string};
pub use version::{to_canonical_json, version_for};
