//! Superficies de capacidad consumidas por el motor: stores, managers y
//! fuentes de input. Los traits viven acá junto a la implementación en
//! memoria de referencia; los backends concretos viven en adapters.
pub mod intermediate;
pub mod manager;
pub mod source;

pub use intermediate::{InMemoryIntermediateStore, IntermediateStore};
pub use manager::OutputManager;
pub use source::{InputSource, LoadedInput, LoadedValue};
