pub mod definition;
pub mod error;
pub mod inheritance;
pub mod kvs;

pub use definition::{DefinitionLoader, DefinitionRef, DefinitionState};
pub use error::EngineError;
pub use inheritance::InheritedSettings;
pub use kvs::{Lookup, SplitKvs};
