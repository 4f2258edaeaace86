pub mod error;
pub mod field_value;
pub mod ids;
pub mod scope;

pub use error::CoreError;
pub use field_value::FieldValue;
pub use ids::*;
pub use scope::{FieldKey, Provenance, Scope};
