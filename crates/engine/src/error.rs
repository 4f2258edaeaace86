use splitkv_core::{CoreError, DefinitionId, Scope};
use splitkv_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("scope {scope} is not valid for {operation}")]
    InvalidScope {
        scope: Scope,
        operation: &'static str,
    },

    #[error("{field} is reserved for block identity and can't be used for {operation} under {scope}")]
    ReservedName {
        scope: Scope,
        field: String,
        operation: &'static str,
    },

    #[error("failed to fetch definition {definition_id}: {source}")]
    FetchFailed {
        definition_id: DefinitionId,
        #[source]
        source: StorageError,
    },

    #[error("field {field} expects a {expected} value, got {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("core error: {0}")]
    Core(#[from] CoreError),
}
