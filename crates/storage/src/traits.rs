use std::collections::BTreeMap;

use splitkv_core::{field_value::FieldValue, ids::DefinitionId};

use crate::error::StorageError;

/// A block's persisted content fields, stored apart from its settings and children.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionRecord {
    pub definition_id: DefinitionId,
    pub block_type: String,
    pub fields: BTreeMap<String, FieldValue>,
}

impl DefinitionRecord {
    pub fn new(block_type: impl Into<String>, fields: BTreeMap<String, FieldValue>) -> Self {
        Self {
            definition_id: DefinitionId::new(),
            block_type: block_type.into(),
            fields,
        }
    }
}

/// Read side of the definition store, all a lazy loader needs.
///
/// `Ok(None)` means the definition does not exist (for instance it was deleted
/// after the block was materialized). `Err` is a failed fetch.
pub trait DefinitionSource {
    fn fetch_definition(
        &self,
        definition_id: DefinitionId,
    ) -> Result<Option<DefinitionRecord>, StorageError>;
}

pub trait DefinitionStore: DefinitionSource {
    /// Insert or replace a definition.
    fn put_definition(&mut self, record: &DefinitionRecord) -> Result<(), StorageError>;

    /// Returns whether a definition was removed.
    fn delete_definition(&mut self, definition_id: DefinitionId) -> Result<bool, StorageError>;

    fn definition_count(&self) -> Result<u64, StorageError>;
}
