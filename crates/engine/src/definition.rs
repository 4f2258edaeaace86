use std::collections::BTreeMap;
use std::fmt;
use std::mem;
use std::rc::Rc;

use splitkv_core::{field_value::FieldValue, ids::DefinitionId};
use splitkv_storage::{DefinitionRecord, DefinitionSource, StorageError};

use crate::error::EngineError;

/// Deferred reference to a persisted definition.
#[derive(Clone)]
pub struct DefinitionLoader {
    definition_id: DefinitionId,
    source: Rc<dyn DefinitionSource>,
}

impl DefinitionLoader {
    pub fn new(definition_id: DefinitionId, source: Rc<dyn DefinitionSource>) -> Self {
        Self {
            definition_id,
            source,
        }
    }

    pub fn definition_id(&self) -> DefinitionId {
        self.definition_id
    }

    pub fn fetch(&self) -> Result<Option<DefinitionRecord>, StorageError> {
        self.source.fetch_definition(self.definition_id)
    }
}

impl fmt::Debug for DefinitionLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DefinitionLoader({:?})", self.definition_id)
    }
}

/// How a store is told about its definition at construction.
#[derive(Debug, Clone)]
pub enum DefinitionRef {
    /// The definition's fields are already part of the supplied local fields.
    Loaded(DefinitionId),
    Lazy(DefinitionLoader),
}

/// Load state of a store's definition. Moves out of `Unresolved` at most once.
#[derive(Debug)]
pub enum DefinitionState {
    Unresolved(DefinitionLoader),
    /// A load was attempted and merged nothing: the definition was absent or the fetch failed.
    Empty(DefinitionId),
    Resolved(DefinitionId),
}

impl From<DefinitionRef> for DefinitionState {
    fn from(definition: DefinitionRef) -> Self {
        match definition {
            DefinitionRef::Loaded(definition_id) => Self::Resolved(definition_id),
            DefinitionRef::Lazy(loader) => Self::Unresolved(loader),
        }
    }
}

impl DefinitionState {
    pub fn definition_id(&self) -> DefinitionId {
        match self {
            Self::Unresolved(loader) => loader.definition_id(),
            Self::Empty(definition_id) | Self::Resolved(definition_id) => *definition_id,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved(_))
    }

    /// Fetch the definition if it hasn't been attempted yet and merge its fields
    /// underneath `fields`. Entries already in `fields` win.
    pub(crate) fn resolve(
        &mut self,
        fields: &mut BTreeMap<String, FieldValue>,
        reserved: &[&str],
    ) -> Result<(), EngineError> {
        let definition_id = self.definition_id();
        let loader = match mem::replace(self, Self::Empty(definition_id)) {
            Self::Unresolved(loader) => loader,
            settled => {
                *self = settled;
                return Ok(());
            }
        };

        tracing::debug!(%definition_id, "loading definition");
        match loader.fetch() {
            Ok(Some(record)) => {
                let mut merged = 0usize;
                for (name, value) in record.fields {
                    if reserved.contains(&name.as_str()) || fields.contains_key(&name) {
                        continue;
                    }
                    fields.insert(name, value);
                    merged += 1;
                }
                tracing::debug!(%definition_id, merged, "merged definition fields");
                *self = Self::Resolved(definition_id);
                Ok(())
            }
            Ok(None) => {
                tracing::debug!(%definition_id, "definition no longer exists");
                Ok(())
            }
            Err(source) => {
                tracing::warn!(%definition_id, error = %source, "definition fetch failed");
                Err(EngineError::FetchFailed {
                    definition_id,
                    source,
                })
            }
        }
    }
}
