use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use splitkv_core::{field_value::FieldValue, ids::DefinitionId};
use splitkv_engine::DefinitionLoader;
use splitkv_storage::{DefinitionRecord, DefinitionSource, StorageError};

/// In-memory definition source that counts fetches and can be told to fail.
#[derive(Default)]
pub struct ScriptedSource {
    definitions: RefCell<BTreeMap<DefinitionId, DefinitionRecord>>,
    fetches: Cell<usize>,
    fail_after: Cell<Option<usize>>,
}

impl ScriptedSource {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn insert(&self, block_type: &str, fields: Vec<(&str, FieldValue)>) -> DefinitionId {
        let record = DefinitionRecord::new(
            block_type,
            fields
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        );
        let definition_id = record.definition_id;
        self.definitions.borrow_mut().insert(definition_id, record);
        definition_id
    }

    /// Simulates the definition being deleted out from under a block.
    pub fn remove(&self, definition_id: DefinitionId) {
        self.definitions.borrow_mut().remove(&definition_id);
    }

    /// Every fetch after the first `n` returns an error.
    pub fn fail_after(&self, n: usize) {
        self.fail_after.set(Some(n));
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }

    pub fn loader(self: &Rc<Self>, definition_id: DefinitionId) -> DefinitionLoader {
        let source: Rc<dyn DefinitionSource> = self.clone();
        DefinitionLoader::new(definition_id, source)
    }
}

impl DefinitionSource for ScriptedSource {
    fn fetch_definition(
        &self,
        definition_id: DefinitionId,
    ) -> Result<Option<DefinitionRecord>, StorageError> {
        let attempt = self.fetches.get() + 1;
        self.fetches.set(attempt);
        if self.fail_after.get().is_some_and(|limit| attempt > limit) {
            return Err(StorageError::Serialization(format!(
                "scripted failure on fetch {attempt}"
            )));
        }
        Ok(self.definitions.borrow().get(&definition_id).cloned())
    }
}
