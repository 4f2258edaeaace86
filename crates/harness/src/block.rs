use std::collections::BTreeMap;

use splitkv_core::{field_value::FieldValue, ids::BlockLocator};
use splitkv_engine::{DefinitionRef, InheritedSettings, SplitKvs};

/// Builds a `SplitKvs` for a block without spelling out every constructor argument.
pub struct BlockBuilder {
    location: BlockLocator,
    category: Option<String>,
    fields: BTreeMap<String, FieldValue>,
    inherited: BTreeMap<String, FieldValue>,
}

impl BlockBuilder {
    /// Category defaults to the locator's block type.
    pub fn new(block_type: &str, block_id: &str) -> Self {
        Self {
            location: BlockLocator::new(block_type, block_id),
            category: Some(block_type.to_string()),
            fields: BTreeMap::new(),
            inherited: BTreeMap::new(),
        }
    }

    pub fn category(mut self, category: Option<&str>) -> Self {
        self.category = category.map(str::to_string);
        self
    }

    pub fn field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn inherited(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.inherited.insert(name.to_string(), value.into());
        self
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn build(&self, definition: DefinitionRef) -> SplitKvs {
        SplitKvs::new(
            definition,
            &self.fields,
            InheritedSettings::new(self.inherited.clone()),
            self.location.clone(),
            self.category.clone(),
        )
    }
}
