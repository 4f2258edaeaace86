use std::collections::BTreeMap;
use std::collections::btree_map;

use splitkv_core::field_value::FieldValue;

use crate::kvs::SplitKvs;

/// What each inheritable settings field would be on a block if it weren't set
/// there. Fixed for the lifetime of the store it is handed to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InheritedSettings {
    values: BTreeMap<String, FieldValue>,
}

impl InheritedSettings {
    pub fn new(values: BTreeMap<String, FieldValue>) -> Self {
        Self { values }
    }

    /// The snapshot a child of `parent` receives: for each inheritable name, the
    /// parent's own setting if it has one, otherwise whatever the parent inherited.
    pub fn for_child(parent: &SplitKvs, inheritable: &[&str]) -> Self {
        let values = inheritable
            .iter()
            .filter_map(|name| {
                parent
                    .local_fields()
                    .get(*name)
                    .or_else(|| parent.inherited_settings().get(name))
                    .map(|value| (name.to_string(), value.clone()))
            })
            .collect();
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, FieldValue> {
        self.values.iter()
    }
}

impl FromIterator<(String, FieldValue)> for InheritedSettings {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a InheritedSettings {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = btree_map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
