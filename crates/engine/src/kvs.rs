use std::collections::BTreeMap;

use splitkv_core::{
    field_value::FieldValue,
    ids::{BlockLocator, KvsId},
    scope::{FieldKey, Provenance, Scope},
};

use crate::definition::{DefinitionRef, DefinitionState};
use crate::error::EngineError;
use crate::inheritance::InheritedSettings;

const LOCATION: &str = "location";
const CATEGORY: &str = "category";

/// Identity fields live on the store itself and never in the local field map.
const IDENTITY_FIELDS: &[&str] = &[LOCATION, CATEGORY];

/// Outcome of a field lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(FieldValue),
    /// Nothing set, inherited or defined; the caller applies the field's default.
    NotFound,
    /// A parent-scope field with no value. Not an error.
    NoParent,
}

impl Lookup {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn into_option(self) -> Option<FieldValue> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound | Lookup::NoParent => None,
        }
    }
}

impl From<Option<&FieldValue>> for Lookup {
    fn from(value: Option<&FieldValue>) -> Self {
        value.cloned().map_or(Lookup::NotFound, Lookup::Found)
    }
}

/// Key-value store for one block, split across its definition (content),
/// its own settings and children, and the settings it inherits.
///
/// Lookups prefer a value set on the block, then a value inherited from an
/// ancestor; content fields not set locally come from the definition, which is
/// fetched the first time one is needed.
#[derive(Debug)]
pub struct SplitKvs {
    definition: DefinitionState,
    fields: BTreeMap<String, FieldValue>,
    inherited_settings: InheritedSettings,
    location: BlockLocator,
    category: Option<String>,
}

impl SplitKvs {
    /// `fields` is copied; later writes to the store don't touch the caller's map.
    pub fn new(
        definition: DefinitionRef,
        fields: &BTreeMap<String, FieldValue>,
        inherited_settings: InheritedSettings,
        location: BlockLocator,
        category: Option<String>,
    ) -> Self {
        let fields = fields
            .iter()
            .filter(|(name, _)| !IDENTITY_FIELDS.contains(&name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        Self {
            definition: definition.into(),
            fields,
            inherited_settings,
            location,
            category,
        }
    }

    pub fn id(&self) -> KvsId {
        KvsId {
            id: self.location.clone(),
            def_id: self.definition.definition_id(),
        }
    }

    pub fn location(&self) -> &BlockLocator {
        &self.location
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn definition_state(&self) -> &DefinitionState {
        &self.definition
    }

    /// Fields set on this block or loaded from its definition.
    pub fn local_fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn inherited_settings(&self) -> &InheritedSettings {
        &self.inherited_settings
    }

    pub fn get(&mut self, key: &FieldKey) -> Result<Lookup, EngineError> {
        if let Some(value) = self.fields.get(&key.name) {
            return Ok(Lookup::Found(value.clone()));
        }

        match key.scope {
            Scope::Parent => Ok(Lookup::NoParent),
            // Children are never read from the definition.
            Scope::Children => Ok(Lookup::NotFound),
            Scope::Settings => Ok(self.inherited_settings.get(&key.name).into()),
            Scope::Content => match key.name.as_str() {
                LOCATION => Ok(Lookup::Found(FieldValue::Locator(self.location.clone()))),
                CATEGORY => Ok(Lookup::Found(
                    self.category
                        .clone()
                        .map_or(FieldValue::Null, FieldValue::Text),
                )),
                _ => {
                    self.load_definition()?;
                    Ok(self.fields.get(&key.name).into())
                }
            },
        }
    }

    /// Resolve `key`, substituting `default` when nothing provides a value.
    pub fn get_or_default(
        &mut self,
        key: &FieldKey,
        default: FieldValue,
    ) -> Result<(FieldValue, Provenance), EngineError> {
        let value = self.get(key)?.into_option().unwrap_or(default);
        let provenance = self.field_value_provenance(key)?;
        Ok((value, provenance))
    }

    pub fn set(&mut self, key: &FieldKey, value: FieldValue) -> Result<(), EngineError> {
        match key.scope {
            Scope::Parent => {
                return Err(EngineError::InvalidScope {
                    scope: key.scope,
                    operation: "set",
                });
            }
            Scope::Content => match key.name.as_str() {
                LOCATION => {
                    self.location = match value {
                        FieldValue::Locator(locator) => locator,
                        other => {
                            return Err(EngineError::TypeMismatch {
                                field: key.name.clone(),
                                expected: "locator",
                                found: other.kind(),
                            });
                        }
                    };
                    return Ok(());
                }
                CATEGORY => {
                    // Category is fixed when the block is created.
                    tracing::trace!(location = %self.location, "ignoring write to category");
                    return Ok(());
                }
                // Load first so the write lands on top of the definition.
                _ => self.load_definition()?,
            },
            Scope::Settings | Scope::Children => Self::check_unreserved(key, "set")?,
        }

        self.fields.insert(key.name.clone(), value);
        Ok(())
    }

    /// Remove a locally bound value. Deleting an unset field is a no-op.
    pub fn delete(&mut self, key: &FieldKey) -> Result<(), EngineError> {
        match key.scope {
            Scope::Parent => {
                return Err(EngineError::InvalidScope {
                    scope: key.scope,
                    operation: "delete",
                });
            }
            Scope::Content => match key.name.as_str() {
                LOCATION | CATEGORY => {
                    tracing::trace!(location = %self.location, field = %key.name, "identity fields can't be deleted");
                    return Ok(());
                }
                _ => self.load_definition()?,
            },
            Scope::Settings | Scope::Children => Self::check_unreserved(key, "delete")?,
        }

        self.fields.remove(&key.name);
        Ok(())
    }

    /// Whether `key` is bound on this block, not counting inherited or default values.
    pub fn has(&mut self, key: &FieldKey) -> Result<bool, EngineError> {
        match key.scope {
            Scope::Content => match key.name.as_str() {
                LOCATION => return Ok(true),
                CATEGORY => return Ok(self.category.is_some()),
                _ => self.load_definition()?,
            },
            Scope::Parent => return Ok(true),
            Scope::Settings | Scope::Children => {}
        }

        Ok(self.fields.contains_key(&key.name))
    }

    pub fn field_value_provenance(&mut self, key: &FieldKey) -> Result<Provenance, EngineError> {
        match key.scope {
            Scope::Content => match key.name.as_str() {
                LOCATION | CATEGORY => Ok(Provenance::Local),
                _ => {
                    self.load_definition()?;
                    Ok(self.local_or_default(key))
                }
            },
            Scope::Parent => Ok(Provenance::Default),
            Scope::Settings => {
                if self.fields.contains_key(&key.name) {
                    Ok(Provenance::Local)
                } else if self.inherited_settings.contains(&key.name) {
                    Ok(Provenance::Inherited)
                } else {
                    Ok(Provenance::Default)
                }
            }
            Scope::Children => Ok(self.local_or_default(key)),
        }
    }

    /// Identity names only exist under content; nothing else may bind them locally.
    fn check_unreserved(key: &FieldKey, operation: &'static str) -> Result<(), EngineError> {
        if IDENTITY_FIELDS.contains(&key.name.as_str()) {
            return Err(EngineError::ReservedName {
                scope: key.scope,
                field: key.name.clone(),
                operation,
            });
        }
        Ok(())
    }

    fn local_or_default(&self, key: &FieldKey) -> Provenance {
        if self.fields.contains_key(&key.name) {
            Provenance::Local
        } else {
            Provenance::Default
        }
    }

    fn load_definition(&mut self) -> Result<(), EngineError> {
        self.definition.resolve(&mut self.fields, IDENTITY_FIELDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitkv_core::ids::DefinitionId;

    fn loaded_store(fields: &[(&str, FieldValue)], inherited: &[(&str, FieldValue)]) -> SplitKvs {
        let fields: BTreeMap<String, FieldValue> = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        let inherited = inherited
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        SplitKvs::new(
            DefinitionRef::Loaded(DefinitionId::new()),
            &fields,
            inherited,
            BlockLocator::new("vertical", "v1"),
            Some("vertical".to_string()),
        )
    }

    #[test]
    fn local_value_shadows_inheritance() {
        let mut kvs = loaded_store(
            &[("graded", true.into())],
            &[("graded", false.into())],
        );
        let key = FieldKey::settings("graded");
        assert_eq!(kvs.get(&key).unwrap(), Lookup::Found(FieldValue::Boolean(true)));
        assert_eq!(kvs.field_value_provenance(&key).unwrap(), Provenance::Local);
    }

    #[test]
    fn parent_and_children_fallbacks_differ() {
        let mut kvs = loaded_store(&[], &[]);
        assert_eq!(kvs.get(&FieldKey::parent("parent")).unwrap(), Lookup::NoParent);
        assert_eq!(kvs.get(&FieldKey::children("children")).unwrap(), Lookup::NotFound);
        assert!(kvs.has(&FieldKey::parent("parent")).unwrap());
        assert!(!kvs.has(&FieldKey::children("children")).unwrap());
    }

    #[test]
    fn parent_scope_is_read_only() {
        let mut kvs = loaded_store(&[], &[]);
        let key = FieldKey::parent("parent");
        let err = kvs.set(&key, FieldValue::Null).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidScope { scope: Scope::Parent, operation: "set" }
        ));
        let err = kvs.delete(&key).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidScope { scope: Scope::Parent, operation: "delete" }
        ));
    }

    #[test]
    fn identity_fields_are_dropped_from_supplied_fields() {
        let mut kvs = loaded_store(&[("location", "bogus".into()), ("category", "bogus".into())], &[]);
        assert!(kvs.local_fields().is_empty());
        assert_eq!(
            kvs.get(&FieldKey::content("location")).unwrap(),
            Lookup::Found(FieldValue::Locator(BlockLocator::new("vertical", "v1")))
        );
        assert_eq!(
            kvs.get(&FieldKey::content("category")).unwrap(),
            Lookup::Found(FieldValue::Text("vertical".into()))
        );
    }

    #[test]
    fn location_write_requires_a_locator() {
        let mut kvs = loaded_store(&[], &[]);
        let key = FieldKey::content("location");
        let err = kvs.set(&key, "vertical+v2".into()).unwrap_err();
        assert!(matches!(err, EngineError::TypeMismatch { found: "text", .. }));

        let moved = BlockLocator::new("vertical", "v2");
        kvs.set(&key, moved.clone().into()).unwrap();
        assert_eq!(kvs.location(), &moved);
        assert_eq!(kvs.id().id, moved);
        assert!(kvs.local_fields().is_empty());
    }

    #[test]
    fn children_provenance() {
        let children = FieldValue::List(vec![FieldValue::Locator(BlockLocator::new("html", "h1"))]);
        let mut kvs = loaded_store(&[("children", children.clone())], &[]);
        let key = FieldKey::children("children");
        assert_eq!(kvs.field_value_provenance(&key).unwrap(), Provenance::Local);

        kvs.delete(&key).unwrap();
        assert_eq!(kvs.field_value_provenance(&key).unwrap(), Provenance::Default);
        assert_eq!(kvs.get(&key).unwrap(), Lookup::NotFound);
    }

    #[test]
    fn textual_keys_with_unknown_scope_are_rejected() {
        fn lookup(kvs: &mut SplitKvs, raw: &str) -> Result<Lookup, EngineError> {
            let key = FieldKey::parse(raw)?;
            kvs.get(&key)
        }

        let mut kvs = loaded_store(&[("graded", true.into())], &[]);
        assert_eq!(lookup(&mut kvs, "settings.graded").unwrap(), Lookup::Found(true.into()));
        assert!(matches!(lookup(&mut kvs, "user_state.graded"), Err(EngineError::Core(_))));
    }

    #[test]
    fn get_or_default_reports_origin() {
        let mut kvs = loaded_store(&[], &[("due", FieldValue::Timestamp(1_700_000_000))]);
        let (due, provenance) = kvs
            .get_or_default(&FieldKey::settings("due"), FieldValue::Null)
            .unwrap();
        assert_eq!(due, FieldValue::Timestamp(1_700_000_000));
        assert_eq!(provenance, Provenance::Inherited);

        let (weight, provenance) = kvs
            .get_or_default(&FieldKey::settings("weight"), FieldValue::Integer(1))
            .unwrap();
        assert_eq!(weight, FieldValue::Integer(1));
        assert_eq!(provenance, Provenance::Default);
    }
}
