use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Which resolution path a field key takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    Content,
    Settings,
    Children,
    Parent,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Settings => "settings",
            Self::Children => "children",
            Self::Parent => "parent",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "content" => Ok(Self::Content),
            "settings" => Ok(Self::Settings),
            "children" => Ok(Self::Children),
            "parent" => Ok(Self::Parent),
            _ => Err(CoreError::UnknownScope(s.to_string())),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldKey {
    pub scope: Scope,
    pub name: String,
}

impl FieldKey {
    pub fn new(scope: Scope, name: impl Into<String>) -> Self {
        Self {
            scope,
            name: name.into(),
        }
    }

    pub fn content(name: impl Into<String>) -> Self {
        Self::new(Scope::Content, name)
    }

    pub fn settings(name: impl Into<String>) -> Self {
        Self::new(Scope::Settings, name)
    }

    pub fn children(name: impl Into<String>) -> Self {
        Self::new(Scope::Children, name)
    }

    pub fn parent(name: impl Into<String>) -> Self {
        Self::new(Scope::Parent, name)
    }

    /// Parse the `scope.name` form produced by `Display`.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let (scope, name) = s
            .split_once('.')
            .ok_or_else(|| CoreError::UnknownScope(s.to_string()))?;
        Ok(Self::new(Scope::parse(scope)?, name))
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.scope, self.name)
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provenance {
    Local,
    Inherited,
    Default,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Inherited => "inherited",
            Self::Default => "default",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_names_roundtrip() {
        for scope in [Scope::Content, Scope::Settings, Scope::Children, Scope::Parent] {
            assert_eq!(Scope::parse(scope.as_str()).unwrap(), scope);
        }
    }

    #[test]
    fn unknown_scope_is_an_error() {
        let err = Scope::parse("user_state").unwrap_err();
        assert!(matches!(err, CoreError::UnknownScope(ref s) if s == "user_state"));
    }

    #[test]
    fn field_key_parse() {
        let key = FieldKey::parse("content.data").unwrap();
        assert_eq!(key, FieldKey::content("data"));
        assert!(matches!(FieldKey::parse("data"), Err(CoreError::UnknownScope(_))));
        assert!(matches!(FieldKey::parse("user.data"), Err(CoreError::UnknownScope(ref s)) if s == "user"));
    }

    #[test]
    fn field_key_display() {
        assert_eq!(FieldKey::settings("display_name").to_string(), "settings.display_name");
        assert_eq!(Provenance::Inherited.as_str(), "inherited");
    }
}
