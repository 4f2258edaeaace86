use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::CoreError;

/// Identifies a persisted definition document.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DefinitionId(Uuid);

impl DefinitionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for DefinitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DefinitionId({})", &self.0.to_string()[..8])
    }
}

impl Default for DefinitionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DefinitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address of a block within its structure: `block_type+block_id`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockLocator {
    block_type: String,
    block_id: String,
}

impl BlockLocator {
    pub fn new(block_type: impl Into<String>, block_id: impl Into<String>) -> Self {
        Self {
            block_type: block_type.into(),
            block_id: block_id.into(),
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s.split_once('+') {
            Some((block_type, block_id))
                if !block_type.is_empty() && !block_id.is_empty() && !block_id.contains('+') =>
            {
                Ok(Self::new(block_type, block_id))
            }
            _ => Err(CoreError::InvalidLocator(s.to_string())),
        }
    }

    pub fn block_type(&self) -> &str {
        &self.block_type
    }

    pub fn block_id(&self) -> &str {
        &self.block_id
    }
}

impl fmt::Debug for BlockLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockLocator({}+{})", self.block_type, self.block_id)
    }
}

impl fmt::Display for BlockLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.block_type, self.block_id)
    }
}

/// The pair a host uses to address a store: the block and the definition backing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KvsId {
    pub id: BlockLocator,
    pub def_id: DefinitionId,
}
