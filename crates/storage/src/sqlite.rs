use std::collections::BTreeMap;

use rusqlite::Connection;

use splitkv_core::{field_value::FieldValue, ids::DefinitionId};

use crate::error::StorageError;
use crate::traits::{DefinitionRecord, DefinitionSource, DefinitionStore};

/// Convert Vec<u8> to fixed-size array with proper error handling.
fn to_array<const N: usize>(v: Vec<u8>, label: &str) -> Result<[u8; N], StorageError> {
    v.try_into()
        .map_err(|_| StorageError::Serialization(format!("invalid {label} length")))
}

pub struct SqliteDefinitionStore {
    conn: Connection,
}

impl SqliteDefinitionStore {
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        crate::schema::init_schema(&conn)?;
        tracing::debug!(path, "opened definition store");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

fn encode_fields(fields: &BTreeMap<String, FieldValue>) -> Result<Vec<u8>, StorageError> {
    rmp_serde::to_vec(fields).map_err(|e| StorageError::Serialization(e.to_string()))
}

fn read_definition(
    definition_id: DefinitionId,
    block_type: String,
    fields_bytes: Vec<u8>,
    checksum_bytes: Vec<u8>,
) -> Result<DefinitionRecord, StorageError> {
    let checksum = to_array::<32>(checksum_bytes, "checksum")?;
    if *blake3::hash(&fields_bytes).as_bytes() != checksum {
        return Err(StorageError::ChecksumMismatch {
            definition_id: definition_id.to_string(),
        });
    }
    let fields: BTreeMap<String, FieldValue> = rmp_serde::from_slice(&fields_bytes)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    Ok(DefinitionRecord {
        definition_id,
        block_type,
        fields,
    })
}

impl DefinitionSource for SqliteDefinitionStore {
    fn fetch_definition(
        &self,
        definition_id: DefinitionId,
    ) -> Result<Option<DefinitionRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT block_type, fields, checksum FROM definitions WHERE definition_id = ?1",
        )?;
        let mut rows = stmt.query_map(
            rusqlite::params![definition_id.as_bytes().as_slice()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Vec<u8>>(1)?,
                    row.get::<_, Vec<u8>>(2)?,
                ))
            },
        )?;

        match rows.next() {
            Some(Ok((block_type, fields_bytes, checksum_bytes))) => Ok(Some(read_definition(
                definition_id,
                block_type,
                fields_bytes,
                checksum_bytes,
            )?)),
            Some(Err(e)) => Err(StorageError::Sqlite(e)),
            None => Ok(None),
        }
    }
}

impl DefinitionStore for SqliteDefinitionStore {
    fn put_definition(&mut self, record: &DefinitionRecord) -> Result<(), StorageError> {
        let fields_bytes = encode_fields(&record.fields)?;
        let checksum = blake3::hash(&fields_bytes);
        self.conn.execute(
            "INSERT INTO definitions (definition_id, block_type, fields, checksum) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(definition_id) DO UPDATE SET block_type = excluded.block_type, fields = excluded.fields, checksum = excluded.checksum, updated_at = CAST(unixepoch('now','subsec') * 1000 AS INTEGER)",
            rusqlite::params![
                record.definition_id.as_bytes().as_slice(),
                record.block_type,
                fields_bytes,
                checksum.as_bytes().as_slice(),
            ],
        )?;
        Ok(())
    }

    fn delete_definition(&mut self, definition_id: DefinitionId) -> Result<bool, StorageError> {
        let removed = self.conn.execute(
            "DELETE FROM definitions WHERE definition_id = ?1",
            rusqlite::params![definition_id.as_bytes().as_slice()],
        )?;
        Ok(removed > 0)
    }

    fn definition_count(&self) -> Result<u64, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM definitions", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| StorageError::Serialization(format!("invalid definition count {count}")))
    }
}
