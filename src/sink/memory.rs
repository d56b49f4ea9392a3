//! MemorySink - HashMap-style row table for tests and development.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use super::{ChangeSet, ChangeSink};
use crate::shape::{Geometry, Shape, ShapeId, ShapeKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemorySinkError {
    #[error("memory sink lock poisoned")]
    Poisoned,
    #[error("row encoding failed: {0}")]
    Encode(String),
    #[error("row decoding failed: {0}")]
    Decode(String),
}

/// Internal stored representation of a shape row.
struct StoredRow {
    kind: ShapeKind,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct Table {
    rows: BTreeMap<ShapeId, StoredRow>,
    commits: u64,
}

/// In-memory sink keeping the latest committed row of every shape.
///
/// Upserts insert or replace the row for the shape's id, deletions remove
/// it. Clone-friendly via Arc, so a test can keep a handle while the
/// repository owns another.
#[derive(Clone, Default)]
pub struct MemorySink {
    table: Arc<RwLock<Table>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the committed row for `id`.
    pub fn row(&self, id: ShapeId) -> Result<Option<Shape>, MemorySinkError> {
        let table = self.table.read().map_err(|_| MemorySinkError::Poisoned)?;
        match table.rows.get(&id) {
            Some(stored) => {
                let shape = bitcode::deserialize(&stored.bytes)
                    .map_err(|e| MemorySinkError::Decode(e.to_string()))?;
                Ok(Some(shape))
            }
            None => Ok(None),
        }
    }

    pub fn kind_of(&self, id: ShapeId) -> Result<Option<ShapeKind>, MemorySinkError> {
        let table = self.table.read().map_err(|_| MemorySinkError::Poisoned)?;
        Ok(table.rows.get(&id).map(|stored| stored.kind))
    }

    /// Ids with a committed row, ascending.
    pub fn ids(&self) -> Result<Vec<ShapeId>, MemorySinkError> {
        let table = self.table.read().map_err(|_| MemorySinkError::Poisoned)?;
        Ok(table.rows.keys().copied().collect())
    }

    /// Number of batches flushed so far, empty ones included.
    pub fn commits(&self) -> Result<u64, MemorySinkError> {
        let table = self.table.read().map_err(|_| MemorySinkError::Poisoned)?;
        Ok(table.commits)
    }
}

impl ChangeSink for MemorySink {
    type Error = MemorySinkError;

    fn flush(&mut self, batch: &ChangeSet) -> Result<(), Self::Error> {
        // Encode everything first so a bad row leaves the table untouched.
        let encoded = batch
            .upserts
            .iter()
            .map(|shape| {
                bitcode::serialize(shape)
                    .map(|bytes| {
                        (
                            shape.id(),
                            StoredRow {
                                kind: shape.kind(),
                                bytes,
                            },
                        )
                    })
                    .map_err(|e| MemorySinkError::Encode(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut table = self.table.write().map_err(|_| MemorySinkError::Poisoned)?;
        table.rows.extend(encoded);
        for shape in &batch.deletions {
            table.rows.remove(&shape.id());
        }
        table.commits += 1;
        Ok(())
    }
}
