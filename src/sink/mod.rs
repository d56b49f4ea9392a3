//! Commit sinks - where a repository hands its change sets on commit.
//!
//! A sink receives exactly one [`ChangeSet`] per [`Repository::commit`]
//! call, holding snapshots of the modified shapes (upserts) and of the
//! deleted shapes (deletions) as they stood before the sets were cleared.
//! How those become storage rows is up to the sink.
//!
//! - [`NullSink`] - discards batches (the default)
//! - [`LogSink`] - one JSON line per change, to a buffer or the `tracing` log
//! - [`MemorySink`] - bitcode-encoded rows in a shared in-memory table
//! - `EmitterSink` - in-process events (requires the `emitter` feature)
//!
//! [`Repository::commit`]: crate::Repository::commit

#[cfg(feature = "emitter")]
mod emitter;
mod log;
mod memory;

use std::convert::Infallible;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::shape::{Geometry, Shape, ShapeId};

#[cfg(feature = "emitter")]
pub use emitter::{EmitterSink, DELETED, UPSERTED};
pub use log::{LogSink, LogSinkError};
pub use memory::{MemorySink, MemorySinkError};

/// The batch handed to a sink on commit. Both lists are ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub upserts: Vec<Shape>,
    pub deletions: Vec<Shape>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.deletions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.upserts.len() + self.deletions.len()
    }

    pub fn upserted_ids(&self) -> Vec<ShapeId> {
        self.upserts.iter().map(Geometry::id).collect()
    }

    pub fn deleted_ids(&self) -> Vec<ShapeId> {
        self.deletions.iter().map(Geometry::id).collect()
    }
}

/// Receives change sets from a repository on commit.
pub trait ChangeSink {
    type Error: fmt::Display;

    /// Apply one batch. Upserts are conceptually applied before deletions.
    fn flush(&mut self, batch: &ChangeSet) -> Result<(), Self::Error>;
}

impl<S: ChangeSink + ?Sized> ChangeSink for &mut S {
    type Error = S::Error;

    fn flush(&mut self, batch: &ChangeSet) -> Result<(), Self::Error> {
        (**self).flush(batch)
    }
}

/// Sink that accepts and drops every batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ChangeSink for NullSink {
    type Error = Infallible;

    fn flush(&mut self, _batch: &ChangeSet) -> Result<(), Self::Error> {
        Ok(())
    }
}
