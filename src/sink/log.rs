use std::sync::{Arc, Mutex};

use serde::Serialize;
use thiserror::Error;

use super::{ChangeSet, ChangeSink};
use crate::shape::Shape;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogSinkError {
    #[error("log sink buffer poisoned")]
    BufferPoisoned,
    #[error("failed to encode change: {0}")]
    Encode(String),
}

#[derive(Serialize)]
struct LogLine<'a> {
    op: &'static str,
    shape: &'a Shape,
}

/// A sink that writes one JSON line per change to a buffer, or to the
/// `tracing` log at info level when no buffer is attached.
#[derive(Debug, Default)]
pub struct LogSink {
    buffer: Option<Arc<Mutex<Vec<String>>>>,
}

impl LogSink {
    pub fn new() -> Self {
        LogSink { buffer: None }
    }

    pub fn with_buffer(buffer: Arc<Mutex<Vec<String>>>) -> Self {
        LogSink {
            buffer: Some(buffer),
        }
    }

    fn render(batch: &ChangeSet) -> Result<Vec<String>, LogSinkError> {
        let upserts = batch.upserts.iter().map(|shape| ("upsert", shape));
        let deletions = batch.deletions.iter().map(|shape| ("delete", shape));

        upserts
            .chain(deletions)
            .map(|(op, shape)| {
                serde_json::to_string(&LogLine { op, shape })
                    .map_err(|e| LogSinkError::Encode(e.to_string()))
            })
            .collect()
    }
}

impl ChangeSink for LogSink {
    type Error = LogSinkError;

    fn flush(&mut self, batch: &ChangeSet) -> Result<(), Self::Error> {
        let lines = Self::render(batch)?;
        match &self.buffer {
            Some(buffer) => {
                let mut buffer = buffer.lock().map_err(|_| LogSinkError::BufferPoisoned)?;
                buffer.extend(lines);
            }
            None => {
                for line in lines {
                    tracing::info!(target: "shape_store::commit", "{}", line);
                }
            }
        }
        Ok(())
    }
}
