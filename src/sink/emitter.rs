use event_emitter_rs::EventEmitter;

use super::{ChangeSet, ChangeSink};

/// Event name for every upserted shape.
pub const UPSERTED: &str = "shape.upserted";
/// Event name for every deleted shape.
pub const DELETED: &str = "shape.deleted";

/// A sink that emits one event per change via an `EventEmitter`, for
/// in-process subscribers. Payloads are the shape as JSON.
///
/// Delivery is fire-and-forget: listeners run on the emitter's threads and
/// their join handles are dropped, so `flush` returns before any listener
/// has necessarily run. A listener failing never fails the commit.
pub struct EmitterSink {
    emitter: EventEmitter,
}

impl Default for EmitterSink {
    fn default() -> Self {
        Self::new(EventEmitter::new())
    }
}

impl EmitterSink {
    pub fn new(emitter: EventEmitter) -> Self {
        EmitterSink { emitter }
    }

    /// Subscribe to [`UPSERTED`] or [`DELETED`]. Listeners run on the
    /// emitter's own threads.
    pub fn on<F>(&mut self, event: &str, listener: F)
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.emitter.on(event, listener);
    }
}

impl ChangeSink for EmitterSink {
    type Error = serde_json::Error;

    fn flush(&mut self, batch: &ChangeSet) -> Result<(), Self::Error> {
        for shape in &batch.upserts {
            let payload = serde_json::to_string(shape)?;
            self.emitter.emit(UPSERTED, payload);
        }
        for shape in &batch.deletions {
            let payload = serde_json::to_string(shape)?;
            self.emitter.emit(DELETED, payload);
        }
        Ok(())
    }
}
