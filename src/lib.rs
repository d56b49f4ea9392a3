//! In-memory shape repository.
//!
//! Shapes live in a parent/child tree. Mutations go through a scoped
//! [`ShapeGuard`] that flags the shape as modified when its area changed,
//! deletes cascade to descendants, and [`Repository::commit`] hands the
//! modified and deleted sets to a [`ChangeSink`] before clearing them.

mod error;
mod repository;
mod shape;
pub mod sink;
pub mod telemetry;

pub use error::RepositoryError;
pub use repository::{IdentityGenerator, Repository, RepositoryBuilder, ShapeGuard};
pub use shape::{
    Circle, Geometry, Rectangle, Shape, ShapeFactory, ShapeId, ShapeKind, ShapeRegistry, Square,
    Variant,
};
#[cfg(feature = "emitter")]
pub use sink::EmitterSink;
pub use sink::{ChangeSet, ChangeSink, LogSink, LogSinkError, MemorySink, MemorySinkError, NullSink};
