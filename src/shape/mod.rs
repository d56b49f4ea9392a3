//! Shapes - the entities tracked by a [`Repository`](crate::Repository).
//!
//! Every shape has an id, a parent id and a derived `area`. Concrete variants
//! only differ in their geometry fields, which callers mutate directly while
//! holding a [`ShapeGuard`](crate::ShapeGuard).

mod id;
mod kind;
mod registry;
mod variants;

pub use id::ShapeId;
pub use kind::ShapeKind;
pub use registry::{ShapeFactory, ShapeRegistry};
pub use variants::{Circle, Geometry, Rectangle, Shape, Square, Variant};
