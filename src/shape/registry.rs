use std::collections::HashMap;

use super::{Circle, Rectangle, Shape, ShapeId, ShapeKind, Square, Variant};

/// Builds a shape from `(id, parent_id)`.
pub type ShapeFactory = fn(ShapeId, ShapeId) -> Shape;

/// Construction-time mapping from a variant tag to its factory.
///
/// The repository never constructs shapes directly, so a registry without a
/// factory for some kind makes that kind uncreatable.
#[derive(Debug, Clone)]
pub struct ShapeRegistry {
    factories: HashMap<ShapeKind, ShapeFactory>,
}

impl Default for ShapeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

fn build<S: Variant>(id: ShapeId, parent_id: ShapeId) -> Shape {
    S::new(id, parent_id).into_shape()
}

impl ShapeRegistry {
    pub fn empty() -> Self {
        ShapeRegistry {
            factories: HashMap::new(),
        }
    }

    /// Registry with every built-in variant.
    pub fn standard() -> Self {
        Self::empty()
            .with::<Circle>()
            .with::<Square>()
            .with::<Rectangle>()
    }

    /// Register the default constructor of `S`.
    pub fn with<S: Variant>(self) -> Self {
        self.register(S::KIND, build::<S>)
    }

    /// Register (or replace) the factory for `kind`.
    pub fn register(mut self, kind: ShapeKind, factory: ShapeFactory) -> Self {
        self.factories.insert(kind, factory);
        self
    }

    pub fn contains(&self, kind: ShapeKind) -> bool {
        self.factories.contains_key(&kind)
    }

    pub fn factory(&self, kind: ShapeKind) -> Option<ShapeFactory> {
        self.factories.get(&kind).copied()
    }
}
