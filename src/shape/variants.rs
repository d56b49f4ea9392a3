use std::f64::consts::PI;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::{ShapeId, ShapeKind};

/// Capabilities shared by every shape, concrete or type-erased.
pub trait Geometry {
    fn id(&self) -> ShapeId;

    fn parent_id(&self) -> ShapeId;

    /// Derived measure. Always computed from the current fields.
    fn area(&self) -> f64;
}

/// A concrete shape variant that the repository can construct and hand out.
pub trait Variant: Geometry + Sized {
    const KIND: ShapeKind;

    fn new(id: ShapeId, parent_id: ShapeId) -> Self;

    fn from_shape(shape: &Shape) -> Option<&Self>;

    fn from_shape_mut(shape: &mut Shape) -> Option<&mut Self>;

    fn into_shape(self) -> Shape;
}

// Shapes are the same entity when their ids match, whatever their geometry.
macro_rules! identity_eq {
    ($ty:ty) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        impl Eq for $ty {}

        impl Hash for $ty {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.id.hash(state);
            }
        }
    };
}

macro_rules! variant {
    ($ty:ident, $kind:ident) => {
        impl Variant for $ty {
            const KIND: ShapeKind = ShapeKind::$kind;

            fn new(id: ShapeId, parent_id: ShapeId) -> Self {
                $ty {
                    id,
                    parent_id,
                    ..Default::default()
                }
            }

            fn from_shape(shape: &Shape) -> Option<&Self> {
                match shape {
                    Shape::$kind(inner) => Some(inner),
                    _ => None,
                }
            }

            fn from_shape_mut(shape: &mut Shape) -> Option<&mut Self> {
                match shape {
                    Shape::$kind(inner) => Some(inner),
                    _ => None,
                }
            }

            fn into_shape(self) -> Shape {
                Shape::$kind(self)
            }
        }

        impl From<$ty> for Shape {
            fn from(value: $ty) -> Self {
                value.into_shape()
            }
        }

        identity_eq!($ty);
    };
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Circle {
    id: ShapeId,
    parent_id: ShapeId,
    pub radius: f64,
}

impl Geometry for Circle {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn parent_id(&self) -> ShapeId {
        self.parent_id
    }

    fn area(&self) -> f64 {
        PI * self.radius * self.radius
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Square {
    id: ShapeId,
    parent_id: ShapeId,
    pub side: f64,
}

impl Geometry for Square {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn parent_id(&self) -> ShapeId {
        self.parent_id
    }

    fn area(&self) -> f64 {
        self.side * self.side
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rectangle {
    id: ShapeId,
    parent_id: ShapeId,
    pub width: f64,
    pub height: f64,
}

impl Geometry for Rectangle {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn parent_id(&self) -> ShapeId {
        self.parent_id
    }

    fn area(&self) -> f64 {
        self.width * self.height
    }
}

variant!(Circle, Circle);
variant!(Square, Square);
variant!(Rectangle, Rectangle);

/// Type-erased shape as stored in the repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Circle(Circle),
    Square(Square),
    Rectangle(Rectangle),
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Square(_) => ShapeKind::Square,
            Shape::Rectangle(_) => ShapeKind::Rectangle,
        }
    }

    pub fn downcast<S: Variant>(&self) -> Option<&S> {
        S::from_shape(self)
    }

    pub fn downcast_mut<S: Variant>(&mut self) -> Option<&mut S> {
        S::from_shape_mut(self)
    }

    fn as_geometry(&self) -> &dyn Geometry {
        match self {
            Shape::Circle(inner) => inner,
            Shape::Square(inner) => inner,
            Shape::Rectangle(inner) => inner,
        }
    }
}

impl Geometry for Shape {
    fn id(&self) -> ShapeId {
        self.as_geometry().id()
    }

    fn parent_id(&self) -> ShapeId {
        self.as_geometry().parent_id()
    }

    fn area(&self) -> f64 {
        self.as_geometry().area()
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Shape {}

impl Hash for Shape {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}
