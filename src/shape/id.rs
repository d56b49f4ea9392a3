use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a shape inside a repository.
///
/// Zero is reserved: it never names a stored shape and is only used as the
/// "no parent" marker when requesting the root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(u64);

impl ShapeId {
    /// The wildcard id used as the parent of the root shape.
    pub const WILDCARD: ShapeId = ShapeId(0);

    pub const fn new(value: u64) -> Self {
        ShapeId(value)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }

    pub const fn is_wildcard(&self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for ShapeId {
    fn from(value: u64) -> Self {
        ShapeId(value)
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
