use crate::error::RepositoryError;
use crate::shape::ShapeId;

/// Hands out fresh, strictly increasing shape ids starting at 1.
///
/// Ids are never reused, even after the shape they named is deleted.
#[derive(Debug, Clone)]
pub struct IdentityGenerator {
    last: u64,
}

impl Default for IdentityGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityGenerator {
    pub fn new() -> Self {
        IdentityGenerator { last: 0 }
    }

    /// Generator whose next id is `first`. A `first` of 0 behaves like 1.
    pub fn starting_at(first: u64) -> Self {
        IdentityGenerator {
            last: first.saturating_sub(1),
        }
    }

    /// The next id. Exhausting `u64` is reported instead of wrapping.
    pub fn next(&mut self) -> Result<ShapeId, RepositoryError> {
        let id = self
            .peek()
            .ok_or(RepositoryError::IdentityExhausted)?;
        self.last = id.value();
        Ok(id)
    }

    /// The id `next` would return, without consuming it.
    pub fn peek(&self) -> Option<ShapeId> {
        self.last.checked_add(1).map(ShapeId::new)
    }

    /// The most recently issued id, or the wildcard if none was issued.
    pub fn last(&self) -> ShapeId {
        ShapeId::new(self.last)
    }
}
