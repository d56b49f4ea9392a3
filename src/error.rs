use thiserror::Error;

use crate::shape::{ShapeId, ShapeKind};

/// Reasons a repository operation produced no result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The parent is neither a live shape nor the wildcard on an empty repository.
    #[error("invalid parent {parent_id}: not a live shape and not a root request on an empty repository")]
    InvalidParent { parent_id: ShapeId },
    #[error("shape {id} not found or not a {expected}")]
    NotFoundOrTypeMismatch { id: ShapeId, expected: ShapeKind },
    #[error("no factory registered for {0}")]
    UnknownVariant(ShapeKind),
    #[error("identity space exhausted")]
    IdentityExhausted,
    /// The commit sink rejected the batch; change sets were left untouched.
    #[error("commit sink failed: {0}")]
    Sink(String),
}
