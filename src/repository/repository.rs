use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::{debug, warn};

use super::builder::RepositoryBuilder;
use super::guard::ShapeGuard;
use super::identity::IdentityGenerator;
use crate::error::RepositoryError;
use crate::shape::{Geometry, Shape, ShapeId, ShapeKind, ShapeRegistry, Variant};
use crate::sink::{ChangeSet, ChangeSink, NullSink};

/// In-memory shape store with change tracking.
///
/// Shapes form a tree rooted at the first shape created. Edits made through
/// a [`ShapeGuard`] land in the modified set, deletes cascade to descendants
/// and land in the deleted set, and [`commit`](Repository::commit) hands both
/// sets to the sink and clears them.
///
/// Deleted shapes stay in the table as tombstones: [`get`](Repository::get)
/// still returns them, but they are no longer live, cannot be edited and
/// cannot parent new shapes.
pub struct Repository<S = NullSink> {
    entities: BTreeMap<ShapeId, Shape>,
    modified: BTreeSet<ShapeId>,
    deleted: BTreeSet<ShapeId>,
    tombstones: BTreeSet<ShapeId>,
    ids: IdentityGenerator,
    registry: ShapeRegistry,
    sink: S,
    purge_on_commit: bool,
}

impl Default for Repository<NullSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository<NullSink> {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> RepositoryBuilder<NullSink> {
        RepositoryBuilder::new()
    }
}

impl<S> Repository<S> {
    pub(crate) fn from_parts(
        ids: IdentityGenerator,
        registry: ShapeRegistry,
        sink: S,
        purge_on_commit: bool,
    ) -> Self {
        Repository {
            entities: BTreeMap::new(),
            modified: BTreeSet::new(),
            deleted: BTreeSet::new(),
            tombstones: BTreeSet::new(),
            ids,
            registry,
            sink,
            purge_on_commit,
        }
    }

    // ========================================================================
    // Create
    // ========================================================================

    /// Create a shape of variant `V` under `parent_id`.
    ///
    /// `parent_id` must be a live shape, or the wildcard when the table holds
    /// no shapes at all, tombstones included (establishing the root). Returns `None` otherwise,
    /// or when `V` has no registered factory.
    pub fn create<V: Variant>(&mut self, parent_id: ShapeId) -> Option<ShapeGuard<'_, V>> {
        self.try_create(parent_id).ok()
    }

    /// Like [`create`](Repository::create), reporting why nothing was created.
    pub fn try_create<V: Variant>(
        &mut self,
        parent_id: ShapeId,
    ) -> Result<ShapeGuard<'_, V>, RepositoryError> {
        let shape = self.construct(V::KIND, parent_id)?;
        let id = shape.id();
        self.modified.insert(id);
        let stored = self.entities.entry(id).or_insert(shape);
        let variant = V::from_shape_mut(stored).ok_or(RepositoryError::UnknownVariant(V::KIND))?;
        Ok(ShapeGuard::new(variant, &mut self.modified))
    }

    /// Create a shape chosen at runtime by `kind`.
    pub fn create_kind(
        &mut self,
        kind: ShapeKind,
        parent_id: ShapeId,
    ) -> Option<ShapeGuard<'_, Shape>> {
        self.try_create_kind(kind, parent_id).ok()
    }

    pub fn try_create_kind(
        &mut self,
        kind: ShapeKind,
        parent_id: ShapeId,
    ) -> Result<ShapeGuard<'_, Shape>, RepositoryError> {
        let shape = self.construct(kind, parent_id)?;
        let id = shape.id();
        self.modified.insert(id);
        let stored = self.entities.entry(id).or_insert(shape);
        Ok(ShapeGuard::new(stored, &mut self.modified))
    }

    /// Validate the request and build the shape. Nothing is recorded and no
    /// id is consumed unless this succeeds.
    fn construct(&mut self, kind: ShapeKind, parent_id: ShapeId) -> Result<Shape, RepositoryError> {
        // Tombstones still occupy the table, so only one root is ever
        // accepted unless committed tombstones are purged.
        let parent_ok = if parent_id.is_wildcard() {
            self.entities.is_empty()
        } else {
            self.contains(parent_id)
        };
        if !parent_ok {
            debug!(%parent_id, %kind, "create rejected: invalid parent");
            return Err(RepositoryError::InvalidParent { parent_id });
        }

        let factory = self.registry.factory(kind).ok_or_else(|| {
            debug!(%kind, "create rejected: no factory");
            RepositoryError::UnknownVariant(kind)
        })?;

        let id = self.ids.peek().ok_or(RepositoryError::IdentityExhausted)?;
        let shape = factory(id, parent_id);
        if shape.kind() != kind || shape.id() != id || shape.parent_id() != parent_id {
            warn!(%kind, %id, "factory produced a mismatched shape");
            return Err(RepositoryError::UnknownVariant(kind));
        }
        self.ids.next()?;

        debug!(%id, %parent_id, %kind, "shape created");
        Ok(shape)
    }

    // ========================================================================
    // Read / update
    // ========================================================================

    /// Scoped access to the live shape `id` if it is a `V`.
    pub fn read_or_update<V: Variant>(&mut self, id: ShapeId) -> Option<ShapeGuard<'_, V>> {
        self.try_read_or_update(id).ok()
    }

    pub fn try_read_or_update<V: Variant>(
        &mut self,
        id: ShapeId,
    ) -> Result<ShapeGuard<'_, V>, RepositoryError> {
        let not_found = RepositoryError::NotFoundOrTypeMismatch {
            id,
            expected: V::KIND,
        };
        if self.tombstones.contains(&id) {
            return Err(not_found);
        }
        let shape = self
            .entities
            .get_mut(&id)
            .and_then(V::from_shape_mut)
            .ok_or(not_found)?;
        Ok(ShapeGuard::new(shape, &mut self.modified))
    }

    /// Scoped access to the live shape `id` if its kind is `kind`.
    pub fn read_or_update_kind(
        &mut self,
        id: ShapeId,
        kind: ShapeKind,
    ) -> Option<ShapeGuard<'_, Shape>> {
        self.try_read_or_update_kind(id, kind).ok()
    }

    pub fn try_read_or_update_kind(
        &mut self,
        id: ShapeId,
        kind: ShapeKind,
    ) -> Result<ShapeGuard<'_, Shape>, RepositoryError> {
        let not_found = RepositoryError::NotFoundOrTypeMismatch { id, expected: kind };
        if self.tombstones.contains(&id) {
            return Err(not_found);
        }
        let shape = self
            .entities
            .get_mut(&id)
            .filter(|shape| shape.kind() == kind)
            .ok_or(not_found)?;
        Ok(ShapeGuard::new(shape, &mut self.modified))
    }

    // ========================================================================
    // Delete
    // ========================================================================

    /// Mark `id` and all of its live descendants deleted.
    ///
    /// Walks the tree breadth-first; every visited shape moves from the
    /// modified set to the deleted set and becomes a tombstone. Children are
    /// found by scanning the table, there is no child index. Unknown or
    /// already deleted ids are a no-op. Returns the ids deleted, in visit
    /// order.
    pub fn delete(&mut self, id: ShapeId) -> Vec<ShapeId> {
        if !self.contains(id) {
            debug!(%id, "delete ignored: not a live shape");
            return Vec::new();
        }

        let mut queue = VecDeque::from([id]);
        let mut visited = Vec::new();
        while let Some(current) = queue.pop_front() {
            self.modified.remove(&current);
            self.deleted.insert(current);
            self.tombstones.insert(current);
            visited.push(current);

            queue.extend(
                self.entities
                    .values()
                    .filter(|shape| shape.parent_id() == current)
                    .map(Geometry::id)
                    .filter(|child| !self.tombstones.contains(child)),
            );
        }

        debug!(%id, cascade = visited.len(), "shapes deleted");
        visited
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The stored shape, tombstones included.
    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.entities.get(&id)
    }

    /// Whether `id` is a live (stored and not deleted) shape.
    pub fn contains(&self, id: ShapeId) -> bool {
        self.entities.contains_key(&id) && !self.tombstones.contains(&id)
    }

    pub fn is_tombstoned(&self, id: ShapeId) -> bool {
        self.tombstones.contains(&id)
    }

    /// Number of live shapes.
    pub fn len(&self) -> usize {
        self.entities.len() - self.tombstones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live shapes in id order.
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> + '_ {
        self.entities
            .values()
            .filter(move |shape| !self.tombstones.contains(&shape.id()))
    }

    /// Live direct children of `id`, in id order.
    pub fn children(&self, id: ShapeId) -> Vec<ShapeId> {
        self.shapes()
            .filter(|shape| shape.parent_id() == id)
            .map(Geometry::id)
            .collect()
    }

    pub fn modified(&self) -> &BTreeSet<ShapeId> {
        &self.modified
    }

    pub fn deleted(&self) -> &BTreeSet<ShapeId> {
        &self.deleted
    }

    /// The batch the next commit would hand to the sink.
    pub fn pending_changes(&self) -> ChangeSet {
        let snapshot = |ids: &BTreeSet<ShapeId>| -> Vec<Shape> {
            ids.iter()
                .filter_map(|id| self.entities.get(id))
                .cloned()
                .collect()
        };
        ChangeSet {
            upserts: snapshot(&self.modified),
            deletions: snapshot(&self.deleted),
        }
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.modified.is_empty() || !self.deleted.is_empty()
    }

    pub fn registry(&self) -> &ShapeRegistry {
        &self.registry
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<S: ChangeSink> Repository<S> {
    /// Hand the pending change sets to the sink and clear them.
    ///
    /// The sink is called exactly once, even when nothing changed. If it
    /// fails, both sets are kept so the commit can be retried. Tombstones stay
    /// in the table unless the repository was built with `purge_on_commit`.
    pub fn commit(&mut self) -> Result<ChangeSet, RepositoryError> {
        let batch = self.pending_changes();

        if let Err(err) = self.sink.flush(&batch) {
            warn!(
                upserts = batch.upserts.len(),
                deletions = batch.deletions.len(),
                error = %err,
                "commit sink failed"
            );
            return Err(RepositoryError::Sink(err.to_string()));
        }

        self.modified.clear();
        let deleted = std::mem::take(&mut self.deleted);
        if self.purge_on_commit {
            for id in &deleted {
                self.entities.remove(id);
                self.tombstones.remove(id);
            }
        }

        debug!(
            upserts = batch.upserts.len(),
            deletions = batch.deletions.len(),
            purged = self.purge_on_commit,
            "committed"
        );
        Ok(batch)
    }
}
