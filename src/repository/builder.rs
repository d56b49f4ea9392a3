use super::identity::IdentityGenerator;
use super::repository::Repository;
use crate::shape::ShapeRegistry;
use crate::sink::{ChangeSink, NullSink};

/// Configures a [`Repository`].
///
/// Defaults: the standard registry, a [`NullSink`], ids from 1, tombstones
/// kept after commit.
///
/// ```ignore
/// let sink = MemorySink::new();
/// let mut repo = Repository::builder()
///     .sink(sink.clone())
///     .purge_on_commit(true)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct RepositoryBuilder<S = NullSink> {
    registry: ShapeRegistry,
    ids: IdentityGenerator,
    sink: S,
    purge_on_commit: bool,
}

impl Default for RepositoryBuilder<NullSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryBuilder<NullSink> {
    pub fn new() -> Self {
        RepositoryBuilder {
            registry: ShapeRegistry::standard(),
            ids: IdentityGenerator::new(),
            sink: NullSink,
            purge_on_commit: false,
        }
    }
}

impl<S> RepositoryBuilder<S> {
    pub fn registry(mut self, registry: ShapeRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn identities(mut self, ids: IdentityGenerator) -> Self {
        self.ids = ids;
        self
    }

    /// Remove committed tombstones from the table instead of keeping them.
    pub fn purge_on_commit(mut self, purge: bool) -> Self {
        self.purge_on_commit = purge;
        self
    }

    pub fn sink<T: ChangeSink>(self, sink: T) -> RepositoryBuilder<T> {
        RepositoryBuilder {
            registry: self.registry,
            ids: self.ids,
            sink,
            purge_on_commit: self.purge_on_commit,
        }
    }

    pub fn build(self) -> Repository<S> {
        Repository::from_parts(self.ids, self.registry, self.sink, self.purge_on_commit)
    }
}
