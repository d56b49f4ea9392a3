use shape_store::{ChangeSet, ChangeSink, Circle, Geometry, Repository, ShapeId, Square};

pub fn id(value: u64) -> ShapeId {
    ShapeId::new(value)
}

/// Root R(1) with children A(2) and B(3); A has child C(4).
pub fn family<S>(repo: &mut Repository<S>) -> [ShapeId; 4] {
    let r = repo.create::<Circle>(ShapeId::WILDCARD).map(|g| g.id()).unwrap();
    let a = repo.create::<Square>(r).map(|g| g.id()).unwrap();
    let b = repo.create::<Square>(r).map(|g| g.id()).unwrap();
    let c = repo.create::<Circle>(a).map(|g| g.id()).unwrap();
    [r, a, b, c]
}

/// Sink that records every batch it receives, optionally refusing them.
#[derive(Default)]
pub struct RecordingSink {
    pub batches: Vec<ChangeSet>,
    pub refuse: bool,
}

impl ChangeSink for RecordingSink {
    type Error = String;

    fn flush(&mut self, batch: &ChangeSet) -> Result<(), Self::Error> {
        if self.refuse {
            return Err("storage offline".to_string());
        }
        self.batches.push(batch.clone());
        Ok(())
    }
}
