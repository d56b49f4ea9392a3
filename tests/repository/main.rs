//! Integration tests for the shape repository and its commit sinks.

mod support;

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use shape_store::{
    Circle, Geometry, LogSink, MemorySink, Rectangle, Repository, RepositoryError, ShapeId,
    ShapeKind, Square,
};
use support::{family, id, RecordingSink};

fn set(ids: &[ShapeId]) -> BTreeSet<ShapeId> {
    ids.iter().copied().collect()
}

#[test]
fn circle_square_walkthrough() {
    let mut repo = Repository::new();

    let root = {
        let mut circle = repo.create::<Circle>(ShapeId::WILDCARD).unwrap();
        circle.radius = 5.0;
        circle.id()
    };
    assert_eq!(root, id(1));

    let square = {
        let mut square = repo.create::<Square>(root).unwrap();
        square.side = 5.0;
        square.id()
    };
    assert_eq!(square, id(2));
    assert!(repo.modified().contains(&square));

    repo.commit().unwrap();
    assert!(repo.modified().is_empty());

    {
        let mut guard = repo.read_or_update::<Square>(square).unwrap();
        assert_eq!(guard.area(), 25.0);
        guard.side = 10.0;
    }
    assert_eq!(repo.get(square).unwrap().area(), 100.0);
    assert_eq!(repo.modified(), &set(&[square]));

    repo.delete(root);
    assert_eq!(repo.deleted(), &set(&[root, square]));
    assert!(repo.modified().is_empty());
}

#[test]
fn cascade_pulls_modified_descendants_into_deleted() {
    let mut repo = Repository::new();
    let [r, a, b, c] = family(&mut repo);
    repo.commit().unwrap();

    repo.read_or_update::<Square>(a).unwrap().side = 2.0;
    repo.read_or_update::<Circle>(c).unwrap().radius = 1.0;
    repo.read_or_update::<Square>(b).unwrap().side = 3.0;
    assert_eq!(repo.modified(), &set(&[a, b, c]));

    repo.delete(a);
    assert_eq!(repo.deleted(), &set(&[a, c]));
    assert_eq!(repo.modified(), &set(&[b]));
    assert!(repo.contains(r));
    assert!(repo.contains(b));
}

#[test]
fn commit_on_clean_repository_is_a_noop() {
    let mut repo = Repository::builder().sink(RecordingSink::default()).build();
    assert!(repo.modified().is_empty() && repo.deleted().is_empty());

    let batch = repo.commit().unwrap();
    assert!(batch.is_empty());
    assert!(repo.modified().is_empty() && repo.deleted().is_empty());
    assert_eq!(repo.sink().batches.len(), 1);
}

#[test]
fn sink_sees_sets_as_they_stood_before_clearing() {
    let mut repo = Repository::builder().sink(RecordingSink::default()).build();
    let [r, a, b, c] = family(&mut repo);
    repo.commit().unwrap();

    repo.read_or_update::<Square>(b).unwrap().side = 4.0;
    repo.delete(a);
    repo.commit().unwrap();

    let batches = &repo.sink().batches;
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].upserted_ids(), vec![r, a, b, c]);
    assert!(batches[0].deletions.is_empty());

    assert_eq!(batches[1].upserted_ids(), vec![b]);
    assert_eq!(batches[1].deleted_ids(), vec![a, c]);
    assert_eq!(batches[1].upserts[0].area(), 16.0);
}

#[test]
fn failed_flush_keeps_change_sets() {
    let mut repo = Repository::builder().sink(RecordingSink::default()).build();
    let [_, a, _, c] = family(&mut repo);
    repo.commit().unwrap();
    repo.delete(a);

    repo.sink_mut().refuse = true;
    let err = repo.commit().unwrap_err();
    assert_eq!(err, RepositoryError::Sink("storage offline".to_string()));
    assert_eq!(repo.deleted(), &set(&[a, c]));

    repo.sink_mut().refuse = false;
    let batch = repo.commit().unwrap();
    assert_eq!(batch.deleted_ids(), vec![a, c]);
    assert!(repo.deleted().is_empty());
}

#[test]
fn memory_sink_mirrors_committed_state() {
    let table = MemorySink::new();
    let mut repo = Repository::builder().sink(table.clone()).build();
    let [r, a, b, c] = family(&mut repo);
    {
        let mut rect = repo.create::<Rectangle>(b).unwrap();
        rect.width = 2.0;
        rect.height = 8.0;
    }
    repo.commit().unwrap();
    assert_eq!(table.ids().unwrap(), vec![r, a, b, c, id(5)]);
    assert_eq!(table.kind_of(id(5)).unwrap(), Some(ShapeKind::Rectangle));
    assert_eq!(table.row(id(5)).unwrap().unwrap().area(), 16.0);

    repo.delete(a);
    repo.commit().unwrap();
    assert_eq!(table.ids().unwrap(), vec![r, b, id(5)]);
    assert_eq!(table.commits().unwrap(), 2);
}

#[test]
fn log_sink_writes_upserts_before_deletions() {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let mut repo = Repository::builder()
        .sink(LogSink::with_buffer(lines.clone()))
        .build();
    let [_, a, b, _] = family(&mut repo);
    repo.commit().unwrap();
    lines.lock().unwrap().clear();

    repo.read_or_update::<Square>(b).unwrap().side = 1.0;
    repo.delete(a);
    repo.commit().unwrap();

    let ops: Vec<String> = lines
        .lock()
        .unwrap()
        .iter()
        .map(|line| {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            value["op"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(ops, vec!["upsert", "delete", "delete"]);
}

#[test]
fn second_root_is_rejected() {
    let mut repo = Repository::new();
    family(&mut repo);
    let err = repo
        .try_create_kind(ShapeKind::Circle, ShapeId::WILDCARD)
        .map(|g| g.id());
    assert_eq!(
        err,
        Err(RepositoryError::InvalidParent {
            parent_id: ShapeId::WILDCARD
        })
    );
}

#[test]
fn ids_are_not_reused_after_delete() {
    let mut repo = Repository::new();
    let [_, a, b, _] = family(&mut repo);
    repo.delete(a);
    repo.commit().unwrap();

    let next = repo.create::<Circle>(b).map(|g| g.id()).unwrap();
    assert_eq!(next, id(5));
}

#[test]
fn root_is_not_reestablished_after_deleting_the_tree() {
    let mut repo = Repository::new();
    let [r, ..] = family(&mut repo);
    repo.delete(r);
    repo.commit().unwrap();

    assert!(repo.get(r).is_some());
    assert!(repo.create::<Circle>(ShapeId::WILDCARD).is_none());
}
