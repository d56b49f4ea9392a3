use std::sync::{Arc, Mutex};

use shape_store::{telemetry, Circle, Geometry, LogSink, Repository, RepositoryError, ShapeId, Square};
use tracing::info;

fn main() -> Result<(), RepositoryError> {
    telemetry::init();

    let lines = Arc::new(Mutex::new(Vec::new()));
    let mut repo = Repository::builder()
        .sink(LogSink::with_buffer(lines.clone()))
        .build();

    let root = {
        let mut circle = repo.try_create::<Circle>(ShapeId::WILDCARD)?;
        circle.radius = 5.0;
        circle.id()
    };
    info!(%root, "root circle created");

    let child = {
        let mut square = repo.try_create::<Square>(root)?;
        square.side = 5.0;
        square.id()
    };
    info!(%child, modified = ?repo.modified(), "square created under root");

    repo.commit()?;
    info!(modified = ?repo.modified(), "first commit");

    if let Some(mut square) = repo.read_or_update::<Square>(child) {
        square.side = 10.0;
    }
    info!(modified = ?repo.modified(), "square resized");

    let deleted = repo.delete(root);
    info!(?deleted, modified = ?repo.modified(), "root deleted");

    repo.commit()?;

    if let Ok(lines) = lines.lock() {
        for line in lines.iter() {
            info!("{}", line);
        }
    }
    Ok(())
}
