use std::collections::BTreeSet;
use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::shape::{Geometry, ShapeId};

/// Scoped mutable access to one shape in a repository.
///
/// The shape's `area` is captured when the guard is handed out. When the
/// guard is dropped (on every exit path, unwinding included) the area is
/// measured again and the shape is flagged as modified if it differs.
/// A guard never unflags a shape.
///
/// Detection is by area only: an edit that changes fields but leaves the
/// area where it was is not recorded.
pub struct ShapeGuard<'a, T: Geometry> {
    shape: &'a mut T,
    modified: &'a mut BTreeSet<ShapeId>,
    baseline: f64,
}

impl<'a, T: Geometry> ShapeGuard<'a, T> {
    pub(crate) fn new(shape: &'a mut T, modified: &'a mut BTreeSet<ShapeId>) -> Self {
        let baseline = shape.area();
        ShapeGuard {
            shape,
            modified,
            baseline,
        }
    }

    /// Area observed when the guard was acquired.
    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    /// Whether releasing the guard now would flag the shape.
    pub fn is_dirty(&self) -> bool {
        area_changed(self.baseline, self.shape.area())
    }
}

fn area_changed(before: f64, after: f64) -> bool {
    !(before == after || (before.is_nan() && after.is_nan()))
}

impl<T: Geometry> Deref for ShapeGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.shape
    }
}

impl<T: Geometry> DerefMut for ShapeGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.shape
    }
}

impl<T: Geometry> Drop for ShapeGuard<'_, T> {
    fn drop(&mut self) {
        let id = self.shape.id();
        let area = self.shape.area();
        if area_changed(self.baseline, area) {
            tracing::trace!(%id, before = self.baseline, after = area, "shape flagged modified");
            self.modified.insert(id);
        }
    }
}

impl<T: Geometry + fmt::Debug> fmt::Debug for ShapeGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeGuard")
            .field("shape", &self.shape)
            .field("baseline", &self.baseline)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Circle, Rectangle, Variant};
    use std::panic::{self, AssertUnwindSafe};

    fn circle(radius: f64) -> Circle {
        let mut circle = Circle::new(ShapeId::new(1), ShapeId::WILDCARD);
        circle.radius = radius;
        circle
    }

    #[test]
    fn area_change_flags_on_drop() {
        let mut shape = circle(5.0);
        let mut modified = BTreeSet::new();
        {
            let mut guard = ShapeGuard::new(&mut shape, &mut modified);
            guard.radius = 6.0;
            assert!(guard.is_dirty());
        }
        assert!(modified.contains(&ShapeId::new(1)));
    }

    #[test]
    fn same_value_write_is_clean() {
        let mut shape = circle(5.0);
        let mut modified = BTreeSet::new();
        {
            let mut guard = ShapeGuard::new(&mut shape, &mut modified);
            guard.radius = 5.0;
            assert!(!guard.is_dirty());
        }
        assert!(modified.is_empty());
    }

    #[test]
    fn area_preserving_edit_goes_unnoticed() {
        let mut rect = Rectangle::new(ShapeId::new(2), ShapeId::new(1));
        rect.width = 2.0;
        rect.height = 6.0;
        let mut modified = BTreeSet::new();
        {
            let mut guard = ShapeGuard::new(&mut rect, &mut modified);
            guard.width = 3.0;
            guard.height = 4.0;
        }
        assert!(modified.is_empty());
        assert_eq!(rect.width, 3.0);
    }

    #[test]
    fn never_unflags() {
        let mut shape = circle(5.0);
        let mut modified = BTreeSet::from([ShapeId::new(1)]);
        drop(ShapeGuard::new(&mut shape, &mut modified));
        assert!(modified.contains(&ShapeId::new(1)));
    }

    #[test]
    fn flags_when_unwinding() {
        let mut shape = circle(1.0);
        let mut modified = BTreeSet::new();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut guard = ShapeGuard::new(&mut shape, &mut modified);
            guard.radius = 2.0;
            panic!("edit aborted");
        }));
        assert!(result.is_err());
        assert!(modified.contains(&ShapeId::new(1)));
    }

    #[test]
    fn nan_to_nan_is_clean() {
        assert!(!area_changed(f64::NAN, f64::NAN));
        assert!(area_changed(f64::NAN, 1.0));
        assert!(!area_changed(0.0, -0.0));
    }
}
