//! Single-cell handles.
//!
//! A cell is a zero-extent region: it knows its address and reads its value
//! through the store on every access. Cells are cheap to re-create, and two
//! cells are equal exactly when they share an address.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Sub;

use crate::error::{Error, Result};
use crate::geometry::{Bounds, Delta, Direction, Offset, Point};
use crate::store::{Anchor, LiveId, Store};
use crate::view::{Region, View};

pub(crate) enum Slot<T> {
    Live(LiveId),
    /// Outside the store; carries the value the default factory produced.
    OutOfBounds { point: Point, sentinel: T },
}

/// One addressable cell of a grid.
pub struct Cell<T> {
    store: Store<T>,
    slot: Slot<T>,
}

impl<T> Cell<T> {
    pub(crate) fn new(store: Store<T>, slot: Slot<T>) -> Self {
        Self { store, slot }
    }

    pub(crate) fn anchor(&self) -> Anchor {
        match &self.slot {
            Slot::Live(id) => Anchor::Live(*id),
            Slot::OutOfBounds { point, .. } => Anchor::Detached(*point),
        }
    }

    /// Current address; shifts when rows or columns are inserted before it.
    pub fn point(&self) -> Point {
        match &self.slot {
            Slot::Live(id) => self.store.point(*id),
            Slot::OutOfBounds { point, .. } => *point,
        }
    }

    pub fn x(&self) -> i64 {
        self.point().x
    }

    pub fn y(&self) -> i64 {
        self.point().y
    }

    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self.slot, Slot::OutOfBounds { .. })
    }

    /// Borrows the current value.
    ///
    /// The store is borrowed for the duration of `f`, so `f` must not write
    /// to the same grid.
    pub fn with_value<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        match &self.slot {
            Slot::Live(id) => self.store.read(*id, f),
            Slot::OutOfBounds { sentinel, .. } => f(sentinel),
        }
    }

    pub fn value(&self) -> T
    where
        T: Clone,
    {
        self.with_value(T::clone)
    }

    /// Returns true if the value satisfies `predicate`.
    pub fn matches(&self, predicate: impl FnOnce(&T) -> bool) -> bool {
        self.with_value(predicate)
    }

    /// Replaces the stored value. Sentinel cells cannot be written.
    pub fn set(&self, value: T) -> Result<()> {
        self.update(|slot| *slot = value)
    }

    /// Mutates the stored value in place. Sentinel cells cannot be written.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        match &self.slot {
            Slot::Live(id) => Ok(self.store.write(*id, f)),
            Slot::OutOfBounds { point, .. } => Err(Error::OutOfBounds(point.to_string())),
        }
    }

    /// The cell displaced by `delta` from this one.
    pub fn neighbour(&self, delta: impl Into<Delta>) -> Cell<T> {
        self.store.cell(self.point() + delta.into())
    }

    /// The cell `steps` cells away in `direction`.
    pub fn step(&self, direction: Direction, steps: i64) -> Cell<T> {
        self.neighbour(direction * steps)
    }

    pub fn left(&self) -> Cell<T> {
        self.neighbour(Direction::Left)
    }

    pub fn top(&self) -> Cell<T> {
        self.neighbour(Direction::Top)
    }

    pub fn right(&self) -> Cell<T> {
        self.neighbour(Direction::Right)
    }

    pub fn bottom(&self) -> Cell<T> {
        self.neighbour(Direction::Bottom)
    }

    pub fn top_left(&self) -> Cell<T> {
        self.neighbour(Delta::new(-1, -1))
    }

    pub fn top_right(&self) -> Cell<T> {
        self.neighbour(Delta::new(1, -1))
    }

    pub fn bottom_left(&self) -> Cell<T> {
        self.neighbour(Delta::new(-1, 1))
    }

    pub fn bottom_right(&self) -> Cell<T> {
        self.neighbour(Delta::new(1, 1))
    }

    /// Left, top, right and bottom neighbours.
    pub fn direct_neighbours(&self) -> [Cell<T>; 4] {
        Direction::ALL.map(|direction| self.neighbour(direction))
    }

    /// Top-left, top-right, bottom-left and bottom-right neighbours.
    pub fn diagonal_neighbours(&self) -> [Cell<T>; 4] {
        [
            self.top_left(),
            self.top_right(),
            self.bottom_left(),
            self.bottom_right(),
        ]
    }

    /// All eight neighbours, clockwise from the left one.
    pub fn all_neighbours(&self) -> [Cell<T>; 8] {
        [
            self.left(),
            self.top_left(),
            self.top(),
            self.top_right(),
            self.right(),
            self.bottom_right(),
            self.bottom(),
            self.bottom_left(),
        ]
    }
}

impl<T> Region<T> for Cell<T> {
    fn store(&self) -> &Store<T> {
        &self.store
    }

    fn bounds(&self) -> Bounds {
        let point = self.point();
        Bounds::new(point, point)
    }

    fn to_view(&self) -> View<T> {
        let anchor = self.anchor();
        View::window(self.store.clone(), anchor, anchor, Offset::NONE)
    }
}

impl<T: Clone> Clone for Cell<T> {
    fn clone(&self) -> Self {
        let slot = match &self.slot {
            Slot::Live(id) => Slot::Live(*id),
            Slot::OutOfBounds { point, sentinel } => Slot::OutOfBounds {
                point: *point,
                sentinel: sentinel.clone(),
            },
        };
        Self {
            store: self.store.clone(),
            slot,
        }
    }
}

impl<T> PartialEq for Cell<T> {
    fn eq(&self, other: &Self) -> bool {
        self.point() == other.point()
    }
}

impl<T> Eq for Cell<T> {}

impl<T> Hash for Cell<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.point().hash(state);
    }
}

impl<T> Sub for &Cell<T> {
    type Output = Delta;

    fn sub(self, rhs: &Cell<T>) -> Delta {
        self.point() - rhs.point()
    }
}

impl<T: fmt::Debug> fmt::Debug for Cell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let point = self.point();
        if self.is_out_of_bounds() {
            write!(f, "Cell(x={}, y={}, out of bounds)", point.x, point.y)
        } else {
            self.with_value(|value| {
                write!(f, "Cell(x={}, y={}, value={value:?})", point.x, point.y)
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use rustc_hash::FxHashSet;

    use crate::view::Grid;

    use super::*;

    fn numbers() -> Grid<u32> {
        Grid::from_fn(3, 3, |p| (p.y * 3 + p.x) as u32, |_| 0).unwrap()
    }

    #[test]
    fn test_zero_extent_subview_is_same_cell() {
        let grid = numbers();
        let cell = grid.cell(1, 2);
        assert_eq!(cell.cell(0, 0), cell);
        assert_eq!(cell.width(), 1);
        assert_eq!(cell.height(), 1);
    }

    #[test]
    fn test_equality_ignores_value() {
        let grid = numbers();
        let before = grid.cell(1, 1);
        before.set(42).unwrap();
        let after = grid.cell(1, 1);
        assert_eq!(before, after);

        let set: FxHashSet<Cell<u32>> = [before, after, grid.cell(0, 1)].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_neighbours_include_sentinels() {
        let grid = numbers();
        let corner = grid.cell(0, 0);

        let direct: Vec<Point> = corner.direct_neighbours().iter().map(Cell::point).collect();
        assert_eq!(
            direct,
            vec![
                Point::new(-1, 0),
                Point::new(0, -1),
                Point::new(1, 0),
                Point::new(0, 1)
            ]
        );
        let outside = corner
            .all_neighbours()
            .iter()
            .filter(|cell| cell.is_out_of_bounds())
            .count();
        assert_eq!(outside, 5);
        assert_eq!(corner.diagonal_neighbours()[3].value(), 4);
    }

    #[test]
    fn test_cell_difference_is_manhattan() {
        let grid = numbers();
        let delta = &grid.cell(2, 0) - &grid.cell(0, 2);
        assert_eq!(delta, Delta::new(2, -2));
        assert_eq!(delta.distance(), 4);
    }

    #[test]
    fn test_sentinel_cells_reject_writes() {
        let grid = numbers();
        let outside = grid.cell(5, 5);
        assert!(outside.is_out_of_bounds());
        assert_eq!(outside.value(), 0);
        assert!(matches!(outside.set(1), Err(Error::OutOfBounds(_))));
    }

    #[test]
    fn test_value_is_read_through_store() {
        let grid = numbers();
        let cell = grid.cell(2, 2);
        grid.cell(2, 2).update(|value| *value += 100).unwrap();
        assert_eq!(cell.value(), 108);
    }
}
