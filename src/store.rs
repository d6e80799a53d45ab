//! Backing store shared by every view of one logical grid.
//!
//! The store owns all cell data. Rows and columns carry stable identities so
//! that inserting new ones shifts existing cells without invalidating views
//! anchored to them: a view remembers which row and column its corners sit
//! in, not their numeric index.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::cell::{Cell, Slot};
use crate::error::{Error, Result};
use crate::geometry::Point;

/// Produces the value of a coordinate that has no stored cell yet.
pub type Factory<T> = Box<dyn FnMut(Point) -> T>;

/// Stable identity of a row or column, unaffected by insertion.
type LineId = u32;

/// Position and identity of a live cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct LiveId {
    column: LineId,
    row: LineId,
}

/// What a view corner is attached to.
///
/// Corners inside the store follow their cell through insertions. Corners
/// outside the store stay at a fixed coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Anchor {
    Live(LiveId),
    Detached(Point),
}

/// Bidirectional mapping between positions and identities along one axis.
#[derive(Debug)]
struct Lines {
    /// Identity at each position.
    ids: Vec<LineId>,
    /// Position of each identity, indexed by identity.
    positions: Vec<usize>,
}

impl Lines {
    fn new(len: usize) -> Self {
        Self {
            ids: (0..len as LineId).collect(),
            positions: (0..len).collect(),
        }
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    fn id(&self, position: usize) -> LineId {
        self.ids[position]
    }

    fn position(&self, id: LineId) -> usize {
        self.positions[id as usize]
    }

    /// Allocates `count` fresh identities at `at`, shifting later ones.
    fn insert(&mut self, at: usize, count: usize) {
        let first = self.positions.len() as LineId;
        self.ids.splice(at..at, first..first + count as LineId);
        self.positions.resize(self.positions.len() + count, 0);
        for (position, &id) in self.ids.iter().enumerate().skip(at) {
            self.positions[id as usize] = position;
        }
    }
}

struct Inner<T> {
    /// Row-major cell values; every row has the same length.
    rows: Vec<Vec<T>>,
    columns: Lines,
    row_lines: Lines,
    default: Factory<T>,
    auto_expand: bool,
    /// Set once the shape is fixed; insertion and auto-expand are refused.
    shape_locked: bool,
}

impl<T> Inner<T> {
    fn width(&self) -> i64 {
        self.columns.len() as i64
    }

    fn height(&self) -> i64 {
        self.row_lines.len() as i64
    }

    fn contains(&self, point: Point) -> bool {
        (0..self.width()).contains(&point.x) && (0..self.height()).contains(&point.y)
    }

    fn live_id(&self, point: Point) -> Option<LiveId> {
        self.contains(point).then(|| LiveId {
            column: self.columns.id(point.x as usize),
            row: self.row_lines.id(point.y as usize),
        })
    }

    fn point(&self, id: LiveId) -> Point {
        Point::new(
            self.columns.position(id.column) as i64,
            self.row_lines.position(id.row) as i64,
        )
    }

    fn insert_rows(&mut self, at: usize, count: usize, fill: Option<&mut dyn FnMut(Point) -> T>) {
        let width = self.columns.len();
        let fill: &mut dyn FnMut(Point) -> T = match fill {
            Some(fill) => fill,
            None => &mut *self.default,
        };
        let new_rows: Vec<Vec<T>> = (at..at + count)
            .map(|y| {
                (0..width)
                    .map(|x| fill(Point::new(x as i64, y as i64)))
                    .collect()
            })
            .collect();
        self.rows.splice(at..at, new_rows);
        self.row_lines.insert(at, count);
    }

    fn insert_columns(
        &mut self,
        at: usize,
        count: usize,
        fill: Option<&mut dyn FnMut(Point) -> T>,
    ) {
        let fill: &mut dyn FnMut(Point) -> T = match fill {
            Some(fill) => fill,
            None => &mut *self.default,
        };
        for (y, row) in self.rows.iter_mut().enumerate() {
            let new_cells: Vec<T> = (at..at + count)
                .map(|x| fill(Point::new(x as i64, y as i64)))
                .collect();
            row.splice(at..at, new_cells);
        }
        self.columns.insert(at, count);
    }

    /// Grows the store until `point` is covered.
    ///
    /// Returns the identity of the requested cell, which sits at a shifted
    /// coordinate when growth happened on the left or top side.
    fn expand_to(&mut self, point: Point) -> LiveId {
        let mut target = point;
        if point.x < 0 {
            self.insert_columns(0, point.x.unsigned_abs() as usize, None);
            target.x = 0;
        } else if point.x >= self.width() {
            let width = self.width();
            self.insert_columns(width as usize, (point.x - width + 1) as usize, None);
        }
        if point.y < 0 {
            self.insert_rows(0, point.y.unsigned_abs() as usize, None);
            target.y = 0;
        } else if point.y >= self.height() {
            let height = self.height();
            self.insert_rows(height as usize, (point.y - height + 1) as usize, None);
        }
        debug!(
            requested = %point,
            width = self.width(),
            height = self.height(),
            "auto-expanded grid"
        );
        LiveId {
            column: self.columns.id(target.x as usize),
            row: self.row_lines.id(target.y as usize),
        }
    }
}

/// Shared handle to the cell data of one logical grid.
///
/// Cloning the handle is cheap and never copies cells: every view, row and
/// cell of a grid holds a clone of the same store.
pub struct Store<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Store")
            .field("width", &inner.width())
            .field("height", &inner.height())
            .field("auto_expand", &inner.auto_expand)
            .finish()
    }
}

impl<T> Store<T> {
    /// Builds a store from row-major values.
    ///
    /// Fails when there are no rows, no columns, or when any row differs in
    /// length from the first one.
    pub(crate) fn new(rows: Vec<Vec<T>>, default: Factory<T>) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(Error::Shape("grid has no rows".to_string()));
        };
        let width = first.len();
        if width == 0 {
            return Err(Error::Shape("grid has no columns".to_string()));
        }
        if let Some((y, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != width) {
            return Err(Error::Shape(format!(
                "row {y} has {} cells, expected {width}",
                row.len()
            )));
        }

        let height = rows.len();
        Ok(Self {
            inner: Rc::new(RefCell::new(Inner {
                rows,
                columns: Lines::new(width),
                row_lines: Lines::new(height),
                default,
                auto_expand: false,
                shape_locked: false,
            })),
        })
    }

    pub fn width(&self) -> i64 {
        self.inner.borrow().width()
    }

    pub fn height(&self) -> i64 {
        self.inner.borrow().height()
    }

    pub fn auto_expand(&self) -> bool {
        self.inner.borrow().auto_expand
    }

    /// Returns true if both handles refer to the same cell data.
    pub fn same_store(&self, other: &Store<T>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn set_auto_expand(&self, auto_expand: bool) {
        let mut inner = self.inner.borrow_mut();
        inner.auto_expand = auto_expand && !inner.shape_locked;
    }

    /// Freezes the number of rows and columns for good.
    pub(crate) fn lock_shape(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.shape_locked = true;
        inner.auto_expand = false;
    }

    pub fn is_shape_locked(&self) -> bool {
        self.inner.borrow().shape_locked
    }

    pub(crate) fn anchor(&self, point: Point) -> Anchor {
        match self.inner.borrow().live_id(point) {
            Some(id) => Anchor::Live(id),
            None => Anchor::Detached(point),
        }
    }

    pub(crate) fn resolve(&self, anchor: Anchor) -> Point {
        match anchor {
            Anchor::Live(id) => self.inner.borrow().point(id),
            Anchor::Detached(point) => point,
        }
    }

    pub(crate) fn point(&self, id: LiveId) -> Point {
        self.inner.borrow().point(id)
    }

    /// Materializes the cell at `point`.
    ///
    /// Outside the store this either grows the store (auto-expand) or
    /// returns a sentinel cell valued by the default factory.
    pub(crate) fn cell(&self, point: Point) -> Cell<T> {
        let mut inner = self.inner.borrow_mut();
        if let Some(id) = inner.live_id(point) {
            return Cell::new(self.clone(), Slot::Live(id));
        }
        if inner.auto_expand {
            let id = inner.expand_to(point);
            return Cell::new(self.clone(), Slot::Live(id));
        }
        let sentinel = (inner.default)(point);
        Cell::new(self.clone(), Slot::OutOfBounds { point, sentinel })
    }

    pub(crate) fn read<R>(&self, id: LiveId, f: impl FnOnce(&T) -> R) -> R {
        let inner = self.inner.borrow();
        let point = inner.point(id);
        f(&inner.rows[point.y as usize][point.x as usize])
    }

    pub(crate) fn write<R>(&self, id: LiveId, f: impl FnOnce(&mut T) -> R) -> R {
        let mut inner = self.inner.borrow_mut();
        let point = inner.point(id);
        f(&mut inner.rows[point.y as usize][point.x as usize])
    }

    /// Inserts `count` rows right after row `y`; `-1` inserts at the top.
    pub(crate) fn insert_rows_after(
        &self,
        y: i64,
        count: usize,
        fill: Option<&mut dyn FnMut(Point) -> T>,
    ) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.shape_locked {
            return Err(Error::Precondition(
                "cannot insert rows into a grid of fixed shape".to_string(),
            ));
        }
        let height = inner.height();
        if !(-1..height).contains(&y) {
            return Err(Error::Precondition(format!(
                "cannot insert rows after row {y} of a grid with {height} rows"
            )));
        }
        inner.insert_rows((y + 1) as usize, count, fill);
        debug!(after = y, count, height = inner.height(), "inserted rows");
        Ok(())
    }

    /// Inserts `count` columns right after column `x`; `-1` inserts at the left.
    pub(crate) fn insert_columns_after(
        &self,
        x: i64,
        count: usize,
        fill: Option<&mut dyn FnMut(Point) -> T>,
    ) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.shape_locked {
            return Err(Error::Precondition(
                "cannot insert columns into a grid of fixed shape".to_string(),
            ));
        }
        let width = inner.width();
        if !(-1..width).contains(&x) {
            return Err(Error::Precondition(format!(
                "cannot insert columns after column {x} of a grid with {width} columns"
            )));
        }
        inner.insert_columns((x + 1) as usize, count, fill);
        debug!(after = x, count, width = inner.width(), "inserted columns");
        Ok(())
    }
}
