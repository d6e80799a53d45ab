//! Zero-copy views over a grid.
//!
//! Every region (the whole grid, a rectangular window, a single row or column,
//! a single cell) shares the same algebra through [`Region`]: relative cell
//! access, slicing into smaller regions, growing past the edges and
//! row-major traversal. Regions store only their corner anchors and padding;
//! sizes and values are resolved against the store on each access, so edits
//! are visible to every outstanding view.

use std::fmt;
use std::ops::RangeBounds;

use crate::cell::Cell;
use crate::error::{Error, Result};
use crate::geometry::{span, Bounds, Offset, Point};
use crate::store::{Anchor, Store};

/// The view algebra shared by all grid regions.
///
/// All coordinates taken by the provided methods are relative to the
/// region's top-left corner, including any padding added by `grow`.
pub trait Region<T> {
    /// The store this region looks into.
    fn store(&self) -> &Store<T>;

    /// Current corners in store coordinates.
    fn bounds(&self) -> Bounds;

    /// This region as a plain rectangular view.
    fn to_view(&self) -> View<T>;

    fn min_x(&self) -> i64 {
        self.bounds().min.x
    }

    fn min_y(&self) -> i64 {
        self.bounds().min.y
    }

    fn max_x(&self) -> i64 {
        self.bounds().max.x
    }

    fn max_y(&self) -> i64 {
        self.bounds().max.y
    }

    fn width(&self) -> i64 {
        self.bounds().width()
    }

    fn height(&self) -> i64 {
        self.bounds().height()
    }

    /// The cell at relative `(x, y)`; may lie outside the region.
    fn cell(&self, x: i64, y: i64) -> Cell<T> {
        let min = self.bounds().min;
        self.store().cell(Point::new(min.x + x, min.y + y))
    }

    fn at(&self, point: Point) -> Cell<T> {
        self.cell(point.x, point.y)
    }

    /// Part of relative row `y`, spanning relative columns `xs`.
    fn row(&self, xs: impl RangeBounds<i64>, y: i64) -> Row<T> {
        let (first, last) = span(xs, self.width());
        Row::new(window(self, Point::new(first, y), Point::new(last, y)))
    }

    /// Part of relative column `x`, spanning relative rows `ys`.
    fn column(&self, x: i64, ys: impl RangeBounds<i64>) -> Column<T> {
        let (first, last) = span(ys, self.height());
        Column::new(window(self, Point::new(x, first), Point::new(x, last)))
    }

    /// Rectangular sub-view over relative columns `xs` and rows `ys`.
    fn view(&self, xs: impl RangeBounds<i64>, ys: impl RangeBounds<i64>) -> View<T> {
        let (first_x, last_x) = span(xs, self.width());
        let (first_y, last_y) = span(ys, self.height());
        window(
            self,
            Point::new(first_x, first_y),
            Point::new(last_x, last_y),
        )
    }

    /// Widens the region by `offset` on each side.
    ///
    /// The new area may extend past the store; its cells then surface as
    /// sentinels, or grow the store when auto-expand is enabled.
    fn grow(&self, offset: Offset) -> View<T> {
        self.to_view().grown(offset)
    }

    /// Row-major traversal of the region's cells.
    fn cells(&self) -> Cells<T> {
        Cells::new(self.to_view())
    }
}

/// Builds a window between two relative corners of `region`.
fn window<T, R: Region<T> + ?Sized>(region: &R, first: Point, last: Point) -> View<T> {
    let min = region.bounds().min;
    let store = region.store();
    let top_left = store.anchor(Point::new(min.x + first.x, min.y + first.y));
    let bottom_right = store.anchor(Point::new(min.x + last.x, min.y + last.y));
    View::window(store.clone(), top_left, bottom_right, Offset::NONE)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Frame {
    /// Always spans the whole store, whatever its current size.
    Whole,
    Window {
        top_left: Anchor,
        bottom_right: Anchor,
        offset: Offset,
    },
}

/// A rectangular window over a grid.
pub struct View<T> {
    store: Store<T>,
    frame: Frame,
}

impl<T> Clone for View<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            frame: self.frame,
        }
    }
}

impl<T> View<T> {
    pub(crate) fn window(
        store: Store<T>,
        top_left: Anchor,
        bottom_right: Anchor,
        offset: Offset,
    ) -> Self {
        Self {
            store,
            frame: Frame::Window {
                top_left,
                bottom_right,
                offset,
            },
        }
    }

    fn whole(store: Store<T>) -> Self {
        Self {
            store,
            frame: Frame::Whole,
        }
    }

    fn full_bounds(&self) -> Bounds {
        Bounds::new(
            Point::ORIGIN,
            Point::new(self.store.width() - 1, self.store.height() - 1),
        )
    }

    pub(crate) fn grown(&self, offset: Offset) -> View<T> {
        let offset = offset.clamped();
        match self.frame {
            Frame::Whole => {
                let full = self.full_bounds();
                View::window(
                    self.store.clone(),
                    self.store.anchor(full.min),
                    self.store.anchor(full.max),
                    offset,
                )
            }
            Frame::Window {
                top_left,
                bottom_right,
                offset: current,
            } => View::window(self.store.clone(), top_left, bottom_right, current + offset),
        }
    }

    /// Returns true if this view spans exactly the whole store, unpadded.
    pub fn is_full(&self) -> bool {
        match self.frame {
            Frame::Whole => true,
            Frame::Window { offset, .. } => {
                offset == Offset::NONE && self.bounds() == self.full_bounds()
            }
        }
    }

    fn require_full(&self, what: &str) -> Result<()> {
        if self.is_full() {
            Ok(())
        } else {
            Err(Error::Precondition(format!(
                "only full views can insert {what}"
            )))
        }
    }

    /// Inserts `count` default-valued rows after row `y` (`-1` = top).
    ///
    /// Fails with [`Error::Precondition`] unless the view is full.
    pub fn insert_rows_after(&self, y: i64, count: usize) -> Result<()> {
        self.require_full("rows")?;
        self.store.insert_rows_after(y, count, None)
    }

    /// Like [`View::insert_rows_after`], seeding new cells from `fill`.
    pub fn insert_rows_after_with(
        &self,
        y: i64,
        count: usize,
        mut fill: impl FnMut(Point) -> T,
    ) -> Result<()> {
        self.require_full("rows")?;
        self.store.insert_rows_after(y, count, Some(&mut fill))
    }

    /// Inserts `count` default-valued columns after column `x` (`-1` = left).
    ///
    /// Fails with [`Error::Precondition`] unless the view is full.
    pub fn insert_columns_after(&self, x: i64, count: usize) -> Result<()> {
        self.require_full("columns")?;
        self.store.insert_columns_after(x, count, None)
    }

    /// Like [`View::insert_columns_after`], seeding new cells from `fill`.
    pub fn insert_columns_after_with(
        &self,
        x: i64,
        count: usize,
        mut fill: impl FnMut(Point) -> T,
    ) -> Result<()> {
        self.require_full("columns")?;
        self.store.insert_columns_after(x, count, Some(&mut fill))
    }

    /// The whole relative row `y`.
    pub fn row_at(&self, y: i64) -> Row<T> {
        self.row(.., y)
    }

    /// The whole relative column `x`.
    pub fn column_at(&self, x: i64) -> Column<T> {
        self.column(x, ..)
    }

    pub fn rows(&self) -> Vec<Row<T>> {
        (0..self.height()).map(|y| self.row_at(y)).collect()
    }

    pub fn columns(&self) -> Vec<Column<T>> {
        (0..self.width()).map(|x| self.column_at(x)).collect()
    }
}

impl<T> Region<T> for View<T> {
    fn store(&self) -> &Store<T> {
        &self.store
    }

    fn bounds(&self) -> Bounds {
        match self.frame {
            Frame::Whole => self.full_bounds(),
            Frame::Window {
                top_left,
                bottom_right,
                offset,
            } => Bounds::new(self.store.resolve(top_left), self.store.resolve(bottom_right))
                .grow(offset),
        }
    }

    fn to_view(&self) -> View<T> {
        self.clone()
    }
}

impl<T> fmt::Debug for View<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bounds = self.bounds();
        write!(
            f,
            "View({}x{}, x={}..={}, y={}..={})",
            bounds.width(),
            bounds.height(),
            bounds.min.x,
            bounds.max.x,
            bounds.min.y,
            bounds.max.y
        )
    }
}

/// A whole grid: the view that owns construction and always spans the store.
pub struct Grid<T> {
    view: View<T>,
}

impl<T> Clone for Grid<T> {
    fn clone(&self) -> Self {
        Self {
            view: self.view.clone(),
        }
    }
}

impl<T> Grid<T> {
    /// Builds a grid from row-major values.
    ///
    /// `default` supplies the value of out-of-bounds reads and of rows or
    /// columns inserted without an explicit fill. It is called once per
    /// materialized coordinate.
    pub fn new(rows: Vec<Vec<T>>, default: impl FnMut(Point) -> T + 'static) -> Result<Self> {
        let store = Store::new(rows, Box::new(default))?;
        Ok(Self {
            view: View::whole(store),
        })
    }

    /// Builds a `width` x `height` grid, seeding each cell from `init`.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut init: impl FnMut(Point) -> T,
        default: impl FnMut(Point) -> T + 'static,
    ) -> Result<Self> {
        let rows = (0..height as i64)
            .map(|y| (0..width as i64).map(|x| init(Point::new(x, y))).collect())
            .collect();
        Self::new(rows, default)
    }

    /// Builds a grid from text lines, mapping each character through `mapper`.
    pub fn parse<S: AsRef<str>>(
        lines: impl IntoIterator<Item = S>,
        mut mapper: impl FnMut(char) -> T,
        default: impl FnMut(Point) -> T + 'static,
    ) -> Result<Self> {
        let rows = lines
            .into_iter()
            .map(|line| line.as_ref().chars().map(&mut mapper).collect())
            .collect();
        Self::new(rows, default)
    }

    /// Enables or disables growing on out-of-bounds access.
    pub fn with_auto_expand(self, auto_expand: bool) -> Self {
        self.view.store.set_auto_expand(auto_expand);
        self
    }

    /// The full view.
    pub fn view_all(&self) -> &View<T> {
        &self.view
    }

    pub fn insert_rows_after(&self, y: i64, count: usize) -> Result<()> {
        self.view.insert_rows_after(y, count)
    }

    pub fn insert_rows_after_with(
        &self,
        y: i64,
        count: usize,
        fill: impl FnMut(Point) -> T,
    ) -> Result<()> {
        self.view.insert_rows_after_with(y, count, fill)
    }

    pub fn insert_columns_after(&self, x: i64, count: usize) -> Result<()> {
        self.view.insert_columns_after(x, count)
    }

    pub fn insert_columns_after_with(
        &self,
        x: i64,
        count: usize,
        fill: impl FnMut(Point) -> T,
    ) -> Result<()> {
        self.view.insert_columns_after_with(x, count, fill)
    }

    pub fn row_at(&self, y: i64) -> Row<T> {
        self.view.row_at(y)
    }

    pub fn column_at(&self, x: i64) -> Column<T> {
        self.view.column_at(x)
    }

    pub fn rows(&self) -> Vec<Row<T>> {
        self.view.rows()
    }

    pub fn columns(&self) -> Vec<Column<T>> {
        self.view.columns()
    }
}

impl Grid<char> {
    /// Builds a character grid; out-of-bounds cells read as `pad`.
    pub fn from_lines<S: AsRef<str>>(
        lines: impl IntoIterator<Item = S>,
        pad: char,
    ) -> Result<Self> {
        Self::parse(lines, |c| c, move |_| pad)
    }
}

impl<T> Region<T> for Grid<T> {
    fn store(&self) -> &Store<T> {
        &self.view.store
    }

    fn bounds(&self) -> Bounds {
        self.view.bounds()
    }

    fn to_view(&self) -> View<T> {
        self.view.clone()
    }
}

impl<T> fmt::Debug for Grid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grid({}x{})", self.width(), self.height())
    }
}

/// A horizontal, single-row view.
pub struct Row<T> {
    view: View<T>,
}

impl<T> Row<T> {
    pub(crate) fn new(view: View<T>) -> Self {
        debug_assert_eq!(view.height(), 1, "row views span exactly one row");
        Self { view }
    }

    pub fn y(&self) -> i64 {
        self.min_y()
    }

    /// The cell at relative column `x`.
    pub fn get(&self, x: i64) -> Cell<T> {
        self.cell(x, 0)
    }
}

impl<T> Clone for Row<T> {
    fn clone(&self) -> Self {
        Self {
            view: self.view.clone(),
        }
    }
}

impl<T> Region<T> for Row<T> {
    fn store(&self) -> &Store<T> {
        &self.view.store
    }

    fn bounds(&self) -> Bounds {
        self.view.bounds()
    }

    fn to_view(&self) -> View<T> {
        self.view.clone()
    }
}

impl<T> fmt::Debug for Row<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row(y={}, x={}..={})", self.y(), self.min_x(), self.max_x())
    }
}

/// A vertical, single-column view.
pub struct Column<T> {
    view: View<T>,
}

impl<T> Column<T> {
    pub(crate) fn new(view: View<T>) -> Self {
        debug_assert_eq!(view.width(), 1, "column views span exactly one column");
        Self { view }
    }

    pub fn x(&self) -> i64 {
        self.min_x()
    }

    /// The cell at relative row `y`.
    pub fn get(&self, y: i64) -> Cell<T> {
        self.cell(0, y)
    }
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            view: self.view.clone(),
        }
    }
}

impl<T> Region<T> for Column<T> {
    fn store(&self) -> &Store<T> {
        &self.view.store
    }

    fn bounds(&self) -> Bounds {
        self.view.bounds()
    }

    fn to_view(&self) -> View<T> {
        self.view.clone()
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Column(x={}, y={}..={})", self.x(), self.min_y(), self.max_y())
    }
}

/// Lazy row-major traversal of a region.
///
/// Sizes are re-read on every step, so growth of the underlying store during
/// traversal is picked up.
pub struct Cells<T> {
    view: View<T>,
    x: i64,
    y: i64,
}

impl<T> Cells<T> {
    fn new(view: View<T>) -> Self {
        Self { view, x: 0, y: 0 }
    }
}

impl<T> Iterator for Cells<T> {
    type Item = Cell<T>;

    fn next(&mut self) -> Option<Cell<T>> {
        let bounds = self.view.bounds();
        if self.x >= bounds.width() {
            self.x = 0;
            self.y += 1;
        }
        if self.y >= bounds.height() {
            return None;
        }
        let cell = self.view.cell(self.x, self.y);
        self.x += 1;
        Some(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits() -> Grid<char> {
        Grid::from_lines(["12", "34"], '.').unwrap()
    }

    fn values<T: Clone>(region: &impl Region<T>) -> Vec<T> {
        region.cells().map(|cell| cell.value()).collect()
    }

    #[test]
    fn test_in_bounds_reads_return_original_values() {
        let grid = digits();
        assert_eq!(grid.cell(0, 0).value(), '1');
        assert_eq!(grid.cell(1, 1).value(), '4');
        assert!(grid.cells().all(|cell| !cell.is_out_of_bounds()));
    }

    #[test]
    fn test_out_of_bounds_read_leaves_store_unchanged() {
        let grid = digits();
        let cell = grid.cell(2, 0);
        assert!(cell.is_out_of_bounds());
        assert_eq!(cell.value(), '.');
        assert_eq!((grid.width(), grid.height()), (2, 2));
    }

    #[test]
    fn test_insert_row_shifts_following_rows() {
        let grid = digits();
        grid.insert_rows_after_with(0, 1, |_| 'X').unwrap();
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.cell(0, 1).value(), 'X');
        assert_eq!(grid.cell(0, 2).value(), '3');
        assert_eq!(grid.cell(0, 0).value(), '1');
    }

    #[test]
    fn test_insert_rows_moves_each_existing_cell() {
        let grid = Grid::from_fn(3, 4, |p| p, |p| p).unwrap();
        let before: Vec<Cell<Point>> = grid.cells().collect();
        grid.insert_rows_after(1, 2).unwrap();
        assert_eq!(grid.height(), 6);
        for cell in before {
            let original = cell.value();
            let expected_y = if original.y > 1 { original.y + 2 } else { original.y };
            assert_eq!(cell.point(), Point::new(original.x, expected_y));
        }
    }

    #[test]
    fn test_views_keep_their_cells_across_insertion() {
        let grid = Grid::from_lines(["abc", "def", "ghi"], '.').unwrap();
        let lower = grid.view(1..=2, 1..=2);
        let last_row = grid.row_at(2);

        grid.insert_columns_after_with(0, 2, |_| '+').unwrap();
        grid.insert_rows_after(-1, 1).unwrap();

        assert_eq!(values(&lower), vec!['e', 'f', 'h', 'i']);
        assert_eq!(values(&last_row), vec!['g', '+', '+', 'h', 'i']);
        assert_eq!(last_row.y(), 3);
    }

    #[test]
    fn test_grow_adds_padding_on_each_side() {
        let grid = digits();
        let grown = grid.grow(Offset::new(1, 2, 3, 4));
        assert_eq!(grown.width(), grid.width() + 4);
        assert_eq!(grown.height(), grid.height() + 6);
        assert!(grown.cell(0, 0).is_out_of_bounds());
        assert_eq!(grown.cell(1, 2).value(), '1');

        let twice = grown.grow(Offset::uniform(1));
        assert_eq!(twice.width(), grown.width() + 2);
        assert_eq!(twice.height(), grown.height() + 2);
    }

    #[test]
    fn test_negative_padding_never_shrinks() {
        let grid = digits();
        let narrow = Offset {
            left: -1,
            right: -5,
            ..Offset::NONE
        };
        let grown = grid.grow(narrow);
        assert_eq!(grown.width(), grid.width());
        assert_eq!(grown.row_at(0).width(), grid.width());
        assert_eq!(Offset::new(-1, 2, -3, 0), Offset::new(0, 2, 0, 0));
    }

    #[test]
    fn test_grown_cell_covers_its_neighbourhood() {
        let grid = digits();
        let around: Vec<char> = grid
            .cell(0, 0)
            .grow(Offset::uniform(1))
            .cells()
            .map(|c| c.value())
            .collect();
        assert_eq!(around, vec!['.', '.', '.', '.', '1', '2', '.', '3', '4']);
    }

    #[test]
    fn test_insertion_requires_full_view() {
        let grid = digits();
        let partial = grid.view(0..1, ..);
        assert!(matches!(
            partial.insert_rows_after(0, 1),
            Err(Error::Precondition(_))
        ));
        let padded = grid.grow(Offset::uniform(1));
        assert!(matches!(
            padded.insert_columns_after(0, 1),
            Err(Error::Precondition(_))
        ));

        let exact = grid.view(.., ..);
        assert!(exact.is_full());
        exact.insert_columns_after(1, 1).unwrap();
        assert_eq!(grid.width(), 3);
    }

    #[test]
    fn test_traversal_is_restartable_and_live() {
        let grid = digits();
        let view = grid.view(.., ..);
        assert_eq!(values(&view), vec!['1', '2', '3', '4']);
        grid.cell(1, 0).set('9').unwrap();
        assert_eq!(values(&view), vec!['1', '9', '3', '4']);
    }

    #[test]
    fn test_auto_expand_on_grown_traversal() {
        let grid = digits().with_auto_expand(true);
        let count = grid.grow(Offset::uniform(1)).cells().count();
        assert_eq!(count, 16);
        assert_eq!((grid.width(), grid.height()), (4, 4));
        assert_eq!(grid.cell(1, 1).value(), '1');
        assert!(grid.cells().all(|cell| !cell.is_out_of_bounds()));
    }

    #[test]
    fn test_rows_and_columns_slice_the_view() {
        let grid = Grid::from_lines(["abc", "def"], '.').unwrap();
        let columns: Vec<String> = grid
            .columns()
            .iter()
            .map(|column| column.cells().map(|c| c.value()).collect())
            .collect();
        assert_eq!(columns, vec!["ad", "be", "cf"]);
        assert_eq!(grid.column_at(1).get(1).value(), 'e');
        assert_eq!(grid.row(1..3, 1).get(0).value(), 'e');
    }

    #[test]
    fn test_ragged_lines_fail() {
        assert!(matches!(
            Grid::from_lines(["ab", "c"], '.'),
            Err(Error::Shape(_))
        ));
    }
}
