//! Coordinate-compressed grids.
//!
//! A sparse grid keeps a few "fixed" real rows and columns individually
//! addressable and collapses every gap between them into a single compressed
//! cell annotated with the real span it stands for. Algorithms walk the small
//! dense grid while [`SparseRegion::real_count`] reports real-world areas.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::{Bound, RangeBounds};

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::cell::Cell;
use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::view::{Column, Grid, Region, Row, View};

/// The real rectangle a compressed cell represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SparseMeta {
    pub real_x: i64,
    pub real_y: i64,
    pub real_width: i64,
    pub real_height: i64,
}

impl SparseMeta {
    pub const fn last_real_x(&self) -> i64 {
        self.real_x + self.real_width - 1
    }

    pub const fn last_real_y(&self) -> i64 {
        self.real_y + self.real_height - 1
    }

    /// Number of real cells covered.
    pub const fn area(&self) -> i64 {
        self.real_width * self.real_height
    }
}

/// A compressed cell's value together with its real span.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SparseData<T> {
    pub value: T,
    pub meta: SparseMeta,
}

impl<T: fmt::Display> fmt::Display for SparseData<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

/// Fixed real coordinates along one axis, and where the axis ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SparseAxis {
    fixed: BTreeSet<i64>,
    /// Exclusive upper bound of the real axis.
    end: i64,
}

impl SparseAxis {
    pub fn new(fixed: impl IntoIterator<Item = i64>, end: i64) -> Self {
        Self {
            fixed: fixed.into_iter().collect(),
            end,
        }
    }

    /// An axis ending right after its largest fixed coordinate.
    pub fn spanning(fixed: impl IntoIterator<Item = i64>) -> Self {
        let fixed: BTreeSet<i64> = fixed.into_iter().collect();
        let end = fixed.last().map_or(0, |&last| last.max(0) + 1);
        Self { fixed, end }
    }

    /// Splits the axis into alternating precise and gap segments.
    ///
    /// Coordinate `0` is always fixed. Every fixed coordinate becomes a
    /// span-1 segment; each non-empty gap up to the next fixed coordinate, or
    /// up to `end`, becomes one segment.
    fn segments(&self, axis: &str) -> Result<Vec<Segment>> {
        if self.fixed.is_empty() {
            return Err(Error::Shape(format!("no fixed {axis}")));
        }
        let mut points = self.fixed.clone();
        points.insert(0);
        let points: Vec<i64> = points.into_iter().collect();
        if let Some(&last) = points.last() {
            if self.end <= last {
                return Err(Error::Shape(format!(
                    "{axis} end {} does not lie past fixed coordinate {last}",
                    self.end
                )));
            }
        }

        let mut segments = Vec::with_capacity(points.len() * 2);
        for (i, &point) in points.iter().enumerate() {
            segments.push(Segment {
                start: point,
                len: 1,
            });
            let next = points.get(i + 1).copied().unwrap_or(self.end);
            if next - point > 1 {
                segments.push(Segment {
                    start: point + 1,
                    len: next - point - 1,
                });
            }
        }
        Ok(segments)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Segment {
    start: i64,
    len: i64,
}

impl Segment {
    fn last(&self) -> i64 {
        self.start + self.len - 1
    }
}

/// Lookup tables from real coordinates to compressed indices on one axis.
#[derive(Clone, Debug)]
struct AxisIndex {
    name: &'static str,
    segments: Vec<Segment>,
    precise: FxHashMap<i64, i64>,
    starts: FxHashMap<i64, i64>,
    ends: FxHashMap<i64, i64>,
}

impl AxisIndex {
    fn new(name: &'static str, segments: Vec<Segment>) -> Self {
        let mut precise = FxHashMap::default();
        let mut starts = FxHashMap::default();
        let mut ends = FxHashMap::default();
        for (index, segment) in segments.iter().enumerate() {
            let index = index as i64;
            if segment.len == 1 {
                precise.insert(segment.start, index);
            }
            starts.insert(segment.start, index);
            ends.insert(segment.last(), index);
        }
        Self {
            name,
            segments,
            precise,
            starts,
            ends,
        }
    }

    fn real_start(&self) -> i64 {
        self.segments.first().map_or(0, |segment| segment.start)
    }

    fn real_end(&self) -> i64 {
        self.segments.last().map_or(0, |segment| segment.last() + 1)
    }

    fn exact(&self, real: i64) -> Result<i64> {
        self.precise
            .get(&real)
            .copied()
            .ok_or_else(|| Error::Lookup(format!("no single-width {} at {real}", self.name)))
    }

    /// Compressed `(first, last)` indices covering a real range exactly.
    fn range(&self, real: impl RangeBounds<i64>) -> Result<(i64, i64)> {
        let first_real = match real.start_bound() {
            Bound::Included(&start) => start,
            Bound::Excluded(&start) => start + 1,
            Bound::Unbounded => self.real_start(),
        };
        let last_real = match real.end_bound() {
            Bound::Included(&end) => end,
            Bound::Excluded(&end) => end - 1,
            Bound::Unbounded => self.real_end() - 1,
        };
        let first = self.starts.get(&first_real).copied().ok_or_else(|| {
            Error::Lookup(format!("no sparse {} starting at {first_real}", self.name))
        })?;
        let last = self.ends.get(&last_real).copied().ok_or_else(|| {
            Error::Lookup(format!("no sparse {} ending at {last_real}", self.name))
        })?;
        if first > last {
            return Err(Error::Lookup(format!(
                "empty {} range {first_real}..={last_real}",
                self.name
            )));
        }
        Ok((first, last))
    }

    /// Real start and span of compressed index `index`.
    ///
    /// Indices past either end extrapolate one real coordinate per step.
    fn real_span(&self, index: i64) -> (i64, i64) {
        let len = self.segments.len() as i64;
        if index < 0 {
            (self.real_start() + index, 1)
        } else if index >= len {
            (self.real_end() + index - len, 1)
        } else {
            let segment = self.segments[index as usize];
            (segment.start, segment.len)
        }
    }
}

/// A grid addressed by real coordinates over a compressed backing grid.
pub struct SparseGrid<T> {
    grid: Grid<SparseData<T>>,
    columns: AxisIndex,
    rows: AxisIndex,
}

impl<T: 'static> SparseGrid<T> {
    /// Compresses the real plane spanned by `columns` and `rows`.
    ///
    /// `init` seeds every compressed cell. `default` values the sentinel
    /// cells reached by growing past the compressed grid; they receive a
    /// meta extrapolated into real coordinates.
    pub fn build(
        columns: &SparseAxis,
        rows: &SparseAxis,
        mut default: impl FnMut(&SparseMeta) -> T + 'static,
        mut init: impl FnMut(&SparseMeta) -> T,
    ) -> Result<Self> {
        let columns = AxisIndex::new("column", columns.segments("columns")?);
        let rows = AxisIndex::new("row", rows.segments("rows")?);
        trace!(
            columns = ?columns.segments,
            rows = ?rows.segments,
            "built sparse segments"
        );

        let cells: Vec<Vec<SparseData<T>>> = rows
            .segments
            .iter()
            .map(|row| {
                columns
                    .segments
                    .iter()
                    .map(|column| {
                        let meta = SparseMeta {
                            real_x: column.start,
                            real_y: row.start,
                            real_width: column.len,
                            real_height: row.len,
                        };
                        SparseData {
                            value: init(&meta),
                            meta,
                        }
                    })
                    .collect()
            })
            .collect();

        let (pad_columns, pad_rows) = (columns.clone(), rows.clone());
        let grid = Grid::new(cells, move |point: Point| {
            let (real_x, real_width) = pad_columns.real_span(point.x);
            let (real_y, real_height) = pad_rows.real_span(point.y);
            let meta = SparseMeta {
                real_x,
                real_y,
                real_width,
                real_height,
            };
            SparseData {
                value: default(&meta),
                meta,
            }
        })?;
        grid.store().lock_shape();

        Ok(Self {
            grid,
            columns,
            rows,
        })
    }
}

impl<T> SparseGrid<T> {
    /// The compressed grid. Its shape is locked, so row and column
    /// insertion fail with [`Error::Precondition`] and auto-expand stays off.
    pub fn grid(&self) -> &Grid<SparseData<T>> {
        &self.grid
    }

    /// The cell at an individually addressable real coordinate.
    pub fn cell(&self, real_x: i64, real_y: i64) -> Result<Cell<SparseData<T>>> {
        let x = self.columns.exact(real_x)?;
        let y = self.rows.exact(real_y)?;
        Ok(self.grid.cell(x, y))
    }

    pub fn row(
        &self,
        real_xs: impl RangeBounds<i64>,
        real_y: i64,
    ) -> Result<Row<SparseData<T>>> {
        let (first, last) = self.columns.range(real_xs)?;
        let y = self.rows.exact(real_y)?;
        Ok(self.grid.row(first..=last, y))
    }

    pub fn column(
        &self,
        real_x: i64,
        real_ys: impl RangeBounds<i64>,
    ) -> Result<Column<SparseData<T>>> {
        let x = self.columns.exact(real_x)?;
        let (first, last) = self.rows.range(real_ys)?;
        Ok(self.grid.column(x, first..=last))
    }

    /// The compressed cells covering a real rectangle exactly.
    pub fn view(
        &self,
        real_xs: impl RangeBounds<i64>,
        real_ys: impl RangeBounds<i64>,
    ) -> Result<View<SparseData<T>>> {
        let (first_x, last_x) = self.columns.range(real_xs)?;
        let (first_y, last_y) = self.rows.range(real_ys)?;
        Ok(self.grid.view(first_x..=last_x, first_y..=last_y))
    }

    /// Real area of all cells whose data satisfies `predicate`.
    pub fn count(&self, predicate: impl FnMut(&SparseData<T>) -> bool) -> i64 {
        self.grid.real_count(predicate)
    }
}

/// Real-area counting on any region of compressed cells.
pub trait SparseRegion<T>: Region<SparseData<T>> {
    /// Sums the real area of each cell whose data satisfies `predicate`.
    fn real_count(&self, mut predicate: impl FnMut(&SparseData<T>) -> bool) -> i64 {
        self.cells()
            .map(|cell| cell.with_value(|data| if predicate(data) { data.meta.area() } else { 0 }))
            .sum()
    }
}

impl<T, R: Region<SparseData<T>> + ?Sized> SparseRegion<T> for R {}

impl<T> Cell<SparseData<T>> {
    pub fn meta(&self) -> SparseMeta {
        self.with_value(|data| data.meta)
    }

    pub fn inner(&self) -> T
    where
        T: Clone,
    {
        self.with_value(|data| data.value.clone())
    }

    /// Replaces the inner value, keeping the real span.
    pub fn set_inner(&self, value: T) -> Result<()> {
        self.update(|data| data.value = value)
    }
}

#[cfg(test)]
mod tests {
    use crate::geometry::Offset;

    use super::*;

    fn square(fixed: [i64; 2], end: i64) -> SparseGrid<u8> {
        let axis = SparseAxis::new(fixed, end);
        SparseGrid::build(&axis, &axis, |_| 9, |_| 0).unwrap()
    }

    #[test]
    fn test_segments_alternate_precise_and_gap() {
        let segments = SparseAxis::new([2, 5], 10).segments("columns").unwrap();
        let spans: Vec<(i64, i64)> = segments.iter().map(|s| (s.start, s.len)).collect();
        assert_eq!(spans, vec![(0, 1), (1, 1), (2, 1), (3, 2), (5, 1), (6, 4)]);
    }

    #[test]
    fn test_count_reports_real_span() {
        let grid = SparseGrid::build(
            &SparseAxis::new([0, 2, 5], 10),
            &SparseAxis::new([0], 1),
            |_| (),
            |_| (),
        )
        .unwrap();
        assert_eq!(grid.grid().width(), 6);
        assert_eq!(grid.count(|_| true), 10);
    }

    #[test]
    fn test_exact_lookup_only_on_fixed_coordinates() {
        let grid = square([0, 3], 6);
        assert_eq!((grid.grid().width(), grid.grid().height()), (4, 4));

        let addressable: Vec<(i64, i64)> = (0..6)
            .flat_map(|y| (0..6).map(move |x| (x, y)))
            .filter(|&(x, y)| grid.cell(x, y).is_ok())
            .collect();
        assert_eq!(addressable, vec![(0, 0), (3, 0), (0, 3), (3, 3)]);
        assert!(matches!(grid.cell(1, 0), Err(Error::Lookup(_))));

        let corner = grid.cell(3, 3).unwrap().meta();
        assert_eq!((corner.real_width, corner.real_height), (1, 1));
        let gap = grid.grid().cell(3, 1).meta();
        assert_eq!((gap.real_x, gap.real_y, gap.real_width, gap.real_height), (4, 1, 2, 2));
        assert_eq!(grid.count(|_| true), 36);
    }

    #[test]
    fn test_range_lookup_requires_segment_boundaries() {
        let grid = square([0, 3], 6);
        let gap = grid.view(1..=2, 4..6).unwrap();
        assert_eq!((gap.width(), gap.height()), (1, 1));
        assert_eq!(gap.real_count(|_| true), 4);

        let full = grid.view(.., ..).unwrap();
        assert_eq!(full.real_count(|_| true), 36);

        assert!(matches!(grid.view(1..=1, ..), Err(Error::Lookup(_))));
        assert!(matches!(grid.row(2..=3, 0), Err(Error::Lookup(_))));
        assert!(matches!(grid.column(1, ..), Err(Error::Lookup(_))));
        assert_eq!(grid.row(0..=3, 3).unwrap().width(), 3);
        assert_eq!(grid.column(3, 0..6).unwrap().real_count(|_| true), 6);
    }

    #[test]
    fn test_count_honours_predicate_and_writes() {
        let grid = square([0, 3], 6);
        grid.view(1..=5, 1..=2).unwrap().cells().for_each(|cell| {
            cell.set_inner(1).unwrap();
        });
        assert_eq!(grid.count(|data| data.value == 1), 10);
        assert_eq!(grid.cell(3, 0).unwrap().inner(), 0);
    }

    #[test]
    fn test_padding_meta_extrapolates_real_coordinates() {
        let grid = square([0, 3], 6);
        let padded = grid.grid().grow(Offset::uniform(1));
        let top_left = padded.cell(0, 0);
        assert!(top_left.is_out_of_bounds());
        assert_eq!(top_left.inner(), 9);
        let meta = top_left.meta();
        assert_eq!((meta.real_x, meta.real_y, meta.area()), (-1, -1, 1));

        let right = padded.cell(5, 2).meta();
        assert_eq!((right.real_x, right.real_y, right.real_width, right.real_height), (6, 1, 1, 2));
        assert_eq!(padded.real_count(|data| data.value == 9), 28);
    }

    #[test]
    fn test_compressed_grid_keeps_its_shape() {
        let grid = square([0, 3], 6);
        let compressed = grid.grid();
        assert!(compressed.store().is_shape_locked());
        assert!(matches!(
            compressed.insert_rows_after(0, 1),
            Err(Error::Precondition(_))
        ));
        assert!(matches!(
            grid.view(.., ..).unwrap().insert_columns_after_with(1, 2, |_| unreachable!()),
            Err(Error::Precondition(_))
        ));

        let expanding = compressed.clone().with_auto_expand(true);
        assert!(expanding.cell(9, 9).is_out_of_bounds());
        assert_eq!((compressed.width(), compressed.height()), (4, 4));
        assert_eq!(grid.count(|_| true), 36);
    }

    #[test]
    fn test_degenerate_axes_fail() {
        let empty = SparseAxis::new(Vec::new(), 5);
        let fine = SparseAxis::new([0], 5);
        assert!(matches!(
            SparseGrid::build(&empty, &fine, |_| 0, |_| 0),
            Err(Error::Shape(_))
        ));
        let short = SparseAxis::new([0, 4], 4);
        assert!(matches!(
            SparseGrid::build(&fine, &short, |_| 0, |_| 0),
            Err(Error::Shape(_))
        ));
    }

    #[test]
    fn test_negative_coordinates_and_spanning_axis() {
        let axis = SparseAxis::spanning([-3, 2]);
        let segments = axis.segments("rows").unwrap();
        let spans: Vec<(i64, i64)> = segments.iter().map(|s| (s.start, s.len)).collect();
        assert_eq!(spans, vec![(-3, 1), (-2, 2), (0, 1), (1, 1), (2, 1)]);
    }
}
