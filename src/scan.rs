//! Run scanning along rows.
//!
//! Finds maximal contiguous runs of cells whose values satisfy a predicate,
//! for example the runs of digits in a line of text. Each row is walked once,
//! without backtracking.

use crate::view::{Grid, Region, Row, View};

impl<T> Row<T> {
    /// Finds the first run at or after relative column `start`.
    ///
    /// The run begins at the first cell satisfying `predicate`, sentinels
    /// included, and extends right over in-bounds cells while the predicate
    /// keeps holding, up to the end of the row.
    pub fn scan(&self, start: i64, mut predicate: impl FnMut(&T) -> bool) -> Option<Row<T>> {
        let width = self.width();

        let mut first = start.max(0);
        while first < width && !self.get(first).matches(&mut predicate) {
            first += 1;
        }
        if first >= width {
            return None;
        }

        let mut last = first;
        while last + 1 < width {
            let next = self.get(last + 1);
            if next.is_out_of_bounds() || !next.matches(&mut predicate) {
                break;
            }
            last += 1;
        }
        Some(self.row(first..=last, 0))
    }

    /// All disjoint, maximal runs in this row, left to right.
    pub fn scan_all<P>(&self, predicate: P) -> Runs<T, P>
    where
        P: FnMut(&T) -> bool,
    {
        Runs {
            row: self.clone(),
            next: 0,
            predicate,
        }
    }
}

/// Lazy iterator over the runs of one row.
pub struct Runs<T, P> {
    row: Row<T>,
    next: i64,
    predicate: P,
}

impl<T, P> Iterator for Runs<T, P>
where
    P: FnMut(&T) -> bool,
{
    type Item = Row<T>;

    fn next(&mut self) -> Option<Row<T>> {
        let run = self.row.scan(self.next, &mut self.predicate)?;
        self.next = run.max_x() - self.row.min_x() + 1;
        Some(run)
    }
}

impl<T> View<T> {
    /// Runs from every row of the view, top to bottom.
    pub fn scan_all_lines<P>(&self, predicate: P) -> impl Iterator<Item = Row<T>>
    where
        P: FnMut(&T) -> bool + Clone,
    {
        self.rows()
            .into_iter()
            .flat_map(move |row| row.scan_all(predicate.clone()))
    }
}

impl<T> Grid<T> {
    /// Runs from every row of the grid, top to bottom.
    pub fn scan_all_lines<P>(&self, predicate: P) -> impl Iterator<Item = Row<T>>
    where
        P: FnMut(&T) -> bool + Clone,
    {
        self.view_all().scan_all_lines(predicate)
    }
}
