//! Text rendering of regions, with optional ANSI highlighting.

use std::fmt;

use rustc_hash::FxHashSet;

use crate::cell::Cell;
use crate::geometry::Point;
use crate::view::{Grid, Region, Row, View};

/// Chooses an ANSI SGR style code for a cell, or none.
pub trait Highlight<T> {
    fn code(&self, cell: &Cell<T>) -> Option<String>;
}

impl<T, F> Highlight<T> for F
where
    F: Fn(&Cell<T>) -> Option<String>,
{
    fn code(&self, cell: &Cell<T>) -> Option<String> {
        self(cell)
    }
}

/// Leaves every cell unstyled.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHighlight;

impl<T> Highlight<T> for NoHighlight {
    fn code(&self, _cell: &Cell<T>) -> Option<String> {
        None
    }
}

/// Styles a fixed set of addresses with one code.
#[derive(Clone, Debug)]
pub struct HighlightCells {
    points: FxHashSet<Point>,
    code: String,
}

impl HighlightCells {
    pub fn new(points: impl IntoIterator<Item = Point>, code: impl Into<String>) -> Self {
        Self {
            points: points.into_iter().collect(),
            code: code.into(),
        }
    }
}

impl<T> Highlight<T> for HighlightCells {
    fn code(&self, cell: &Cell<T>) -> Option<String> {
        self.points
            .contains(&cell.point())
            .then(|| self.code.clone())
    }
}

/// Renders `region` one line per row, printing each value with `printer`.
pub fn render<T, R>(
    region: &R,
    printer: impl Fn(&T) -> String,
    highlight: &impl Highlight<T>,
) -> String
where
    R: Region<T> + ?Sized,
{
    let mut output = String::new();
    for y in 0..region.height() {
        if y > 0 {
            output.push('\n');
        }
        render_line(region, y, &printer, highlight, &mut output);
    }
    output
}

fn render_line<T, R>(
    region: &R,
    y: i64,
    printer: &impl Fn(&T) -> String,
    highlight: &impl Highlight<T>,
    output: &mut String,
) where
    R: Region<T> + ?Sized,
{
    for x in 0..region.width() {
        let cell = region.cell(x, y);
        let repr = cell.with_value(printer);
        match highlight.code(&cell) {
            Some(code) => output.push_str(&format!("\u{1b}[{code}m{repr}\u{1b}[0m")),
            None => output.push_str(&repr),
        }
    }
}

fn display<T: fmt::Display>(value: &T) -> String {
    value.to_string()
}

impl<T: fmt::Display> fmt::Display for Grid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self, display, &NoHighlight))
    }
}

impl<T: fmt::Display> fmt::Display for View<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self, display, &NoHighlight))
    }
}

/// Concatenated values, so a run of digits prints as the number it spells.
impl<T: fmt::Display> fmt::Display for Row<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut line = String::new();
        render_line(self, 0, &display, &NoHighlight, &mut line);
        f.write_str(&line)
    }
}
