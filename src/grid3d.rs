//! Three-dimensional grids and their orthographic projections.
//!
//! A [`Grid3`] is a fixed-size volume with the same read-through cell
//! semantics as the planar grid: views are cheap windows, cells read and write
//! through the shared store, and addresses outside the volume yield sentinel
//! cells valued by the default factory. Volumes never grow or gain layers.

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Deref, RangeBounds, RangeInclusive};
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::geometry::span;
use crate::render::NoHighlight;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point3 {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl Point3 {
    pub const ORIGIN: Point3 = Point3::new(0, 0, 0);

    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }
}

impl Add for Point3 {
    type Output = Point3;

    fn add(self, rhs: Point3) -> Point3 {
        Point3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Padding added below the minimum and above the maximum of each axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Offset3 {
    pub min_x: i64,
    pub min_y: i64,
    pub min_z: i64,
    pub max_x: i64,
    pub max_y: i64,
    pub max_z: i64,
}

impl Offset3 {
    pub const NONE: Offset3 = Offset3::uniform(0);

    pub const fn uniform(amount: i64) -> Self {
        Self {
            min_x: amount,
            min_y: amount,
            min_z: amount,
            max_x: amount,
            max_y: amount,
            max_z: amount,
        }
    }
}

impl Add for Offset3 {
    type Output = Offset3;

    fn add(self, rhs: Offset3) -> Offset3 {
        Offset3 {
            min_x: self.min_x + rhs.min_x,
            min_y: self.min_y + rhs.min_y,
            min_z: self.min_z + rhs.min_z,
            max_x: self.max_x + rhs.max_x,
            max_y: self.max_y + rhs.max_y,
            max_z: self.max_z + rhs.max_z,
        }
    }
}

struct Store3<T> {
    /// Flat cell values, see [`index`].
    values: Vec<T>,
    origin: Point3,
    /// Extent along each axis.
    size: Point3,
    default: Box<dyn FnMut(Point3) -> T>,
}

/// Converts a position relative to the origin to a flat index.
///
/// Index order is z-major: `idx = (z * size_y + y) * size_x + x`.
#[inline(always)]
const fn index(size: Point3, relative: Point3) -> usize {
    ((relative.z * size.y + relative.y) * size.x + relative.x) as usize
}

impl<T> Store3<T> {
    fn locate(&self, point: Point3) -> Option<usize> {
        let relative = Point3::new(
            point.x - self.origin.x,
            point.y - self.origin.y,
            point.z - self.origin.z,
        );
        let inside = (0..self.size.x).contains(&relative.x)
            && (0..self.size.y).contains(&relative.y)
            && (0..self.size.z).contains(&relative.z);
        inside.then(|| index(self.size, relative))
    }

    fn max(&self) -> Point3 {
        Point3::new(
            self.origin.x + self.size.x - 1,
            self.origin.y + self.size.y - 1,
            self.origin.z + self.size.z - 1,
        )
    }
}

enum Slot3<T> {
    Live(usize),
    OutOfBounds(T),
}

/// One addressable cell of a volume.
pub struct Cell3<T> {
    store: Rc<RefCell<Store3<T>>>,
    point: Point3,
    slot: Slot3<T>,
}

impl<T> Cell3<T> {
    pub fn point(&self) -> Point3 {
        self.point
    }

    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self.slot, Slot3::OutOfBounds(_))
    }

    /// Borrows the current value; `f` must not write to the same volume.
    pub fn with_value<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        match &self.slot {
            Slot3::Live(index) => f(&self.store.borrow().values[*index]),
            Slot3::OutOfBounds(sentinel) => f(sentinel),
        }
    }

    pub fn value(&self) -> T
    where
        T: Clone,
    {
        self.with_value(T::clone)
    }

    pub fn matches(&self, predicate: impl FnOnce(&T) -> bool) -> bool {
        self.with_value(predicate)
    }

    pub fn set(&self, value: T) -> Result<()> {
        self.update(|slot| *slot = value)
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        match &self.slot {
            Slot3::Live(index) => Ok(f(&mut self.store.borrow_mut().values[*index])),
            Slot3::OutOfBounds(_) => Err(Error::OutOfBounds(self.point.to_string())),
        }
    }
}

impl<T> PartialEq for Cell3<T> {
    fn eq(&self, other: &Self) -> bool {
        self.point == other.point
    }
}

impl<T> Eq for Cell3<T> {}

impl<T> Hash for Cell3<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.point.hash(state);
    }
}

impl<T: fmt::Debug> fmt::Debug for Cell3<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_out_of_bounds() {
            write!(f, "Cell3({}, out of bounds)", self.point)
        } else {
            self.with_value(|value| write!(f, "Cell3({}, value={value:?})", self.point))
        }
    }
}

/// A box-shaped window over a volume, possibly reaching past its edges.
pub struct View3<T> {
    store: Rc<RefCell<Store3<T>>>,
    min: Point3,
    max: Point3,
}

impl<T> Clone for View3<T> {
    fn clone(&self) -> Self {
        Self {
            store: Rc::clone(&self.store),
            min: self.min,
            max: self.max,
        }
    }
}

impl<T> View3<T> {
    pub fn min(&self) -> Point3 {
        self.min
    }

    pub fn max(&self) -> Point3 {
        self.max
    }

    pub fn min_x(&self) -> i64 {
        self.min.x
    }

    pub fn min_y(&self) -> i64 {
        self.min.y
    }

    pub fn min_z(&self) -> i64 {
        self.min.z
    }

    pub fn max_x(&self) -> i64 {
        self.max.x
    }

    pub fn max_y(&self) -> i64 {
        self.max.y
    }

    pub fn max_z(&self) -> i64 {
        self.max.z
    }

    pub fn size_x(&self) -> i64 {
        self.max.x - self.min.x + 1
    }

    pub fn size_y(&self) -> i64 {
        self.max.y - self.min.y + 1
    }

    pub fn size_z(&self) -> i64 {
        self.max.z - self.min.z + 1
    }

    /// The cell at `(x, y, z)` relative to the view's minimum corner.
    pub fn cell(&self, x: i64, y: i64, z: i64) -> Cell3<T> {
        self.at(self.min + Point3::new(x, y, z))
    }

    /// The cell at an absolute address.
    pub fn at(&self, point: Point3) -> Cell3<T> {
        let mut store = self.store.borrow_mut();
        let slot = match store.locate(point) {
            Some(index) => Slot3::Live(index),
            None => Slot3::OutOfBounds((store.default)(point)),
        };
        Cell3 {
            store: Rc::clone(&self.store),
            point,
            slot,
        }
    }

    /// Sub-view over relative ranges on each axis.
    pub fn view(
        &self,
        xs: impl RangeBounds<i64>,
        ys: impl RangeBounds<i64>,
        zs: impl RangeBounds<i64>,
    ) -> View3<T> {
        let (first_x, last_x) = span(xs, self.size_x());
        let (first_y, last_y) = span(ys, self.size_y());
        let (first_z, last_z) = span(zs, self.size_z());
        View3 {
            store: Rc::clone(&self.store),
            min: self.min + Point3::new(first_x, first_y, first_z),
            max: self.min + Point3::new(last_x, last_y, last_z),
        }
    }

    pub fn grow(&self, offset: Offset3) -> View3<T> {
        View3 {
            store: Rc::clone(&self.store),
            min: Point3::new(
                self.min.x - offset.min_x,
                self.min.y - offset.min_y,
                self.min.z - offset.min_z,
            ),
            max: Point3::new(
                self.max.x + offset.max_x,
                self.max.y + offset.max_y,
                self.max.z + offset.max_z,
            ),
        }
    }

    /// Traversal by layer, then row, then column.
    pub fn cells(&self) -> Cells3<T> {
        Cells3 {
            view: self.clone(),
            next: Some(Point3::ORIGIN),
        }
    }
}

impl<T> fmt::Debug for View3<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "View3(xs={}..={}, ys={}..={}, zs={}..={})",
            self.min.x, self.max.x, self.min.y, self.max.y, self.min.z, self.max.z
        )
    }
}

pub struct Cells3<T> {
    view: View3<T>,
    /// Next relative position, `None` once exhausted.
    next: Option<Point3>,
}

impl<T> Iterator for Cells3<T> {
    type Item = Cell3<T>;

    fn next(&mut self) -> Option<Cell3<T>> {
        let current = self.next?;
        let mut following = Point3::new(current.x + 1, current.y, current.z);
        if following.x >= self.view.size_x() {
            following.x = 0;
            following.y += 1;
        }
        if following.y >= self.view.size_y() {
            following.y = 0;
            following.z += 1;
        }
        self.next = (following.z < self.view.size_z()).then_some(following);
        Some(self.view.cell(current.x, current.y, current.z))
    }
}

/// A whole volume.
pub struct Grid3<T> {
    view: View3<T>,
}

impl<T> Grid3<T> {
    /// Builds a volume from values indexed `[z][y][x]`, with its minimum
    /// corner at the origin.
    pub fn new(
        layers: Vec<Vec<Vec<T>>>,
        default: impl FnMut(Point3) -> T + 'static,
    ) -> Result<Self> {
        Self::with_origin(Point3::ORIGIN, layers, default)
    }

    /// Builds a volume spanning the given absolute ranges, seeding each cell
    /// from `init`.
    pub fn from_fn(
        xs: RangeInclusive<i64>,
        ys: RangeInclusive<i64>,
        zs: RangeInclusive<i64>,
        mut init: impl FnMut(Point3) -> T,
        default: impl FnMut(Point3) -> T + 'static,
    ) -> Result<Self> {
        let origin = Point3::new(*xs.start(), *ys.start(), *zs.start());
        let layers = zs
            .map(|z| {
                ys.clone()
                    .map(|y| xs.clone().map(|x| init(Point3::new(x, y, z))).collect())
                    .collect()
            })
            .collect();
        Self::with_origin(origin, layers, default)
    }

    fn with_origin(
        origin: Point3,
        layers: Vec<Vec<Vec<T>>>,
        default: impl FnMut(Point3) -> T + 'static,
    ) -> Result<Self> {
        let size_z = layers.len();
        let size_y = layers.first().map_or(0, Vec::len);
        let size_x = layers
            .first()
            .and_then(|layer| layer.first())
            .map_or(0, Vec::len);
        if size_x == 0 || size_y == 0 || size_z == 0 {
            return Err(Error::Shape("volume has no cells".to_string()));
        }

        let mut values = Vec::with_capacity(size_x * size_y * size_z);
        for (z, layer) in layers.into_iter().enumerate() {
            if layer.len() != size_y {
                return Err(Error::Shape(format!(
                    "layer {z} has {} rows, expected {size_y}",
                    layer.len()
                )));
            }
            for (y, row) in layer.into_iter().enumerate() {
                if row.len() != size_x {
                    return Err(Error::Shape(format!(
                        "row {y} of layer {z} has {} cells, expected {size_x}",
                        row.len()
                    )));
                }
                values.extend(row);
            }
        }

        let store = Store3 {
            values,
            origin,
            size: Point3::new(size_x as i64, size_y as i64, size_z as i64),
            default: Box::new(default),
        };
        let max = store.max();
        Ok(Self {
            view: View3 {
                store: Rc::new(RefCell::new(store)),
                min: origin,
                max,
            },
        })
    }

    pub fn view_all(&self) -> &View3<T> {
        &self.view
    }
}

impl<T> Deref for Grid3<T> {
    type Target = View3<T>;

    fn deref(&self) -> &View3<T> {
        &self.view
    }
}

impl<T> fmt::Debug for Grid3<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Grid3({}x{}x{})",
            self.size_x(),
            self.size_y(),
            self.size_z()
        )
    }
}

/// The side a volume is viewed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Projection {
    /// Looks along Y; columns are x.
    Front,
    /// Looks along X; columns are y.
    Left,
}

/// Chooses an ANSI SGR style code for a projected position, or none.
///
/// The cell passed in is the one on the face nearest the viewer.
pub trait Highlight3<T> {
    fn code(&self, cell: &Cell3<T>) -> Option<String>;
}

impl<T, F> Highlight3<T> for F
where
    F: Fn(&Cell3<T>) -> Option<String>,
{
    fn code(&self, cell: &Cell3<T>) -> Option<String> {
        self(cell)
    }
}

impl<T> Highlight3<T> for NoHighlight {
    fn code(&self, _cell: &Cell3<T>) -> Option<String> {
        None
    }
}

/// Flattens `view` into text seen from `projection`.
///
/// One line per z layer, topmost first. Each character group is `reducer`'s
/// output for the line of cells along the collapsed axis.
pub fn project<T>(
    view: &View3<T>,
    projection: Projection,
    reducer: impl FnMut(&View3<T>) -> String,
) -> String {
    project_highlighted(view, projection, reducer, &NoHighlight)
}

/// Like [`project`], wrapping each group in the style `highlight` picks for
/// the line's front cell.
pub fn project_highlighted<T>(
    view: &View3<T>,
    projection: Projection,
    mut reducer: impl FnMut(&View3<T>) -> String,
    highlight: &impl Highlight3<T>,
) -> String {
    let mut lines = Vec::with_capacity(view.size_z() as usize);
    for z in (0..view.size_z()).rev() {
        let width = match projection {
            Projection::Front => view.size_x(),
            Projection::Left => view.size_y(),
        };
        let mut line = String::new();
        for i in 0..width {
            let along = match projection {
                Projection::Front => view.view(i..=i, .., z..=z),
                Projection::Left => view.view(.., i..=i, z..=z),
            };
            let repr = reducer(&along);
            match highlight.code(&along.cell(0, 0, 0)) {
                Some(code) => line.push_str(&format!("\u{1b}[{code}m{repr}\u{1b}[0m")),
                None => line.push_str(&repr),
            }
        }
        lines.push(line);
    }
    lines.join("\n")
}

/// Reducer printing the nearest value accepted by `predicate`, or `filler`.
pub fn first_present<T>(
    mut predicate: impl FnMut(&T) -> bool,
    printer: impl Fn(&T) -> String,
    filler: impl Into<String>,
) -> impl FnMut(&View3<T>) -> String {
    let filler = filler.into();
    move |line| {
        line.cells()
            .find(|cell| cell.matches(&mut predicate))
            .map_or_else(|| filler.clone(), |cell| cell.with_value(&printer))
    }
}
