//! Coordinate algebra shared by every grid view.
//!
//! Points address cells, deltas move between them, and offsets describe how
//! far a grown view reaches past its anchor cells on each side.

use std::fmt;
use std::ops::{Add, AddAssign, Bound, Mul, Neg, RangeBounds, Sub};

/// A 2D address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub const ORIGIN: Self = Self::new(0, 0);

    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A 2D displacement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Delta {
    pub x: i64,
    pub y: i64,
}

impl Delta {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Manhattan length of the displacement.
    pub const fn distance(&self) -> i64 {
        self.x.abs() + self.y.abs()
    }
}

impl Add for Delta {
    type Output = Delta;

    fn add(self, rhs: Delta) -> Delta {
        Delta::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Neg for Delta {
    type Output = Delta;

    fn neg(self) -> Delta {
        Delta::new(-self.x, -self.y)
    }
}

impl Mul<i64> for Delta {
    type Output = Delta;

    fn mul(self, factor: i64) -> Delta {
        Delta::new(self.x * factor, self.y * factor)
    }
}

impl Add<Delta> for Point {
    type Output = Point;

    fn add(self, delta: Delta) -> Point {
        Point::new(self.x + delta.x, self.y + delta.y)
    }
}

impl AddAssign<Delta> for Point {
    fn add_assign(&mut self, delta: Delta) {
        *self = *self + delta;
    }
}

impl Sub for Point {
    type Output = Delta;

    fn sub(self, rhs: Point) -> Delta {
        Delta::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// The four canonical directions of a four-connected grid.
///
/// Y grows downwards, so `Top` is `(0, -1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Top,
    Right,
    Bottom,
}

impl Direction {
    /// All directions in clockwise order starting from `Left`.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Top,
        Direction::Right,
        Direction::Bottom,
    ];

    pub const fn delta(self) -> Delta {
        match self {
            Direction::Left => Delta::new(-1, 0),
            Direction::Top => Delta::new(0, -1),
            Direction::Right => Delta::new(1, 0),
            Direction::Bottom => Delta::new(0, 1),
        }
    }

    /// Rotates clockwise by `quarter_turns`.
    pub fn turn(self, quarter_turns: i64) -> Direction {
        // discriminants follow the clockwise order of `ALL`
        Self::ALL[(self as i64 + quarter_turns).rem_euclid(4) as usize]
    }

    pub fn opposite(self) -> Direction {
        self.turn(2)
    }
}

impl From<Direction> for Delta {
    fn from(direction: Direction) -> Delta {
        direction.delta()
    }
}

impl Mul<i64> for Direction {
    type Output = Delta;

    fn mul(self, steps: i64) -> Delta {
        self.delta() * steps
    }
}

impl Add<Direction> for Point {
    type Output = Point;

    fn add(self, direction: Direction) -> Point {
        self + direction.delta()
    }
}

/// Outward padding of a view, per side.
///
/// Padding never shrinks a view: negative amounts are clamped to zero by the
/// constructors and by `grow`. Sub-view slicing is the way to shrink.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Offset {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl Offset {
    pub const NONE: Self = Self::new(0, 0, 0, 0);

    pub const fn new(left: i64, top: i64, right: i64, bottom: i64) -> Self {
        Self {
            left: non_negative(left),
            top: non_negative(top),
            right: non_negative(right),
            bottom: non_negative(bottom),
        }
    }

    /// This offset with every negative side raised to zero.
    pub const fn clamped(self) -> Self {
        Self::new(self.left, self.top, self.right, self.bottom)
    }

    /// The same padding on every side.
    pub const fn uniform(amount: i64) -> Self {
        Self::new(amount, amount, amount, amount)
    }

    /// `x` on the left and right, `y` on the top and bottom.
    pub const fn symmetric(x: i64, y: i64) -> Self {
        Self::new(x, y, x, y)
    }
}

const fn non_negative(amount: i64) -> i64 {
    if amount < 0 {
        0
    } else {
        amount
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset::new(
            self.left + rhs.left,
            self.top + rhs.top,
            self.right + rhs.right,
            self.bottom + rhs.bottom,
        )
    }
}

/// Resolved inclusive corners of a region, in store coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    pub const fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub const fn width(&self) -> i64 {
        self.max.x - self.min.x + 1
    }

    pub const fn height(&self) -> i64 {
        self.max.y - self.min.y + 1
    }

    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Pushes each side outward by the matching offset amount.
    pub const fn grow(&self, offset: Offset) -> Bounds {
        Bounds::new(
            Point::new(self.min.x - offset.left, self.min.y - offset.top),
            Point::new(self.max.x + offset.right, self.max.y + offset.bottom),
        )
    }
}

/// Resolves a relative range against an extent of `len` cells.
///
/// Returns the first and last (inclusive) relative indices. Unbounded ends
/// fall back to `0` and `len - 1`.
///
/// # Panics
///
/// Panics when the range is empty, which mirrors slice indexing.
pub fn span(range: impl RangeBounds<i64>, len: i64) -> (i64, i64) {
    let first = match range.start_bound() {
        Bound::Included(&start) => start,
        Bound::Excluded(&start) => start + 1,
        Bound::Unbounded => 0,
    };
    let last = match range.end_bound() {
        Bound::Included(&end) => end,
        Bound::Excluded(&end) => end - 1,
        Bound::Unbounded => len - 1,
    };
    assert!(first <= last, "empty range {first}..={last}");
    (first, last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_scaling_moves_n_steps() {
        let start = Point::new(2, 3);
        assert_eq!(start + Direction::Right * 4, Point::new(6, 3));
        assert_eq!(start + Direction::Top * 3, Point::new(2, 0));
    }

    #[test]
    fn test_turning_wraps_around() {
        assert_eq!(Direction::Left.turn(1), Direction::Top);
        assert_eq!(Direction::Bottom.turn(1), Direction::Left);
        assert_eq!(Direction::Left.turn(-1), Direction::Bottom);
        assert_eq!(Direction::Top.opposite(), Direction::Bottom);
    }

    #[test]
    fn test_point_difference_distance() {
        let delta = Point::new(1, 6) - Point::new(5, 11);
        assert_eq!(delta, Delta::new(-4, -5));
        assert_eq!(delta.distance(), 9);
    }

    #[test]
    fn test_bounds_grow_adds_per_side() {
        let bounds = Bounds::new(Point::new(1, 1), Point::new(3, 2));
        let grown = bounds.grow(Offset::new(1, 2, 3, 4));
        assert_eq!(grown.width(), bounds.width() + 4);
        assert_eq!(grown.height(), bounds.height() + 6);
        assert!(grown.contains(Point::new(0, -1)));
    }

    #[test]
    fn test_span_resolution() {
        assert_eq!(span(.., 5), (0, 4));
        assert_eq!(span(1..3, 5), (1, 2));
        assert_eq!(span(-1..=2, 5), (-1, 2));
        assert_eq!(span(2.., 5), (2, 4));
    }

    #[test]
    #[should_panic(expected = "empty range")]
    fn test_span_rejects_empty() {
        span(3..3, 5);
    }
}
