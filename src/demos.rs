//! Puzzle clients driving the grid library.
//!
//! Each client loads text into one of the grid types and solves a small
//! puzzle with it: part numbers with the run scanner, cosmic expansion with
//! row and column insertion, a dig-plan lagoon on a sparse grid, and settling
//! bricks in a volume.

use std::collections::VecDeque;

use anyhow::{bail, Context, Result};
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use gridscape::{
    project, Cell, Direction, Grid, Grid3, Offset, Point, Point3, Projection, Region, SparseAxis,
    SparseData, SparseGrid, View3,
};

// Part numbers

/// A run of digits and whether any neighbouring cell holds a symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartNumber {
    pub value: u64,
    pub row: i64,
    pub first: i64,
    pub last: i64,
    pub touches_symbol: bool,
}

fn is_symbol(c: char) -> bool {
    c != '.' && !c.is_ascii_digit()
}

pub fn part_numbers(schematic: &Grid<char>) -> Result<Vec<PartNumber>> {
    schematic
        .scan_all_lines(char::is_ascii_digit)
        .map(|run| -> Result<PartNumber> {
            let text = run.to_string();
            let value = text
                .parse::<u64>()
                .with_context(|| format!("run {text:?} is not a number"))?;
            let touches_symbol = run
                .grow(Offset::uniform(1))
                .cells()
                .any(|cell| cell.matches(|c| is_symbol(*c)));
            trace!(value, row = run.y(), touches_symbol, "scanned run");
            Ok(PartNumber {
                value,
                row: run.y(),
                first: run.min_x(),
                last: run.max_x(),
                touches_symbol,
            })
        })
        .collect()
}

// Cosmic expansion

fn is_void<R: Region<char>>(line: &R) -> bool {
    line.cells().all(|cell| !cell.matches(|c| *c == '#'))
}

/// Replaces every row and column without galaxies by `factor` copies.
pub fn expand(universe: &Grid<char>, factor: usize) -> Result<()> {
    let extra = factor.saturating_sub(1);
    if extra == 0 {
        return Ok(());
    }
    // Rows follow their cells, so each sees its current position after
    // earlier insertions.
    for row in universe.rows().iter().filter(|row| is_void(*row)) {
        universe.insert_rows_after_with(row.y(), extra, |_| '.')?;
    }
    for column in universe.columns().iter().filter(|column| is_void(*column)) {
        universe.insert_columns_after_with(column.x(), extra, |_| '.')?;
    }
    debug!(
        width = universe.width(),
        height = universe.height(),
        "expanded universe"
    );
    Ok(())
}

/// Sum of Manhattan distances over all unordered pairs of galaxies.
pub fn galaxy_distances(universe: &Grid<char>) -> i64 {
    let galaxies: Vec<Point> = universe
        .cells()
        .filter(|cell| cell.matches(|c| *c == '#'))
        .map(|cell| cell.point())
        .collect();
    galaxies
        .iter()
        .enumerate()
        .flat_map(|(i, &a)| galaxies[i + 1..].iter().map(move |&b| (a - b).distance()))
        .sum()
}

// Lagoon

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ground {
    Unknown,
    /// Dug out, with the paint colour of the step that dug it.
    Trench(Option<u32>),
    Outside,
    Inside,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DigStep {
    pub direction: Direction,
    pub meters: i64,
    pub color: Option<u32>,
}

/// Parses `R 6 (#70c710)` lines.
///
/// With `hex`, the colour field encodes the step instead: five hex digits of
/// distance followed by a direction digit.
pub fn parse_dig_plan<S: AsRef<str>>(lines: &[S], hex: bool) -> Result<Vec<DigStep>> {
    lines
        .iter()
        .enumerate()
        .map(|(number, line)| {
            let line = line.as_ref();
            parse_dig_step(line, hex).with_context(|| format!("line {}: {line:?}", number + 1))
        })
        .collect()
}

fn parse_dig_step(line: &str, hex: bool) -> Result<DigStep> {
    let mut fields = line.split_whitespace();
    let (Some(direction), Some(meters), Some(code)) = (fields.next(), fields.next(), fields.next())
    else {
        bail!("expected direction, distance and colour");
    };
    let code = code.trim_start_matches("(#").trim_end_matches(')');
    if code.len() != 6 || !code.is_ascii() {
        bail!("colour {code:?} is not six hex digits");
    }

    if hex {
        let meters = i64::from_str_radix(&code[..5], 16)?;
        let direction = match &code[5..] {
            "0" => Direction::Right,
            "1" => Direction::Bottom,
            "2" => Direction::Left,
            "3" => Direction::Top,
            other => bail!("unknown direction digit {other}"),
        };
        return Ok(DigStep {
            direction,
            meters,
            color: None,
        });
    }

    let direction = match direction {
        "U" => Direction::Top,
        "D" => Direction::Bottom,
        "L" => Direction::Left,
        "R" => Direction::Right,
        other => bail!("unknown direction {other}"),
    };
    Ok(DigStep {
        direction,
        meters: meters.parse()?,
        color: Some(u32::from_str_radix(code, 16)?),
    })
}

/// Digs the trench on a sparse terrain and fills its interior.
///
/// Returns the terrain and the real area of trench plus interior.
pub fn dig_lagoon(plan: &[DigStep]) -> Result<(SparseGrid<Ground>, i64)> {
    let mut waypoints = vec![Point::ORIGIN];
    let mut current = Point::ORIGIN;
    for step in plan {
        current += step.direction * step.meters;
        waypoints.push(current);
    }

    let xs = SparseAxis::spanning(waypoints.iter().map(|p| p.x));
    let ys = SparseAxis::spanning(waypoints.iter().map(|p| p.y));
    let terrain = SparseGrid::build(&xs, &ys, |_| Ground::Outside, |_| Ground::Unknown)?;
    debug!(
        width = terrain.grid().width(),
        height = terrain.grid().height(),
        "built sparse terrain"
    );

    for (step, pair) in plan.iter().zip(waypoints.windows(2)) {
        let (a, b) = (pair[0], pair[1]);
        let trench = terrain.view(a.x.min(b.x)..=a.x.max(b.x), a.y.min(b.y)..=a.y.max(b.y))?;
        for cell in trench.cells() {
            cell.set_inner(Ground::Trench(step.color))?;
        }
    }

    fill_outside(terrain.grid())?;
    let area = terrain.count(|data| data.value != Ground::Outside);
    Ok((terrain, area))
}

/// Floods `Outside` inwards from the ring of sentinel cells around the grid.
fn fill_outside(terrain: &Grid<SparseData<Ground>>) -> Result<()> {
    let mut queue: VecDeque<Cell<SparseData<Ground>>> = terrain
        .grow(Offset::uniform(1))
        .cells()
        .filter(|cell| cell.is_out_of_bounds())
        .collect();
    while let Some(cell) = queue.pop_front() {
        for neighbour in cell.direct_neighbours() {
            if !neighbour.is_out_of_bounds()
                && neighbour.matches(|data| data.value == Ground::Unknown)
            {
                neighbour.set_inner(Ground::Outside)?;
                queue.push_back(neighbour);
            }
        }
    }
    for cell in terrain.cells() {
        if cell.matches(|data| data.value == Ground::Unknown) {
            cell.set_inner(Ground::Inside)?;
        }
    }
    Ok(())
}

pub fn ground_symbol(data: &SparseData<Ground>) -> String {
    match data.value {
        Ground::Trench(_) | Ground::Inside => "#",
        Ground::Outside => ".",
        Ground::Unknown => "?",
    }
    .to_string()
}

/// Paints trench cells with their 24-bit background colour.
pub fn trench_colour(cell: &Cell<SparseData<Ground>>) -> Option<String> {
    cell.with_value(|data| match data.value {
        Ground::Trench(Some(rgb)) => Some(format!(
            "48;2;{};{};{}",
            (rgb >> 16) & 0xff,
            (rgb >> 8) & 0xff,
            rgb & 0xff
        )),
        _ => None,
    })
}

// Bricks

/// Brick occupancy: the index of the brick filling each cell.
pub type Space = Grid3<Option<usize>>;

/// Parses `x,y,z~x,y,z` lines into inclusive corner pairs.
pub fn parse_bricks<S: AsRef<str>>(lines: &[S]) -> Result<Vec<(Point3, Point3)>> {
    fn corner(text: &str) -> Result<Point3> {
        let coordinates: Vec<i64> = text
            .split(',')
            .map(|part| part.trim().parse())
            .collect::<std::result::Result<_, _>>()?;
        match coordinates[..] {
            [x, y, z] => Ok(Point3::new(x, y, z)),
            _ => bail!("expected three coordinates in {text:?}"),
        }
    }

    lines
        .iter()
        .enumerate()
        .map(|(number, line)| -> Result<(Point3, Point3)> {
            let line = line.as_ref();
            let (start, end) = line
                .split_once('~')
                .with_context(|| format!("line {}: missing '~' in {line:?}", number + 1))?;
            let (a, b) = (corner(start)?, corner(end)?);
            Ok((
                Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
                Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
            ))
        })
        .collect()
}

/// A volume of bricks; `bricks[i]` is the view brick `i` occupies.
pub struct Stack {
    pub space: Space,
    pub bricks: Vec<View3<Option<usize>>>,
}

/// Places bricks in a volume whose floor is layer `z = 0`.
pub fn stack_bricks(corners: &[(Point3, Point3)]) -> Result<Stack> {
    let Some(first) = corners.first() else {
        bail!("no bricks");
    };
    let (mut min, mut max) = *first;
    for (low, high) in corners {
        min = Point3::new(min.x.min(low.x), min.y.min(low.y), 0);
        max = Point3::new(max.x.max(high.x), max.y.max(high.y), max.z.max(high.z));
    }
    if corners.iter().any(|(low, _)| low.z < 1) {
        bail!("bricks must lie above the floor");
    }

    let space = Grid3::from_fn(min.x..=max.x, min.y..=max.y, 0..=max.z, |_| None, |_| None)?;
    let mut bricks = Vec::with_capacity(corners.len());
    for (index, (low, high)) in corners.iter().enumerate() {
        let brick = space.view(
            low.x - min.x..=high.x - min.x,
            low.y - min.y..=high.y - min.y,
            low.z..=high.z,
        );
        for cell in brick.cells() {
            if cell.matches(Option::is_some) {
                bail!("brick {} overlaps another at {}", label(index), cell.point());
            }
            cell.set(Some(index))?;
        }
        bricks.push(brick);
    }
    Ok(Stack { space, bricks })
}

/// Lets every brick fall until it rests on the floor or on other bricks.
///
/// Returns, per brick, the bricks it rests on.
pub fn settle(stack: &mut Stack) -> Result<Vec<FxHashSet<usize>>> {
    let mut order: Vec<usize> = (0..stack.bricks.len()).collect();
    order.sort_by_key(|&index| stack.bricks[index].min_z());

    let mut supports = vec![FxHashSet::default(); stack.bricks.len()];
    for index in order {
        loop {
            let brick = &stack.bricks[index];
            if brick.min_z() <= 1 {
                trace!(brick = %label(index), "landed on the floor");
                break;
            }
            let below = brick.view(.., .., -1..brick.size_z() - 1);
            let holders: FxHashSet<usize> = below
                .cells()
                .filter_map(|cell| cell.value())
                .filter(|&other| other != index)
                .collect();
            if !holders.is_empty() {
                trace!(brick = %label(index), ?holders, "settled");
                supports[index] = holders;
                break;
            }
            for cell in brick.cells() {
                cell.set(None)?;
            }
            for cell in below.cells() {
                cell.set(Some(index))?;
            }
            stack.bricks[index] = below;
        }
    }
    Ok(supports)
}

/// Bricks whose removal leaves every other brick supported.
pub fn removable(supports: &[FxHashSet<usize>]) -> Vec<usize> {
    (0..supports.len())
        .filter(|&candidate| {
            !supports
                .iter()
                .any(|held| held.len() == 1 && held.contains(&candidate))
        })
        .collect()
}

pub fn disintegrable(supports: &[FxHashSet<usize>]) -> usize {
    removable(supports).len()
}

pub fn label(index: usize) -> char {
    char::from(b'A' + (index % 26) as u8)
}

/// Shows the brick seen along a line of cells, `?` when several are.
fn brick_along(line: &View3<Option<usize>>) -> String {
    let mut bricks = line.cells().filter_map(|cell| cell.value());
    let Some(first) = bricks.next() else {
        return ".".to_string();
    };
    if bricks.all(|other| other == first) {
        label(first).to_string()
    } else {
        "?".to_string()
    }
}

/// Front and left projections of the stack.
pub fn projections(stack: &Stack) -> (String, String) {
    (
        project(&stack.space, Projection::Front, brick_along),
        project(&stack.space, Projection::Left, brick_along),
    )
}

#[cfg(test)]
mod tests {
    use gridscape::{render, HighlightCells};

    use super::*;

    const SCHEMATIC: &str = "\
467..114..
...*......
..35..633.
......#...
617*......
.....+.58.
..592.....
......755.
...$.*....
.664.598..";

    const UNIVERSE: &str = "\
...#......
.......#..
#.........
..........
......#...
.#........
.........#
..........
.......#..
#...#.....";

    const DIG_PLAN: &str = "\
R 6 (#70c710)
D 5 (#0dc571)
L 2 (#5713f0)
D 2 (#d2c081)
R 2 (#59c680)
D 2 (#411b91)
L 5 (#8ceff2)
U 2 (#caa173)
L 1 (#1b58a2)
U 2 (#caa171)
R 2 (#7807d2)
U 3 (#a77fa3)
L 2 (#015232)
U 2 (#7a21e3)";

    const BRICKS: &str = "\
1,0,1~1,2,1
0,0,2~2,0,2
0,2,3~2,2,3
0,0,4~0,2,4
2,0,5~2,2,5
0,1,6~2,1,6
1,1,8~1,1,9";

    fn lines(text: &str) -> Vec<&str> {
        text.lines().collect()
    }

    #[test]
    fn test_part_numbers_sum() {
        let schematic = Grid::from_lines(SCHEMATIC.lines(), '.').unwrap();
        let numbers = part_numbers(&schematic).unwrap();
        assert_eq!(numbers.len(), 10);
        let loose: Vec<u64> = numbers
            .iter()
            .filter(|number| !number.touches_symbol)
            .map(|number| number.value)
            .collect();
        assert_eq!(loose, vec![114, 58]);
        let sum: u64 = numbers
            .iter()
            .filter(|number| number.touches_symbol)
            .map(|number| number.value)
            .sum();
        assert_eq!(sum, 4361);
    }

    #[test]
    fn test_expansion_doubles_empty_lines() {
        let universe = Grid::from_lines(UNIVERSE.lines(), '.').unwrap();
        expand(&universe, 2).unwrap();
        assert_eq!((universe.width(), universe.height()), (13, 12));
        assert_eq!(galaxy_distances(&universe), 374);
    }

    #[test]
    fn test_expansion_by_ten() {
        let universe = Grid::from_lines(UNIVERSE.lines(), '.').unwrap();
        expand(&universe, 10).unwrap();
        assert_eq!(galaxy_distances(&universe), 1030);
    }

    #[test]
    fn test_expanded_universe_renders() {
        let universe = Grid::from_lines(UNIVERSE.lines(), '.').unwrap();
        expand(&universe, 2).unwrap();
        insta::assert_snapshot!(universe.to_string(), @r"
        ....#........
        .........#...
        #............
        .............
        .............
        ........#....
        .#...........
        ............#
        .............
        .............
        .........#...
        #....#.......
        ");
    }

    #[test]
    fn test_lagoon_area() {
        let plan = parse_dig_plan(&lines(DIG_PLAN), false).unwrap();
        assert_eq!(plan[0].direction, Direction::Right);
        assert_eq!(plan[0].color, Some(0x70c710));
        let (_, area) = dig_lagoon(&plan).unwrap();
        assert_eq!(area, 62);
    }

    #[test]
    fn test_lagoon_area_from_hex() {
        let plan = parse_dig_plan(&lines(DIG_PLAN), true).unwrap();
        assert_eq!(
            plan[0],
            DigStep {
                direction: Direction::Right,
                meters: 461937,
                color: None
            }
        );
        let (terrain, area) = dig_lagoon(&plan).unwrap();
        assert_eq!(area, 952408144115);
        assert!(terrain.grid().width() < 20);
    }

    #[test]
    fn test_lagoon_renders_compressed_terrain() {
        let plan = parse_dig_plan(&lines(DIG_PLAN), false).unwrap();
        let (terrain, _) = dig_lagoon(&plan).unwrap();
        let text = render(terrain.grid(), ground_symbol, &trench_colour);
        assert!(text.contains("\u{1b}[48;2;112;199;16m#\u{1b}[0m"));
        let nothing = HighlightCells::new(Vec::<Point>::new(), "1");
        let plain = render(terrain.grid(), ground_symbol, &nothing);
        assert!(!plain.contains('?'));
    }

    #[test]
    fn test_bad_dig_plan_reports_line() {
        let error = parse_dig_plan(&["R 6 (#70c710)", "X 1 (#000000)"], false).unwrap_err();
        assert!(format!("{error:#}").contains("line 2"));
    }

    #[test]
    fn test_non_ascii_colour_is_rejected() {
        for hex in [false, true] {
            let error = parse_dig_plan(&["R 6 (#ééé)"], hex).unwrap_err();
            assert!(format!("{error:#}").contains("not six hex digits"));
        }
    }

    #[test]
    fn test_bricks_settle() {
        let corners = parse_bricks(&lines(BRICKS)).unwrap();
        let mut stack = stack_bricks(&corners).unwrap();
        let supports = settle(&mut stack).unwrap();
        assert_eq!(stack.bricks[6].min_z(), 5);
        let holders: FxHashSet<usize> = [3, 4].into_iter().collect();
        assert_eq!(supports[5], holders);
        assert_eq!(disintegrable(&supports), 5);
    }

    #[test]
    fn test_brick_projections() {
        let corners = parse_bricks(&lines(BRICKS)).unwrap();
        let mut stack = stack_bricks(&corners).unwrap();
        let (front, left) = projections(&stack);
        insta::assert_snapshot!(front, @r"
        .G.
        .G.
        ...
        FFF
        ..E
        D..
        CCC
        BBB
        .A.
        ...
        ");
        insta::assert_snapshot!(left, @r"
        .G.
        .G.
        ...
        .F.
        EEE
        DDD
        ..C
        B..
        AAA
        ...
        ");

        settle(&mut stack).unwrap();
        let (front, left) = projections(&stack);
        insta::assert_snapshot!(front, @r"
        ...
        ...
        ...
        .G.
        .G.
        FFF
        D.E
        ???
        .A.
        ...
        ");
        insta::assert_snapshot!(left, @r"
        ...
        ...
        ...
        .G.
        .G.
        .F.
        ???
        B.C
        AAA
        ...
        ");
    }

    #[test]
    fn test_overlapping_bricks_fail() {
        let corners = parse_bricks(&["0,0,1~1,0,1", "1,0,1~1,1,1"]).unwrap();
        assert!(stack_bricks(&corners).is_err());
    }
}
