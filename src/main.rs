//! Grid Toolbox
//!
//! Loads text puzzles into grids and runs small clients of the grid library
//! on them: rendering with padding, digit run scanning, cosmic expansion by
//! row and column insertion, a sparse dig-plan lagoon and settling bricks in
//! a volume with an interactive 3D viewer.

mod demos;
mod visualization;

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gridscape::{render, Grid, NoHighlight, Offset, Region};

/// Runs grid puzzle clients on text input files.
#[derive(Parser)]
#[command(name = "gridscape")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a character grid, optionally padded with sentinel cells.
    Show {
        file: PathBuf,
        /// Cells of padding on every side.
        #[arg(long, default_value_t = 0)]
        grow: i64,
        /// Character shown for cells outside the grid.
        #[arg(long, default_value_t = '.')]
        pad: char,
    },
    /// List digit runs and sum those touching a symbol.
    Runs { file: PathBuf },
    /// Expand empty rows and columns and sum galaxy distances.
    Expand {
        file: PathBuf,
        /// Copies each empty row or column is replaced by.
        #[arg(long, default_value_t = 2)]
        factor: usize,
    },
    /// Dig the lagoon described by a dig plan and report its area.
    Lagoon {
        file: PathBuf,
        /// Decode distances and directions from the colour codes.
        #[arg(long)]
        hex: bool,
        /// Print the compressed terrain.
        #[arg(long)]
        map: bool,
    },
    /// Let falling bricks settle and count the safely removable ones.
    Stack {
        file: PathBuf,
        /// Open the settled bricks in an interactive 3D viewer.
        #[arg(long)]
        display: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = match cli.command {
        Command::Show { file, grow, pad } => run_show(&read_lines(&file)?, grow, pad)?,
        Command::Runs { file } => run_runs(&read_lines(&file)?)?,
        Command::Expand { file, factor } => run_expand(&read_lines(&file)?, factor)?,
        Command::Lagoon { file, hex, map } => run_lagoon(&read_lines(&file)?, hex, map)?,
        Command::Stack { file, display } => {
            let (output, frames) = run_stack(&read_lines(&file)?)?;
            if display {
                println!("{output}");
                println!("Controls: Left/Right before/after, Up/Down explode, R reset");
                visualization::display(frames);
                return Ok(());
            }
            output
        }
    };
    println!("{output}");
    Ok(())
}

/// Logs to stderr; `RUST_LOG` overrides the verbosity flag.
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    info!(path = %path.display(), "loaded input");
    Ok(text
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn run_show(lines: &[String], grow: i64, pad: char) -> Result<String> {
    let grid = Grid::from_lines(lines, pad)?;
    let view = grid.grow(Offset::uniform(grow.max(0)));
    Ok(render(&view, char::to_string, &NoHighlight))
}

fn run_runs(lines: &[String]) -> Result<String> {
    let schematic = Grid::from_lines(lines, '.')?;
    let numbers = demos::part_numbers(&schematic)?;

    let mut output = String::new();
    for number in &numbers {
        writeln!(
            output,
            "{} at x={}..={}, y={}{}",
            number.value,
            number.first,
            number.last,
            number.row,
            if number.touches_symbol { "" } else { " (loose)" }
        )?;
    }
    let sum: u64 = numbers
        .iter()
        .filter(|number| number.touches_symbol)
        .map(|number| number.value)
        .sum();
    write!(output, "Sum of part numbers: {sum}")?;
    Ok(output)
}

fn run_expand(lines: &[String], factor: usize) -> Result<String> {
    let universe = Grid::from_lines(lines, '.')?;
    demos::expand(&universe, factor)?;
    Ok(format!(
        "Expanded to {}x{}\nSum of galaxy distances: {}",
        universe.width(),
        universe.height(),
        demos::galaxy_distances(&universe)
    ))
}

fn run_lagoon(lines: &[String], hex: bool, map: bool) -> Result<String> {
    let plan = demos::parse_dig_plan(lines, hex)?;
    let (terrain, area) = demos::dig_lagoon(&plan)?;

    let mut output = String::new();
    if map {
        writeln!(
            output,
            "{}",
            render(terrain.grid(), demos::ground_symbol, &demos::trench_colour)
        )?;
    }
    write!(output, "Lagoon area: {area}")?;
    Ok(output)
}

fn run_stack(lines: &[String]) -> Result<(String, Vec<visualization::Frame>)> {
    let corners = demos::parse_bricks(lines)?;
    let mut stack = demos::stack_bricks(&corners)?;
    let brick = |cell: &Option<usize>| *cell;
    let before = visualization::Frame::capture("Falling", &stack.space, brick);

    let mut output = String::new();
    let (front, left) = demos::projections(&stack);
    writeln!(output, "Front\n{front}\nLeft\n{left}\n")?;

    let supports = demos::settle(&mut stack)?;
    let after = visualization::Frame::capture("Settled", &stack.space, brick);
    let (front, left) = demos::projections(&stack);
    writeln!(output, "Front\n{front}\nLeft\n{left}\n")?;

    let removable: String = demos::removable(&supports).into_iter().map(demos::label).collect();
    write!(
        output,
        "Safely removable: {} {removable}",
        demos::disintegrable(&supports)
    )?;
    Ok((output, vec![before, after]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_show_pads_grid() {
        let output = run_show(&lines("ab\ncd"), 1, '~').unwrap();
        insta::assert_snapshot!(output, @r"
        ~~~~
        ~ab~
        ~cd~
        ~~~~
        ");
    }

    #[test]
    fn test_runs_report() {
        let output = run_runs(&lines("467..114..\n...*......\n..35..633.")).unwrap();
        insta::assert_snapshot!(output, @r"
        467 at x=0..=2, y=0
        114 at x=5..=7, y=0 (loose)
        35 at x=2..=3, y=2
        633 at x=6..=8, y=2 (loose)
        Sum of part numbers: 502
        ");
    }

    #[test]
    fn test_expand_report() {
        let output = run_expand(&lines("#.\n..\n.#"), 2).unwrap();
        insta::assert_snapshot!(output, @r"
        Expanded to 2x4
        Sum of galaxy distances: 4
        ");
    }

    #[test]
    fn test_lagoon_report() {
        let plan = lines("R 2 (#000000)\nD 2 (#000000)\nL 2 (#000000)\nU 2 (#000000)");
        let output = run_lagoon(&plan, false, false).unwrap();
        assert_eq!(output, "Lagoon area: 9");
    }

    #[test]
    fn test_stack_report_counts_removable_bricks() {
        let bricks = [
            "1,0,1~1,2,1",
            "0,0,2~2,0,2",
            "0,2,3~2,2,3",
            "0,0,4~0,2,4",
            "2,0,5~2,2,5",
            "0,1,6~2,1,6",
            "1,1,8~1,1,9",
        ];
        let (output, frames) = run_stack(&lines(&bricks.join("\n"))).unwrap();
        assert!(output.ends_with("Safely removable: 5 BCDEG"));
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].blocks.len(), frames[0].blocks.len());
    }

    #[test]
    fn test_missing_file_has_context() {
        let error = read_lines(Path::new("/nonexistent/input.txt")).unwrap_err();
        assert!(error.to_string().contains("failed to read"));
    }
}
