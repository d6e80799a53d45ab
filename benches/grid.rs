//! Benchmarks for grid views, scanning and sparse counting.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gridscape::{
    first_present, project, Grid, Grid3, Offset, Point3, Projection, Region, SparseAxis,
    SparseGrid,
};

fn schematic(size: usize) -> Grid<char> {
    Grid::from_fn(
        size,
        size,
        |p| match (p.x * 7 + p.y * 3) % 11 {
            0..=3 => char::from(b'0' + (p.x % 10) as u8),
            4 => '*',
            _ => '.',
        },
        |_| '.',
    )
    .unwrap()
}

/// Benchmark scanning every row of a 140x140 schematic for digit runs.
fn bench_scan_all_lines(c: &mut Criterion) {
    let grid = schematic(140);

    c.bench_function("scan_all_lines", |b| {
        b.iter(|| black_box(&grid).scan_all_lines(char::is_ascii_digit).count())
    });
}

/// Benchmark checking the padded neighbourhood of every cell.
fn bench_grown_neighbourhoods(c: &mut Criterion) {
    let grid = schematic(64);

    c.bench_function("grown_neighbourhoods", |b| {
        b.iter(|| {
            grid.cells()
                .filter(|cell| {
                    cell.grow(Offset::uniform(1))
                        .cells()
                        .any(|around| around.matches(|c| *c == '*'))
                })
                .count()
        })
    });
}

/// Benchmark inserting rows and columns into a grid with live views.
fn bench_insertion(c: &mut Criterion) {
    c.bench_function("insert_rows_and_columns", |b| {
        b.iter(|| {
            let grid = schematic(64);
            let rows = grid.rows();
            for row in rows.iter().step_by(4) {
                grid.insert_rows_after_with(row.y(), 1, |_| '.').unwrap();
            }
            let columns = grid.columns();
            for column in columns.iter().step_by(4) {
                grid.insert_columns_after_with(column.x(), 1, |_| '.').unwrap();
            }
            black_box(grid.width() * grid.height())
        })
    });
}

/// Benchmark counting real area on a coordinate-compressed plane.
fn bench_sparse_count(c: &mut Criterion) {
    let fixed: Vec<i64> = (0..200).map(|i| i * i * 37).collect();
    let axis = SparseAxis::spanning(fixed);
    let grid = SparseGrid::build(&axis, &axis, |_| false, |meta| meta.real_x % 3 == 0).unwrap();

    c.bench_function("sparse_count", |b| {
        b.iter(|| black_box(&grid).count(|data| data.value))
    });
}

/// Benchmark projecting a 32x32x32 volume from the front.
fn bench_projection(c: &mut Criterion) {
    let filled = |p: Point3| (p.x + p.y * p.z) % 5 == 0;
    let volume = Grid3::from_fn(0..=31, 0..=31, 0..=31, filled, |_| false).unwrap();

    c.bench_function("project_front", |b| {
        b.iter(|| {
            project(
                black_box(&volume),
                Projection::Front,
                first_present(|filled: &bool| *filled, |_| "#".to_string(), "."),
            )
        })
    });
}

criterion_group!(
    benches,
    bench_scan_all_lines,
    bench_grown_neighbourhoods,
    bench_insertion,
    bench_sparse_count,
    bench_projection
);
criterion_main!(benches);
