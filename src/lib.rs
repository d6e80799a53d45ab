//! Grid Library
//!
//! Zero-copy views over rectangular grids: windows, rows, columns and single
//! cells that share one backing store, out-of-bounds sentinel reads, row and
//! column insertion that keeps issued views valid, run scanning, coordinate
//! compression for sparse planes, and a 3D variant with orthographic
//! projection.

pub mod cell;
pub mod error;
pub mod geometry;
pub mod grid3d;
pub mod render;
pub mod scan;
pub mod sparse;
pub mod store;
pub mod view;

pub use cell::Cell;
pub use error::{Error, Result};
pub use geometry::{Bounds, Delta, Direction, Offset, Point};
pub use grid3d::{
    first_present, project, project_highlighted, Cell3, Grid3, Highlight3, Offset3, Point3,
    Projection, View3,
};
pub use render::{render, Highlight, HighlightCells, NoHighlight};
pub use scan::Runs;
pub use sparse::{SparseAxis, SparseData, SparseGrid, SparseMeta, SparseRegion};
pub use store::Store;
pub use view::{Cells, Column, Grid, Region, Row, View};
