//! Error taxonomy for grid construction, structural edits and sparse lookups.
//!
//! Reading outside a grid is not an error: it yields an out-of-bounds
//! sentinel cell instead.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Construction input is ragged, empty or otherwise mis-shaped.
    #[error("Mis-shaped grid: {0}")]
    Shape(String),

    /// A structural edit was requested through a view that may not perform it.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// A real coordinate or range does not line up with a sparse segment.
    #[error("Lookup failed: {0}")]
    Lookup(String),

    /// A write targeted an out-of-bounds sentinel cell.
    #[error("Cell {0} is out of bounds")]
    OutOfBounds(String),
}
