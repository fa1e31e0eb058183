//! Input contract violations
use thiserror::Error;

/// [TableError] describes a malformed input table.
/// These are caller contract violations and are rejected loudly,
/// as opposed to missing data which is a normal, silent outcome.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    /// The time index must be sorted in ascending (non decreasing) order:
    /// all window algorithms rely on it.
    #[error("timestamps are not sorted in ascending order")]
    UnsortedTimestamps,
    /// Every column must have exactly one cell per row.
    #[error("column \"{name}\": {len} values for {rows} rows")]
    ColumnLength {
        name: String,
        len: usize,
        rows: usize,
    },
    /// Column names must be unique.
    #[error("column \"{0}\" is defined twice")]
    DuplicateColumn(String),
}
