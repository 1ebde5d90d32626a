use thiserror::Error;

/// Errors produced by the selector and the mean aggregator.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("record {record}: column index {index} out of range for row of length {len}")]
    ColumnOutOfRange {
        record: u64,
        index: usize,
        len: usize,
    },

    #[error("no input tables given")]
    NoInputs,

    #[error("input {table} does not match the shape of input 0: {detail}")]
    ShapeMismatch { table: usize, detail: String },

    #[error("input {table}, row {row}, column {column}: {value:?} is not a number")]
    NotNumeric {
        table: usize,
        row: usize,
        column: usize,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
