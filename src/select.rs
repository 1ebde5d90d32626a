// src/select.rs
use std::io::{BufReader, Read, Write};
use tracing::{debug, info, instrument};

use crate::error::{Error, Result};
use crate::table::{write_row, RecordReader};

/// Counts reported after a selection pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectSummary {
    /// Records read from the source.
    pub records: u64,
    /// Records written to the sink.
    pub matched: u64,
}

/// Stream records from `rdr`, writing each one whose field at `index` equals
/// `key` to `wtr`.
///
/// Matching is exact string equality. Each match is flushed before the next
/// record is read, so earlier matches stay written if a later record fails.
/// A record shorter than `index + 1` fields is an error; a blank line is a
/// record with no fields.
#[instrument(level = "debug", skip(rdr, wtr))]
pub fn select_rows<R: Read, W: Write>(
    rdr: R,
    mut wtr: W,
    index: usize,
    key: &str,
) -> Result<SelectSummary> {
    let mut reader = RecordReader::new(BufReader::new(rdr));
    let mut summary = SelectSummary::default();

    while let Some(row) = reader.read_row()? {
        let value = row.get(index).ok_or_else(|| Error::ColumnOutOfRange {
            record: summary.records,
            index,
            len: row.len(),
        })?;
        if value == key {
            write_row(&mut wtr, &row)?;
            wtr.flush()?;
            summary.matched += 1;
            debug!(record = summary.records, "match");
        }
        summary.records += 1;
    }

    info!(
        records = summary.records,
        matched = summary.matched,
        "selection complete"
    );
    Ok(summary)
}
