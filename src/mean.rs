// src/mean.rs
//! Element-wise arithmetic mean across structurally identical CSV tables.
//!
//! Each table is split by a [`FreezeLayout`] into three regions:
//! - the first `freeze_rows` rows are headers,
//! - the first `freeze_cols` cells of every remaining row are a prefix,
//! - everything else is the numeric data region.
//!
//! The result keeps the headers and prefixes of the first table verbatim and
//! replaces every data cell with the mean of that cell across all tables.

use tracing::{debug, info, instrument};

use crate::error::{Error, Result};
use crate::table::{Row, Rows};

/// Number of leading rows and columns excluded from averaging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FreezeLayout {
    pub freeze_rows: usize,
    pub freeze_cols: usize,
}

impl FreezeLayout {
    pub fn new(freeze_rows: usize, freeze_cols: usize) -> Self {
        Self {
            freeze_rows,
            freeze_cols,
        }
    }
}

/// A table read in full, together with the layout that partitions it.
#[derive(Debug, Clone, PartialEq)]
pub struct FrozenTable {
    rows: Rows,
    layout: FreezeLayout,
}

impl FrozenTable {
    pub fn new(rows: Rows, layout: FreezeLayout) -> Self {
        Self { rows, layout }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Rows {
        self.rows
    }

    /// The header rows, or every row if the table is shorter than `freeze_rows`.
    pub fn headers(&self) -> &[Row] {
        let end = self.layout.freeze_rows.min(self.rows.len());
        &self.rows[..end]
    }

    /// Rows below the headers, prefixes included.
    pub fn data_rows(&self) -> &[Row] {
        let start = self.layout.freeze_rows.min(self.rows.len());
        &self.rows[start..]
    }

    /// Prefix cells of data row `data_row`. Rows shorter than `freeze_cols`
    /// are all prefix.
    pub fn data_prefix(&self, data_row: usize) -> &[String] {
        let row = &self.data_rows()[data_row];
        &row[..self.layout.freeze_cols.min(row.len())]
    }

    fn data_cells(&self, data_row: usize) -> &[String] {
        let row = &self.data_rows()[data_row];
        &row[self.layout.freeze_cols.min(row.len())..]
    }

    /// The data region parsed as numbers. `table` is only used to label errors.
    pub fn data(&self, table: usize) -> Result<Vec<Vec<f64>>> {
        (0..self.data_rows().len())
            .map(|r| {
                self.data_cells(r)
                    .iter()
                    .enumerate()
                    .map(|(c, cell)| {
                        parse_cell(cell).ok_or_else(|| Error::NotNumeric {
                            table,
                            row: r + self.layout.freeze_rows,
                            column: c + self.layout.freeze_cols,
                            value: cell.clone(),
                        })
                    })
                    .collect::<Result<Vec<f64>>>()
            })
            .collect()
    }
}

fn parse_cell(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok()
}

/// Render a mean the way it is written to the output: shortest round-trip
/// form, always with a decimal point or exponent.
pub fn format_mean(value: f64) -> String {
    format!("{:?}", value)
}

/// Correctly rounded sum of `values`, independent of their order.
///
/// Keeps a list of non-overlapping partial sums (Shewchuk's algorithm) and
/// rounds once at the end, half to even. Returns `None` if an intermediate
/// partial overflows.
fn exact_sum(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut partials: Vec<f64> = Vec::new();
    for mut x in values {
        let mut i = 0;
        for j in 0..partials.len() {
            let mut y = partials[j];
            if x.abs() < y.abs() {
                std::mem::swap(&mut x, &mut y);
            }
            let hi = x + y;
            let lo = y - (hi - x);
            if lo != 0.0 {
                partials[i] = lo;
                i += 1;
            }
            x = hi;
        }
        if !x.is_finite() {
            return None;
        }
        partials.truncate(i);
        partials.push(x);
    }

    let Some(mut hi) = partials.pop() else {
        return Some(0.0);
    };
    let mut lo = 0.0;
    while let Some(y) = partials.pop() {
        let x = hi;
        hi = x + y;
        lo = y - (hi - x);
        if lo != 0.0 {
            break;
        }
    }
    // Round half to even when the remaining partials push past the halfway point.
    if let Some(&next) = partials.last() {
        if (lo < 0.0 && next < 0.0) || (lo > 0.0 && next > 0.0) {
            let y = lo * 2.0;
            let x = hi + y;
            if y == x - hi {
                hi = x;
            }
        }
    }
    Some(hi)
}

/// Arithmetic mean of one cell across all inputs.
fn cell_mean(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.iter().any(|v| !v.is_finite()) {
        // inf and nan propagate the same way in any order.
        return values.iter().sum::<f64>() / n;
    }
    match exact_sum(values.iter().copied()) {
        Some(sum) => sum / n,
        None => exact_sum(values.iter().map(|v| v / n))
            .unwrap_or_else(|| values.iter().map(|v| v / n).sum()),
    }
}

/// Check that `other` has the same data-region shape as `first`.
fn check_shape(first: &FrozenTable, other: &FrozenTable, table: usize) -> Result<()> {
    let (want, got) = (first.data_rows(), other.data_rows());
    if first.headers().len() != other.headers().len() || want.len() != got.len() {
        return Err(Error::ShapeMismatch {
            table,
            detail: format!(
                "expected {} rows, found {}",
                first.rows.len(),
                other.rows.len()
            ),
        });
    }
    for r in 0..want.len() {
        let (w, g) = (first.data_cells(r).len(), other.data_cells(r).len());
        if w != g {
            return Err(Error::ShapeMismatch {
                table,
                detail: format!(
                    "row {} has {} data cells, expected {}",
                    r + first.layout.freeze_rows,
                    g,
                    w
                ),
            });
        }
    }
    Ok(())
}

/// Compute the element-wise mean of `tables`.
///
/// Headers and prefixes are copied from `tables[0]`; every data cell becomes
/// the unweighted mean of the corresponding cell across all inputs. All
/// tables are validated and parsed before the result is assembled, so an
/// error means no result at all.
#[instrument(level = "debug", skip(tables), fields(tables = tables.len()))]
pub fn mean_tables(tables: &[FrozenTable]) -> Result<FrozenTable> {
    let (first, rest) = tables.split_first().ok_or(Error::NoInputs)?;

    for (i, other) in rest.iter().enumerate() {
        check_shape(first, other, i + 1)?;
    }

    let data = tables
        .iter()
        .enumerate()
        .map(|(i, t)| t.data(i))
        .collect::<Result<Vec<_>>>()?;
    debug!(data_rows = first.data_rows().len(), "parsed data regions");

    let mut cell = Vec::with_capacity(tables.len());
    let mut rows: Rows = first.headers().to_vec();
    rows.reserve(data[0].len());
    for (r, first_row) in data[0].iter().enumerate() {
        let mut row: Row = first.data_prefix(r).to_vec();
        row.reserve(first_row.len());
        for c in 0..first_row.len() {
            cell.clear();
            cell.extend(data.iter().map(|t| t[r][c]));
            row.push(format_mean(cell_mean(&cell)));
        }
        rows.push(row);
    }

    info!(inputs = tables.len(), rows = rows.len(), "computed mean");
    Ok(FrozenTable::new(rows, first.layout))
}
