// src/table.rs
use csv::{ReaderBuilder, WriterBuilder};
use std::io::{BufRead, Read, Write};
use tracing::debug;

use crate::error::Result;

/// One CSV record as owned strings, positionally indexed.
pub type Row = Vec<String>;

/// A fully materialised CSV file. Rows may differ in length.
pub type Rows = Vec<Row>;

/// Reader configured for headerless, ragged CSV.
pub fn csv_reader<R: Read>(rdr: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(rdr)
}

/// Writer that accepts records of any length.
pub fn csv_writer<W: Write>(wtr: W) -> csv::Writer<W> {
    WriterBuilder::new().flexible(true).from_writer(wtr)
}

/// Where the splitter is within the current record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quoting {
    FieldStart,
    Unquoted,
    Quoted,
    /// A quote seen inside a quoted field: either an escape or the close.
    QuoteInQuoted,
}

impl Quoting {
    fn next(self, b: u8) -> Self {
        match (self, b) {
            (Quoting::Quoted, b'"') => Quoting::QuoteInQuoted,
            (Quoting::Quoted, _) => Quoting::Quoted,
            (Quoting::QuoteInQuoted, b'"') => Quoting::Quoted,
            (Quoting::FieldStart, b'"') => Quoting::Quoted,
            (_, b',' | b'\n' | b'\r') => Quoting::FieldStart,
            _ => Quoting::Unquoted,
        }
    }
}

fn trim_terminator(mut line: &[u8]) -> &[u8] {
    if let [rest @ .., b'\n'] = line {
        line = rest;
    }
    if let [rest @ .., b'\r'] = line {
        line = rest;
    }
    line
}

/// Streams CSV records one at a time.
///
/// Unlike `csv::Reader`, a blank line is a record with no fields rather than
/// being skipped, so record positions match physical records in the input.
/// Quoted fields may span lines.
pub struct RecordReader<R> {
    rdr: R,
    buf: Vec<u8>,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(rdr: R) -> Self {
        Self {
            rdr,
            buf: Vec::new(),
        }
    }

    /// The next record, or `None` at end of input.
    pub fn read_row(&mut self) -> Result<Option<Row>> {
        self.buf.clear();
        let mut state = Quoting::FieldStart;
        loop {
            let start = self.buf.len();
            if self.rdr.read_until(b'\n', &mut self.buf)? == 0 {
                break;
            }
            state = self.buf[start..].iter().fold(state, |s, &b| s.next(b));
            if state != Quoting::Quoted {
                break;
            }
        }
        if self.buf.is_empty() {
            return Ok(None);
        }

        let line = trim_terminator(&self.buf);
        if line.is_empty() {
            return Ok(Some(Row::new()));
        }
        match csv_reader(line).records().next() {
            Some(record) => Ok(Some(record?.iter().map(str::to_string).collect())),
            None => Ok(Some(Row::new())),
        }
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_row().transpose()
    }
}

/// Read every record from `rdr` into memory.
pub fn read_table<R: BufRead>(rdr: R) -> Result<Rows> {
    let rows = RecordReader::new(rdr).collect::<Result<Rows>>()?;
    debug!(rows = rows.len(), "read table");
    Ok(rows)
}

/// Write one record as a CSV line. An empty row is written as a blank line.
pub fn write_row<W: Write>(wtr: &mut W, row: &[String]) -> Result<()> {
    if row.is_empty() {
        wtr.write_all(b"\n")?;
        return Ok(());
    }
    let mut writer = csv_writer(wtr);
    writer.write_record(row)?;
    writer.flush()?;
    Ok(())
}

/// Write `rows` to `wtr` in order, one record per line, then flush.
pub fn write_table<W: Write>(mut wtr: W, rows: &[Row]) -> Result<()> {
    for row in rows {
        write_row(&mut wtr, row)?;
    }
    wtr.flush()?;
    debug!(rows = rows.len(), "wrote table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn rows(rows: &[&[&str]]) -> Rows {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn reads_ragged_rows_without_headers() -> Result<()> {
        let text = "h1,h2\np,1.0,3.0\n\"a,b\",x\n";
        assert_eq!(
            read_table(text.as_bytes())?,
            rows(&[&["h1", "h2"], &["p", "1.0", "3.0"], &["a,b", "x"]])
        );
        Ok(())
    }

    #[test]
    fn blank_lines_are_empty_rows() -> Result<()> {
        assert_eq!(
            read_table("h\n\n1\n".as_bytes())?,
            rows(&[&["h"], &[], &["1"]])
        );
        assert_eq!(
            read_table("a\r\n\r\nb".as_bytes())?,
            rows(&[&["a"], &[], &["b"]])
        );
        Ok(())
    }

    #[test]
    fn quoted_fields_may_span_lines() -> Result<()> {
        let text = "\"x\n\ny\",1\n\"say \"\"hi\"\"\",2\n5\",3\n";
        assert_eq!(
            read_table(text.as_bytes())?,
            rows(&[&["x\n\ny", "1"], &["say \"hi\"", "2"], &["5\"", "3"]])
        );
        Ok(())
    }

    #[test]
    fn empty_input_has_no_rows() -> Result<()> {
        assert!(read_table("".as_bytes())?.is_empty());
        Ok(())
    }

    #[test]
    fn writes_with_minimal_quoting() -> Result<()> {
        let table = rows(&[&["h1", "h2"], &["a,b", "say \"hi\"", "3.0"]]);
        let mut out = Vec::new();
        write_table(&mut out, &table)?;
        assert_eq!(
            String::from_utf8(out)?,
            "h1,h2\n\"a,b\",\"say \"\"hi\"\"\",3.0\n"
        );
        Ok(())
    }

    #[test]
    fn empty_rows_are_written_as_blank_lines() -> Result<()> {
        let table = rows(&[&["h"], &[], &["1.0"]]);
        let mut out = Vec::new();
        write_table(&mut out, &table)?;
        let text = String::from_utf8(out)?;
        assert_eq!(text, "h\n\n1.0\n");
        assert_eq!(read_table(text.as_bytes())?, table);
        Ok(())
    }

    #[test]
    fn malformed_utf8_is_a_csv_error() {
        let bytes: &[u8] = b"ok,\xff\xfe\n";
        assert!(matches!(read_table(bytes), Err(crate::Error::Csv(_))));
    }
}
