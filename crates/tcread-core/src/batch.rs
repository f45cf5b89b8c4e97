//! Row-oriented CSV tables for batch extraction.
//!
//! The input format is an EDL-style export: a header row naming the
//! columns, then one row per clip, cells separated by commas with
//! optional whitespace.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::error::Error;

/// Column holding the video path.
pub const COL_SEQUENCE_NAME: &str = "Sequence Name";
/// Column holding the edit-decision in point.
pub const COL_SEQUENCE_IN: &str = "Sequence In";
/// Column holding the edit-decision out point.
pub const COL_SEQUENCE_OUT: &str = "Sequence Out";
/// Column naming the source profile for the row's footage.
pub const COL_SOURCE_REEL: &str = "Source Reel Name";
/// Output column appended for the extracted in point.
pub const COL_SOURCE_IN: &str = "Source In";
/// Output column appended for the extracted out point.
pub const COL_SOURCE_OUT: &str = "Source Out";

/// A parsed input table: a header row plus data rows, cells addressed
/// by column name.
#[derive(Debug, Clone)]
pub struct BatchTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl BatchTable {
    /// Parse comma-separated text with a header row. Cells are
    /// whitespace-trimmed; blank lines are ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines().filter(|line| !line.trim().is_empty());
        let Some(header_line) = lines.next() else {
            bail!("input table is empty");
        };

        let headers: Vec<String> = header_line
            .split(',')
            .map(|cell| cell.trim().to_owned())
            .collect();
        let rows: Vec<Vec<String>> = lines
            .map(|line| line.split(',').map(|cell| cell.trim().to_owned()).collect())
            .collect();

        Ok(Self { headers, rows })
    }

    /// Read and parse a table from a file.
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let table = Self::parse(&text)?;
        info!(?path, rows = table.rows.len(), "input table loaded");
        Ok(table)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> &[String] {
        &self.rows[index]
    }

    /// Look up a cell by row index and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.headers.iter().position(|header| header == column)?;
        self.rows.get(row)?.get(col).map(|cell| cell.as_str())
    }

    /// Like [`BatchTable::get`], but a missing column or short row
    /// fails that row.
    pub fn require(&self, row: usize, column: &str) -> Result<&str, Error> {
        self.get(row, column).ok_or_else(|| Error::MalformedRow {
            row,
            column: column.to_owned(),
        })
    }
}

/// Render an output table: header row first, cells joined with ", ",
/// no trailing separator.
pub fn render_output(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    out.push_str(&headers.join(", "));
    out.push('\n');
    for row in rows {
        out.push_str(&row.join(", "));
        out.push('\n');
    }
    out
}

/// Write an output table as comma-separated text.
pub fn write_output(path: &Path, headers: &[String], rows: &[Vec<String>]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .context("failed to create output directory")?;
        }
    }

    std::fs::write(path, render_output(headers, rows))
        .with_context(|| format!("failed to write {}", path.display()))?;

    info!(?path, rows = rows.len(), "output table written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Sequence Name, Sequence In, Sequence Out, Source Reel Name
tape_a.mov, 00:00:01:00, 00:00:02:00, Nat Geo
tape_b.mov, 00:00:03:00, 00:00:04:00, Nat Geo
";

    #[test]
    fn parses_headers_and_rows() {
        let table = BatchTable::parse(SAMPLE).unwrap();
        assert_eq!(table.headers().len(), 4);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(0, COL_SEQUENCE_NAME), Some("tape_a.mov"));
        assert_eq!(table.get(1, COL_SOURCE_REEL), Some("Nat Geo"));
    }

    #[test]
    fn cells_are_whitespace_trimmed() {
        let table = BatchTable::parse("A ,  B\n 1 ,2 \n").unwrap();
        assert_eq!(table.headers(), ["A", "B"]);
        assert_eq!(table.get(0, "A"), Some("1"));
        assert_eq!(table.get(0, "B"), Some("2"));
    }

    #[test]
    fn missing_column_fails_the_row() {
        let table = BatchTable::parse(SAMPLE).unwrap();
        let err = table.require(1, "No Such Column").unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedRow { row: 1, column } if column == "No Such Column"
        ));
    }

    #[test]
    fn short_row_fails_on_the_absent_cell() {
        let table = BatchTable::parse("A, B, C\n1, 2\n").unwrap();
        assert_eq!(table.get(0, "B"), Some("2"));
        assert!(table.require(0, "C").is_err());
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(BatchTable::parse("").is_err());
        assert!(BatchTable::parse("\n\n").is_err());
    }

    #[test]
    fn renders_without_trailing_separator() {
        let headers = vec!["A".to_owned(), "B".to_owned()];
        let rows = vec![vec!["1".to_owned(), "2".to_owned()]];
        assert_eq!(render_output(&headers, &rows), "A, B\n1, 2\n");
    }

    #[test]
    fn parse_render_round_trips() {
        let table = BatchTable::parse(SAMPLE).unwrap();
        let rendered = render_output(
            table.headers(),
            &(0..table.row_count())
                .map(|i| table.row(i).to_vec())
                .collect::<Vec<_>>(),
        );
        assert_eq!(rendered, SAMPLE);
    }
}
