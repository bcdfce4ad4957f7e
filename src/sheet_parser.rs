//! Tabular data parsing for CSV and Excel (.xlsx/.xlsm/.xlsb) sheets.

use anyhow::{Context, Result};
use calamine::{open_workbook_from_rs, Data, Reader, Xlsb, Xlsx};
use chrono::Timelike;
use std::io::Cursor;

/// Raw parsed sheet: header row plus data rows, all cells as text.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawSheet {
    /// Index of the column whose header equals `name` (ignoring surrounding whitespace).
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    /// Cell text, empty when the row is shorter than the header.
    pub fn cell<'a>(row: &'a [String], index: usize) -> &'a str {
        row.get(index).map(String::as_str).unwrap_or("")
    }
}

/// Dispatch parsing by file extension.
pub fn parse_file(filename: &str, data: &[u8]) -> Result<RawSheet> {
    let ext = filename
        .rsplit('.')
        .next()
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "csv" => parse_csv(filename, data),
        "xlsx" | "xlsm" => {
            let workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(data))
                .context("Failed to open Excel workbook")?;
            first_sheet_with_header(workbook)
        }
        "xlsb" => {
            let workbook: Xlsb<_> = open_workbook_from_rs(Cursor::new(data))
                .context("Failed to open Excel workbook")?;
            first_sheet_with_header(workbook)
        }
        _ => anyhow::bail!(
            "Unsupported sheet type: .{}. Supported: .csv, .xlsx, .xlsm, .xlsb",
            ext
        ),
    }
}

/// Parse CSV bytes. The first record is the header row.
pub fn parse_csv(filename: &str, data: &[u8]) -> Result<RawSheet> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(data);

    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    if headers.iter().all(|h| h.trim().is_empty()) {
        anyhow::bail!("CSV sheet has no headers");
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.context("Failed to read CSV record")?;
        let row: Vec<String> = record.iter().map(|f| f.to_string()).collect();
        if row.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        rows.push(row);
    }

    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim_end_matches(".csv")
        .to_string();

    Ok(RawSheet {
        name,
        headers,
        rows,
    })
}

/// Use the first worksheet that has a header row. A header without data rows is an empty sheet, not an error.
fn first_sheet_with_header<'a, R>(mut workbook: R) -> Result<RawSheet>
where
    R: Reader<Cursor<&'a [u8]>>,
    R::Error: std::fmt::Display,
{
    for name in workbook.sheet_names() {
        let range = match workbook.worksheet_range(&name) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Skipping sheet '{}': {}", name, e);
                continue;
            }
        };

        if let Some(sheet) = range_to_raw_sheet(&name, &range) {
            return Ok(sheet);
        }
    }

    anyhow::bail!("No sheet with a header row found in workbook")
}

/// First row = headers. Empty rows are dropped; a sheet without headers yields `None`.
fn range_to_raw_sheet(name: &str, range: &calamine::Range<Data>) -> Option<RawSheet> {
    let mut row_iter = range.rows();

    let headers: Vec<String> = row_iter.next()?.iter().map(cell_to_string).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return None;
    }

    let rows: Vec<Vec<String>> = row_iter
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>())
        .filter(|values| !values.iter().all(|v| v.is_empty()))
        .collect();

    Some(RawSheet {
        name: name.to_string(),
        headers,
        rows,
    })
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            // Avoid trailing ".0" for whole numbers
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                format!("{}", *f as i64)
            } else {
                format!("{}", f)
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) if datetime.num_seconds_from_midnight() == 0 => {
                datetime.format("%Y-%m-%d").to_string()
            }
            Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => format!("{}", dt.as_f64()),
        },
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#ERR:{:?}", e),
    }
}
