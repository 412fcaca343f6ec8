// Adapters layer: spreadsheet codecs between raw file bytes and the domain tables.

pub mod csv_file;
pub mod workbook;

use crate::domain::model::{RawRecord, RawTable, TransformResult};
use crate::utils::error::{EtlError, Result};
use std::collections::{HashMap, HashSet};
use std::path::Path;

pub const INPUT_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods", "csv"];
pub const OUTPUT_EXTENSIONS: &[&str] = &["xlsx", "csv"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Workbook,
    Csv,
}

impl SheetFormat {
    pub fn from_path(path: &str) -> Result<Self> {
        let extension = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("xlsx" | "xlsm" | "xls" | "ods") => Ok(SheetFormat::Workbook),
            Some("csv") => Ok(SheetFormat::Csv),
            _ => Err(EtlError::UnsupportedFormat {
                path: path.to_string(),
            }),
        }
    }
}

pub fn decode(path: &str, bytes: Vec<u8>, sheet: &str) -> Result<RawTable> {
    match SheetFormat::from_path(path)? {
        SheetFormat::Workbook => workbook::read_sheet(bytes, sheet),
        SheetFormat::Csv => {
            tracing::debug!("CSV input has a single table; sheet '{}' not used", sheet);
            csv_file::read_table(&bytes)
        }
    }
}

/// Writes `.xlsx` or `.csv`, chosen by the output path's extension.
pub fn encode(path: &str, result: &TransformResult) -> Result<Vec<u8>> {
    match SheetFormat::from_path(path)? {
        SheetFormat::Csv => csv_file::write_table(result),
        SheetFormat::Workbook if path.to_ascii_lowercase().ends_with(".xlsx") => {
            workbook::write_sheet(result)
        }
        SheetFormat::Workbook => Err(EtlError::UnsupportedFormat {
            path: path.to_string(),
        }),
    }
}

/// Builds a table from a header row and data rows, skipping rows with no values.
///
/// A repeated header keeps its name on the first column; later copies become
/// `Name.1`, `Name.2`, ...
pub(crate) fn build_table<I>(headers: Vec<String>, rows: I) -> RawTable
where
    I: IntoIterator<Item = Vec<crate::domain::model::CellValue>>,
{
    let headers = dedupe_headers(headers);
    let rows = rows
        .into_iter()
        .filter(|cells| cells.iter().any(|cell| !cell.is_empty()))
        .map(|cells| RawRecord {
            data: headers
                .iter()
                .cloned()
                .zip(cells)
                .collect::<HashMap<_, _>>(),
        })
        .collect();

    RawTable { headers, rows }
}

fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(headers.len());
    headers
        .into_iter()
        .map(|header| {
            let mut name = header.clone();
            let mut copy = 0;
            while seen.contains(&name) {
                copy += 1;
                name = format!("{}.{}", header, copy);
            }
            seen.insert(name.clone());
            name
        })
        .collect()
}
