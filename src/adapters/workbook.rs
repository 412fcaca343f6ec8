use crate::adapters::build_table;
use crate::core::transform::{serial_to_datetime, serial_to_time};
use crate::domain::model::{
    CanonicalColumn, CellValue, OutputCell, RawTable, TransformResult, OUTPUT_DATE_FORMAT,
};
use crate::utils::error::{EtlError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::Timelike;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::io::Cursor;

pub const OUTPUT_SHEET_NAME: &str = "Sheet1";

/// Reads one named sheet; the first row is the header row.
pub fn read_sheet(bytes: Vec<u8>, sheet: &str) -> Result<RawTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let available = workbook.sheet_names();
    if !available.iter().any(|name| name == sheet) {
        return Err(EtlError::SheetNotFound {
            sheet: sheet.to_string(),
            available,
        });
    }

    let range = workbook.worksheet_range(sheet)?;
    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(header_text).collect(),
        None => Vec::new(),
    };

    let table = build_table(
        headers,
        rows.map(|row| row.iter().map(cell_value).collect::<Vec<_>>()),
    );
    tracing::debug!("Read {} rows from sheet '{}'", table.len(), sheet);
    Ok(table)
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => serial_cell(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

/// Date-formatted cells below 1.0 carry only a time of day.
fn serial_cell(serial: f64) -> CellValue {
    let converted = if (0.0..1.0).contains(&serial) {
        serial_to_time(serial).map(CellValue::Time)
    } else {
        serial_to_datetime(serial).map(CellValue::DateTime)
    };
    converted.unwrap_or(CellValue::Number(serial))
}

pub fn write_sheet(result: &TransformResult) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let time_format = Format::new().set_num_format(result.time_format.excel_num_format());

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(OUTPUT_SHEET_NAME)?;

    let mut widths: Vec<usize> = CanonicalColumn::ALL
        .iter()
        .map(|column| column.header().chars().count())
        .collect();

    for (col, column) in CanonicalColumn::ALL.iter().enumerate() {
        worksheet.write_string(0, col as u16, column.header())?;
    }

    for (index, record) in result.records.iter().enumerate() {
        let row = (index + 1) as u32;
        for (col, column) in CanonicalColumn::ALL.iter().enumerate() {
            let cell = record.cell(*column);
            widths[col] = widths[col].max(cell.display(result.time_format).chars().count());
            write_cell(worksheet, row, col as u16, &cell, &time_format)?;
        }
    }

    let last_row = result.records.len() as u32;
    let last_col = (CanonicalColumn::ALL.len() - 1) as u16;
    worksheet.autofilter(0, 0, last_row, last_col)?;

    for (col, width) in widths.iter().enumerate() {
        worksheet.set_column_width(col as u16, (width + 2) as f64)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &OutputCell<'_>,
    time_format: &Format,
) -> Result<()> {
    match cell {
        OutputCell::Value(CellValue::Empty) => {}
        OutputCell::Value(CellValue::Text(text)) => {
            worksheet.write_string(row, col, text.as_str())?;
        }
        OutputCell::Value(CellValue::Number(n)) => {
            worksheet.write_number(row, col, *n)?;
        }
        OutputCell::Value(CellValue::Bool(b)) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        OutputCell::Value(value @ (CellValue::DateTime(_) | CellValue::Time(_))) => {
            worksheet.write_string(row, col, value.to_string())?;
        }
        OutputCell::Date(date) => {
            worksheet.write_string(row, col, date.format(OUTPUT_DATE_FORMAT).to_string())?;
        }
        OutputCell::Time(Some(time)) => {
            let fraction = f64::from(time.num_seconds_from_midnight()) / 86_400.0;
            worksheet.write_number_with_format(row, col, fraction, time_format)?;
        }
        OutputCell::Hours(Some(hours)) => {
            worksheet.write_number(row, col, *hours)?;
        }
        OutputCell::Time(None) | OutputCell::Hours(None) => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transform::transform_table;
    use crate::domain::model::RoundingConfig;
    use chrono::{NaiveDate, NaiveTime};

    fn payroll_workbook(sheet_name: &str) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("mm/dd/yyyy");
        let clock_format = Format::new().set_num_format("hh:mm");

        let cover = workbook.add_worksheet();
        cover.set_name("1. Summary").unwrap();
        cover.write_string(0, 0, "ignored").unwrap();

        let sheet = workbook.add_worksheet();
        sheet.set_name(sheet_name).unwrap();
        for (col, column) in CanonicalColumn::ALL.iter().enumerate() {
            sheet.write_string(0, col as u16, column.source_name()).unwrap();
        }
        // 2024-03-05, 08:07 → 17:08
        sheet.write_string(1, 0, "North Ridge").unwrap();
        sheet.write_number_with_format(1, 1, 45356.0, &date_format).unwrap();
        sheet.write_number(1, 2, 104.0).unwrap();
        sheet.write_string(1, 3, "Picking").unwrap();
        sheet.write_string(1, 4, "harvest").unwrap();
        sheet.write_string(1, 5, "B7").unwrap();
        sheet.write_string(1, 6, "Bin").unwrap();
        sheet
            .write_number_with_format(1, 7, 487.0 / 1440.0, &clock_format)
            .unwrap();
        sheet
            .write_number_with_format(1, 8, 1028.0 / 1440.0, &clock_format)
            .unwrap();
        sheet.write_number(1, 9, 9.02).unwrap();
        sheet.write_number(1, 10, 16.5).unwrap();
        sheet.write_number(1, 11, 0.75).unwrap();
        sheet.write_number(1, 12, 40.0).unwrap();
        sheet.write_number(1, 13, 30.0).unwrap();

        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_reads_only_the_named_sheet() {
        let table = read_sheet(payroll_workbook("9. Payroll"), "9. Payroll").unwrap();

        assert_eq!(table.headers.len(), 14);
        assert_eq!(table.len(), 1);
        let row = &table.rows[0].data;
        assert_eq!(row.get("Worker ID"), Some(&CellValue::Number(104.0)));
        assert_eq!(
            row.get("Clock-In "),
            Some(&CellValue::Time(NaiveTime::from_hms_opt(8, 7, 0).unwrap()))
        );
        assert_eq!(
            row.get("Date"),
            Some(&CellValue::DateTime(
                NaiveDate::from_ymd_opt(2024, 3, 5)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            ))
        );
    }

    #[test]
    fn test_missing_sheet_lists_available_sheets() {
        match read_sheet(payroll_workbook("Payroll"), "9. Payroll") {
            Err(EtlError::SheetNotFound { sheet, available }) => {
                assert_eq!(sheet, "9. Payroll");
                assert_eq!(available, vec!["1. Summary", "Payroll"]);
            }
            other => panic!("expected SheetNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_written_sheet_reads_back_in_canonical_order() {
        let table = read_sheet(payroll_workbook("9. Payroll"), "9. Payroll").unwrap();
        let result = transform_table(&table, &RoundingConfig::default()).unwrap();

        let bytes = write_sheet(&result).unwrap();
        let output = read_sheet(bytes, OUTPUT_SHEET_NAME).unwrap();

        let expected: Vec<&str> = CanonicalColumn::ALL.iter().map(|c| c.header()).collect();
        assert_eq!(output.headers, expected);
        assert_eq!(output.len(), 1);

        let row = &output.rows[0].data;
        assert_eq!(row.get("Date"), Some(&CellValue::Text("03/05/2024".to_string())));
        assert_eq!(
            row.get("Rounded Clock-in"),
            Some(&CellValue::Time(NaiveTime::from_hms_opt(8, 0, 0).unwrap()))
        );
        assert_eq!(
            row.get("Rounded Clock-out"),
            Some(&CellValue::Time(NaiveTime::from_hms_opt(17, 15, 0).unwrap()))
        );
        assert_eq!(row.get("# Hours"), Some(&CellValue::Number(9.25)));
        assert_eq!(row.get("Cost per Hour"), Some(&CellValue::Number(16.5)));
    }
}
