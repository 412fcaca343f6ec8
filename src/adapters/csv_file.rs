use crate::adapters::build_table;
use crate::domain::model::{CanonicalColumn, CellValue, RawTable, TransformResult};
use crate::utils::error::{EtlError, Result};
use csv::{ReaderBuilder, WriterBuilder};

pub fn read_table(bytes: &[u8]) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(field.to_string())
                    }
                })
                .collect::<Vec<_>>(),
        );
    }

    let table = build_table(headers, rows);
    tracing::debug!("Read {} CSV rows", table.len());
    Ok(table)
}

pub fn write_table(result: &TransformResult) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());

    writer.write_record(CanonicalColumn::ALL.iter().map(|column| column.header()))?;
    for record in &result.records {
        writer.write_record(record.display_row(result.time_format))?;
    }

    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}
