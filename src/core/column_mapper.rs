use crate::domain::model::{CanonicalColumn, MappedRow, RawRecord, RawTable};
use crate::utils::error::{EtlError, Result};
use std::collections::HashSet;

/// Returns the source headers the table lacks, in mapping order.
pub fn missing_columns(headers: &[String]) -> Vec<String> {
    let present: HashSet<&str> = headers.iter().map(String::as_str).collect();
    CanonicalColumn::ALL
        .iter()
        .map(|column| column.source_name())
        .filter(|name| !present.contains(name))
        .map(str::to_string)
        .collect()
}

/// Projects every row onto the canonical columns.
///
/// Fails before producing any row if a required source header is absent;
/// the error names all of them. Columns outside the mapping are ignored.
pub fn map_columns(table: &RawTable) -> Result<Vec<MappedRow>> {
    let missing = missing_columns(&table.headers);
    if !missing.is_empty() {
        tracing::debug!("Source headers: {:?}", table.headers);
        return Err(EtlError::SchemaError { missing });
    }

    Ok(table.rows.iter().map(map_row).collect())
}

fn map_row(record: &RawRecord) -> MappedRow {
    MappedRow::new(CanonicalColumn::ALL.map(|column| {
        record
            .data
            .get(column.source_name())
            .cloned()
            .unwrap_or_default()
    }))
}
