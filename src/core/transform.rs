use crate::core::column_mapper::map_columns;
use crate::core::hours::{crosses_midnight, worked_hours};
use crate::core::rounding::{round_timestamp, Timestamp};
use crate::domain::model::{
    CanonicalColumn, CanonicalRecord, CellValue, MappedRow, RawTable, RoundingConfig,
    TransformResult, TransformStats,
};
use crate::utils::error::{EtlError, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d-%b-%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
];

const TIME_FORMATS: &[&str] = &[
    "%H:%M:%S%.f",
    "%H:%M:%S",
    "%H:%M",
    "%I:%M:%S %p",
    "%I:%M %p",
    "%I:%M%p",
];

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Spreadsheet day serials count from 1899-12-30.
fn serial_epoch() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)
}

/// Converts a day serial to a date-time, rounded to the whole second.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial.abs() > 3_000_000.0 {
        return None;
    }
    let seconds = (serial * SECONDS_PER_DAY).round() as i64;
    serial_epoch()?.checked_add_signed(Duration::seconds(seconds))
}

/// The time-of-day part of a day fraction, rounded to the whole second.
pub fn serial_to_time(fraction: f64) -> Option<NaiveTime> {
    if !fraction.is_finite() || !(0.0..1.0).contains(&fraction) {
        return None;
    }
    let seconds = (fraction * SECONDS_PER_DAY).round() as u32 % 86_400;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Parses the Date cell, falling back to a day serial when it is not a
/// recognisable date.
pub fn normalize_date(value: &CellValue, row: usize) -> Result<NaiveDate> {
    let parsed = match value {
        CellValue::DateTime(dt) => Some(dt.date()),
        CellValue::Number(serial) => serial_to_datetime(*serial).map(|dt| dt.date()),
        CellValue::Text(text) => {
            let text = text.trim();
            parse_date_text(text).or_else(|| {
                text.parse::<f64>()
                    .ok()
                    .and_then(serial_to_datetime)
                    .map(|dt| dt.date())
            })
        }
        CellValue::Empty | CellValue::Bool(_) | CellValue::Time(_) => None,
    };

    parsed.ok_or_else(|| EtlError::DateParseError {
        row,
        value: describe(value),
    })
}

fn parse_clock_text(text: &str) -> Option<Timestamp> {
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(text, fmt).ok())
        .map(Timestamp::TimeOfDay)
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(Timestamp::Full)
        })
}

fn clock_from_serial(serial: f64) -> Option<Timestamp> {
    if (0.0..1.0).contains(&serial) {
        serial_to_time(serial).map(Timestamp::TimeOfDay)
    } else {
        serial_to_datetime(serial).map(Timestamp::Full)
    }
}

/// Parses a clock cell. Blank cells are `None`; anything else must be a time.
pub fn parse_clock(value: &CellValue, row: usize, column: CanonicalColumn) -> Result<Option<Timestamp>> {
    let parsed = match value {
        CellValue::Empty => return Ok(None),
        CellValue::Text(text) if text.trim().is_empty() => return Ok(None),
        CellValue::Time(t) => Some(Timestamp::TimeOfDay(*t)),
        CellValue::DateTime(dt) => Some(Timestamp::Full(*dt)),
        CellValue::Number(serial) => clock_from_serial(*serial),
        CellValue::Text(text) => {
            let text = text.trim();
            parse_clock_text(text)
                .or_else(|| text.parse::<f64>().ok().and_then(clock_from_serial))
        }
        CellValue::Bool(_) => None,
    };

    parsed.map(Some).ok_or_else(|| EtlError::TimeParseError {
        row,
        column: column.source_name().trim_end().to_string(),
        value: describe(value),
    })
}

fn describe(value: &CellValue) -> String {
    match value {
        CellValue::Empty => "<empty>".to_string(),
        other => other.to_string(),
    }
}

/// Transforms one mapped row. `row` is the 1-based sheet row used in errors.
pub fn transform_row(mapped: &MappedRow, row: usize, config: &RoundingConfig) -> Result<CanonicalRecord> {
    let date = normalize_date(mapped.get(CanonicalColumn::Date), row)?;

    let clock_in = parse_clock(mapped.get(CanonicalColumn::ClockIn), row, CanonicalColumn::ClockIn)?;
    let clock_out = parse_clock(mapped.get(CanonicalColumn::ClockOut), row, CanonicalColumn::ClockOut)?;

    let rounded_in = round_timestamp(clock_in, config.interval_minutes)?.map(|dt| dt.time());
    let rounded_out = round_timestamp(clock_out, config.interval_minutes)?.map(|dt| dt.time());

    let hours = worked_hours(rounded_in, rounded_out, config.decimals);
    if hours.is_none() {
        tracing::warn!("Row {}: clock-out without clock-in, hours left empty", row);
    }

    let value = |column: CanonicalColumn| mapped.get(column).clone();

    Ok(CanonicalRecord {
        farm_name: value(CanonicalColumn::FarmName),
        date,
        worker_id: value(CanonicalColumn::WorkerId),
        job_name: value(CanonicalColumn::JobName),
        job_tag: value(CanonicalColumn::JobTag),
        block_name: value(CanonicalColumn::BlockName),
        piece_name: value(CanonicalColumn::PieceName),
        clock_in: rounded_in,
        clock_out: rounded_out,
        hours,
        cost_per_hour: value(CanonicalColumn::CostPerHour),
        price_piece: value(CanonicalColumn::PricePiece),
        pieces: value(CanonicalColumn::Pieces),
        cost_per_pieces: value(CanonicalColumn::CostPerPieces),
    })
}

/// Maps, rounds and recomputes hours for the whole table.
///
/// The first failing row aborts the batch; no partial output is returned.
pub fn transform_table(table: &RawTable, config: &RoundingConfig) -> Result<TransformResult> {
    let mapped = map_columns(table)?;
    tracing::debug!(
        "Mapped {} rows onto {} canonical columns",
        mapped.len(),
        CanonicalColumn::ALL.len()
    );

    let records = mapped
        .iter()
        .enumerate()
        // header occupies sheet row 1
        .map(|(index, row)| transform_row(row, index + 2, config))
        .collect::<Result<Vec<_>>>()?;

    let stats = summarize(&records);
    Ok(TransformResult {
        records,
        stats,
        time_format: config.time_format,
    })
}

pub fn summarize(records: &[CanonicalRecord]) -> TransformStats {
    records.iter().fold(
        TransformStats {
            rows: records.len(),
            ..TransformStats::default()
        },
        |mut stats, record| {
            match (record.clock_in, record.clock_out) {
                (_, None) => stats.open_shifts += 1,
                (Some(clock_in), Some(clock_out)) if crosses_midnight(clock_in, clock_out) => {
                    stats.overnight_shifts += 1
                }
                _ => {}
            }
            match record.hours {
                Some(hours) => stats.total_hours += hours,
                None => stats.missing_hours += 1,
            }
            stats
        },
    )
}
