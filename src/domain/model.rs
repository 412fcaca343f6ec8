use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A single spreadsheet cell as read from the source file.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
        }
    }
}

/// One source row keyed by the source sheet's header names.
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    pub data: HashMap<String, CellValue>,
}

#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRecord>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The fourteen output columns, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalColumn {
    FarmName,
    Date,
    WorkerId,
    JobName,
    JobTag,
    BlockName,
    PieceName,
    ClockIn,
    ClockOut,
    Hours,
    CostPerHour,
    PricePiece,
    Pieces,
    CostPerPieces,
}

impl CanonicalColumn {
    pub const ALL: [CanonicalColumn; 14] = [
        CanonicalColumn::FarmName,
        CanonicalColumn::Date,
        CanonicalColumn::WorkerId,
        CanonicalColumn::JobName,
        CanonicalColumn::JobTag,
        CanonicalColumn::BlockName,
        CanonicalColumn::PieceName,
        CanonicalColumn::ClockIn,
        CanonicalColumn::ClockOut,
        CanonicalColumn::Hours,
        CanonicalColumn::CostPerHour,
        CanonicalColumn::PricePiece,
        CanonicalColumn::Pieces,
        CanonicalColumn::CostPerPieces,
    ];

    /// Exact header text expected in the "9. Payroll" sheet.
    pub fn source_name(self) -> &'static str {
        match self {
            CanonicalColumn::FarmName => "Farm name",
            CanonicalColumn::Date => "Date",
            CanonicalColumn::WorkerId => "Worker ID",
            CanonicalColumn::JobName => "Job Name",
            CanonicalColumn::JobTag => "Job Tags",
            CanonicalColumn::BlockName => "Block name",
            CanonicalColumn::PieceName => "Piece Name",
            // trailing space is part of the source header
            CanonicalColumn::ClockIn => "Clock-In ",
            CanonicalColumn::ClockOut => "Clock-Out",
            CanonicalColumn::Hours => "# Hours",
            CanonicalColumn::CostPerHour => "Price $/hr",
            CanonicalColumn::PricePiece => "Price $/piece",
            CanonicalColumn::Pieces => "# Pieces",
            CanonicalColumn::CostPerPieces => "Cost per pieces ($)",
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            CanonicalColumn::FarmName => "Farm Name",
            CanonicalColumn::Date => "Date",
            CanonicalColumn::WorkerId => "Worker ID",
            CanonicalColumn::JobName => "Job Name",
            CanonicalColumn::JobTag => "Job Tag",
            CanonicalColumn::BlockName => "Block Name",
            CanonicalColumn::PieceName => "Piece Name",
            CanonicalColumn::ClockIn => "Rounded Clock-in",
            CanonicalColumn::ClockOut => "Rounded Clock-out",
            CanonicalColumn::Hours => "# Hours",
            CanonicalColumn::CostPerHour => "Cost per Hour",
            CanonicalColumn::PricePiece => "Price Piece",
            CanonicalColumn::Pieces => "# of Pieces",
            CanonicalColumn::CostPerPieces => "Cost per Pieces",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// A row after column mapping: one cell per canonical column, in canonical order.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRow {
    cells: [CellValue; 14],
}

impl MappedRow {
    pub fn new(cells: [CellValue; 14]) -> Self {
        Self { cells }
    }

    pub fn get(&self, column: CanonicalColumn) -> &CellValue {
        &self.cells[column.index()]
    }

    pub fn cells(&self) -> &[CellValue] {
        &self.cells
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRecord {
    pub farm_name: CellValue,
    pub date: NaiveDate,
    pub worker_id: CellValue,
    pub job_name: CellValue,
    pub job_tag: CellValue,
    pub block_name: CellValue,
    pub piece_name: CellValue,
    pub clock_in: Option<NaiveTime>,
    pub clock_out: Option<NaiveTime>,
    pub hours: Option<f64>,
    pub cost_per_hour: CellValue,
    pub price_piece: CellValue,
    pub pieces: CellValue,
    pub cost_per_pieces: CellValue,
}

/// Typed view of one output cell, used by the sheet writers.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputCell<'a> {
    Value(&'a CellValue),
    Date(NaiveDate),
    Time(Option<NaiveTime>),
    Hours(Option<f64>),
}

pub const OUTPUT_DATE_FORMAT: &str = "%m/%d/%Y";

impl CanonicalRecord {
    pub fn cell(&self, column: CanonicalColumn) -> OutputCell<'_> {
        match column {
            CanonicalColumn::FarmName => OutputCell::Value(&self.farm_name),
            CanonicalColumn::Date => OutputCell::Date(self.date),
            CanonicalColumn::WorkerId => OutputCell::Value(&self.worker_id),
            CanonicalColumn::JobName => OutputCell::Value(&self.job_name),
            CanonicalColumn::JobTag => OutputCell::Value(&self.job_tag),
            CanonicalColumn::BlockName => OutputCell::Value(&self.block_name),
            CanonicalColumn::PieceName => OutputCell::Value(&self.piece_name),
            CanonicalColumn::ClockIn => OutputCell::Time(self.clock_in),
            CanonicalColumn::ClockOut => OutputCell::Time(self.clock_out),
            CanonicalColumn::Hours => OutputCell::Hours(self.hours),
            CanonicalColumn::CostPerHour => OutputCell::Value(&self.cost_per_hour),
            CanonicalColumn::PricePiece => OutputCell::Value(&self.price_piece),
            CanonicalColumn::Pieces => OutputCell::Value(&self.pieces),
            CanonicalColumn::CostPerPieces => OutputCell::Value(&self.cost_per_pieces),
        }
    }

    /// Text rendering of every column in output order.
    pub fn display_row(&self, time_format: TimeFormat) -> Vec<String> {
        CanonicalColumn::ALL
            .iter()
            .map(|column| self.cell(*column).display(time_format))
            .collect()
    }
}

impl OutputCell<'_> {
    pub fn display(&self, time_format: TimeFormat) -> String {
        match self {
            OutputCell::Value(value) => value.to_string(),
            OutputCell::Date(date) => date.format(OUTPUT_DATE_FORMAT).to_string(),
            OutputCell::Time(Some(time)) => time.format(time_format.chrono_pattern()).to_string(),
            OutputCell::Time(None) | OutputCell::Hours(None) => String::new(),
            OutputCell::Hours(Some(hours)) => format!("{:?}", hours),
        }
    }
}

/// How computed hours are rounded before output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "SettingValue", into = "String")]
pub enum DecimalPolicy {
    /// Keep the unrounded value.
    #[default]
    All,
    Places(u32),
}

impl FromStr for DecimalPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(DecimalPolicy::All);
        }
        trimmed
            .parse::<u32>()
            .map(DecimalPolicy::Places)
            .map_err(|_| format!("expected \"all\" or a number of decimal places, got '{}'", s))
    }
}

impl fmt::Display for DecimalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecimalPolicy::All => write!(f, "all"),
            DecimalPolicy::Places(n) => write!(f, "{}", n),
        }
    }
}

impl From<DecimalPolicy> for String {
    fn from(policy: DecimalPolicy) -> Self {
        policy.to_string()
    }
}

impl TryFrom<SettingValue> for DecimalPolicy {
    type Error = String;

    fn try_from(value: SettingValue) -> std::result::Result<Self, Self::Error> {
        match value {
            SettingValue::Number(n) => Ok(DecimalPolicy::Places(n)),
            SettingValue::Text(s) => s.parse(),
        }
    }
}

/// Clock display format. Only the sheet writers look at this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "SettingValue", into = "String")]
pub enum TimeFormat {
    TwelveHour,
    #[default]
    TwentyFourHour,
}

impl TimeFormat {
    pub fn chrono_pattern(self) -> &'static str {
        match self {
            TimeFormat::TwelveHour => "%I:%M:%S %p",
            TimeFormat::TwentyFourHour => "%H:%M:%S",
        }
    }

    pub fn excel_num_format(self) -> &'static str {
        match self {
            TimeFormat::TwelveHour => "hh:mm:ss AM/PM",
            TimeFormat::TwentyFourHour => "hh:mm:ss",
        }
    }
}

impl FromStr for TimeFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "12" => Ok(TimeFormat::TwelveHour),
            "24" => Ok(TimeFormat::TwentyFourHour),
            other => Err(format!("expected \"12\" or \"24\", got '{}'", other)),
        }
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeFormat::TwelveHour => write!(f, "12"),
            TimeFormat::TwentyFourHour => write!(f, "24"),
        }
    }
}

impl From<TimeFormat> for String {
    fn from(format: TimeFormat) -> Self {
        format.to_string()
    }
}

impl TryFrom<SettingValue> for TimeFormat {
    type Error = String;

    fn try_from(value: SettingValue) -> std::result::Result<Self, Self::Error> {
        match value {
            SettingValue::Number(n) => n.to_string().parse(),
            SettingValue::Text(s) => s.parse(),
        }
    }
}

/// Config files may write `decimals = 2` or `decimals = "2"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Number(u32),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingConfig {
    #[serde(default = "default_interval")]
    pub interval_minutes: u32,
    #[serde(default)]
    pub decimals: DecimalPolicy,
    #[serde(default)]
    pub time_format: TimeFormat,
}

pub const DEFAULT_INTERVAL_MINUTES: u32 = 15;

fn default_interval() -> u32 {
    DEFAULT_INTERVAL_MINUTES
}

impl Default for RoundingConfig {
    fn default() -> Self {
        Self {
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
            decimals: DecimalPolicy::All,
            time_format: TimeFormat::TwentyFourHour,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransformStats {
    pub rows: usize,
    pub open_shifts: usize,
    pub overnight_shifts: usize,
    pub missing_hours: usize,
    pub total_hours: f64,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub records: Vec<CanonicalRecord>,
    pub stats: TransformStats,
    pub time_format: TimeFormat,
}
