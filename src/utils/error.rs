use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Missing required columns in source sheet: {}", missing.join(", "))]
    SchemaError { missing: Vec<String> },

    #[error("Row {row}: invalid date value '{value}'")]
    DateParseError { row: usize, value: String },

    #[error("Row {row}: invalid time value '{value}' in column '{column}'")]
    TimeParseError {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Rounded time out of range for '{value}'")]
    RoundingOverflow { value: String },

    #[error("Sheet '{sheet}' not found (available: {})", available.join(", "))]
    SheetNotFound {
        sheet: String,
        available: Vec<String>,
    },

    #[error("Unsupported spreadsheet format: {path}")]
    UnsupportedFormat { path: String },

    #[error("Workbook read failed: {0}")]
    WorkbookError(#[from] calamine::Error),

    #[error("Workbook write failed: {0}")]
    XlsxWriteError(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Schema,
    Data,
    Io,
    Configuration,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::SchemaError { .. } | EtlError::SheetNotFound { .. } => ErrorCategory::Schema,
            EtlError::DateParseError { .. }
            | EtlError::TimeParseError { .. }
            | EtlError::RoundingOverflow { .. } => ErrorCategory::Data,
            EtlError::UnsupportedFormat { .. }
            | EtlError::WorkbookError(_)
            | EtlError::XlsxWriteError(_)
            | EtlError::CsvError(_)
            | EtlError::IoError(_)
            | EtlError::SerializationError(_) => ErrorCategory::Io,
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            EtlError::StorageError { .. } => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Schema | ErrorCategory::Data | ErrorCategory::Configuration => {
                ErrorSeverity::High
            }
            ErrorCategory::Storage => ErrorSeverity::Medium,
            ErrorCategory::Io => match self {
                EtlError::IoError(_) => ErrorSeverity::Critical,
                _ => ErrorSeverity::High,
            },
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::SchemaError { .. } => {
                "Check the payroll sheet header row; column names must match exactly, including trailing spaces"
            }
            EtlError::SheetNotFound { .. } => {
                "Rename the payroll sheet or pass the correct sheet name with --sheet"
            }
            EtlError::DateParseError { .. } => {
                "Fix the Date cell in the reported row; use a real date or a spreadsheet date serial"
            }
            EtlError::TimeParseError { .. } => {
                "Fix the clock cell in the reported row; use a time such as 08:15 or leave it empty"
            }
            EtlError::RoundingOverflow { .. } => "Check the clock value for an out-of-range date",
            EtlError::UnsupportedFormat { .. } => "Use an .xlsx, .xls, .ods or .csv file",
            EtlError::WorkbookError(_) => "Make sure the file is a valid, unencrypted workbook",
            EtlError::XlsxWriteError(_) | EtlError::IoError(_) => {
                "Check that the output location exists and is writable"
            }
            EtlError::CsvError(_) => "Make sure the CSV file has a header row and consistent columns",
            EtlError::SerializationError(_) => "Report this as a bug",
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => {
                "Review the command line flags or configuration file"
            }
            EtlError::StorageError { .. } => "Check storage credentials and retry",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::SchemaError { missing } => format!(
                "The payroll sheet is missing {} required column(s): {}",
                missing.len(),
                missing
                    .iter()
                    .map(|name| format!("'{}'", name))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            EtlError::IoError(e) => format!("Could not access a file: {}", e),
            other => format!("Error processing file: {}", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
