pub mod cli;
pub mod lambda;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli_args::CliConfig;

#[cfg(feature = "cli")]
mod cli_args {
    use crate::adapters::{INPUT_EXTENSIONS, OUTPUT_EXTENSIONS};
    use crate::core::ConfigProvider;
    use crate::domain::model::{DecimalPolicy, RoundingConfig, TimeFormat};
    use crate::utils::error::Result;
    use crate::utils::validation::{
        validate_file_extension, validate_non_empty_string, validate_path, Validate,
    };
    use clap::Parser;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "payroll-etl")]
    #[command(about = "Round payroll clock times and recompute worked hours")]
    pub struct CliConfig {
        /// Payroll workbook (.xlsx, .xls, .ods) or .csv export
        #[arg(long, short)]
        pub input: String,

        /// Output file (.xlsx or .csv); defaults to processed_<input name>
        #[arg(long, short)]
        pub output: Option<String>,

        #[arg(long, default_value = "9. Payroll")]
        pub sheet: String,

        /// Rounding interval in minutes
        #[arg(long, default_value_t = 15)]
        pub interval: u32,

        /// "all" for unrounded hours, or a number of decimal places
        #[arg(long, default_value = "all")]
        pub decimals: DecimalPolicy,

        /// Clock display format: 12 or 24
        #[arg(long, default_value = "24")]
        pub time_format: TimeFormat,

        #[arg(long, short, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Log CPU and memory usage per phase")]
        pub monitor: bool,

        /// Print the run summary as JSON instead of text
        #[arg(long)]
        pub json: bool,
    }

    impl ConfigProvider for CliConfig {
        fn input_path(&self) -> &str {
            &self.input
        }

        fn output_path(&self) -> Option<&str> {
            self.output.as_deref()
        }

        fn sheet_name(&self) -> &str {
            &self.sheet
        }

        fn rounding(&self) -> RoundingConfig {
            RoundingConfig {
                interval_minutes: self.interval,
                decimals: self.decimals,
                time_format: self.time_format,
            }
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_path("input", &self.input)?;
            validate_file_extension("input", &self.input, INPUT_EXTENSIONS)?;
            if let Some(output) = &self.output {
                validate_path("output", output)?;
                validate_file_extension("output", output, OUTPUT_EXTENSIONS)?;
            }
            validate_non_empty_string("sheet", &self.sheet)?;
            self.rounding().validate()
        }
    }

}
