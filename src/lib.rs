pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

#[cfg(feature = "lambda")]
pub use crate::config::lambda::{LambdaConfig, S3Storage};

pub use crate::core::{
    etl::{EtlEngine, EtlOutcome},
    pipeline::PayrollPipeline,
};
pub use crate::domain::model::{CanonicalRecord, DecimalPolicy, RoundingConfig, TimeFormat};
pub use crate::utils::error::{EtlError, Result};
