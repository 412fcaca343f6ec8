#[cfg(feature = "lambda")]
use crate::core::{ConfigProvider, Storage};
#[cfg(feature = "lambda")]
use crate::domain::model::{DecimalPolicy, RoundingConfig, TimeFormat};
#[cfg(feature = "lambda")]
use crate::utils::error::{EtlError, Result};
#[cfg(feature = "lambda")]
use aws_sdk_s3::Client as S3Client;
#[cfg(feature = "lambda")]
use std::env;

/// Deployment settings from the environment plus the per-invocation object key.
#[cfg(feature = "lambda")]
#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub s3_bucket: String,
    pub s3_region: String,
    pub output_prefix: String,
    pub input_key: String,
    pub output_key: Option<String>,
    pub sheet: String,
    pub rounding: RoundingConfig,
}

#[cfg(feature = "lambda")]
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e: T::Err| EtlError::InvalidConfigValueError {
                field: name.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
        Err(_) => Ok(default),
    }
}

#[cfg(feature = "lambda")]
impl LambdaConfig {
    pub fn from_env(input_key: String) -> Result<Self> {
        Ok(Self {
            s3_bucket: env::var("S3_BUCKET").map_err(|_| EtlError::MissingConfigError {
                field: "S3_BUCKET".to_string(),
            })?,
            s3_region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            output_prefix: env::var("S3_OUTPUT_PREFIX").unwrap_or_else(|_| "processed".to_string()),
            input_key,
            output_key: None,
            sheet: env::var("PAYROLL_SHEET")
                .unwrap_or_else(|_| crate::config::toml_config::DEFAULT_SHEET.to_string()),
            rounding: RoundingConfig {
                interval_minutes: env_or("ROUNDING_INTERVAL", 15u32)?,
                decimals: env_or("ROUNDING_DECIMALS", DecimalPolicy::All)?,
                time_format: env_or("TIME_FORMAT", TimeFormat::TwentyFourHour)?,
            },
        })
    }

    /// `<prefix>/processed_<file name>`
    pub fn resolve_output_key(&mut self) {
        if self.output_key.is_none() {
            let file_name = self
                .input_key
                .rsplit('/')
                .next()
                .unwrap_or(self.input_key.as_str());
            let prefix = self.output_prefix.trim_end_matches('/');
            self.output_key = Some(if prefix.is_empty() {
                format!("processed_{}", file_name)
            } else {
                format!("{}/processed_{}", prefix, file_name)
            });
        }
    }
}

#[cfg(feature = "lambda")]
impl ConfigProvider for LambdaConfig {
    fn input_path(&self) -> &str {
        &self.input_key
    }

    fn output_path(&self) -> Option<&str> {
        self.output_key.as_deref()
    }

    fn sheet_name(&self) -> &str {
        &self.sheet
    }

    fn rounding(&self) -> RoundingConfig {
        self.rounding
    }
}

#[cfg(feature = "lambda")]
impl crate::utils::validation::Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        use crate::adapters::{INPUT_EXTENSIONS, OUTPUT_EXTENSIONS};
        use crate::utils::validation::*;

        validate_s3_bucket_name("s3_bucket", &self.s3_bucket)?;
        validate_aws_region("s3_region", &self.s3_region)?;
        validate_non_empty_string("input_key", &self.input_key)?;
        validate_file_extension("input_key", &self.input_key, INPUT_EXTENSIONS)?;
        if let Some(output_key) = &self.output_key {
            validate_file_extension("output_key", output_key, OUTPUT_EXTENSIONS)?;
        }
        validate_non_empty_string("sheet", &self.sheet)?;
        self.rounding.validate()?;

        tracing::info!("✅ Lambda configuration validation passed");
        Ok(())
    }
}

#[cfg(feature = "lambda")]
fn validate_s3_bucket_name(field_name: &str, bucket_name: &str) -> Result<()> {
    let invalid = |reason: &str| EtlError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: bucket_name.to_string(),
        reason: reason.to_string(),
    };

    if bucket_name.len() < 3 || bucket_name.len() > 63 {
        return Err(invalid("S3 bucket name must be between 3 and 63 characters"));
    }

    if !bucket_name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Err(invalid(
            "S3 bucket name can only contain lowercase letters, numbers, hyphens, and dots",
        ));
    }

    if bucket_name.starts_with('-') || bucket_name.ends_with('-') {
        return Err(invalid("S3 bucket name cannot start or end with a hyphen"));
    }

    Ok(())
}

#[cfg(feature = "lambda")]
fn validate_aws_region(field_name: &str, region: &str) -> Result<()> {
    crate::utils::validation::validate_non_empty_string(field_name, region)?;

    if !region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: region.to_string(),
            reason: "AWS region can only contain lowercase letters, numbers, and hyphens"
                .to_string(),
        });
    }

    Ok(())
}

#[cfg(feature = "lambda")]
#[derive(Debug, Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

#[cfg(feature = "lambda")]
impl S3Storage {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[cfg(feature = "lambda")]
impl Storage for S3Storage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| EtlError::StorageError {
                message: format!("Failed to read s3://{}/{}: {}", self.bucket, path, e),
            })?;

        let data = resp.body.collect().await.map_err(|e| EtlError::StorageError {
            message: format!("Failed to collect S3 data: {}", e),
        })?;

        Ok(data.into_bytes().to_vec())
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .body(data.to_vec().into())
            .send()
            .await
            .map_err(|e| EtlError::StorageError {
                message: format!("Failed to write s3://{}/{}: {}", self.bucket, path, e),
            })?;

        Ok(())
    }
}
