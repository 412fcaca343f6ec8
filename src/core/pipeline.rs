use crate::adapters;
use crate::core::transform::transform_table;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{RawTable, TransformResult};
use crate::utils::error::Result;
use std::path::Path;

/// Reads the payroll sheet through `Storage`, rounds it, and writes the result back.
pub struct PayrollPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> PayrollPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    pub fn output_path(&self) -> String {
        match self.config.output_path() {
            Some(path) => path.to_string(),
            None => default_output_path(self.config.input_path()),
        }
    }
}

/// `dir/payroll.xlsx` → `dir/processed_payroll.xlsx`
pub fn default_output_path(input_path: &str) -> String {
    let path = Path::new(input_path);
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "payroll.xlsx".to_string());
    let processed = format!("processed_{}", file_name);

    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            parent.join(processed).to_string_lossy().into_owned()
        }
        _ => processed,
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for PayrollPipeline<S, C> {
    async fn extract(&self) -> Result<RawTable> {
        let input_path = self.config.input_path();
        tracing::debug!("Reading payroll file: {}", input_path);

        let bytes = self.storage.read_file(input_path).await?;
        tracing::debug!("Read {} bytes", bytes.len());

        adapters::decode(input_path, bytes, self.config.sheet_name())
    }

    async fn transform(&self, table: RawTable) -> Result<TransformResult> {
        let rounding = self.config.rounding();
        tracing::debug!(
            "Rounding to {} minute(s), decimals: {}, time format: {}h",
            rounding.interval_minutes,
            rounding.decimals,
            rounding.time_format
        );

        let result = transform_table(&table, &rounding)?;
        tracing::info!(
            "⏱️ {} rows, {} open shifts, {} overnight shifts, {:.2} total hours",
            result.stats.rows,
            result.stats.open_shifts,
            result.stats.overnight_shifts,
            result.stats.total_hours
        );
        if result.stats.missing_hours > 0 {
            tracing::warn!(
                "{} row(s) have a clock-out but no clock-in",
                result.stats.missing_hours
            );
        }
        Ok(result)
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let output_path = self.output_path();
        let data = adapters::encode(&output_path, &result)?;

        tracing::debug!("Writing {} bytes to {}", data.len(), output_path);
        self.storage.write_file(&output_path, &data).await?;

        Ok(output_path)
    }
}
