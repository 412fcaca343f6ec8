use crate::core::Pipeline;
use crate::domain::model::TransformStats;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct EtlOutcome {
    pub output_path: String,
    pub stats: TransformStats,
}

impl EtlOutcome {
    /// Machine-readable run summary.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<EtlOutcome> {
        tracing::info!("Starting payroll rounding...");
        self.monitor.log_stats("Start");

        let table = self.pipeline.extract().await?;
        tracing::info!("Extracted {} payroll rows", table.len());
        self.monitor.log_stats("Extract");

        let result = self.pipeline.transform(table).await?;
        let stats = result.stats.clone();
        tracing::info!("Transformed {} rows", stats.rows);
        self.monitor.log_stats("Transform");

        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(EtlOutcome { output_path, stats })
    }
}
