use crate::domain::model::{RawTable, RoundingConfig, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    /// `None` means "derive from the input path".
    fn output_path(&self) -> Option<&str>;
    fn sheet_name(&self) -> &str;
    fn rounding(&self) -> RoundingConfig;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<RawTable>;
    async fn transform(&self, table: RawTable) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
