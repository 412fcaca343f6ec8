#[cfg(feature = "lambda")]
use aws_config::BehaviorVersion;
#[cfg(feature = "lambda")]
use aws_sdk_s3::config::Region;
#[cfg(feature = "lambda")]
use aws_sdk_s3::Client as S3Client;
#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use payroll_etl::config::lambda::{LambdaConfig, S3Storage};
#[cfg(feature = "lambda")]
use payroll_etl::core::{etl::EtlEngine, pipeline::PayrollPipeline};
#[cfg(feature = "lambda")]
use payroll_etl::domain::model::{DecimalPolicy, TimeFormat};
#[cfg(feature = "lambda")]
use payroll_etl::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use serde::{Deserialize, Serialize};

/// One uploaded payroll file to process.
#[cfg(feature = "lambda")]
#[derive(Deserialize)]
pub struct Request {
    pub input_key: String,
    pub output_key: Option<String>,
    pub interval: Option<u32>,
    pub decimals: Option<String>,
    pub time_format: Option<String>,
}

#[cfg(feature = "lambda")]
#[derive(Serialize)]
pub struct Response {
    pub message: String,
    pub output_path: String,
    pub records_processed: usize,
    pub total_hours: f64,
}

#[cfg(feature = "lambda")]
fn boxed(e: payroll_etl::EtlError) -> Error {
    tracing::error!(
        category = ?e.category(),
        severity = ?e.severity(),
        "Payroll processing failed: {}",
        e
    );
    Box::new(e)
}

#[cfg(feature = "lambda")]
async fn function_handler(event: LambdaEvent<Request>) -> Result<Response, Error> {
    let request = event.payload;
    tracing::info!("Processing payroll upload: {}", request.input_key);

    let mut config = LambdaConfig::from_env(request.input_key).map_err(boxed)?;
    config.output_key = request.output_key;
    if let Some(interval) = request.interval {
        config.rounding.interval_minutes = interval;
    }
    if let Some(decimals) = request.decimals {
        config.rounding.decimals = decimals.parse::<DecimalPolicy>()?;
    }
    if let Some(time_format) = request.time_format {
        config.rounding.time_format = time_format.parse::<TimeFormat>()?;
    }
    config.resolve_output_key();
    config.validate().map_err(boxed)?;

    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .region(Region::new(config.s3_region.clone()))
        .build();
    let s3_client = S3Client::from_conf(s3_config);

    let storage = S3Storage::new(s3_client, config.s3_bucket.clone());
    let pipeline = PayrollPipeline::new(storage, config);

    let outcome = EtlEngine::new(pipeline).run().await.map_err(boxed)?;

    tracing::info!("Payroll file processed: {}", outcome.output_path);
    Ok(Response {
        message: "Payroll file processed successfully".to_string(),
        output_path: outcome.output_path,
        records_processed: outcome.stats.rows,
        total_hours: outcome.stats.total_hours,
    })
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();
    run(service_fn(function_handler)).await
}

#[cfg(all(test, feature = "lambda"))]
mod tests {
    use super::*;

    #[test]
    fn test_request_overrides_are_optional() {
        let request: Request =
            serde_json::from_str(r#"{"input_key": "uploads/week-12.xlsx"}"#).unwrap();
        assert_eq!(request.input_key, "uploads/week-12.xlsx");
        assert!(request.output_key.is_none());
        assert!(request.interval.is_none());

        let request: Request = serde_json::from_str(
            r#"{"input_key": "uploads/week-12.csv", "interval": 30, "decimals": "2", "time_format": "12"}"#,
        )
        .unwrap();
        assert_eq!(request.interval, Some(30));
        assert_eq!(request.decimals.as_deref(), Some("2"));
        assert_eq!(request.time_format.as_deref(), Some("12"));
    }
}
