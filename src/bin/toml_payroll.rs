use clap::Parser;
use payroll_etl::config::toml_config::TomlConfig;
use payroll_etl::core::{ConfigProvider, Pipeline};
use payroll_etl::utils::error::ErrorSeverity;
use payroll_etl::utils::{logger, validation::Validate};
use payroll_etl::{EtlEngine, LocalStorage, PayrollPipeline};

#[derive(Parser)]
#[command(name = "toml-payroll")]
#[command(about = "Payroll rounding driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "payroll.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the rounding interval from config
    #[arg(long)]
    interval: Option<u32>,

    /// Read and transform the sheet, but do not write output
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based payroll rounding");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Some(interval) = args.interval {
        config.rounding.interval_minutes = interval;
        tracing::info!("🔧 Rounding interval overridden to: {} minutes", interval);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(".");
    let pipeline = PayrollPipeline::new(storage, config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No output will be written");
        return perform_dry_run(&pipeline).await;
    }

    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(outcome) => {
            tracing::info!("✅ Payroll file processed successfully!");
            println!("✅ Rounded {} rows", outcome.stats.rows);
            println!("📁 Output saved to: {}", outcome.output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Payroll processing failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    let rounding = config.rounding();
    println!("📋 Configuration Summary:");
    println!("  Input: {}", config.input_path());
    println!("  Sheet: {}", config.sheet_name());
    println!(
        "  Output: {}",
        config.output_path().unwrap_or("processed_<input name>")
    );
    println!("  Interval: {} minutes", rounding.interval_minutes);
    println!("  Decimals: {}", rounding.decimals);
    println!("  Time format: {}h", rounding.time_format);

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

async fn perform_dry_run(
    pipeline: &PayrollPipeline<LocalStorage, TomlConfig>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Dry Run Analysis:");

    let table = pipeline.extract().await?;
    println!("  📊 Rows read: {}", table.len());

    let result = pipeline.transform(table).await?;
    println!("  ⏱️ Open shifts: {}", result.stats.open_shifts);
    println!("  🌙 Overnight shifts: {}", result.stats.overnight_shifts);
    println!("  ⚠️ Rows without hours: {}", result.stats.missing_hours);
    println!("  Σ Total hours: {:.2}", result.stats.total_hours);
    println!("  💾 Would write: {}", pipeline.output_path());

    println!();
    println!("✅ Dry run complete. Remove --dry-run to write the output file.");

    Ok(())
}
