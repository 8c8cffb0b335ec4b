//! news-features CLI - joins news sentiment onto price bars

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use data_ingestion::{load_news_csv, load_price_csv, OutputFormat};
use news_features::{create_config_template, load_config, FeatureConfig, SentimentPipeline};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "news-features")]
#[command(about = "Build windowed news sentiment features for price bars")]
#[command(version)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the feature table
    Build(BuildArgs),
    /// Write a commented default configuration file
    InitConfig {
        #[arg(value_name = "PATH", default_value = "news_features.toml")]
        path: PathBuf,
    },
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Price bars CSV with a `timestamp` (or `time`) column
    #[arg(long)]
    prices: PathBuf,

    /// News CSV with `timestamp` and `polarity` (or `title`) columns
    #[arg(long)]
    news: PathBuf,

    /// Output file, `.csv` or `.json`
    #[arg(short, long)]
    output: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Window lengths in hours, e.g. `1,4,24`
    #[arg(long, value_delimiter = ',')]
    windows: Option<Vec<u32>>,

    /// Windows that get momentum columns (default: all)
    #[arg(long, value_delimiter = ',')]
    momentum_windows: Option<Vec<u32>>,

    /// Rows averaged by the sentiment trend
    #[arg(long)]
    trend_period: Option<usize>,

    /// Append calendar and trading-session columns
    #[arg(long)]
    time_features: bool,

    /// Append technical indicators computed from the OHLCV columns
    #[arg(long)]
    technical_indicators: bool,
}

impl BuildArgs {
    fn resolve_config(&self) -> Result<FeatureConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => FeatureConfig::default(),
        };

        if let Some(windows) = &self.windows {
            config.windows = windows.clone();
        }
        if let Some(windows) = &self.momentum_windows {
            config.momentum_windows = Some(windows.clone());
        }
        if let Some(period) = self.trend_period {
            config.trend_period = period;
        }
        if self.time_features {
            config.time_features = true;
        }
        if self.technical_indicators {
            config.technical_indicators = true;
        }

        Ok(config)
    }
}

fn run_build(args: BuildArgs) -> Result<()> {
    let start = Instant::now();
    let format = OutputFormat::from_path(&args.output)?;

    let config = args.resolve_config()?;
    info!(windows = ?config.windows, trend_period = config.trend_period, "Configuration resolved");

    let pipeline = SentimentPipeline::new(config).context("Invalid feature configuration")?;

    let prices = load_price_csv(&args.prices)?;
    let events = load_news_csv(&args.news, &pipeline.config().thresholds, None)?;

    let frame = pipeline.run(&prices, &events)?;
    format.write(&frame, &args.output)?;

    info!(
        output = %args.output.display(),
        rows = frame.row_count(),
        columns = frame.column_count(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Feature build complete"
    );

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Build(args) => {
            info!("Starting news sentiment feature build");

            // The batch is synchronous; keep it off the runtime so Ctrl-C is still seen
            let task = tokio::task::spawn_blocking(move || run_build(args));

            tokio::select! {
                result = task => {
                    result.context("Feature build task failed")??;
                }
                _ = tokio::signal::ctrl_c() => {
                    // Dropping the runtime would wait for the blocking batch
                    warn!("Interrupted, output not written");
                    std::process::exit(130);
                }
            }
        }
        Commands::InitConfig { path } => {
            create_config_template(&path)?;
            info!("Wrote configuration template to {}", path.display());
        }
    }

    Ok(())
}
