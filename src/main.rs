//! DAM Market Series Loader
//!
//! Command-line front end over the series service.

use clap::{Parser, Subcommand, ValueEnum};
use dam_series::{
    config::Config,
    request::SeriesRequest,
    SeriesError, SeriesResult, SeriesService,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dam-series")]
#[command(about = "Half-hour day-ahead market price/volume series")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (defaults to dam-series.toml or environment only)
    #[arg(short, long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the series for a day
    Series {
        /// Delivery day, YYYY-MM-DD (default: today, UTC)
        #[arg(short, long)]
        date: Option<String>,
        /// auto, xlsx or json
        #[arg(short, long)]
        source: Option<String>,
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
    },
    /// Show which export file would be read
    Resolve {
        /// Delivery day, YYYY-MM-DD (default: today, UTC)
        #[arg(short, long)]
        date: Option<String>,
        /// auto, xlsx or json
        #[arg(short, long)]
        source: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    let service = Arc::new(SeriesService::new(&config));

    let outcome = match cli.command {
        Commands::Series {
            date,
            source,
            format,
        } => show_series(service, date.as_deref(), source.as_deref(), format).await,
        Commands::Resolve { date, source } => show_resolved(&service, date.as_deref(), source.as_deref()),
    };

    if let Err(e) = outcome {
        eprintln!("error [{}] (status {}): {}", e.code(), e.status_hint(), e);
        std::process::exit(1);
    }
    Ok(())
}

async fn show_series(
    service: Arc<SeriesService>,
    date: Option<&str>,
    source: Option<&str>,
    format: OutputFormat,
) -> Result<(), SeriesError> {
    let request = SeriesRequest::from_params(date, source, service.default_mode())?;
    let series = service.fetch(request.date, request.mode).await?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&series)
                .map_err(|e| SeriesError::Internal(e.to_string()))?;
            println!("{}", json);
        }
        OutputFormat::Table => print_table(&series),
    }
    Ok(())
}

fn print_table(series: &SeriesResult) {
    println!(
        "\n📈 {} from {} ({})\n",
        series.date, series.source_file, series.source_kind
    );
    println!("{:<8} {:>12} {:>12}", "Slot", "Price", "Volume");
    println!("{}", "-".repeat(34));

    for point in series.points() {
        println!("{:<8} {:>12.2} {:>12.2}", point.label, point.price, point.volume);
    }

    println!("{}", "-".repeat(34));
    if let (Some(high), Some(low)) = (series.high(), series.low()) {
        println!("High: {:.2} at {}", high.price, high.label);
        println!("Low:  {:.2} at {}", low.price, low.label);
    }
}

fn show_resolved(
    service: &SeriesService,
    date: Option<&str>,
    source: Option<&str>,
) -> Result<(), SeriesError> {
    let request = SeriesRequest::from_params(date, source, service.default_mode())?;
    let path = service.resolve_for(request.date, request.mode)?;
    println!("{}", path.display());
    Ok(())
}
