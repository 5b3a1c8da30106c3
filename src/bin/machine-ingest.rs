use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use machine_data_ingest::ingestion::{
    ingest_from_path, CompositeObserver, FileObserver, IngestionObserver, IngestionOptions,
    TracingObserver,
};

/// Ingest a machine-data CSV or Excel file and report the validated records.
#[derive(Parser, Debug)]
#[command(name = "machine-ingest", version, about = "Validate machine telemetry from a CSV/Excel file")]
struct Cli {
    /// Path to a .csv, .xlsx or .xls file
    path: PathBuf,

    /// Print accepted records as JSON instead of a summary
    #[arg(long)]
    json: bool,

    /// Also append ingestion events to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut observers: Vec<Arc<dyn IngestionObserver>> = vec![Arc::new(TracingObserver)];
    if let Some(log_file) = &cli.log_file {
        observers.push(Arc::new(FileObserver::new(log_file)));
    }
    let options = IngestionOptions {
        observer: Some(Arc::new(CompositeObserver::new(observers))),
        ..Default::default()
    };

    let ds = ingest_from_path(&cli.path, &options)
        .with_context(|| format!("failed to ingest {}", cli.path.display()))?;

    let records = match ds.require_rows() {
        Ok(records) => records,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    println!("{} valid rows found ({} skipped)", records.len(), ds.rejected_count());
    for r in records {
        println!(
            "  {:<12} temp={} vibration={} pressure={} hours={} last_maintenance={}d logs={}",
            r.machine_id,
            r.temperature,
            r.vibration_level,
            r.pressure,
            r.operating_hours,
            r.last_maintenance_days,
            r.error_logs
        );
    }
    Ok(())
}
