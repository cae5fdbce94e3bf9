use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

use hotel_etl::{
    load_records, logging, verify_counts, DataPipeline, Overrides, RecordBuilder, Settings,
    SqliteGateway,
};

#[derive(Debug, Parser)]
#[command(name = "hotel-etl", version = hotel_etl::VERSION)]
#[command(about = "Load hotel properties from a provider JSON file into SQLite")]
struct Cli {
    /// INI file with [log], [db] and [data] sections
    #[arg(short, long, default_value = "config.ini")]
    config: PathBuf,

    /// Input JSON file (overrides data.path)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// SQLite database file (overrides db.path)
    #[arg(short, long)]
    database: Option<PathBuf>,
}

fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();

    let overrides = Overrides {
        input: cli.input,
        database: cli.database,
    };
    let settings = Settings::load(&cli.config, &overrides)
        .with_context(|| format!("Failed to load settings from {}", cli.config.display()))?;
    logging::init(&settings.log).context("Failed to initialise logging")?;

    run_import(&settings)?;

    println!("\n⏱️  Finished in {:.3}s", start.elapsed().as_secs_f64());
    Ok(())
}

fn run_import(settings: &Settings) -> Result<()> {
    println!("🏨 Hotel import: JSON → SQLite");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Load JSON
    println!("\n📂 Loading {}...", settings.data.path.display());
    let records = load_records(&settings.data.path).context("Failed to load input")?;
    println!("✓ Loaded {} records", records.len());

    // 2. Open database
    println!("\n🔧 Opening {}...", settings.db.path.display());
    let gateway = SqliteGateway::open(&settings.db.path, settings.db.enforce_foreign_keys)
        .inspect_err(|e| log::error!("Session could not be established due to {}", e))
        .context("Failed to open database")?;
    println!("✓ Schema ready");

    // 3. Build, de-duplicate, insert
    println!("\n💾 Importing...");
    let mut pipeline = DataPipeline::new(RecordBuilder::new(), gateway);
    let summary = pipeline.run(&records).context("Import failed; nothing was written")?;
    println!("✓ {}", summary.summary());

    // 4. Verify
    println!("\n🔍 Verifying database...");
    let counts = verify_counts(pipeline.gateway().connection())?;
    println!(
        "✓ Database contains {} categories, {} chains, {} hotels",
        counts.categories, counts.chains, counts.hotels
    );

    Ok(())
}
