use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use fest_core::domain::FestivalRecord;
use fest_core::storage::DatabaseStorage;
use fest_core::DatabaseManager;
use fest_import::logging::init_logging;
use fest_import::{DuplicateDetector, TransactionalImporter};

#[derive(Parser)]
#[command(name = "fest-import")]
#[command(about = "Festival catalog importer with duplicate detection")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to a local database file. Without this, connects to the remote
    /// database configured via LIBSQL_URL and LIBSQL_AUTH_TOKEN.
    #[arg(long, global = true)]
    db_path: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or update the database schema
    Migrate,
    /// Report likely duplicates for a festival record without writing
    Detect {
        /// Path to a festival record JSON file
        #[arg(long)]
        input: PathBuf,
    },
    /// Atomically import a festival record
    Import {
        /// Path to a festival record JSON file
        #[arg(long)]
        input: PathBuf,
    },
}

fn read_record(path: &Path) -> anyhow::Result<FestivalRecord> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let cli = Cli::parse();

    let db = Arc::new(match &cli.db_path {
        Some(path) => DatabaseManager::new_local(path).await?,
        None => DatabaseManager::from_env().await?,
    });

    match cli.command {
        Commands::Migrate => {
            db.run_migrations().await?;
            info!("schema is up to date");
        }
        Commands::Detect { input } => {
            let record = read_record(&input)?;
            let reader = Arc::new(DatabaseStorage::new(db.clone()));
            let detector = DuplicateDetector::new(reader);
            let report = detector.detect(&record).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Import { input } => {
            let record = read_record(&input)?;
            let importer = TransactionalImporter::new(db.clone());
            let summary = importer.import_festival(&record).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
