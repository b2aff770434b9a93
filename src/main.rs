use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use nob_atlas::log_info;
use nob_atlas::modules::enrichment::{CompletionClient, EnrichmentService, TextGenerator};
use nob_atlas::modules::export::{BackupService, ExportService};
use nob_atlas::modules::reconcile::application::batch_loader;
use nob_atlas::modules::reconcile::application::ports::confirmation::{AlwaysApprove, AlwaysDeny};
use nob_atlas::modules::reconcile::infrastructure::{ConsoleConfirmation, MysqlUnitStore};
use nob_atlas::modules::reconcile::{
    ConfirmationPort, ImportRunner, Reconciler, ReconcilerConfig, UnitStore,
};
use nob_atlas::modules::units::EntityKind;
use nob_atlas::shared::utils::logger::init_logger;
use nob_atlas::shared::{AppConfig, Database};

#[derive(Parser)]
#[command(name = "nob-atlas", version, about = "Import and maintenance tooling for the NOB historical-map database")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// How ambiguous-match prompts are answered.
#[derive(Clone, Copy, ValueEnum)]
enum AssumeMode {
    /// Ask on the console (default)
    Ask,
    /// Insert every ambiguous record without asking
    Yes,
    /// Skip every ambiguous record without asking
    No,
}

#[derive(Subcommand)]
enum Command {
    /// Import a JSON batch, reconciling against existing records
    Import {
        /// Entity kind to import
        #[arg(short, long, value_enum)]
        kind: EntityKind,
        /// Path to the JSON file containing the batch
        #[arg(short, long)]
        file: PathBuf,
        /// Prompt handling for ambiguous matches
        #[arg(long, value_enum, default_value = "ask")]
        assume: AssumeMode,
        /// Override the near-duplicate skip threshold
        #[arg(long)]
        near_duplicate_threshold: Option<f64>,
        /// Override the confirmation threshold
        #[arg(long)]
        confirm_threshold: Option<f64>,
    },
    /// Export all records of a kind to a JSON file
    Export {
        #[arg(short, long, value_enum)]
        kind: EntityKind,
        /// Output file (defaults to <table>_data.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Fill missing descriptions or formation sites via the completion service
    Enrich {
        #[arg(short, long, value_enum)]
        kind: EntityKind,
        /// Generate markdown descriptions for records without one
        #[arg(long, conflicts_with = "sites")]
        descriptions: bool,
        /// Resolve formation sites and coordinates for records missing them
        #[arg(long)]
        sites: bool,
    },
    /// Take date-stamped mysqldump backups (structure and data)
    Backup,
    /// Apply pending database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logger();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("failed to resolve configuration")?;

    match cli.command {
        Command::Import {
            kind,
            file,
            assume,
            near_duplicate_threshold,
            confirm_threshold,
        } => {
            let store = connect_store(&config)?;
            let confirmation: Arc<dyn ConfirmationPort> = match assume {
                AssumeMode::Ask => Arc::new(ConsoleConfirmation),
                AssumeMode::Yes => Arc::new(AlwaysApprove),
                AssumeMode::No => Arc::new(AlwaysDeny),
            };

            let defaults = ReconcilerConfig::for_kind(kind);
            let reconciler_config = ReconcilerConfig::new(
                near_duplicate_threshold.unwrap_or(defaults.near_duplicate_threshold),
                confirm_threshold.unwrap_or(defaults.confirm_threshold),
            )?;
            let reconciler = Reconciler::new(reconciler_config);

            let batch = batch_loader::load_batch(kind, &file)?;
            log_info!("Importing {} {} record(s)", batch.len(), kind.label());

            let runner = ImportRunner::new(store, confirmation);
            let summary = runner.run(kind, &reconciler, batch).await?;

            println!(
                "Import completed: {} inserted, {} updated, {} skipped, {} rejected, {} failed",
                summary.inserted,
                summary.updated,
                summary.skipped,
                summary.rejected,
                summary.failed.len()
            );
            for failure in &summary.failed {
                println!("  failed: {} ({})", failure.name, failure.reason);
            }
        }

        Command::Export { kind, output } => {
            let store = connect_store(&config)?;
            let output =
                output.unwrap_or_else(|| PathBuf::from(format!("{}_data.json", kind.table_name())));
            let count = ExportService::new(store).export(kind, &output).await?;
            println!("Exported {} record(s) to {}", count, output.display());
        }

        Command::Enrich {
            kind,
            descriptions,
            sites,
        } => {
            let completion = config.completion.clone().context(
                "completion service not configured; set COMPLETION_API_KEY (and optionally \
                 COMPLETION_API_URL / COMPLETION_MODEL)",
            )?;
            let store = connect_store(&config)?;
            let generator: Arc<dyn TextGenerator> = Arc::new(CompletionClient::new(completion));
            let service = EnrichmentService::new(store, generator);

            let summary = if sites {
                service.fill_formation_sites(kind).await?
            } else if descriptions {
                service.describe_missing(kind).await?
            } else {
                anyhow::bail!("pass --descriptions or --sites");
            };
            println!(
                "Enrichment completed: {} candidate(s), {} enriched, {} unresolved, {} failed",
                summary.scanned, summary.enriched, summary.unresolved, summary.failed
            );
        }

        Command::Backup => {
            let service = BackupService::new(&config.database_url, &config.backup_dir);
            let (structure, data) = service.backup().await?;
            println!("Structure backup: {}", structure.display());
            println!("Data backup: {}", data.display());
        }

        Command::Migrate => {
            let database = Database::new(&config.database_url)?;
            database.run_migrations()?;
            println!("Migrations applied");
        }
    }

    Ok(())
}

fn connect_store(config: &AppConfig) -> anyhow::Result<Arc<dyn UnitStore>> {
    let database = Database::new(&config.database_url).context("failed to connect to database")?;
    Ok(Arc::new(MysqlUnitStore::new(Arc::new(database))))
}
