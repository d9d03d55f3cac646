use std::path::PathBuf;
use clap::{Args, Parser, Subcommand};
use anthology::api::{self, AppState};
use anthology::batch::AggregationJob;
use anthology::core::config::Config;
use anthology::logging;
use anthology::storage::{open_songs, open_stores, open_totals};
use anthology::writer::import::import_file;

#[derive(Parser)]
#[command(author, version, about = "Song catalog API and level aggregation job")]
struct Cli {
    /// Path to the configuration file; defaults apply when it does not exist
    #[arg(long, global = true, default_value = "anthology.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve,
    /// Load newline-delimited JSON songs into the catalog
    Import(ImportArgs),
    /// Precompute per-level difficulty totals
    Aggregate(AggregateArgs),
}

#[derive(Args)]
struct ImportArgs {
    file: PathBuf,

    /// Skip building the title/artist text index
    #[arg(long)]
    no_text_index: bool,
}

#[derive(Args)]
struct AggregateArgs {
    /// Song dataset to aggregate, overriding `batch.source_path`
    #[arg(long)]
    source: Option<PathBuf>,

    /// Worker threads, overriding `batch.workers` (0 = one per CPU)
    #[arg(long)]
    workers: Option<usize>,

    /// Recompute levels that already have totals
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let Cli { config, command } = Cli::parse();
    let config = Config::load(&config)?;

    match command {
        Commands::Serve => {
            let (songs, totals) = open_stores(&config)?;
            let state = AppState::new(&config, songs, totals);
            api::serve(&config, state).await?;
        }
        Commands::Import(args) => {
            let songs = open_songs(&config)?;
            let report = import_file(songs.as_ref(), &args.file, !args.no_text_index)?;
            songs.sync()?;
            println!(
                "imported {} songs ({} blank lines skipped, text index: {})",
                report.imported,
                report.blank_lines,
                if report.text_index { "built" } else { "skipped" }
            );
        }
        Commands::Aggregate(args) => {
            let mut batch = config.batch.clone();
            if let Some(source) = args.source {
                batch.source_path = source;
            }
            if let Some(workers) = args.workers {
                batch.workers = workers;
            }

            let totals = open_totals(&config)?;
            let job = AggregationJob::new(batch, totals).force(args.force);
            let summary = tokio::task::spawn_blocking(move || job.run()).await??;

            println!("{}", summary);
            if !summary.is_success() {
                return Err(format!("{} level(s) failed", summary.failed.len()).into());
            }
        }
    }

    Ok(())
}
