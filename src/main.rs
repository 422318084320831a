use anyhow::Result;
use bookfinder_loader::config::{self, LoaderConfig};
use bookfinder_loader::ingest::{Ingestor, RunReport};
use bookfinder_loader::stats::IngestStats;
use bookfinder_loader::store::{MemoryStore, Neo4jStore, Store};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "bookfinder-loader")]
#[command(about = "Load Open Library author and work dumps into a store")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load authors, then works.
    ///
    /// The default `--store memory` keeps records only for the duration of the
    /// run; pass `--store neo4j` to persist them.
    Load(LoadArgs),
    /// Load only the author dump
    Authors(PhaseArgs),
    /// Load only the work dump (authors must already be in the store)
    Works(PhaseArgs),
}

#[derive(Args)]
struct LoadArgs {
    /// Path to the author dump
    #[arg(long, env = "DATADUMP_LOCATION_AUTHOR")]
    authors: PathBuf,

    /// Path to the work dump
    #[arg(long, env = "DATADUMP_LOCATION_WORK")]
    works: PathBuf,

    #[command(flatten)]
    store: StoreArgs,
}

#[derive(Args)]
struct PhaseArgs {
    /// Path to the dump file
    #[arg(short, long)]
    input: PathBuf,

    #[command(flatten)]
    store: StoreArgs,
}

#[derive(Args)]
struct StoreArgs {
    /// Where loaded records are saved (`memory` is discarded on exit, `neo4j` persists)
    #[arg(long, value_enum, default_value_t = Backend::Memory)]
    store: Backend,

    /// Neo4j Bolt URI
    #[arg(long, default_value = config::DEFAULT_BOLT_URI)]
    bolt_uri: String,

    /// Neo4j user
    #[arg(long, env = "NEO4J_USER", default_value = "")]
    user: String,

    /// Neo4j password
    #[arg(long, env = "NEO4J_PASSWORD", default_value = "", hide_env_values = true)]
    password: String,

    /// Limit number of lines read per dump (for testing)
    #[arg(long)]
    limit: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    /// Keep records in memory for the duration of the run
    Memory,
    /// Save records as nodes in Neo4j
    Neo4j,
}

async fn run_with<S: Store>(store: &S, config: LoaderConfig) -> bool {
    let start = Instant::now();
    let mut ingestor = Ingestor::new(config, store);
    let report = ingestor.run().await;
    print_summary(&report, ingestor.stats(), start);
    report.is_success()
}

async fn run(config: LoaderConfig, args: &StoreArgs) -> Result<bool> {
    match args.store {
        Backend::Memory => {
            let store = MemoryStore::new();
            Ok(run_with(&store, config).await)
        }
        Backend::Neo4j => {
            info!(uri = %args.bolt_uri, "Connecting to Neo4j");
            let store = Neo4jStore::connect(&args.bolt_uri, &args.user, &args.password).await?;
            Ok(run_with(&store, config).await)
        }
    }
}

fn print_summary(report: &RunReport, stats: &IngestStats, start: Instant) {
    println!();
    println!("=== Summary ===");
    println!("Total time:         {:.2}s", start.elapsed().as_secs_f64());
    println!("Lines read:         {}", stats.lines());
    println!("Authors saved:      {}", stats.authors());
    println!("Books saved:        {}", stats.books());
    println!("Malformed lines:    {}", stats.malformed());
    println!("Missing fields:     {}", stats.missing_fields());
    println!("Bad dates:          {}", stats.bad_dates());
    println!("Unresolved authors: {}", stats.unresolved_authors());
    if stats.store_read_errors() > 0 {
        println!("Store read errors:  {}", stats.store_read_errors());
    }
    for (label, phase) in [("Authors", &report.authors), ("Works", &report.works)] {
        if let Some(Err(e)) = phase {
            println!("{label} phase aborted: {e}");
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let (config, store_args) = match cli.command {
        Commands::Load(args) => (
            LoaderConfig::new(Some(args.authors), Some(args.works)).with_limit(args.store.limit),
            args.store,
        ),
        Commands::Authors(args) => (
            LoaderConfig::new(Some(args.input), None).with_limit(args.store.limit),
            args.store,
        ),
        Commands::Works(args) => (
            LoaderConfig::new(None, Some(args.input)).with_limit(args.store.limit),
            args.store,
        ),
    };

    let result = tokio::runtime::Builder::new_multi_thread()
        .thread_name("bookfinder-loader-worker")
        .enable_io()
        .enable_time()
        .build()
        .map_err(anyhow::Error::from)
        .and_then(|rt| rt.block_on(run(config, &store_args)));

    match result {
        Ok(true) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Ok(false) => {
            error!("Completed with aborted phases");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn load_defaults_to_memory_store() {
        let cli = Cli::parse_from([
            "bookfinder-loader",
            "load",
            "--authors",
            "a.txt",
            "--works",
            "w.txt",
        ]);
        let Commands::Load(args) = cli.command else {
            panic!("expected load subcommand");
        };
        assert!(matches!(args.store.store, Backend::Memory));
        assert_eq!(args.store.bolt_uri, config::DEFAULT_BOLT_URI);
    }

    #[test]
    fn load_help_names_the_persisting_store() {
        let cmd = Cli::command();
        let load = cmd.find_subcommand("load").unwrap();
        let about = load.get_long_about().unwrap().to_string();
        assert!(about.contains("--store neo4j"));
    }
}
