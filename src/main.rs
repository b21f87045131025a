use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pidgeon::config::Config;
use pidgeon::{Engine, RankedBatch};

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_INPUT: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Table,
    Tsv,
    Json,
}

#[derive(clap::Args, Debug, Default)]
struct RankArgs {
    /// Listing files (CSV or JSON); glob patterns are expanded
    inputs: Vec<String>,

    /// Also write the full ranking as CSV to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format for stdout
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Show only the top N listings
    #[arg(short = 'n', long)]
    limit: Option<usize>,

    /// Drop listings priced above this
    #[arg(long)]
    max_price: Option<f64>,

    /// Drop listings with a monthly fee above this
    #[arg(long)]
    max_fee: Option<f64>,

    /// Drop listings with fewer rooms
    #[arg(long)]
    min_rooms: Option<f64>,

    /// Drop listings with more rooms
    #[arg(long)]
    max_rooms: Option<f64>,

    /// Print batch summary statistics after the ranking
    #[arg(short, long)]
    summary: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank listings by composite score (default)
    Rank(RankArgs),
    /// Open a ranked listing in the browser by its index number
    Open {
        /// Index number of the listing to open (1-based, as shown by rank)
        index: usize,
        /// Listing files (CSV or JSON); glob patterns are expanded
        #[arg(required = true)]
        inputs: Vec<String>,
    },
    /// Write the default configuration file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "pidgeon")]
#[command(about = "Apartment listing ranker", long_about = None)]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/pidgeon/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    rank: Option<RankArgs>,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Fold command-line filter flags over the configured filters.
fn apply_filter_overrides(config: &mut Config, args: &RankArgs) {
    let filters = &mut config.filters;
    if args.max_price.is_some() {
        filters.max_price = args.max_price;
    }
    if args.max_fee.is_some() {
        filters.max_fee = args.max_fee;
    }
    if args.min_rooms.is_some() {
        filters.min_rooms = args.min_rooms;
    }
    if args.max_rooms.is_some() {
        filters.max_rooms = args.max_rooms;
    }
}

fn build_engine(config: Config) -> Engine {
    match Engine::new(config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    }
}

fn rank_inputs(engine: &Engine, inputs: &[String], verbose: bool) -> RankedBatch {
    let records = match pidgeon::input::load_inputs(inputs) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Input error: {:#}", e);
            std::process::exit(EXIT_INPUT);
        }
    };

    let batch = engine.rank(&records);

    if verbose {
        eprintln!("{}", pidgeon::output::format_report(&batch.report));
    } else if batch.report.rejected_count() > 0 {
        eprintln!(
            "Skipped {} of {} records (use --verbose for details)",
            batch.report.rejected_count(),
            batch.report.input_records
        );
    }

    batch
}

fn run_rank(engine: &Engine, args: &RankArgs, verbose: bool) -> i32 {
    let start_time = Instant::now();
    let batch = rank_inputs(engine, &args.inputs, verbose);

    if let Some(path) = &args.output {
        if let Err(e) = pidgeon::output::export_csv(&batch.listings, path) {
            eprintln!("Failed to write output: {:#}", e);
            return EXIT_FAILURE;
        }
        if verbose {
            eprintln!("Wrote {} listings to {}", batch.listings.len(), path.display());
        }
    }

    let shown = &batch.listings[..args.limit.unwrap_or(usize::MAX).min(batch.listings.len())];
    let use_colors = pidgeon::output::should_use_colors();

    match args.format {
        OutputFormat::Table if verbose && !shown.is_empty() => {
            for scored in shown {
                println!(
                    "{}",
                    pidgeon::output::format_listing_detail(scored, use_colors)
                );
                println!(
                    "  Score: {}",
                    pidgeon::output::format_score(scored.composite, scored.imputed_count() > 0)
                );
                println!();
            }
        }
        OutputFormat::Table => {
            println!("{}", pidgeon::output::format_scored_table(shown, use_colors));
        }
        OutputFormat::Tsv => {
            let output = pidgeon::output::format_tsv(shown);
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        OutputFormat::Json => match serde_json::to_string_pretty(shown) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize listings: {}", e);
                return EXIT_FAILURE;
            }
        },
    }

    if args.summary {
        if let Some(summary) = pidgeon::summary::BatchSummary::from_listings(&batch.listings) {
            println!();
            println!("{}", pidgeon::output::format_summary(&summary));
        }
    }

    if verbose {
        eprintln!();
        eprintln!(
            "Total: {} listings in {:?}",
            batch.listings.len(),
            start_time.elapsed()
        );
    }

    EXIT_SUCCESS
}

fn run_open(engine: &Engine, index: usize, inputs: &[String], verbose: bool) -> i32 {
    let batch = rank_inputs(engine, inputs, verbose);

    let scored = match pidgeon::browser::select_listing(&batch.listings, index) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            return EXIT_INPUT;
        }
    };

    if let Err(e) = pidgeon::browser::open_url(&scored.listing.detail_url) {
        eprintln!("Failed to open browser: {}", e);
        return EXIT_FAILURE;
    }

    println!(
        "Opening {} in browser: {}",
        scored.listing.address, scored.listing.detail_url
    );
    EXIT_SUCCESS
}

fn run_init(config_path: Option<PathBuf>, force: bool) -> i32 {
    let path = match config_path.map_or_else(pidgeon::config::get_config_path, Ok) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return EXIT_CONFIG;
        }
    };

    match pidgeon::config::write_default_config(&path, force) {
        Ok(()) => {
            println!("Wrote default config to {}", path.display());
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            EXIT_CONFIG
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let command = match (cli.command, cli.rank) {
        (Some(command), _) => command,
        (None, Some(args)) => Commands::Rank(args),
        (None, None) => Commands::Rank(RankArgs::default()),
    };

    if let Commands::Init { force } = command {
        std::process::exit(run_init(cli.config, force));
    }

    let mut config = match pidgeon::config::load_config(cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let code = match command {
        Commands::Rank(args) => {
            if args.inputs.is_empty() {
                eprintln!("No input files given. Usage: pidgeon rank <FILES>...");
                std::process::exit(EXIT_INPUT);
            }
            apply_filter_overrides(&mut config, &args);
            let engine = build_engine(config);
            run_rank(&engine, &args, cli.verbose)
        }
        Commands::Open { index, inputs } => {
            let engine = build_engine(config);
            run_open(&engine, index, &inputs, cli.verbose)
        }
        Commands::Init { .. } => EXIT_SUCCESS,
    };

    std::process::exit(code);
}
