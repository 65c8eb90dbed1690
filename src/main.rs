//! Forum-Harvest main entry point
//!
//! This is the command-line interface for the Forum-Harvest extractor.

use anyhow::Context;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use forum_harvest::config::{load_config_with_hash, validate_board_id, Config};
use forum_harvest::extract::{ExtractOptions, Extraction, Progress};
use forum_harvest::normalize::enrich;
use forum_harvest::output::{
    default_prefix, print_board_statistics, print_discovery, print_statistics, save_to_csv,
    save_to_json, BoardStatistics,
};
use forum_harvest::ForumClient;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Forum-Harvest: a polite extractor for community forum ideas
///
/// Pulls ideas from a community forum's LiQL search API ordered by votes,
/// optionally with their first replies, and exports them as JSON and CSV.
#[derive(Parser, Debug)]
#[command(name = "forum-harvest")]
#[command(version)]
#[command(about = "Extract community forum ideas to JSON and CSV", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Minimal output: no banner, progress bar or summary
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export ideas from a board, most voted first
    Extract(ExtractArgs),

    /// List categories, idea boards and discussion boards
    Discover {
        /// Also save the full listing as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show sample statistics for a board
    Stats {
        /// Board id (defaults to the configured board)
        #[arg(short, long)]
        board: Option<String>,

        /// Number of ideas to sample
        #[arg(long, default_value_t = 100)]
        sample: usize,

        /// Number of sampled ideas re-fetched in full for status data
        #[arg(long, default_value_t = 20)]
        enrich_sample: usize,
    },
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Board id (defaults to the configured board)
    #[arg(short, long)]
    board: Option<String>,

    /// Number of ideas to fetch
    #[arg(short = 'n', long, default_value_t = 100)]
    limit: usize,

    /// Fetch every idea in the board (ignores --limit)
    #[arg(long)]
    all: bool,

    /// Number of replies to fetch per idea
    #[arg(long, default_value_t = 0)]
    replies: u32,

    /// Only ideas with at least N replies
    #[arg(long, value_name = "N")]
    min_replies: Option<u64>,

    /// Only ideas with at most N replies
    #[arg(long, value_name = "N")]
    max_replies: Option<u64>,

    /// Re-fetch each idea in full (status, body, solved flag)
    #[arg(long)]
    enrich: bool,

    /// Output filename prefix (default: generated from the run)
    #[arg(short, long)]
    output: Option<String>,

    /// Only write JSON (skip CSV)
    #[arg(long)]
    json_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path).map_err(|e| {
                tracing::error!("Failed to load configuration: {}", e);
                e
            })?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Config::default()
        }
    };

    let result = match cli.command {
        Command::Extract(args) => handle_extract(&config, args, cli.quiet).await,
        Command::Discover { output } => handle_discover(&config, output.as_deref(), cli.quiet).await,
        Command::Stats {
            board,
            sample,
            enrich_sample,
        } => handle_stats(&config, board, sample, enrich_sample, cli.quiet).await,
    };

    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }
    result
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("forum_harvest=info,warn"),
            1 => EnvFilter::new("forum_harvest=debug,info"),
            2 => EnvFilter::new("forum_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_board(config: &Config, board: Option<String>) -> anyhow::Result<String> {
    let board_id = board.unwrap_or_else(|| config.extract.board_id.clone());
    validate_board_id(&board_id)?;
    Ok(board_id)
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{bar:40}] {pos}/{len} ({percent}%) {msg}")
    {
        bar.set_style(style.progress_chars("█░ "));
    }
    bar
}

/// Handles the `extract` command
async fn handle_extract(config: &Config, args: ExtractArgs, quiet: bool) -> anyhow::Result<()> {
    let board_id = resolve_board(config, args.board)?;

    let options = ExtractOptions {
        max_items: if args.all { None } else { Some(args.limit) },
        min_replies: args.min_replies,
        max_replies: args.max_replies,
        replies_per_item: args.replies,
        enrich: args.enrich,
        batch_size: config.extract.batch_size,
    };

    if !quiet {
        println!("=== Forum-Harvest ===\n");
        println!("Board: {}", board_id);
        println!("Ordering: by kudos (most voted first)");
        match options.max_items {
            Some(limit) => println!("Limit: {}", limit),
            None => println!("Limit: ALL"),
        }
        println!("Replies per idea: {}", options.replies_per_item);
        if let Some(min) = options.min_replies {
            println!("Min replies filter: {}", min);
        }
        if let Some(max) = options.max_replies {
            println!("Max replies filter: {}", max);
        }
        if options.min_replies.is_some() || options.max_replies.is_some() {
            println!("Note: reply filtering is done client-side during fetch");
        }
        println!();
    }

    let client = ForumClient::from_config(config)?;
    let bar = progress_bar();

    let mut extraction = Extraction::new(&client, board_id.as_str(), options.clone());
    if !quiet {
        let bar = &bar;
        extraction = extraction.with_progress(move |progress: &Progress| {
            if let Some(total) = progress.total {
                bar.set_length(total);
            }
            bar.set_position(progress.items_fetched as u64);
            bar.set_message(format!("page {}", progress.pages_fetched));
        });
    }

    let ideas = extraction
        .collect_all()
        .await
        .with_context(|| format!("extraction of board '{}' failed", board_id))?;
    bar.finish_and_clear();

    let prefix = args.output.unwrap_or_else(|| {
        default_prefix(&board_id, ideas.len(), &options, Local::now().naive_local())
    });
    let directory = Path::new(&config.output.directory);

    let json_path = save_to_json(&ideas, directory, &format!("{}.json", prefix))?;
    if !quiet {
        println!("Saved {} ideas to {}", ideas.len(), json_path.display());
    }

    if !args.json_only {
        let csv_path = save_to_csv(
            &ideas,
            directory,
            &format!("{}.csv", prefix),
            config.output.csv_body_limit,
        )?;
        if let (Some(path), false) = (csv_path, quiet) {
            println!("Saved {} ideas to {}", ideas.len(), path.display());
        }
    }

    if !quiet {
        println!();
        print_statistics(&ideas);
    }

    Ok(())
}

/// Handles the `discover` command
async fn handle_discover(
    config: &Config,
    output: Option<&Path>,
    quiet: bool,
) -> anyhow::Result<()> {
    let client = ForumClient::from_config(config)?;
    let discovery = client.discover_boards().await?;

    if !quiet {
        print_discovery(&discovery);
    }

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&discovery)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        if !quiet {
            println!("\nFull data saved to {}", path.display());
        }
    }

    Ok(())
}

/// Handles the `stats` command
async fn handle_stats(
    config: &Config,
    board: Option<String>,
    sample: usize,
    enrich_sample: usize,
    quiet: bool,
) -> anyhow::Result<()> {
    let board_id = resolve_board(config, board)?;
    let client = ForumClient::from_config(config)?;

    if !quiet {
        println!("Fetching stats for: {}\n", board_id);
    }

    let options = ExtractOptions {
        max_items: Some(sample),
        batch_size: config.extract.batch_size,
        ..ExtractOptions::default()
    };
    let sampled = Extraction::new(&client, board_id.as_str(), options)
        .collect_all()
        .await?;

    if sampled.is_empty() {
        if !quiet {
            println!("No messages found");
        }
        return Ok(());
    }

    let mut ideas = Vec::with_capacity(sampled.len());
    for (index, idea) in sampled.into_iter().enumerate() {
        if index < enrich_sample && !idea.id.is_empty() {
            let full = client.fetch_message(&idea.id).await?;
            ideas.push(enrich(idea, &full));
        } else {
            ideas.push(idea);
        }
    }

    if !quiet {
        print_board_statistics(&BoardStatistics::from_sample(&board_id, &ideas));
    }
    Ok(())
}
