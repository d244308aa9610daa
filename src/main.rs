use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;

mod explain;
mod movies;

use explain::ExplainArgs;
use movies::MoviesArgs;

/// DeepSeek-backed helpers: a pandas explainer and a movie ranking report
#[derive(Parser)]
#[command(name = "insight")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask DeepSeek for a detailed explanation of pandas and save it as Markdown
    Explain(ExplainArgs),

    /// Rank movies from a CSV, chart the top 10 and introduce the best one
    Movies(MoviesArgs),
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Explain(args) => explain::run(args).await,
        Commands::Movies(args) => movies::run(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "✗ Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
