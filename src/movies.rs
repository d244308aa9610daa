use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use insight_common::Settings;
use insight_llm::{DeepSeekClient, LLMConfig, LLMProvider};
use insight_movies::{chart, intro, load_movies, render_table, top_rated, Movie, TOP_N};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct MoviesArgs {
    /// Movie CSV with at least `title` and `average` columns
    #[arg(short, long, default_value = "data/movie_data_cleaned.csv")]
    data: PathBuf,

    /// Where to write the bar chart (SVG)
    #[arg(long, default_value = "top_movies_plot.svg")]
    chart: PathBuf,

    /// Where to write the introduction of the top movie
    #[arg(long, default_value = "intro.md")]
    intro: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Completion token limit for the introduction
    #[arg(long, default_value_t = 1000)]
    max_tokens: u32,
}

pub async fn run(args: MoviesArgs) -> Result<()> {
    println!("{}", "Starting movie data analysis...".cyan().bold());

    let table = load_movies(&args.data)
        .with_context(|| format!("Failed to load movie data from {}", args.data.display()))?;
    println!(
        "{} {} records",
        "✓ Loaded".green(),
        table.total_rows
    );

    let top = top_rated(&table.movies, TOP_N);
    let Some(best) = top.first() else {
        println!("{}", "No valid movie data found".yellow());
        return Ok(());
    };

    println!("\n{}", format!("Top {} movies by rating:", top.len()).bold());
    println!("{}\n", render_table(&top));

    chart::render_bar_chart(&top, &args.chart).context("Failed to render chart")?;
    println!("{} {}", "✓ Chart saved to".green(), args.chart.display());

    println!(
        "\n{} {}",
        "Fetching an introduction for the top movie:".cyan(),
        best.title
    );
    let client = build_client(&Settings::from_env(), &args);
    let introduction =
        intro::fetch_introduction(client.as_ref().map(|c| c as &dyn LLMProvider), best).await;

    write_intro(&args.intro, best, &introduction)?;
    println!("{} {}", "✓ Introduction saved to".green(), args.intro.display());
    Ok(())
}

/// A missing key is not fatal here: the report is written with a placeholder.
fn build_client(settings: &Settings, args: &MoviesArgs) -> Option<DeepSeekClient> {
    let config = LLMConfig::from_settings(settings)
        .ok()?
        .with_max_tokens(args.max_tokens)
        .with_timeout(Duration::from_secs(args.timeout));

    match DeepSeekClient::new(config) {
        Ok(client) => Some(client),
        Err(e) => {
            warn!("Could not create DeepSeek client: {}", e);
            None
        }
    }
}

fn write_intro(path: &Path, movie: &Movie, introduction: &str) -> Result<()> {
    let markdown = intro::render_intro_markdown(movie, introduction);
    fs::write(path, markdown).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Introduction written to {}", path.display());
    Ok(())
}
