// src/main.rs

use anyhow::{Context, Result};
use clap::Parser;
use loghunt::{EngineConfig, HuntEngine, SearchOutcome};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Developer console for the log hunting query engine.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The query to run in non-interactive mode.
    #[arg(short, long)]
    query: Option<String>,

    /// Mission the query is judged against (e.g. mission03).
    #[arg(short, long)]
    mission: Option<String>,

    /// Maximum number of results to return.
    #[arg(short = 'n', long)]
    max_results: Option<usize>,

    /// JSON engine configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON Lines corpus to search instead of the built-in logs.
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Print outcomes as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    if let Some(path) = &args.corpus {
        config.corpus_path = Some(path.clone());
    }

    let start = Instant::now();
    let engine = HuntEngine::from_config(config).context("loading corpus")?;
    println!(
        "Loaded {} records in {:.2?}\n",
        engine.corpus().len(),
        start.elapsed()
    );

    let max_results = args
        .max_results
        .unwrap_or(engine.config().default_max_results);

    if let Some(query) = &args.query {
        // Non-interactive mode
        run_query(&engine, query, args.mission.as_deref(), max_results, args.json)?;
    } else {
        // Interactive mode
        run_interactive_session(&engine, args.mission, max_results, args.json)?;
    }

    Ok(())
}

/// Runs a single query and prints the outcome.
fn run_query(
    engine: &HuntEngine,
    query: &str,
    mission: Option<&str>,
    max_results: usize,
    json: bool,
) -> Result<()> {
    let start = Instant::now();
    let outcome = engine.search(query, mission, max_results);
    let duration = start.elapsed();

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
        println!("({:.2?})", duration);
    }
    Ok(())
}

fn print_outcome(outcome: &SearchOutcome) {
    println!("Query: {}", outcome.query);
    println!("Found {} results", outcome.total_matches);

    for (i, entry) in outcome.results.iter().enumerate() {
        let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
        println!(
            "{}: {} {:<5} {:<10} {:<15} {:<8} {:<15} {}",
            i + 1,
            show(&entry.timestamp),
            show(&entry.level),
            show(&entry.user),
            show(&entry.action),
            show(&entry.status),
            show(&entry.ip),
            show(&entry.details),
        );
    }

    let verdict = if outcome.is_correct { "correct" } else { "not yet" };
    println!("[{}] {}", verdict, outcome.feedback);
}

/// Starts an interactive REPL session.
fn run_interactive_session(
    engine: &HuntEngine,
    mut mission: Option<String>,
    max_results: usize,
    json: bool,
) -> Result<()> {
    let mut rl = rustyline::Editor::<()>::new()?;
    println!("Welcome to loghunt. Type a query, \"mission <id>\" to pick a mission, or \"quit\" to exit.");

    loop {
        let prompt = match &mission {
            Some(id) => format!("{}> ", id),
            None => "> ".to_string(),
        };
        let readline = rl.readline(&prompt);
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line);

                if line == "quit" || line == "q" {
                    break;
                }

                if line == "mission" {
                    mission = None;
                    continue;
                }
                if let Some(id) = line.strip_prefix("mission ") {
                    mission = Some(id.trim().to_string());
                    continue;
                }

                run_query(engine, line, mission.as_deref(), max_results, json)?;
                println!(); // Add a newline for spacing
            }
            Err(_) => break, // Ctrl-C or Ctrl-D
        }
    }
    Ok(())
}
