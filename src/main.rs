//! quotefp - find where a passage overlaps candidate documents.
//!
//! # Usage
//!
//! ```bash
//! # Print the winnowed n-grams of a file (or stdin)
//! quotefp ngrams speech.txt
//!
//! # Print the token query an index would run
//! quotefp query speech.txt
//!
//! # Reconstruct overlaps between a query file and candidate files
//! quotefp --config quotefp.yaml compare speech.txt hamlet.txt lear.txt
//! ```

use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quotefp::{CandidateHit, QuoteFinder, QuotefpConfig};
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// Winnowing fingerprints and overlap reconstruction for quotations.
#[derive(Parser)]
#[command(name = "quotefp", version, about)]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the n-gram size
    #[arg(long, global = true)]
    ngram_size: Option<usize>,

    /// Override the winnowing window size
    #[arg(long, global = true)]
    window_size: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print each selected n-gram as `(ngram) `, one per line
    Ngrams {
        /// Input file; stdin when omitted
        file: Option<PathBuf>,
    },
    /// Print the token query for a text
    Query {
        /// Input file; stdin when omitted
        file: Option<PathBuf>,
    },
    /// Compare a query file against candidate hit files and print JSON
    Compare {
        query: PathBuf,
        #[arg(required = true)]
        hits: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let finder = build_finder(&cli)?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match &cli.command {
        Command::Ngrams { file } => {
            let text = read_input(file.as_deref())?;
            let fingerprints = finder.fingerprint(&text)?;
            for entry in &fingerprints {
                writeln!(out, "({}) ", entry.ngram)?;
            }
        }
        Command::Query { file } => {
            let text = read_input(file.as_deref())?;
            let query = finder.token_query(&text)?;
            writeln!(out, "{}", query.to_query_string().trim_start())?;
        }
        Command::Compare { query, hits } => {
            let query_text = read_file(query)?;
            let candidates = hits
                .iter()
                .map(|path| Ok(CandidateHit::new(path.display().to_string(), read_file(path)?)))
                .collect::<Result<Vec<_>>>()?;

            let batch = finder.compare_many(&query_text, &candidates)?;
            let hits: Vec<serde_json::Value> = batch
                .hits
                .iter()
                .map(|hit| match &hit.result {
                    Ok(overlap) => serde_json::to_value(overlap).unwrap_or_else(|e| {
                        json!({ "hit_id": hit.hit_id, "error": e.to_string() })
                    }),
                    Err(err) => json!({ "hit_id": hit.hit_id, "error": err.to_string() }),
                })
                .collect();
            let report = json!({
                "query": query.display().to_string(),
                "hits": hits,
                "pruned": batch.pruned,
                "truncated": batch.truncated,
            });
            serde_json::to_writer_pretty(&mut out, &report)?;
            writeln!(out)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn build_finder(cli: &Cli) -> Result<QuoteFinder> {
    let mut cfg = match &cli.config {
        Some(path) => QuotefpConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => QuotefpConfig::default(),
    };
    if let Some(n) = cli.ngram_size {
        cfg.perceptual.ngram_size = n;
    }
    if let Some(w) = cli.window_size {
        cfg.perceptual.window_size = w;
    }
    Ok(QuoteFinder::new(cfg)?)
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => read_file(path),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("reading stdin")?;
            Ok(text)
        }
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
