//! Train command implementation.

use super::FormatArg;
use anyhow::{Context, Result as AnyhowResult};
use clap::Parser;
use log::info;
use pxl_tokenizer::{Tokenizer, DEFAULT_MAX_MERGES};
use std::fs;
use std::path::Path;
use std::time::Instant;

/// Train command arguments.
#[derive(Parser)]
pub struct TrainCommand {
    /// Path to the training corpus, one text per line
    #[arg(short, long)]
    pub input: String,

    /// Output JSON file (or directory with --format merges-text)
    #[arg(short, long)]
    pub output: String,

    /// Target vocabulary size, reserved symbols included
    #[arg(long, default_value_t = 10_000)]
    pub vocab_size: usize,

    /// Minimum corpus frequency of a kept token
    #[arg(short, long, default_value_t = 2)]
    pub min_frequency: u64,

    /// Upper bound on learned merges
    #[arg(long, default_value_t = DEFAULT_MAX_MERGES)]
    pub max_merges: usize,

    /// Skip corpus lines shorter than this many characters
    #[arg(long, default_value_t = 1)]
    pub min_length: usize,

    /// Fail when no token reaches the minimum frequency
    #[arg(long)]
    pub strict: bool,

    /// Count pairs on a single thread
    #[arg(long)]
    pub sequential: bool,

    /// Output layout
    #[arg(short, long, value_enum, default_value_t = FormatArg::Json)]
    pub format: FormatArg,
}

/// Corpus lines kept for training: trimmed, non-blank, at least
/// `min_length` characters.
pub fn corpus_lines(data: &str, min_length: usize) -> Vec<&str> {
    data.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && line.chars().count() >= min_length)
        .collect()
}

pub fn run(cmd: TrainCommand) -> AnyhowResult<()> {
    let start = Instant::now();
    let data = fs::read_to_string(&cmd.input)
        .with_context(|| format!("failed to read corpus {}", cmd.input))?;
    let corpus = corpus_lines(&data, cmd.min_length);
    info!(
        "Read {} bytes, {} corpus lines in {:.2}s",
        data.len(),
        corpus.len(),
        start.elapsed().as_secs_f64()
    );

    let mut tokenizer = Tokenizer::builder()
        .vocab_size(cmd.vocab_size)
        .min_frequency(cmd.min_frequency)
        .max_merges(cmd.max_merges)
        .strict(cmd.strict)
        .parallel(!cmd.sequential)
        .build()?;

    let start = Instant::now();
    tokenizer.train(&corpus).context("training failed")?;
    info!("Training completed in {:.2}s", start.elapsed().as_secs_f64());

    let output_path = Path::new(&cmd.output);
    tokenizer
        .save_as(output_path, cmd.format.into())
        .with_context(|| format!("failed to save tokenizer to {}", cmd.output))?;

    println!("Vocabulary size: {}", tokenizer.vocab_size());
    println!("Merges learned: {}", tokenizer.merges().len());
    if let Some(stats) = tokenizer.training_stats() {
        println!("Stop reason: {:?}", stats.stop_reason);
    }
    println!("Model saved to {}", cmd.output);

    Ok(())
}
