//! Benchmark command implementation.

use super::load_tokenizer;
use anyhow::{ensure, Context, Result as AnyhowResult};
use clap::Parser;
use std::fs;
use std::time::Instant;

/// Benchmark command arguments.
#[derive(Parser)]
pub struct BenchmarkCommand {
    /// Path to the trained tokenizer model
    #[arg(short, long)]
    pub tokenizer: String,

    /// Path to input text file for benchmarking
    #[arg(short, long)]
    pub input: String,

    /// Number of iterations to run
    #[arg(short = 'n', long, default_value_t = 100)]
    pub iterations: usize,
}

pub fn run(cmd: BenchmarkCommand) -> AnyhowResult<()> {
    ensure!(cmd.iterations > 0, "--iterations must be at least 1");

    let tokenizer = load_tokenizer(&cmd.tokenizer)?;
    let text = fs::read_to_string(&cmd.input)
        .with_context(|| format!("failed to read {}", cmd.input))?;
    let lines: Vec<&str> = text.lines().collect();

    println!("Benchmarking encoding...");
    println!("  Text length: {} bytes, {} lines", text.len(), lines.len());
    println!("  Iterations: {}", cmd.iterations);
    println!();

    // Warmup
    let tokens = tokenizer.encode(&text).len();

    let start = Instant::now();
    for _ in 0..cmd.iterations {
        let _ = tokenizer.encode(&text);
    }
    let sequential = start.elapsed();

    let start = Instant::now();
    for _ in 0..cmd.iterations {
        let _ = tokenizer.encode_batch(&lines);
    }
    let batched = start.elapsed();

    let per_iter = sequential.as_secs_f64() / cmd.iterations as f64;
    let per_iter_batch = batched.as_secs_f64() / cmd.iterations as f64;

    println!("Results ({} tokens per pass):", tokens);
    println!(
        "  Sequential: {:.3}ms/iter, {:.0} tokens/s",
        per_iter * 1000.0,
        tokens as f64 / per_iter
    );
    println!(
        "  Batched:    {:.3}ms/iter, {:.0} tokens/s",
        per_iter_batch * 1000.0,
        tokens as f64 / per_iter_batch
    );

    Ok(())
}
