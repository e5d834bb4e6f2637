//! Inspect command implementation.

use super::load_tokenizer;
use anyhow::Result as AnyhowResult;
use clap::Parser;

/// Inspect command arguments.
#[derive(Parser)]
pub struct InspectCommand {
    /// Path to the trained tokenizer model
    #[arg(short, long)]
    pub tokenizer: String,

    /// Number of merges to list, in learned order
    #[arg(short = 'n', long, default_value_t = 20)]
    pub top: usize,
}

pub fn run(cmd: InspectCommand) -> AnyhowResult<()> {
    let tokenizer = load_tokenizer(&cmd.tokenizer)?;
    let merges = tokenizer.merges();

    println!("Vocabulary size: {}", tokenizer.vocab_size());
    println!("Merges: {}", merges.len());
    if merges.is_empty() {
        return Ok(());
    }

    println!();
    for (rank, rule) in merges.iter().take(cmd.top).enumerate() {
        let id = tokenizer.vocab().get_id(&rule.merged).unwrap_or_default();
        println!(
            "{:>6}  {:?} + {:?} -> {:?} [{}]",
            rank, rule.left.as_str(), rule.right.as_str(), rule.merged.as_str(), id
        );
    }
    if merges.len() > cmd.top {
        println!("   ... {} more", merges.len() - cmd.top);
    }

    Ok(())
}
