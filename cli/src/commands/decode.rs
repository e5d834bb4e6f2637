//! Decode command implementation.

use super::load_tokenizer;
use anyhow::Result as AnyhowResult;
use clap::Parser;

/// Decode command arguments.
#[derive(Parser)]
pub struct DecodeCommand {
    /// Path to the trained tokenizer model
    #[arg(short, long)]
    pub tokenizer: String,

    /// Comma-separated token IDs
    #[arg(long, value_delimiter = ',', required = true)]
    pub tokens: Vec<u32>,

    /// Drop <PAD> ids from the output
    #[arg(long)]
    pub skip_special: bool,
}

pub fn run(cmd: DecodeCommand) -> AnyhowResult<()> {
    let tokenizer = load_tokenizer(&cmd.tokenizer)?;
    println!("{}", tokenizer.decode_with(&cmd.tokens, cmd.skip_special));
    Ok(())
}
