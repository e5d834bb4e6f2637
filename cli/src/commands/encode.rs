//! Encode command implementation.

use super::{load_tokenizer, PolicyArg};
use anyhow::{Context, Result as AnyhowResult};
use clap::Parser;
use std::io::Read;

/// Encode command arguments.
#[derive(Parser)]
pub struct EncodeCommand {
    /// Path to the trained tokenizer model
    #[arg(short, long)]
    pub tokenizer: String,

    /// Text to encode ("-" reads stdin)
    #[arg(short, long)]
    pub input: String,

    /// Merge application order
    #[arg(short, long, value_enum, default_value_t = PolicyArg::FirstMatch)]
    pub policy: PolicyArg,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<String>,
}

pub fn run(cmd: EncodeCommand) -> AnyhowResult<()> {
    let mut tokenizer = load_tokenizer(&cmd.tokenizer)?;
    tokenizer.set_merge_policy(cmd.policy.into());

    let input_text = if cmd.input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        buffer
    } else {
        cmd.input
    };

    let ids = tokenizer.encode(&input_text);
    let output = format_ids(&ids);

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &output).with_context(|| format!("failed to write {}", path))?;
            println!("Encoded {} tokens to {}", ids.len(), path);
        }
        None => {
            println!("{}", output);
        }
    }

    Ok(())
}

/// Comma-separated ids, the form `pxl decode --tokens` accepts.
pub fn format_ids(ids: &[u32]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
