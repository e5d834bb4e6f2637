//! CLI commands for the pxl tokenizer.

pub mod benchmark;
pub mod decode;
pub mod encode;
pub mod inspect;
pub mod train;

pub use benchmark::BenchmarkCommand;
pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use inspect::InspectCommand;
pub use train::TrainCommand;

use anyhow::{Context, Result};
use clap::ValueEnum;
use pxl_tokenizer::{MergePolicy, ModelFormat, Tokenizer};
use std::path::Path;

/// On-disk layout of a trained model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FormatArg {
    /// Single JSON document
    #[default]
    Json,
    /// Directory with vocab.json and merges.txt
    MergesText,
}

impl From<FormatArg> for ModelFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => ModelFormat::Json,
            FormatArg::MergesText => ModelFormat::MergesText,
        }
    }
}

/// Merge application order used when encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PolicyArg {
    /// Leftmost pair with any rule, rescanning after each merge
    #[default]
    FirstMatch,
    /// Lowest learned rank first
    Ranked,
}

impl From<PolicyArg> for MergePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::FirstMatch => MergePolicy::FirstMatch,
            PolicyArg::Ranked => MergePolicy::Ranked,
        }
    }
}

/// Load a tokenizer, treating a directory as the merges-text layout.
pub fn load_tokenizer(path: &str) -> Result<Tokenizer> {
    let path = Path::new(path);
    let format = if path.is_dir() {
        ModelFormat::MergesText
    } else {
        ModelFormat::Json
    };
    Tokenizer::load_as(path, format)
        .with_context(|| format!("failed to load tokenizer from {}", path.display()))
}
