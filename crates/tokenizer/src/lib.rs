//! pxl-tokenizer - High-level tokenizer API
//!
//! This crate provides a user-friendly interface for BPE tokenization,
//! integrating training, the frozen vocabulary and merge table, the encoder
//! and persistence into a single API.
//!
//! # Features
//!
//! - Simple builder pattern for tokenizer configuration
//! - First-match or ranked merge application
//! - Parallel batch encoding
//! - Loading and saving as a JSON document or `vocab.json` + `merges.txt`
//!
//! # Example
//!
//! ```rust
//! use pxl_tokenizer::Tokenizer;
//!
//! let mut tokenizer = Tokenizer::builder()
//!     .vocab_size(50)
//!     .min_frequency(2)
//!     .build()?;
//! tokenizer.train(["le chat", "le chien", "le chat noir"])?;
//!
//! let ids = tokenizer.encode("le chat");
//! assert_eq!(tokenizer.decode(&ids), "lechat");
//! # Ok::<(), pxl_tokenizer::TokenizerError>(())
//! ```

// Re-export core types
pub use pxl_core::{
    MergePolicy, MergeRule, MergeTable, Result, TokenizerError, Vocabulary, PAD_ID, PAD_TOKEN,
    UNK_ID, UNK_TOKEN,
};
pub use pxl_training::{StopReason, TrainingConfig, TrainingStats, DEFAULT_MAX_MERGES};

// Tokenizer API
pub mod tokenizer;
pub use tokenizer::{Tokenizer, TokenizerBuilder, TokenizerConfig};

// IO/Serialization
pub mod io;
pub use io::{ModelFormat, TokenizerLoader, TokenizerSaver};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
