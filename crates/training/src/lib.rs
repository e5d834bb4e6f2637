//! pxl-training - BPE training infrastructure
//!
//! This crate learns BPE merge rules from an ordered sequence of raw text
//! strings.
//!
//! # Features
//!
//! - Word/punctuation segmentation with corpus-wide token frequencies
//! - Frequency-weighted pair counting, sequential or on the rayon pool
//! - Deterministic merge selection (ties go to the lexicographically
//!   smallest pair)
//! - Per-run statistics: merge frequencies and the reason training stopped
//!
//! # Example
//!
//! ```rust
//! use pxl_training::{BpeTrainer, TrainingConfig};
//!
//! let mut trainer = BpeTrainer::new(TrainingConfig {
//!     vocab_size: 50,
//!     min_frequency: 2,
//!     ..Default::default()
//! });
//! let (vocab, merges) = trainer.train(["le chat", "le chien", "le chat noir"])?;
//!
//! assert_eq!(merges.rule(0).unwrap().merged, "le");
//! assert!(vocab.len() <= 50);
//! # Ok::<(), pxl_training::TokenizerError>(())
//! ```

pub use pxl_core::{Result, TokenizerError};

pub mod training;
pub use training::{
    BpeTrainer, PairCounter, StopReason, TokenFrequencies, TrainingConfig, TrainingStats,
    DEFAULT_MAX_MERGES,
};
