//! Training infrastructure for BPE tokenizers.
//!
//! This module provides the training algorithm and the transient structures
//! it owns: the token frequency table and the token splits.

pub mod counter;
pub mod frequencies;
pub mod trainer;

pub use counter::{IdPair, PairCounter};
pub use frequencies::TokenFrequencies;
pub use trainer::{BpeTrainer, StopReason, TrainingConfig, TrainingStats, DEFAULT_MAX_MERGES};
