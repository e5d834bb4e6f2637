//! Encoding strategies for BPE tokenization.
//!
//! Only character-level encoding is provided: coarse tokens are split into
//! Unicode scalar values before merges are applied.

pub mod char_level;

pub use char_level::{CharLevelEncoder, MergePolicy};
