//! Core BPE data structures.
//!
//! The vocabulary and the merge table are the only state a trained
//! tokenizer carries; everything else is derived from them.

pub mod merges;
pub mod vocab;

pub use merges::{MergeMap, MergeRule, MergeTable, Pair};
pub use vocab::{Vocab, Vocabulary, PAD_ID, PAD_TOKEN, UNK_ID, UNK_TOKEN};
