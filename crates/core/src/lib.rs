//! pxl-core - Core BPE data structures and encoding
//!
//! This crate provides the fundamental pieces of the pxl byte-pair encoder,
//! independent of training and persistence.
//!
//! # Features
//!
//! - Vocabulary with two reserved symbols (`<UNK>` = 0, `<PAD>` = 1) and
//!   dense ids assigned in first-seen order
//! - Ordered merge table with a hash index for constant-time pair lookups
//! - Word/punctuation segmenter used by both training and encoding
//! - Character-level encoder/decoder with first-match or ranked merging
//!
//! # Example
//!
//! ```rust
//! use pxl_core::{MergeTable, Vocabulary, UNK_ID};
//!
//! let mut vocab = Vocabulary::new();
//! let l = vocab.add_symbol("l")?;
//! vocab.add_symbol("e")?;
//!
//! let mut merges = MergeTable::new();
//! merges.push("l", "e")?;
//! vocab.add_symbol("le")?;
//!
//! assert_eq!(l, 2);
//! assert_eq!(vocab.id_or_unk("z"), UNK_ID);
//! # Ok::<(), pxl_core::TokenizerError>(())
//! ```

pub mod error;
pub use error::{Result, TokenizerError};

pub mod core;
pub use crate::core::{
    MergeMap, MergeRule, MergeTable, Pair, Vocab, Vocabulary, PAD_ID, PAD_TOKEN, UNK_ID, UNK_TOKEN,
};

pub mod pre_tokenizer;
pub use pre_tokenizer::Segmenter;

pub mod encoding;
pub use encoding::{CharLevelEncoder, MergePolicy};
