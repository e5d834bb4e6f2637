//! Pre-tokenization applied before BPE.
//!
//! Raw text is cut into coarse tokens (words and single punctuation marks)
//! that are then split into symbols by the trainer and the encoder.

pub mod split;

pub use split::Segmenter;
