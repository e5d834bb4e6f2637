//! Serialization and deserialization for BPE models.
//!
//! Two layouts are supported: a single JSON document, and a directory
//! holding `vocab.json` next to a line-oriented `merges.txt`.

pub mod format;
pub mod load;
pub mod save;

pub use format::ModelFormat;
pub use load::TokenizerLoader;
pub use save::TokenizerSaver;
