//! Load functionality for pre-trained tokenizers.
//!
//! Every loader validates the artifact against the model invariants and
//! reports the first offending field.

use super::format::{
    decode_pair_key, ModelFormat, SerializedTokenizer, VocabEntries, MERGES_FILE, MERGES_HEADER,
    VOCAB_FILE,
};
use log::{debug, info};
use pxl_core::{MergeTable, Result, TokenizerError, Vocabulary};
use std::path::Path;

/// Tokenizer loader - handles loading trained models.
pub struct TokenizerLoader;

impl TokenizerLoader {
    /// Load from the given format.
    pub fn load_as(path: &Path, format: ModelFormat) -> Result<(Vocabulary, MergeTable)> {
        match format {
            ModelFormat::Json => Self::load(path),
            ModelFormat::MergesText => Self::load_merges_text(path),
        }
    }

    /// Load a tokenizer from a JSON document on disk.
    pub fn load(path: &Path) -> Result<(Vocabulary, MergeTable)> {
        let bytes = std::fs::read(path).map_err(|e| TokenizerError::io(path, e))?;
        let (vocab, merges) = Self::from_slice(&bytes)?;

        info!(
            "Loaded tokenizer ({} symbols, {} merges) from {}",
            vocab.len(),
            merges.len(),
            path.display()
        );
        Ok((vocab, merges))
    }

    /// Load a tokenizer from the bytes of a JSON document.
    pub fn from_slice(bytes: &[u8]) -> Result<(Vocabulary, MergeTable)> {
        let serialized: SerializedTokenizer = serde_json::from_slice(bytes)
            .map_err(|e| TokenizerError::format("document", e.to_string()))?;

        if serialized.version != env!("CARGO_PKG_VERSION") {
            debug!(
                "Document written by version {:?}, reading with {}",
                serialized.version,
                env!("CARGO_PKG_VERSION")
            );
        }

        Self::deserialize(serialized)
    }

    /// Load from `vocab.json` + `merges.txt` inside `dir`.
    pub fn load_merges_text(dir: &Path) -> Result<(Vocabulary, MergeTable)> {
        let vocab_path = dir.join(VOCAB_FILE);
        let vocab_bytes =
            std::fs::read(&vocab_path).map_err(|e| TokenizerError::io(&vocab_path, e))?;
        let entries: VocabEntries = serde_json::from_slice(&vocab_bytes)
            .map_err(|e| TokenizerError::format(VOCAB_FILE, e.to_string()))?;
        let vocab = Vocabulary::from_entries(entries.0)?;

        let merges_path = dir.join(MERGES_FILE);
        let merges_content = std::fs::read_to_string(&merges_path)
            .map_err(|e| TokenizerError::io(&merges_path, e))?;

        let mut lines = merges_content.lines().enumerate();
        match lines.next() {
            Some((_, header)) if header.starts_with(MERGES_HEADER) => {}
            _ => {
                return Err(TokenizerError::format(
                    format!("{}:1", MERGES_FILE),
                    format!("missing {:?} header", MERGES_HEADER),
                ))
            }
        }

        let mut merges = MergeTable::new();
        for (line_num, line) in lines {
            let field = format!("{}:{}", MERGES_FILE, line_num + 1);
            let (left, right) =
                decode_pair_key(line).map_err(|reason| TokenizerError::format(&field, reason))?;
            let merged = format!("{}{}", left, right);
            add_merge(&vocab, &mut merges, &field, &left, &right, &merged)?;
        }

        info!(
            "Loaded tokenizer ({} symbols, {} merges) from {}",
            vocab.len(),
            merges.len(),
            dir.display()
        );
        Ok((vocab, merges))
    }

    /// Rebuild and validate the model from its serialized structure.
    fn deserialize(data: SerializedTokenizer) -> Result<(Vocabulary, MergeTable)> {
        let vocab = Vocabulary::from_entries(data.vocab.0)?;

        let mut merges = MergeTable::with_capacity(data.merges.len());
        for (i, merge) in data.merges.iter().enumerate() {
            let field = format!("merges[{}]", i);
            add_merge(&vocab, &mut merges, &field, &merge.0, &merge.1, &merge.2)?;
        }

        Ok((vocab, merges))
    }
}

fn add_merge(
    vocab: &Vocabulary,
    merges: &mut MergeTable,
    field: &str,
    left: &str,
    right: &str,
    merged: &str,
) -> Result<()> {
    for symbol in [left, right, merged] {
        if !vocab.contains(symbol) {
            return Err(TokenizerError::format(
                field,
                format!("symbol {:?} is not in the vocabulary", symbol),
            ));
        }
    }
    if merged.len() != left.len() + right.len()
        || !merged.starts_with(left)
        || !merged.ends_with(right)
    {
        return Err(TokenizerError::format(
            field,
            format!("{:?} is not the concatenation of {:?} and {:?}", merged, left, right),
        ));
    }
    merges
        .push(left, right)
        .map_err(|e| TokenizerError::format(field, e.to_string()))?;
    Ok(())
}
