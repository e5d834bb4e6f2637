//! Save functionality for trained tokenizers.
//!
//! Documents are fully serialized in memory and then written through a
//! temporary sibling file that is renamed into place, so a failed save never
//! leaves a truncated artifact behind.

use super::format::{
    encode_pair_key, ModelFormat, SerializedMerge, SerializedTokenizer, VocabEntries,
    MERGES_FILE, MERGES_HEADER, VOCAB_FILE,
};
use log::info;
use pxl_core::{MergeTable, Result, TokenizerError, Vocabulary};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Tokenizer saver - handles saving trained models.
pub struct TokenizerSaver<'a> {
    /// Vocabulary reference
    vocab: &'a Vocabulary,
    /// Merge table reference
    merges: &'a MergeTable,
}

impl<'a> TokenizerSaver<'a> {
    /// Create a new tokenizer saver.
    pub fn new(vocab: &'a Vocabulary, merges: &'a MergeTable) -> Self {
        Self { vocab, merges }
    }

    /// Serialize the model to its JSON document.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.serialize())?)
    }

    /// Save in the given format.
    ///
    /// `path` is the JSON file for [`ModelFormat::Json`] and the target
    /// directory for [`ModelFormat::MergesText`].
    pub fn save_as(&self, path: &Path, format: ModelFormat) -> Result<()> {
        match format {
            ModelFormat::Json => self.save(path),
            ModelFormat::MergesText => self.save_merges_text(path),
        }
    }

    /// Save the tokenizer as a single JSON document.
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| TokenizerError::io(parent, e))?;
        }
        write_atomic(path, &bytes)?;

        info!(
            "Saved tokenizer ({} symbols, {} merges) to {}",
            self.vocab.len(),
            self.merges.len(),
            path.display()
        );
        Ok(())
    }

    /// Save as `vocab.json` + `merges.txt` inside `dir`.
    ///
    /// Each line of `merges.txt` after the header is one escaped pair key,
    /// in learned order; the merged symbol is the concatenation of the pair.
    pub fn save_merges_text(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir).map_err(|e| TokenizerError::io(dir, e))?;

        let vocab_bytes = serde_json::to_vec_pretty(&self.vocab_entries())?;

        let mut merges_txt = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(merges_txt, "{} {}", MERGES_HEADER, env!("CARGO_PKG_VERSION"));
        for rule in self.merges {
            let _ = writeln!(merges_txt, "{}", encode_pair_key(&rule.left, &rule.right));
        }

        write_atomic(&dir.join(VOCAB_FILE), &vocab_bytes)?;
        write_atomic(&dir.join(MERGES_FILE), merges_txt.as_bytes())?;

        info!(
            "Saved tokenizer ({} symbols, {} merges) to {}",
            self.vocab.len(),
            self.merges.len(),
            dir.display()
        );
        Ok(())
    }

    fn vocab_entries(&self) -> VocabEntries {
        VocabEntries(
            self.vocab
                .iter()
                .map(|(id, symbol)| (symbol.to_string(), id))
                .collect(),
        )
    }

    /// Serialize the tokenizer to a structure.
    pub(crate) fn serialize(&self) -> SerializedTokenizer {
        let merges = self
            .merges
            .iter()
            .map(|rule| {
                SerializedMerge(
                    rule.left.to_string(),
                    rule.right.to_string(),
                    rule.merged.to_string(),
                )
            })
            .collect();

        SerializedTokenizer {
            version: env!("CARGO_PKG_VERSION").to_string(),
            vocab: self.vocab_entries(),
            merges,
        }
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = tmp_path(path);
    std::fs::write(&tmp, bytes).map_err(|e| TokenizerError::io(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        TokenizerError::io(path, e)
    })
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Vocabulary, MergeTable) {
        let mut vocab = Vocabulary::new();
        let mut merges = MergeTable::new();
        for s in ["l", "e", "le"] {
            vocab.add_symbol(s).unwrap();
        }
        merges.push("l", "e").unwrap();
        (vocab, merges)
    }

    #[test]
    fn test_serialize() {
        let (vocab, merges) = sample();
        let serialized = TokenizerSaver::new(&vocab, &merges).serialize();

        assert_eq!(serialized.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(serialized.vocab.0[0], ("<UNK>".to_string(), 0));
        assert_eq!(serialized.vocab.0[4], ("le".to_string(), 4));
        assert_eq!(
            serialized.merges,
            vec![SerializedMerge("l".into(), "e".into(), "le".into())]
        );
    }

    #[test]
    fn test_save_writes_document() {
        let (vocab, merges) = sample();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("model.json");

        TokenizerSaver::new(&vocab, &merges).save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["vocab"]["le"], 4);
        assert_eq!(value["merges"][0], serde_json::json!(["l", "e", "le"]));
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn test_save_merges_text_layout() {
        let (vocab, merges) = sample();
        let dir = tempfile::tempdir().unwrap();

        TokenizerSaver::new(&vocab, &merges)
            .save_merges_text(dir.path())
            .unwrap();

        let merges_txt = std::fs::read_to_string(dir.path().join(MERGES_FILE)).unwrap();
        let lines: Vec<&str> = merges_txt.lines().collect();
        assert!(lines[0].starts_with(MERGES_HEADER));
        assert_eq!(&lines[1..], &["l e"]);
        assert!(dir.path().join(VOCAB_FILE).exists());
    }

    #[test]
    fn test_save_into_missing_parent_fails_with_io() {
        let (vocab, merges) = sample();
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let err = TokenizerSaver::new(&vocab, &merges)
            .save(&blocker.join("model.json"))
            .unwrap_err();
        assert!(matches!(err, TokenizerError::Io { .. }));
    }
}
