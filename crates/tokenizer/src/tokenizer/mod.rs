//! Main tokenizer implementation.
//!
//! This module provides the high-level `Tokenizer` struct that ties the
//! trainer, the frozen vocabulary and merge table, and the encoder together.

use crate::io::{ModelFormat, TokenizerLoader, TokenizerSaver};
use log::debug;
use pxl_core::{CharLevelEncoder, MergePolicy, MergeTable, Result, Vocabulary};
use pxl_training::{BpeTrainer, TrainingConfig, TrainingStats};
use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;

/// Configuration for building a tokenizer.
#[derive(Debug, Clone, Default)]
pub struct TokenizerConfig {
    /// Settings handed to the trainer
    pub training: TrainingConfig,
    /// Order in which merges are applied while encoding
    pub merge_policy: MergePolicy,
}

/// Builder for creating a tokenizer.
#[derive(Debug, Clone, Default)]
pub struct TokenizerBuilder {
    config: TokenizerConfig,
}

impl TokenizerBuilder {
    /// Create a new tokenizer builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target vocabulary size, reserved symbols included.
    pub fn vocab_size(mut self, size: usize) -> Self {
        self.config.training.vocab_size = size;
        self
    }

    /// Set the minimum corpus frequency of kept tokens.
    pub fn min_frequency(mut self, freq: u64) -> Self {
        self.config.training.min_frequency = freq;
        self
    }

    /// Cap the number of merges learned by a training run.
    pub fn max_merges(mut self, max_merges: usize) -> Self {
        self.config.training.max_merges = max_merges;
        self
    }

    /// Count pairs on the rayon pool during training.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.training.parallel = parallel;
        self
    }

    /// Fail training on a corpus with no usable token.
    pub fn strict(mut self, strict: bool) -> Self {
        self.config.training.strict = strict;
        self
    }

    /// Set the merge policy used by `encode`.
    pub fn merge_policy(mut self, policy: MergePolicy) -> Self {
        self.config.merge_policy = policy;
        self
    }

    /// Build the tokenizer.
    pub fn build(self) -> Result<Tokenizer> {
        Tokenizer::new(self.config)
    }
}

/// Main tokenizer struct.
///
/// An untrained tokenizer knows only the reserved symbols and encodes every
/// character as `<UNK>`. After [`train`](Self::train) or
/// [`load`](Self::load) the tables are frozen and shared with the encoder.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    vocab: Arc<Vocabulary>,
    merges: Arc<MergeTable>,
    config: TokenizerConfig,
    encoder: CharLevelEncoder,
    stats: Option<TrainingStats>,
}

impl Tokenizer {
    /// Create an untrained tokenizer with the given configuration.
    pub fn new(config: TokenizerConfig) -> Result<Self> {
        config.training.validate()?;
        Ok(Self::from_parts(Vocabulary::new(), MergeTable::new(), config))
    }

    /// Create a tokenizer builder.
    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::new()
    }

    /// Wrap an already trained vocabulary and merge table.
    pub fn from_parts(vocab: Vocabulary, merges: MergeTable, config: TokenizerConfig) -> Self {
        let vocab = Arc::new(vocab);
        let merges = Arc::new(merges);
        let encoder = CharLevelEncoder::new(vocab.clone(), merges.clone(), config.merge_policy);
        Self {
            vocab,
            merges,
            config,
            encoder,
            stats: None,
        }
    }

    /// Train the tokenizer on a corpus, replacing any previous tables.
    pub fn train<I, S>(&mut self, corpus: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut trainer = BpeTrainer::new(self.config.training.clone());
        let (vocab, merges) = trainer.train(corpus)?;

        let trained = Self::from_parts(vocab, merges, self.config.clone());
        *self = Self {
            stats: Some(trainer.stats().clone()),
            ..trained
        };
        Ok(())
    }

    /// Statistics of the last training run, if this tokenizer was trained.
    pub fn training_stats(&self) -> Option<&TrainingStats> {
        self.stats.as_ref()
    }

    /// Encode text to token IDs.
    pub fn encode(&self, text: &str) -> Vec<u32> {
        self.encoder.encode(text)
    }

    /// Encode a batch of texts (parallelized), preserving input order.
    pub fn encode_batch<S>(&self, texts: &[S]) -> Vec<Vec<u32>>
    where
        S: AsRef<str> + Sync,
    {
        texts
            .par_iter()
            .map(|text| self.encoder.encode(text.as_ref()))
            .collect()
    }

    /// Decode token IDs back to text.
    pub fn decode(&self, ids: &[u32]) -> String {
        self.encoder.decode(ids)
    }

    /// Decode, optionally dropping `<PAD>` ids.
    pub fn decode_with(&self, ids: &[u32], skip_special: bool) -> String {
        self.encoder.decode_with(ids, skip_special)
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn merges(&self) -> &MergeTable {
        &self.merges
    }

    /// Get the vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    pub fn merge_policy(&self) -> MergePolicy {
        self.config.merge_policy
    }

    /// Switch the merge policy; the tables are shared, not copied.
    pub fn set_merge_policy(&mut self, policy: MergePolicy) {
        if policy == self.config.merge_policy {
            return;
        }
        debug!("Switching merge policy to {:?}", policy);
        self.config.merge_policy = policy;
        self.encoder = CharLevelEncoder::new(self.vocab.clone(), self.merges.clone(), policy);
    }

    /// Take the vocabulary and merge table out of the tokenizer.
    pub fn into_parts(self) -> (Vocabulary, MergeTable) {
        // Drop the encoder's handles so the tables can usually be moved out.
        drop(self.encoder);
        let vocab = Arc::try_unwrap(self.vocab).unwrap_or_else(|shared| (*shared).clone());
        let merges = Arc::try_unwrap(self.merges).unwrap_or_else(|shared| (*shared).clone());
        (vocab, merges)
    }

    /// Save the tokenizer as a single JSON document.
    pub fn save(&self, path: &Path) -> Result<()> {
        TokenizerSaver::new(&self.vocab, &self.merges).save(path)
    }

    /// Save the tokenizer in the given format.
    pub fn save_as(&self, path: &Path, format: ModelFormat) -> Result<()> {
        TokenizerSaver::new(&self.vocab, &self.merges).save_as(path, format)
    }

    /// Load a tokenizer from a JSON document.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_as(path, ModelFormat::Json)
    }

    /// Load a tokenizer stored in the given format.
    pub fn load_as(path: &Path, format: ModelFormat) -> Result<Self> {
        let (vocab, merges) = TokenizerLoader::load_as(path, format)?;
        Ok(Self::from_parts(vocab, merges, TokenizerConfig::default()))
    }

    /// Serialize to the bytes of the JSON document.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        TokenizerSaver::new(&self.vocab, &self.merges).to_bytes()
    }

    /// Deserialize from the bytes of a JSON document.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let (vocab, merges) = TokenizerLoader::from_slice(bytes)?;
        Ok(Self::from_parts(vocab, merges, TokenizerConfig::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pxl_core::{TokenizerError, PAD_ID, UNK_ID, UNK_TOKEN};
    use pxl_training::StopReason;

    const LE_CHAT: [&str; 3] = ["le chat", "le chien", "le chat noir"];

    fn trained(vocab_size: usize) -> Tokenizer {
        let mut tokenizer = Tokenizer::builder()
            .vocab_size(vocab_size)
            .min_frequency(2)
            .build()
            .unwrap();
        tokenizer.train(LE_CHAT).unwrap();
        tokenizer
    }

    #[test]
    fn test_builder() {
        let tokenizer = Tokenizer::builder()
            .vocab_size(1000)
            .min_frequency(5)
            .max_merges(10)
            .parallel(false)
            .strict(true)
            .merge_policy(MergePolicy::Ranked)
            .build()
            .unwrap();

        assert_eq!(tokenizer.vocab_size(), 2);
        assert_eq!(tokenizer.config().training.vocab_size, 1000);
        assert_eq!(tokenizer.config().training.min_frequency, 5);
        assert_eq!(tokenizer.config().training.max_merges, 10);
        assert!(!tokenizer.config().training.parallel);
        assert!(tokenizer.config().training.strict);
        assert_eq!(tokenizer.merge_policy(), MergePolicy::Ranked);
        assert!(tokenizer.training_stats().is_none());
    }

    #[test]
    fn test_builder_rejects_tiny_vocab() {
        let err = Tokenizer::builder().vocab_size(1).build().unwrap_err();
        assert!(matches!(err, TokenizerError::InvalidConfig(_)));
    }

    #[test]
    fn test_untrained_encodes_unknown() {
        let tokenizer = Tokenizer::builder().build().unwrap();
        assert_eq!(tokenizer.encode("ab"), vec![UNK_ID, UNK_ID]);
        assert_eq!(tokenizer.decode(&tokenizer.encode("ab")), "<UNK><UNK>");
    }

    #[test]
    fn test_le_chat_encoding() {
        let tokenizer = trained(50);

        assert_eq!(tokenizer.vocab_size(), 12);
        assert_eq!(tokenizer.encode("le chat"), vec![8, 11]);
        assert_eq!(tokenizer.decode(&[8, 11]), "lechat");
        assert_eq!(tokenizer.encode("chien"), vec![10, UNK_ID, 3, UNK_ID]);
        assert_eq!(tokenizer.decode(&tokenizer.encode("chien")), "ch<UNK>e<UNK>");

        let stats = tokenizer.training_stats().unwrap();
        assert_eq!(stats.stop_reason, StopReason::NoPairs);
        assert_eq!(stats.merge_frequencies, vec![3, 2, 2, 2]);
    }

    #[test]
    fn test_zero_budget_is_character_level() {
        let tokenizer = trained(8);

        assert!(tokenizer.merges().is_empty());
        assert_eq!(tokenizer.encode("chat"), vec![4, 5, 6, 7]);
        assert_eq!(tokenizer.encode("le"), vec![2, 3]);
    }

    #[test]
    fn test_known_text_decodes_without_whitespace() {
        let tokenizer = trained(50);
        for text in ["le chat", "chat le", "lechat", "t a c h e l"] {
            let ids = tokenizer.encode(text);
            assert!(!ids.contains(&UNK_ID));
            let expected: String = text.split_whitespace().collect();
            assert_eq!(tokenizer.decode(&ids), expected);
        }
    }

    #[test]
    fn test_empty_input() {
        let tokenizer = trained(50);
        assert!(tokenizer.encode("").is_empty());
        assert!(tokenizer.encode("   \n").is_empty());
        assert_eq!(tokenizer.decode(&[]), "");
    }

    #[test]
    fn test_unknown_id_decodes_to_unk() {
        let tokenizer = trained(50);
        assert_eq!(tokenizer.decode(&[8, 9999]), format!("le{}", UNK_TOKEN));
    }

    #[test]
    fn test_decode_with_skip_special() {
        let tokenizer = trained(50);
        let ids = [PAD_ID, 8, PAD_ID, UNK_ID, 11];
        assert_eq!(tokenizer.decode_with(&ids, true), "le<UNK>chat");
        assert_eq!(tokenizer.decode_with(&ids, false), "<PAD>le<PAD><UNK>chat");
    }

    #[test]
    fn test_set_merge_policy() {
        let mut vocab = Vocabulary::new();
        for s in ["a", "b", "c", "bc", "ab"] {
            vocab.add_symbol(s).unwrap();
        }
        let mut merges = MergeTable::new();
        merges.push("b", "c").unwrap();
        merges.push("a", "b").unwrap();

        let mut tokenizer = Tokenizer::from_parts(vocab, merges, TokenizerConfig::default());
        assert_eq!(tokenizer.merge_policy(), MergePolicy::FirstMatch);
        // FirstMatch takes the leftmost pair with a rule: (a, b).
        assert_eq!(tokenizer.encode("abc"), vec![6, 4]);

        tokenizer.set_merge_policy(MergePolicy::Ranked);
        assert_eq!(tokenizer.encode("abc"), vec![2, 5]);
    }

    #[test]
    fn test_encode_batch_keeps_order() {
        let tokenizer = trained(50);
        let texts = vec!["le chat", "chien", "", "le"];

        let batch = tokenizer.encode_batch(&texts);
        let single: Vec<_> = texts.iter().map(|t| tokenizer.encode(t)).collect();
        assert_eq!(batch, single);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let tokenizer = trained(50);
        let dir = tempfile::tempdir().unwrap();

        let json = dir.path().join("model.json");
        tokenizer.save(&json).unwrap();
        let loaded = Tokenizer::load(&json).unwrap();
        assert_eq!(loaded.vocab(), tokenizer.vocab());
        assert_eq!(loaded.merges(), tokenizer.merges());
        assert_eq!(loaded.encode("le chat noir"), tokenizer.encode("le chat noir"));

        let text_dir = dir.path().join("text");
        tokenizer
            .save_as(&text_dir, ModelFormat::MergesText)
            .unwrap();
        let loaded = Tokenizer::load_as(&text_dir, ModelFormat::MergesText).unwrap();
        assert_eq!(loaded.vocab(), tokenizer.vocab());
        assert_eq!(loaded.merges(), tokenizer.merges());
    }

    #[test]
    fn test_bytes_roundtrip() {
        let tokenizer = trained(50);
        let bytes = tokenizer.to_bytes().unwrap();
        let restored = Tokenizer::from_slice(&bytes).unwrap();

        let merged: Vec<_> = restored.merges().iter().map(|r| r.merged.as_str()).collect();
        assert_eq!(merged, vec!["le", "at", "ch", "chat"]);
        assert!(restored.training_stats().is_none());
    }

    #[test]
    fn test_into_parts() {
        let tokenizer = trained(50);
        let expected_vocab = tokenizer.vocab().clone();
        let (vocab, merges) = tokenizer.into_parts();
        assert_eq!(vocab, expected_vocab);
        assert_eq!(merges.len(), 4);
    }

    #[test]
    fn test_strict_empty_corpus() {
        let mut tokenizer = Tokenizer::builder().strict(true).build().unwrap();
        let err = tokenizer.train(["a b c"]).unwrap_err();
        assert!(matches!(err, TokenizerError::EmptyCorpus { min_frequency: 2 }));
        assert_eq!(tokenizer.vocab_size(), 2);
    }
}
