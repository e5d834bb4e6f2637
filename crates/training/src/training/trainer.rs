//! BPE trainer implementation.
//!
//! Training learns merges one at a time. Every iteration recounts all
//! adjacent symbol pairs across the token splits (weighted by how often the
//! token occurs in the corpus), picks the most frequent one and rewrites the
//! splits. The full recount makes a run O(merges x corpus), which is fine for
//! vocabularies and corpora in the thousands.

use super::counter::{IdPair, PairCounter};
use super::frequencies::TokenFrequencies;
use ahash::AHashMap;
use log::{debug, info, trace, warn};
use pxl_core::{MergeTable, Result, Segmenter, TokenizerError, Vocabulary};
use std::cmp::Ordering;

/// Upper bound on merges learned in a single run.
pub const DEFAULT_MAX_MERGES: usize = 10_000;

/// Configuration for BPE training.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Target vocabulary size, reserved symbols included
    pub vocab_size: usize,
    /// Minimum corpus frequency for a coarse token to be kept, and for a
    /// pair to be merged
    pub min_frequency: u64,
    /// Hard cap on the number of merges
    pub max_merges: usize,
    /// Count pairs on the rayon pool
    pub parallel: bool,
    /// Fail with [`TokenizerError::EmptyCorpus`] instead of returning a
    /// model with only the reserved symbols
    pub strict: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            vocab_size: 10_000,
            min_frequency: 2,
            max_merges: DEFAULT_MAX_MERGES,
            parallel: true,
            strict: false,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.vocab_size < 2 {
            return Err(TokenizerError::InvalidConfig(format!(
                "vocab_size must be at least 2 to hold the reserved symbols, got {}",
                self.vocab_size
            )));
        }
        Ok(())
    }
}

/// Why the merge loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopReason {
    /// Training has not run yet
    #[default]
    NotStarted,
    /// No coarse token reached the minimum frequency
    EmptyCorpus,
    /// The merge budget was used up (or was zero to begin with)
    BudgetExhausted,
    /// Every token split collapsed to a single symbol
    NoPairs,
    /// The best remaining pair is below the minimum frequency
    BelowMinFrequency,
    /// The vocabulary reached the target size
    VocabFull,
}

/// Summary of a training run.
#[derive(Debug, Clone, Default)]
pub struct TrainingStats {
    /// Distinct coarse tokens in the corpus
    pub distinct_tokens: usize,
    /// Coarse tokens kept after the frequency filter
    pub kept_tokens: usize,
    /// Vocabulary size before the first merge
    pub initial_vocab_size: usize,
    /// Number of merges the run was allowed to learn
    pub merge_budget: usize,
    /// Weighted frequency of each learned merge, in learned order
    pub merge_frequencies: Vec<u64>,
    pub stop_reason: StopReason,
}

/// The pair chosen for the next merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MergeCandidate {
    pair: IdPair,
    count: u64,
}

impl MergeCandidate {
    /// Higher count wins; on equal counts the lexicographically smaller
    /// `(left, right)` symbol pair wins.
    fn beats(&self, other: &Self, vocab: &Vocabulary) -> bool {
        match self.count.cmp(&other.count) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => {
                let key = |pair: IdPair| (vocab.symbol_or_unk(pair.0), vocab.symbol_or_unk(pair.1));
                key(self.pair) < key(other.pair)
            }
        }
    }
}

fn select_best(pair_counts: &AHashMap<IdPair, u64>, vocab: &Vocabulary) -> Option<MergeCandidate> {
    let mut best: Option<MergeCandidate> = None;
    for (&pair, &count) in pair_counts {
        let candidate = MergeCandidate { pair, count };
        if best.map_or(true, |current| candidate.beats(&current, vocab)) {
            best = Some(candidate);
        }
    }
    best
}

/// BPE trainer.
///
/// Trains a BPE tokenizer from raw text by iteratively merging the most
/// frequent adjacent symbol pairs.
#[derive(Debug, Clone)]
pub struct BpeTrainer {
    config: TrainingConfig,
    segmenter: Segmenter,
    stats: TrainingStats,
}

impl BpeTrainer {
    /// Create a new BPE trainer with the given configuration.
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            segmenter: Segmenter::new(),
            stats: TrainingStats::default(),
        }
    }

    /// Create a new BPE trainer with default configuration.
    pub fn with_vocab_size(vocab_size: usize) -> Self {
        Self::new(TrainingConfig {
            vocab_size,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Statistics of the last call to [`train`](Self::train).
    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    /// Train on a corpus of raw text strings.
    ///
    /// # Returns
    /// The trained vocabulary and merge table
    pub fn train<I, S>(&mut self, corpus: I) -> Result<(Vocabulary, MergeTable)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.validate()?;
        self.stats = TrainingStats::default();

        let mut vocab = Vocabulary::new();
        let mut merges = MergeTable::new();

        let freqs = TokenFrequencies::from_corpus(corpus, &self.segmenter);
        self.stats.distinct_tokens = freqs.len();

        let mut counter = PairCounter::new();
        for (token, count) in freqs.iter() {
            if count >= self.config.min_frequency {
                counter.add_word(token, count, &mut vocab)?;
            }
        }
        self.stats.kept_tokens = counter.word_count();
        self.stats.initial_vocab_size = vocab.len();

        info!(
            "Training BPE: {} distinct tokens, {} kept ({} occurrences, min_frequency={}), \
             {} initial symbols",
            freqs.len(),
            counter.word_count(),
            counter.total_word_occurrences(),
            self.config.min_frequency,
            vocab.len()
        );

        if counter.word_count() == 0 {
            self.stats.stop_reason = StopReason::EmptyCorpus;
            if self.config.strict {
                return Err(TokenizerError::EmptyCorpus {
                    min_frequency: self.config.min_frequency,
                });
            }
            warn!(
                "No token occurs at least {} times; returning the reserved symbols only",
                self.config.min_frequency
            );
            return Ok((vocab, merges));
        }

        if vocab.len() > self.config.vocab_size {
            warn!(
                "Character vocabulary ({}) already exceeds the target size ({})",
                vocab.len(),
                self.config.vocab_size
            );
        }

        let budget = (self.config.vocab_size as i64 - vocab.len() as i64)
            .min(self.config.max_merges as i64)
            .max(0) as usize;
        self.stats.merge_budget = budget;
        self.stats.stop_reason = StopReason::BudgetExhausted;

        for step in 0..budget {
            let pair_counts = if self.config.parallel {
                counter.count_pairs_parallel()
            } else {
                counter.count_pairs_sequential()
            };
            trace!("Merge {}: {} distinct pairs", step, pair_counts.len());

            let Some(best) = select_best(&pair_counts, &vocab) else {
                self.stats.stop_reason = StopReason::NoPairs;
                break;
            };

            if best.count < self.config.min_frequency {
                self.stats.stop_reason = StopReason::BelowMinFrequency;
                break;
            }

            let new_id = self.learn_merge(best, &mut vocab, &mut merges)?;
            let replaced = counter.merge_pair_in_words(best.pair, new_id);
            trace!("Merge {}: rewrote {} occurrences", step, replaced);
            self.stats.merge_frequencies.push(best.count);

            if vocab.len() >= self.config.vocab_size {
                self.stats.stop_reason = StopReason::VocabFull;
                break;
            }
        }

        info!(
            "Training finished: {} merges, vocabulary size {} ({:?})",
            merges.len(),
            vocab.len(),
            self.stats.stop_reason
        );

        Ok((vocab, merges))
    }

    /// Record the merge of `candidate` and return the id of the merged symbol.
    fn learn_merge(
        &self,
        candidate: MergeCandidate,
        vocab: &mut Vocabulary,
        merges: &mut MergeTable,
    ) -> Result<u32> {
        let left = vocab.symbol_or_unk(candidate.pair.0).to_owned();
        let right = vocab.symbol_or_unk(candidate.pair.1).to_owned();

        let rank = merges.push(&left, &right)?;
        let merged = merges
            .rule(rank)
            .map(|rule| rule.merged.clone())
            .ok_or_else(|| TokenizerError::InvalidMerge(format!("rule {} vanished", rank)))?;

        // Two different pairs can spell the same string; keep its first id.
        let new_id = match vocab.get_id(&merged) {
            Some(id) => id,
            None => vocab.add_symbol(&merged)?,
        };

        debug!(
            "Merge {}: ({:?}, {:?}) -> {:?} [id {}, frequency {}]",
            rank, left, right, merged.as_str(), new_id, candidate.count
        );

        Ok(new_id)
    }
}
