//! Pair counting for BPE training.
//!
//! The counter owns the token splits: one symbol-id sequence per distinct
//! coarse token, together with that token's corpus frequency. Pair counts
//! are recomputed from scratch on demand, weighted by token frequency, and
//! merges rewrite the splits in place.

use ahash::AHashMap;
use pxl_core::{Result, Vocabulary};

/// A pair of adjacent symbol IDs.
pub type IdPair = (u32, u32);

/// Counter for BPE pair frequencies.
#[derive(Debug, Default)]
pub struct PairCounter {
    /// Token splits, indexed by token type
    words: Vec<Vec<u32>>,
    /// Corpus frequency of each token type
    word_counts: Vec<u64>,
}

impl PairCounter {
    /// Create a new pair counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a coarse token occurring `count` times in the corpus.
    ///
    /// The token is split into one symbol per character; characters the
    /// vocabulary has not seen yet are registered in encounter order.
    pub fn add_word(&mut self, word: &str, count: u64, vocab: &mut Vocabulary) -> Result<()> {
        let mut buf = [0u8; 4];
        let mut split = Vec::with_capacity(word.len());
        for c in word.chars() {
            split.push(vocab.add_symbol(c.encode_utf8(&mut buf))?);
        }

        self.words.push(split);
        self.word_counts.push(count);
        Ok(())
    }

    /// Count all pairs in parallel.
    ///
    /// Each rayon worker folds its shard into a local map; the maps are then
    /// reduced into one. The totals are identical to
    /// [`count_pairs_sequential`](Self::count_pairs_sequential).
    pub fn count_pairs_parallel(&self) -> AHashMap<IdPair, u64> {
        use rayon::prelude::*;

        self.words
            .par_iter()
            .zip(self.word_counts.par_iter())
            .fold(AHashMap::new, |mut acc, (word, &count)| {
                for window in word.windows(2) {
                    *acc.entry((window[0], window[1])).or_insert(0) += count;
                }
                acc
            })
            .reduce(AHashMap::new, |mut acc, pair_counts| {
                for (pair, count) in pair_counts {
                    *acc.entry(pair).or_insert(0) += count;
                }
                acc
            })
    }

    /// Count all pairs sequentially.
    pub fn count_pairs_sequential(&self) -> AHashMap<IdPair, u64> {
        let mut pair_counts: AHashMap<IdPair, u64> = AHashMap::new();

        for (word, &count) in self.words.iter().zip(self.word_counts.iter()) {
            for window in word.windows(2) {
                *pair_counts.entry((window[0], window[1])).or_insert(0) += count;
            }
        }

        pair_counts
    }

    /// Replace every occurrence of `pair` with `new_id`, in all splits.
    ///
    /// Occurrences are matched left to right without overlap: after a
    /// replacement the scan resumes right after the merged symbol, so
    /// `a a a` merged on `(a, a)` becomes `aa a`.
    ///
    /// Returns the number of replacements made.
    pub fn merge_pair_in_words(&mut self, pair: IdPair, new_id: u32) -> usize {
        let mut replaced = 0;

        for word in &mut self.words {
            if word.len() < 2 {
                continue;
            }

            let mut i = 0;
            while i + 1 < word.len() {
                if word[i] == pair.0 && word[i + 1] == pair.1 {
                    word[i] = new_id;
                    word.remove(i + 1);
                    replaced += 1;
                }
                i += 1;
            }
        }

        replaced
    }

    /// Get the number of token types.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Get the total count of all token occurrences.
    pub fn total_word_occurrences(&self) -> u64 {
        self.word_counts.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter_with(words: &[(&str, u64)]) -> (PairCounter, Vocabulary) {
        let mut vocab = Vocabulary::new();
        let mut counter = PairCounter::new();
        for (word, count) in words {
            counter.add_word(word, *count, &mut vocab).unwrap();
        }
        (counter, vocab)
    }

    #[test]
    fn test_add_word_registers_chars_in_order() {
        let (counter, vocab) = counter_with(&[("abca", 1)]);

        assert_eq!(counter.word_count(), 1);
        assert_eq!(counter.words[0].as_slice(), &[2, 3, 4, 2]);
        assert_eq!(vocab.get_symbol(4), Some("c"));
        assert_eq!(vocab.len(), 5);
    }

    #[test]
    fn test_count_pairs_sequential() {
        let (counter, _) = counter_with(&[("ab", 1), ("bc", 1)]);

        let pairs = counter.count_pairs_sequential();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs.get(&(2, 3)), Some(&1));
        assert_eq!(pairs.get(&(3, 4)), Some(&1));
    }

    #[test]
    fn test_count_pairs_weighted_by_frequency() {
        let (counter, _) = counter_with(&[("ab", 3), ("abab", 2)]);

        let pairs = counter.count_pairs_sequential();
        // 3 from "ab", 2 * 2 from "abab"
        assert_eq!(pairs.get(&(2, 3)), Some(&7));
        assert_eq!(pairs.get(&(3, 2)), Some(&2));
        assert_eq!(counter.total_word_occurrences(), 5);
    }

    #[test]
    fn test_count_pairs_parallel_matches_sequential() {
        let (counter, _) = counter_with(&[("abc", 1), ("bcd", 4), ("cde", 2), ("x", 9)]);

        assert_eq!(
            counter.count_pairs_parallel(),
            counter.count_pairs_sequential()
        );
    }

    #[test]
    fn test_merge_is_non_overlapping() {
        let (mut counter, mut vocab) = counter_with(&[("aaa", 1), ("aaaa", 1)]);
        let a = vocab.get_id("a").unwrap();
        let aa = vocab.add_symbol("aa").unwrap();

        let replaced = counter.merge_pair_in_words((a, a), aa);

        assert_eq!(replaced, 3);
        assert_eq!(counter.words[0], vec![aa, a]);
        assert_eq!(counter.words[1], vec![aa, aa]);
    }

    #[test]
    fn test_merge_leaves_other_pairs() {
        let (mut counter, mut vocab) = counter_with(&[("abcab", 1)]);
        let a = vocab.get_id("a").unwrap();
        let b = vocab.get_id("b").unwrap();
        let c = vocab.get_id("c").unwrap();
        let ab = vocab.add_symbol("ab").unwrap();

        counter.merge_pair_in_words((a, b), ab);

        assert_eq!(counter.words[0], vec![ab, c, ab]);
    }
}
