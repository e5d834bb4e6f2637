//! Corpus-wide coarse token frequencies.

use ahash::AHashMap;
use compact_str::CompactString;
use pxl_core::Segmenter;

/// Occurrence count of every coarse token, in first-seen order.
#[derive(Debug, Default)]
pub struct TokenFrequencies {
    index: AHashMap<CompactString, usize>,
    entries: Vec<(CompactString, u64)>,
}

impl TokenFrequencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Segment every corpus string and count its coarse tokens.
    pub fn from_corpus<I, S>(corpus: I, segmenter: &Segmenter) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut freqs = Self::new();
        for text in corpus {
            for token in segmenter.segment_iter(text.as_ref()) {
                freqs.add(token);
            }
        }
        freqs
    }

    /// Record one occurrence of `token`.
    pub fn add(&mut self, token: &str) {
        match self.index.get(token) {
            Some(&pos) => self.entries[pos].1 += 1,
            None => {
                let token = CompactString::new(token);
                self.index.insert(token.clone(), self.entries.len());
                self.entries.push((token, 1));
            }
        }
    }

    /// Number of distinct coarse tokens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(token, count)` in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.entries.iter().map(|(t, c)| (t.as_str(), *c))
    }
}
