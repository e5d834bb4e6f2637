//! Character-level BPE encoding.
//!
//! Every coarse token starts as one symbol per `char`; learned merges are
//! then applied according to a [`MergePolicy`] and the surviving symbols are
//! looked up in the vocabulary. Symbols the vocabulary does not know map to
//! [`UNK_ID`](crate::core::vocab::UNK_ID).

use crate::core::merges::MergeTable;
use crate::core::vocab::{Vocabulary, PAD_ID};
use crate::pre_tokenizer::Segmenter;
use compact_str::CompactString;
use std::sync::Arc;

/// Order in which merge rules are applied while encoding a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Merge the leftmost adjacent pair that has any rule, then rescan from
    /// the start. Rule ranks are ignored.
    #[default]
    FirstMatch,
    /// Merge the adjacent pair with the lowest learned rank (leftmost on a
    /// tie), as in canonical BPE.
    Ranked,
}

/// Character-level BPE encoder.
///
/// Vocabulary and merge table are frozen and shared through `Arc`, so the
/// encoder is cheap to clone across threads.
#[derive(Debug, Clone)]
pub struct CharLevelEncoder {
    vocab: Arc<Vocabulary>,
    merges: Arc<MergeTable>,
    policy: MergePolicy,
    segmenter: Segmenter,
}

impl CharLevelEncoder {
    /// Create a new character-level encoder.
    pub fn new(vocab: Arc<Vocabulary>, merges: Arc<MergeTable>, policy: MergePolicy) -> Self {
        Self {
            vocab,
            merges,
            policy,
            segmenter: Segmenter::new(),
        }
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn merges(&self) -> &MergeTable {
        &self.merges
    }

    /// Encode text to token IDs.
    ///
    /// The text is segmented into coarse tokens, each token is encoded on its
    /// own and the ids are concatenated in token order.
    pub fn encode(&self, text: &str) -> Vec<u32> {
        let mut ids = Vec::with_capacity(text.len());
        for token in self.segmenter.segment_iter(text) {
            self.encode_token_into(token, &mut ids);
        }
        ids
    }

    fn encode_token_into(&self, token: &str, out: &mut Vec<u32>) {
        let symbols = self.split_token(token);
        out.extend(symbols.iter().map(|s| self.vocab.id_or_unk(s)));
    }

    /// Split a coarse token into its final symbols.
    pub fn split_token(&self, token: &str) -> Vec<CompactString> {
        let mut buf = [0u8; 4];
        let mut symbols: Vec<CompactString> = token
            .chars()
            .map(|c| CompactString::new(c.encode_utf8(&mut buf)))
            .collect();
        match self.policy {
            MergePolicy::FirstMatch => self.merge_first_match(&mut symbols),
            MergePolicy::Ranked => self.merge_ranked(&mut symbols),
        }
        symbols
    }

    fn merge_first_match(&self, symbols: &mut Vec<CompactString>) {
        'rescan: while symbols.len() > 1 {
            for i in 0..symbols.len() - 1 {
                if let Some((_, rule)) = self.merges.get(&symbols[i], &symbols[i + 1]) {
                    symbols[i] = rule.merged.clone();
                    symbols.remove(i + 1);
                    continue 'rescan;
                }
            }
            break;
        }
    }

    fn merge_ranked(&self, symbols: &mut Vec<CompactString>) {
        while symbols.len() > 1 {
            let mut best: Option<(u32, usize)> = None;
            for i in 0..symbols.len() - 1 {
                if let Some(rank) = self.merges.rank(&symbols[i], &symbols[i + 1]) {
                    if best.map_or(true, |(best_rank, _)| rank < best_rank) {
                        best = Some((rank, i));
                    }
                }
            }

            let Some((rank, i)) = best else { break };
            let merged = match self.merges.rule(rank) {
                Some(rule) => rule.merged.clone(),
                None => break,
            };
            symbols[i] = merged;
            symbols.remove(i + 1);
        }
    }

    /// Decode token IDs back to text.
    ///
    /// Symbols are concatenated without separators; ids missing from the
    /// vocabulary decode to the literal unknown symbol.
    pub fn decode(&self, ids: &[u32]) -> String {
        self.decode_with(ids, false)
    }

    /// Decode token IDs, optionally dropping padding ids.
    pub fn decode_with(&self, ids: &[u32], skip_special: bool) -> String {
        ids.iter()
            .filter(|&&id| !(skip_special && id == PAD_ID))
            .map(|&id| self.vocab.symbol_or_unk(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vocab::{PAD_TOKEN, UNK_ID, UNK_TOKEN};

    fn encoder(symbols: &[&str], merges: &[(&str, &str)], policy: MergePolicy) -> CharLevelEncoder {
        let mut vocab = Vocabulary::new();
        for s in symbols {
            vocab.add_symbol(s).unwrap();
        }
        let mut table = MergeTable::new();
        for (l, r) in merges {
            table.push(l, r).unwrap();
            vocab.add_symbol(&format!("{}{}", l, r)).unwrap();
        }
        CharLevelEncoder::new(Arc::new(vocab), Arc::new(table), policy)
    }

    #[test]
    fn test_encode_without_merges() {
        let enc = encoder(&["h", "e", "l", "o"], &[], MergePolicy::FirstMatch);
        let ids = enc.encode("hello");
        assert_eq!(ids, vec![2, 3, 4, 4, 5]);
        assert_eq!(enc.decode(&ids), "hello");
    }

    #[test]
    fn test_encode_applies_merges() {
        let enc = encoder(
            &["l", "e", "c", "h"],
            &[("l", "e"), ("c", "h")],
            MergePolicy::FirstMatch,
        );
        let le = enc.vocab().get_id("le").unwrap();
        let ch = enc.vocab().get_id("ch").unwrap();
        assert_eq!(enc.encode("le"), vec![le]);
        assert_eq!(enc.encode("le ch ,"), vec![le, ch, UNK_ID]);
    }

    #[test]
    fn test_unknown_character_maps_to_unk() {
        let enc = encoder(&["a"], &[], MergePolicy::FirstMatch);
        let ids = enc.encode("aza");
        assert_eq!(ids, vec![2, UNK_ID, 2]);
        assert_eq!(enc.decode(&ids), format!("a{}a", UNK_TOKEN));
    }

    #[test]
    fn test_unknown_id_decodes_to_unk() {
        let enc = encoder(&["a"], &[], MergePolicy::FirstMatch);
        assert_eq!(enc.decode(&[2, 999]), format!("a{}", UNK_TOKEN));
    }

    #[test]
    fn test_empty_input() {
        let enc = encoder(&["a"], &[], MergePolicy::FirstMatch);
        assert!(enc.encode("").is_empty());
        assert_eq!(enc.decode(&[]), "");
    }

    #[test]
    fn test_first_match_differs_from_ranked() {
        // (b, c) was learned first, but first-match sees (a, b) at position 0.
        let symbols = ["a", "b", "c"];
        let merges = [("b", "c"), ("a", "b")];

        let first = encoder(&symbols, &merges, MergePolicy::FirstMatch);
        assert_eq!(first.split_token("abc"), vec!["ab", "c"]);

        let ranked = encoder(&symbols, &merges, MergePolicy::Ranked);
        assert_eq!(ranked.split_token("abc"), vec!["a", "bc"]);
    }

    #[test]
    fn test_first_match_rescans_from_start() {
        let enc = encoder(
            &["a", "b"],
            &[("a", "b"), ("ab", "ab")],
            MergePolicy::FirstMatch,
        );
        assert_eq!(enc.split_token("abab"), vec!["abab"]);
    }

    #[test]
    fn test_decode_skip_special() {
        let enc = encoder(&["a"], &[], MergePolicy::FirstMatch);
        assert_eq!(enc.decode(&[2, 1, 2]), format!("a{}a", PAD_TOKEN));
        assert_eq!(enc.decode_with(&[2, 1, 2], true), "aa");
        assert_eq!(enc.decode_with(&[0], true), UNK_TOKEN);
    }
}
