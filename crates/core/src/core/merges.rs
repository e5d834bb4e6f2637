//! Merge rule management for BPE.
//!
//! Rules are kept as an ordered list (the order in which they were learned)
//! plus a hash index from the symbol pair to its rank, so encoders can either
//! test for existence or pick the highest-priority rule.

use crate::error::{Result, TokenizerError};
use ahash::AHashMap;
use compact_str::CompactString;

/// A pair of adjacent symbols.
pub type Pair = (CompactString, CompactString);

/// A single learned merge: `left` followed by `right` becomes `merged`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRule {
    pub left: CompactString,
    pub right: CompactString,
    pub merged: CompactString,
}

impl MergeRule {
    /// Create the rule merging `left` and `right` into their concatenation.
    pub fn new(left: &str, right: &str) -> Self {
        let mut merged = CompactString::with_capacity(left.len() + right.len());
        merged.push_str(left);
        merged.push_str(right);
        Self {
            left: CompactString::new(left),
            right: CompactString::new(right),
            merged,
        }
    }
}

/// Merge index: pair -> rank (position in the rule list).
pub type MergeMap = AHashMap<Pair, u32>;

/// Ordered, append-only collection of BPE merge rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeTable {
    rules: Vec<MergeRule>,
    index: MergeMap,
}

impl MergeTable {
    /// Create a new empty merge table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new merge table with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rules: Vec::with_capacity(capacity),
            index: MergeMap::with_capacity(capacity),
        }
    }

    /// Append a rule merging `left` and `right`.
    ///
    /// Returns the rank of the new rule. A pair can only be learned once.
    pub fn push(&mut self, left: &str, right: &str) -> Result<u32> {
        if left.is_empty() || right.is_empty() {
            return Err(TokenizerError::InvalidMerge(format!(
                "empty symbol in pair ({:?}, {:?})",
                left, right
            )));
        }
        let key = (CompactString::new(left), CompactString::new(right));
        if self.index.contains_key(&key) {
            return Err(TokenizerError::InvalidMerge(format!(
                "pair ({:?}, {:?}) already learned",
                left, right
            )));
        }

        let rank = self.rules.len() as u32;
        self.rules.push(MergeRule::new(left, right));
        self.index.insert(key, rank);
        Ok(rank)
    }

    /// Look up the rank and rule for a pair.
    #[inline]
    pub fn get(&self, left: &str, right: &str) -> Option<(u32, &MergeRule)> {
        // Tuple keys can't be borrowed as (&str, &str); short symbols stay inline.
        let key = (CompactString::new(left), CompactString::new(right));
        self.index
            .get(&key)
            .map(|&rank| (rank, &self.rules[rank as usize]))
    }

    /// Rank of a pair (lower = learned earlier = higher priority).
    #[inline]
    pub fn rank(&self, left: &str, right: &str) -> Option<u32> {
        self.get(left, right).map(|(rank, _)| rank)
    }

    #[inline]
    pub fn contains(&self, left: &str, right: &str) -> bool {
        self.get(left, right).is_some()
    }

    /// Rule at the given rank.
    #[inline]
    pub fn rule(&self, rank: u32) -> Option<&MergeRule> {
        self.rules.get(rank as usize)
    }

    /// Get the number of merge rules.
    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if there are no merge rules.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate rules in learned order.
    pub fn iter(&self) -> std::slice::Iter<'_, MergeRule> {
        self.rules.iter()
    }
}

impl<'a> IntoIterator for &'a MergeTable {
    type Item = &'a MergeRule;
    type IntoIter = std::slice::Iter<'a, MergeRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_get() {
        let mut table = MergeTable::new();
        assert_eq!(table.push("l", "e").unwrap(), 0);
        assert_eq!(table.push("c", "h").unwrap(), 1);

        let (rank, rule) = table.get("c", "h").unwrap();
        assert_eq!(rank, 1);
        assert_eq!(rule.merged, "ch");
        assert_eq!(table.rank("l", "e"), Some(0));
        assert!(table.get("h", "c").is_none());
    }

    #[test]
    fn test_duplicate_pair_rejected() {
        let mut table = MergeTable::new();
        table.push("a", "b").unwrap();
        assert!(matches!(
            table.push("a", "b"),
            Err(TokenizerError::InvalidMerge(_))
        ));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_same_result_from_different_pairs() {
        let mut table = MergeTable::new();
        table.push("a", "bc").unwrap();
        table.push("ab", "c").unwrap();

        assert_eq!(table.rule(0).unwrap().merged, "abc");
        assert_eq!(table.rule(1).unwrap().merged, "abc");
    }

    #[test]
    fn test_iteration_order() {
        let mut table = MergeTable::new();
        table.push("x", "y").unwrap();
        table.push("a", "b").unwrap();
        table.push("xy", "ab").unwrap();

        let merged: Vec<&str> = table.iter().map(|r| r.merged.as_str()).collect();
        assert_eq!(merged, vec!["xy", "ab", "xyab"]);
    }
}
