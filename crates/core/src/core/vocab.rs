//! Vocabulary storage and lookup.
//!
//! Symbols are stored as `CompactString` and mapped to dense ids. Ids 0 and 1
//! are bound to the reserved unknown and padding symbols before any other
//! symbol is inserted, and an id is never reassigned once handed out.

use crate::error::{Result, TokenizerError};
use ahash::AHashMap;
use compact_str::CompactString;

/// Textual form of the reserved unknown symbol.
pub const UNK_TOKEN: &str = "<UNK>";
/// Textual form of the reserved padding symbol.
pub const PAD_TOKEN: &str = "<PAD>";
/// Id of [`UNK_TOKEN`].
pub const UNK_ID: u32 = 0;
/// Id of [`PAD_TOKEN`].
pub const PAD_ID: u32 = 1;

/// Forward mapping: symbol -> ID
pub type Vocab = AHashMap<CompactString, u32>;

/// Vocabulary with forward and dense reverse mappings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    /// Forward mapping: symbol -> ID
    vocab: Vocab,
    /// Reverse mapping, indexed by ID
    vocab_r: Vec<CompactString>,
}

impl Vocabulary {
    /// Create a vocabulary holding only the two reserved symbols.
    pub fn new() -> Self {
        Self::with_capacity(2)
    }

    /// Create a vocabulary with capacity, reserved symbols included.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut vocab = Self {
            vocab: Vocab::with_capacity(capacity.max(2)),
            vocab_r: Vec::with_capacity(capacity.max(2)),
        };
        vocab.push(CompactString::new(UNK_TOKEN));
        vocab.push(CompactString::new(PAD_TOKEN));
        vocab
    }

    /// Rebuild a vocabulary from explicit `(symbol, id)` entries.
    ///
    /// Entries may come in any order but the ids must form the dense range
    /// `0..n` with the reserved symbols at their fixed ids.
    pub fn from_entries<S, I>(entries: I) -> Result<Self>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = (S, u32)>,
    {
        let entries: Vec<(S, u32)> = entries.into_iter().collect();
        let n = entries.len();
        let mut slots: Vec<Option<CompactString>> = vec![None; n];
        for (symbol, id) in &entries {
            let symbol = symbol.as_ref();
            let field = format!("vocab[{:?}]", symbol);
            if symbol.is_empty() {
                return Err(TokenizerError::format(field, "empty symbol"));
            }
            let idx = *id as usize;
            if idx >= n {
                return Err(TokenizerError::format(
                    field,
                    format!("id {} out of range for {} entries", id, n),
                ));
            }
            if let Some(existing) = &slots[idx] {
                return Err(TokenizerError::format(
                    field,
                    format!("id {} already bound to {:?}", id, existing.as_str()),
                ));
            }
            slots[idx] = Some(CompactString::new(symbol));
        }

        let mut vocab = Self {
            vocab: Vocab::with_capacity(slots.len()),
            vocab_r: Vec::with_capacity(slots.len()),
        };
        // Ids are unique and below `n`, so every slot is filled.
        for symbol in slots.into_iter().flatten() {
            if vocab.vocab.contains_key(&symbol) {
                return Err(TokenizerError::format(
                    format!("vocab[{:?}]", symbol.as_str()),
                    "symbol bound to more than one id",
                ));
            }
            vocab.push(symbol);
        }

        for (expected, id) in [(UNK_TOKEN, UNK_ID), (PAD_TOKEN, PAD_ID)] {
            if vocab.get_symbol(id) != Some(expected) {
                return Err(TokenizerError::format(
                    format!("vocab[{:?}]", expected),
                    format!("reserved symbol must have id {}", id),
                ));
            }
        }

        Ok(vocab)
    }

    fn push(&mut self, symbol: CompactString) -> u32 {
        let id = self.vocab_r.len() as u32;
        self.vocab.insert(symbol.clone(), id);
        self.vocab_r.push(symbol);
        id
    }

    /// Add a symbol to the vocabulary.
    ///
    /// Returns the ID of the symbol, assigning the next free one if the
    /// symbol was not present yet.
    pub fn add_symbol(&mut self, symbol: &str) -> Result<u32> {
        if let Some(&id) = self.vocab.get(symbol) {
            return Ok(id);
        }
        if symbol.is_empty() {
            return Err(TokenizerError::InvalidConfig(
                "cannot add an empty symbol".to_string(),
            ));
        }
        if self.vocab_r.len() >= u32::MAX as usize {
            return Err(TokenizerError::InvalidConfig(
                "vocabulary id space exhausted".to_string(),
            ));
        }
        Ok(self.push(CompactString::new(symbol)))
    }

    /// Get the ID for a symbol.
    #[inline]
    pub fn get_id(&self, symbol: &str) -> Option<u32> {
        self.vocab.get(symbol).copied()
    }

    /// Get the ID for a symbol, falling back to [`UNK_ID`].
    #[inline]
    pub fn id_or_unk(&self, symbol: &str) -> u32 {
        self.get_id(symbol).unwrap_or(UNK_ID)
    }

    /// Get the symbol for an ID.
    #[inline]
    pub fn get_symbol(&self, id: u32) -> Option<&str> {
        self.vocab_r.get(id as usize).map(|s| s.as_str())
    }

    /// Get the symbol for an ID, falling back to [`UNK_TOKEN`].
    #[inline]
    pub fn symbol_or_unk(&self, id: u32) -> &str {
        self.get_symbol(id).unwrap_or(UNK_TOKEN)
    }

    #[inline]
    pub fn contains(&self, symbol: &str) -> bool {
        self.vocab.contains_key(symbol)
    }

    /// Get the size of the vocabulary.
    #[inline]
    pub fn len(&self) -> usize {
        self.vocab_r.len()
    }

    /// A vocabulary always holds the reserved symbols, so this is only true
    /// for a value that was never constructed through the public API.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vocab_r.is_empty()
    }

    /// Iterate `(id, symbol)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.vocab_r
            .iter()
            .enumerate()
            .map(|(id, s)| (id as u32, s.as_str()))
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}
