//! Text splitting for pre-tokenization.
//!
//! A coarse token is either a maximal run of word characters (letters,
//! digits, marks and connector punctuation such as `_`) or a single
//! character that is neither a word character nor whitespace. Whitespace
//! only separates tokens and is never emitted.

use regex::Regex;
use std::sync::OnceLock;

const COARSE_TOKEN_PATTERN: &str = r"\w+|[^\w\s]";

fn coarse_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(COARSE_TOKEN_PATTERN).expect("valid coarse token pattern"))
}

/// Splits raw text into coarse tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct Segmenter;

impl Segmenter {
    pub fn new() -> Self {
        Self
    }

    /// Lazily iterate the coarse tokens of `text`, in order.
    pub fn segment_iter<'t>(&self, text: &'t str) -> impl Iterator<Item = &'t str> + 't {
        coarse_token_regex().find_iter(text).map(|m| m.as_str())
    }

    /// Split text into coarse tokens.
    pub fn segment<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.segment_iter(text).collect()
    }
}
