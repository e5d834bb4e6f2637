//! Format definitions for tokenizer serialization.
//!
//! The JSON document holds the vocabulary as an object (written in id order)
//! and the merge table as an ordered array of `[left, right, merged]`
//! triples. The merges-text format stores one pair key per line; its
//! components are escaped so that a symbol containing the separator or a
//! line break still parses back to the same two strings.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// File name of the vocabulary in the merges-text layout.
pub const VOCAB_FILE: &str = "vocab.json";
/// File name of the merge list in the merges-text layout.
pub const MERGES_FILE: &str = "merges.txt";
/// First line of every `merges.txt`.
pub const MERGES_HEADER: &str = "#version: pxl-bpe";

/// Model format types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelFormat {
    /// Single JSON document holding vocabulary and merges
    #[default]
    Json,
    /// Directory with `vocab.json` + `merges.txt`
    MergesText,
}

/// Vocabulary entries, kept in document order.
///
/// Serialized as a JSON object `{ "symbol": id, ... }`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VocabEntries(pub Vec<(String, u32)>);

impl Serialize for VocabEntries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(symbol, id)| (symbol, id)))
    }
}

impl<'de> Deserialize<'de> for VocabEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = VocabEntries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from symbol to id")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((symbol, id)) = map.next_entry::<String, u32>()? {
                    entries.push((symbol, id));
                }
                Ok(VocabEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Merge rule for serialization: `[left, right, merged]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedMerge(pub String, pub String, pub String);

/// Complete tokenizer serialization format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedTokenizer {
    /// Version of the library that wrote the document
    #[serde(default)]
    pub version: String,
    /// Vocabulary (symbol -> ID mapping)
    pub vocab: VocabEntries,
    /// Merge rules in learned order
    pub merges: Vec<SerializedMerge>,
}

/// Escape a symbol for use as one half of a pair key.
pub fn escape_symbol(symbol: &str) -> String {
    let mut out = String::with_capacity(symbol.len());
    for c in symbol.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ' ' => out.push_str("\\s"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

/// Reverse [`escape_symbol`].
pub fn unescape_symbol(escaped: &str) -> Result<String, String> {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('\\') => out.push('\\'),
                Some('s') => out.push(' '),
                Some('t') => out.push('\t'),
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some(other) => return Err(format!("unknown escape sequence '\\{}'", other)),
                None => return Err("dangling '\\' at end of symbol".to_string()),
            },
            ' ' | '\t' | '\n' | '\r' => {
                return Err(format!("unescaped whitespace {:?} in symbol", c));
            }
            c => out.push(c),
        }
    }
    if out.is_empty() {
        return Err("empty symbol".to_string());
    }
    Ok(out)
}

/// Encode a pair as a single line: `escape(left) escape(right)`.
pub fn encode_pair_key(left: &str, right: &str) -> String {
    format!("{} {}", escape_symbol(left), escape_symbol(right))
}

/// Parse a line produced by [`encode_pair_key`].
pub fn decode_pair_key(line: &str) -> Result<(String, String), String> {
    let mut parts = line.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(left), Some(right), None) => Ok((unescape_symbol(left)?, unescape_symbol(right)?)),
        _ => Err(format!("expected two space-separated symbols, got {:?}", line)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocab_entries_keep_document_order() {
        let entries = VocabEntries(vec![
            ("<UNK>".to_string(), 0),
            ("<PAD>".to_string(), 1),
            ("z".to_string(), 2),
            ("a".to_string(), 3),
        ]);

        let json = serde_json::to_string(&entries).unwrap();
        assert_eq!(json, r#"{"<UNK>":0,"<PAD>":1,"z":2,"a":3}"#);

        let parsed: VocabEntries = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entries);
    }

    #[test]
    fn test_merge_serialized_as_triple() {
        let merge = SerializedMerge("l".into(), "e".into(), "le".into());
        assert_eq!(serde_json::to_string(&merge).unwrap(), r#"["l","e","le"]"#);
    }

    #[test]
    fn test_missing_version_defaults() {
        let doc: SerializedTokenizer =
            serde_json::from_str(r#"{"vocab":{"<UNK>":0,"<PAD>":1},"merges":[]}"#).unwrap();
        assert!(doc.version.is_empty());
        assert_eq!(doc.vocab.0.len(), 2);
    }

    #[test]
    fn test_pair_key_with_delimiters() {
        let cases = [
            ("a", "b"),
            ("a b", "c"),
            ("\\", "s"),
            ("\\s", " "),
            ("x\ny", "\t\r"),
            ("##", "#"),
        ];
        for (left, right) in cases {
            let line = encode_pair_key(left, right);
            assert!(!line.contains('\n'));
            assert_eq!(
                decode_pair_key(&line).unwrap(),
                (left.to_string(), right.to_string()),
                "line {:?}",
                line
            );
        }
    }

    #[test]
    fn test_decode_pair_key_errors() {
        assert!(decode_pair_key("abc").is_err());
        assert!(decode_pair_key("a b c").is_err());
        assert!(decode_pair_key("a  b").is_err());
        assert!(decode_pair_key("a \\q").is_err());
        assert!(decode_pair_key("a b\\").is_err());
    }
}
