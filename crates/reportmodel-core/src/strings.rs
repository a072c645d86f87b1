//! String interning for the report model.
//!
//! Every text field of the model is stored once per document in a string
//! table and referenced by its [`StringIndex`]. Entries are kept in one of
//! two encodings:
//!
//! | Form       | Layout                                   |
//! |------------|------------------------------------------|
//! | marked     | `*` followed by the raw text             |
//! | compressed | base64 of the zlib-compressed raw text   |
//!
//! Entry 0 is always the bare marker `*` and stands for the empty string.
//! Base64 output never starts with `*`, so the viewer tells the two forms
//! apart by the first character.

use crate::errors::DecodeError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::io::{Read, Write};

/// Marker prefixed to every uncompressed entry.
pub const MARKER: char = '*';

/// Default marked length (in characters) from which compression is attempted.
pub const DEFAULT_COMPRESS_THRESHOLD: usize = 80;

/// Compressed form is used only when `compressed_len * margin < marked_len`.
pub const DEFAULT_COMPRESS_MARGIN: f64 = 1.1;

/// Position of an entry in a string table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StringIndex(u32);

impl StringIndex {
    /// Index of the empty string in every table.
    pub const EMPTY: StringIndex = StringIndex(0);

    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Decimal rendering used when the model is written as text.
    pub fn to_text(self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for StringIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Insertion-ordered interning table.
///
/// The only mutating operation is [`StringCache::add`]; the table is consumed
/// by [`StringCache::dump`] once the owning build is finished.
#[derive(Debug, Clone)]
pub struct StringCache {
    ids: HashMap<String, StringIndex>,
    entries: Vec<String>,
    compress_threshold: usize,
    compress_margin: f64,
}

impl Default for StringCache {
    fn default() -> Self {
        Self::with_compression(DEFAULT_COMPRESS_THRESHOLD, DEFAULT_COMPRESS_MARGIN)
    }
}

impl StringCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compression(compress_threshold: usize, compress_margin: f64) -> Self {
        let empty = MARKER.to_string();
        let mut ids = HashMap::new();
        ids.insert(empty.clone(), StringIndex::EMPTY);
        Self {
            ids,
            entries: vec![empty],
            compress_threshold,
            compress_margin,
        }
    }

    /// Intern `text`, returning the index of its encoded form.
    ///
    /// Empty text always maps to [`StringIndex::EMPTY`] without touching the table.
    pub fn add(&mut self, text: &str) -> StringIndex {
        if text.is_empty() {
            return StringIndex::EMPTY;
        }
        let encoded = self.encode(text);
        if let Some(index) = self.ids.get(&encoded) {
            return *index;
        }
        let index = StringIndex(self.entries.len() as u32);
        self.ids.insert(encoded.clone(), index);
        self.entries.push(encoded);
        index
    }

    /// Consume the cache, returning the encoded entries ordered by index.
    pub fn dump(self) -> Vec<String> {
        self.entries
    }

    fn encode(&self, text: &str) -> String {
        let mut marked = String::with_capacity(text.len() + 1);
        marked.push(MARKER);
        marked.push_str(text);

        let marked_len = marked.chars().count();
        if marked_len < self.compress_threshold || self.ids.contains_key(&marked) {
            return marked;
        }
        match compress_text(text) {
            Ok(compressed) if (compressed.len() as f64) * self.compress_margin < marked_len as f64 => {
                compressed
            }
            Ok(_) => marked,
            Err(e) => {
                tracing::warn!(error = %e, "string compression failed, keeping raw form");
                marked
            }
        }
    }
}

/// zlib-compress (best level) and base64-encode `text`.
pub fn compress_text(text: &str) -> std::io::Result<String> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(text.as_bytes())?;
    let compressed = encoder.finish()?;
    Ok(STANDARD.encode(compressed))
}

/// Recover the original text of a dumped entry.
pub fn decode_entry(entry: &str) -> Result<String, DecodeError> {
    if let Some(raw) = entry.strip_prefix(MARKER) {
        return Ok(raw.to_string());
    }
    let bytes = STANDARD.decode(entry)?;
    let mut decoder = ZlibDecoder::new(bytes.as_slice());
    let mut inflated = Vec::new();
    decoder.read_to_end(&mut inflated)?;
    Ok(String::from_utf8(inflated)?)
}

/// Read-only view over a dumped table, resolving indices to text.
#[derive(Debug, Clone, Copy)]
pub struct StringTable<'a> {
    entries: &'a [String],
}

impl<'a> StringTable<'a> {
    pub fn new(entries: &'a [String]) -> Self {
        Self { entries }
    }

    pub fn resolve(&self, index: StringIndex) -> Result<String, DecodeError> {
        let entry = self
            .entries
            .get(index.get())
            .ok_or(DecodeError::OutOfRange {
                index: index.get(),
                len: self.entries.len(),
            })?;
        decode_entry(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_text() -> String {
        "long documentation that repeats itself. ".repeat(10)
    }

    #[test]
    fn test_empty_is_index_zero() {
        let mut cache = StringCache::new();
        assert_eq!(cache.add(""), StringIndex::EMPTY);
        assert_eq!(cache.add(""), StringIndex::EMPTY);
        assert_eq!(cache.dump(), vec!["*".to_string()]);
    }

    #[test]
    fn test_first_seen_order() {
        let mut cache = StringCache::new();
        assert_eq!(cache.add("a").get(), 1);
        assert_eq!(cache.add("b").get(), 2);
        assert_eq!(cache.add("a").get(), 1);
        assert_eq!(cache.add("c").get(), 3);
        assert_eq!(cache.dump(), vec!["*", "*a", "*b", "*c"]);
    }

    #[test]
    fn test_short_text_is_never_compressed() {
        let mut cache = StringCache::new();
        let text = "x".repeat(78);
        cache.add(&text);
        let dump = cache.dump();
        assert_eq!(dump[1], format!("*{}", text));
    }

    #[test]
    fn test_compression_starts_at_threshold() {
        // Marked length 80: at the threshold, so compression is attempted.
        let text = "x".repeat(79);
        let mut cache = StringCache::new();
        cache.add(&text);
        let dump = cache.dump();
        assert!(!dump[1].starts_with(MARKER));
        assert_eq!(decode_entry(&dump[1]).unwrap(), text);
    }

    #[test]
    fn test_margin_comparison_is_strict() {
        // Find a text whose marked length is an exact multiple of its
        // compressed length, so the margin product is exact.
        let (text, ratio) = (100..400)
            .map(|n| "x".repeat(n))
            .find_map(|text| {
                let compressed = compress_text(&text).unwrap().len();
                let marked = text.chars().count() + 1;
                (marked % compressed == 0).then(|| (text, (marked / compressed) as f64))
            })
            .expect("some length divides evenly");

        let mut equal = StringCache::with_compression(1, ratio);
        equal.add(&text);
        assert_eq!(equal.dump()[1], format!("*{}", text));

        let mut below = StringCache::with_compression(1, ratio - 0.5);
        below.add(&text);
        let dump = below.dump();
        assert!(!dump[1].starts_with(MARKER));
        assert_eq!(decode_entry(&dump[1]).unwrap(), text);
    }

    #[test]
    fn test_long_repetitive_text_is_compressed() {
        let text = long_text();
        let mut cache = StringCache::new();
        let index = cache.add(&text);
        assert_eq!(cache.add(&text), index);
        let dump = cache.dump();
        assert!(!dump[1].starts_with(MARKER));
        assert!(dump[1].len() < text.len());
        assert_eq!(decode_entry(&dump[1]).unwrap(), text);
    }

    #[test]
    fn test_incompressible_text_keeps_marked_form() {
        // Every character distinct: zlib + base64 cannot win by 10%.
        let text: String = (0x4e00u32..0x4e00 + 90)
            .filter_map(char::from_u32)
            .collect();
        let mut cache = StringCache::new();
        cache.add(&text);
        assert_eq!(cache.dump()[1], format!("*{}", text));
    }

    #[test]
    fn test_threshold_is_configurable() {
        let mut cache = StringCache::with_compression(10, 1.1);
        cache.add(&"abc".repeat(20));
        let dump = cache.dump();
        assert!(!dump[1].starts_with(MARKER));
        assert_eq!(decode_entry(&dump[1]).unwrap(), "abc".repeat(20));
    }

    #[test]
    fn test_table_resolves_indices() {
        let mut cache = StringCache::new();
        let a = cache.add("alpha");
        let long = cache.add(&long_text());
        let dump = cache.dump();
        let table = StringTable::new(&dump);
        assert_eq!(table.resolve(StringIndex::EMPTY).unwrap(), "");
        assert_eq!(table.resolve(a).unwrap(), "alpha");
        assert_eq!(table.resolve(long).unwrap(), long_text());
        assert!(matches!(
            table.resolve(StringIndex::new(9)),
            Err(DecodeError::OutOfRange { index: 9, len: 3 })
        ));
    }

    #[test]
    fn test_index_text_rendering() {
        assert_eq!(StringIndex::new(42).to_text(), "42");
        assert_eq!(format!("{}", StringIndex::EMPTY), "0");
    }

    #[test]
    fn test_invalid_compressed_entry() {
        assert!(matches!(
            decode_entry("not base64!"),
            Err(DecodeError::Base64(_))
        ));
    }
}
