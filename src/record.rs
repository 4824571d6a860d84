//! The key/value payload stored at every node of every tree.

use std::cmp::Ordering;
use std::ops::Deref;

/// Longest key kept after normalization, in bytes.
pub const MAX_KEY_LEN: usize = 63;

/// Frequency assigned to a record built without corpus data.
pub const FREQ_SCORE_DEFAULT: u32 = 1;

/// Weight of one user selection in [`Record::composite_score`].
pub const SELECTION_WEIGHT: u64 = 10;

/// Canonicalize a key or prefix: ASCII-lowercase, then cut to
/// [`MAX_KEY_LEN`] bytes on a char boundary.
pub fn normalize_key(raw: &str) -> String {
    let mut end = raw.len().min(MAX_KEY_LEN);
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    raw[..end].to_ascii_lowercase()
}

/// Compare the first `prefix.len()` bytes of `key` against `prefix`.
///
/// `Equal` means `key` starts with `prefix`. A key that is itself a proper
/// prefix of `prefix` sorts `Less`.
#[inline]
pub(crate) fn prefix_cmp(key: &str, prefix: &str) -> Ordering {
    let key = key.as_bytes();
    let head = &key[..key.len().min(prefix.len())];
    head.cmp(prefix.as_bytes())
}

/// A dictionary entry.
///
/// The key is normalized on construction and cannot change afterwards; the
/// remaining fields are opaque payload plus the two ranking counters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    key: String,
    /// Free-form definition text.
    pub meaning: String,
    /// Free-form grammatical tag.
    pub part_of_speech: String,
    /// Corpus frequency.
    pub frequency_score: u32,
    /// Number of times a user picked this entry from a suggestion list.
    pub selection_count: u32,
}

impl Record {
    pub fn new(key: &str) -> Self {
        Self {
            key: normalize_key(key),
            meaning: String::new(),
            part_of_speech: String::new(),
            frequency_score: FREQ_SCORE_DEFAULT,
            selection_count: 0,
        }
    }

    pub fn with_meaning(mut self, meaning: impl Into<String>) -> Self {
        self.meaning = meaning.into();
        self
    }

    pub fn with_part_of_speech(mut self, part_of_speech: impl Into<String>) -> Self {
        self.part_of_speech = part_of_speech.into();
        self
    }

    pub fn with_frequency(mut self, frequency_score: u32) -> Self {
        self.frequency_score = frequency_score;
        self
    }

    pub fn with_selections(mut self, selection_count: u32) -> Self {
        self.selection_count = selection_count;
        self
    }

    /// The normalized key.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// `frequency_score + 10 × selection_count`. Used for ranking only,
    /// never for ordering.
    #[inline]
    pub fn composite_score(&self) -> u64 {
        u64::from(self.frequency_score) + SELECTION_WEIGHT * u64::from(self.selection_count)
    }

    /// Placeholder left behind when a record is moved out of a node that is
    /// about to be released.
    pub(crate) fn vacant() -> Self {
        Self {
            key: String::new(),
            meaning: String::new(),
            part_of_speech: String::new(),
            frequency_score: 0,
            selection_count: 0,
        }
    }
}

/// Mutable handle to a record living inside a tree.
///
/// Exposes the payload and counters but not the key, so the tree's ordering
/// cannot be disturbed through it.
pub struct RecordMut<'a> {
    record: &'a mut Record,
}

impl<'a> RecordMut<'a> {
    #[inline]
    pub(crate) fn new(record: &'a mut Record) -> Self {
        Self { record }
    }

    pub fn set_frequency_score(&mut self, frequency_score: u32) {
        self.record.frequency_score = frequency_score;
    }

    pub fn set_selection_count(&mut self, selection_count: u32) {
        self.record.selection_count = selection_count;
    }

    /// Count one more user pick. Saturates instead of wrapping.
    pub fn record_selection(&mut self) {
        self.record.selection_count = self.record.selection_count.saturating_add(1);
    }

    pub fn set_meaning(&mut self, meaning: impl Into<String>) {
        self.record.meaning = meaning.into();
    }

    pub fn set_part_of_speech(&mut self, part_of_speech: impl Into<String>) {
        self.record.part_of_speech = part_of_speech.into();
    }
}

impl Deref for RecordMut<'_> {
    type Target = Record;

    fn deref(&self) -> &Record {
        self.record
    }
}
