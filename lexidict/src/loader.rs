//! Word and frequency files.
//!
//! # Word files
//!
//! One entry per line, `|`-separated, fields trimmed:
//!
//! ```text
//! # comment
//! serendipity
//! ephemeral|adjective
//! lucid|adjective|easily understood
//! apple|noun|a round fruit|95|3
//! ```
//!
//! The last form carries frequency and selection count; each is applied
//! only when positive. [`save_words`] always writes that form, so a saved
//! file reloads with its counters intact.
//!
//! # Frequency files
//!
//! `word,score` per line. Scores are clamped into
//! `default_frequency..=max_frequency` and applied to words already loaded.
//!
//! Numeric fields read their leading run of digits and ignore any trailing
//! text, so `95abc` is 95 and `abc` is 0. Words of [`MAX_KEY_LEN`] bytes or
//! more are skipped: at that length the key cannot be told apart from a
//! longer word cut to fit.
//!
//! Blank lines and `#` comments are ignored in both formats. Lines that do
//! not parse are skipped and counted, never treated as errors.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use lexitree::{Record, MAX_KEY_LEN};
use tracing::{info, warn};

use crate::error::{DictError, Result};
use crate::Dictionary;

/// Outcome of loading a word file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub inserted: usize,
    /// Well-formed lines whose word was already present.
    pub duplicates: usize,
    /// Malformed lines.
    pub skipped: usize,
    /// Loading stopped early because the dictionary filled up.
    pub reached_capacity: bool,
}

/// Outcome of applying a frequency file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrequencyReport {
    pub updated: usize,
    /// Well-formed lines naming a word not in the dictionary.
    pub unknown: usize,
    /// Malformed lines.
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine<T> {
    /// Blank or comment.
    Ignored,
    Entry(T),
    Malformed,
}

/// Parse one word-file line.
pub fn parse_word_line(line: &str) -> ParsedLine<Record> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return ParsedLine::Ignored;
    }

    let mut fields = line.splitn(5, '|').map(str::trim);
    let word = fields.next().unwrap_or_default();
    // A word that fills the whole key budget may have been cut short upstream.
    if word.is_empty() || word.len() >= MAX_KEY_LEN {
        return ParsedLine::Malformed;
    }

    let mut record = Record::new(word);
    if let Some(pos) = fields.next() {
        record.part_of_speech = pos.to_string();
    }
    if let Some(meaning) = fields.next() {
        record.meaning = meaning.to_string();
    }
    // Counters only count when both are present.
    if let (Some(freq), Some(picks)) = (fields.next(), fields.next()) {
        let freq = parse_count(freq);
        let picks = parse_count(picks);
        if freq > 0 {
            record.frequency_score = freq;
        }
        if picks > 0 {
            record.selection_count = picks;
        }
    }
    ParsedLine::Entry(record)
}

/// Negative input reads as zero.
fn parse_count(field: &str) -> u32 {
    leading_int(field).clamp(0, i64::from(u32::MAX)) as u32
}

/// The signed decimal run at the start of `field`, ignoring anything after
/// it: `"95abc"` is 95, `"abc"` is 0. Saturates instead of overflowing.
fn leading_int(field: &str) -> i64 {
    let field = field.trim_start();
    let (negative, digits) = match field.as_bytes().first() {
        Some(b'-') => (true, &field[1..]),
        Some(b'+') => (false, &field[1..]),
        _ => (false, field),
    };
    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| acc.saturating_mul(10).saturating_add(i64::from(d - b'0')));
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// Parse one frequency-file line into a word and its raw score.
///
/// Only the leading number of the score counts, so `"12 extra"` is 12. A
/// score with no leading digits reads as zero and so falls back to the
/// default frequency when applied.
pub fn parse_frequency_line(line: &str) -> ParsedLine<(&str, i64)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return ParsedLine::Ignored;
    }
    let Some((word, score)) = line.split_once(',') else {
        return ParsedLine::Malformed;
    };
    let (word, score) = (word.trim(), score.trim());
    if word.is_empty() || score.is_empty() {
        return ParsedLine::Malformed;
    }
    ParsedLine::Entry((word, leading_int(score)))
}

/// Render `record` as an extended word-file line, without the newline.
///
/// Field separators and line breaks inside text fields become spaces so the
/// line always splits back into the same five fields.
pub fn format_word_line(record: &Record) -> String {
    fn clean(field: &str) -> String {
        field.replace(['|', '\n', '\r'], " ")
    }
    format!(
        "{}|{}|{}|{}|{}",
        record.key(),
        clean(&record.part_of_speech),
        clean(&record.meaning),
        record.frequency_score,
        record.selection_count
    )
}

/// Insert every entry read from `reader` into `dict`.
pub fn read_words<R: BufRead>(dict: &Dictionary, reader: R) -> Result<LoadReport> {
    let mut report = LoadReport::default();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let record = match parse_word_line(&line) {
            ParsedLine::Ignored => continue,
            ParsedLine::Malformed => {
                warn!(line = lineno + 1, "skipping malformed word line");
                report.skipped += 1;
                continue;
            }
            ParsedLine::Entry(record) => record,
        };
        if dict.is_full() {
            warn!(
                line = lineno + 1,
                max_words = dict.config().max_words,
                "dictionary full, stopping load"
            );
            report.reached_capacity = true;
            break;
        }
        if dict.insert(record) {
            report.inserted += 1;
        } else {
            report.duplicates += 1;
        }
    }
    Ok(report)
}

/// Apply every `word,score` entry read from `reader` to `dict`.
pub fn read_frequencies<R: BufRead>(dict: &Dictionary, reader: R) -> Result<FrequencyReport> {
    let mut report = FrequencyReport::default();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        match parse_frequency_line(&line) {
            ParsedLine::Ignored => {}
            ParsedLine::Malformed => {
                warn!(line = lineno + 1, "skipping malformed frequency line");
                report.skipped += 1;
            }
            ParsedLine::Entry((word, score)) => {
                if dict.set_frequency(word, score) {
                    report.updated += 1;
                } else {
                    report.unknown += 1;
                }
            }
        }
    }
    Ok(report)
}

/// Write `dict` to `writer` in unbalanced-tree pre-order, one extended line
/// per record. Returns the number of lines written.
pub fn write_words<W: Write>(dict: &Dictionary, mut writer: W) -> Result<usize> {
    let records = dict.records_pre_order();
    for record in &records {
        writeln!(writer, "{}", format_word_line(record))?;
    }
    writer.flush()?;
    Ok(records.len())
}

pub(crate) fn load_words(dict: &Dictionary, path: &Path) -> Result<LoadReport> {
    let file = File::open(path).map_err(|e| DictError::open(path, e))?;
    let report = read_words(dict, BufReader::new(file))?;
    info!(
        path = %path.display(),
        inserted = report.inserted,
        duplicates = report.duplicates,
        skipped = report.skipped,
        "loaded word file"
    );
    Ok(report)
}

pub(crate) fn load_frequencies(dict: &Dictionary, path: &Path) -> Result<FrequencyReport> {
    let file = File::open(path).map_err(|e| DictError::open(path, e))?;
    let report = read_frequencies(dict, BufReader::new(file))?;
    info!(
        path = %path.display(),
        updated = report.updated,
        unknown = report.unknown,
        skipped = report.skipped,
        "applied frequency file"
    );
    Ok(report)
}

pub(crate) fn save_words(dict: &Dictionary, path: &Path) -> Result<usize> {
    let file = File::create(path).map_err(|e| DictError::open(path, e))?;
    let written = write_words(dict, BufWriter::new(file))?;
    info!(path = %path.display(), records = written, "saved word file");
    Ok(written)
}
