//! `{{key}}` placeholder substitution.
//!
//! Every module that ends up in the page or in a bundle passes through the
//! [`Translator`]. It copies text line by line, replacing each complete
//! `{{key}}` pair found on a line:
//!
//! | Placeholder | Table entry | Output | Missing key |
//! |-------------|-------------|--------|-------------|
//! | `{{ui::Save}}` | `ui::Save = Uložit` | `Uložit` | – |
//! | `{{ui::Save}}` | none | `Save` | `ui::Save` |
//! | `{{Close}}` | none | `Close` | `Close` |
//! | `{{}}` | none | nothing | – |
//! | `{{!timestamp}}` | – | `1767225600` | – |
//!
//! The key is the exact text between the braces, so `{{ Save }}` looks up
//! `" Save "`. Only the text after the last `::` is shown when a key is
//! missing. A `{{` without a closing `}}` on the same line is copied as-is;
//! placeholders cannot span lines.
//!
//! Text is handled as bytes and everything outside a placeholder is copied
//! unchanged, so sources in any ASCII-compatible encoding (ISO-8859-2,
//! windows-1250, UTF-8) come out in the encoding they went in.
//!
//! Lines that are `!require` directives in the module's comment style are
//! dropped: they only describe dependencies.

use crate::category::{CommentStyle, require_argument};
use crate::langfile::{self, TranslationTable};
use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

const OPEN: &[u8] = b"{{";
const CLOSE: &[u8] = b"}}";
const TIMESTAMP_KEY: &[u8] = b"!timestamp";

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("Error opening (reading) the file: {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error writing translated output: {0}")]
    Write(#[source] io::Error),
}

/// Rewrites placeholders against one translation table and remembers every
/// key it could not find.
#[derive(Debug, Default)]
pub struct Translator {
    table: TranslationTable,
    missing: BTreeSet<Vec<u8>>,
}

impl Translator {
    pub fn new(table: TranslationTable) -> Self {
        Self {
            table,
            missing: BTreeSet::new(),
        }
    }

    pub fn table(&self) -> &TranslationTable {
        &self.table
    }

    /// Keys looked up so far that the table does not contain.
    pub fn missing_keys(&self) -> &BTreeSet<Vec<u8>> {
        &self.missing
    }

    /// Replace every complete placeholder on a single line.
    pub fn translate_line(&mut self, line: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(line.len());
        let mut rest = line;
        while let Some(open) = find(rest, OPEN) {
            let after_open = &rest[open + OPEN.len()..];
            let Some(close) = find(after_open, CLOSE) else {
                break;
            };
            out.extend_from_slice(&rest[..open]);
            self.resolve(&after_open[..close], &mut out);
            rest = &after_open[close + CLOSE.len()..];
        }
        out.extend_from_slice(rest);
        out
    }

    /// Translate a whole text, keeping its line terminators.
    ///
    /// With a comment style, lines holding a `!require` directive are left out.
    pub fn translate_text(&mut self, text: &[u8], comment: Option<&CommentStyle>) -> Vec<u8> {
        let mut out = Vec::with_capacity(text.len());
        for raw in text.split_inclusive(|&b| b == b'\n') {
            let (line, ending) = split_line_ending(raw);
            if comment.is_some_and(|style| require_argument(line, style).is_some()) {
                continue;
            }
            out.extend(self.translate_line(line));
            out.extend_from_slice(ending);
        }
        out
    }

    /// Translate the file at `path` into `sink`.
    pub fn translate_file<W: Write>(
        &mut self,
        path: &Path,
        comment: Option<&CommentStyle>,
        sink: &mut W,
    ) -> Result<(), TranslateError> {
        let text = fs::read(path).map_err(|source| TranslateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let translated = self.translate_text(&text, comment);
        sink.write_all(&translated).map_err(TranslateError::Write)
    }

    /// Append the replacement for `key` to `out`.
    ///
    /// An empty key that is not in the table yields nothing and is not
    /// recorded; there is no text to translate.
    fn resolve(&mut self, key: &[u8], out: &mut Vec<u8>) {
        if key == TIMESTAMP_KEY {
            out.extend_from_slice(epoch_seconds().to_string().as_bytes());
            return;
        }
        if let Some(value) = self.table.get(key) {
            out.extend_from_slice(value);
            return;
        }
        if !key.is_empty() {
            self.missing.insert(key.to_vec());
        }
        out.extend_from_slice(display_text(key));
    }
}

/// Text shown for a key with no translation: everything after the last `::`.
pub fn display_text(key: &[u8]) -> &[u8] {
    langfile::split_key(key).1
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn split_line_ending(raw: &[u8]) -> (&[u8], &[u8]) {
    if let Some(line) = raw.strip_suffix(b"\r\n") {
        (line, &b"\r\n"[..])
    } else if let Some(line) = raw.strip_suffix(b"\n") {
        (line, &b"\n"[..])
    } else {
        (raw, &[])
    }
}

fn epoch_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
