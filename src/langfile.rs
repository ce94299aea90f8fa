//! Language files: the translation table and the missing-key export.
//!
//! A language file holds one translation per line as three quoted,
//! comma-separated fields:
//!
//! ```text
//! # namespace, original text, translation
//! !include common.lang
//! "ui","Save","Uložit"
//! "","Welcome","Vítejte"
//! "ui","Say ""hi""","Řekni ""ahoj"""
//! ```
//!
//! The lookup key is `namespace::text`, or just `text` when the namespace is
//! empty; that is the key written between braces in the sources
//! (`{{ui::Save}}`, `{{Welcome}}`).
//!
//! `!include <file>` is the only directive. It reads another language file,
//! relative to the including one; rows read later win. A file that is
//! already being read is not read again, so include cycles end.
//!
//! Keys and translations are kept as raw bytes: a language file is expected
//! in the same encoding as the modules it translates, whatever that is.
//!
//! The export writes every missing key in the same format with an empty
//! translation. Rows with an empty translation are skipped on load, so an
//! export can be merged back in before it is filled.

use crate::paths;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

const NAMESPACE_SEPARATOR: &[u8] = b"::";
const INCLUDE_DIRECTIVE: &[u8] = b"!include";

#[derive(Error, Debug)]
pub enum LangFileError {
    #[error("Error opening (reading) the file: {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error opening (writing) the file: {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path}:{line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

/// Key → translated text, both as raw bytes.
#[derive(Debug, Clone, Default)]
pub struct TranslationTable {
    entries: HashMap<Vec<u8>, Vec<u8>>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&[u8]> {
        self.entries.get(key.as_ref()).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A table loaded from disk together with the rows that could not be parsed.
#[derive(Debug)]
pub struct LoadedTable {
    pub table: TranslationTable,
    pub warnings: Vec<LangFileError>,
    /// The file itself and every file it includes, in first-read order.
    pub files: Vec<PathBuf>,
}

/// Read a language file and the files it includes.
///
/// An unreadable file is an error. Malformed rows are skipped and returned
/// as warnings so the build can go on with what was understood.
pub fn load(path: &Path) -> Result<LoadedTable, LangFileError> {
    let mut loader = Loader::default();
    loader.load_file(&paths::normalize(path))?;
    Ok(loader.finish())
}

/// Parse language file `content` as if it had been read from `path`.
///
/// `!include` lines are resolved against the directory of `path`.
pub fn parse(path: &Path, content: &[u8]) -> Result<LoadedTable, LangFileError> {
    let mut loader = Loader::default();
    loader.parse_content(&paths::normalize(path), content)?;
    Ok(loader.finish())
}

#[derive(Default)]
struct Loader {
    table: TranslationTable,
    warnings: Vec<LangFileError>,
    files: Vec<PathBuf>,
    open: HashSet<PathBuf>,
}

impl Loader {
    fn finish(self) -> LoadedTable {
        LoadedTable {
            table: self.table,
            warnings: self.warnings,
            files: self.files,
        }
    }

    fn load_file(&mut self, path: &Path) -> Result<(), LangFileError> {
        if self.open.contains(path) {
            return Ok(());
        }
        let content = fs::read(path).map_err(|source| LangFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_content(path, &content)
    }

    fn parse_content(&mut self, path: &Path, content: &[u8]) -> Result<(), LangFileError> {
        self.open.insert(path.to_path_buf());
        if !self.files.iter().any(|f| f == path) {
            self.files.push(path.to_path_buf());
        }
        let result = self.parse_lines(path, content);
        self.open.remove(path);
        result
    }

    fn parse_lines(&mut self, path: &Path, content: &[u8]) -> Result<(), LangFileError> {
        for (idx, line) in content.split(|&b| b == b'\n').enumerate() {
            let trimmed = line.trim_ascii();
            if trimmed.is_empty() || trimmed.starts_with(b"#") {
                continue;
            }
            if trimmed.starts_with(b"!") {
                match include_target(path, trimmed) {
                    Ok(target) => self.load_file(&target)?,
                    Err(message) => self.warn(path, idx + 1, message),
                }
                continue;
            }
            match parse_row(trimmed) {
                Ok([namespace, text, translation]) => {
                    if !translation.is_empty() {
                        self.table.insert(make_key(&namespace, &text), translation);
                    }
                }
                Err(message) => self.warn(path, idx + 1, message),
            }
        }
        Ok(())
    }

    fn warn(&mut self, path: &Path, line: usize, message: String) {
        self.warnings.push(LangFileError::Parse {
            path: path.to_path_buf(),
            line,
            message,
        });
    }
}

/// File named by an `!include` line, relative to the including file.
fn include_target(path: &Path, line: &[u8]) -> Result<PathBuf, String> {
    let (word, argument) = match line.iter().position(u8::is_ascii_whitespace) {
        Some(at) => (&line[..at], line[at..].trim_ascii()),
        None => (line, &[][..]),
    };
    if word != INCLUDE_DIRECTIVE {
        return Err(format!(
            "unknown directive: {}",
            String::from_utf8_lossy(word)
        ));
    }
    if argument.is_empty() {
        return Err("!include requires a file".to_string());
    }
    Ok(paths::resolve(
        &paths::dirname(path),
        &*String::from_utf8_lossy(argument),
    ))
}

/// Lookup key for a namespace/text pair.
pub fn make_key(namespace: &[u8], text: &[u8]) -> Vec<u8> {
    if namespace.is_empty() {
        text.to_vec()
    } else {
        [namespace, NAMESPACE_SEPARATOR, text].concat()
    }
}

/// Split a key at its last `::` into namespace and text.
pub fn split_key(key: &[u8]) -> (&[u8], &[u8]) {
    match key
        .windows(NAMESPACE_SEPARATOR.len())
        .rposition(|w| w == NAMESPACE_SEPARATOR)
    {
        Some(at) => (&key[..at], &key[at + NAMESPACE_SEPARATOR.len()..]),
        None => (&[], key),
    }
}

/// Parse one row into its three fields.
fn parse_row(line: &[u8]) -> Result<[Vec<u8>; 3], String> {
    let mut fields: Vec<Vec<u8>> = Vec::with_capacity(3);
    let mut bytes = line.iter().copied().peekable();

    loop {
        while bytes.next_if(|b| b.is_ascii_whitespace()).is_some() {}

        let mut field = Vec::new();
        if bytes.next_if_eq(&b'"').is_some() {
            loop {
                match bytes.next() {
                    Some(b'"') if bytes.next_if_eq(&b'"').is_some() => field.push(b'"'),
                    Some(b'"') => break,
                    Some(b) => field.push(b),
                    None => {
                        return Err(format!("unterminated quote in field {}", fields.len() + 1));
                    }
                }
            }
            while bytes.next_if(|b| b.is_ascii_whitespace()).is_some() {}
        } else {
            while let Some(b) = bytes.next_if(|&b| b != b',') {
                if b == b'"' {
                    return Err(format!("stray quote in field {}", fields.len() + 1));
                }
                field.push(b);
            }
            field = field.trim_ascii_end().to_vec();
        }
        fields.push(field);

        match bytes.next() {
            Some(b',') => continue,
            None => break,
            Some(b) => {
                return Err(format!(
                    "expected ',' after field {}, found '{}'",
                    fields.len(),
                    b.escape_ascii()
                ));
            }
        }
    }

    <[Vec<u8>; 3]>::try_from(fields)
        .map_err(|fields| format!("expected 3 fields, found {}", fields.len()))
}

fn write_quoted<W: Write>(out: &mut W, field: &[u8]) -> io::Result<()> {
    out.write_all(b"\"")?;
    for (i, part) in field.split(|&b| b == b'"').enumerate() {
        if i > 0 {
            out.write_all(b"\"\"")?;
        }
        out.write_all(part)?;
    }
    out.write_all(b"\"")
}

/// Write `keys` as untranslated rows.
pub fn write_missing<W: Write>(keys: &BTreeSet<Vec<u8>>, out: &mut W) -> io::Result<()> {
    for key in keys {
        let (namespace, text) = split_key(key);
        write_quoted(out, namespace)?;
        out.write_all(b",")?;
        write_quoted(out, text)?;
        out.write_all(b",\"\"\n")?;
    }
    Ok(())
}

/// Write the missing-key export to `path`, replacing any previous content.
pub fn export_missing(keys: &BTreeSet<Vec<u8>>, path: &Path) -> Result<(), LangFileError> {
    let write_err = |source| LangFileError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut file = io::BufWriter::new(fs::File::create(path).map_err(write_err)?);
    write_missing(keys, &mut file).map_err(write_err)?;
    file.flush().map_err(write_err)
}
