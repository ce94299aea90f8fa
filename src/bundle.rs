//! Collapsing a module set into a single bundle file.
//!
//! After [`collapse`] the set holds exactly one member, the bundle itself, so
//! the HTML assembler links one file instead of many. The bundle's content
//! is each former member, translated and stripped of `!require` lines, in
//! set order, followed by a newline.
//!
//! ## Write failures
//!
//! Outputs follow one of two [`WritePolicy`] values. Bundles use
//! [`WritePolicy::Warn`]: a bundle that cannot be written is reported and
//! the build goes on, and the set is still replaced by the bundle path. The
//! page, the dependency file and the exports use [`WritePolicy::Abort`].

use crate::category::CommentStyle;
use crate::modules::ModuleSet;
use crate::translate::{TranslateError, Translator};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// What a failure to write an output file means for the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// Stop the build with an error.
    Abort,
    /// Report a warning and keep going.
    Warn,
}

/// Write policy of each kind of output.
pub const BUNDLE_WRITE_POLICY: WritePolicy = WritePolicy::Warn;
pub const OUTPUT_WRITE_POLICY: WritePolicy = WritePolicy::Abort;

/// Result of a collapse whose inputs were all readable.
#[derive(Debug)]
pub enum CollapseOutcome {
    Written { path: PathBuf, modules: usize },
    /// The bundle could not be written; the set was replaced anyway.
    WriteFailed { path: PathBuf, error: io::Error },
}

/// Concatenate the translated members of `set` into `target` and make
/// `target` the set's only member.
///
/// An unreadable member is an error. Failing to write `target` is not; it
/// comes back as [`CollapseOutcome::WriteFailed`].
pub fn collapse(
    set: &mut ModuleSet,
    target: &Path,
    comment: Option<&CommentStyle>,
    translator: &mut Translator,
) -> Result<CollapseOutcome, TranslateError> {
    let members = set.ordered();
    let written = write_bundle(&members, target, comment, translator);

    set.clear();
    set.add(target);

    match written {
        Ok(()) => Ok(CollapseOutcome::Written {
            path: target.to_path_buf(),
            modules: members.len(),
        }),
        Err(TranslateError::Write(error)) => Ok(CollapseOutcome::WriteFailed {
            path: target.to_path_buf(),
            error,
        }),
        Err(read) => Err(read),
    }
}

fn write_bundle(
    members: &[PathBuf],
    target: &Path,
    comment: Option<&CommentStyle>,
    translator: &mut Translator,
) -> Result<(), TranslateError> {
    let file = File::create(target).map_err(TranslateError::Write)?;
    let mut out = BufWriter::new(file);
    for member in members {
        translator.translate_file(member, comment, &mut out)?;
    }
    writeln!(out).map_err(TranslateError::Write)?;
    out.flush().map_err(TranslateError::Write)
}
