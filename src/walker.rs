//! Include-graph walker.
//!
//! Starting from one module file, follows the `!require` directives written
//! as comments inside it and records every reachable file in the set of its
//! category. A file is recorded only after everything it requires, so each
//! set lists dependencies before their dependents:
//!
//! ```text
//! widget.css:   /*!require base.css*/       styles: [base.css, widget.css]
//! app.js:       //!require lib/router.js    scripts: [lib/router.js, app.js]
//!               //!require theme.css        styles: [.., theme.css]
//! sw-entry.js:  //!require @sw cache.js     @sw: [cache.js, ..]
//! ```
//!
//! ## Category routing
//!
//! A plain require is routed by the extension of the target, so a script can
//! pull in a stylesheet. Unknown extensions stay in the requiring file's
//! category. `@name path` forces the target into the declared custom output
//! `name`, whatever its extension.
//!
//! ## Cycles
//!
//! A file that is already recorded, or is still being walked under the same
//! category, is skipped without error. `A → B → A` yields `[B, A]`: the edge
//! back into `A` is dropped.
//!
//! The walk keeps its own stack of open files rather than recursing, so
//! arbitrarily deep require chains cannot overflow the call stack.

use crate::category::{Category, CommentStyle, category_for_path, require_argument};
use crate::modules::Modules;
use crate::paths;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("Error opening (reading) the file: {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}:{line}: !require without a file")]
    EmptyRequire { path: PathBuf, line: usize },
    #[error("{path}:{line}: expected '!require @<output> <file>', found '{argument}'")]
    MalformedOutputRequire {
        path: PathBuf,
        line: usize,
        argument: String,
    },
    #[error("{path}:{line}: output file is not defined: @{name}")]
    UndefinedOutput {
        path: PathBuf,
        line: usize,
        name: String,
    },
}

/// A file whose requires are being resolved.
struct Frame {
    category: Category,
    comment: CommentStyle,
    path: PathBuf,
    lines: Vec<Vec<u8>>,
    next_line: usize,
}

/// Walks require graphs into a run's [`Modules`].
pub struct Walker<'a> {
    modules: &'a mut Modules,
    in_progress: HashSet<(Category, PathBuf)>,
}

impl<'a> Walker<'a> {
    pub fn new(modules: &'a mut Modules) -> Self {
        Self {
            modules,
            in_progress: HashSet::new(),
        }
    }

    /// Record `path` and everything it requires.
    ///
    /// With `force_category` the file goes into `category` as given; without
    /// it the category is re-derived from the file extension.
    pub fn walk(
        &mut self,
        category: Category,
        path: &Path,
        force_category: bool,
    ) -> Result<(), WalkError> {
        let mut stack: Vec<Frame> = Vec::new();
        if let Some(frame) = self.open(category, paths::normalize(path), force_category)? {
            stack.push(frame);
        }

        while let Some(frame) = stack.last_mut() {
            let Some(line) = frame.lines.get(frame.next_line) else {
                if let Some(done) = stack.pop() {
                    self.record(done);
                }
                continue;
            };
            frame.next_line += 1;
            let line_no = frame.next_line;

            let Some(argument) = require_argument(line, &frame.comment) else {
                continue;
            };
            let (target_category, target, force) =
                self.require_target(frame, argument, line_no)?;
            if let Some(child) = self.open(target_category, target, force)? {
                stack.push(child);
            }
        }
        Ok(())
    }

    /// Work out where a `!require` argument points.
    fn require_target(
        &self,
        frame: &Frame,
        argument: &[u8],
        line: usize,
    ) -> Result<(Category, PathBuf, bool), WalkError> {
        if argument.is_empty() {
            return Err(WalkError::EmptyRequire {
                path: frame.path.clone(),
                line,
            });
        }

        let argument = String::from_utf8_lossy(argument);
        let dir = paths::dirname(&frame.path);
        match argument.strip_prefix('@') {
            Some(tagged) => {
                let (name, file) = tagged
                    .split_once(char::is_whitespace)
                    .map(|(n, f)| (n, f.trim()))
                    .filter(|(n, f)| !n.is_empty() && !f.is_empty())
                    .ok_or_else(|| WalkError::MalformedOutputRequire {
                        path: frame.path.clone(),
                        line,
                        argument: argument.to_string(),
                    })?;
                if self.modules.custom_output(name).is_none() {
                    return Err(WalkError::UndefinedOutput {
                        path: frame.path.clone(),
                        line,
                        name: name.to_string(),
                    });
                }
                Ok((
                    Category::Custom(name.to_string()),
                    paths::resolve(&dir, file),
                    true,
                ))
            }
            None => Ok((
                frame.category.clone(),
                paths::resolve(&dir, &*argument),
                false,
            )),
        }
    }

    /// Start walking `path`, or return `None` if there is nothing to do.
    fn open(
        &mut self,
        category: Category,
        path: PathBuf,
        force_category: bool,
    ) -> Result<Option<Frame>, WalkError> {
        let category = if force_category {
            category
        } else {
            category_for_path(&path).unwrap_or(category)
        };

        let Some(comment) = self.modules.comment_style(&category) else {
            let name = match &category {
                Category::Custom(name) => name.clone(),
                other => other.to_string(),
            };
            return Err(WalkError::UndefinedOutput {
                path,
                line: 0,
                name,
            });
        };

        let recorded = self
            .modules
            .set(&category)
            .is_some_and(|set| set.contains(&path));
        if recorded || self.in_progress.contains(&(category.clone(), path.clone())) {
            return Ok(None);
        }

        let content = fs::read(&path).map_err(|source| WalkError::Read {
            path: path.clone(),
            source,
        })?;
        let lines = content.split(|&b| b == b'\n').map(<[u8]>::to_vec).collect();

        self.in_progress.insert((category.clone(), path.clone()));
        Ok(Some(Frame {
            category,
            comment,
            path,
            lines,
            next_line: 0,
        }))
    }

    fn record(&mut self, frame: Frame) {
        let key = (frame.category, frame.path);
        self.in_progress.remove(&key);
        if let Some(set) = self.modules.set_mut(&key.0) {
            set.add(key.1);
        }
    }
}

/// Walk a single root into `modules`.
pub fn walk(
    modules: &mut Modules,
    category: Category,
    path: &Path,
    force_category: bool,
) -> Result<(), WalkError> {
    Walker::new(modules).walk(category, path, force_category)
}
