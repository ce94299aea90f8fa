//! Make-style dependency files.
//!
//! ```text
//! site/index.html index.d : \
//! site/lib/base.html \
//! site/lib/base.css \
//! site/lang/cs.lang
//! ```
//!
//! With phony rules enabled, each prerequisite also gets an empty rule so
//! that deleting a module does not break `make`:
//!
//! ```text
//! site/lib/base.html:
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// One dependency rule: `targets : prerequisites`.
#[derive(Debug, Clone)]
pub struct DepRule {
    pub target: PathBuf,
    pub depfile: PathBuf,
    pub prerequisites: Vec<PathBuf>,
    pub phony: bool,
}

impl DepRule {
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(
            out,
            "{} {} :",
            make_escape(&self.target),
            make_escape(&self.depfile)
        )?;
        for prerequisite in &self.prerequisites {
            write!(out, " \\\n{}", make_escape(prerequisite))?;
        }
        writeln!(out)?;

        if self.phony {
            for prerequisite in &self.prerequisites {
                write!(out, "\n{}:\n", make_escape(prerequisite))?;
            }
        }
        Ok(())
    }
}

/// Escape spaces, which `make` would otherwise split file names on.
fn make_escape(path: &Path) -> String {
    path.to_string_lossy().replace(' ', "\\ ")
}
