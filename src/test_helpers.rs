//! Shared test utilities for the develweb test suite.
//!
//! Tests build small site trees in a temp directory and compare module sets
//! by their paths relative to that directory:
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = write_files(&[
//!     ("base.css", "body {}\n"),
//!     ("widget.css", "/*!require base.css*/\n"),
//! ]);
//! let mut modules = Modules::new();
//! walk(&mut modules, Category::Style, &tmp.path().join("widget.css"), true).unwrap();
//! assert_eq!(member_names(&modules, &Category::Style, tmp.path()), ["base.css", "widget.css"]);
//! ```

use crate::category::Category;
use crate::modules::Modules;
use crate::paths;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// =========================================================================
// Fixture setup
// =========================================================================

/// Write `(relative path, content)` pairs into a fresh temp directory.
///
/// Parent directories are created as needed.
pub fn write_files(files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (name, content) in files {
        let path = tmp.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
    }
    tmp
}

// =========================================================================
// Extractors
// =========================================================================

/// Members of `category`, in order, as slash-separated paths relative to `root`.
pub fn member_names(modules: &Modules, category: &Category, root: &Path) -> Vec<String> {
    modules
        .ordered_members(category)
        .iter()
        .map(|p| paths::relative_href(root, p))
        .collect()
}
