//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Module plan (`-v`)
//!
//! Categories in page order, each member as written in the page (relative to
//! the root directory). Empty categories are left out.
//!
//! ```text
//! Templates
//! 001 lib/calendar.html
//!
//! Styles
//! 001 lib/base.css
//! 002 lib/calendar.css
//!
//! @sw → sw.js
//! 001 worker/cache.js
//! ```
//!
//! ## Bundles
//!
//! ```text
//! Styles → index.css (2 modules)
//! @sw → sw.js (1 module)
//! ```
//!
//! ## Summary
//!
//! ```text
//! Wrote index.html
//! Missing translations: 3 → lang/todo.lang
//! ```
//!
//! # Architecture
//!
//! Each display has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper. The plan and the summary go to
//! stdout; warnings go to stderr. Format functions are pure.

use crate::builder::{BundleReport, Warning};
use crate::category::Category;
use crate::modules::Modules;
use crate::paths;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Heading of a category: built-ins by name, custom outputs with their file.
fn category_heading(category: &Category, modules: &Modules, root: &Path) -> String {
    match category {
        Category::Template => "Templates".to_string(),
        Category::Header => "Header".to_string(),
        Category::Style => "Styles".to_string(),
        Category::Script => "Scripts".to_string(),
        Category::Custom(name) => match modules.custom_output(name) {
            Some(output) => format!("@{name} → {}", paths::relative_href(root, &output.path)),
            None => format!("@{name}"),
        },
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// Module plan
// ============================================================================

/// Format the resolved modules of every category.
pub fn format_plan(modules: &Modules, root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    for category in modules.categories() {
        let members = modules.ordered_members(&category);
        if members.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(category_heading(&category, modules, root));
        for (i, member) in members.iter().enumerate() {
            lines.push(format!(
                "{} {}",
                format_index(i + 1),
                paths::relative_href(root, member)
            ));
        }
    }
    lines
}

pub fn print_plan(modules: &Modules, root: &Path) {
    for line in format_plan(modules, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Bundles
// ============================================================================

/// One line per written bundle.
pub fn format_bundles(reports: &[BundleReport], modules: &Modules, root: &Path) -> Vec<String> {
    reports
        .iter()
        .map(|r| {
            let heading = match &r.category {
                Category::Custom(name) => format!("@{name}"),
                other => category_heading(other, modules, root),
            };
            format!(
                "{heading} → {} ({})",
                paths::relative_href(root, &r.path),
                plural(r.modules, "module", "modules")
            )
        })
        .collect()
}

pub fn print_bundles(reports: &[BundleReport], modules: &Modules, root: &Path) {
    for line in format_bundles(reports, modules, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Closing lines of a run: the page written and the missing-key count.
pub fn format_summary(
    page: Option<&Path>,
    missing: usize,
    export: Option<&Path>,
    root: &Path,
) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(page) = page {
        lines.push(format!("Wrote {}", paths::relative_href(root, page)));
    }
    if missing > 0 {
        match export {
            Some(path) => lines.push(format!(
                "Missing translations: {missing} → {}",
                path.display()
            )),
            None => lines.push(format!("Missing translations: {missing}")),
        }
    }
    lines
}

pub fn print_summary(page: Option<&Path>, missing: usize, export: Option<&Path>, root: &Path) {
    for line in format_summary(page, missing, export, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

pub fn format_warning(warning: &Warning) -> String {
    format!("warning: {warning}")
}

pub fn print_warnings(warnings: &[Warning]) {
    for warning in warnings {
        eprintln!("{}", format_warning(warning));
    }
}

/// Fatal error line.
pub fn format_error(error: &dyn std::fmt::Display) -> String {
    format!("ERROR: {error}")
}

// ============================================================================
// Tests
// ============================================================================
