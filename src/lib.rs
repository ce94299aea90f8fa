//! # develweb
//!
//! A static web page assembler. A *page file* names the modules a page is
//! made of; each module is a set of same-named files (`calendar.html`,
//! `calendar.css`, `calendar.js`, `calendar.hdr`). Modules declare what they
//! depend on with `!require` comments, and text shown to users is written as
//! `{{key}}` placeholders resolved against a language file.
//!
//! # Architecture: One Run, Five Steps
//!
//! ```text
//! 1. Parse     index.page   →  module sets       (directives + require graphs)
//! 2. Depend    module sets  →  index.d           (Make rule for incremental builds)
//! 3. Bundle    module sets  →  index.css/.js     (optional, plus !output bundles)
//! 4. Assemble  module sets  →  index.html        (links, inlined templates)
//! 5. Export    missing keys →  todo.lang         (rows for translators)
//! ```
//!
//! All state of a run lives in one [`builder::Builder`]; the walker and the
//! translator borrow from it, so there is no global state and two runs never
//! share module sets.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`builder`] | Build run: page parsing, bundling, page output, dependency file, manifest |
//! | [`page`] | Page file line parser and page-wide settings |
//! | [`walker`] | Follows `!require` comments into per-category module sets |
//! | [`category`] | Module categories and their comment conventions |
//! | [`modules`] | Insertion-ordered module sets and the registry holding them |
//! | [`translate`] | `{{key}}` placeholder substitution with missing-key harvest |
//! | [`langfile`] | Language file reader and missing-key exporter |
//! | [`bundle`] | Collapsing a module set into one file; write-failure policies |
//! | [`html`] | Page skeleton rendered with Maud |
//! | [`depfile`] | Make-style dependency rule |
//! | [`config`] | `develweb.toml` cascade loading, validation and merging |
//! | [`paths`] | Lexical path helpers |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Dependencies First
//!
//! The walker records a file only after everything it requires, so every
//! module set lists dependencies before dependents. Linking styles and
//! scripts in set order is then always correct, and a file required by many
//! modules still appears once.
//!
//! ## Routing by Extension
//!
//! A script may require a stylesheet: plain requires are routed by the
//! target's extension. Files with other extensions stay in the requiring
//! file's category. `!output` categories are reached only through an explicit
//! `@name` tag, so a service worker or a feed never leaks into the page.
//!
//! ## Two Write Policies
//!
//! A bundle that cannot be written is a warning; the page, the dependency
//! file and the exports are errors. See [`bundle::WritePolicy`].

pub mod builder;
pub mod bundle;
pub mod category;
pub mod config;
pub mod depfile;
pub mod html;
pub mod langfile;
pub mod modules;
pub mod output;
pub mod page;
pub mod paths;
pub mod translate;
pub mod walker;

#[cfg(test)]
pub(crate) mod test_helpers;
