//! Page scripts: the `.page` file that lists a page's modules.
//!
//! One command per line. Blank lines and lines starting with `#` are
//! ignored; lines starting with `!` are directives; anything else names a
//! module.
//!
//! ```text
//! # index.page
//! !charset utf-8
//! !entry_point App.start()
//! !output sw service-worker.js
//! !include common.page
//! # base.css and base.js, whichever exist
//! lib/base
//! widgets/calendar
//! ```
//!
//! | Directive | Argument | Effect |
//! |-----------|----------|--------|
//! | `!include` | page file | parse another page file, relative to this one |
//! | `!html` | file | output page name (relative to the root directory) |
//! | `!css` | file | style bundle name (relative to the root directory) |
//! | `!js` | file | script bundle name (relative to the root directory) |
//! | `!dir` | directory | root directory, relative to the root page file |
//! | `!charset` | charset | `<meta charset>` of the page |
//! | `!entry_point` | call | `<body onload>` handler, e.g. `main()` |
//! | `!output` | name file | declare custom output `@name` bundled into `file` |
//!
//! A module line names files without extension. Every one of `.html`,
//! `.htm`, `.css`, `.js` and `.hdr` that exists joins the page.

use crate::category::Category;
use crate::paths;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extensions tried for a module line, with the category each one joins.
pub const MODULE_EXTENSIONS: &[(&str, Category)] = &[
    ("html", Category::Template),
    ("htm", Category::Template),
    ("css", Category::Style),
    ("js", Category::Script),
    ("hdr", Category::Header),
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DirectiveError {
    #[error("directive {0} requires an argument")]
    MissingArgument(&'static str),
    #[error("unknown directive: {0}")]
    Unknown(String),
    #[error("expected '!output <name> <file>', found '!output {0}'")]
    MalformedOutput(String),
}

/// One parsed line of a page file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Include(String),
    Html(String),
    Css(String),
    Js(String),
    Dir(String),
    Charset(String),
    EntryPoint(String),
    Output { name: String, file: String },
    Module(String),
}

const KEYWORDS: &[&str] = &[
    "!include",
    "!html",
    "!css",
    "!js",
    "!dir",
    "!charset",
    "!entry_point",
    "!output",
];

/// Parse one page line. Blank and comment lines give `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Directive>, DirectiveError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    if !line.starts_with('!') {
        return Ok(Some(Directive::Module(line.to_string())));
    }

    let (word, argument) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let Some(&keyword) = KEYWORDS.iter().find(|&&k| k == word) else {
        return Err(DirectiveError::Unknown(word.to_string()));
    };
    if argument.is_empty() {
        return Err(DirectiveError::MissingArgument(keyword));
    }

    let arg = argument.to_string();
    let directive = match keyword {
        "!include" => Directive::Include(arg),
        "!html" => Directive::Html(arg),
        "!css" => Directive::Css(arg),
        "!js" => Directive::Js(arg),
        "!dir" => Directive::Dir(arg),
        "!charset" => Directive::Charset(arg),
        "!entry_point" => Directive::EntryPoint(arg),
        _ => {
            let (name, file) = argument
                .split_once(char::is_whitespace)
                .map(|(n, f)| (n, f.trim()))
                .ok_or(DirectiveError::MalformedOutput(arg.clone()))?;
            Directive::Output {
                name: name.trim_start_matches('@').to_string(),
                file: file.to_string(),
            }
        }
    };
    Ok(Some(directive))
}

/// Page-wide settings collected from directives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSettings {
    /// Directory that output names and `href`s are relative to.
    pub root_dir: PathBuf,
    /// Directory of the root page file; `!dir` is relative to it.
    pub page_dir: PathBuf,
    pub html_name: String,
    pub css_name: String,
    pub js_name: String,
    pub charset: Option<String>,
    pub entry_point: Option<String>,
}

impl PageSettings {
    /// Defaults for a root page file: outputs named after it, next to it.
    ///
    /// `site/index.page` → `site/index.html`, `site/index.css`, `site/index.js`.
    pub fn for_page_file(page: &Path) -> Self {
        let dir = paths::dirname(&paths::normalize(page));
        let base = paths::strip_ext(page);
        Self {
            root_dir: dir.clone(),
            page_dir: dir,
            html_name: format!("{base}.html"),
            css_name: format!("{base}.css"),
            js_name: format!("{base}.js"),
            charset: None,
            entry_point: None,
        }
    }

    pub fn html_path(&self) -> PathBuf {
        paths::resolve(&self.root_dir, &self.html_name)
    }

    pub fn css_path(&self) -> PathBuf {
        paths::resolve(&self.root_dir, &self.css_name)
    }

    pub fn js_path(&self) -> PathBuf {
        paths::resolve(&self.root_dir, &self.js_name)
    }
}

/// Module file candidates for a module line, in probing order.
pub fn module_candidates(base: &Path) -> impl Iterator<Item = (PathBuf, Category)> + '_ {
    MODULE_EXTENSIONS.iter().map(move |(ext, category)| {
        let mut name = base.as_os_str().to_owned();
        name.push(".");
        name.push(ext);
        (PathBuf::from(name), category.clone())
    })
}
