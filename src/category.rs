//! Module categories and their comment conventions.
//!
//! A category is the role a file plays in the page: linked script, linked
//! stylesheet, inlined template, inlined header fragment, or a user-declared
//! custom output that is only ever bundled. Each category knows how comments
//! look in its files, which is how `!require` directives are recognised.
//!
//! | Category | Extensions | Require syntax |
//! |----------|------------|----------------|
//! | Script   | `.js`      | `//!require file.js` |
//! | Style    | `.css`     | `/*!require file.css*/` |
//! | Template | `.html`, `.htm` | `<!--!require file.html-->` |
//! | Header   | `.hdr`     | `<!--!require file.hdr-->` |
//! | Custom   | per output file | inferred from the output file's extension |

use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Role of a module file in the assembled page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Script,
    Style,
    Template,
    Header,
    /// Declared with `!output <name> <file>` in the page script.
    Custom(String),
}

impl Category {
    /// Comment convention of the built-in categories. Custom categories
    /// carry theirs on the declared output instead.
    pub fn builtin_comment_style(&self) -> Option<CommentStyle> {
        match self {
            Category::Script => Some(CommentStyle::SCRIPT),
            Category::Style => Some(CommentStyle::STYLE),
            Category::Template | Category::Header => Some(CommentStyle::MARKUP),
            Category::Custom(_) => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Script => write!(f, "scripts"),
            Category::Style => write!(f, "styles"),
            Category::Template => write!(f, "templates"),
            Category::Header => write!(f, "header"),
            Category::Custom(name) => write!(f, "@{name}"),
        }
    }
}

/// Category implied by a file extension, if it is one of the known ones.
pub fn category_for_extension(ext: &str) -> Option<Category> {
    let ext = ext.to_ascii_lowercase();
    match ext.as_str() {
        "js" => Some(Category::Script),
        "css" => Some(Category::Style),
        "hdr" => Some(Category::Header),
        "html" | "htm" => Some(Category::Template),
        _ => None,
    }
}

/// Category implied by the extension of `path`.
pub fn category_for_path(path: &Path) -> Option<Category> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(category_for_extension)
}

/// How a comment is written in a given kind of file: `prefix ... suffix`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentStyle {
    pub prefix: &'static str,
    pub suffix: &'static str,
}

impl CommentStyle {
    pub const SCRIPT: CommentStyle = CommentStyle {
        prefix: "//",
        suffix: "",
    };
    pub const STYLE: CommentStyle = CommentStyle {
        prefix: "/*",
        suffix: "*/",
    };
    pub const MARKUP: CommentStyle = CommentStyle {
        prefix: "<!--",
        suffix: "-->",
    };
    pub const HASH: CommentStyle = CommentStyle {
        prefix: "#",
        suffix: "",
    };

    /// Comment convention for a custom output, inferred from its file name.
    pub fn for_output_file(path: &Path) -> CommentStyle {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "js" => CommentStyle::SCRIPT,
            "css" => CommentStyle::STYLE,
            "html" | "xml" => CommentStyle::MARKUP,
            _ => CommentStyle::HASH,
        }
    }

    /// Text inside the comment if `line` is exactly one comment in this style.
    ///
    /// `line` is expected to be trimmed already. The returned text is trimmed.
    /// Works on raw bytes so module files in any ASCII-compatible encoding
    /// are recognised.
    pub fn unwrap<'a>(&self, line: &'a [u8]) -> Option<&'a [u8]> {
        if line.len() < self.prefix.len() + self.suffix.len() {
            return None;
        }
        let inner = line
            .strip_prefix(self.prefix.as_bytes())?
            .strip_suffix(self.suffix.as_bytes())?;
        Some(inner.trim_ascii())
    }
}

const REQUIRE_KEYWORD: &[u8] = b"!require";

/// Argument of a `!require` directive on `line`, if the line is one.
///
/// The line is trimmed first. `Some(b"")` means the keyword is present but
/// has no argument; callers treat that as an error. `!requirex` and similar
/// are not directives.
pub fn require_argument<'a>(line: &'a [u8], style: &CommentStyle) -> Option<&'a [u8]> {
    let inner = style.unwrap(line.trim_ascii())?;
    let rest = inner.strip_prefix(REQUIRE_KEYWORD)?;
    if rest.is_empty() {
        return Some(&[]);
    }
    if !rest[0].is_ascii_whitespace() {
        return None;
    }
    Some(rest.trim_ascii())
}
