//! Final page assembly.
//!
//! The page skeleton is fixed; modules only decide what goes into it:
//!
//! ```text
//! <!DOCTYPE html>
//! <html>
//!   <head>
//!     <link rel="stylesheet">   one per style module (or the style bundle)
//!     header fragments          .hdr modules, inlined and translated
//!     <meta charset>            if !charset was given
//!   </head>
//!   <body onload="...">         if !entry_point was given
//!     templates                 .html/.htm modules, inlined and translated
//!     <script src>              one per script module (or the script bundle)
//!   </body>
//! </html>
//! ```
//!
//! Uses [maud](https://maud.lambda.xyz/) for the skeleton; attribute values
//! are escaped by maud. Inlined module content is raw bytes in whatever
//! encoding the modules use, so it is not passed through maud: the skeleton
//! carries a NUL-delimited marker per fragment and the bytes are spliced in
//! after rendering.

use maud::{DOCTYPE, Markup, PreEscaped, html};

const MARK: char = '\0';

/// Everything the page skeleton needs, already resolved and translated.
#[derive(Debug, Default, Clone)]
pub struct PageDocument {
    /// `href`s of stylesheets, relative to the page.
    pub styles: Vec<String>,
    /// Translated header fragments.
    pub header: Vec<Vec<u8>>,
    pub charset: Option<String>,
    pub entry_point: Option<String>,
    /// Translated body templates.
    pub templates: Vec<Vec<u8>>,
    /// `src`s of scripts, relative to the page.
    pub scripts: Vec<String>,
}

/// Render the complete HTML document.
pub fn render_page(doc: &PageDocument) -> Vec<u8> {
    let fragments: Vec<&[u8]> = doc
        .header
        .iter()
        .chain(&doc.templates)
        .map(Vec::as_slice)
        .collect();
    let skeleton = skeleton(doc).into_string();

    let inlined: usize = fragments.iter().map(|f| f.len()).sum();
    let mut out = Vec::with_capacity(skeleton.len() + inlined);
    for (i, piece) in skeleton.split(MARK).enumerate() {
        let fragment = if i % 2 == 1 {
            piece.parse::<usize>().ok().and_then(|n| fragments.get(n))
        } else {
            None
        };
        match fragment {
            Some(bytes) => out.extend_from_slice(bytes),
            None => out.extend_from_slice(piece.as_bytes()),
        }
    }
    out
}

fn marker(index: usize) -> PreEscaped<String> {
    PreEscaped(format!("{MARK}{index}{MARK}"))
}

fn skeleton(doc: &PageDocument) -> Markup {
    let templates_from = doc.header.len();
    html! {
        (DOCTYPE)
        html {
            head {
                @for href in &doc.styles {
                    link href=(href) rel="stylesheet" type="text/css";
                }
                @for i in 0..doc.header.len() {
                    (marker(i))
                }
                @if let Some(charset) = &doc.charset {
                    meta charset=(charset);
                }
            }
            body onload=[doc.entry_point.as_deref()] {
                @for i in 0..doc.templates.len() {
                    (marker(templates_from + i))
                }
                @for src in &doc.scripts {
                    script src=(src) type="text/javascript" {}
                }
            }
        }
    }
}
