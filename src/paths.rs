//! Path helpers shared by the page parser, the walker and the HTML assembler.
//!
//! Every module path is resolved against the directory of the file that
//! referenced it and then lexically normalized, so `lib/../base.css` and
//! `base.css` name the same member. Nothing here touches the filesystem.

use path_clean::PathClean;
use std::path::{Component, Path, PathBuf};

/// Directory part of `path`. Empty for a bare file name.
pub fn dirname(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// File name of `path` without its final extension.
///
/// - `site/index.page` → `index`
/// - `archive.tar.gz` → `archive.tar`
/// - `README` → `README`
pub fn strip_ext(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Join `rel` onto `dir` and normalize the result.
///
/// An absolute `rel` replaces `dir`; an empty `rel` yields `dir` itself.
pub fn resolve(dir: &Path, rel: impl AsRef<Path>) -> PathBuf {
    let rel = rel.as_ref();
    if rel.as_os_str().is_empty() {
        return normalize(dir);
    }
    normalize(&dir.join(rel))
}

/// Lexically fold `.` and `..` components.
///
/// An empty result (e.g. `a/..`) becomes `.` through `path-clean`; that is
/// mapped back to an empty path so it joins cleanly.
pub fn normalize(path: &Path) -> PathBuf {
    let cleaned = path.clean();
    if cleaned == Path::new(".") {
        PathBuf::new()
    } else {
        cleaned
    }
}

/// Slash-separated reference to `path` as seen from `root`.
///
/// Used for `href`/`src` attributes, so the separator is always `/`
/// regardless of platform. Paths outside `root` get `..` segments; an
/// absolute path that shares nothing with a relative root is returned as-is.
pub fn relative_href(root: &Path, path: &Path) -> String {
    let root = normalize(root);
    let path = normalize(path);

    if let Ok(inside) = path.strip_prefix(&root) {
        return to_slashes(inside);
    }
    if root.is_absolute() != path.is_absolute() {
        return to_slashes(&path);
    }

    let root_parts: Vec<Component> = root.components().collect();
    let path_parts: Vec<Component> = path.components().collect();
    let common = root_parts
        .iter()
        .zip(&path_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<String> = Vec::new();
    for part in &root_parts[common..] {
        match part {
            Component::ParentDir => {
                // Root climbs above the shared base; there is no way back
                // down lexically, so fall back to the path itself.
                return to_slashes(&path);
            }
            _ => segments.push("..".to_string()),
        }
    }
    segments.extend(
        path_parts[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().to_string()),
    );
    segments.join("/")
}

fn to_slashes(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::RootDir => Some(String::new()),
            Component::CurDir => None,
            other => Some(other.as_os_str().to_string_lossy().to_string()),
        })
        .collect::<Vec<_>>()
        .join("/")
}
