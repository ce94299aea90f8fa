//! Ordered, duplicate-free module sets and the per-run registry that owns them.
//!
//! Each category collects its files in a [`ModuleSet`]. Adding a file that is
//! already present is a no-op that reports `false`; the include walker relies
//! on that to stop at files it has already recorded. Output order is the
//! order of first insertion, tracked with a sequence number per member.

use crate::category::{Category, CommentStyle};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Insertion-ordered set of module paths.
#[derive(Debug, Clone, Default)]
pub struct ModuleSet {
    members: HashMap<PathBuf, u64>,
    next_seq: u64,
}

impl ModuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `path` unless it is already a member. Returns whether it was added.
    pub fn add(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if self.members.contains_key(&path) {
            return false;
        }
        self.members.insert(path, self.next_seq);
        self.next_seq += 1;
        true
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.members.contains_key(path)
    }

    /// Members in insertion order.
    pub fn ordered(&self) -> Vec<PathBuf> {
        let mut entries: Vec<(&PathBuf, u64)> =
            self.members.iter().map(|(p, &seq)| (p, seq)).collect();
        entries.sort_by_key(|&(_, seq)| seq);
        entries.into_iter().map(|(p, _)| p.clone()).collect()
    }

    /// Remove every member and restart the sequence.
    pub fn clear(&mut self) {
        self.members.clear();
        self.next_seq = 0;
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// A category declared with `!output`, bundled into its own file.
#[derive(Debug, Clone)]
pub struct CustomOutput {
    pub name: String,
    pub path: PathBuf,
    pub comment: CommentStyle,
    pub modules: ModuleSet,
}

/// All module sets of one build run.
#[derive(Debug, Default)]
pub struct Modules {
    scripts: ModuleSet,
    styles: ModuleSet,
    templates: ModuleSet,
    header: ModuleSet,
    custom: Vec<CustomOutput>,
}

impl Modules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom output category. Returns `false` if `name` is taken.
    ///
    /// The comment convention for `!require` inside its files follows the
    /// extension of `path`.
    pub fn declare_custom_output(&mut self, name: &str, path: impl Into<PathBuf>) -> bool {
        if self.custom_output(name).is_some() {
            return false;
        }
        let path = path.into();
        self.custom.push(CustomOutput {
            name: name.to_string(),
            comment: CommentStyle::for_output_file(&path),
            path,
            modules: ModuleSet::new(),
        });
        true
    }

    pub fn custom_output(&self, name: &str) -> Option<&CustomOutput> {
        self.custom.iter().find(|c| c.name == name)
    }

    /// Declared custom outputs, in declaration order.
    pub fn custom_outputs(&self) -> &[CustomOutput] {
        &self.custom
    }

    /// The set for `category`. `None` only for an undeclared custom category.
    pub fn set(&self, category: &Category) -> Option<&ModuleSet> {
        match category {
            Category::Script => Some(&self.scripts),
            Category::Style => Some(&self.styles),
            Category::Template => Some(&self.templates),
            Category::Header => Some(&self.header),
            Category::Custom(name) => self.custom_output(name).map(|c| &c.modules),
        }
    }

    pub fn set_mut(&mut self, category: &Category) -> Option<&mut ModuleSet> {
        match category {
            Category::Script => Some(&mut self.scripts),
            Category::Style => Some(&mut self.styles),
            Category::Template => Some(&mut self.templates),
            Category::Header => Some(&mut self.header),
            Category::Custom(name) => self
                .custom
                .iter_mut()
                .find(|c| &c.name == name)
                .map(|c| &mut c.modules),
        }
    }

    pub fn comment_style(&self, category: &Category) -> Option<CommentStyle> {
        match category {
            Category::Custom(name) => self.custom_output(name).map(|c| c.comment),
            builtin => builtin.builtin_comment_style(),
        }
    }

    /// Members of `category` in insertion order; empty if it is undeclared.
    pub fn ordered_members(&self, category: &Category) -> Vec<PathBuf> {
        self.set(category).map(ModuleSet::ordered).unwrap_or_default()
    }

    /// Every category, built-ins first, then custom outputs in declaration order.
    pub fn categories(&self) -> Vec<Category> {
        let mut all = vec![
            Category::Template,
            Category::Header,
            Category::Style,
            Category::Script,
        ];
        all.extend(self.custom.iter().map(|c| Category::Custom(c.name.clone())));
        all
    }

    /// Union of all members across categories, each path once, in
    /// [`categories`](Self::categories) order.
    pub fn all_members(&self) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        self.categories()
            .iter()
            .flat_map(|c| self.ordered_members(c))
            .filter(|p| seen.insert(p.clone()))
            .collect()
    }
}
