//! One build run: page parsing, module resolution, bundling and output.
//!
//! A [`Builder`] owns all state of a run (module sets, page settings, the
//! translator and its missing keys), so nothing is global and two builders
//! never see each other's modules.
//!
//! ```text
//! Builder::new(table)
//!   .parse_page_file("site/index.page")   → module sets filled
//!   .write_dep_file(..)                   → index.d
//!   .collapse_custom_outputs()            → @name bundles
//!   .collapse_externals()                 → index.css / index.js (with -c)
//!   .build_output()                       → index.html
//!   .export_missing(..)                   → todo.lang
//! ```

use crate::bundle::{self, CollapseOutcome, WritePolicy};
use crate::category::Category;
use crate::config::ConfigError;
use crate::depfile::DepRule;
use crate::html::{self, PageDocument};
use crate::langfile::{self, LangFileError, TranslationTable};
use crate::modules::Modules;
use crate::page::{self, Directive, DirectiveError, PageSettings};
use crate::paths;
use crate::translate::{TranslateError, Translator};
use crate::walker::{WalkError, Walker};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Error opening (reading) the file: {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error opening (writing) the file: {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path}:{line}: {source}")]
    Directive {
        path: PathBuf,
        line: usize,
        #[source]
        source: DirectiveError,
    },
    #[error("{path}:{line}: output is already defined: @{name}")]
    DuplicateOutput {
        path: PathBuf,
        line: usize,
        name: String,
    },
    #[error("{path}:{line}: cannot find module: {module}")]
    UnresolvedModule {
        path: PathBuf,
        line: usize,
        module: String,
    },
    #[error("no page file has been parsed")]
    NoPage,
    #[error(transparent)]
    Walk(#[from] WalkError),
    #[error(transparent)]
    Translate(#[from] TranslateError),
    #[error(transparent)]
    LangFile(#[from] LangFileError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Something that went wrong without stopping the build.
#[derive(Debug)]
pub enum Warning {
    /// A write that failed under [`WritePolicy::Warn`].
    WriteFailed { path: PathBuf, error: io::Error },
    /// A language file row that could not be parsed.
    LangFile(LangFileError),
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::WriteFailed { path, error } => {
                write!(f, "Error writing to file: {}: {error}", path.display())
            }
            Warning::LangFile(e) => write!(f, "{e}"),
        }
    }
}

/// A bundle written by [`Builder::collapse_externals`] or
/// [`Builder::collapse_custom_outputs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleReport {
    pub category: Category,
    pub path: PathBuf,
    pub modules: usize,
}

/// State of one build run.
#[derive(Debug)]
pub struct Builder {
    settings: Option<PageSettings>,
    modules: Modules,
    translator: Translator,
    lang_files: Vec<PathBuf>,
    open_pages: HashSet<PathBuf>,
    warnings: Vec<Warning>,
}

impl Builder {
    pub fn new(table: TranslationTable) -> Self {
        Self {
            settings: None,
            modules: Modules::new(),
            translator: Translator::new(table),
            lang_files: Vec::new(),
            open_pages: HashSet::new(),
            warnings: Vec::new(),
        }
    }

    /// Builder with the translation table read from `path`.
    ///
    /// Rows that fail to parse become warnings. The file and every file it
    /// includes are listed in the dependency file.
    pub fn with_language_file(path: &Path) -> Result<Self, BuildError> {
        let loaded = langfile::load(path)?;
        let mut builder = Self::new(loaded.table);
        builder.lang_files = loaded.files;
        builder
            .warnings
            .extend(loaded.warnings.into_iter().map(Warning::LangFile));
        Ok(builder)
    }

    pub fn modules(&self) -> &Modules {
        &self.modules
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    /// Settings of the parsed page; `None` before [`parse_page_file`](Self::parse_page_file).
    pub fn settings(&self) -> Option<&PageSettings> {
        self.settings.as_ref()
    }

    /// Warnings collected so far, oldest first.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }

    // =========================================================================
    // Page parsing
    // =========================================================================

    /// Parse the root page file and resolve every module it names.
    pub fn parse_page_file(&mut self, path: &Path) -> Result<(), BuildError> {
        self.settings = Some(PageSettings::for_page_file(path));
        self.parse_file(&paths::normalize(path))
    }

    /// Set the charset unless the page already chose one.
    pub fn default_charset(&mut self, charset: &str) {
        if let Some(settings) = self.settings.as_mut()
            && settings.charset.is_none()
        {
            settings.charset = Some(charset.to_string());
        }
    }

    fn parse_file(&mut self, path: &Path) -> Result<(), BuildError> {
        if !self.open_pages.insert(path.to_path_buf()) {
            return Ok(());
        }
        let result = self.parse_file_contents(path);
        self.open_pages.remove(path);
        result
    }

    fn parse_file_contents(&mut self, path: &Path) -> Result<(), BuildError> {
        let content = fs::read(path).map_err(|source| BuildError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let content = if self.translator.table().is_empty() {
            content
        } else {
            self.translator.translate_text(&content, None)
        };
        let text = String::from_utf8_lossy(&content);

        let dir = paths::dirname(path);
        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let directive = page::parse_line(line).map_err(|source| BuildError::Directive {
                path: path.to_path_buf(),
                line: line_no,
                source,
            })?;
            if let Some(directive) = directive {
                self.apply(path, &dir, line_no, directive)?;
            }
        }
        Ok(())
    }

    fn apply(
        &mut self,
        path: &Path,
        dir: &Path,
        line: usize,
        directive: Directive,
    ) -> Result<(), BuildError> {
        let settings = self.settings.get_or_insert_with(|| PageSettings::for_page_file(path));
        match directive {
            Directive::Include(file) => return self.parse_file(&paths::resolve(dir, file)),
            Directive::Html(name) => settings.html_name = name,
            Directive::Css(name) => settings.css_name = name,
            Directive::Js(name) => settings.js_name = name,
            Directive::Dir(dir_name) => {
                settings.root_dir = paths::resolve(&settings.page_dir, dir_name);
            }
            Directive::Charset(charset) => settings.charset = Some(charset),
            Directive::EntryPoint(call) => settings.entry_point = Some(call),
            Directive::Output { name, file } => {
                let target = paths::resolve(&settings.root_dir, file);
                if !self.modules.declare_custom_output(&name, target) {
                    return Err(BuildError::DuplicateOutput {
                        path: path.to_path_buf(),
                        line,
                        name,
                    });
                }
            }
            Directive::Module(module) => return self.add_module(path, dir, line, &module),
        }
        Ok(())
    }

    /// Walk every existing file of a module line.
    fn add_module(
        &mut self,
        path: &Path,
        dir: &Path,
        line: usize,
        module: &str,
    ) -> Result<(), BuildError> {
        let base = paths::resolve(dir, module);
        let mut found = false;
        let mut walker = Walker::new(&mut self.modules);
        for (file, category) in page::module_candidates(&base) {
            if file.is_file() {
                found = true;
                walker.walk(category, &file, true)?;
            }
        }
        if found {
            Ok(())
        } else {
            Err(BuildError::UnresolvedModule {
                path: path.to_path_buf(),
                line,
                module: module.to_string(),
            })
        }
    }

    // =========================================================================
    // Bundles
    // =========================================================================

    /// Collapse styles and scripts into the page's `.css` and `.js` bundles.
    pub fn collapse_externals(&mut self) -> Result<Vec<BundleReport>, BuildError> {
        let settings = self.page_settings()?;
        let targets = [
            (Category::Style, settings.css_path()),
            (Category::Script, settings.js_path()),
        ];
        let mut reports = Vec::new();
        for (category, target) in targets {
            reports.extend(self.collapse(category, &target)?);
        }
        Ok(reports)
    }

    /// Bundle every custom output into its declared file.
    pub fn collapse_custom_outputs(&mut self) -> Result<Vec<BundleReport>, BuildError> {
        let outputs: Vec<(Category, PathBuf)> = self
            .modules
            .custom_outputs()
            .iter()
            .map(|c| (Category::Custom(c.name.clone()), c.path.clone()))
            .collect();
        let mut reports = Vec::new();
        for (category, target) in outputs {
            reports.extend(self.collapse(category, &target)?);
        }
        Ok(reports)
    }

    fn collapse(
        &mut self,
        category: Category,
        target: &Path,
    ) -> Result<Option<BundleReport>, BuildError> {
        let comment = self.modules.comment_style(&category);
        let Some(set) = self.modules.set_mut(&category) else {
            return Ok(None);
        };
        let outcome = bundle::collapse(set, target, comment.as_ref(), &mut self.translator)?;
        match outcome {
            CollapseOutcome::Written { path, modules } => Ok(Some(BundleReport {
                category,
                path,
                modules,
            })),
            CollapseOutcome::WriteFailed { path, error } => {
                self.write_failed(bundle::BUNDLE_WRITE_POLICY, path, error)?;
                Ok(None)
            }
        }
    }

    /// Apply `policy` to a failed write.
    fn write_failed(
        &mut self,
        policy: WritePolicy,
        path: PathBuf,
        error: io::Error,
    ) -> Result<(), BuildError> {
        match policy {
            WritePolicy::Abort => Err(BuildError::Write {
                path,
                source: error,
            }),
            WritePolicy::Warn => {
                self.warnings.push(Warning::WriteFailed { path, error });
                Ok(())
            }
        }
    }

    // =========================================================================
    // Outputs
    // =========================================================================

    /// Assemble the page document from the current module sets.
    pub fn document(&mut self) -> Result<PageDocument, BuildError> {
        let settings = self.page_settings()?.clone();
        let root = &settings.root_dir;
        let hrefs = |members: Vec<PathBuf>| -> Vec<String> {
            members
                .iter()
                .map(|m| paths::relative_href(root, m))
                .collect()
        };

        Ok(PageDocument {
            styles: hrefs(self.modules.ordered_members(&Category::Style)),
            header: self.inline(&Category::Header)?,
            charset: settings.charset.clone(),
            entry_point: settings.entry_point.clone(),
            templates: self.inline(&Category::Template)?,
            scripts: hrefs(self.modules.ordered_members(&Category::Script)),
        })
    }

    /// Translated content of each member of `category`.
    fn inline(&mut self, category: &Category) -> Result<Vec<Vec<u8>>, BuildError> {
        let comment = self.modules.comment_style(category);
        let mut fragments = Vec::new();
        for member in self.modules.ordered_members(category) {
            let mut buf = Vec::new();
            self.translator
                .translate_file(&member, comment.as_ref(), &mut buf)?;
            fragments.push(buf);
        }
        Ok(fragments)
    }

    /// Write the HTML page. Returns its path.
    pub fn build_output(&mut self) -> Result<PathBuf, BuildError> {
        let target = self.page_settings()?.html_path();
        let document = self.document()?;
        let mut page = html::render_page(&document);
        page.push(b'\n');
        if let Err(error) = fs::write(&target, page) {
            self.write_failed(bundle::OUTPUT_WRITE_POLICY, target.clone(), error)?;
        }
        Ok(target)
    }

    /// Prerequisites of the page: every module plus the language files.
    pub fn dependencies(&self) -> Vec<PathBuf> {
        let mut deps = self.modules.all_members();
        for lang in &self.lang_files {
            if !deps.contains(lang) {
                deps.push(lang.clone());
            }
        }
        deps
    }

    /// Write a Make rule for the page to `depfile`.
    ///
    /// `target` defaults to the HTML page path.
    pub fn write_dep_file(
        &mut self,
        depfile: &Path,
        target: Option<&Path>,
        phony: bool,
    ) -> Result<(), BuildError> {
        let target = match target {
            Some(t) => t.to_path_buf(),
            None => self.page_settings()?.html_path(),
        };
        let rule = DepRule {
            target,
            depfile: depfile.to_path_buf(),
            prerequisites: self.dependencies(),
            phony,
        };
        if let Err(error) = write_with(depfile, |out| rule.write_to(out)) {
            self.write_failed(bundle::OUTPUT_WRITE_POLICY, depfile.to_path_buf(), error)?;
        }
        Ok(())
    }

    /// Write keys that had no translation to `path`.
    pub fn export_missing(&self, path: &Path) -> Result<(), BuildError> {
        langfile::export_missing(self.translator.missing_keys(), path)?;
        Ok(())
    }

    /// Snapshot of the resolved modules.
    pub fn manifest(&self) -> Result<Manifest, BuildError> {
        let settings = self.page_settings()?;
        let ordered = |c: Category| self.modules.ordered_members(&c);
        Ok(Manifest {
            html: settings.html_path(),
            templates: ordered(Category::Template),
            header: ordered(Category::Header),
            styles: ordered(Category::Style),
            scripts: ordered(Category::Script),
            outputs: self
                .modules
                .custom_outputs()
                .iter()
                .map(|c| OutputManifest {
                    name: c.name.clone(),
                    path: c.path.clone(),
                    modules: c.modules.ordered(),
                })
                .collect(),
            missing_keys: self
                .translator
                .missing_keys()
                .iter()
                .map(|k| String::from_utf8_lossy(k).into_owned())
                .collect(),
        })
    }

    /// Write [`manifest`](Self::manifest) as pretty JSON.
    pub fn write_manifest(&mut self, path: &Path) -> Result<(), BuildError> {
        let json = serde_json::to_string_pretty(&self.manifest()?)?;
        if let Err(error) = fs::write(path, json) {
            self.write_failed(bundle::OUTPUT_WRITE_POLICY, path.to_path_buf(), error)?;
        }
        Ok(())
    }

    fn page_settings(&self) -> Result<&PageSettings, BuildError> {
        self.settings.as_ref().ok_or(BuildError::NoPage)
    }
}

fn write_with<F>(path: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut BufWriter<fs::File>) -> io::Result<()>,
{
    let mut out = BufWriter::new(fs::File::create(path)?);
    write(&mut out)?;
    out.flush()
}

/// Resolved modules of a build, serialized by `--manifest`.
#[derive(Debug, Serialize)]
pub struct Manifest {
    pub html: PathBuf,
    pub templates: Vec<PathBuf>,
    pub header: Vec<PathBuf>,
    pub styles: Vec<PathBuf>,
    pub scripts: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<OutputManifest>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_keys: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct OutputManifest {
    pub name: String,
    pub path: PathBuf,
    pub modules: Vec<PathBuf>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{member_names, write_files};
    use tempfile::TempDir;

    fn parse(tmp: &TempDir, page: &str) -> Builder {
        let mut builder = Builder::new(TranslationTable::new());
        builder.parse_page_file(&tmp.path().join(page)).unwrap();
        builder
    }

    fn names(builder: &Builder, category: Category, tmp: &TempDir) -> Vec<String> {
        member_names(builder.modules(), &category, tmp.path())
    }

    #[test]
    fn shared_style_listed_once_across_modules() {
        let tmp = write_files(&[
            ("index.page", "base\nwidget\n"),
            ("base.css", "body {}\n"),
            ("base.js", "var base;\n"),
            ("widget.css", "/*!require base.css*/\n.widget {}\n"),
        ]);
        let builder = parse(&tmp, "index.page");
        assert_eq!(
            names(&builder, Category::Style, &tmp),
            ["base.css", "widget.css"]
        );
        assert_eq!(names(&builder, Category::Script, &tmp), ["base.js"]);
    }

    #[test]
    fn module_line_collects_every_existing_extension() {
        let tmp = write_files(&[
            ("index.page", "lib/calendar\n"),
            ("lib/calendar.html", "<template></template>\n"),
            ("lib/calendar.css", ".cal {}\n"),
            ("lib/calendar.js", "var cal;\n"),
            ("lib/calendar.hdr", "<meta name=\"x\">\n"),
        ]);
        let builder = parse(&tmp, "index.page");
        assert_eq!(names(&builder, Category::Template, &tmp), ["lib/calendar.html"]);
        assert_eq!(names(&builder, Category::Style, &tmp), ["lib/calendar.css"]);
        assert_eq!(names(&builder, Category::Script, &tmp), ["lib/calendar.js"]);
        assert_eq!(names(&builder, Category::Header, &tmp), ["lib/calendar.hdr"]);
    }

    #[test]
    fn missing_module_reports_page_line() {
        let tmp = write_files(&[("index.page", "# modules\nnowhere\n")]);
        let mut builder = Builder::new(TranslationTable::new());
        let err = builder
            .parse_page_file(&tmp.path().join("index.page"))
            .unwrap_err();
        match err {
            BuildError::UnresolvedModule { line, module, .. } => {
                assert_eq!(line, 2);
                assert_eq!(module, "nowhere");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_directive_is_fatal() {
        let tmp = write_files(&[("index.page", "!title Home\n")]);
        let mut builder = Builder::new(TranslationTable::new());
        let err = builder
            .parse_page_file(&tmp.path().join("index.page"))
            .unwrap_err();
        assert!(matches!(err, BuildError::Directive { line: 1, .. }));
    }

    #[test]
    fn include_cycle_between_pages_terminates() {
        let tmp = write_files(&[
            ("index.page", "!include common.page\nmain\n"),
            ("common.page", "!include index.page\nbase\n"),
            ("base.js", "var base;\n"),
            ("main.js", "var main;\n"),
        ]);
        let builder = parse(&tmp, "index.page");
        assert_eq!(
            names(&builder, Category::Script, &tmp),
            ["base.js", "main.js"]
        );
    }

    #[test]
    fn directives_rename_outputs() {
        let tmp = write_files(&[
            (
                "src/index.page",
                "!dir ../www\n!html home.html\n!css all.css\n!js all.js\n!charset utf-8\n",
            ),
            ("www/.keep", ""),
        ]);
        let builder = parse(&tmp, "src/index.page");
        let settings = builder.settings().unwrap();
        assert_eq!(settings.html_path(), tmp.path().join("www/home.html"));
        assert_eq!(settings.css_path(), tmp.path().join("www/all.css"));
        assert_eq!(settings.js_path(), tmp.path().join("www/all.js"));
        assert_eq!(settings.charset.as_deref(), Some("utf-8"));
    }

    #[test]
    fn duplicate_output_is_fatal() {
        let tmp = write_files(&[("index.page", "!output sw a.js\n!output sw b.js\n")]);
        let mut builder = Builder::new(TranslationTable::new());
        let err = builder
            .parse_page_file(&tmp.path().join("index.page"))
            .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateOutput { line: 2, .. }));
    }

    #[test]
    fn page_text_is_translated_before_parsing() {
        let tmp = write_files(&[
            ("index.page", "!html {{page::file}}\n"),
            ("base.js", ""),
        ]);
        let mut table = TranslationTable::new();
        table.insert("page::file", "cs.html");
        let mut builder = Builder::new(table);
        builder
            .parse_page_file(&tmp.path().join("index.page"))
            .unwrap();
        assert_eq!(builder.settings().unwrap().html_name, "cs.html");
    }

    #[test]
    fn output_page_links_and_inlines_modules() {
        let tmp = write_files(&[
            ("index.page", "!charset utf-8\n!entry_point main()\nlib/base\n"),
            ("lib/base.css", "body {}\n"),
            ("lib/base.js", "function main() {}\n"),
            (
                "lib/base.html",
                "<!--!require base.css-->\n<button>{{ui::Save}}</button>\n",
            ),
        ]);
        let mut table = TranslationTable::new();
        table.insert("ui::Save", "Uložit");
        let mut builder = Builder::new(table);
        builder
            .parse_page_file(&tmp.path().join("index.page"))
            .unwrap();

        let target = builder.build_output().unwrap();
        let html = fs::read_to_string(target).unwrap();

        assert!(html.contains(r#"<link href="lib/base.css" rel="stylesheet" type="text/css">"#));
        assert!(html.contains(r#"<meta charset="utf-8">"#));
        assert!(html.contains(r#"<body onload="main()">"#));
        assert!(html.contains("<button>Uložit</button>"));
        assert!(!html.contains("!require"));
        assert!(html.contains(r#"<script src="lib/base.js" type="text/javascript"></script>"#));
    }

    #[test]
    fn collapse_replaces_members_with_bundles() {
        let tmp = write_files(&[
            ("index.page", "base\nwidget\n"),
            ("base.css", "body {}\n"),
            ("widget.css", "/*!require base.css*/\n.widget {}\n"),
            ("base.js", "var base;\n"),
        ]);
        let mut builder = parse(&tmp, "index.page");

        let reports = builder.collapse_externals().unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].modules, 2);
        assert_eq!(names(&builder, Category::Style, &tmp), ["index.css"]);
        assert_eq!(names(&builder, Category::Script, &tmp), ["index.js"]);
        assert_eq!(
            fs::read_to_string(tmp.path().join("index.css")).unwrap(),
            "body {}\n.widget {}\n\n"
        );
    }

    #[test]
    fn unwritable_bundle_becomes_warning() {
        let tmp = write_files(&[
            ("index.page", "!css missing/all.css\nbase\n"),
            ("base.css", "body {}\n"),
        ]);
        let mut builder = parse(&tmp, "index.page");

        builder.collapse_externals().unwrap();

        assert_eq!(builder.warnings().len(), 1);
        assert!(matches!(
            builder.warnings()[0],
            Warning::WriteFailed { .. }
        ));
        assert_eq!(names(&builder, Category::Style, &tmp), ["missing/all.css"]);
    }

    #[test]
    fn unwritable_page_is_fatal() {
        let tmp = write_files(&[
            ("index.page", "!html missing/index.html\nbase\n"),
            ("base.js", ""),
        ]);
        let mut builder = parse(&tmp, "index.page");
        assert!(matches!(
            builder.build_output().unwrap_err(),
            BuildError::Write { .. }
        ));
    }

    #[test]
    fn custom_output_bundled_separately() {
        let tmp = write_files(&[
            ("index.page", "!output sw sw.js\napp\n"),
            ("app.js", "//!require @sw worker/cache.js\nvar app;\n"),
            ("worker/cache.js", "var cache = '{{!timestamp}}';\n"),
        ]);
        let mut builder = parse(&tmp, "index.page");
        let sw = Category::Custom("sw".into());
        assert_eq!(names(&builder, sw.clone(), &tmp), ["worker/cache.js"]);

        let reports = builder.collapse_custom_outputs().unwrap();

        assert_eq!(reports[0].category, sw);
        let bundle = fs::read_to_string(tmp.path().join("sw.js")).unwrap();
        assert!(bundle.starts_with("var cache = '"));
        assert!(!bundle.contains("{{"));
        assert_eq!(names(&builder, Category::Script, &tmp), ["app.js"]);
    }

    #[test]
    fn dep_file_lists_members_and_language_file() {
        let tmp = write_files(&[
            ("index.page", "base\n"),
            ("base.css", ""),
            ("base.js", ""),
            ("cs.lang", "\"ui\",\"Save\",\"Uložit\"\n"),
        ]);
        let lang = tmp.path().join("cs.lang");
        let mut builder = Builder::with_language_file(&lang).unwrap();
        builder
            .parse_page_file(&tmp.path().join("index.page"))
            .unwrap();
        let depfile = tmp.path().join("index.d");

        builder.write_dep_file(&depfile, None, false).unwrap();

        let content = fs::read_to_string(&depfile).unwrap();
        let root = tmp.path();
        assert_eq!(
            content,
            format!(
                "{} {} : \\\n{} \\\n{} \\\n{}\n",
                root.join("index.html").display(),
                depfile.display(),
                root.join("base.css").display(),
                root.join("base.js").display(),
                lang.display(),
            )
        );
    }

    #[test]
    fn malformed_language_rows_are_warnings() {
        let tmp = write_files(&[("cs.lang", "\"ui\",\"Save\"\n\"ui\",\"Open\",\"Otevřít\"\n")]);
        let builder = Builder::with_language_file(&tmp.path().join("cs.lang")).unwrap();
        assert_eq!(builder.warnings().len(), 1);
        assert_eq!(
            builder.translator().table().get("ui::Open"),
            Some("Otevřít".as_bytes())
        );
    }

    #[test]
    fn missing_keys_exported_after_output() {
        let tmp = write_files(&[
            ("index.page", "page\n"),
            ("page.html", "<h1>{{title::Welcome}}</h1>\n"),
        ]);
        let mut builder = parse(&tmp, "index.page");
        builder.build_output().unwrap();
        let todo = tmp.path().join("todo.lang");

        builder.export_missing(&todo).unwrap();

        assert_eq!(
            fs::read_to_string(todo).unwrap(),
            "\"title\",\"Welcome\",\"\"\n"
        );
        let html = fs::read_to_string(tmp.path().join("index.html")).unwrap();
        assert!(html.contains("<h1>Welcome</h1>"));
    }

    #[test]
    fn manifest_lists_ordered_members() {
        let tmp = write_files(&[
            ("index.page", "!output sw sw.js\nbase\n"),
            ("base.js", "//!require @sw cache.js\n"),
            ("cache.js", ""),
        ]);
        let builder = parse(&tmp, "index.page");
        let manifest = builder.manifest().unwrap();
        assert_eq!(manifest.scripts, vec![tmp.path().join("base.js")]);
        assert_eq!(manifest.outputs[0].name, "sw");
        assert_eq!(manifest.outputs[0].modules, vec![tmp.path().join("cache.js")]);

        let json = serde_json::to_value(&manifest).unwrap();
        assert!(json.get("missing_keys").is_none());
    }

    #[test]
    fn charset_default_does_not_override_page() {
        let tmp = write_files(&[("index.page", "!charset latin2\n")]);
        let mut builder = parse(&tmp, "index.page");
        builder.default_charset("utf-8");
        assert_eq!(builder.settings().unwrap().charset.as_deref(), Some("latin2"));
    }

    #[test]
    fn outputs_need_a_parsed_page() {
        let mut builder = Builder::new(TranslationTable::new());
        assert!(matches!(builder.build_output(), Err(BuildError::NoPage)));
    }

    #[test]
    fn latin2_template_inlined_byte_for_byte() {
        let tmp = write_files(&[("index.page", "!charset iso-8859-2\npage\n")]);
        fs::write(tmp.path().join("page.html"), b"<button>Ulo\xBEit</button>\n").unwrap();
        let mut builder = parse(&tmp, "index.page");

        let html = fs::read(builder.build_output().unwrap()).unwrap();

        let needle = b"<button>Ulo\xBEit</button>\n";
        assert!(html.windows(needle.len()).any(|w| w == needle));
        let charset = br#"<meta charset="iso-8859-2">"#;
        assert!(html.windows(charset.len()).any(|w| w == charset));
    }

    #[test]
    fn latin2_template_translated_with_latin2_table() {
        let tmp = write_files(&[("index.page", "page\n")]);
        fs::write(tmp.path().join("page.html"), b"<b>{{ui::Save}}</b>\n").unwrap();
        fs::write(tmp.path().join("cs.lang"), b"\"ui\",\"Save\",\"Ulo\xBEit\"\n").unwrap();
        let mut builder = Builder::with_language_file(&tmp.path().join("cs.lang")).unwrap();
        builder
            .parse_page_file(&tmp.path().join("index.page"))
            .unwrap();

        let html = fs::read(builder.build_output().unwrap()).unwrap();

        let needle = b"<b>Ulo\xBEit</b>";
        assert!(html.windows(needle.len()).any(|w| w == needle));
    }

    #[test]
    fn dep_file_lists_included_language_files() {
        let tmp = write_files(&[
            ("index.page", "base\n"),
            ("base.js", ""),
            ("lang/cs.lang", "!include common/cs.lang\n\"ui\",\"Save\",\"Uložit\"\n"),
            ("lang/common/cs.lang", "\"ui\",\"Open\",\"Otevřít\"\n"),
        ]);
        let mut builder = Builder::with_language_file(&tmp.path().join("lang/cs.lang")).unwrap();
        builder
            .parse_page_file(&tmp.path().join("index.page"))
            .unwrap();

        let deps = builder.dependencies();

        assert_eq!(
            deps,
            vec![
                tmp.path().join("base.js"),
                tmp.path().join("lang/cs.lang"),
                tmp.path().join("lang/common/cs.lang"),
            ]
        );
        assert_eq!(
            builder.translator().table().get("ui::Open"),
            Some("Otevřít".as_bytes())
        );
    }
}
