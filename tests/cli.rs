//! End-to-end tests driving the `develweb` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn site(files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (name, content) in files {
        let path = tmp.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    tmp
}

fn develweb(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_develweb"))
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap()
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap()
}

#[test]
fn builds_page_with_linked_modules() {
    let tmp = site(&[
        ("index.page", "base\nwidget\n"),
        ("base.css", "body {}\n"),
        ("base.js", "var base;\n"),
        ("widget.css", "/*!require base.css*/\n.widget {}\n"),
        ("widget.html", "<div class=\"widget\"></div>\n"),
    ]);

    let out = develweb(tmp.path(), &["index.page"]);

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let html = read(tmp.path(), "index.html");
    assert!(html.starts_with("<!DOCTYPE html>"));
    let base = html.find(r#"href="base.css""#).unwrap();
    let widget = html.find(r#"href="widget.css""#).unwrap();
    assert!(base < widget);
    assert_eq!(html.matches(r#"href="base.css""#).count(), 1);
    assert!(html.contains(r#"<div class="widget"></div>"#));
    assert!(html.contains(r#"src="base.js""#));
}

#[test]
fn collapse_writes_bundles() {
    let tmp = site(&[
        ("index.page", "app\n"),
        ("app.js", "//!require lib/util.js\nvar app;\n"),
        ("lib/util.js", "var util;\n"),
        ("app.css", "a {}\n"),
    ]);

    let out = develweb(tmp.path(), &["-c", "index.page"]);

    assert!(out.status.success());
    assert_eq!(read(tmp.path(), "index.js"), "var util;\nvar app;\n\n");
    assert_eq!(read(tmp.path(), "index.css"), "a {}\n\n");
    let html = read(tmp.path(), "index.html");
    assert!(html.contains(r#"src="index.js""#));
    assert!(!html.contains(r#"src="app.js""#));
}

#[test]
fn translates_and_exports_missing_keys() {
    let tmp = site(&[
        ("index.page", "form\n"),
        (
            "form.html",
            "<button>{{ui::Save}}</button><button>{{ui::Cancel}}</button>\n",
        ),
        ("cs.lang", "\"ui\",\"Save\",\"Uložit\"\n"),
    ]);

    let out = develweb(tmp.path(), &["-l", "cs.lang", "-g", "todo.lang", "index.page"]);

    assert!(out.status.success());
    let html = read(tmp.path(), "index.html");
    assert!(html.contains("<button>Uložit</button><button>Cancel</button>"));
    assert_eq!(read(tmp.path(), "todo.lang"), "\"ui\",\"Cancel\",\"\"\n");
}

#[test]
fn dependency_file_only() {
    let tmp = site(&[("index.page", "base\n"), ("base.css", "")]);

    let out = develweb(
        tmp.path(),
        &["-x", "-p", "-d", "index.d", "-t", "index.html", "index.page"],
    );

    assert!(out.status.success());
    assert!(!tmp.path().join("index.html").exists());
    assert_eq!(
        read(tmp.path(), "index.d"),
        "index.html index.d : \\\nbase.css\n\nbase.css:\n"
    );
}

#[test]
fn missing_module_exits_with_error() {
    let tmp = site(&[("index.page", "nowhere\n")]);

    let out = develweb(tmp.path(), &["index.page"]);

    assert_eq!(out.status.code(), Some(5));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.starts_with("ERROR: "), "{stderr}");
    assert!(stderr.contains("nowhere"));
}

#[test]
fn config_file_enables_collapse() {
    let tmp = site(&[
        ("develweb.toml", "[build]\ncollapse = true\ncharset = \"utf-8\"\n"),
        ("index.page", "app\n"),
        ("app.js", "var app;\n"),
    ]);

    let out = develweb(tmp.path(), &["index.page"]);

    assert!(out.status.success());
    assert!(tmp.path().join("index.js").exists());
    assert!(read(tmp.path(), "index.html").contains(r#"<meta charset="utf-8">"#));
}

#[test]
fn gen_config_prints_stock_file() {
    let tmp = TempDir::new().unwrap();
    let out = develweb(tmp.path(), &["--gen-config"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("[build]"));
    assert!(stdout.contains("[language]"));
}

#[test]
fn manifest_is_json() {
    let tmp = site(&[("index.page", "base\n"), ("base.js", "")]);

    let out = develweb(tmp.path(), &["-x", "--manifest", "plan.json", "index.page"]);

    assert!(out.status.success());
    let manifest: serde_json::Value =
        serde_json::from_str(&read(tmp.path(), "plan.json")).unwrap();
    assert_eq!(manifest["scripts"][0], "base.js");
    assert_eq!(manifest["html"], "index.html");
}

#[test]
fn latin2_module_is_copied_byte_for_byte() {
    let tmp = site(&[("index.page", "!charset iso-8859-2\npage\n")]);
    fs::write(tmp.path().join("page.html"), b"<button>Ulo\xBEit</button>\n").unwrap();

    let out = develweb(tmp.path(), &["index.page"]);

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let html = fs::read(tmp.path().join("index.html")).unwrap();
    let needle = b"<button>Ulo\xBEit</button>\n";
    assert!(html.windows(needle.len()).any(|w| w == needle));
}

#[test]
fn included_language_files_are_dependencies() {
    let tmp = site(&[
        ("index.page", "form\n"),
        ("form.html", "<b>{{ui::Open}}</b>\n"),
        ("lang/cs.lang", "!include common.lang\n"),
        ("lang/common.lang", "\"ui\",\"Open\",\"Otevřít\"\n"),
    ]);

    let out = develweb(tmp.path(), &["-l", "lang/cs.lang", "-d", "index.d", "index.page"]);

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(read(tmp.path(), "index.html").contains("<b>Otevřít</b>"));
    assert_eq!(
        read(tmp.path(), "index.d"),
        "index.html index.d : \\\nform.html \\\nlang/cs.lang \\\nlang/common.lang\n"
    );
}

#[test]
fn config_cascades_from_working_directory() {
    let tmp = site(&[
        ("develweb.toml", "[build]\ncollapse = true\n"),
        ("site/develweb.toml", "[build]\ncharset = \"utf-8\"\n"),
        ("site/index.page", "app\n"),
        ("site/app.js", "var app;\n"),
    ]);

    let out = develweb(tmp.path(), &["site/index.page"]);

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(tmp.path().join("site/index.js").exists());
    assert!(read(tmp.path(), "site/index.html").contains(r#"<meta charset="utf-8">"#));
}
