use clap::Parser;
use develweb::builder::{BuildError, Builder};
use develweb::langfile::TranslationTable;
use develweb::{config, output, paths};
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit status of a failed build.
const EXIT_ERROR: u8 = 5;

#[derive(Parser)]
#[command(name = "develweb")]
#[command(about = "Assemble a web page from modules")]
#[command(long_about = "\
Assemble a web page from modules

A page file lists modules, one per line, without extension. Every existing
.html/.htm, .css, .js and .hdr file of a module joins the page. Modules name
their own dependencies in comments:

  widget.css:   /*!require base.css*/
  app.js:       //!require lib/router.js
  page.html:    <!--!require @sw worker.js-->

Page directives:

  !include <page>            parse another page file
  !html / !css / !js <file>  output names (default: page name)
  !dir <dir>                 root directory of the outputs
  !charset <charset>         <meta charset>
  !entry_point <call>        <body onload>
  !output <name> <file>      bundle @name requires into <file>

Text written as {{namespace::text}} is translated with the language file (-l).
Keys without a translation keep their text and can be exported with -g.

Run 'develweb --gen-config' to generate a documented develweb.toml.")]
#[command(version)]
struct Cli {
    /// Page file to build
    #[arg(required_unless_present = "gen_config")]
    input: Option<PathBuf>,

    /// Collapse scripts and styles into one bundle each
    #[arg(short = 'c', long)]
    collapse: bool,

    /// Do not write any output besides the dependency file
    #[arg(short = 'x', long)]
    no_output: bool,

    /// Write a Make dependency file
    #[arg(short = 'd', long, value_name = "FILE")]
    depfile: Option<PathBuf>,

    /// Target of the dependency rule (default: the HTML page)
    #[arg(short = 't', long, value_name = "TARGET", requires = "depfile")]
    target: Option<PathBuf>,

    /// Add a phony rule for every prerequisite
    #[arg(short = 'p', long)]
    phony: bool,

    /// Language file with translations
    #[arg(short = 'l', long = "lang", value_name = "FILE")]
    lang: Option<PathBuf>,

    /// Export keys without a translation to this file
    #[arg(short = 'g', long = "missing", value_name = "FILE")]
    missing: Option<PathBuf>,

    /// Write the resolved modules as JSON
    #[arg(long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Print the resolved modules and the outputs written
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Print a stock develweb.toml with all options documented
    #[arg(long)]
    gen_config: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", output::format_error(&e));
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run(cli: Cli) -> Result<(), BuildError> {
    if cli.gen_config {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }
    let Some(input) = cli.input else {
        return Ok(());
    };

    let config = config::load_config(&paths::dirname(&input))?;
    let collapse = cli.collapse || config.build.collapse;
    let phony = cli.phony || config.build.phony;
    let lang = cli.lang.or(config.language.file);
    let missing = cli.missing.or(config.language.missing);

    let mut builder = match &lang {
        Some(path) => Builder::with_language_file(path)?,
        None => Builder::new(TranslationTable::new()),
    };
    output::print_warnings(&builder.take_warnings());

    builder.parse_page_file(&input)?;
    if let Some(charset) = &config.build.charset {
        builder.default_charset(charset);
    }
    let root = builder
        .settings()
        .map(|s| s.root_dir.clone())
        .unwrap_or_default();
    if cli.verbose {
        output::print_plan(builder.modules(), &root);
    }

    if let Some(depfile) = &cli.depfile {
        builder.write_dep_file(depfile, cli.target.as_deref(), phony)?;
    }
    if let Some(manifest) = &cli.manifest {
        builder.write_manifest(manifest)?;
    }

    let mut page = None;
    if !cli.no_output {
        let mut bundles = builder.collapse_custom_outputs()?;
        if collapse {
            bundles.extend(builder.collapse_externals()?);
        }
        page = Some(builder.build_output()?);
        if cli.verbose {
            output::print_bundles(&bundles, builder.modules(), &root);
        }
    }

    if let Some(path) = &missing {
        builder.export_missing(path)?;
    }
    output::print_warnings(&builder.take_warnings());

    if cli.verbose {
        output::print_summary(
            page.as_deref(),
            builder.translator().missing_keys().len(),
            missing.as_deref(),
            &root,
        );
    }
    Ok(())
}
