//! docroff — render Unix manual pages from structured module descriptions.
//!
//! The input is a JSON description of a module's public interface (name,
//! doc comments, declarations, signatures) as produced by a documentation
//! front end. The output is a troff document for the man macro package.
//!
//! Two modes:
//!
//! - **stdin mode**: `docroff < module.json` writes the page to stdout
//! - **file mode**: `docroff -o man module.json` writes one `<name>.<sec>`
//!   file per input (glob patterns supported)

mod comment;
mod model;
mod page;
mod refs;
mod roff;
mod sig;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "docroff",
    about = "Generate Unix manual pages from structured module documentation"
)]
struct Cli {
    /// Input module descriptions in JSON (glob patterns supported).
    /// If omitted, reads from stdin.
    files: Vec<String>,

    /// Output directory (required when files are given)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Display name for the page title (defaults to the module name)
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// Version string. Defaults to the module's declared version, then a
    /// `Version` constant, then the page date.
    #[arg(long)]
    page_version: Option<String>,

    /// Manual category shown in the page header
    #[arg(long)]
    manual: Option<String>,

    /// Import path shown in SYNOPSIS
    #[arg(long)]
    import_path: Option<String>,

    /// Manual section number
    #[arg(long, default_value = "3")]
    man_section: String,

    /// Page date as yyyy-mm-dd (defaults to today)
    #[arg(long)]
    date: Option<String>,

    /// Override or add a page section: NAME=FILE, repeatable.
    /// The file's text supplies the section's paragraphs.
    #[arg(short = 's', long = "section", value_name = "NAME=FILE")]
    sections: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.files.is_empty() {
        return stdin_mode(&cli);
    }

    file_mode(&cli)
}

/// stdin mode: read one module description, write the page to stdout.
fn stdin_mode(cli: &Cli) -> Result<()> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    let module: model::Module =
        serde_json::from_str(&input).context("failed to parse module description")?;
    let overrides = read_overrides(&cli.sections)?;
    let rendered = page::ManPage::new(&module, &config(cli), overrides).render()?;
    print!("{}", rendered);
    Ok(())
}

/// file mode: process multiple module descriptions into an output directory.
fn file_mode(cli: &Cli) -> Result<()> {
    let output_dir = cli
        .output
        .as_deref()
        .context("--output is required when files are given")?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory: {}", output_dir.display()))?;

    let cfg = config(cli);
    let overrides = read_overrides(&cli.sections)?;
    let input_files = expand_globs(&cli.files)?;

    for path in &input_files {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let module: model::Module = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("warning: skipping {}: {}", path.display(), e);
                continue;
            }
        };

        let man = page::ManPage::new(&module, &cfg, overrides.clone());
        let rendered = man
            .render()
            .with_context(|| format!("failed to render {}", path.display()))?;

        let name = cfg.name.clone().unwrap_or_else(|| module.name.clone());
        let out_path = output_dir.join(format!("{}.{}", name, cfg.section));
        fs::write(&out_path, &rendered)
            .with_context(|| format!("failed to write {}", out_path.display()))?;
    }

    Ok(())
}

fn config(cli: &Cli) -> page::Config {
    page::Config {
        name: cli.name.clone(),
        version: cli.page_version.clone(),
        manual: cli.manual.clone(),
        import_path: cli.import_path.clone(),
        section: cli.man_section.clone(),
        date: cli
            .date
            .clone()
            .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string()),
    }
}

/// Parse `-s NAME=FILE` overrides. The file's text is split into
/// paragraphs; heading detection does not apply inside an override.
fn read_overrides(args: &[String]) -> Result<Vec<comment::Section>> {
    let mut sections = Vec::new();
    for arg in args {
        let (name, file) = arg
            .split_once('=')
            .with_context(|| format!("bad --section value (want NAME=FILE): {}", arg))?;
        let text = fs::read_to_string(file)
            .with_context(|| format!("failed to read section file: {}", file))?;
        sections.push(comment::Section {
            name: name.to_string(),
            paras: comment::paragraphs(&text),
        });
    }
    Ok(sections)
}

/// File extensions recognized as module descriptions.
const SUPPORTED_EXTENSIONS: &[&str] = &["json"];

/// Expand glob patterns into a list of real file paths.
/// Also handles bare directory paths by scanning for supported file types.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        if path.is_dir() {
            let entries = fs::read_dir(path)
                .with_context(|| format!("failed to read directory: {}", path.display()))?;
            for entry in entries.flatten() {
                let p = entry.path();
                if p.is_file() {
                    if let Some(ext) = p.extension().and_then(|e| e.to_str()) {
                        if SUPPORTED_EXTENSIONS.contains(&ext) {
                            files.push(p);
                        }
                    }
                }
            }
            continue;
        }
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            eprintln!("warning: no files matched: {}", pattern);
        }
        files.extend(matches);
    }
    // Sort for deterministic output
    files.sort();
    files.dedup();
    Ok(files)
}
