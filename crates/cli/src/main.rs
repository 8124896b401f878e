//! mdport: rewrites legacy blog-post markup into static-site shortcodes.
//!
//! Fully sequential driver: every `*.md` under the target directory is
//! read, transformed end-to-end, and written back in place before the next
//! document begins. A fatal error aborts the whole batch; documents already
//! rewritten remain rewritten.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use walkdir::WalkDir;

use mdport_core::{CodeConverter, Converter, DEFAULT_TITLE_LEVEL, ImageConverter};

#[derive(Parser)]
#[command(name = "mdport")]
#[command(about = "Legacy blog-post normalizer emitting static-site shortcodes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite documents under a directory with the selected engine
    Convert {
        /// Target directory, scanned recursively for *.md files
        dir: PathBuf,
        #[command(subcommand)]
        engine: Engine,
    },
    /// Move each *.md into its own directory as index.md (page bundles)
    Restructure {
        /// Target directory, scanned recursively for *.md files
        dir: PathBuf,
    },
}

#[derive(Subcommand)]
enum Engine {
    /// Normalize <pre> markup into annotated fenced code
    Code {
        /// Heading depth for code block titles
        #[arg(long, default_value_t = DEFAULT_TITLE_LEVEL)]
        title_level: usize,
    },
    /// Normalize legacy image markup into figure shortcodes
    Img {
        /// Base URL prefix to strip from legacy references
        previous_url: String,
        /// Directory holding the exported source assets
        data_source: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Convert { dir, engine } => {
            let converter = match engine {
                Engine::Code { title_level } => Converter::Code(CodeConverter::new(title_level)),
                Engine::Img {
                    previous_url,
                    data_source,
                } => Converter::Image(ImageConverter::new(previous_url, data_source)?),
            };
            convert_tree(&dir, &converter)
        }
        Commands::Restructure { dir } => restructure_tree(&dir),
    }
}

/// Collects every `*.md` under `dir`, fully, before any mutation, so the
/// walk never observes its own output.
fn markdown_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("target directory does not exist: {}", dir.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == "md") {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

fn convert_tree(dir: &Path, converter: &Converter) -> Result<()> {
    for path in markdown_files(dir)? {
        info!("updating {}", path.display());
        let content =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let converted = converter.convert(&content, &path)?;
        fs::write(&path, converted).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

fn restructure_tree(dir: &Path) -> Result<()> {
    for path in markdown_files(dir)? {
        let stem = path
            .file_stem()
            .map(|stem| stem.to_os_string())
            .context("markdown file has no stem")?;
        let bundle_dir = path.with_file_name(stem);
        let target = bundle_dir.join("index.md");
        info!("moving {} -> {}", path.display(), target.display());
        fs::create_dir(&bundle_dir)
            .with_context(|| format!("creating {}", bundle_dir.display()))?;
        fs::rename(&path, &target).with_context(|| format!("moving {}", path.display()))?;
    }
    Ok(())
}
