//! apiref: generate Breathe API reference pages from a library header tree.
//!
//! Walks `<source>/libs/*/include`, writes one `libs/<lib>/api.rst` per
//! library with documented headers, and an aggregate `api.rst` built from a
//! template:
//!
//! ```text
//! apiref /path/to/source -o docs/sphinx
//! ```

mod model;
mod render;
mod scan;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "apiref",
    about = "Generate Breathe API reference pages from a library header tree"
)]
struct Cli {
    /// Source tree root containing the libs/ directory
    source: PathBuf,

    /// Documentation directory receiving the generated pages
    #[arg(short = 'o', long, default_value = ".")]
    output: PathBuf,

    /// Name of the top-level project
    #[arg(long, default_value = "hpx")]
    project: String,

    /// Extra top-level headers, one per line [default: <output>/headers.txt]
    #[arg(long)]
    headers: Option<PathBuf>,

    /// Aggregate page template [default: <source>/docs/sphinx/_templates/api.rst]
    #[arg(short = 't', long)]
    template: Option<PathBuf>,

    /// Also write the Breathe project mapping as JSON
    #[arg(long)]
    projects_json: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "apiref=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    generate(&cli)
}

/// Scan the source tree and write every page.
fn generate(cli: &Cli) -> Result<()> {
    let output = &cli.output;
    fs::create_dir_all(output)
        .with_context(|| format!("failed to create output directory: {}", output.display()))?;

    link_libs(&cli.source.join("libs"), &output.join("libs"))?;

    let mut catalog = scan::scan(&cli.source, &cli.project)?;

    for lib in catalog.documented() {
        tracing::info!("{}", lib.name);
        let dir = output.join("libs").join(&lib.name);
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let path = dir.join("api.rst");
        write_page(&path, &render::library_page(lib))?;
    }

    let headers = cli
        .headers
        .clone()
        .unwrap_or_else(|| output.join("headers.txt"));
    catalog.main_headers = scan::read_header_list(&headers)?;

    let template_path = cli
        .template
        .clone()
        .unwrap_or_else(|| cli.source.join("docs/sphinx/_templates/api.rst"));
    let template = fs::read_to_string(&template_path)
        .with_context(|| format!("failed to read template {}", template_path.display()))?;
    let page = render::aggregate_page(&template, &catalog)
        .with_context(|| format!("invalid template {}", template_path.display()))?;
    write_page(&output.join("api.rst"), &page)?;

    if let Some(ref path) = cli.projects_json {
        let json = serde_json::to_string_pretty(&catalog.projects())?;
        write_page(path, &format!("{json}\n"))?;
    }

    Ok(())
}

fn write_page(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!("Generated {}", path.display());
    Ok(())
}

/// Make `<output>/libs` point at the source libs directory so the
/// documentation build can resolve header paths. Anything already present
/// at that path is left alone.
fn link_libs(libs_dir: &Path, alias: &Path) -> Result<()> {
    if alias.symlink_metadata().is_ok() {
        return Ok(());
    }
    let target = libs_dir
        .canonicalize()
        .with_context(|| format!("libs directory not found: {}", libs_dir.display()))?;
    symlink_dir(&target, alias)
        .with_context(|| format!("failed to link {} -> {}", alias.display(), target.display()))?;
    tracing::debug!("linked {} -> {}", alias.display(), target.display());
    Ok(())
}

#[cfg(unix)]
fn symlink_dir(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_dir(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}
