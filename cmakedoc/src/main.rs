//! cmakedoc: build-option inventory and toolchain reference from CMake sources.
//!
//! Two subcommands:
//!
//! - **options**: follow `include`/`add_subdirectory` from a start file and
//!   list every `hpx_option(...)` by category: `cmakedoc options /path/to/hpx`
//! - **toolchains**: write `manual/cmake_toolchains.rst` from the files in
//!   `cmake/toolchains`: `cmakedoc toolchains /path/to/hpx -o docs/sphinx`

mod error;
mod extract;
mod model;
mod parser;
mod toolchain;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "cmakedoc",
    about = "Extract build options and toolchain documentation from CMake sources"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the options declared with hpx_option, grouped by category
    Options {
        /// Source tree root
        #[arg(default_value = ".")]
        source: PathBuf,

        /// Start file, relative to the source root
        #[arg(long, default_value = "CMakeLists.txt")]
        file: PathBuf,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Exit with an error if any file could not be parsed
        #[arg(long)]
        strict: bool,
    },
    /// Generate the toolchain reference page
    Toolchains {
        /// Source tree root
        #[arg(default_value = ".")]
        source: PathBuf,

        /// Documentation directory; the page goes to <output>/manual
        #[arg(short = 'o', long, default_value = ".")]
        output: PathBuf,

        /// Page template [default: <source>/docs/sphinx/_templates/cmake_toolchains.rst]
        #[arg(short = 't', long)]
        template: Option<PathBuf>,

        /// Path prefix used in the literalinclude directives
        #[arg(long, default_value = toolchain::DEFAULT_INCLUDE_PREFIX)]
        include_prefix: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cmakedoc=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    // A bare invocation lists the options of the current directory
    let command = cli.command.unwrap_or(Command::Options {
        source: PathBuf::from("."),
        file: PathBuf::from("CMakeLists.txt"),
        format: Format::Text,
        strict: false,
    });

    match command {
        Command::Options {
            source,
            file,
            format,
            strict,
        } => options(&source, &file, format, strict),
        Command::Toolchains {
            source,
            output,
            template,
            include_prefix,
        } => {
            let doc = toolchain::ToolchainDoc {
                source_root: &source,
                output_dir: &output,
                template: template.as_deref(),
                include_prefix: &include_prefix,
            };
            let (version, dev_version) = doc.generate()?;
            tracing::info!("documented version {version} ({dev_version})");
            Ok(())
        }
    }
}

fn options(source: &Path, file: &Path, format: Format, strict: bool) -> Result<()> {
    let extraction = extract::extract_options(source, file);

    match format {
        Format::Text => print!("{}", extraction.options.render_text()),
        Format::Json => {
            let json = serde_json::json!({
                "options": extraction.options,
                "files": extraction.reports,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    if extraction.options.is_empty() {
        tracing::warn!("no hpx_option declarations found below {}", source.display());
    }
    let failed = extraction.failures().count();
    tracing::info!(
        "{} options from {} files ({} failed)",
        extraction.options.len(),
        extraction.reports.len(),
        failed
    );
    if strict && failed > 0 {
        bail!("{failed} file(s) could not be parsed");
    }
    Ok(())
}
