//! Header discovery in a single walk over `<source>/libs`.
//!
//! Every immediate subdirectory of `libs/` is a library. Below it, only
//! files under an `include` directory are considered, `detail` directories
//! are pruned, and a header opts out of the reference with the marker
//! `// sphinx:undocumented` anywhere in its contents.

use crate::model::{Catalog, Header, Library};
use anyhow::{Context, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path};
use std::sync::LazyLock;
use walkdir::WalkDir;

/// Marker comment that excludes a header from the generated pages.
pub const OPT_OUT_MARKER: &str = "// sphinx:undocumented";

static RE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*\.(h|hxx|hpp|ipp)$").unwrap());

const INCLUDE_DIR: &str = "include";
const DETAIL_DIR: &str = "detail";

/// Scan `<source_dir>/libs` and collect the headers of every library.
pub fn scan(source_dir: &Path, project: &str) -> Result<Catalog> {
    let libs_dir = source_dir.join("libs");
    if !libs_dir.is_dir() {
        anyhow::bail!("libs directory not found: {}", libs_dir.display());
    }
    let mut libraries: BTreeMap<String, Library> = BTreeMap::new();

    let walker = WalkDir::new(&libs_dir)
        .min_depth(1)
        // files of a directory before its subdirectories, each by name
        .sort_by(|a, b| {
            a.file_type()
                .is_dir()
                .cmp(&b.file_type().is_dir())
                .then_with(|| a.file_name().cmp(b.file_name()))
        })
        .into_iter()
        .filter_entry(|e| !(e.depth() > 1 && e.file_type().is_dir() && e.file_name() == DETAIL_DIR));

    for entry in walker {
        let entry = entry.with_context(|| format!("failed to walk {}", libs_dir.display()))?;
        let path = entry.path();

        if entry.depth() == 1 {
            if entry.file_type().is_dir() {
                let name = entry.file_name().to_string_lossy().into_owned();
                libraries.insert(name.clone(), Library::new(name, path.to_path_buf()));
            }
            continue;
        }
        // walkdir reports a linked header as a symlink; follow it for this check
        if !path.is_file() {
            continue;
        }

        let Ok(relative) = path.strip_prefix(&libs_dir) else {
            continue;
        };
        let Some((lib, header)) = classify(relative) else {
            continue;
        };
        if is_opted_out(path)? {
            tracing::debug!("skipping {} (opted out)", path.display());
            continue;
        }
        if let Some(library) = libraries.get_mut(&lib) {
            library.headers.push(header);
        }
    }

    Ok(Catalog {
        project: project.to_string(),
        source_dir: source_dir.to_path_buf(),
        main_headers: Vec::new(),
        libraries: libraries.into_values().collect(),
    })
}

/// Map a path relative to `libs/` onto its library and header descriptor.
///
/// Returns `None` for anything that is not a documented header: files
/// outside an `include` directory, anything below `detail`, and files
/// without a header extension.
pub fn classify(relative: &Path) -> Option<(String, Header)> {
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    // library / <dirs...> / file
    let (lib, rest) = parts.split_first()?;
    let (file, dirs) = rest.split_last()?;

    if dirs.iter().any(|d| d == DETAIL_DIR) {
        return None;
    }
    let include_at = dirs.iter().position(|d| d == INCLUDE_DIR)?;
    if !RE_HEADER.is_match(file) {
        return None;
    }

    let header = Header {
        source: rest.join("/"),
        include: rest[include_at + 1..].join("/"),
    };
    Some((lib.clone(), header))
}

fn is_opted_out(path: &Path) -> Result<bool> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).contains(OPT_OUT_MARKER))
}

/// Read the explicit header list of the top-level project, one per line.
pub fn read_header_list(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read header list {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}
