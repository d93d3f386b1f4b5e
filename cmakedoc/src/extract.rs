//! Option extraction across a tree of CMake files.
//!
//! Starting from one file, `include(...)` and `add_subdirectory(...)` are
//! followed recursively and every `hpx_option(...)` lands in one shared
//! [`OptionCatalog`].
//!
//! ## Resolution rules
//!
//! | Invocation | Looks for | Source root of the nested file |
//! |------------|-----------|--------------------------------|
//! | `include(x)` | `<root>/cmake/x`, then `<root>/cmake/x.cmake` | unchanged |
//! | `add_subdirectory(x)` | `<root>/x/CMakeLists.txt` | `<root>/x` |
//!
//! A failing file never aborts its parent: options recorded before the
//! failure are kept and the failure is reported in [`Extraction::reports`].

use crate::error::{ParseError, Result};
use crate::model::{FileReport, OptionCatalog, Outcome};
use crate::parser::{self, Statements};
use std::fs;
use std::path::{Path, PathBuf};

/// Maximum nesting of included files.
pub const MAX_DEPTH: usize = 64;

/// Directory below the source root searched by `include(...)`.
const MODULE_DIR: &str = "cmake";

const LISTS_FILE: &str = "CMakeLists.txt";

/// Everything gathered from one extraction run.
#[derive(Debug, Default)]
pub struct Extraction {
    pub options: OptionCatalog,
    /// One entry per visited file, in visiting order
    pub reports: Vec<FileReport>,
}

impl Extraction {
    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.reports.iter().filter(|r| r.is_failed())
    }
}

/// Extract the options declared by `file` (relative to `source_root`) and
/// everything it pulls in.
pub fn extract_options(source_root: &Path, file: &Path) -> Extraction {
    let mut extractor = Extractor::default();
    extractor.visit(source_root, &source_root.join(file), 0);
    extractor.finish()
}

/// Accumulator threaded through the recursive descent.
#[derive(Default)]
struct Extractor {
    extraction: Extraction,
}

impl Extractor {
    fn finish(self) -> Extraction {
        self.extraction
    }

    /// Parse one file and record its outcome.
    fn visit(&mut self, root: &Path, path: &Path, depth: usize) {
        tracing::info!("Processing {}", path.display());
        // Reserve the slot so reports stay in visiting order
        let index = self.extraction.reports.len();
        self.extraction.reports.push(FileReport {
            path: path.to_path_buf(),
            outcome: Outcome::Parsed,
        });

        if let Err(e) = self.parse_file(root, path, depth) {
            tracing::warn!("error: {}: {}", path.display(), e);
            self.extraction.reports[index].outcome = Outcome::Failed {
                reason: e.to_string(),
            };
        }
    }

    fn parse_file(&mut self, root: &Path, path: &Path, depth: usize) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(ParseError::TooDeep(MAX_DEPTH));
        }
        let content = fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        for invocation in Statements::new(&content) {
            if invocation.is("include") {
                if let Some(module) = resolve_include(root, &invocation.args) {
                    self.visit(root, &module, depth + 1);
                }
            } else if invocation.is("add_subdirectory") {
                let subdir = root.join(relative(&invocation.args));
                let lists = subdir.join(LISTS_FILE);
                if lists.is_file() {
                    self.visit(&subdir, &lists, depth + 1);
                }
            } else if invocation.is("hpx_option") {
                let (category, record) = parser::parse_option(&invocation.args)?;
                tracing::debug!(
                    "option: {}({}), category={} {}",
                    record.name,
                    record.kind,
                    category,
                    record.docstring
                );
                self.extraction.options.insert(&category, record);
            }
        }
        Ok(())
    }
}

/// Find the module named by `include(...)`: the bare name first, then with
/// the `.cmake` extension.
pub fn resolve_include(root: &Path, target: &str) -> Option<PathBuf> {
    let dir = root.join(MODULE_DIR);
    let name = relative(target);
    [dir.join(name), dir.join(format!("{name}.cmake"))]
        .into_iter()
        .find(|candidate| candidate.is_file())
}

/// Arguments are joined onto the root like plain strings, so a leading `/`
/// must not turn them into absolute paths.
fn relative(target: &str) -> &str {
    target.trim_start_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn names(extraction: &Extraction, category: &str) -> Vec<String> {
        extraction
            .options
            .get(category)
            .unwrap_or_default()
            .iter()
            .map(|r| r.name.clone())
            .collect()
    }

    #[test]
    fn collects_top_level_options() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "CMakeLists.txt",
            "project(hpx CXX)\nhpx_option(FOO BOOL \"enable foo\" CATEGORY \"Networking\" ADVANCED)\n",
        );
        let ex = extract_options(dir.path(), Path::new("CMakeLists.txt"));
        let rec = &ex.options.get("Networking").unwrap()[0];
        assert_eq!(rec.name, "FOO");
        assert_eq!(rec.kind, "BOOL");
        assert_eq!(rec.docstring, "enable foo");
        assert!(rec.advanced);
        assert_eq!(ex.reports.len(), 1);
        assert_eq!(ex.failures().count(), 0);
    }

    #[test]
    fn include_with_and_without_extension() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "CMakeLists.txt",
            "include(plain)\ninclude(subfeature)\nhpx_option(TOP BOOL \"top\" ON)\n",
        );
        write(dir.path(), "cmake/plain", "hpx_option(PLAIN BOOL \"plain\" ON)\n");
        write(dir.path(), "cmake/subfeature.cmake", "hpx_option(SUB BOOL \"sub\" ON)\n");

        let ex = extract_options(dir.path(), Path::new("CMakeLists.txt"));
        assert_eq!(names(&ex, "General"), vec!["PLAIN", "SUB", "TOP"]);
        assert_eq!(ex.reports.len(), 3);
    }

    #[test]
    fn unresolved_include_is_ignored() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "CMakeLists.txt",
            "include(CheckCXXSourceCompiles)\nhpx_option(A BOOL \"a\" ON)\n",
        );
        let ex = extract_options(dir.path(), Path::new("CMakeLists.txt"));
        assert_eq!(names(&ex, "General"), vec!["A"]);
        assert_eq!(ex.reports.len(), 1);
    }

    #[test]
    fn add_subdirectory_uses_nested_root() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "CMakeLists.txt", "add_subdirectory(libs)\nadd_subdirectory(missing)\n");
        write(dir.path(), "libs/CMakeLists.txt", "include(libopts)\n");
        // include() inside libs/ resolves against libs/cmake
        write(dir.path(), "libs/cmake/libopts.cmake", "hpx_option(LIB BOOL \"lib\" ON CATEGORY \"Modules\")\n");
        write(dir.path(), "cmake/libopts.cmake", "hpx_option(WRONG BOOL \"wrong\" ON)\n");

        let ex = extract_options(dir.path(), Path::new("CMakeLists.txt"));
        assert_eq!(names(&ex, "Modules"), vec!["LIB"]);
        assert!(ex.options.get("General").is_none());
    }

    #[test]
    fn malformed_file_keeps_sibling_and_parent_options() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "CMakeLists.txt",
            "hpx_option(BEFORE BOOL \"before\" ON)\ninclude(bad)\ninclude(good)\nhpx_option(AFTER BOOL \"after\" ON)\n",
        );
        write(
            dir.path(),
            "cmake/bad.cmake",
            "hpx_option(PARTIAL BOOL \"kept\" ON)\nhpx_option(BROKEN)\nhpx_option(LOST BOOL \"lost\" ON)\n",
        );
        write(dir.path(), "cmake/good.cmake", "hpx_option(SIBLING BOOL \"sibling\" ON)\n");

        let ex = extract_options(dir.path(), Path::new("CMakeLists.txt"));
        assert_eq!(names(&ex, "General"), vec!["BEFORE", "PARTIAL", "SIBLING", "AFTER"]);

        let failed: Vec<_> = ex.failures().collect();
        assert_eq!(failed.len(), 1);
        assert!(failed[0].path.ends_with("cmake/bad.cmake"));
        match &failed[0].outcome {
            Outcome::Failed { reason } => assert!(reason.contains("malformed hpx_option"), "Got: {reason}"),
            Outcome::Parsed => unreachable!(),
        }
    }

    #[test]
    fn missing_start_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let ex = extract_options(dir.path(), Path::new("CMakeLists.txt"));
        assert!(ex.options.is_empty());
        assert_eq!(ex.failures().count(), 1);
    }

    #[test]
    fn include_cycle_stops_at_max_depth() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "CMakeLists.txt", "include(loop)\nhpx_option(TOP BOOL \"top\" ON)\n");
        write(dir.path(), "cmake/loop.cmake", "include(loop)\n");

        let ex = extract_options(dir.path(), Path::new("CMakeLists.txt"));
        assert_eq!(names(&ex, "General"), vec!["TOP"]);
        assert_eq!(ex.reports.len(), MAX_DEPTH + 2);
        let last = ex.reports.last().unwrap();
        assert!(last.is_failed());
    }

    #[test]
    fn upper_case_commands_are_ignored() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "CMakeLists.txt",
            "ADD_SUBDIRECTORY(sub)\nINCLUDE(mod)\nHPX_OPTION(UP BOOL \"up\" ON)\n",
        );
        write(dir.path(), "sub/CMakeLists.txt", "hpx_option(SUB BOOL \"sub\" ON)\n");
        write(dir.path(), "cmake/mod.cmake", "hpx_option(MOD BOOL \"mod\" ON)\n");

        let ex = extract_options(dir.path(), Path::new("CMakeLists.txt"));
        assert!(ex.options.is_empty());
        assert_eq!(ex.reports.len(), 1);
        assert_eq!(ex.failures().count(), 0);
    }

    #[test]
    fn resolve_include_prefers_bare_name() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "cmake/Foo", "");
        write(dir.path(), "cmake/Foo.cmake", "");
        let found = resolve_include(dir.path(), "Foo").unwrap();
        assert_eq!(found, dir.path().join("cmake/Foo"));
        assert!(resolve_include(dir.path(), "Bar").is_none());
    }
}
