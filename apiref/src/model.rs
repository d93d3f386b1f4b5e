//! Data model for discovered headers, independent of the page format.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A public header that belongs to one library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Path relative to the library root, e.g. `include/hpx/foo.hpp`
    pub source: String,
    /// Path relative to the library's include root, e.g. `hpx/foo.hpp`
    pub include: String,
}

/// One documentation unit: an immediate subdirectory of `libs/`.
#[derive(Debug, Clone)]
pub struct Library {
    pub name: String,
    pub root: PathBuf,
    /// Headers in walk order (sorted by path)
    pub headers: Vec<Header>,
}

impl Library {
    pub fn new(name: impl Into<String>, root: PathBuf) -> Self {
        Self {
            name: name.into(),
            root,
            headers: Vec::new(),
        }
    }

    /// Title shown at the top of the library page.
    ///
    /// Two-letter names are acronyms ("io" → "IO"); everything else is
    /// capitalized ("basic_execution" → "Basic_execution").
    pub fn title(&self) -> String {
        if self.name.chars().count() == 2 {
            return self.name.to_uppercase();
        }
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect(),
            None => String::new(),
        }
    }
}

/// The whole scan result: every library plus the top-level project.
#[derive(Debug)]
pub struct Catalog {
    /// Name of the top-level project (also its Breathe project name)
    pub project: String,
    pub source_dir: PathBuf,
    /// Headers listed explicitly for the top-level project
    pub main_headers: Vec<String>,
    /// Sorted by name
    pub libraries: Vec<Library>,
}

impl Catalog {
    /// Libraries that produce a page.
    pub fn documented(&self) -> impl Iterator<Item = &Library> {
        self.libraries.iter().filter(|lib| !lib.headers.is_empty())
    }

    /// Breathe `projects_source` mapping: project name → root and files.
    pub fn projects(&self) -> BTreeMap<String, ProjectSource> {
        let mut projects: BTreeMap<String, ProjectSource> = self
            .libraries
            .iter()
            .map(|lib| {
                (
                    lib.name.clone(),
                    ProjectSource {
                        path: lib.root.to_string_lossy().into_owned(),
                        files: lib.headers.iter().map(|h| h.source.clone()).collect(),
                    },
                )
            })
            .collect();
        projects.insert(
            self.project.clone(),
            ProjectSource {
                path: self.source_dir.to_string_lossy().into_owned(),
                files: self.main_headers.clone(),
            },
        );
        projects
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ProjectSource {
    pub path: String,
    pub files: Vec<String>,
}
