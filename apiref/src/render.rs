//! reStructuredText rendering of the reference pages.
//!
//! Each header becomes an `autodoxygenfile` directive for Breathe, titled
//! with the `#include` line a user would write.

use crate::model::{Catalog, Library};
use anyhow::{bail, Result};

const TITLE_RULE: &str =
    "-------------------------------------------------------------------------------";
const HEADER_RULE: &str =
    "^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^";

/// Comment block emitted at the top of every generated page.
const PAGE_NOTICE: &str = "..
    Distributed under the Boost Software License, Version 1.0. (See accompanying
    file LICENSE_1_0.txt or copy at http://www.boost.org/LICENSE_1_0.txt)
";

/// Page heading for a library.
pub fn page_header(title: &str) -> String {
    format!("\n{PAGE_NOTICE}\n{TITLE_RULE}\n{title}\n{TITLE_RULE}\n")
}

/// One `#include` section with its Breathe directive.
pub fn header_entry(include: &str, project: &str) -> String {
    format!(
        "\n{HEADER_RULE}\n`#include <{include}>`\n{HEADER_RULE}\n\
         .. autodoxygenfile:: {include}\n   :project: {project}\n"
    )
}

/// Full `api.rst` for one library.
pub fn library_page(lib: &Library) -> String {
    let mut page = page_header(&lib.title());
    for header in &lib.headers {
        page.push_str(&header_entry(&header.include, &lib.name));
    }
    page
}

/// Toctree lines pointing at every library page.
pub fn library_refs(catalog: &Catalog) -> String {
    catalog
        .documented()
        .map(|lib| format!("   /libs/{}/api.rst\n", lib.name))
        .collect()
}

/// Include sections for the explicitly listed top-level headers.
pub fn main_refs(catalog: &Catalog) -> String {
    catalog
        .main_headers
        .iter()
        .map(|header| header_entry(header, &catalog.project))
        .collect()
}

/// Aggregate `api.rst`: fill `{lib_refs}` and `{main_refs}` in the template.
pub fn aggregate_page(template: &str, catalog: &Catalog) -> Result<String> {
    let libs = library_refs(catalog);
    let main = main_refs(catalog);
    fill_template(template, &[("lib_refs", libs.as_str()), ("main_refs", main.as_str())])
}

/// Substitute `{name}` placeholders. `{{` and `}}` stand for literal braces.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> Result<String> {
    substitute(template, |name, out| {
        match values.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => bail!("unknown placeholder {{{name}}} in template"),
        }
        Ok(())
    })
}

/// Brace scanner: copies literal text and escapes, and hands every `{field}`
/// to `field` which appends its replacement. `cmakedoc` carries the same
/// scanner for its single positional placeholder.
fn substitute(
    template: &str,
    mut field: impl FnMut(&str, &mut String) -> Result<()>,
) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => name.push(c),
                        None => bail!("unterminated placeholder {{{name} in template"),
                    }
                }
                field(&name, &mut out)?;
            }
            '}' => bail!("single '}}' in template"),
            _ => out.push(ch),
        }
    }
    Ok(out)
}
