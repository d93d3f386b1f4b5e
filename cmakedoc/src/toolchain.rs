//! Toolchain reference page: every file in `cmake/toolchains` is shown
//! verbatim under its own section.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Documented release version.
pub const VERSION: &str = "1.3.0";
/// Documented development version.
pub const DEV_VERSION: &str = "1.3.0-dev";

/// Where the toolchain files are referenced from, relative to the generated
/// page inside the documentation tree.
pub const DEFAULT_INCLUDE_PREFIX: &str = "../../../cmake/toolchains/";

pub struct ToolchainDoc<'a> {
    pub source_root: &'a Path,
    pub output_dir: &'a Path,
    /// Page template [default: `<root>/docs/sphinx/_templates/cmake_toolchains.rst`]
    pub template: Option<&'a Path>,
    pub include_prefix: &'a str,
}

impl ToolchainDoc<'_> {
    fn template_path(&self) -> PathBuf {
        self.template.map(Path::to_path_buf).unwrap_or_else(|| {
            self.source_root
                .join("docs/sphinx/_templates/cmake_toolchains.rst")
        })
    }

    /// Write `<output>/manual/cmake_toolchains.rst` and return the
    /// documented version pair.
    pub fn generate(&self) -> Result<(&'static str, &'static str)> {
        let toolchain_dir = self.source_root.join("cmake/toolchains");
        let files = list_toolchains(&toolchain_dir)?;
        let sections: String = files
            .iter()
            .map(|file| section(file, self.include_prefix))
            .collect();

        let template_path = self.template_path();
        let template = fs::read_to_string(&template_path)
            .with_context(|| format!("failed to read template {}", template_path.display()))?;
        let page = fill_positional(&template, &sections)
            .with_context(|| format!("invalid template {}", template_path.display()))?;

        let manual = self.output_dir.join("manual");
        fs::create_dir_all(&manual)
            .with_context(|| format!("failed to create {}", manual.display()))?;
        let out_path = manual.join("cmake_toolchains.rst");
        fs::write(&out_path, page)
            .with_context(|| format!("failed to write {}", out_path.display()))?;
        tracing::info!("Generated {}", out_path.display());

        Ok((VERSION, DEV_VERSION))
    }
}

/// File names in the toolchain directory, sorted.
fn list_toolchains(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read toolchain directory: {}", dir.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read {}", dir.display()))?;
        files.push(entry.file_name().to_string_lossy().into_owned());
    }
    files.sort();
    Ok(files)
}

/// Section for one toolchain file, titled with its name minus extension.
pub fn section(file: &str, include_prefix: &str) -> String {
    let name = Path::new(file)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string());
    let underline = "-".repeat(name.chars().count());
    format!(
        "\n{name}\n{underline}\n\n.. literalinclude:: {include_prefix}{file}\n    :language: cmake\n"
    )
}

/// Substitute the single positional argument. `{0}` may repeat, but a bare
/// `{}` takes the next automatic index, so only one of them is allowed and
/// it cannot be mixed with `{0}`. `{{` and `}}` stand for literal braces.
pub fn fill_positional(template: &str, value: &str) -> Result<String> {
    let mut automatic = 0;
    let mut manual = false;
    substitute(template, |field, out| {
        match field {
            "" => {
                if manual {
                    bail!("cannot mix {{}} and {{0}} in template");
                }
                if automatic > 0 {
                    bail!("template has more than one {{}} but only one value");
                }
                automatic += 1;
            }
            "0" => {
                if automatic > 0 {
                    bail!("cannot mix {{}} and {{0}} in template");
                }
                manual = true;
            }
            _ => bail!("unknown placeholder {{{field}}} in template"),
        }
        out.push_str(value);
        Ok(())
    })
}

/// Brace scanner: copies literal text and escapes, and hands every `{field}`
/// to `field` which appends its replacement. `apiref` carries the same
/// scanner for its named placeholders.
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
