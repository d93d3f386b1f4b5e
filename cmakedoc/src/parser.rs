//! CMake statement splitting and `hpx_option` decoding.
//!
//! This is not a CMake parser. Lines are scanned one at a time: a line that
//! looks like `name(` opens a new invocation and closes the previous one,
//! every other line continues the open invocation's argument text.

use crate::error::{ParseError, Result};
use crate::model::{OptionRecord, DEFAULT_CATEGORY};
use regex::Regex;
use std::str::Lines;
use std::sync::LazyLock;

// -- Regex patterns -----------------------------------------------------------

static RE_FUNC_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*([a-z_]+)\s*\((.*)").unwrap());

// Greedy prefix: the last CATEGORY/STRINGS in the argument text wins
static RE_CATEGORY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^.*CATEGORY\s+"([^"]+)""#).unwrap());

static RE_STRINGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^.*STRINGS\s+"([^"]+)""#).unwrap());

// -- Statements ---------------------------------------------------------------

/// A function-call-shaped statement with its argument text joined onto one
/// line, without the closing parenthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub name: String,
    pub args: String,
}

impl Invocation {
    /// Exact command name check. `INCLUDE(x)` opens an invocation but is
    /// not `include`.
    pub fn is(&self, command: &str) -> bool {
        self.name == command
    }
}

/// Iterator over the invocations of one CMake source text.
///
/// The open invocation is only yielded once the next one starts (or the
/// input ends), since its arguments may continue on following lines.
pub struct Statements<'a> {
    lines: Lines<'a>,
    /// Name and accumulated argument text of the open invocation
    current: Option<(String, String)>,
}

impl<'a> Statements<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines(),
            current: None,
        }
    }
}

impl Iterator for Statements<'_> {
    type Item = Invocation;

    fn next(&mut self) -> Option<Invocation> {
        for line in self.lines.by_ref() {
            let line = strip_comment(line.trim());
            if line.is_empty() {
                continue;
            }

            match RE_FUNC_CALL.captures(line) {
                Some(caps) => {
                    let opened = (caps[1].to_string(), caps[2].to_string());
                    if let Some((name, content)) = self.current.replace(opened) {
                        return Some(finish(name, &content));
                    }
                }
                None => {
                    if let Some((_, content)) = self.current.as_mut() {
                        content.push(' ');
                        content.push_str(line);
                    }
                }
            }
        }

        self.current
            .take()
            .map(|(name, content)| finish(name, &content))
    }
}

/// Drop everything from `#` to the end of the line.
fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(at) => &line[..at],
        None => line,
    }
}

fn finish(name: String, content: &str) -> Invocation {
    let content = content.trim();
    let args = content.strip_suffix(')').unwrap_or(content);
    Invocation {
        name,
        args: args.trim().to_string(),
    }
}

// -- hpx_option ---------------------------------------------------------------

/// Decode the arguments of `hpx_option(...)` into its category and record.
///
/// Layout: `NAME TYPE "docstring" [default] [ADVANCED] [CATEGORY "c"]
/// [STRINGS "a;b"]`. The docstring is rebuilt from blank-separated tokens,
/// starting at the third and ending at the first token that ends in `"`.
pub fn parse_option(args: &str) -> Result<(String, OptionRecord)> {
    let tokens: Vec<&str> = args.split([' ', '\t']).collect();
    if tokens.len() < 3 {
        return Err(ParseError::MalformedOption(args.to_string()));
    }

    let category = RE_CATEGORY
        .captures(args)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
    let values = RE_STRINGS
        .captures(args)
        .map(|c| c[1].to_string())
        .unwrap_or_default();

    let record = OptionRecord {
        name: tokens[0].to_string(),
        kind: tokens[1].to_string(),
        docstring: docstring(&tokens[2..]),
        values,
        advanced: args.contains("ADVANCED"),
    };
    Ok((category, record))
}

fn docstring(tokens: &[&str]) -> String {
    let first = tokens[0];
    let mut doc: String = first.chars().skip(1).collect();

    let closed = first.chars().count() > 1 && first.ends_with('"');
    if !closed {
        for token in &tokens[1..] {
            doc.push(' ');
            doc.push_str(token);
            if token.ends_with('"') {
                break;
            }
        }
    }

    match doc.strip_suffix('"') {
        Some(stripped) => stripped.to_string(),
        None => doc,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(name: &str, args: &str) -> (String, String) {
        (name.to_string(), args.to_string())
    }

    fn collect(source: &str) -> Vec<(String, String)> {
        Statements::new(source)
            .map(|inv| (inv.name, inv.args))
            .collect()
    }

    #[test]
    fn single_line_invocations() {
        let got = collect("project(hpx CXX)\ninclude(HPX_Utils)\n");
        assert_eq!(
            got,
            vec![
                pair("project", "hpx CXX"),
                pair("include", "HPX_Utils"),
            ]
        );
    }

    #[test]
    fn multi_line_invocation_is_joined() {
        let src = "hpx_option(\n  HPX_WITH_FOO BOOL\n  \"Enable foo\"\n  ON\n)\nset(X 1)\n";
        let got = collect(src);
        assert_eq!(got[0], pair("hpx_option", "HPX_WITH_FOO BOOL \"Enable foo\" ON"));
        assert_eq!(got[1], pair("set", "X 1"));
    }

    #[test]
    fn comments_and_blank_lines_skipped() {
        let src = "# leading comment\n\ninclude(A) # trailing\n   # indented\nadd_subdirectory(src)\n";
        let got = collect(src);
        assert_eq!(
            got,
            vec![
                pair("include", "A"),
                pair("add_subdirectory", "src"),
            ]
        );
    }

    #[test]
    fn last_invocation_flushed_at_end() {
        assert_eq!(collect("include(last)"), vec![pair("include", "last")]);
    }

    #[test]
    fn lines_before_first_invocation_ignored() {
        assert_eq!(collect("stray text\nset(A)\n"), vec![pair("set", "A")]);
    }

    #[test]
    fn names_with_digits_are_continuations() {
        // `[a-z_]+` only: `foo2(` does not open an invocation
        let got = collect("set(A\nfoo2(bar)\n)\n");
        assert_eq!(got, vec![pair("set", "A foo2(bar)")]);
    }

    #[test]
    fn upper_case_names_open_invocations_but_do_not_match() {
        let inv = Statements::new("INCLUDE(Foo)").next().unwrap();
        assert_eq!(inv.name, "INCLUDE");
        assert_eq!(inv.args, "Foo");
        assert!(!inv.is("include"));
        assert!(inv.is("INCLUDE"));
    }

    #[test]
    fn option_full_declaration() {
        let (category, rec) =
            parse_option(r#"FOO BOOL "enable foo" CATEGORY "Networking" ADVANCED"#).unwrap();
        assert_eq!(category, "Networking");
        assert_eq!(rec.name, "FOO");
        assert_eq!(rec.kind, "BOOL");
        assert_eq!(rec.docstring, "enable foo");
        assert_eq!(rec.values, "");
        assert!(rec.advanced);
    }

    #[test]
    fn option_defaults_to_general() {
        let (category, rec) = parse_option(r#"BAR STRING "bar value" "default""#).unwrap();
        assert_eq!(category, "General");
        assert_eq!(rec.docstring, "bar value");
        assert!(!rec.advanced);
    }

    #[test]
    fn option_single_word_docstring() {
        let (_, rec) = parse_option(r#"X BOOL "Enable" ON"#).unwrap();
        assert_eq!(rec.docstring, "Enable");
    }

    #[test]
    fn option_strings_values() {
        let (category, rec) = parse_option(
            r#"HPX_WITH_MALLOC STRING "Define which allocator should be linked in" system STRINGS "system;tcmalloc;jemalloc" CATEGORY "Build Targets""#,
        )
        .unwrap();
        assert_eq!(category, "Build Targets");
        assert_eq!(rec.values, "system;tcmalloc;jemalloc");
        assert_eq!(rec.docstring, "Define which allocator should be linked in");
    }

    #[test]
    fn option_docstring_keeps_inner_spacing() {
        let (_, rec) = parse_option(r#"X BOOL "a  b" ON"#).unwrap();
        assert_eq!(rec.docstring, "a  b");
    }

    #[test]
    fn option_docstring_stops_at_first_closing_quote() {
        // Escaped quotes end the docstring early; kept for output compatibility
        let (_, rec) = parse_option(r#"X BOOL "say \"hi\" now" ON"#).unwrap();
        assert_eq!(rec.docstring, r#"say \"hi\"#);
    }

    #[test]
    fn option_missing_fields_is_malformed() {
        assert!(matches!(parse_option("FOO BOOL"), Err(ParseError::MalformedOption(_))));
        assert!(matches!(parse_option(""), Err(ParseError::MalformedOption(_))));
    }
}
