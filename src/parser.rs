//! Page parsing: raw file content → attributes + body.
//!
//! The default [`FrontMatter`] parser expects a header, a line holding only
//! `---`, and the body:
//!
//! ```text
//! {title: "Hello", tags: [intro, rust]}
//! ---
//! This is a markdown *document*.
//! ```
//!
//! The header is read as a YAML document, so the flow-map form above and
//! plain `key: value` lines both work. Whatever it is, it has to come out
//! as a map with string keys.
//!
//! Any type implementing [`PageParser`] can replace the default, including
//! plain closures. A parser may return several records for one file via
//! [`Parsed::Many`]; the pipeline flattens them in order.

use crate::types::{Attributes, Parsed, ParsedPage};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("could not find separator --- in \"{}\"", .0.display())]
    MissingSeparator(PathBuf),
    #[error("expected attributes for \"{}\" to return a map", path.display())]
    InvalidAttributes { path: PathBuf, reason: String },
    #[error("could not parse \"{}\": {message}", path.display())]
    Custom { path: PathBuf, message: String },
}

impl ParseError {
    /// Failure raised by a custom parser.
    pub fn custom(path: &Path, message: impl Into<String>) -> Self {
        ParseError::Custom {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ParseError::MissingSeparator(path) => path,
            ParseError::InvalidAttributes { path, .. } => path,
            ParseError::Custom { path, .. } => path,
        }
    }
}

/// Splits one source file into one or more records.
pub trait PageParser: Send + Sync {
    fn parse(&self, path: &Path, content: &str) -> Result<Parsed, ParseError>;
}

impl<F> PageParser for F
where
    F: Fn(&Path, &str) -> Result<Parsed, ParseError> + Send + Sync,
{
    fn parse(&self, path: &Path, content: &str) -> Result<Parsed, ParseError> {
        self(path, content)
    }
}

/// Header / `---` / body parser. Always yields exactly one record.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrontMatter;

const LF_SEPARATOR: &str = "\n---\n";
const CRLF_SEPARATOR: &str = "\r\n---\r\n";

impl PageParser for FrontMatter {
    fn parse(&self, path: &Path, content: &str) -> Result<Parsed, ParseError> {
        let (header_end, body_start) = find_separator(content)
            .ok_or_else(|| ParseError::MissingSeparator(path.to_path_buf()))?;

        let attributes = parse_attributes(path, &content[..header_end])?;
        let body = &content[body_start..];
        let line = content[..body_start].matches('\n').count() + 1;

        Ok(ParsedPage::new(attributes, body).with_line(line).into())
    }
}

/// Locate the earliest separator. Returns (end of header, start of body).
fn find_separator(content: &str) -> Option<(usize, usize)> {
    let lf = content
        .find(LF_SEPARATOR)
        .map(|i| (i, i + LF_SEPARATOR.len()));
    let crlf = content
        .find(CRLF_SEPARATOR)
        .map(|i| (i, i + CRLF_SEPARATOR.len()));

    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

fn parse_attributes(path: &Path, header: &str) -> Result<Attributes, ParseError> {
    let invalid = |reason: String| ParseError::InvalidAttributes {
        path: path.to_path_buf(),
        reason,
    };

    let value: serde_yaml::Value = serde_yaml::from_str(header).map_err(|e| invalid(e.to_string()))?;
    if !value.is_mapping() {
        return Err(invalid(format!("header is not a map: {}", describe(&value))));
    }

    // Non-string keys fail here.
    match serde_json::to_value(&value).map_err(|e| invalid(e.to_string()))? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(invalid(format!("header is not a map: {other}"))),
    }
}

fn describe(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "boolean",
        serde_yaml::Value::Number(_) => "number",
        serde_yaml::Value::String(_) => "string",
        serde_yaml::Value::Sequence(_) => "list",
        serde_yaml::Value::Mapping(_) => "map",
        serde_yaml::Value::Tagged(_) => "tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse_one(content: &str) -> ParsedPage {
        let parsed = FrontMatter.parse(Path::new("post.md"), content).unwrap();
        let mut pages: Vec<_> = parsed.into_iter().collect();
        assert_eq!(pages.len(), 1);
        pages.remove(0)
    }

    #[test]
    fn flow_map_header() {
        let page = parse_one("{hello: \"world\"}\n---\nThis is a markdown *document*.\n");
        assert_eq!(json!(page.attributes), json!({"hello": "world"}));
        assert_eq!(page.body, "This is a markdown *document*.\n");
    }

    #[test]
    fn block_header() {
        let page = parse_one("title: Hello\ntags:\n  - a\n  - b\n---\nbody");
        assert_eq!(
            json!(page.attributes),
            json!({"title": "Hello", "tags": ["a", "b"]})
        );
        assert_eq!(page.body, "body");
    }

    #[test]
    fn body_preserved_byte_for_byte() {
        let body = "line one\n\n  indented\n---\nnot a separator anymore\n\n";
        let page = parse_one(&format!("{{a: 1}}\n---\n{body}"));
        assert_eq!(page.body, body);
    }

    #[test]
    fn crlf_separator() {
        let page = parse_one("{a: 1}\r\n---\r\nbody\r\n");
        assert_eq!(json!(page.attributes), json!({"a": 1}));
        assert_eq!(page.body, "body\r\n");
    }

    #[test]
    fn earliest_separator_wins() {
        let page = parse_one("{a: 1}\n---\nfirst\r\n---\r\nsecond");
        assert_eq!(page.body, "first\r\n---\r\nsecond");
    }

    #[test]
    fn body_line_counts_header_and_separator() {
        assert_eq!(parse_one("{a: 1}\n---\nbody").line, 3);
        assert_eq!(parse_one("a: 1\nb: 2\n---\nbody").line, 4);
    }

    #[test]
    fn missing_separator_names_path() {
        let err = FrontMatter
            .parse(Path::new("posts/no-sep.md"), "{a: 1}\nbody only\n")
            .unwrap_err();
        assert!(matches!(err, ParseError::MissingSeparator(_)));
        assert_eq!(
            err.to_string(),
            "could not find separator --- in \"posts/no-sep.md\""
        );
    }

    #[test]
    fn separator_must_be_its_own_line() {
        let err = FrontMatter
            .parse(Path::new("x.md"), "{a: 1} ---\nbody")
            .unwrap_err();
        assert!(matches!(err, ParseError::MissingSeparator(_)));
    }

    #[test]
    fn non_map_header_is_invalid() {
        let err = FrontMatter
            .parse(Path::new("list.md"), "[1, 2, 3]\n---\nbody")
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidAttributes { .. }));
        assert_eq!(
            err.to_string(),
            "expected attributes for \"list.md\" to return a map"
        );
    }

    #[test]
    fn unparseable_header_is_invalid() {
        let err = FrontMatter
            .parse(Path::new("bad.md"), "{unclosed: \"map\"\n---\nbody")
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidAttributes { .. }));
    }

    #[test]
    fn empty_header_is_invalid() {
        let err = FrontMatter
            .parse(Path::new("empty.md"), "\n---\nbody")
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidAttributes { .. }));
    }

    #[test]
    fn non_string_keys_are_invalid() {
        let err = FrontMatter
            .parse(Path::new("keys.md"), "{[1, 2]: x}\n---\nbody")
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidAttributes { .. }));
    }

    #[test]
    fn closure_parser_can_return_many() {
        let split = |_: &Path, content: &str| -> Result<Parsed, ParseError> {
            Ok(content
                .split("\n===\n")
                .map(|chunk| ParsedPage::new(Attributes::new(), chunk))
                .collect::<Vec<_>>()
                .into())
        };
        let parsed = split.parse(Path::new("multi.txt"), "a\n===\nb\n===\nc").unwrap();
        assert_eq!(parsed.len(), 3);
    }

    #[test]
    fn custom_error_message() {
        let err = ParseError::custom(Path::new("x.csv"), "row 3 has 2 columns");
        assert_eq!(err.to_string(), "could not parse \"x.csv\": row 3 has 2 columns");
        assert_eq!(err.path(), Path::new("x.csv"));
    }
}
