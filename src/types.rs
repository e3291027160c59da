//! Shared types passed between pipeline stages.
//!
//! A source file flows through the pipeline as:
//!
//! ```text
//! raw text  →  ParsedPage (attributes + raw body)  →  RenderedPage (attributes + HTML)
//! ```
//!
//! Attributes are set once by the parser and never touched again; every
//! later stage only replaces the body.

use std::path::PathBuf;

/// Front-matter attributes of one page.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Options bag forwarded verbatim from the publisher configuration to the
/// HTML converter.
pub type Options = serde_json::Map<String, serde_json::Value>;

/// One logical record produced by a parser.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPage {
    pub attributes: Attributes,
    /// Raw body, byte-for-byte as it appeared in the file.
    pub body: String,
    /// 1-based line of the source file on which `body` starts.
    ///
    /// Only used to place converter warnings; parsers that can't tell leave it at 1.
    pub line: usize,
}

impl ParsedPage {
    pub fn new(attributes: Attributes, body: impl Into<String>) -> Self {
        Self {
            attributes,
            body: body.into(),
            line: 1,
        }
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = line.max(1);
        self
    }
}

/// Parser output: one file may expand into one or many records.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    One(ParsedPage),
    Many(Vec<ParsedPage>),
}

impl Parsed {
    pub fn len(&self) -> usize {
        match self {
            Parsed::One(_) => 1,
            Parsed::Many(pages) => pages.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<ParsedPage> for Parsed {
    fn from(page: ParsedPage) -> Self {
        Parsed::One(page)
    }
}

impl From<Vec<ParsedPage>> for Parsed {
    fn from(pages: Vec<ParsedPage>) -> Self {
        Parsed::Many(pages)
    }
}

impl IntoIterator for Parsed {
    type Item = ParsedPage;
    type IntoIter = std::vec::IntoIter<ParsedPage>;

    fn into_iter(self) -> Self::IntoIter {
        match self {
            Parsed::One(page) => vec![page].into_iter(),
            Parsed::Many(pages) => pages.into_iter(),
        }
    }
}

/// A parsed page whose body has been converted and highlighted.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub path: PathBuf,
    pub attributes: Attributes,
    /// Final HTML body.
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: serde_json::Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn parsed_one_yields_single_page() {
        let parsed: Parsed = ParsedPage::new(attrs(json!({"a": 1})), "body").into();
        assert_eq!(parsed.len(), 1);
        let pages: Vec<_> = parsed.into_iter().collect();
        assert_eq!(pages[0].body, "body");
    }

    #[test]
    fn parsed_many_preserves_order() {
        let parsed: Parsed = vec![
            ParsedPage::new(Attributes::new(), "first"),
            ParsedPage::new(Attributes::new(), "second"),
        ]
        .into();
        let bodies: Vec<_> = parsed.into_iter().map(|p| p.body).collect();
        assert_eq!(bodies, vec!["first", "second"]);
    }

    #[test]
    fn empty_many_is_empty() {
        assert!(Parsed::Many(vec![]).is_empty());
    }

    #[test]
    fn with_line_never_goes_below_one() {
        let page = ParsedPage::new(Attributes::new(), "").with_line(0);
        assert_eq!(page.line, 1);
    }
}
