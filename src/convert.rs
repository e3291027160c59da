//! Body → HTML conversion.
//!
//! The default [`ExtensionConverter`] picks a renderer from the source
//! file's extension:
//!
//! | Extension | Rendering |
//! |-----------|-----------|
//! | `.md`, `.markdown`, `.livemd` | CommonMark via pulldown-cmark |
//! | anything else | body returned unchanged |
//!
//! Markdown extensions are switched on and off by boolean keys in the
//! options bag (`tables`, `footnotes`, `strikethrough`, `tasklists`,
//! `smart_punctuation`, `heading_attributes`). Tables, strikethrough and
//! task lists default to on; the rest default to off. Other keys are
//! ignored here and left for custom converters.
//!
//! ## Malformed markdown
//!
//! CommonMark has no syntax errors, so a stray backquote simply renders as
//! a literal character. That is almost never what the author meant, so
//! the converter reports each unclosed inline code span as a
//! [`Diagnostic`] and carries on with the best-effort HTML.

use crate::types::{Attributes, Options};
use pulldown_cmark::{Event, Parser, Tag, TagEnd, html as md_html};
use std::ops::Range;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fatal conversion failure, raised by custom converters.
#[derive(Error, Debug)]
#[error("could not convert \"{}\": {message}", path.display())]
pub struct ConvertError {
    pub path: PathBuf,
    pub message: String,
}

impl ConvertError {
    pub fn new(path: &Path, message: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

/// A recoverable problem found while converting a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based line, relative to the start of the body.
    pub line: usize,
    pub message: String,
}

/// Converter output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversion {
    pub html: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl Conversion {
    /// HTML with nothing to report.
    pub fn html(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            diagnostics: Vec::new(),
        }
    }
}

/// Turns a page body into HTML.
pub trait HtmlConverter: Send + Sync {
    fn convert(
        &self,
        path: &Path,
        body: &str,
        attributes: &Attributes,
        options: &Options,
    ) -> Result<Conversion, ConvertError>;
}

impl<F> HtmlConverter for F
where
    F: Fn(&Path, &str, &Attributes, &Options) -> Result<Conversion, ConvertError> + Send + Sync,
{
    fn convert(
        &self,
        path: &Path,
        body: &str,
        attributes: &Attributes,
        options: &Options,
    ) -> Result<Conversion, ConvertError> {
        self(path, body, attributes, options)
    }
}

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "livemd"];

/// Whether `path` is rendered as markdown by the default converter.
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| MARKDOWN_EXTENSIONS.contains(&ext.as_str()))
}

/// Default converter: markdown for markdown-family extensions, passthrough otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionConverter;

impl HtmlConverter for ExtensionConverter {
    fn convert(
        &self,
        path: &Path,
        body: &str,
        _attributes: &Attributes,
        options: &Options,
    ) -> Result<Conversion, ConvertError> {
        if is_markdown(path) {
            Ok(render_markdown(body, options))
        } else {
            Ok(Conversion::html(body))
        }
    }
}

/// Build pulldown-cmark options from the options bag.
pub fn markdown_options(options: &Options) -> pulldown_cmark::Options {
    let flag = |key: &str, default: bool| {
        options
            .get(key)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(default)
    };

    let mut opts = pulldown_cmark::Options::empty();
    let switches = [
        ("tables", true, pulldown_cmark::Options::ENABLE_TABLES),
        ("strikethrough", true, pulldown_cmark::Options::ENABLE_STRIKETHROUGH),
        ("tasklists", true, pulldown_cmark::Options::ENABLE_TASKLISTS),
        ("footnotes", false, pulldown_cmark::Options::ENABLE_FOOTNOTES),
        (
            "smart_punctuation",
            false,
            pulldown_cmark::Options::ENABLE_SMART_PUNCTUATION,
        ),
        (
            "heading_attributes",
            false,
            pulldown_cmark::Options::ENABLE_HEADING_ATTRIBUTES,
        ),
    ];
    for (key, default, option) in switches {
        if flag(key, default) {
            opts.insert(option);
        }
    }
    opts
}

/// Render markdown to HTML, collecting diagnostics for unclosed code spans.
pub fn render_markdown(body: &str, options: &Options) -> Conversion {
    let parser = Parser::new_ext(body, markdown_options(options));

    let mut events = Vec::new();
    let mut diagnostics = Vec::new();
    let mut in_code_block = false;
    let mut run_end = 0;

    for (event, range) in parser.into_offset_iter() {
        match &event {
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::Text(_) if !in_code_block => {
                check_backquotes(body, range, &mut run_end, &mut diagnostics);
            }
            _ => {}
        }
        events.push(event);
    }

    let mut html = String::with_capacity(body.len() * 3 / 2);
    md_html::push_html(&mut html, events.into_iter());

    Conversion { html, diagnostics }
}

/// Backquotes that survive into a text event never found a closer.
///
/// `run_end` is the end of the last reported run, so a run split across
/// text events is reported once.
fn check_backquotes(
    body: &str,
    range: Range<usize>,
    run_end: &mut usize,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(text) = body.get(range.clone()) else {
        return;
    };
    let bytes = body.as_bytes();

    for (offset, _) in text.match_indices('`') {
        let pos = range.start + offset;
        if pos < *run_end {
            continue;
        }
        let backslashes = bytes[..pos].iter().rev().take_while(|&&b| b == b'\\').count();
        if backslashes % 2 == 1 {
            continue;
        }
        let len = bytes[pos..].iter().take_while(|&&b| b == b'`').count();
        *run_end = pos + len;
        diagnostics.push(Diagnostic {
            line: body[..pos].matches('\n').count() + 1,
            message: format!(
                "Closing unclosed backquotes {} at end of input",
                "`".repeat(len)
            ),
        });
    }
}
