//! The compilation pass.
//!
//! A [`Publisher`] holds everything that shapes the output (patterns,
//! parser, converter, highlighters, options) and runs the pipeline:
//!
//! ```text
//! discover → read → parse → convert → highlight → build
//! ```
//!
//! Every stage before `build` only depends on one file, so with
//! [`Publisher::parallel`] those run on the rayon pool. Results are
//! collected by index and the builder is called afterwards in discovery
//! order, so the [`Collection`] is the same either way.
//!
//! Any error aborts the pass and no partial collection is returned.
//! Converter warnings don't abort; they go to the [`DiagnosticSink`] as
//! soon as the file that raised them is converted.

use crate::builder::{BoxError, Collection, EntryBuilder};
use crate::convert::{ConvertError, ExtensionConverter, HtmlConverter};
use crate::diagnostics::{DiagnosticSink, StderrSink, Warning};
use crate::discover::{self, DiscoverError, Patterns};
use crate::highlight::{self, CodeBlockPattern, Highlighter};
use crate::parser::{FrontMatter, PageParser, ParseError};
use crate::staleness::{self, Snapshot, SnapshotError};
use crate::types::{Options, RenderedPage};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument};

#[derive(Error, Debug)]
pub enum PublishError {
    #[error(transparent)]
    Discover(#[from] DiscoverError),
    #[error("could not read \"{}\": {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
    /// The caller's builder failed. Displays as the builder's own error.
    #[error("{source}")]
    Build {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

impl PublishError {
    /// Source file the error is about, when there is one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            PublishError::Read { path, .. } | PublishError::Build { path, .. } => Some(path),
            PublishError::Parse(e) => Some(e.path()),
            PublishError::Convert(e) => Some(&e.path),
            PublishError::Discover(_) | PublishError::Snapshot(_) => None,
        }
    }
}

/// Result of a successful pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled<E> {
    pub collection: Collection<E>,
    /// State of the sources this collection was compiled from. Hand it back
    /// to [`Publisher::needs_rebuild`] later.
    pub snapshot: Snapshot,
}

/// Pipeline configuration.
///
/// ```rust,ignore
/// let publisher = Publisher::new("posts", ["posts/**/*.md"])
///     .highlighter(Spans)
///     .option("smart_punctuation", true);
/// let compiled = publisher.compile(&PageEntryBuilder)?;
/// ```
pub struct Publisher {
    name: String,
    patterns: Patterns,
    parser: Box<dyn PageParser>,
    html_converter: Box<dyn HtmlConverter>,
    highlighters: Vec<Box<dyn Highlighter>>,
    code_block_pattern: CodeBlockPattern,
    options: Options,
    diagnostics: Arc<dyn DiagnosticSink>,
    parallel: bool,
}

impl Publisher {
    /// A publisher with the default parser and converter, no highlighters,
    /// and warnings going to standard error.
    pub fn new(name: impl Into<String>, patterns: impl Into<Patterns>) -> Self {
        Self {
            name: name.into(),
            patterns: patterns.into(),
            parser: Box::new(FrontMatter),
            html_converter: Box::new(ExtensionConverter),
            highlighters: Vec::new(),
            code_block_pattern: CodeBlockPattern::default(),
            options: Options::new(),
            diagnostics: Arc::new(StderrSink),
            parallel: false,
        }
    }

    pub fn parser(mut self, parser: impl PageParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    pub fn html_converter(mut self, converter: impl HtmlConverter + 'static) -> Self {
        self.html_converter = Box::new(converter);
        self
    }

    /// Append a highlighter. Earlier highlighters win when several know a language.
    pub fn highlighter(mut self, highlighter: impl Highlighter + 'static) -> Self {
        self.highlighters.push(Box::new(highlighter));
        self
    }

    /// Replace the highlighter list.
    pub fn highlighters(mut self, highlighters: Vec<Box<dyn Highlighter>>) -> Self {
        self.highlighters = highlighters;
        self
    }

    pub fn code_block_pattern(mut self, pattern: CodeBlockPattern) -> Self {
        self.code_block_pattern = pattern;
        self
    }

    /// Replace the options bag handed to the converter.
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.diagnostics = Arc::new(sink);
        self
    }

    /// Read, parse, convert and highlight files on the rayon pool.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn patterns(&self) -> &Patterns {
        &self.patterns
    }

    /// Source files in the order they will be compiled.
    pub fn sources(&self) -> Result<Vec<PathBuf>, DiscoverError> {
        discover::discover(&self.patterns)
    }

    /// Run the pipeline and hand every rendered page to `builder`.
    #[instrument(skip_all, fields(name = %self.name))]
    pub fn compile<B: EntryBuilder>(&self, builder: &B) -> Result<Compiled<B::Entry>, PublishError> {
        let paths = discover::discover(&self.patterns)?;
        debug!(files = paths.len(), "discovered sources");

        // Stat before reading: an edit made during the pass shows up as
        // stale on the next check instead of being missed.
        let snapshot = Snapshot::from_paths(&self.patterns, paths.clone())?;

        let rendered: Vec<Vec<RenderedPage>> = if self.parallel {
            paths
                .par_iter()
                .map(|path| self.render_file(path))
                .collect::<Result<_, _>>()?
        } else {
            paths
                .iter()
                .map(|path| self.render_file(path))
                .collect::<Result<_, _>>()?
        };

        let mut entries = Vec::new();
        for page in rendered.into_iter().flatten() {
            let RenderedPage {
                path,
                attributes,
                body,
            } = page;
            let entry = builder
                .build(&path, attributes, body)
                .map_err(|source| PublishError::Build { path, source })?;
            entries.push(entry);
        }

        info!(
            files = paths.len(),
            entries = entries.len(),
            parallel = self.parallel,
            "compiled collection"
        );

        Ok(Compiled {
            collection: Collection::new(self.name.clone(), entries),
            snapshot,
        })
    }

    /// Whether a collection compiled under `previous` is out of date.
    pub fn needs_rebuild(&self, previous: Option<&Snapshot>) -> Result<bool, SnapshotError> {
        staleness::needs_rebuild(&self.patterns, previous)
    }

    fn render_file(&self, path: &Path) -> Result<Vec<RenderedPage>, PublishError> {
        let content = std::fs::read_to_string(path).map_err(|source| PublishError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let parsed = self.parser.parse(path, &content)?;
        let mut pages = Vec::with_capacity(parsed.len());

        for page in parsed {
            let conversion =
                self.html_converter
                    .convert(path, &page.body, &page.attributes, &self.options)?;

            for diagnostic in &conversion.diagnostics {
                self.diagnostics.emit(&Warning {
                    path: path.to_path_buf(),
                    line: page.line + diagnostic.line.saturating_sub(1),
                    message: diagnostic.message.clone(),
                });
            }

            let body = if self.highlighters.is_empty() {
                conversion.html
            } else {
                highlight::highlight(&conversion.html, &self.highlighters, &self.code_block_pattern)
            };

            pages.push(RenderedPage {
                path: path.to_path_buf(),
                attributes: page.attributes,
                body,
            });
        }

        debug!(path = %path.display(), records = pages.len(), "rendered source");
        Ok(pages)
    }
}
