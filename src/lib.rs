//! # Quire
//!
//! Compiles a set of front-matter text files into a fixed, ordered
//! collection of records, so a host application can ship its content
//! without reading files at runtime.
//!
//! # Architecture: One Pass, Five Stages
//!
//! ```text
//! 1. Discover   patterns  →  paths           (glob, lexicographic per pattern)
//! 2. Parse      file      →  ParsedPage(s)   (header map + raw body)
//! 3. Convert    body      →  HTML            (markdown or passthrough, warnings)
//! 4. Highlight  HTML      →  HTML            (code blocks → span-tagged tokens)
//! 5. Build      page      →  caller's record (in discovery order)
//! ```
//!
//! Stages 2–4 are pluggable through traits ([`parser::PageParser`],
//! [`convert::HtmlConverter`], [`highlight::Highlighter`]) and the record
//! type belongs to the caller ([`builder::EntryBuilder`]). Closures
//! implement all of them.
//!
//! ```rust,ignore
//! use quire::prelude::*;
//!
//! let compiled = Publisher::new("posts", "posts/**/*.md")
//!     .highlighter(Spans)
//!     .compile(&PageEntryBuilder)?;
//!
//! // later
//! if publisher.needs_rebuild(Some(&compiled.snapshot))? { /* compile again */ }
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`discover`] | Stage 1: expand `from` patterns into an ordered path list |
//! | [`parser`] | Stage 2: `PageParser` trait and the default front-matter parser |
//! | [`convert`] | Stage 3: `HtmlConverter` trait and the extension-based default |
//! | [`highlight`] | Stage 4: code-block rewriting, `Spans` highlighter, logos lexers |
//! | [`builder`] | Stage 5: `EntryBuilder` trait and the resulting `Collection` |
//! | [`publisher`] | Runs the stages, sequentially or on the rayon pool |
//! | [`staleness`] | `Snapshot` of compiled sources and the `needs_rebuild` check |
//! | [`diagnostics`] | Converter warnings and where they go |
//! | [`types`] | Pages as they flow between stages |
//! | [`config`] | `quire.toml` loading and validation (CLI) |
//! | [`artifact`] | Compiled collection + snapshot as JSON on disk (CLI) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Header as Data, Not Code
//!
//! The header above `---` is read as YAML and must come out as a map. That
//! keeps the familiar `{title: "Hello"}` form working without evaluating
//! anything.
//!
//! ## Explicit Ordering
//!
//! Directory listing order differs between platforms and filesystems. Each
//! pattern's matches are sorted by path, so the same sources always compile
//! to the same collection. Parallel compilation gathers results by index
//! and calls the builder afterwards, so it produces the same order too.
//!
//! ## Timestamp Staleness
//!
//! [`staleness::needs_rebuild`] compares paths and modification times, not
//! content. It is cheap enough to run before every build; the price is that
//! `touch` forces a rebuild and a restored older file doesn't.
//!
//! ## Warnings Don't Fail Builds
//!
//! CommonMark accepts any input, so "malformed" markdown is really
//! markdown the author probably didn't mean. Such cases are reported with
//! file and line through a [`diagnostics::DiagnosticSink`] and the build
//! carries on.

pub mod artifact;
pub mod builder;
pub mod config;
pub mod convert;
pub mod diagnostics;
pub mod discover;
pub mod highlight;
pub mod output;
pub mod parser;
pub mod publisher;
pub mod staleness;
pub mod types;

/// The types most callers need.
pub mod prelude {
    pub use crate::builder::{BoxError, Collection, EntryBuilder, PageEntry, PageEntryBuilder};
    pub use crate::convert::{Conversion, ConvertError, Diagnostic, ExtensionConverter, HtmlConverter};
    pub use crate::diagnostics::{CollectingSink, DiagnosticSink, StderrSink, Warning};
    pub use crate::discover::Patterns;
    pub use crate::highlight::{CodeBlockPattern, Highlighter, Lexer, Spans};
    pub use crate::parser::{FrontMatter, PageParser, ParseError};
    pub use crate::publisher::{Compiled, PublishError, Publisher};
    pub use crate::staleness::{Snapshot, needs_rebuild};
    pub use crate::types::{Attributes, Options, Parsed, ParsedPage, RenderedPage};
}

#[cfg(test)]
pub(crate) mod test_helpers;
