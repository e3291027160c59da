//! The built-in highlighter.

use super::{ElixirLexer, Highlighter, Lexer, RustLexer};

/// Span-tagging highlighter bundling the crate's own lexers.
///
/// | Tag | Lexer |
/// |-----|-------|
/// | `elixir`, `ex`, `exs` | [`ElixirLexer`] |
/// | `rust`, `rs` | [`RustLexer`] |
#[derive(Debug, Clone, Copy, Default)]
pub struct Spans;

impl Highlighter for Spans {
    fn name(&self) -> &str {
        "spans"
    }

    fn lexer(&self, language: &str) -> Option<&dyn Lexer> {
        match language.to_ascii_lowercase().as_str() {
            "elixir" | "ex" | "exs" => Some(&ElixirLexer),
            "rust" | "rs" => Some(&RustLexer),
            _ => None,
        }
    }
}

/// Resolve a highlighter identifier from configuration.
pub fn highlighter_by_name(name: &str) -> Option<Box<dyn Highlighter>> {
    match name {
        "spans" => Some(Box::new(Spans)),
        _ => None,
    }
}
