//! Elixir lexer.
//!
//! Covers the everyday surface of the language: comments, strings and
//! charlists, atoms (including `key:` keyword-list keys), aliases, module
//! attributes, numbers and operators. Sigils and heredocs fall back to
//! plain strings and operators, which is good enough for colouring.

use super::{Lexer, Token, TokenKind};
use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum ElixirToken {
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r"#[^\n]*")]
    Comment,

    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    #[regex(r"'([^'\\]|\\.)*'")]
    CharList,

    #[regex(r":[a-zA-Z_][a-zA-Z0-9_]*[?!]?")]
    Atom,

    #[regex(r#":"([^"\\]|\\.)*""#)]
    QuotedAtom,

    // `key:` in keyword lists and maps
    #[regex(r"[a-z_][a-zA-Z0-9_]*[?!]?:")]
    KeywordKey,

    #[regex(r"[A-Z][a-zA-Z0-9_]*")]
    Alias,

    #[regex(r"[a-z_][a-zA-Z0-9_]*[?!]?")]
    Identifier,

    #[regex(r"@[a-z_][a-zA-Z0-9_]*")]
    ModuleAttribute,

    #[regex(r"[0-9][0-9_]*(\.[0-9][0-9_]*)?")]
    Number,

    #[regex(r"0x[0-9a-fA-F_]+")]
    Hex,

    #[regex(r"[+\-*/=<>!&|^~\\.:]+")]
    Operator,

    #[regex(r"[()\[\]{},;%]")]
    Punctuation,
}

const KEYWORDS: &[&str] = &[
    "after", "alias", "and", "case", "catch", "cond", "def", "defdelegate",
    "defexception", "defguard", "defimpl", "defmacro", "defmacrop", "defmodule",
    "defp", "defprotocol", "defstruct", "do", "else", "end", "false", "fn", "for",
    "if", "import", "in", "nil", "not", "or", "quote", "raise", "receive",
    "require", "rescue", "true", "try", "unless", "unquote", "use", "when", "with",
];

fn classify(token: ElixirToken, text: &str) -> TokenKind {
    match token {
        ElixirToken::Whitespace => TokenKind::Whitespace,
        ElixirToken::Comment => TokenKind::Comment,
        ElixirToken::String => TokenKind::String,
        ElixirToken::CharList => TokenKind::Char,
        ElixirToken::Atom | ElixirToken::QuotedAtom | ElixirToken::KeywordKey => TokenKind::Symbol,
        ElixirToken::Alias => TokenKind::Class,
        ElixirToken::Identifier if KEYWORDS.contains(&text) => TokenKind::Keyword,
        ElixirToken::Identifier => TokenKind::Name,
        ElixirToken::ModuleAttribute => TokenKind::Attribute,
        ElixirToken::Number | ElixirToken::Hex => TokenKind::Number,
        ElixirToken::Operator => TokenKind::Operator,
        ElixirToken::Punctuation => TokenKind::Punctuation,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ElixirLexer;

impl Lexer for ElixirLexer {
    fn language(&self) -> &str {
        "elixir"
    }

    fn tokenize<'a>(&self, code: &'a str) -> Vec<Token<'a>> {
        let mut lexer = ElixirToken::lexer(code);
        let mut tokens = Vec::new();

        while let Some(result) = lexer.next() {
            let text = lexer.slice();
            let kind = match result {
                Ok(token) => classify(token, text),
                Err(()) => TokenKind::Text,
            };
            tokens.push(Token { kind, text });
        }

        tokens
    }
}
