//! Rust lexer.

use super::{Lexer, Token, TokenKind};
use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum RustToken {
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    #[regex(r#"b?"([^"\\]|\\.)*""#)]
    String,

    #[regex(r"b?'([^'\\\n]|\\.|\\u\{[0-9a-fA-F]{1,6}\})'")]
    Char,

    #[regex(r"'[a-zA-Z_][a-zA-Z0-9_]*")]
    Lifetime,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r"[0-9][0-9_]*(\.[0-9][0-9_]*)?([eE][+\-]?[0-9_]+)?((i|u)(8|16|32|64|128|size)|f32|f64)?")]
    Number,

    #[regex(r"0[xob][0-9a-fA-F_]+((i|u)(8|16|32|64|128|size))?")]
    RadixNumber,

    #[regex(r"#!?\[[^\]\n]*\]")]
    Attribute,

    #[regex(r"[+\-*/%=<>!&|^~?.:@]+")]
    Operator,

    #[regex(r"[()\[\]{},;#$]")]
    Punctuation,
}

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else",
    "enum", "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop",
    "match", "mod", "move", "mut", "pub", "ref", "return", "self", "Self",
    "static", "struct", "super", "trait", "true", "type", "unsafe", "use",
    "where", "while",
];

fn classify(token: RustToken, text: &str) -> TokenKind {
    match token {
        RustToken::Whitespace => TokenKind::Whitespace,
        RustToken::LineComment | RustToken::BlockComment => TokenKind::Comment,
        RustToken::String => TokenKind::String,
        RustToken::Char => TokenKind::Char,
        RustToken::Lifetime => TokenKind::Label,
        RustToken::Ident if KEYWORDS.contains(&text) => TokenKind::Keyword,
        RustToken::Ident if text.starts_with(|c: char| c.is_ascii_uppercase()) => TokenKind::Class,
        RustToken::Ident => TokenKind::Name,
        RustToken::Number | RustToken::RadixNumber => TokenKind::Number,
        RustToken::Attribute => TokenKind::Attribute,
        RustToken::Operator => TokenKind::Operator,
        RustToken::Punctuation => TokenKind::Punctuation,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RustLexer;

impl Lexer for RustLexer {
    fn language(&self) -> &str {
        "rust"
    }

    fn tokenize<'a>(&self, code: &'a str) -> Vec<Token<'a>> {
        let mut lexer = RustToken::lexer(code);
        let mut tokens = Vec::new();

        while let Some(result) = lexer.next() {
            let text = lexer.slice();
            let kind = result.map_or(TokenKind::Text, |token| classify(token, text));
            tokens.push(Token { kind, text });
        }

        tokens
    }
}
