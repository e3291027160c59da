//! Syntax highlighting of code blocks in rendered HTML.
//!
//! Highlighting is a text rewrite over the converter's output. A
//! [`CodeBlockPattern`] finds code blocks (capture 1 = language tag,
//! capture 2 = HTML-escaped code); each block is unescaped, handed to the
//! first [`Highlighter`] that has a [`Lexer`] for its language, and
//! re-emitted as
//!
//! ```text
//! <pre><code class="spans elixir"><span class="k">def</span> <span class="n">hello</span>…</code></pre>
//! ```
//!
//! Blocks with no language, or a language no highlighter knows, come out
//! as `<pre><code>…</code></pre>` with the code escaped and untouched.
//! Nothing here can fail a build.

mod elixir;
mod rust;
mod spans;

pub use elixir::ElixirLexer;
pub use rust::RustLexer;
pub use spans::{Spans, highlighter_by_name};

use maud::html;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;
use thiserror::Error;

/// Lexical class of a highlighted token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Name,
    /// Module, type or other capitalized name.
    Class,
    Attribute,
    String,
    Char,
    /// Atom / symbol.
    Symbol,
    Number,
    Comment,
    Operator,
    Punctuation,
    Label,
    Whitespace,
    /// Anything the lexer didn't recognize.
    Text,
}

impl TokenKind {
    /// CSS class of the `<span>` wrapping the token, if any.
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            TokenKind::Keyword => Some("k"),
            TokenKind::Name => Some("n"),
            TokenKind::Class => Some("nc"),
            TokenKind::Attribute => Some("na"),
            TokenKind::String => Some("s"),
            TokenKind::Char => Some("sc"),
            TokenKind::Symbol => Some("ss"),
            TokenKind::Number => Some("m"),
            TokenKind::Comment => Some("c"),
            TokenKind::Operator => Some("o"),
            TokenKind::Punctuation => Some("p"),
            TokenKind::Label => Some("nl"),
            TokenKind::Whitespace | TokenKind::Text => None,
        }
    }
}

/// A slice of source code with its class. Tokens from one `tokenize` call
/// concatenate back to the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

/// Splits code of one language into tokens.
pub trait Lexer: Send + Sync {
    /// Canonical language name, used in the block's CSS class.
    fn language(&self) -> &str;
    fn tokenize<'a>(&self, code: &'a str) -> Vec<Token<'a>>;
}

/// A set of lexers under one name.
pub trait Highlighter: Send + Sync {
    /// First CSS class of every block this highlighter renders.
    fn name(&self) -> &str;
    /// Lexer for a language tag, if this highlighter has one.
    fn lexer(&self, language: &str) -> Option<&dyn Lexer>;
}

#[derive(Error, Debug)]
pub enum PatternError {
    #[error("invalid code block pattern: {0}")]
    Regex(#[from] regex::Error),
    #[error("code block pattern needs two capture groups (language, code), found {0}")]
    Groups(usize),
}

const DEFAULT_CODE_BLOCK: &str =
    r#"<pre><code(?:\s+class="(?:language-)?([^"]*)")?>([^<]*)</code></pre>"#;

static DEFAULT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_CODE_BLOCK).expect("default code block pattern is valid"));

/// Regex locating code blocks: group 1 is the language, group 2 the code.
#[derive(Debug, Clone)]
pub struct CodeBlockPattern {
    regex: Regex,
}

impl CodeBlockPattern {
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let regex = Regex::new(pattern)?;
        // captures_len counts the implicit whole-match group.
        let groups = regex.captures_len() - 1;
        if groups < 2 {
            return Err(PatternError::Groups(groups));
        }
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl Default for CodeBlockPattern {
    fn default() -> Self {
        Self {
            regex: DEFAULT_REGEX.clone(),
        }
    }
}

/// Rewrite every code block in `html`.
pub fn highlight<H>(html: &str, highlighters: &[H], pattern: &CodeBlockPattern) -> String
where
    H: AsRef<dyn Highlighter>,
{
    pattern
        .regex
        .replace_all(html, |caps: &Captures<'_>| {
            let language = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            let code = unescape_html(caps.get(2).map(|m| m.as_str()).unwrap_or(""));
            render_block(language, &code, highlighters)
        })
        .into_owned()
}

fn render_block<H>(language: &str, code: &str, highlighters: &[H]) -> String
where
    H: AsRef<dyn Highlighter>,
{
    let resolved = if language.is_empty() {
        None
    } else {
        highlighters.iter().find_map(|h| {
            let h = h.as_ref();
            h.lexer(language).map(|lexer| (h, lexer))
        })
    };

    match resolved {
        Some((highlighter, lexer)) => {
            let class = format!("{} {}", highlighter.name(), lexer.language());
            let tokens = lexer.tokenize(code);
            html! {
                pre {
                    code class=(class) {
                        @for token in &tokens {
                            @if let Some(css) = token.kind.css_class() {
                                span class=(css) { (token.text) }
                            } @else {
                                (token.text)
                            }
                        }
                    }
                }
            }
            .into_string()
        }
        None => html! { pre { code { (code) } } }.into_string(),
    }
}

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(amp|lt|gt|quot|apos|#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6});")
        .expect("entity pattern is valid")
});

/// Decode the entities an HTML renderer emits for escaped text.
///
/// Unknown or out-of-range references are left as they are.
pub fn unescape_html(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }
    ENTITY.replace_all(s, |caps: &Captures<'_>| {
        let entity = &caps[1];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => {
                let num = &entity[1..];
                let code = match num.strip_prefix(['x', 'X']) {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => num.parse::<u32>().ok(),
                };
                code.and_then(char::from_u32)
            }
        };
        match decoded {
            Some(c) => c.to_string(),
            None => caps[0].to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans() -> Vec<Box<dyn Highlighter>> {
        vec![Box::new(Spans)]
    }

    #[test]
    fn known_language_is_highlighted() {
        let html = "<pre><code class=\"language-elixir\">def hello, do: :world\n</code></pre>\n";
        let out = highlight(html, &spans(), &CodeBlockPattern::default());
        assert!(out.starts_with("<pre><code class=\"spans elixir\">"));
        assert!(out.contains("<span class=\"k\">def</span>"));
        assert!(out.contains("<span class=\"ss\">:world</span>"));
        assert!(out.ends_with("</code></pre>\n"));
    }

    #[test]
    fn bare_class_form_is_recognized() {
        let html = "<pre><code class=\"rust\">fn main() {}</code></pre>";
        let out = highlight(html, &spans(), &CodeBlockPattern::default());
        assert!(out.starts_with("<pre><code class=\"spans rust\">"));
        assert!(out.contains("<span class=\"k\">fn</span>"));
    }

    #[test]
    fn unknown_language_stays_plain() {
        let html = "<pre><code class=\"language-cobol\">MOVE A TO B &amp; C\n</code></pre>";
        let out = highlight(html, &spans(), &CodeBlockPattern::default());
        assert_eq!(out, "<pre><code>MOVE A TO B &amp; C\n</code></pre>");
    }

    #[test]
    fn untagged_block_stays_plain() {
        let html = "<pre><code>x &lt; y</code></pre>";
        let out = highlight(html, &spans(), &CodeBlockPattern::default());
        assert_eq!(out, "<pre><code>x &lt; y</code></pre>");
    }

    #[test]
    fn no_highlighters_means_plain() {
        let none: Vec<Box<dyn Highlighter>> = Vec::new();
        let html = "<pre><code class=\"language-elixir\">:ok</code></pre>";
        let out = highlight(html, &none, &CodeBlockPattern::default());
        assert_eq!(out, "<pre><code>:ok</code></pre>");
    }

    #[test]
    fn escaped_code_is_unescaped_then_reescaped() {
        let html = "<pre><code class=\"language-rust\">a &lt; b &amp;&amp; c</code></pre>";
        let out = highlight(html, &spans(), &CodeBlockPattern::default());
        assert!(out.contains("&lt;"));
        assert!(out.contains("&amp;&amp;"));
        assert!(!out.contains("&amp;lt;"));
    }

    #[test]
    fn surrounding_html_untouched() {
        let html = "<h1>Title</h1>\n<pre><code class=\"language-elixir\">:a</code></pre>\n<p>after</p>\n";
        let out = highlight(html, &spans(), &CodeBlockPattern::default());
        assert!(out.starts_with("<h1>Title</h1>\n"));
        assert!(out.ends_with("\n<p>after</p>\n"));
    }

    #[test]
    fn custom_pattern() {
        let pattern = CodeBlockPattern::new(r#"<code lang="([^"]*)">([^<]*)</code>"#).unwrap();
        let html = "<p>see</p><code lang=\"elixir\">nil</code>";
        let out = highlight(html, &spans(), &pattern);
        assert_eq!(
            out,
            "<p>see</p><pre><code class=\"spans elixir\"><span class=\"k\">nil</span></code></pre>"
        );
    }

    #[test]
    fn pattern_needs_two_groups() {
        assert!(matches!(
            CodeBlockPattern::new(r"<code>([^<]*)</code>"),
            Err(PatternError::Groups(1))
        ));
        assert!(matches!(
            CodeBlockPattern::new(r"<code>(["),
            Err(PatternError::Regex(_))
        ));
    }

    #[test]
    fn first_highlighter_with_lexer_wins() {
        struct Nothing;
        impl Highlighter for Nothing {
            fn name(&self) -> &str {
                "nothing"
            }
            fn lexer(&self, _: &str) -> Option<&dyn Lexer> {
                None
            }
        }
        let hs: Vec<Box<dyn Highlighter>> = vec![Box::new(Nothing), Box::new(Spans)];
        let out = highlight(
            "<pre><code class=\"elixir\">x</code></pre>",
            &hs,
            &CodeBlockPattern::default(),
        );
        assert!(out.starts_with("<pre><code class=\"spans elixir\">"));
    }

    #[test]
    fn unescape_entities() {
        assert_eq!(unescape_html("plain"), "plain");
        assert_eq!(unescape_html("&lt;a href=&quot;x&quot;&gt;"), "<a href=\"x\">");
        assert_eq!(unescape_html("&#39;&#x27;&apos;"), "'''");
        assert_eq!(unescape_html("&amp;lt;"), "&lt;");
        assert_eq!(unescape_html("&nbsp; &#xFFFFFF;"), "&nbsp; &#xFFFFFF;");
    }
}
