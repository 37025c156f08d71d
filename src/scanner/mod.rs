//! The scanner seam: the trait the harness probes, the token stream model,
//! and the built-in scanner implementations.

pub mod token;
pub use token::is_keyword;

use std::collections::HashMap;
use std::fmt;

use logos::Logos;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use token::RawToken;

/// Classification of a token, stable across scanners. The names double as
/// the CSS classes used by the HTML renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Keyword,
    Ident,
    Number,
    String,
    Comment,
    Operator,
    Delimiter,
    Space,
    Newline,
    Text,
    Inserted,
    Deleted,
    Head,
    Unknown,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Ident => "ident",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Comment => "comment",
            TokenKind::Operator => "operator",
            TokenKind::Delimiter => "delimiter",
            TokenKind::Space => "space",
            TokenKind::Newline => "newline",
            TokenKind::Text => "text",
            TokenKind::Inserted => "inserted",
            TokenKind::Deleted => "deleted",
            TokenKind::Head => "head",
            TokenKind::Unknown => "unknown",
        }
    }

    pub fn from_str(name: &str) -> Option<Self> {
        Some(match name {
            "keyword" => TokenKind::Keyword,
            "ident" => TokenKind::Ident,
            "number" => TokenKind::Number,
            "string" => TokenKind::String,
            "comment" => TokenKind::Comment,
            "operator" => TokenKind::Operator,
            "delimiter" => TokenKind::Delimiter,
            "space" => TokenKind::Space,
            "newline" => TokenKind::Newline,
            "text" => TokenKind::Text,
            "inserted" => TokenKind::Inserted,
            "deleted" => TokenKind::Deleted,
            "head" => TokenKind::Head,
            "unknown" => TokenKind::Unknown,
            _ => return None,
        })
    }

    /// Whitespace kinds pass through encoders verbatim.
    pub fn is_whitespace(self) -> bool {
        matches!(self, TokenKind::Space | TokenKind::Newline)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self { kind, text: text.into() }
    }
}

/// An ordered sequence of (kind, text) pairs covering the scanned input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    pub tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Concatenation of all token texts. For a well-behaved scanner this
    /// equals the scanned input exactly (the identity law).
    pub fn reassemble(&self) -> String {
        let mut text = String::with_capacity(self.tokens.iter().map(|t| t.text.len()).sum());
        for token in &self.tokens {
            text.push_str(&token.text);
        }
        text
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

#[derive(Debug, Error)]
#[error("scan error at byte {offset}: {msg}")]
pub struct ScanError {
    pub msg: String,
    pub offset: usize,
}

impl ScanError {
    pub fn new(msg: impl Into<String>, offset: usize) -> Self {
        Self { msg: msg.into(), offset }
    }
}

/// A tokenizer under test. External implementations register under the
/// collection name the harness should run them for.
pub trait Scanner {
    /// Registry key and display name.
    fn name(&self) -> &str;

    /// Extension of example source files, as in `<name>.in.<extension>`.
    fn file_extension(&self) -> &str;

    fn scan(&self, source: &str) -> Result<TokenStream, ScanError>;
}

// ── Built-in scanners ───────────────────────────────────────────────────────

/// Logos-based scanner for a generic curly-brace source language.
///
/// Total over any input: bytes no rule matches become `Unknown` tokens
/// rather than an error, so the emitted slices always partition the input.
pub struct SourceScanner;

impl Scanner for SourceScanner {
    fn name(&self) -> &str {
        "source"
    }

    fn file_extension(&self) -> &str {
        "src"
    }

    fn scan(&self, source: &str) -> Result<TokenStream, ScanError> {
        let mut tokens = TokenStream::new();
        let mut lexer = RawToken::lexer(source);

        while let Some(result) = lexer.next() {
            let text = lexer.slice();
            let kind = match result {
                Ok(RawToken::Space) => TokenKind::Space,
                Ok(RawToken::Newline) => TokenKind::Newline,
                Ok(RawToken::LineComment) => TokenKind::Comment,
                Ok(RawToken::Word) => {
                    if is_keyword(text) {
                        TokenKind::Keyword
                    } else {
                        TokenKind::Ident
                    }
                }
                Ok(RawToken::Number) => TokenKind::Number,
                Ok(RawToken::Str) => TokenKind::String,
                Ok(RawToken::Operator) => TokenKind::Operator,
                Ok(RawToken::Delimiter) => TokenKind::Delimiter,
                Err(()) => TokenKind::Unknown,
            };
            tokens.push(Token::new(kind, text));
        }

        Ok(tokens)
    }
}

/// Degenerate scanner: one `Text` token per line. Useful as a fallback
/// collection and as the simplest possible `Scanner` implementation.
pub struct TextScanner;

impl Scanner for TextScanner {
    fn name(&self) -> &str {
        "text"
    }

    fn file_extension(&self) -> &str {
        "txt"
    }

    fn scan(&self, source: &str) -> Result<TokenStream, ScanError> {
        let mut tokens = TokenStream::new();
        let mut rest = source;
        while let Some(pos) = rest.find('\n') {
            if pos > 0 {
                tokens.push(Token::new(TokenKind::Text, &rest[..pos]));
            }
            tokens.push(Token::new(TokenKind::Newline, "\n"));
            rest = &rest[pos + 1..];
        }
        if !rest.is_empty() {
            tokens.push(Token::new(TokenKind::Text, rest));
        }
        Ok(tokens)
    }
}

/// Line-oriented scanner for unified diff text. Backs the rendered
/// visualization of `.debug.diff` artifacts.
pub struct DiffScanner;

impl Scanner for DiffScanner {
    fn name(&self) -> &str {
        "diff"
    }

    fn file_extension(&self) -> &str {
        "diff"
    }

    fn scan(&self, source: &str) -> Result<TokenStream, ScanError> {
        let mut tokens = TokenStream::new();
        let mut rest = source;
        loop {
            let (line, tail) = match rest.find('\n') {
                Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
                None => (rest, None),
            };
            if !line.is_empty() {
                let kind = if line.starts_with("@@")
                    || line.starts_with("---")
                    || line.starts_with("+++")
                {
                    TokenKind::Head
                } else if line.starts_with('+') {
                    TokenKind::Inserted
                } else if line.starts_with('-') {
                    TokenKind::Deleted
                } else {
                    TokenKind::Text
                };
                tokens.push(Token::new(kind, line));
            }
            match tail {
                Some(tail) => {
                    tokens.push(Token::new(TokenKind::Newline, "\n"));
                    rest = tail;
                }
                None => break,
            }
        }
        Ok(tokens)
    }
}

// ── Registry ────────────────────────────────────────────────────────────────

/// Scanners keyed by collection name.
#[derive(Default)]
pub struct ScannerRegistry {
    scanners: HashMap<String, Box<dyn Scanner>>,
}

impl ScannerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in scanners.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(SourceScanner));
        registry.register(Box::new(TextScanner));
        registry.register(Box::new(DiffScanner));
        registry
    }

    pub fn register(&mut self, scanner: Box<dyn Scanner>) {
        self.scanners.insert(scanner.name().to_string(), scanner);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Scanner> {
        self.scanners.get(name).map(|s| s.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.scanners.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
}
