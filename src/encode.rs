//! The debug token-stream encoder: the textual form compared against golden
//! baselines.
//!
//! Format: whitespace token text passes through verbatim; every other token
//! is written as `kind(text)` with `\`, `(` and `)` escaped. Output lines
//! therefore track source lines, which is what lets diff hunk positions
//! drive line highlighting in the renderer.

use crate::scanner::{ScanError, Scanner, Token, TokenKind, TokenStream};

pub struct DebugEncoder;

impl DebugEncoder {
    /// Extension of encoded artifacts, as in `<name>.expected.tokens`.
    pub fn file_extension(&self) -> &'static str {
        "tokens"
    }

    pub fn encode_tokens(&self, tokens: &TokenStream) -> String {
        let mut out = String::new();
        for token in tokens {
            self.encode_token(token, &mut out);
        }
        out
    }

    /// Scan and encode in one pass, without keeping the intermediate
    /// stream. Exercised as an independent code path for throughput
    /// comparison; the compared artifact always comes from `encode_tokens`.
    pub fn encode_source(
        &self,
        scanner: &dyn Scanner,
        source: &str,
    ) -> Result<String, ScanError> {
        let tokens = scanner.scan(source)?;
        let mut out = String::with_capacity(source.len());
        for token in &tokens {
            self.encode_token(token, &mut out);
        }
        Ok(out)
    }

    fn encode_token(&self, token: &Token, out: &mut String) {
        if token.kind.is_whitespace() {
            out.push_str(&token.text);
            return;
        }
        out.push_str(token.kind.as_str());
        out.push('(');
        for ch in token.text.chars() {
            if matches!(ch, '\\' | '(' | ')') {
                out.push('\\');
            }
            out.push(ch);
        }
        out.push(')');
    }

    /// Parse the debug format back into a token stream. Used for
    /// hand-authored `.tokens.dump` sidecar baselines.
    pub fn parse(&self, text: &str) -> Result<TokenStream, ScanError> {
        let mut tokens = TokenStream::new();
        let mut chars = text.char_indices().peekable();

        while let Some(&(offset, ch)) = chars.peek() {
            if ch == '\n' {
                chars.next();
                tokens.push(Token::new(TokenKind::Newline, "\n"));
            } else if ch == ' ' || ch == '\t' || ch == '\r' {
                let mut run = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c == ' ' || c == '\t' || c == '\r' {
                        run.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::new(TokenKind::Space, run));
            } else {
                let mut name = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_lowercase() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let kind = TokenKind::from_str(&name)
                    .ok_or_else(|| ScanError::new(format!("unknown token kind '{name}'"), offset))?;
                match chars.next() {
                    Some((_, '(')) => {}
                    _ => return Err(ScanError::new("expected '(' after token kind", offset)),
                }
                let mut body = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    match c {
                        '\\' => match chars.next() {
                            Some((_, escaped)) => body.push(escaped),
                            None => {
                                return Err(ScanError::new("dangling escape", offset));
                            }
                        },
                        ')' => {
                            closed = true;
                            break;
                        }
                        other => body.push(other),
                    }
                }
                if !closed {
                    return Err(ScanError::new("unterminated token body", offset));
                }
                tokens.push(Token::new(kind, body));
            }
        }

        Ok(tokens)
    }
}
