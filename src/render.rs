//! HTML rendering of token streams and diff documents.
//!
//! Pages are styled through CSS classes named after token kinds, with line
//! numbers in a table layout and changed lines emphasized. Diff artifacts
//! are visualized by re-tokenizing the diff text itself through the diff
//! scanner.

use std::fs;
use std::ops::Range;
use std::path::Path;

use crate::encode::DebugEncoder;
use crate::error::HarnessError;
use crate::report::Reporter;
use crate::scanner::{DiffScanner, Scanner, TokenStream};

const PAGE_CSS: &str = "\
body { background: #fff; color: #1a1a1a; font-family: monospace; }\n\
table.code { border-collapse: collapse; width: 100%; }\n\
td.line-no { color: #999; text-align: right; padding: 0 8px; \
user-select: none; border-right: 1px solid #ddd; }\n\
td.line { padding: 0 8px; white-space: pre; }\n\
td.line.hl { background: #fff3b0; }\n\
.keyword { color: #7f0055; font-weight: bold; }\n\
.ident { color: #1a1a1a; }\n\
.number { color: #164; }\n\
.string { color: #a11; }\n\
.comment { color: #888; font-style: italic; }\n\
.operator { color: #333; }\n\
.delimiter { color: #333; }\n\
.text { color: #1a1a1a; }\n\
.inserted { color: #164; background: #dfd; }\n\
.deleted { color: #a11; background: #fdd; }\n\
.head { color: #06c; font-weight: bold; }\n\
.unknown { color: #fff; background: #c00; }\n";

/// Token stream → standalone HTML page.
pub struct HtmlRenderer {
    pub tab_width: usize,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self { tab_width: 8 }
    }
}

impl HtmlRenderer {
    pub fn render_page(
        &self,
        tokens: &TokenStream,
        highlight: &[Range<usize>],
        title: &str,
    ) -> String {
        let tab = " ".repeat(self.tab_width);
        let mut lines: Vec<String> = Vec::new();
        let mut current = String::new();

        for token in tokens {
            for (i, piece) in token.text.split('\n').enumerate() {
                if i > 0 {
                    lines.push(std::mem::take(&mut current));
                }
                if piece.is_empty() {
                    continue;
                }
                let escaped = escape_html(&piece.replace('\t', &tab));
                if token.kind.is_whitespace() {
                    current.push_str(&escaped);
                } else {
                    current.push_str("<span class=\"");
                    current.push_str(token.kind.as_str());
                    current.push_str("\">");
                    current.push_str(&escaped);
                    current.push_str("</span>");
                }
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }

        let mut body = String::new();
        for (idx, line) in lines.iter().enumerate() {
            let number = idx + 1;
            let emphasized = highlight.iter().any(|r| r.contains(&number));
            body.push_str("<tr><td class=\"line-no\">");
            body.push_str(&number.to_string());
            body.push_str("</td><td class=\"line");
            if emphasized {
                body.push_str(" hl");
            }
            body.push_str("\">");
            body.push_str(line);
            body.push_str("</td></tr>\n");
        }

        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{title}</title>\n<style>\n{css}</style>\n</head>\n<body>\n\
             <h1>{title}</h1>\n<table class=\"code\">\n{body}</table>\n\
             </body>\n</html>\n",
            title = escape_html(title),
            css = PAGE_CSS,
        )
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// The per-example visual-artifact step: writes the current rendering,
/// promotes it to the visual baseline on pass, and regenerates the baseline
/// from a hand-authored token dump when one is newer.
pub struct Renderer<'a> {
    pub html: HtmlRenderer,
    encoder: &'a DebugEncoder,
    reporter: &'a Reporter,
}

impl<'a> Renderer<'a> {
    pub fn new(encoder: &'a DebugEncoder, reporter: &'a Reporter) -> Self {
        Self { html: HtmlRenderer::default(), encoder, reporter }
    }

    pub fn highlight(
        &self,
        dir: &Path,
        collection: &str,
        name: &str,
        tokens: &TokenStream,
        changed: &[Range<usize>],
        okay: bool,
    ) -> Result<(), HarnessError> {
        let title = format!("Testing {collection}: {name}");
        let state = if okay { "[OKAY]" } else { "[NOT OKAY]" };
        let page = self.html.render_page(tokens, changed, &format!("{title} {state}"));

        let actual = dir.join(format!("{name}.actual.html"));
        fs::write(&actual, page).map_err(|e| HarnessError::artifact_io(&actual, e))?;

        let expected = dir.join(format!("{name}.expected.html"));
        if okay {
            fs::copy(&actual, &expected).map_err(|e| HarnessError::artifact_io(&expected, e))?;
        } else {
            self.regenerate_from_sidecar(dir, name, changed, &title)?;
        }
        self.reporter.status("highlighting", true);
        Ok(())
    }

    /// Rebuild `<name>.expected.html` from `<name>.expected.tokens.dump`
    /// when the dump is newer than the current visual baseline. Supports
    /// manually curated baselines that never came from a passing run.
    fn regenerate_from_sidecar(
        &self,
        dir: &Path,
        name: &str,
        changed: &[Range<usize>],
        title: &str,
    ) -> Result<(), HarnessError> {
        let sidecar = dir.join(format!("{name}.expected.tokens.dump"));
        if !sidecar.exists() {
            return Ok(());
        }
        let expected = dir.join(format!("{name}.expected.html"));
        if expected.exists() {
            let sidecar_time = fs::metadata(&sidecar)
                .and_then(|m| m.modified())
                .map_err(|e| HarnessError::artifact_io(&sidecar, e))?;
            let expected_time = fs::metadata(&expected)
                .and_then(|m| m.modified())
                .map_err(|e| HarnessError::artifact_io(&expected, e))?;
            if sidecar_time <= expected_time {
                return Ok(());
            }
        }

        let text = fs::read_to_string(&sidecar)
            .map_err(|e| HarnessError::artifact_io(&sidecar, e))?;
        let tokens = self
            .encoder
            .parse(&text)
            .map_err(|e| HarnessError::scanner(format!("token dump for '{name}': {e}")))?;
        let page = self.html.render_page(&tokens, changed, title);
        fs::write(&expected, page).map_err(|e| HarnessError::artifact_io(&expected, e))?;
        Ok(())
    }

    /// Render diff text as its own highlighted document. Callers run this
    /// under a reporter quiet guard so the nested render's progress does
    /// not interleave into the current example's line.
    pub fn diff_document(&self, diff_text: &str, title: &str) -> Result<String, HarnessError> {
        let tokens = DiffScanner
            .scan(diff_text)
            .map_err(|e| HarnessError::scanner(e.to_string()))?;
        self.reporter.status("diff rendered", true);
        Ok(self.html.render_page(&tokens, &[], title))
    }
}
