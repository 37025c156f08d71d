//! Console reporting.
//!
//! Styling goes through the `Paint` strategy so colored and plain output
//! share one code path; the harness picks an implementation once at
//! startup. A `QuietGuard` suppresses output for nested work (rendering a
//! diff document re-enters the scanning pipeline) and restores verbosity
//! on drop.

use std::cell::Cell;
use std::io::Write;

use crate::golden::Timings;
use crate::known_issue::KnownIssue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Green,
    Red,
    Yellow,
    Cyan,
    Magenta,
    Blue,
    White,
    Dim,
}

pub trait Paint {
    fn paint(&self, text: &str, style: Style) -> String;
}

/// ANSI escape styling for terminals.
pub struct Ansi;

impl Paint for Ansi {
    fn paint(&self, text: &str, style: Style) -> String {
        let code = match style {
            Style::Green => "32",
            Style::Red => "31",
            Style::Yellow => "33",
            Style::Cyan => "36",
            Style::Magenta => "35",
            Style::Blue => "34",
            Style::White => "37",
            Style::Dim => "2",
        };
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

/// Pass-through styling for logs and tests.
pub struct Plain;

impl Paint for Plain {
    fn paint(&self, text: &str, _style: Style) -> String {
        text.to_string()
    }
}

pub struct Reporter {
    paint: Box<dyn Paint>,
    quiet_depth: Cell<u32>,
}

impl Reporter {
    pub fn new(paint: Box<dyn Paint>) -> Self {
        Self { paint, quiet_depth: Cell::new(0) }
    }

    pub fn colored() -> Self {
        Self::new(Box::new(Ansi))
    }

    pub fn plain() -> Self {
        Self::new(Box::new(Plain))
    }

    pub fn paint(&self, text: &str, style: Style) -> String {
        self.paint.paint(text, style)
    }

    pub fn green_or_red(&self, text: &str, ok: bool) -> String {
        self.paint(text, if ok { Style::Green } else { Style::Red })
    }

    fn enabled(&self) -> bool {
        self.quiet_depth.get() == 0
    }

    /// Suppress output until the returned guard drops.
    pub fn quiet(&self) -> QuietGuard<'_> {
        self.quiet_depth.set(self.quiet_depth.get() + 1);
        QuietGuard { reporter: self }
    }

    pub fn line(&self, text: &str) {
        if self.enabled() {
            println!("{text}");
        }
    }

    pub fn fragment(&self, text: &str) {
        if self.enabled() {
            print!("{text}");
            let _ = std::io::stdout().flush();
        }
    }

    pub fn banner(&self, scanner_name: &str) {
        self.line("");
        self.line(&format!(
            "{}{}{}",
            self.paint("    >> Testing ", Style::Magenta),
            self.paint(scanner_name, Style::Cyan),
            self.paint(" scanner <<", Style::Magenta),
        ));
        self.line("");
    }

    pub fn example_header(&self, name: &str, size: u64) {
        self.fragment(&format!(
            "{} {} ",
            self.paint(&format!("{name:>20}"), Style::Cyan),
            self.paint(&human_size(size), Style::Yellow),
        ));
    }

    /// One word per finished check, the original suite's progress style.
    pub fn status(&self, task: &str, ok: bool) {
        self.fragment(&format!("{}, ", self.green_or_red(task, ok)));
    }

    pub fn skipped(&self, task: &str) {
        self.fragment(&format!("{} ", self.paint(&format!("-{task} skipped-"), Style::Dim)));
    }

    pub fn example_done(&self) {
        self.line(&self.paint(".", Style::Green));
    }

    pub fn known_issue(&self, issue: &KnownIssue) {
        self.line(&format!(
            "{}{}",
            self.paint("                 KNOWN ISSUE: ", Style::Cyan),
            self.paint(&issue.description, Style::Yellow),
        ));
        let reference = match (issue.ticket_ref(), issue.ticket_url.as_deref()) {
            (Some(_), Some(url)) => format!(
                "{}{}{}",
                self.paint("See ", Style::Yellow),
                self.paint(url, Style::White),
                self.paint(".", Style::Yellow),
            ),
            _ => self.paint("No ticket yet.", Style::Yellow),
        };
        self.line(&format!("{}{}", " ".repeat(30), reference));
    }

    /// Timing line; throughput is only meaningful for non-trivial sizes.
    pub fn timings(&self, timings: &Timings, token_count: usize, size: u64) {
        let total = timings.scan + timings.encode;
        self.fragment(&format!(
            "{}{}{}",
            self.paint(&format!("{:5.2}s", total.as_secs_f64()), Style::Blue),
            self.paint(":", Style::Yellow),
            self.paint(&format!("{:5.2}s", timings.direct.as_secs_f64()), Style::Magenta),
        ));
        if size >= 1024 && token_count > 0 {
            let ktok = |secs: f64| {
                if secs > 0.0 { token_count as f64 / secs / 1000.0 } else { 0.0 }
            };
            self.fragment(&format!(
                " {} {} {}",
                self.paint(
                    &format!("{:4.0} scanning", ktok(timings.scan.as_secs_f64())),
                    Style::White,
                ),
                self.paint(
                    &format!("{:4.0} encoding", ktok(timings.encode.as_secs_f64())),
                    Style::White,
                ),
                self.paint(
                    &format!("{:4.0} direct (KTok/s)", ktok(timings.direct.as_secs_f64())),
                    Style::White,
                ),
            ));
        }
        self.fragment(" ");
    }

    pub fn error(&self, text: &str) {
        if self.enabled() {
            eprintln!("{}", self.paint(text, Style::Red));
        }
    }
}

pub struct QuietGuard<'a> {
    reporter: &'a Reporter,
}

impl Drop for QuietGuard<'_> {
    fn drop(&mut self) {
        let depth = self.reporter.quiet_depth.get();
        self.reporter.quiet_depth.set(depth.saturating_sub(1));
    }
}

/// `1023 B`, `1.5 KiB`, `2.0 MiB` — sized like the original suite prints.
pub fn human_size(bytes: u64) -> String {
    let amount = bytes as f64;
    if amount < 1024.0 {
        format!("{amount:6.0} B  ")
    } else if amount < 1024.0 * 1024.0 {
        format!("{:6.1} KiB", amount / 1024.0)
    } else {
        format!("{:6.1} MiB", amount / (1024.0 * 1024.0))
    }
}
