//! The scanner probe and the three fuzz categories.
//!
//! A probe feeds one mutated buffer to the scanner and reports an outcome
//! value; it never inspects tokens. Panics are caught and reported the same
//! way as scan errors, so a crashing scanner fails its category instead of
//! tearing down the run. Each category stops at its first failure: the
//! recorded size/seed is enough to replay that exact buffer.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;

use crate::mutate;
use crate::scanner::Scanner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Random,
    Incremental,
    Shuffled,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Random => "random",
            Category::Incremental => "incremental",
            Category::Shuffled => "shuffled",
        })
    }
}

/// The mutated input that broke the scanner, with enough to replay it.
/// For the incremental category the prefix length doubles as the seed.
#[derive(Debug, Clone)]
pub struct ProbeFailure {
    pub category: Category,
    pub size: usize,
    pub seed: u64,
    pub detail: String,
}

#[derive(Debug)]
pub enum ProbeOutcome {
    Ok,
    Failed { detail: String },
}

#[derive(Debug)]
pub enum CategoryOutcome {
    Passed,
    Skipped,
    Failed(ProbeFailure),
}

impl CategoryOutcome {
    pub fn passed(&self) -> bool {
        !matches!(self, CategoryOutcome::Failed(_))
    }

    pub fn failure(&self) -> Option<&ProbeFailure> {
        match self {
            CategoryOutcome::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// The single seam through which fuzz categories reach the scanner.
pub struct Probe<'a> {
    scanner: &'a dyn Scanner,
}

impl<'a> Probe<'a> {
    pub fn new(scanner: &'a dyn Scanner) -> Self {
        Self { scanner }
    }

    /// Mutated buffers may not be UTF-8; they enter the string-shaped
    /// scanner seam through a lossy decode.
    pub fn probe_bytes(&self, bytes: &[u8]) -> ProbeOutcome {
        self.probe_str(&String::from_utf8_lossy(bytes))
    }

    pub fn probe_str(&self, text: &str) -> ProbeOutcome {
        match panic::catch_unwind(AssertUnwindSafe(|| self.scanner.scan(text))) {
            Ok(Ok(_)) => ProbeOutcome::Ok,
            Ok(Err(err)) => ProbeOutcome::Failed { detail: err.to_string() },
            Err(payload) => ProbeOutcome::Failed { detail: panic_message(payload) },
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("scanner panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("scanner panicked: {msg}")
    } else {
        "scanner panicked".to_string()
    }
}

/// Probe pseudo-random byte buffers of every size in `0..=max`.
pub fn run_random(probe: &Probe, max: usize) -> CategoryOutcome {
    for size in 0..=max {
        let seed = size as u64 + 17;
        let buffer = mutate::random_bytes(size, seed);
        if let ProbeOutcome::Failed { detail } = probe.probe_bytes(&buffer) {
            return CategoryOutcome::Failed(ProbeFailure {
                category: Category::Random,
                size,
                seed,
                detail,
            });
        }
    }
    CategoryOutcome::Passed
}

/// Probe truncated prefixes of the real source, catching EOF handling bugs
/// random noise cannot reach.
pub fn run_incremental(probe: &Probe, code: &str, max: usize) -> CategoryOutcome {
    for size in 0..=max {
        if size > code.len() {
            break;
        }
        let prefix = char_clamped_prefix(code, size);
        if let ProbeOutcome::Failed { detail } = probe.probe_str(prefix) {
            return CategoryOutcome::Failed(ProbeFailure {
                category: Category::Incremental,
                size,
                seed: size as u64,
                detail,
            });
        }
    }
    CategoryOutcome::Passed
}

/// Probe word-shuffled permutations of the source prefix: local byte
/// structure survives while global structure breaks. The word buffer
/// carries over between rounds, so round `i` shuffles the round `i-1`
/// arrangement with seed `i`.
pub fn run_shuffled(probe: &Probe, code: &str, max: usize) -> CategoryOutcome {
    let bytes = code.as_bytes();
    if bytes.len() < mutate::WORD_WIDTH {
        return CategoryOutcome::Skipped;
    }
    let prefix = &bytes[..bytes.len().min(max)];
    let mut words = mutate::split_words(prefix);
    if words.is_empty() {
        return CategoryOutcome::Skipped;
    }

    for round in 0..=max / 4 {
        mutate::shuffle_words(&mut words, round as u64);
        let buffer = mutate::pack_words(&words);
        if let ProbeOutcome::Failed { detail } = probe.probe_bytes(&buffer) {
            return CategoryOutcome::Failed(ProbeFailure {
                category: Category::Shuffled,
                size: buffer.len(),
                seed: round as u64,
                detail,
            });
        }
    }
    CategoryOutcome::Passed
}

/// Longest prefix of `code` no longer than `size` that ends on a char
/// boundary.
fn char_clamped_prefix(code: &str, size: usize) -> &str {
    let mut end = size.min(code.len());
    while !code.is_char_boundary(end) {
        end -= 1;
    }
    &code[..end]
}
