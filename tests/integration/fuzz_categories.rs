//! Category-level scenarios: exact probe counts and reproducibility of the
//! three mutation strategies, exercised through the public probe API.

use std::cell::Cell;

use scanprobe::probe::{run_incremental, run_random, run_shuffled, CategoryOutcome, Probe};
use scanprobe::scanner::{ScanError, Scanner, TokenStream};

struct CountingScanner {
    probes: Cell<usize>,
}

impl CountingScanner {
    fn new() -> Self {
        Self { probes: Cell::new(0) }
    }
}

impl Scanner for CountingScanner {
    fn name(&self) -> &str {
        "counting"
    }

    fn file_extension(&self) -> &str {
        "src"
    }

    fn scan(&self, _source: &str) -> Result<TokenStream, ScanError> {
        self.probes.set(self.probes.get() + 1);
        Ok(TokenStream::new())
    }
}

/// The spec scenario: a 10-byte example with max 16.
#[test]
fn ten_byte_example_with_max_sixteen() {
    let code = "0123456789";

    let scanner = CountingScanner::new();
    assert!(run_random(&Probe::new(&scanner), 16).passed());
    assert_eq!(scanner.probes.get(), 17, "sizes 0..=16");

    let scanner = CountingScanner::new();
    assert!(run_incremental(&Probe::new(&scanner), code, 16).passed());
    assert_eq!(scanner.probes.get(), 11, "prefix sizes 0..=10");

    let scanner = CountingScanner::new();
    assert!(run_shuffled(&Probe::new(&scanner), code, 16).passed());
    assert_eq!(scanner.probes.get(), 5, "shuffle rounds 0..=4");
}

#[test]
fn sub_word_example_skips_shuffling() {
    let scanner = CountingScanner::new();
    let outcome = run_shuffled(&Probe::new(&scanner), "1234567", 16);
    assert!(matches!(outcome, CategoryOutcome::Skipped));
    assert_eq!(scanner.probes.get(), 0);
}

/// A scanner failing on one specific input fails at the same size on every
/// run: the seeds make each category replayable.
struct TripwireScanner {
    needle: &'static str,
    failures: Cell<usize>,
}

impl Scanner for TripwireScanner {
    fn name(&self) -> &str {
        "tripwire"
    }

    fn file_extension(&self) -> &str {
        "src"
    }

    fn scan(&self, source: &str) -> Result<TokenStream, ScanError> {
        if source.contains(self.needle) {
            self.failures.set(self.failures.get() + 1);
            return Err(ScanError::new("tripwire", 0));
        }
        Ok(TokenStream::new())
    }
}

#[test]
fn failures_reproduce_across_runs() {
    let scanner = TripwireScanner { needle: "89ab", failures: Cell::new(0) };
    let code = "0123456789abcdef";

    let first = run_incremental(&Probe::new(&scanner), code, 64);
    let second = run_incremental(&Probe::new(&scanner), code, 64);
    let (first, second) = match (first, second) {
        (CategoryOutcome::Failed(a), CategoryOutcome::Failed(b)) => (a, b),
        _ => panic!("tripwire should fail both runs"),
    };
    assert_eq!(first.size, second.size);
    assert_eq!(first.size, 12, "first prefix containing the needle");
    assert_eq!(scanner.failures.get(), 2);
}

#[test]
fn shuffled_outcome_is_deterministic() {
    let code = "fn main() { let value = 12345678 }\n";
    let scanner_a = CountingScanner::new();
    let scanner_b = CountingScanner::new();
    assert!(run_shuffled(&Probe::new(&scanner_a), code, 32).passed());
    assert!(run_shuffled(&Probe::new(&scanner_b), code, 32).passed());
    assert_eq!(scanner_a.probes.get(), scanner_b.probes.get());
}
