mod common;

use common::*;

use scanprobe::config::{Config, Selection};
use scanprobe::error::HarnessError;
use scanprobe::harness::CheckStatus;
use scanprobe::probe::Category;
use scanprobe::scanner::{
    ScanError, Scanner, ScannerRegistry, SourceScanner, Token, TokenKind, TokenStream,
};

const HELLO: &str = "fn main() {\n    let greeting = \"hello\"\n}\n";

// ── Golden flow ─────────────────────────────────────────────────────────

#[test]
fn first_run_creates_baselines_and_passes() {
    let suite = suite_with(&[("source/hello.in.src", HELLO)]);
    let summary = run(suite.path(), Config::fast()).unwrap();

    assert!(summary.passed());
    assert_eq!(summary.results.len(), 1);
    assert!(summary.results[0].new_baseline);

    let dir = suite.path().join("source");
    assert!(dir.join("hello.expected.tokens").exists());
    assert!(dir.join("hello.actual.html").exists());
    assert!(dir.join("hello.expected.html").exists());
    assert!(!dir.join("hello.debug.diff").exists());
    assert!(suite.path().join("suite-report.json").exists());
}

#[test]
fn unchanged_second_run_is_idempotent() {
    let suite = suite_with(&[("source/hello.in.src", HELLO)]);
    run(suite.path(), Config::fast()).unwrap();
    let summary = run(suite.path(), Config::fast()).unwrap();

    assert!(summary.passed());
    assert!(!summary.results[0].new_baseline);
    assert!(!suite.path().join("source/hello.debug.diff").exists());
    assert!(!suite.path().join("source/hello.actual.tokens").exists());
}

#[test]
fn stale_baseline_produces_hint_and_artifacts() {
    let suite = suite_with(&[
        ("source/hello.in.src", HELLO),
        ("source/hello.expected.tokens", "ident(stale)\n"),
    ]);
    let summary = run(suite.path(), Config::fast()).unwrap();

    assert!(!summary.passed());
    assert_eq!(summary.hints.len(), 1);
    assert_eq!(summary.hints[0].example, "source.hello");
    assert!(summary.hints[0].added_lines > 0);

    let dir = suite.path().join("source");
    assert!(dir.join("hello.actual.tokens").exists());
    assert!(dir.join("hello.debug.diff").exists());
    assert!(dir.join("hello.debug.diff.html").exists());
    // A failing run must not promote the visual baseline...
    assert!(!dir.join("hello.expected.html").exists());
    // ...nor touch the data baseline.
    assert_eq!(read(suite.path(), "source/hello.expected.tokens"), "ident(stale)\n");

    assert!(summary.results[0].mismatched);
    assert!(!summary.results[0].suppressed);
}

#[test]
fn accept_mode_rebases_selected_baseline() {
    let suite = suite_with(&[
        ("source/hello.in.src", HELLO),
        ("source/hello.expected.tokens", "ident(stale)\n"),
    ]);
    let mut config = Config::fast();
    config.accept = Some(Selection::parse("source.hello").unwrap());
    let summary = run(suite.path(), config).unwrap();

    assert!(summary.passed());
    assert!(summary.results[0].new_baseline);
    let baseline = read(suite.path(), "source/hello.expected.tokens");
    assert!(baseline.starts_with("keyword(fn)"));
}

#[test]
fn suite_report_is_written_as_json() {
    let suite = suite_with(&[("source/hello.in.src", HELLO)]);
    run(suite.path(), Config::fast()).unwrap();

    let report: serde_json::Value =
        serde_json::from_str(&read(suite.path(), "suite-report.json")).unwrap();
    assert_eq!(report["passed"], serde_json::Value::Bool(true));
    assert_eq!(report["results"][0]["name"], "hello");
    assert_eq!(report["results"][0]["checks"]["golden"], "passed");
}

// ── Known issues ────────────────────────────────────────────────────────

const KNOWN_ISSUE: &str =
    "description = \"scanner splits strings oddly\"\nticket_url = \"https://tracker/issues/42\"\n";

#[test]
fn known_issue_downgrades_mismatch() {
    let suite = suite_with(&[
        ("source/hello.in.src", HELLO),
        ("source/hello.expected.tokens", "ident(stale)\n"),
        ("source/hello.known-issue.toml", KNOWN_ISSUE),
    ]);
    let summary = run(suite.path(), Config::fast()).unwrap();

    assert!(summary.passed());
    assert!(summary.hints.is_empty());
    assert!(summary.results[0].mismatched);
    assert!(summary.results[0].suppressed);
    // Diff artifacts are still produced for inspection.
    assert!(suite.path().join("source/hello.debug.diff").exists());
}

#[test]
fn known_issue_is_ignored_in_strict_mode() {
    let suite = suite_with(&[
        ("source/hello.in.src", HELLO),
        ("source/hello.expected.tokens", "ident(stale)\n"),
        ("source/hello.known-issue.toml", KNOWN_ISSUE),
    ]);
    let mut config = Config::fast();
    config.strict = true;
    let err = run(suite.path(), config).unwrap_err();
    assert!(matches!(err, HarnessError::Mismatch { .. }));
}

// ── Probe failures ──────────────────────────────────────────────────────

/// Chokes on short inputs, fine on full sources: the kind of EOF-handling
/// bug the incremental category exists to catch.
struct BrittleScanner;

impl Scanner for BrittleScanner {
    fn name(&self) -> &str {
        "source"
    }

    fn file_extension(&self) -> &str {
        "src"
    }

    fn scan(&self, source: &str) -> Result<TokenStream, ScanError> {
        if source.len() < 8 {
            return Err(ScanError::new("input too short", 0));
        }
        SourceScanner.scan(source)
    }
}

fn brittle_registry() -> ScannerRegistry {
    let mut registry = ScannerRegistry::new();
    registry.register(Box::new(BrittleScanner));
    registry
}

#[test]
fn probe_failures_are_advisory_in_normal_mode() {
    let suite = suite_with(&[("source/hello.in.src", HELLO)]);
    let summary = run_with_registry(suite.path(), Config::fast(), &brittle_registry()).unwrap();

    // Robustness failures are reported but never fail the run.
    assert!(summary.passed());
    let result = &summary.results[0];
    assert_eq!(result.checks["random"], CheckStatus::Failed);
    assert_eq!(result.checks["incremental"], CheckStatus::Failed);
    assert_eq!(result.checks["golden"], CheckStatus::Passed);
    assert_eq!(result.probe_failures.len(), 2);
    assert!(result.probe_failures[0].contains("size 0 seed 17"));
}

#[test]
fn strict_mode_aborts_on_first_probe_failure() {
    let suite = suite_with(&[("source/hello.in.src", HELLO)]);
    let mut config = Config::fast();
    config.strict = true;
    let err = run_with_registry(suite.path(), config, &brittle_registry()).unwrap_err();

    match err {
        HarnessError::Probe { category, size, seed, .. } => {
            assert_eq!(category, Category::Random);
            assert_eq!(size, 0);
            assert_eq!(seed, 17);
        }
        other => panic!("expected probe error, got {other}"),
    }
}

#[test]
fn disabled_categories_never_probe() {
    let suite = suite_with(&[("source/hello.in.src", HELLO)]);
    let mut config = Config::fast();
    config.no_random = true;
    config.no_incremental = true;
    let summary = run_with_registry(suite.path(), config, &brittle_registry()).unwrap();

    let result = &summary.results[0];
    assert_eq!(result.checks["random"], CheckStatus::Disabled);
    assert_eq!(result.checks["incremental"], CheckStatus::Disabled);
    assert!(result.probe_failures.is_empty());
}

// ── Identity ────────────────────────────────────────────────────────────

/// Violates the identity law by dropping whitespace tokens.
struct DroppingScanner;

impl Scanner for DroppingScanner {
    fn name(&self) -> &str {
        "source"
    }

    fn file_extension(&self) -> &str {
        "src"
    }

    fn scan(&self, source: &str) -> Result<TokenStream, ScanError> {
        let mut tokens = SourceScanner.scan(source)?;
        tokens.tokens.retain(|t| t.kind != TokenKind::Space);
        Ok(tokens)
    }
}

#[test]
fn identity_failure_creates_hint() {
    let suite = suite_with(&[("source/hello.in.src", HELLO)]);
    let mut registry = ScannerRegistry::new();
    registry.register(Box::new(DroppingScanner));
    let summary = run_with_registry(suite.path(), Config::fast(), &registry).unwrap();

    assert!(!summary.passed());
    assert_eq!(summary.hints.len(), 1);
    assert!(summary.hints[0].message.contains("reassembled"));
    assert_eq!(summary.results[0].checks["identity"], CheckStatus::Failed);
}

#[test]
fn identity_failure_aborts_in_strict_mode() {
    let suite = suite_with(&[("source/hello.in.src", HELLO)]);
    let mut registry = ScannerRegistry::new();
    registry.register(Box::new(DroppingScanner));
    let mut config = Config::fast();
    config.strict = true;
    let err = run_with_registry(suite.path(), config, &registry).unwrap_err();
    assert!(matches!(err, HarnessError::Identity { .. }));
}

#[test]
fn disabled_identity_check_passes_dropping_scanner() {
    let suite = suite_with(&[("source/hello.in.src", HELLO)]);
    let mut registry = ScannerRegistry::new();
    registry.register(Box::new(DroppingScanner));
    let mut config = Config::fast();
    config.no_identity = true;
    let summary = run_with_registry(suite.path(), config, &registry).unwrap();

    assert!(summary.passed());
    assert_eq!(summary.results[0].checks["identity"], CheckStatus::Disabled);
}

// ── Selection and size caps ─────────────────────────────────────────────

#[test]
fn only_selection_limits_the_run() {
    let suite = suite_with(&[
        ("source/one.in.src", "let a = 1\n"),
        ("source/two.in.src", "let b = 2\n"),
    ]);
    let mut config = Config::fast();
    config.only = Some(Selection::parse("source.one").unwrap());
    let summary = run(suite.path(), config).unwrap();

    assert_eq!(summary.results.len(), 1);
    assert_eq!(summary.results[0].name, "one");
    assert!(suite.path().join("source/one.expected.tokens").exists());
    assert!(!suite.path().join("source/two.expected.tokens").exists());
}

#[test]
fn unknown_collections_are_skipped_without_selection() {
    let suite = suite_with(&[
        ("source/hello.in.src", HELLO),
        ("cobol/ledger.in.cbl", "MOVE A TO B\n"),
    ]);
    let summary = run(suite.path(), Config::fast()).unwrap();
    assert!(summary.passed());
    assert_eq!(summary.results.len(), 1);
}

#[test]
fn selecting_unknown_collection_is_an_error() {
    let suite = suite_with(&[("cobol/ledger.in.cbl", "MOVE A TO B\n")]);
    let mut config = Config::fast();
    config.only = Some(Selection::parse("cobol").unwrap());
    let err = run(suite.path(), config).unwrap_err();
    assert!(matches!(err, HarnessError::Scanner { .. }));
}

#[test]
fn oversized_examples_are_skipped_unless_selected() {
    let suite = suite_with(&[("source/hello.in.src", HELLO)]);
    let mut config = Config::fast();
    config.max_size_to_test = 4;
    let summary = run(suite.path(), config).unwrap();

    assert!(summary.passed());
    assert_eq!(summary.results[0].checks["golden"], CheckStatus::Skipped);
    assert!(!suite.path().join("source/hello.expected.tokens").exists());

    // Explicit selection overrides the cap.
    let mut config = Config::fast();
    config.max_size_to_test = 4;
    config.only = Some(Selection::parse("source.hello").unwrap());
    let summary = run(suite.path(), config).unwrap();
    assert!(summary.passed());
    assert!(suite.path().join("source/hello.expected.tokens").exists());
}

#[test]
fn oversized_examples_skip_highlighting_only() {
    let suite = suite_with(&[("source/hello.in.src", HELLO)]);
    let mut config = Config::fast();
    config.max_size_to_highlight = 4;
    let summary = run(suite.path(), config).unwrap();

    assert!(summary.passed());
    assert_eq!(summary.results[0].checks["highlighting"], CheckStatus::Skipped);
    assert!(suite.path().join("source/hello.expected.tokens").exists());
    assert!(!suite.path().join("source/hello.actual.html").exists());
}

// ── Unrelated-change isolation ──────────────────────────────────────────

/// Version-two scanner: classifies the identifier `magic` as a keyword.
/// Examples that never say `magic` must be unaffected.
struct SourceScannerV2;

impl Scanner for SourceScannerV2 {
    fn name(&self) -> &str {
        "source"
    }

    fn file_extension(&self) -> &str {
        "src"
    }

    fn scan(&self, source: &str) -> Result<TokenStream, ScanError> {
        let mut tokens = SourceScanner.scan(source)?;
        for token in &mut tokens.tokens {
            if token.kind == TokenKind::Ident && token.text == "magic" {
                *token = Token::new(TokenKind::Keyword, "magic");
            }
        }
        Ok(tokens)
    }
}

#[test]
fn unrelated_scanner_change_leaves_other_baselines_untouched() {
    let suite = suite_with(&[
        ("source/foo.in.src", "let plain = 1\n"),
        ("source/bar.in.src", "let magic = 2\n"),
    ]);
    run(suite.path(), Config::fast()).unwrap();
    let foo_baseline = read(suite.path(), "source/foo.expected.tokens");

    let mut registry = ScannerRegistry::new();
    registry.register(Box::new(SourceScannerV2));
    let summary = run_with_registry(suite.path(), Config::fast(), &registry).unwrap();

    assert!(!summary.passed());
    assert_eq!(summary.hints.len(), 1);
    assert_eq!(summary.hints[0].example, "source.bar");

    assert_eq!(read(suite.path(), "source/foo.expected.tokens"), foo_baseline);
    assert!(!suite.path().join("source/foo.debug.diff").exists());
    assert!(suite.path().join("source/bar.debug.diff").exists());
}
