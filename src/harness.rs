//! Orchestration: drives the per-example pipeline and aggregates outcomes
//! into one run verdict.
//!
//! Per example, in order: random → incremental → shuffled → golden →
//! known-issue decision → identity check → highlighting. Categories record
//! outcomes; only unresolved mismatches and identity failures become hints,
//! and the run fails iff any hint exists. Strict mode turns the first
//! probe/mismatch/identity failure into an immediate error return instead.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::Config;
use crate::encode::DebugEncoder;
use crate::error::HarnessError;
use crate::example::{self, Collection, Example};
use crate::golden::GoldenComparator;
use crate::known_issue::KnownIssue;
use crate::probe::{self, CategoryOutcome, Probe};
use crate::render::Renderer;
use crate::report::{Reporter, Style};
use crate::scanner::{Scanner, ScannerRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Passed,
    Failed,
    Skipped,
    Disabled,
}

/// Per-example verdict, serialized into the suite report.
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    pub collection: String,
    pub name: String,
    pub checks: BTreeMap<String, CheckStatus>,
    pub mismatched: bool,
    pub suppressed: bool,
    pub new_baseline: bool,
    /// Advisory probe failures, kept for replaying: category, size, seed.
    pub probe_failures: Vec<String>,
}

impl TestResult {
    fn new(collection: &str, name: &str) -> Self {
        Self {
            collection: collection.to_string(),
            name: name.to_string(),
            checks: BTreeMap::new(),
            mismatched: false,
            suppressed: false,
            new_baseline: false,
            probe_failures: Vec::new(),
        }
    }
}

/// One unresolved failure, surfaced in the final verdict.
#[derive(Debug, Clone, Serialize)]
pub struct Hint {
    pub example: String,
    pub message: String,
    pub artifact: PathBuf,
    pub added_lines: usize,
    pub removed_lines: usize,
}

#[derive(Debug)]
pub struct RunSummary {
    pub results: Vec<TestResult>,
    pub hints: Vec<Hint>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn passed(&self) -> bool {
        self.hints.is_empty()
    }
}

#[derive(Serialize)]
struct SuiteReport<'a> {
    passed: bool,
    elapsed_seconds: f64,
    results: &'a [TestResult],
    hints: &'a [Hint],
}

/// Scoped working-directory change. Process-wide, so example evaluation is
/// strictly sequential; the previous directory is restored on drop.
struct DirGuard {
    previous: PathBuf,
}

impl DirGuard {
    fn enter(dir: &Path) -> Result<Self, HarnessError> {
        let previous =
            std::env::current_dir().map_err(|e| HarnessError::artifact_io(dir, e))?;
        std::env::set_current_dir(dir).map_err(|e| HarnessError::artifact_io(dir, e))?;
        Ok(Self { previous })
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.previous);
    }
}

pub struct Harness<'a> {
    config: Config,
    registry: &'a ScannerRegistry,
    reporter: &'a Reporter,
    encoder: DebugEncoder,
}

impl<'a> Harness<'a> {
    pub fn new(config: Config, registry: &'a ScannerRegistry, reporter: &'a Reporter) -> Self {
        Self { config, registry, reporter, encoder: DebugEncoder }
    }

    pub fn run(&self, suite_root: &Path) -> Result<RunSummary, HarnessError> {
        let started = Instant::now();
        let root = suite_root
            .canonicalize()
            .map_err(|e| HarnessError::artifact_io(suite_root, e))?;

        let mut results = Vec::new();
        let mut hints = Vec::new();

        for collection in example::discover_collections(&root)? {
            if let Some(only) = &self.config.only {
                if !only.matches_collection(&collection.name) {
                    continue;
                }
            }
            let Some(scanner) = self.registry.get(&collection.name) else {
                if self.config.only.is_some() {
                    return Err(HarnessError::scanner(format!(
                        "no scanner registered for collection '{}'",
                        collection.name
                    )));
                }
                self.reporter.error(&format!(
                    "no scanner registered for collection '{}', skipping",
                    collection.name
                ));
                continue;
            };
            self.reporter.banner(scanner.name());

            let examples = example::discover_examples(&collection.dir, scanner.file_extension())?;
            if examples.is_empty() {
                self.reporter.line(&self.reporter.paint("No examples found!", Style::Red));
                continue;
            }

            for ex in &examples {
                if let Some(only) = &self.config.only {
                    if !only.matches_example(&collection.name, &ex.name) {
                        continue;
                    }
                }
                match self.evaluate(scanner, &collection, ex, &mut hints) {
                    Ok(result) => results.push(result),
                    Err(err) if err.is_example_scoped() => {
                        self.reporter.error(&format!("{}: {err}", ex.name));
                        let mut result = TestResult::new(&collection.name, &ex.name);
                        result.checks.insert("artifacts".to_string(), CheckStatus::Failed);
                        results.push(result);
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        let summary = RunSummary { results, hints, elapsed: started.elapsed() };
        self.write_report(&root, &summary)?;
        self.report_verdict(&summary);
        Ok(summary)
    }

    /// The per-example pipeline. Runs with the collection directory as the
    /// working context so artifact names stay example-relative.
    fn evaluate(
        &self,
        scanner: &dyn Scanner,
        collection: &Collection,
        ex: &Example,
        hints: &mut Vec<Hint>,
    ) -> Result<TestResult, HarnessError> {
        let mut result = TestResult::new(&collection.name, &ex.name);
        let explicit = self
            .config
            .only
            .as_ref()
            .is_some_and(|s| s.is_explicit(&collection.name, &ex.name));

        self.reporter.example_header(&ex.name, ex.size);

        if ex.size > self.config.max_size_to_test && !explicit {
            for check in ["random", "incremental", "shuffled", "golden", "identity", "highlighting"] {
                result.checks.insert(check.to_string(), CheckStatus::Skipped);
            }
            self.reporter.fragment(&self.reporter.paint("too big ", Style::Dim));
            self.reporter.example_done();
            return Ok(result);
        }

        let _ctx = DirGuard::enter(&collection.dir)?;
        let code = fs::read_to_string(&ex.path)
            .map_err(|e| HarnessError::artifact_io(&ex.path, e))?;
        let probe = Probe::new(scanner);

        if self.config.no_random {
            result.checks.insert("random".to_string(), CheckStatus::Disabled);
        } else {
            let outcome = probe::run_random(&probe, self.config.max);
            self.record_category("random", outcome, &mut result)?;
        }

        if self.config.no_incremental {
            result.checks.insert("incremental".to_string(), CheckStatus::Disabled);
        } else {
            let outcome = probe::run_incremental(&probe, &code, self.config.max);
            self.record_category("incremental", outcome, &mut result)?;
        }

        if self.config.no_shuffled {
            result.checks.insert("shuffled".to_string(), CheckStatus::Disabled);
        } else {
            let outcome = probe::run_shuffled(&probe, &code, self.config.max);
            self.record_category("shuffled", outcome, &mut result)?;
        }

        let renderer = Renderer::new(&self.encoder, self.reporter);
        let comparator = GoldenComparator::new(&self.encoder, &renderer, self.reporter);
        let accept = self
            .config
            .accept
            .as_ref()
            .is_some_and(|s| s.matches_example(&collection.name, &ex.name));
        let outcome = comparator.compare(scanner, Path::new("."), &ex.name, &code, accept)?;

        result.mismatched = !outcome.passed;
        result.new_baseline = outcome.new_baseline;
        self.reporter.timings(&outcome.timings, outcome.tokens.len(), ex.size);

        let mut known = None;
        if outcome.passed {
            let label = if outcome.new_baseline { "new baseline" } else { "complete" };
            self.reporter.status(label, true);
            result.checks.insert("golden".to_string(), CheckStatus::Passed);
        } else {
            let diff_path = outcome.diff_path.clone().unwrap_or_default();
            if self.config.strict {
                // Report the artifact where it lives once the guard restores
                // the working directory.
                let persisted = ex.path.with_file_name(format!("{}.debug.diff", ex.name));
                return Err(HarnessError::mismatch(&ex.name, persisted));
            }
            result.checks.insert("golden".to_string(), CheckStatus::Failed);
            known = KnownIssue::load(Path::new("."), &ex.name)?;
            match &known {
                Some(issue) => {
                    result.suppressed = true;
                    let label = match issue.ticket_ref() {
                        Some(ticket) => format!("see {ticket}"),
                        None => "ticket ?".to_string(),
                    };
                    self.reporter
                        .fragment(&format!("{}, ", self.reporter.paint(&label, Style::Yellow)));
                }
                None => {
                    self.reporter.status("complete", false);
                    let (added, removed) = diff_line_counts(&diff_path);
                    hints.push(Hint {
                        example: format!("{}.{}", collection.name, ex.name),
                        message: "scanner returned unexpected result".to_string(),
                        artifact: Path::new(&collection.name)
                            .join(format!("{}.debug.diff.html", ex.name)),
                        added_lines: added,
                        removed_lines: removed,
                    });
                }
            }
        }

        if self.config.no_identity {
            result.checks.insert("identity".to_string(), CheckStatus::Disabled);
        } else {
            let identical = outcome.tokens.reassemble() == code;
            self.reporter.status("identity", identical);
            result.checks.insert(
                "identity".to_string(),
                if identical { CheckStatus::Passed } else { CheckStatus::Failed },
            );
            if !identical {
                if self.config.strict {
                    return Err(HarnessError::identity(&ex.name));
                }
                hints.push(Hint {
                    example: format!("{}.{}", collection.name, ex.name),
                    message: "reassembled token text differs from input".to_string(),
                    artifact: Path::new(&collection.name)
                        .join(format!("{}.in.{}", ex.name, ex.extension)),
                    added_lines: 0,
                    removed_lines: 0,
                });
            }
        }

        let oversized = ex.size > self.config.max_size_to_highlight && !explicit;
        if self.config.no_highlighting {
            result.checks.insert("highlighting".to_string(), CheckStatus::Disabled);
        } else if oversized {
            result.checks.insert("highlighting".to_string(), CheckStatus::Skipped);
            self.reporter.skipped("highlighting");
        } else {
            renderer.highlight(
                Path::new("."),
                &collection.name,
                &ex.name,
                &outcome.tokens,
                &outcome.changed_lines,
                outcome.passed,
            )?;
            result.checks.insert("highlighting".to_string(), CheckStatus::Passed);
        }

        self.reporter.example_done();
        if let Some(issue) = &known {
            self.reporter.known_issue(issue);
        }
        Ok(result)
    }

    fn record_category(
        &self,
        name: &str,
        outcome: CategoryOutcome,
        result: &mut TestResult,
    ) -> Result<(), HarnessError> {
        match outcome {
            CategoryOutcome::Passed => {
                result.checks.insert(name.to_string(), CheckStatus::Passed);
                self.reporter.status(name, true);
                Ok(())
            }
            CategoryOutcome::Skipped => {
                result.checks.insert(name.to_string(), CheckStatus::Skipped);
                self.reporter.skipped(name);
                Ok(())
            }
            CategoryOutcome::Failed(failure) => {
                result.checks.insert(name.to_string(), CheckStatus::Failed);
                self.reporter.status(name, false);
                if self.config.strict {
                    return Err(failure.into());
                }
                // Advisory: robustness signal only, never a hint.
                result.probe_failures.push(format!(
                    "{}: size {} seed {}: {}",
                    failure.category, failure.size, failure.seed, failure.detail
                ));
                Ok(())
            }
        }
    }

    fn write_report(&self, root: &Path, summary: &RunSummary) -> Result<(), HarnessError> {
        let path = root.join("suite-report.json");
        let report = SuiteReport {
            passed: summary.passed(),
            elapsed_seconds: summary.elapsed.as_secs_f64(),
            results: &summary.results,
            hints: &summary.hints,
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| HarnessError::artifact_io(&path, io::Error::new(io::ErrorKind::InvalidData, e)))?;
        fs::write(&path, json).map_err(|e| HarnessError::artifact_io(&path, e))
    }

    fn report_verdict(&self, summary: &RunSummary) {
        self.reporter.line("");
        self.reporter.line(&format!(
            "{}{}{}",
            self.reporter.paint("Finished in ", Style::Green),
            self.reporter
                .paint(&format!("{:.2}s", summary.elapsed.as_secs_f64()), Style::White),
            self.reporter.paint(".", Style::Green),
        ));
        for hint in &summary.hints {
            self.reporter.line(&format!(
                "  {} {}: {} ({}{})",
                self.reporter.paint(&hint.example, Style::Cyan),
                self.reporter.paint(&hint.message, Style::Red),
                self.reporter.paint(&hint.artifact.display().to_string(), Style::White),
                self.reporter.paint(&"+".repeat(hint.added_lines), Style::Green),
                self.reporter.paint(&"-".repeat(hint.removed_lines), Style::Red),
            ));
        }
    }
}

/// Added/removed line counts from a persisted diff, for the compact hint
/// excerpt. Header lines do not count.
fn diff_line_counts(diff_path: &Path) -> (usize, usize) {
    let Ok(text) = fs::read_to_string(diff_path) else {
        return (0, 0);
    };
    let mut added = 0;
    let mut removed = 0;
    for line in text.lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            continue;
        } else if line.starts_with('+') {
            added += 1;
        } else if line.starts_with('-') {
            removed += 1;
        }
    }
    (added, removed)
}
