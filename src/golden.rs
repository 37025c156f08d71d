//! Golden comparison: a complete tokenize+encode run checked against the
//! stored baseline, with diff artifacts persisted on mismatch.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::diff;
use crate::encode::DebugEncoder;
use crate::error::HarnessError;
use crate::render::Renderer;
use crate::report::Reporter;
use crate::scanner::{Scanner, TokenStream};

/// Scan/encode wall-clock times, for throughput reporting only.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timings {
    pub scan: Duration,
    pub encode: Duration,
    pub direct: Duration,
}

pub struct CompleteOutcome {
    pub tokens: TokenStream,
    pub passed: bool,
    pub new_baseline: bool,
    pub changed_lines: Vec<Range<usize>>,
    pub diff_path: Option<PathBuf>,
    pub timings: Timings,
}

pub struct GoldenComparator<'a> {
    encoder: &'a DebugEncoder,
    renderer: &'a Renderer<'a>,
    reporter: &'a Reporter,
}

impl<'a> GoldenComparator<'a> {
    pub fn new(
        encoder: &'a DebugEncoder,
        renderer: &'a Renderer<'a>,
        reporter: &'a Reporter,
    ) -> Self {
        Self { encoder, renderer, reporter }
    }

    /// Run the complete pipeline for one example. `accept` forces the
    /// current output to become the new baseline.
    pub fn compare(
        &self,
        scanner: &dyn Scanner,
        dir: &Path,
        name: &str,
        code: &str,
        accept: bool,
    ) -> Result<CompleteOutcome, HarnessError> {
        let mut timings = Timings::default();

        let started = Instant::now();
        let tokens = scanner
            .scan(code)
            .map_err(|e| HarnessError::scanner(format!("'{name}': {e}")))?;
        timings.scan = started.elapsed();

        let started = Instant::now();
        let result = self.encoder.encode_tokens(&tokens);
        timings.encode = started.elapsed();

        // Second, independent path over the same transform. Compared runs
        // always use `result`; this one only feeds the throughput report.
        let started = Instant::now();
        let _ = self
            .encoder
            .encode_source(scanner, code)
            .map_err(|e| HarnessError::scanner(format!("'{name}': {e}")))?;
        timings.direct = started.elapsed();

        let extension = self.encoder.file_extension();
        let expected_path = dir.join(format!("{name}.expected.{extension}"));

        if !expected_path.exists() || accept {
            fs::write(&expected_path, &result)
                .map_err(|e| HarnessError::artifact_io(&expected_path, e))?;
            return Ok(CompleteOutcome {
                tokens,
                passed: true,
                new_baseline: true,
                changed_lines: Vec::new(),
                diff_path: None,
                timings,
            });
        }

        let expected = fs::read(&expected_path)
            .map_err(|e| HarnessError::artifact_io(&expected_path, e))?;
        if encodings_match(&expected, result.as_bytes()) {
            return Ok(CompleteOutcome {
                tokens,
                passed: true,
                new_baseline: false,
                changed_lines: Vec::new(),
                diff_path: None,
                timings,
            });
        }

        let actual_path = dir.join(format!("{name}.actual.{extension}"));
        fs::write(&actual_path, &result)
            .map_err(|e| HarnessError::artifact_io(&actual_path, e))?;

        let expected_text = String::from_utf8_lossy(&expected);
        let diff_text = diff::unified_diff(
            &expected_text,
            &result,
            &format!("{name}.expected.{extension}"),
            &format!("{name}.actual.{extension}"),
        );
        let diff_path = dir.join(format!("{name}.debug.diff"));
        fs::write(&diff_path, &diff_text)
            .map_err(|e| HarnessError::artifact_io(&diff_path, e))?;
        let changed_lines = diff::changed_lines(&diff_text);

        {
            // Nested render: quiet the reporter so its progress does not
            // interleave into the current example's line.
            let _quiet = self.reporter.quiet();
            let title = format!("{name}: differences from expected output");
            let page = self.renderer.diff_document(&diff_text, &title)?;
            let html_path = dir.join(format!("{name}.debug.diff.html"));
            fs::write(&html_path, page)
                .map_err(|e| HarnessError::artifact_io(&html_path, e))?;
        }

        Ok(CompleteOutcome {
            tokens,
            passed: false,
            new_baseline: false,
            changed_lines,
            diff_path: Some(diff_path),
            timings,
        })
    }
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(b"\xef\xbb\xbf".as_slice()).unwrap_or(bytes)
}

/// Exact equality, or equality once a leading UTF-8 BOM is ignored on
/// either side. A BOM-only difference is an encoding tag, not content.
fn encodings_match(expected: &[u8], actual: &[u8]) -> bool {
    expected == actual || strip_bom(expected) == strip_bom(actual)
}
