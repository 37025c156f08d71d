pub mod config;
pub mod diff;
pub mod encode;
pub mod error;
pub mod example;
pub mod golden;
pub mod harness;
pub mod known_issue;
pub mod mutate;
pub mod probe;
pub mod render;
pub mod report;
pub mod scanner;

use std::path::Path;

pub use config::{Config, Selection};
pub use error::HarnessError;
pub use harness::{Harness, RunSummary};
pub use scanner::{Scanner, ScannerRegistry, TokenStream};

/// Run a suite with the built-in scanners and plain output. Library
/// entry point for embedding and tests; the CLI wires up its own
/// registry and reporter.
pub fn run_suite(suite_root: &Path, config: Config) -> Result<RunSummary, HarnessError> {
    let registry = ScannerRegistry::with_builtins();
    let reporter = report::Reporter::plain();
    Harness::new(config, &registry, &reporter).run(suite_root)
}
