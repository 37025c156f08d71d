use std::path::PathBuf;
use thiserror::Error;

use crate::probe::{Category, ProbeFailure};

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("{category} probe failed at size {size} (seed {seed}): {detail}")]
    Probe {
        category: Category,
        size: usize,
        seed: u64,
        detail: String,
    },

    #[error("scanner returned unexpected output for '{example}' (see {})", .diff_path.display())]
    Mismatch { example: String, diff_path: PathBuf },

    #[error("identity check failed for '{example}': reassembled token text differs from input")]
    Identity { example: String },

    #[error("artifact I/O failed for {}: {source}", .path.display())]
    ArtifactIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("scanner error: {msg}")]
    Scanner { msg: String },

    #[error("configuration error: {msg}")]
    Config { msg: String },
}

impl HarnessError {
    pub fn mismatch(example: impl Into<String>, diff_path: impl Into<PathBuf>) -> Self {
        Self::Mismatch { example: example.into(), diff_path: diff_path.into() }
    }

    pub fn identity(example: impl Into<String>) -> Self {
        Self::Identity { example: example.into() }
    }

    pub fn artifact_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ArtifactIo { path: path.into(), source }
    }

    pub fn scanner(msg: impl Into<String>) -> Self {
        Self::Scanner { msg: msg.into() }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config { msg: msg.into() }
    }

    /// Whether this failure ends the current example but not the whole run.
    pub fn is_example_scoped(&self) -> bool {
        matches!(self, Self::ArtifactIo { .. } | Self::Scanner { .. })
    }
}

impl From<ProbeFailure> for HarnessError {
    fn from(failure: ProbeFailure) -> Self {
        Self::Probe {
            category: failure.category,
            size: failure.size,
            seed: failure.seed,
            detail: failure.detail,
        }
    }
}
