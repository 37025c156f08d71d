//! Run configuration.
//!
//! Every recognized option is a named field on an immutable value handed to
//! the harness; nothing is read from the environment.

use crate::error::HarnessError;

/// A collection (and optionally a single example) to act on, written
/// `lang`, `lang.*` or `lang.name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub collection: String,
    pub example: Option<String>,
}

impl Selection {
    pub fn parse(spec: &str) -> Result<Self, HarnessError> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(HarnessError::config("empty selection"));
        }
        let (collection, example) = match spec.split_once('.') {
            None => (spec, None),
            Some((collection, "*")) | Some((collection, "")) => (collection, None),
            Some((collection, example)) => (collection, Some(example.to_string())),
        };
        if collection.is_empty() {
            return Err(HarnessError::config(format!("selection '{spec}' names no collection")));
        }
        Ok(Self { collection: collection.to_string(), example })
    }

    pub fn matches_collection(&self, collection: &str) -> bool {
        self.collection == collection
    }

    pub fn matches_example(&self, collection: &str, example: &str) -> bool {
        self.matches_collection(collection)
            && match &self.example {
                None => true,
                Some(name) => name == example,
            }
    }

    /// Whether exactly this example was asked for by name.
    pub fn is_explicit(&self, collection: &str, example: &str) -> bool {
        self.matches_collection(collection) && self.example.as_deref() == Some(example)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Upper bound for fuzz buffer sizes, inclusive.
    pub max: usize,
    /// Abort the run on the first failure instead of aggregating hints.
    pub strict: bool,
    pub no_random: bool,
    pub no_incremental: bool,
    pub no_shuffled: bool,
    pub no_identity: bool,
    pub no_highlighting: bool,
    /// Evaluate only the matching collection/example.
    pub only: Option<Selection>,
    /// Accept current output as the new baseline for the matching selection.
    pub accept: Option<Selection>,
    /// Examples larger than this are skipped unless explicitly selected.
    pub max_size_to_test: u64,
    /// Examples larger than this skip highlighting unless explicitly selected.
    pub max_size_to_highlight: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max: 256,
            strict: false,
            no_random: false,
            no_incremental: false,
            no_shuffled: false,
            no_identity: false,
            no_highlighting: false,
            only: None,
            accept: None,
            max_size_to_test: 10_000_000,
            max_size_to_highlight: 10_000_000,
        }
    }
}

impl Config {
    /// Small sizes for quick local iteration.
    pub fn fast() -> Self {
        Self {
            max: 16,
            max_size_to_test: 1_000_000,
            max_size_to_highlight: 5_000_000,
            ..Self::default()
        }
    }

    /// Exhaustive sizes for release qualification.
    pub fn deluxe() -> Self {
        Self {
            max: 4096,
            max_size_to_test: 500_000_000,
            max_size_to_highlight: 500_000_000,
            ..Self::default()
        }
    }
}
