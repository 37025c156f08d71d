//! Pre-registered discrepancy records.
//!
//! A `<name>.known-issue.toml` file next to an example downgrades a golden
//! mismatch from hard failure to annotated known issue, except in strict
//! mode where every mismatch fails.

use std::io;
use std::path::Path;

use serde::Deserialize;

use crate::error::HarnessError;

#[derive(Debug, Clone, Deserialize)]
pub struct KnownIssue {
    pub description: String,
    #[serde(default)]
    pub ticket_url: Option<String>,
}

impl KnownIssue {
    /// Load the record for `name` from `dir`, if one exists.
    pub fn load(dir: &Path, name: &str) -> Result<Option<KnownIssue>, HarnessError> {
        let path = dir.join(format!("{name}.known-issue.toml"));
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path)
            .map_err(|e| HarnessError::artifact_io(&path, e))?;
        let issue: KnownIssue = toml::from_str(&text).map_err(|e| {
            HarnessError::artifact_io(&path, io::Error::new(io::ErrorKind::InvalidData, e))
        })?;
        Ok(Some(issue))
    }

    /// Ticket reference extracted from the trailing number of the URL,
    /// e.g. `https://tracker/issues/123` yields `#123`.
    pub fn ticket_ref(&self) -> Option<String> {
        let url = self.ticket_url.as_deref()?;
        let tail = url.trim_end_matches('/').rsplit('/').next()?;
        let digits: String = tail
            .chars()
            .rev()
            .take_while(|c| c.is_ascii_digit())
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        if digits.is_empty() {
            None
        } else {
            Some(format!("#{digits}"))
        }
    }
}
