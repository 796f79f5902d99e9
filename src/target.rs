//! Units of work for the fetch pipeline

use serde::{Deserialize, Serialize};

/// One landing page to fetch and verify
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    id: String,
    url: String,
    expected_issns: Vec<String>,
    raw_issn: Option<String>,
}

impl Target {
    /// Create a target with no expected ISSNs
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            expected_issns: Vec::new(),
            raw_issn: None,
        }
    }

    /// Attach the validated, compact ISSNs the page should mention
    pub fn with_issns(mut self, issns: Vec<String>) -> Self {
        self.expected_issns = issns;
        self
    }

    /// Keep the ISSN field exactly as it appeared in the input
    pub fn with_raw_issn(mut self, raw: Option<String>) -> Self {
        self.raw_issn = raw;
        self
    }

    /// Stable identifier, also the cache key
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn expected_issns(&self) -> &[String] {
        &self.expected_issns
    }

    pub fn raw_issn(&self) -> Option<&str> {
        self.raw_issn.as_deref()
    }
}
