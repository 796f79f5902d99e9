//! Content checks for fetched landing pages
//!
//! Plain text scans over the raw payload. No HTML parsing and no
//! normalization beyond what the HTTP layer already decoded.

use regex::{Regex, RegexBuilder};
use tracing::debug;

/// Matches one ISSN in compact or hyphenated form.
///
/// `12345678` matches `12345678`, `1234-5678`, `1234 5678` and the
/// typographic dashes some templates emit. A trailing `X` check digit is
/// case-insensitive.
fn issn_pattern(compact: &str) -> Option<Regex> {
    if compact.len() != 8 || !compact.is_ascii() {
        return None;
    }
    let (head, tail) = compact.split_at(4);
    let pattern = format!(
        r"{}[\s\-\x{{2010}}\x{{2011}}\x{{2012}}\x{{2013}}]?{}",
        regex::escape(head),
        regex::escape(tail)
    );
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .ok()
}

/// True iff any expected ISSN appears in the content
pub fn match_identity(content: Option<&str>, expected: &[String]) -> bool {
    let Some(content) = content else {
        return false;
    };

    expected.iter().any(|issn| match issn_pattern(issn) {
        Some(re) => re.is_match(content),
        None => {
            debug!("Falling back to verbatim search for malformed ISSN {:?}", issn);
            !issn.is_empty() && content.contains(issn.as_str())
        }
    })
}

/// True iff the platform signature appears verbatim in the content
pub fn match_platform(content: Option<&str>, signature: &str) -> bool {
    match content {
        Some(content) if !signature.is_empty() => content.contains(signature),
        _ => false,
    }
}

/// Both checks bundled with their configuration
#[derive(Debug, Clone)]
pub struct TargetMatcher {
    platform_signature: String,
}

impl TargetMatcher {
    pub fn new(platform_signature: impl Into<String>) -> Self {
        Self {
            platform_signature: platform_signature.into(),
        }
    }

    /// Returns `(identity_match, platform_match)`
    pub fn check(&self, content: Option<&str>, expected: &[String]) -> (bool, bool) {
        (
            match_identity(content, expected),
            match_platform(content, &self.platform_signature),
        )
    }
}

impl Default for TargetMatcher {
    fn default() -> Self {
        Self::new("Open Journal Systems")
    }
}
