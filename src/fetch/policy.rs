//! Retry policy: backoff schedule and outcome classification

use crate::config::{FetchConfig, RegistryConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

/// Result of a single network attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    /// The server answered. `body` is only populated for 2xx responses.
    Response { status: u16, body: String },
    /// Connect, TLS, timeout or body read failure
    Transport(String),
}

impl Attempt {
    /// Take the response body, if the server answered
    pub fn into_body(self) -> Option<String> {
        match self {
            Self::Response { body, .. } => Some(body),
            Self::Transport(_) => None,
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Response { status, .. } => format!("HTTP {}", status),
            Self::Transport(reason) => reason.clone(),
        }
    }
}

/// Why a target could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureKind {
    /// Every attempt in the budget hit a retryable condition
    RetriesExhausted { last: String },
    /// Non-retryable, non-success status
    HttpStatus { status: u16 },
    /// The remote side answered with the ban status
    Banned { status: u16 },
    /// Started, but a ban elsewhere stopped further retries
    Halted { last: String },
    /// Not attempted because the run was halted by a ban
    Aborted,
    /// The worker processing the target failed unexpectedly
    Internal { reason: String },
}

impl FailureKind {
    /// Short machine-readable label used in reports
    pub fn label(&self) -> String {
        match self {
            Self::RetriesExhausted { .. } => "retries_exhausted".to_string(),
            Self::HttpStatus { status } => format!("http_{}", status),
            Self::Banned { .. } => "banned".to_string(),
            Self::Halted { .. } => "halted".to_string(),
            Self::Aborted => "aborted".to_string(),
            Self::Internal { .. } => "internal".to_string(),
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetriesExhausted { last } => write!(f, "retries exhausted (last: {})", last),
            Self::HttpStatus { status } => write!(f, "HTTP {}", status),
            Self::Banned { status } => write!(f, "banned (HTTP {})", status),
            Self::Halted { last } => write!(f, "retries halted by ban (last: {})", last),
            Self::Aborted => write!(f, "aborted after ban"),
            Self::Internal { reason } => write!(f, "internal error: {}", reason),
        }
    }
}

/// What to do after an attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Succeed,
    RetryAfter(Duration),
    Fail(FailureKind),
    /// Terminal for this target, and halts new work for the whole run
    Ban(u16),
}

/// Backoff schedule plus status classification
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base: Duration,
    multiplier: f64,
    max_backoff: Duration,
    retryable: BTreeSet<u16>,
    ban_status: u16,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base: Duration, multiplier: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base,
            multiplier: multiplier.max(1.0),
            max_backoff: Duration::from_secs(30),
            retryable: [429, 500, 502, 503, 504].into_iter().collect(),
            ban_status: 403,
        }
    }

    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = max_backoff;
        self
    }

    pub fn with_retryable(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.retryable = statuses.into_iter().collect();
        self
    }

    pub fn with_ban_status(mut self, status: u16) -> Self {
        self.ban_status = status;
        self
    }

    /// Policy for landing page fetches
    pub fn from_fetch_config(config: &FetchConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.backoff_base_ms),
            config.backoff_multiplier,
        )
        .with_max_backoff(Duration::from_millis(config.max_backoff_ms))
        .with_retryable(config.retryable_statuses.iter().copied())
        .with_ban_status(config.ban_status)
    }

    /// Policy for registry lookups
    pub fn from_registry_config(config: &RegistryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.backoff_base_ms),
            config.backoff_multiplier,
        )
        .with_max_backoff(Duration::from_secs(120))
        .with_ban_status(config.ban_status)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay after the given (1-based) failed attempt
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(63) as i32;
        let millis = self.base.as_millis() as f64 * self.multiplier.powi(exp);
        let capped = millis.min(self.max_backoff.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }

    /// Classify the outcome of the given (1-based) attempt
    pub fn classify(&self, attempt: &Attempt, attempt_no: u32) -> Verdict {
        let retryable = match attempt {
            Attempt::Response { status, .. } if (200..300).contains(status) => {
                return Verdict::Succeed;
            }
            Attempt::Response { status, .. } if *status == self.ban_status => {
                return Verdict::Ban(*status);
            }
            Attempt::Response { status, .. } => self.retryable.contains(status),
            Attempt::Transport(_) => true,
        };

        if !retryable {
            if let Attempt::Response { status, .. } = attempt {
                return Verdict::Fail(FailureKind::HttpStatus { status: *status });
            }
        }

        if attempt_no >= self.max_attempts {
            return Verdict::Fail(FailureKind::RetriesExhausted {
                last: attempt.describe(),
            });
        }

        Verdict::RetryAfter(self.backoff(attempt_no))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_fetch_config(&FetchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> Attempt {
        Attempt::Response {
            status: code,
            body: String::new(),
        }
    }

    fn policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(100), 2.0)
    }

    #[test]
    fn success_statuses() {
        assert_eq!(policy().classify(&status(200), 1), Verdict::Succeed);
        assert_eq!(policy().classify(&status(204), 3), Verdict::Succeed);
    }

    #[test]
    fn retryable_status_backs_off_exponentially() {
        let p = policy();
        assert_eq!(
            p.classify(&status(503), 1),
            Verdict::RetryAfter(Duration::from_millis(100))
        );
        assert_eq!(
            p.classify(&status(429), 2),
            Verdict::RetryAfter(Duration::from_millis(200))
        );
    }

    #[test]
    fn retryable_status_exhausts_budget() {
        match policy().classify(&status(503), 3) {
            Verdict::Fail(FailureKind::RetriesExhausted { last }) => assert_eq!(last, "HTTP 503"),
            other => panic!("unexpected verdict: {other:?}"),
        }
    }

    #[test]
    fn ban_status_is_immediate() {
        assert_eq!(policy().classify(&status(403), 1), Verdict::Ban(403));
    }

    #[test]
    fn other_statuses_fail_without_retry() {
        assert_eq!(
            policy().classify(&status(404), 1),
            Verdict::Fail(FailureKind::HttpStatus { status: 404 })
        );
    }

    #[test]
    fn transport_errors_are_retryable() {
        let attempt = Attempt::Transport("timed out".to_string());
        assert!(matches!(
            policy().classify(&attempt, 1),
            Verdict::RetryAfter(_)
        ));
        assert!(matches!(
            policy().classify(&attempt, 3),
            Verdict::Fail(FailureKind::RetriesExhausted { .. })
        ));
    }

    #[test]
    fn backoff_is_capped() {
        let p = policy().with_max_backoff(Duration::from_millis(250));
        assert_eq!(p.backoff(1), Duration::from_millis(100));
        assert_eq!(p.backoff(3), Duration::from_millis(250));
        assert_eq!(p.backoff(200), Duration::from_millis(250));
    }

    #[test]
    fn custom_retryable_set() {
        let p = policy().with_retryable([500]);
        assert_eq!(
            p.classify(&status(503), 1),
            Verdict::Fail(FailureKind::HttpStatus { status: 503 })
        );
    }

    #[test]
    fn failure_labels() {
        assert_eq!(FailureKind::HttpStatus { status: 404 }.label(), "http_404");
        assert_eq!(FailureKind::Aborted.label(), "aborted");
        let halted = FailureKind::Halted {
            last: "HTTP 503".to_string(),
        };
        assert_eq!(halted.label(), "halted");
        assert_eq!(halted.to_string(), "retries halted by ban (last: HTTP 503)");
    }
}
