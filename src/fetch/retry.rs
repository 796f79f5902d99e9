//! Retrying fetch driver

use super::ban::BanSignal;
use super::client::Fetcher;
use super::policy::{FailureKind, RetryPolicy, Verdict};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Final result of fetching one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Page content; present iff the fetch succeeded
    pub content: Option<String>,
    /// Failure classification; present iff the fetch failed
    pub failure: Option<FailureKind>,
    /// Network attempts actually issued
    pub attempts: u32,
}

impl FetchOutcome {
    pub fn success(content: String, attempts: u32) -> Self {
        Self {
            content: Some(content),
            failure: None,
            attempts,
        }
    }

    pub fn failure(kind: FailureKind, attempts: u32) -> Self {
        Self {
            content: None,
            failure: Some(kind),
            attempts,
        }
    }

    pub fn is_success(&self) -> bool {
        self.content.is_some()
    }
}

/// Per-target retry bookkeeping; dropped once the target resolves
#[derive(Debug, Default)]
struct RetryState {
    attempts: u32,
    waited: Duration,
    /// Outcome of the latest retryable attempt
    last: Option<String>,
}

/// Fetch `url` until the policy resolves it.
///
/// No attempt is started once `ban` is raised. A target with no attempts
/// yet resolves as [`FailureKind::Aborted`]; one already retrying resolves
/// as [`FailureKind::Halted`] with its last outcome. A ban status raises
/// `ban` itself.
pub async fn fetch_with_retry(
    fetcher: &dyn Fetcher,
    policy: &RetryPolicy,
    url: &str,
    ban: &BanSignal,
) -> FetchOutcome {
    let mut state = RetryState::default();

    loop {
        if ban.is_raised() {
            debug!("Skipping {} after {} attempt(s): run halted", url, state.attempts);
            let kind = match state.last.take() {
                Some(last) => FailureKind::Halted { last },
                None => FailureKind::Aborted,
            };
            return FetchOutcome::failure(kind, state.attempts);
        }

        state.attempts += 1;
        let attempt = fetcher.fetch(url).await;

        match policy.classify(&attempt, state.attempts) {
            Verdict::Succeed => {
                debug!(
                    "Fetched {} in {} attempt(s), {:?} in backoff",
                    url, state.attempts, state.waited
                );
                let content = attempt.into_body().unwrap_or_default();
                return FetchOutcome::success(content, state.attempts);
            }
            Verdict::RetryAfter(delay) => {
                debug!(
                    "Attempt {}/{} for {} failed, retrying in {:?}",
                    state.attempts,
                    policy.max_attempts(),
                    url,
                    delay
                );
                state.waited += delay;
                state.last = Some(attempt.describe());
                tokio::time::sleep(delay).await;
            }
            Verdict::Fail(kind) => {
                warn!("Giving up on {}: {}", url, kind);
                return FetchOutcome::failure(kind, state.attempts);
            }
            Verdict::Ban(status) => {
                if ban.raise() {
                    error!("Got HTTP {} from {}; halting new requests", status, url);
                }
                return FetchOutcome::failure(FailureKind::Banned { status }, state.attempts);
            }
        }
    }
}
