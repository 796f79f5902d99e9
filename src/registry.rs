//! ISSN registry lookups
//!
//! Sequential, one request flow per ISSN, sharing the retry policy
//! machinery with the page pipeline. A ban from the registry stops all
//! further lookups; the remaining ISSNs are reported as skipped.

use crate::config::RegistryConfig;
use crate::fetch::{fetch_with_retry, BanSignal, FailureKind, Fetcher, HttpFetcher, RetryPolicy};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Text the registry serves (with a 2xx) for numbers it does not know
pub const NOT_REGISTERED_MARKER: &str =
    "The requested numbers do not correspond to valid ISSNs";

/// Outcome of looking up a single ISSN
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryOutcome {
    /// Structured record returned by the registry
    Record(Value),
    /// The registry does not know this ISSN
    NotRegistered,
    /// 2xx response that was neither JSON nor the not-registered page
    Undecodable,
    /// The registry blocked us
    Banned(u16),
    /// Gave up after retries or on a non-retryable status
    Failed(FailureKind),
    /// Not looked up because an earlier lookup was banned
    Skipped,
}

impl RegistryOutcome {
    /// JSON form used in the lookup output file
    pub fn to_json(&self) -> Value {
        match self {
            Self::Record(value) => value.clone(),
            Self::NotRegistered => json!({ "outcome": "not_registered" }),
            Self::Undecodable => json!({ "outcome": "undecodable" }),
            Self::Banned(status) => json!({ "outcome": "banned", "status": status }),
            Self::Failed(kind) => json!({ "outcome": kind.label(), "detail": kind.to_string() }),
            Self::Skipped => json!({ "outcome": "skipped" }),
        }
    }
}

/// Results of a lookup batch, keyed by ISSN
#[derive(Debug, Clone, Default)]
pub struct RegistryReport {
    pub outcomes: BTreeMap<String, RegistryOutcome>,
    pub banned: bool,
}

impl RegistryReport {
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.outcomes
                .iter()
                .map(|(issn, outcome)| (issn.clone(), outcome.to_json()))
                .collect(),
        )
    }

    pub fn records(&self) -> usize {
        self.outcomes
            .values()
            .filter(|o| matches!(o, RegistryOutcome::Record(_)))
            .count()
    }
}

/// Client for the ISSN registry
pub struct RegistryClient {
    fetcher: Arc<dyn Fetcher>,
    policy: RetryPolicy,
    base_url: String,
}

impl RegistryClient {
    pub fn new(fetcher: Arc<dyn Fetcher>, policy: RetryPolicy, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            policy,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// HTTP client with certificate verification enabled
    pub fn from_config(config: &RegistryConfig, user_agent: &str) -> Self {
        let fetcher = HttpFetcher::new(
            std::time::Duration::from_secs(config.timeout_secs),
            user_agent,
            false,
        );
        Self::new(
            Arc::new(fetcher),
            RetryPolicy::from_registry_config(config),
            config.base_url.clone(),
        )
    }

    pub fn lookup_url(&self, issn: &str) -> String {
        format!("{}/resource/ISSN/{}?format=json", self.base_url, crate::issn::format(issn))
    }

    /// Look up one ISSN
    pub async fn lookup(&self, issn: &str, ban: &BanSignal) -> RegistryOutcome {
        let url = self.lookup_url(issn);
        let outcome = fetch_with_retry(&*self.fetcher, &self.policy, &url, ban).await;

        if let Some(body) = outcome.content {
            return match serde_json::from_str::<Value>(&body) {
                Ok(value) => RegistryOutcome::Record(value),
                Err(_) if body.contains(NOT_REGISTERED_MARKER) => RegistryOutcome::NotRegistered,
                Err(e) => {
                    warn!("Registry answer for {} is not JSON: {}", issn, e);
                    RegistryOutcome::Undecodable
                }
            };
        }

        match outcome.failure {
            Some(FailureKind::Banned { status }) => RegistryOutcome::Banned(status),
            Some(FailureKind::Aborted) => RegistryOutcome::Skipped,
            Some(kind) => {
                warn!("Registry lookup for {} failed: {}", issn, kind);
                RegistryOutcome::Failed(kind)
            }
            None => RegistryOutcome::Failed(FailureKind::Internal {
                reason: "lookup produced neither content nor failure".to_string(),
            }),
        }
    }

    /// Look up each ISSN in order, stopping at the first ban
    pub async fn lookup_all(&self, issns: &[String]) -> RegistryReport {
        let ban = BanSignal::new();
        let mut report = RegistryReport::default();

        for issn in issns {
            if report.outcomes.contains_key(issn) {
                continue;
            }
            let outcome = if ban.is_raised() {
                RegistryOutcome::Skipped
            } else {
                debug!("Looking up {}", issn);
                self.lookup(issn, &ban).await
            };
            report.outcomes.insert(issn.clone(), outcome);
        }

        report.banned = ban.is_raised();
        if report.banned {
            error!("Registry refused further requests; stopped looking up");
        }
        info!(
            "Registry lookups: {} records out of {} ISSNs",
            report.records(),
            report.outcomes.len()
        );
        report
    }
}
