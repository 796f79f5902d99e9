//! HTTP client for single fetch attempts
//!
//! Provides a trait so the pipeline can run against the real network or a
//! scripted stand-in.

use super::policy::Attempt;
use crate::config::FetchConfig;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};
use ureq::tls::TlsConfig;
use ureq::Agent;

/// Abstract single-attempt fetcher
///
/// Implementations must be total: every failure is reported as an
/// [`Attempt`], never as a panic or error.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Perform one GET request against `url`
    async fn fetch(&self, url: &str) -> Attempt;
}

/// Blocking `ureq` agent driven from the tokio blocking pool
#[derive(Clone)]
pub struct HttpFetcher {
    agent: Agent,
    user_agent: String,
}

impl HttpFetcher {
    /// Build a fetcher with a fixed per-attempt timeout and client identity
    pub fn new(timeout: Duration, user_agent: impl Into<String>, accept_invalid_certs: bool) -> Self {
        let mut builder = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false);

        if accept_invalid_certs {
            warn!("TLS certificate verification is disabled (fetch.accept_invalid_certs = true)");
            builder = builder.tls_config(TlsConfig::builder().disable_verification(true).build());
        }

        Self {
            agent: Agent::new_with_config(builder.build()),
            user_agent: user_agent.into(),
        }
    }

    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(
            config.timeout(),
            config.user_agent.clone(),
            config.accept_invalid_certs,
        )
    }
}

/// Run one request to completion, including the full body read
fn get_blocking(agent: &Agent, user_agent: &str, url: &str) -> Attempt {
    let mut response = match agent.get(url).header("User-Agent", user_agent).call() {
        Ok(response) => response,
        Err(e) => return Attempt::Transport(e.to_string()),
    };

    let status = response.status().as_u16();
    if !(200..300).contains(&status) {
        return Attempt::Response {
            status,
            body: String::new(),
        };
    }

    match response.body_mut().read_to_vec() {
        Ok(bytes) => Attempt::Response {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        },
        Err(e) => Attempt::Transport(format!("reading body: {}", e)),
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Attempt {
        let agent = self.agent.clone();
        let user_agent = self.user_agent.clone();
        let owned_url = url.to_string();

        debug!("GET {}", url);
        tokio::task::spawn_blocking(move || get_blocking(&agent, &user_agent, &owned_url))
            .await
            .unwrap_or_else(|e| Attempt::Transport(format!("fetch task failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_host_is_a_transport_failure() {
        let fetcher = HttpFetcher::new(Duration::from_secs(2), "issn-probe-test", false);
        // Port 9 on localhost is the discard service; nothing listens there in CI.
        let attempt = fetcher.fetch("http://127.0.0.1:9/").await;
        assert!(matches!(attempt, Attempt::Transport(_)));
    }

    #[tokio::test]
    async fn malformed_url_is_a_transport_failure() {
        let fetcher = HttpFetcher::from_config(&FetchConfig::default());
        let attempt = fetcher.fetch("not a url").await;
        assert!(matches!(attempt, Attempt::Transport(_)));
    }
}
