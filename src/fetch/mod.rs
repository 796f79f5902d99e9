//! Network retrieval with retries
//!
//! A [`Fetcher`] performs exactly one request. [`fetch_with_retry`] drives it
//! under a [`RetryPolicy`] and honours the run-wide [`BanSignal`].

pub mod ban;
pub mod client;
pub mod policy;
pub mod retry;

pub use ban::BanSignal;
pub use client::{Fetcher, HttpFetcher};
pub use policy::{Attempt, FailureKind, RetryPolicy, Verdict};
pub use retry::{fetch_with_retry, FetchOutcome};
