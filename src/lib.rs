//! issn-probe - Verify journal ISSNs against their landing pages
//!
//! Fetches journal landing pages through a bounded worker pool with
//! retries, a shared ban signal and an on-disk page cache, then checks
//! each page for the journal's ISSN and its publishing platform.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod issn;
pub mod matcher;
pub mod pipeline;
pub mod records;
pub mod registry;
pub mod target;
pub mod ui;

pub use error::{ProbeError, ProbeResult};
