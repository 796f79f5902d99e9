//! Batch fetch pipeline
//!
//! Fans a work list out over a fixed pool of workers. Each target goes
//! through cache lookup, a retrying fetch on miss, and content matching,
//! and yields exactly one [`MatchResult`]. A hard ban from any host stops
//! new requests for the rest of the run; targets that still need the
//! network are then reported as aborted.

pub mod coordinator;
pub mod report;

pub use coordinator::{Pipeline, PipelineOptions, ProgressFn};
pub use report::{MatchResult, Report, Resolution, Summary};
