//! UI module for consistent CLI output
//!
//! Uses `cliclack` for interactive output and an `indicatif` bar for batch
//! progress, with automatic fallback to plain lines in CI/non-interactive
//! environments.

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{
    intro, key_value, key_value_status, outro, run_summary, step_file, step_ok, step_warn,
};
pub use progress::{BatchProgress, TaskSpinner};
