//! Progress indicators with CI fallback

use super::context::UiContext;
use crate::pipeline::{MatchResult, Resolution};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Plain-mode progress line interval
const PLAIN_EVERY: u64 = 100;

/// A task spinner with CI fallback
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
}

impl TaskSpinner {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
        }
    }

    /// Start the spinner with a message
    pub fn start(&mut self, message: &str) {
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else {
            eprintln!("{} {}", style("...").dim(), message);
        }
    }

    /// Stop with success message
    pub fn stop(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        } else {
            eprintln!("{} {}", style("[OK]").green(), message);
        }
    }

    /// Stop with warning message
    pub fn stop_warn(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        } else {
            eprintln!("{} {}", style("[WARN]").yellow(), message);
        }
    }
}

/// Progress over a batch of targets.
///
/// Cheap to clone; all clones drive the same bar. Shows an indicatif bar
/// in interactive mode and a line every `PLAIN_EVERY` targets otherwise.
#[derive(Clone)]
pub struct BatchProgress {
    bar: Option<ProgressBar>,
    total: u64,
    done: Arc<AtomicU64>,
    failed: Arc<AtomicU64>,
}

impl BatchProgress {
    pub fn new(ctx: &UiContext, total: u64) -> Self {
        let bar = if ctx.use_fancy_output() {
            let bar = ProgressBar::new(total);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("  {spinner:.cyan} {bar:30.cyan/dim} {pos}/{len} {msg:.dim}  {elapsed:.dim} eta {eta:.dim}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                    .progress_chars("━╸─"),
            );
            bar.enable_steady_tick(std::time::Duration::from_millis(120));
            Some(bar)
        } else {
            println!("Processing {} targets...", total);
            None
        };

        Self {
            bar,
            total,
            done: Arc::new(AtomicU64::new(0)),
            failed: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record one resolved target
    pub fn on_result(&self, result: &MatchResult) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        let failed = if result.fetch_success {
            self.failed.load(Ordering::Relaxed)
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed) + 1
        };

        if let Some(ref bar) = self.bar {
            bar.set_position(done);
            bar.set_message(status_message(result, failed));
        } else if done % PLAIN_EVERY == 0 || done == self.total {
            println!("  {}/{} processed, {} without content", done, self.total, failed);
        }
    }

    /// Finish and clear the progress bar
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}

fn status_message(result: &MatchResult, failed: u64) -> String {
    let last = match result.resolution {
        Resolution::Cached => "cached",
        Resolution::Fetched => "fetched",
        Resolution::Failed { .. } => "failed",
        Resolution::Aborted => "aborted",
    };
    format!("{} {} ({} failed)", last, result.id, failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FailureKind;

    #[test]
    fn spinner_non_interactive() {
        let ctx = UiContext::non_interactive();
        let mut spinner = TaskSpinner::new(&ctx);
        spinner.start("Looking up...");
        spinner.stop("Done");
        // Should not panic
    }

    #[test]
    fn batch_progress_counts_across_clones() {
        let ctx = UiContext::non_interactive();
        let progress = BatchProgress::new(&ctx, 3);
        let clone = progress.clone();

        progress.on_result(&MatchResult::matched("a", true, false, Resolution::Fetched, 1));
        clone.on_result(&MatchResult::failed(
            "b",
            FailureKind::HttpStatus { status: 500 },
            3,
        ));
        progress.finish();

        assert_eq!(progress.done.load(Ordering::Relaxed), 2);
        assert_eq!(clone.failed.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn status_message_names_target() {
        let result = MatchResult::aborted("journal-x");
        assert_eq!(status_message(&result, 4), "aborted journal-x (4 failed)");
    }
}
