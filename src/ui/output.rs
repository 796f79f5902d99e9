//! Step and summary lines for command output

use super::context::UiContext;
use crate::pipeline::Summary;
use console::{style, StyledObject};
use std::path::Path;

/// Outcome marker shared by step, outro and key-value lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Ok,
    Warn,
}

impl Mark {
    fn from_ok(ok: bool) -> Self {
        if ok {
            Self::Ok
        } else {
            Self::Warn
        }
    }

    fn tag(self) -> StyledObject<&'static str> {
        match self {
            Self::Ok => style("[OK]").green(),
            Self::Warn => style("[WARN]").yellow(),
        }
    }

    fn paint<D>(self, value: D) -> StyledObject<D> {
        match self {
            Self::Ok => style(value).green(),
            Self::Warn => style(value).yellow(),
        }
    }
}

fn step(ctx: &UiContext, mark: Mark, line: String) {
    if ctx.use_fancy_output() {
        match mark {
            Mark::Ok => cliclack::log::success(line).ok(),
            Mark::Warn => cliclack::log::warning(line).ok(),
        };
    } else {
        println!("  {} {}", mark.tag(), line);
    }
}

/// Command banner
pub fn intro(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        cliclack::intro(style(title).cyan().bold()).ok();
    } else {
        println!("{}", style(title).cyan().bold());
        println!();
    }
}

/// Closing line; `ok = false` renders it as a warning
pub fn outro(ctx: &UiContext, ok: bool, message: &str) {
    let mark = Mark::from_ok(ok);
    if ctx.use_fancy_output() {
        cliclack::outro(mark.paint(message).bold()).ok();
    } else {
        println!();
        println!("{} {}", mark.tag(), message);
    }
}

pub fn step_ok(ctx: &UiContext, message: &str) {
    step(ctx, Mark::Ok, message.to_string());
}

/// Success line naming the file it read or wrote
pub fn step_file(ctx: &UiContext, message: &str, path: &Path) {
    let line = if ctx.use_fancy_output() {
        format!("{} ({})", message, style(path.display()).dim())
    } else {
        format!("{} ({})", message, path.display())
    };
    step(ctx, Mark::Ok, line);
}

/// Warning line with an optional follow-up hint
pub fn step_warn(ctx: &UiContext, message: &str, hint: Option<&str>) {
    let line = match hint {
        Some(hint) if ctx.use_fancy_output() => format!("{} - {}", message, style(hint).dim()),
        Some(hint) => format!("{} - {}", message, hint),
        None => message.to_string(),
    };
    step(ctx, Mark::Warn, line);
}

pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), value);
    } else {
        println!("  {}: {}", key, value);
    }
}

/// Key-value line colored by whether the value is healthy
pub fn key_value_status(ctx: &UiContext, key: &str, value: &str, ok: bool) {
    let mark = Mark::from_ok(ok);
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), mark.paint(value));
    } else {
        println!("  {} {}: {}", mark.tag(), key, value);
    }
}

/// Per-resolution counts of a finished match run
pub fn run_summary(ctx: &UiContext, summary: &Summary, elapsed_secs: f64) {
    key_value(ctx, "Targets", &summary.total.to_string());
    key_value(ctx, "Fetched", &summary.fetched.to_string());
    key_value(ctx, "From cache", &summary.cached.to_string());
    key_value_status(ctx, "Failed", &summary.failed.to_string(), summary.failed == 0);
    key_value_status(ctx, "Aborted", &summary.aborted.to_string(), summary.aborted == 0);
    key_value(ctx, "ISSN found", &summary.identity_matches.to_string());
    key_value(ctx, "Platform found", &summary.platform_matches.to_string());
    key_value(ctx, "Elapsed", &format!("{:.1}s", elapsed_secs));
}
