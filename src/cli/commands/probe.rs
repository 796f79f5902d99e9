//! Match command - fetch landing pages and check them against the records

use crate::cache::PageCache;
use crate::cli::args::MatchArgs;
use crate::config::{Config, ConfigManager};
use crate::error::{ProbeError, ProbeResult};
use crate::fetch::{HttpFetcher, RetryPolicy};
use crate::matcher::TargetMatcher;
use crate::pipeline::{Pipeline, PipelineOptions, Report, Resolution};
use crate::records::RecordBatch;
use crate::target::Target;
use crate::ui::{self, BatchProgress, UiContext};
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

/// Execute the match command
pub async fn execute(args: MatchArgs, config: &Config) -> ProbeResult<()> {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "issn-probe match");

    let batch = RecordBatch::read(&args.input)?;
    ui::step_file(&ctx, &format!("Loaded {} records", batch.len()), &args.input);

    let mut fetch = config.fetch.clone();
    if let Some(concurrency) = args.concurrency {
        fetch.concurrency = concurrency;
    }
    if args.no_shuffle {
        fetch.shuffle = false;
    }
    if fetch.concurrency == 0 {
        return Err(ProbeError::config_value(
            "fetch.concurrency",
            "must be at least 1",
        ));
    }

    let cache = PageCache::open(ConfigManager::cache_dir(config)).await?;
    debug!("Page cache at {}", cache.root().display());

    let progress = BatchProgress::new(&ctx, batch.len() as u64);
    let on_result = progress.clone();
    let pipeline = Pipeline::new(
        Arc::new(HttpFetcher::from_config(&fetch)),
        cache,
        RetryPolicy::from_fetch_config(&fetch),
        TargetMatcher::new(config.matcher.platform_signature.clone()),
        PipelineOptions::from_config(&fetch),
    )
    .with_progress(Arc::new(move |result| on_result.on_result(result)));

    let report = pipeline.run(batch.targets().to_vec()).await;
    progress.finish();
    let report = report?;

    batch.write_enriched(&args.output, &report)?;
    ui::step_file(&ctx, "Results written", &args.output);

    if let Some(ref path) = args.failures {
        let written = write_failure_log(path, &batch, &report).await?;
        ui::step_file(&ctx, &format!("Logged {} failures", written), path);
    }

    let elapsed = report.finished_at() - report.started_at();
    ui::run_summary(&ctx, &report.summary(), elapsed.num_milliseconds() as f64 / 1000.0);

    if report.banned() {
        ui::outro(
            &ctx,
            false,
            "Run halted early: a host refused further requests. Unstarted targets are marked aborted.",
        );
    } else {
        ui::outro(&ctx, true, "Done");
    }

    Ok(())
}

/// Write one JSON line per target without content. Returns the line count.
async fn write_failure_log(path: &Path, batch: &RecordBatch, report: &Report) -> ProbeResult<usize> {
    let targets: HashMap<&str, &Target> = batch.targets().iter().map(|t| (t.id(), t)).collect();
    let logged_at = Utc::now().to_rfc3339();

    let mut out = String::new();
    let failures = report.failures();
    for result in &failures {
        let detail = match result.resolution {
            Resolution::Failed { ref failure } => Some(failure.to_string()),
            _ => None,
        };
        let target = targets.get(result.id.as_str());
        let line = json!({
            "id": result.id,
            "url": target.map(|t| t.url()),
            "issn": target.and_then(|t| t.raw_issn()),
            "status": result.resolution.label(),
            "detail": detail,
            "attempts": result.attempts,
            "logged_at": logged_at,
        });
        out.push_str(&serde_json::to_string(&line)?);
        out.push('\n');
    }

    fs::write(path, out)
        .await
        .map_err(|e| ProbeError::io(format!("writing {}", path.display()), e))?;
    info!("Wrote {} failure records to {}", failures.len(), path.display());
    Ok(failures.len())
}
