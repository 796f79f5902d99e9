//! Bounded worker pool that resolves every target exactly once

use super::report::{MatchResult, Report, Resolution};
use crate::cache::PageCache;
use crate::config::FetchConfig;
use crate::error::{ProbeError, ProbeResult};
use crate::fetch::{fetch_with_retry, BanSignal, FailureKind, Fetcher, RetryPolicy};
use crate::matcher::TargetMatcher;
use crate::target::Target;
use chrono::Utc;
use futures_util::future::join_all;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Callback invoked by the collector for every resolved target
pub type ProgressFn = Arc<dyn Fn(&MatchResult) + Send + Sync>;

/// Scheduling knobs for a run
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Number of workers; bounds in-flight requests
    pub concurrency: usize,
    pub jitter_min: Duration,
    pub jitter_max: Duration,
    /// Shuffle the work list before dispatch
    pub shuffle: bool,
}

impl PipelineOptions {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            concurrency: config.concurrency,
            jitter_min: Duration::from_millis(config.jitter_min_ms),
            jitter_max: Duration::from_millis(config.jitter_max_ms),
            shuffle: config.shuffle,
        }
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}

/// Everything a worker needs, shared across the pool
struct WorkerContext {
    fetcher: Arc<dyn Fetcher>,
    cache: PageCache,
    policy: RetryPolicy,
    matcher: TargetMatcher,
    jitter: (Duration, Duration),
    ban: BanSignal,
}

impl WorkerContext {
    /// Cache check, then fetch with retries, then match
    async fn resolve(&self, target: &Target) -> MatchResult {
        let id = target.id();

        if self.cache.has(id).await {
            match self.cache.read(id).await {
                Ok(content) => {
                    debug!("Cache hit for {}", id);
                    return self.matched(target, &content, Resolution::Cached, 0);
                }
                Err(e) => warn!("{}; fetching again", e),
            }
        }

        if self.ban.is_raised() {
            return MatchResult::aborted(id);
        }

        let delay = self.jitter_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let outcome = fetch_with_retry(&*self.fetcher, &self.policy, target.url(), &self.ban).await;

        match outcome.content {
            Some(content) => {
                if let Err(e) = self.cache.write(id, &content).await {
                    warn!("{}", e);
                }
                self.matched(target, &content, Resolution::Fetched, outcome.attempts)
            }
            None => {
                let failure = outcome.failure.unwrap_or(FailureKind::Internal {
                    reason: "fetch produced neither content nor failure".to_string(),
                });
                if failure != FailureKind::Aborted {
                    error!("Failed to fetch {} ({}): {}", id, target.url(), failure);
                }
                MatchResult::failed(id, failure, outcome.attempts)
            }
        }
    }

    fn matched(
        &self,
        target: &Target,
        content: &str,
        resolution: Resolution,
        attempts: u32,
    ) -> MatchResult {
        let (identity, platform) = self
            .matcher
            .check(Some(content), target.expected_issns());
        MatchResult::matched(target.id(), identity, platform, resolution, attempts)
    }

    fn jitter_delay(&self) -> Duration {
        let (min, max) = self.jitter;
        if max <= min {
            return min;
        }
        let millis = rand::thread_rng().gen_range(min.as_millis()..=max.as_millis());
        Duration::from_millis(millis as u64)
    }
}

/// Concurrent, cached, retrying fetch pipeline
pub struct Pipeline {
    fetcher: Arc<dyn Fetcher>,
    cache: PageCache,
    policy: RetryPolicy,
    matcher: TargetMatcher,
    options: PipelineOptions,
    progress: Option<ProgressFn>,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        cache: PageCache,
        policy: RetryPolicy,
        matcher: TargetMatcher,
        options: PipelineOptions,
    ) -> Self {
        Self {
            fetcher,
            cache,
            policy,
            matcher,
            options,
            progress: None,
        }
    }

    /// Report each result as it is collected
    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Resolve every target and return one result per identifier.
    ///
    /// Fails only on invalid input (zero workers, duplicate identifiers).
    /// Per-target problems are recorded in the report.
    pub async fn run(&self, targets: Vec<Target>) -> ProbeResult<Report> {
        let started_at = Utc::now();

        if self.options.concurrency == 0 {
            return Err(ProbeError::config_value(
                "fetch.concurrency",
                "must be at least 1",
            ));
        }

        let mut ids = HashSet::with_capacity(targets.len());
        for target in &targets {
            if !ids.insert(target.id().to_string()) {
                return Err(ProbeError::DuplicateTarget(target.id().to_string()));
            }
        }

        let mut targets = targets;
        if self.options.shuffle {
            targets.shuffle(&mut rand::thread_rng());
        }

        let total = targets.len();
        let workers = self.options.concurrency.min(total.max(1));
        info!("Resolving {} targets with {} workers", total, workers);

        let queue = Arc::new(Mutex::new(VecDeque::from(targets)));
        let ctx = Arc::new(WorkerContext {
            fetcher: Arc::clone(&self.fetcher),
            cache: self.cache.clone(),
            policy: self.policy.clone(),
            matcher: self.matcher.clone(),
            jitter: (self.options.jitter_min, self.options.jitter_max),
            ban: BanSignal::new(),
        });

        let (tx, mut rx) = mpsc::unbounded_channel::<MatchResult>();

        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let queue = Arc::clone(&queue);
                let ctx = Arc::clone(&ctx);
                let tx = tx.clone();
                tokio::spawn(run_worker(worker, queue, ctx, tx))
            })
            .collect();
        drop(tx);

        let mut results = HashMap::with_capacity(total);
        while let Some(result) = rx.recv().await {
            if let Some(progress) = &self.progress {
                progress(&result);
            }
            results.insert(result.id.clone(), result);
        }

        for (worker, joined) in join_all(handles).await.into_iter().enumerate() {
            if let Err(e) = joined {
                error!("Worker {} stopped unexpectedly: {}", worker, e);
            }
        }

        // Anything a dead worker left behind is still reported
        let missing: Vec<_> = ids.into_iter().filter(|id| !results.contains_key(id)).collect();
        for id in missing {
            error!("No result collected for {}", id);
            let result = MatchResult::failed(
                id.clone(),
                FailureKind::Internal {
                    reason: "target was not processed".to_string(),
                },
                0,
            );
            if let Some(progress) = &self.progress {
                progress(&result);
            }
            results.insert(id, result);
        }

        let banned = ctx.ban.is_raised();
        if banned {
            warn!("Run halted by a ban; unstarted targets were marked aborted");
        }

        Ok(Report::new(results, banned, started_at))
    }
}

/// Pull targets until the queue is empty
async fn run_worker(
    worker: usize,
    queue: Arc<Mutex<VecDeque<Target>>>,
    ctx: Arc<WorkerContext>,
    tx: mpsc::UnboundedSender<MatchResult>,
) {
    loop {
        let next = match queue.lock() {
            Ok(mut queue) => queue.pop_front(),
            Err(poisoned) => poisoned.into_inner().pop_front(),
        };
        let Some(target) = next else {
            break;
        };

        let id = target.id().to_string();
        let task_ctx = Arc::clone(&ctx);

        // A panic while resolving one target must not take the worker down
        let result = match tokio::spawn(async move { task_ctx.resolve(&target).await }).await {
            Ok(result) => result,
            Err(e) => {
                error!("Worker {} failed on {}: {}", worker, id, e);
                MatchResult::failed(
                    id,
                    FailureKind::Internal {
                        reason: e.to_string(),
                    },
                    0,
                )
            }
        };

        if tx.send(result).is_err() {
            break;
        }
    }
    debug!("Worker {} finished", worker);
}
