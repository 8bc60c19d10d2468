// src/crawl/coordinator.rs
// =============================================================================
// The coordinator: the single control loop that drives a crawl.
//
// How it works:
// 1. Dispatch a task for the seed at max_depth (outstanding = 1)
// 2. Wait for the next Outcome on the result channel
// 3. outstanding -= 1, record the outcome in the report
// 4. For each link of a successful outcome, dispatch a task at depth - 1
//    unless the depth is used up or the link was already dispatched
// 5. Stop when outstanding reaches 0
//
// Only this loop reads or writes the visited set, the outstanding count and
// the report. Tasks talk to it through the channel and nothing else, which
// is why none of that state needs a lock.
//
// Cancellation: once the token fires, nothing new is dispatched. Tasks still
// in flight resolve (mostly to FetchError::Cancelled), each one is still
// received and counted down, and the crawl ends cleanly at 0.
// =============================================================================

use super::fetcher::Fetcher;
use super::report::{CrawlRecord, CrawlReport, RecordStatus};
use super::task::{spawn_task, Outcome, TaskContext};
use super::visited::VisitedSet;
use crate::error::CrawlError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;

/// Knobs for one crawler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlConfig {
    /// How many levels to fetch: 1 = only the seed, 0 = nothing at all
    pub max_depth: usize,
    /// Upper bound on a single fetcher call; None waits forever
    pub fetch_timeout: Option<Duration>,
    /// Upper bound on simultaneous fetcher calls; None is unbounded
    pub max_concurrency: Option<usize>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            fetch_timeout: Some(Duration::from_secs(30)),
            max_concurrency: None,
        }
    }
}

impl CrawlConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Option<Duration>) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    // A cap of 0 would never let a fetch start, so it is raised to 1
    pub fn with_max_concurrency(mut self, max_concurrency: Option<usize>) -> Self {
        self.max_concurrency = max_concurrency.map(|n| n.max(1));
        self
    }
}

/// Crawls a resource graph with a shared fetcher.
///
/// Each call to [`Crawler::crawl`] gets its own visited set and counters,
/// so one `Crawler` can run several independent crawls at once.
pub struct Crawler<F: Fetcher> {
    fetcher: Arc<F>,
    config: CrawlConfig,
    cancel: CancellationToken,
}

impl<F: Fetcher> Crawler<F> {
    pub fn new(fetcher: Arc<F>, config: CrawlConfig) -> Self {
        Self {
            fetcher,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses an externally owned token to cancel crawls.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// A handle that cancels every crawl this crawler is running.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Crawls from `seed` until no task is outstanding.
    ///
    /// Per-resource failures are recorded in the report. `Err` means the
    /// coordinator's own bookkeeping broke.
    pub async fn crawl(&self, seed: F::Id) -> Result<CrawlReport<F::Id>, CrawlError> {
        let (results, mut receiver) = mpsc::unbounded_channel();
        let ctx = TaskContext {
            fetcher: Arc::clone(&self.fetcher),
            results,
            limiter: self
                .config
                .max_concurrency
                .map(|permits| Arc::new(Semaphore::new(permits))),
            fetch_timeout: self.config.fetch_timeout,
            cancel: self.cancel.clone(),
        };

        let mut run = CrawlRun::new(ctx);
        run.report.start_time = Some(Instant::now());

        tracing::info!(
            "Starting crawl at {} (max depth: {}, timeout: {:?}, concurrency: {:?})",
            seed,
            self.config.max_depth,
            self.config.fetch_timeout,
            self.config.max_concurrency
        );

        if self.cancel.is_cancelled() {
            run.stop_dispatching();
        } else {
            run.dispatch(seed, self.config.max_depth);
        }

        run.run_to_completion(&mut receiver, &self.cancel).await?;

        run.report.end_time = Some(Instant::now());
        tracing::info!(
            "Crawl finished: {} fetched, {} failed, {} identifier(s) dispatched",
            run.report.fetched_count(),
            run.report.failed_count(),
            run.visited.len()
        );

        Ok(run.report)
    }
}

/// Crawls from `seed` with default settings and the given depth bound.
pub async fn crawl<F: Fetcher>(
    seed: F::Id,
    max_depth: usize,
    fetcher: F,
) -> Result<CrawlReport<F::Id>, CrawlError> {
    let config = CrawlConfig::default().with_max_depth(max_depth);
    Crawler::new(Arc::new(fetcher), config).crawl(seed).await
}

// State of a single crawl invocation, owned by the control loop
struct CrawlRun<F: Fetcher> {
    // None once cancelled; dropping it also drops our sender
    ctx: Option<TaskContext<F>>,
    visited: VisitedSet<F::Id>,
    outstanding: usize,
    report: CrawlReport<F::Id>,
}

impl<F: Fetcher> CrawlRun<F> {
    fn new(ctx: TaskContext<F>) -> Self {
        Self {
            ctx: Some(ctx),
            visited: VisitedSet::new(),
            outstanding: 0,
            report: CrawlReport::default(),
        }
    }

    // Receives outcomes until none are outstanding
    async fn run_to_completion(
        &mut self,
        receiver: &mut mpsc::UnboundedReceiver<Outcome<F::Id>>,
        cancel: &CancellationToken,
    ) -> Result<(), CrawlError> {
        while self.outstanding > 0 {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled(), if self.is_dispatching() => {
                    tracing::info!(
                        "Crawl cancelled, draining {} outstanding task(s)",
                        self.outstanding
                    );
                    self.stop_dispatching();
                    continue;
                }
                next = receiver.recv() => next,
            };

            let outcome = next.ok_or(CrawlError::ChannelClosed {
                outstanding: self.outstanding,
            })?;
            self.outstanding = self
                .outstanding
                .checked_sub(1)
                .ok_or(CrawlError::OutstandingUnderflow)?;
            self.process(outcome);
        }
        Ok(())
    }

    fn is_dispatching(&self) -> bool {
        self.ctx.is_some()
    }

    fn stop_dispatching(&mut self) {
        self.ctx = None;
        self.report.cancelled = true;
    }

    // Check-and-mark, then spawn. Returns whether a task was created.
    fn dispatch(&mut self, id: F::Id, depth: usize) -> bool {
        let Some(ctx) = &self.ctx else {
            return false;
        };

        if depth == 0 {
            self.report.depth_exhausted += 1;
            return false;
        }

        if !self.visited.mark(id.clone()) {
            tracing::debug!("Skipping already dispatched: {}", id);
            self.report.duplicates_skipped += 1;
            return false;
        }

        tracing::debug!("Dispatching [depth {}]: {}", depth, id);
        spawn_task(ctx, id, depth);
        self.outstanding += 1;
        true
    }

    fn process(&mut self, outcome: Outcome<F::Id>) {
        let Outcome { id, depth, result } = outcome;

        match result {
            Ok(page) => {
                tracing::info!("found: {} ({} links)", id, page.links.len());
                self.report.links_discovered += page.links.len();

                for link in &page.links {
                    self.dispatch(link.clone(), depth - 1);
                }

                self.report.records.push(CrawlRecord {
                    id,
                    depth,
                    status: RecordStatus::Fetched {
                        content: page.content,
                        links: page.links,
                    },
                });
            }
            Err(error) => {
                tracing::warn!("Failed to fetch {}: {}", id, error);
                self.report.records.push(CrawlRecord {
                    id,
                    depth,
                    status: RecordStatus::Failed { error },
                });
            }
        }
    }
}
