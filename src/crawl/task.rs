// src/crawl/task.rs
// =============================================================================
// The task runner: one spawned unit of work per dispatched identifier.
//
// A task:
// 1. Waits for a concurrency permit (only if a cap is configured)
// 2. Calls the fetcher, racing it against the per-fetch timeout and the
//    crawl's cancellation token
// 3. Sends exactly one Outcome back to the coordinator
//
// A task never fails on its own. Fetch errors, timeouts, cancellation and
// even a panicking fetcher all end up as the error side of the Outcome.
//
// Depth is checked by the coordinator before a task is created, so every
// task that exists has depth >= 1 and does real work.
// =============================================================================

use super::fetcher::{Fetcher, Page};
use crate::error::FetchError;
use futures::FutureExt; // catch_unwind() on futures
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// The result of one fetch attempt, as seen by the coordinator.
#[derive(Debug)]
pub struct Outcome<Id> {
    pub id: Id,
    /// Remaining depth the task was dispatched with
    pub depth: usize,
    pub result: Result<Page<Id>, FetchError>,
}

// Everything a task needs, shared by all tasks of one crawl
pub(crate) struct TaskContext<F: Fetcher> {
    pub fetcher: Arc<F>,
    pub results: UnboundedSender<Outcome<F::Id>>,
    pub limiter: Option<Arc<Semaphore>>,
    pub fetch_timeout: Option<Duration>,
    pub cancel: CancellationToken,
}

// Derive would require F: Clone, but only the Arc is cloned
impl<F: Fetcher> Clone for TaskContext<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            results: self.results.clone(),
            limiter: self.limiter.clone(),
            fetch_timeout: self.fetch_timeout,
            cancel: self.cancel.clone(),
        }
    }
}

// Spawns a task for (id, depth) on the tokio runtime
pub(crate) fn spawn_task<F: Fetcher>(ctx: &TaskContext<F>, id: F::Id, depth: usize) {
    let ctx = ctx.clone();
    tokio::spawn(async move {
        let result = run_fetch(&ctx, &id).await;
        let outcome = Outcome { id, depth, result };

        // Send only fails when the coordinator has already gone away,
        // in which case nobody is waiting for this outcome
        if let Err(unsent) = ctx.results.send(outcome) {
            tracing::debug!(
                "Dropping outcome for {}: coordinator is gone",
                unsent.0.id
            );
        }
    });
}

async fn run_fetch<F: Fetcher>(
    ctx: &TaskContext<F>,
    id: &F::Id,
) -> Result<Page<F::Id>, FetchError> {
    let fetch = async {
        // Held until the fetch finishes; dropping it frees the slot
        let _permit = match &ctx.limiter {
            Some(limiter) => match Arc::clone(limiter).acquire_owned().await {
                Ok(permit) => Some(permit),
                // Only happens if the semaphore was closed
                Err(_) => return Err(FetchError::Cancelled),
            },
            None => None,
        };

        let guarded = AssertUnwindSafe(ctx.fetcher.fetch(id)).catch_unwind();

        match ctx.fetch_timeout {
            Some(limit) => match tokio::time::timeout(limit, guarded).await {
                Ok(result) => result.unwrap_or_else(|panic| Err(panic_to_error(panic))),
                Err(_) => Err(FetchError::Timeout(limit)),
            },
            None => guarded
                .await
                .unwrap_or_else(|panic| Err(panic_to_error(panic))),
        }
    };

    tokio::select! {
        biased;
        _ = ctx.cancel.cancelled() => Err(FetchError::Cancelled),
        result = fetch => result,
    }
}

// Panic payloads are usually &str or String
fn panic_to_error(panic: Box<dyn Any + Send>) -> FetchError {
    let message = if let Some(text) = panic.downcast_ref::<&str>() {
        text.to_string()
    } else if let Some(text) = panic.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    };
    FetchError::Panicked(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    // A fetcher whose behaviour is picked by the identifier
    struct ScriptedFetcher;

    #[async_trait]
    impl Fetcher for ScriptedFetcher {
        type Id = String;

        async fn fetch(&self, id: &String) -> Result<Page<String>, FetchError> {
            match id.as_str() {
                "ok" => Ok(Page::new("body", vec!["next".to_string()])),
                "missing" => Err(FetchError::NotFound(id.clone())),
                "slow" => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(Page::new("too late", Vec::new()))
                }
                "panic" => panic!("boom"),
                _ => unreachable!("unexpected id {}", id),
            }
        }
    }

    fn context(
        fetch_timeout: Option<Duration>,
    ) -> (
        TaskContext<ScriptedFetcher>,
        mpsc::UnboundedReceiver<Outcome<String>>,
    ) {
        let (results, receiver) = mpsc::unbounded_channel();
        let ctx = TaskContext {
            fetcher: Arc::new(ScriptedFetcher),
            results,
            limiter: None,
            fetch_timeout,
            cancel: CancellationToken::new(),
        };
        (ctx, receiver)
    }

    #[tokio::test]
    async fn test_success_reports_page() {
        let (ctx, mut receiver) = context(None);
        spawn_task(&ctx, "ok".to_string(), 3);

        let outcome = receiver.recv().await.unwrap();
        assert_eq!(outcome.id, "ok");
        assert_eq!(outcome.depth, 3);
        let page = outcome.result.unwrap();
        assert_eq!(page.content, "body");
        assert_eq!(page.links, vec!["next".to_string()]);
    }

    #[tokio::test]
    async fn test_fetch_error_is_captured() {
        let (ctx, mut receiver) = context(None);
        spawn_task(&ctx, "missing".to_string(), 1);

        let outcome = receiver.recv().await.unwrap();
        assert_eq!(
            outcome.result,
            Err(FetchError::NotFound("missing".to_string()))
        );
    }

    #[tokio::test]
    async fn test_timeout_becomes_outcome() {
        let (ctx, mut receiver) = context(Some(Duration::from_millis(20)));
        spawn_task(&ctx, "slow".to_string(), 1);

        let outcome = receiver.recv().await.unwrap();
        assert_eq!(
            outcome.result,
            Err(FetchError::Timeout(Duration::from_millis(20)))
        );
    }

    #[tokio::test]
    async fn test_panic_becomes_outcome() {
        let (ctx, mut receiver) = context(None);
        spawn_task(&ctx, "panic".to_string(), 1);

        let outcome = receiver.recv().await.unwrap();
        assert_eq!(outcome.result, Err(FetchError::Panicked("boom".to_string())));
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_fetch() {
        let (ctx, mut receiver) = context(None);
        spawn_task(&ctx, "slow".to_string(), 1);

        ctx.cancel.cancel();
        let outcome = receiver.recv().await.unwrap();
        assert_eq!(outcome.result, Err(FetchError::Cancelled));
    }

    #[tokio::test]
    async fn test_each_task_sends_exactly_one_outcome() {
        let (ctx, mut receiver) = context(None);
        spawn_task(&ctx, "ok".to_string(), 1);
        spawn_task(&ctx, "missing".to_string(), 1);
        drop(ctx);

        let mut received = 0;
        while receiver.recv().await.is_some() {
            received += 1;
        }
        assert_eq!(received, 2);
    }
}
