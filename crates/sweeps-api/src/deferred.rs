//! # Deferred Execution
//!
//! Runs low-priority follow-up work (integration dispatch) after the
//! response path has finished with it. Two strategies:
//!
//! - [`IdleExecutor`] spawns the task and yields before running it, so
//!   request-serving tasks already queued on the worker go first.
//! - [`DelayedExecutor`] spawns the task behind a fixed delay.
//!
//! [`select_executor`] picks one at startup from the runtime flavor and the
//! choice is injected through application state.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::runtime::{Handle, RuntimeFlavor};

/// Delay used by [`DelayedExecutor::default`].
pub const DEFAULT_DEFER_DELAY: Duration = Duration::from_millis(10);

/// A unit of deferred work.
pub type DeferredTask = BoxFuture<'static, ()>;

/// Schedules work to run later without blocking the caller.
pub trait DeferredExecutor: Send + Sync + Debug {
    /// Schedule `task`. Never blocks and never runs `task` inline.
    fn defer(&self, task: DeferredTask);

    /// Strategy name for logs.
    fn name(&self) -> &'static str;
}

/// Cooperative low-priority execution: yield once, then run.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleExecutor;

impl DeferredExecutor for IdleExecutor {
    fn defer(&self, task: DeferredTask) {
        spawn_detached(self.name(), async move {
            tokio::task::yield_now().await;
            task.await;
        });
    }

    fn name(&self) -> &'static str {
        "idle"
    }
}

/// Plain delayed execution.
#[derive(Debug, Clone, Copy)]
pub struct DelayedExecutor {
    delay: Duration,
}

impl DelayedExecutor {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for DelayedExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_DEFER_DELAY)
    }
}

impl DeferredExecutor for DelayedExecutor {
    fn defer(&self, task: DeferredTask) {
        let delay = self.delay;
        spawn_detached(self.name(), async move {
            tokio::time::sleep(delay).await;
            task.await;
        });
    }

    fn name(&self) -> &'static str {
        "delayed"
    }
}

fn spawn_detached(
    executor: &'static str,
    task: impl std::future::Future<Output = ()> + Send + 'static,
) {
    match Handle::try_current() {
        Ok(handle) => {
            handle.spawn(task);
        }
        Err(_) => {
            tracing::error!(executor, "no tokio runtime available, deferred task dropped");
        }
    }
}

/// Pick the executor for the current runtime.
///
/// A multi-threaded runtime has spare workers to absorb yielded tasks, so it
/// gets [`IdleExecutor`]. Anything else (current-thread runtime, or no
/// runtime at all) gets [`DelayedExecutor`].
pub fn select_executor() -> Arc<dyn DeferredExecutor> {
    let flavor = Handle::try_current().map(|h| h.runtime_flavor());
    let executor: Arc<dyn DeferredExecutor> = match flavor {
        Ok(RuntimeFlavor::MultiThread) => Arc::new(IdleExecutor),
        _ => Arc::new(DelayedExecutor::default()),
    };
    tracing::debug!(executor = executor.name(), "deferred executor selected");
    executor
}
