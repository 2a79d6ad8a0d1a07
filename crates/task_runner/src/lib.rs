//! Task Runner
//!
//! Small structure for collecting and running named background tasks, defined as
//! high-level loops that run independently of each other (albeit likely on shared
//! state) until a shared shutdown signal flips.

extern crate tracing as log;

use std::future::Future;
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::task::{JoinError, JoinHandle};
use tokio::{sync::watch, time::Duration};

pub trait Task {
    fn start(self, name: &'static str, alive: watch::Receiver<bool>) -> JoinHandle<()>;
}

#[derive(Debug, Clone)]
#[repr(transparent)]
pub struct ShutdownSignal(Arc<watch::Sender<bool>>);

impl ShutdownSignal {
    fn new() -> Self {
        ShutdownSignal(Arc::new(watch::channel(true).0))
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.0.subscribe()
    }

    pub fn stop(&self) {
        // send_replace rather than send, stopping must work with zero tasks attached
        self.0.send_replace(false);
    }
}

pub struct TaskRunner {
    tasks: FuturesUnordered<JoinHandle<()>>,
    alive: ShutdownSignal,
}

impl Default for TaskRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskRunner {
    pub fn new() -> Self {
        TaskRunner {
            tasks: FuturesUnordered::new(),
            alive: ShutdownSignal::new(),
        }
    }

    pub fn add(&self, name: &'static str, task: impl Task) {
        log::debug!("Starting task {name}");

        self.tasks.push(task.start(name, self.alive.subscribe()));
    }

    pub fn stop(&self) {
        self.alive.stop();
    }

    pub fn signal(&self) -> ShutdownSignal {
        self.alive.clone()
    }

    /// Runs until every task has stopped, surfacing the first panicked task.
    pub async fn wait(mut self) -> Result<(), JoinError> {
        while let Some(res) = self.tasks.next().await {
            res?;
        }

        Ok(())
    }
}

pub fn fn_task<S, T, F>(state: S, f: T) -> impl Task
where
    T: FnOnce(watch::Receiver<bool>, S) -> F + Send + 'static,
    F: Future<Output = ()> + Send + 'static,
    S: Send + 'static,
{
    struct FnTask<S, T>(S, T);

    impl<S, T, F> Task for FnTask<S, T>
    where
        T: FnOnce(watch::Receiver<bool>, S) -> F + Send + 'static,
        F: Future<Output = ()> + Send + 'static,
        S: Send + 'static,
    {
        fn start(self, name: &'static str, alive: watch::Receiver<bool>) -> JoinHandle<()> {
            tokio::task::spawn(async move {
                let FnTask(state, f) = self;
                f(alive, state).await;

                log::trace!("Task {name} stopped");
            })
        }
    }

    FnTask(state, f)
}

/// Runs `f` every `period`, starting one full period from now. The shutdown
/// signal wins over a pending tick.
pub fn interval_fn_task<S, T, F>(state: S, period: Duration, f: T) -> impl Task
where
    T: Fn(tokio::time::Instant, &S) -> F + Send + Sync + 'static,
    F: Future<Output = ()> + Send + 'static,
    S: Send + Sync + 'static,
{
    fn_task(state, move |mut alive, state| async move {
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);

        while *alive.borrow_and_update() {
            tokio::select! {
                biased;
                _ = alive.changed() => break,
                t = interval.tick() => f(t, &state).await,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn interval_task_ticks_until_stopped() {
        let ticks = Arc::new(AtomicUsize::new(0));

        let runner = TaskRunner::new();
        runner.add(
            "ticker",
            interval_fn_task(ticks.clone(), Duration::from_secs(60), |_, ticks| {
                let ticks = ticks.clone();
                async move {
                    ticks.fetch_add(1, Ordering::SeqCst);
                }
            }),
        );

        tokio::time::sleep(Duration::from_secs(60 * 3 + 30)).await;

        runner.stop();
        runner.wait().await.unwrap();

        assert_eq!(ticks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn stop_with_no_tasks_is_harmless() {
        let runner = TaskRunner::new();
        runner.stop();
        runner.wait().await.unwrap();
    }
}
