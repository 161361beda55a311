use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use std::collections::HashMap;
use crate::error::{Error, Result};
use tracing::{info, error};

/// Task Supervisor - owns the background tasks spawned next to the HTTP server
///
/// The price scheduler never returns on its own, so a finished handle means
/// it panicked or was aborted. `watch` reports that while the server runs,
/// and `shutdown_all` aborts whatever is still running at process exit.
///
/// ```ignore
/// let mut supervisor = TaskSupervisor::new();
/// supervisor.spawn("price_scheduler", scheduler.run());
///
/// tokio::select! {
///     res = server => res?,
///     err = supervisor.watch(Duration::from_secs(30)) => error!("{}", err),
/// }
/// ```
pub struct TaskSupervisor {
    tasks: HashMap<String, JoinHandle<()>>,
}

impl TaskSupervisor {
    pub fn new() -> Self {
        TaskSupervisor {
            tasks: HashMap::new(),
        }
    }

    /// Spawn a new background task and register it for monitoring
    pub fn spawn<F>(&mut self, name: impl Into<String>, future: F) -> &mut Self
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let handle = tokio::spawn(future);

        info!("Spawned background task: {}", name);
        self.tasks.insert(name, handle);
        self
    }

    /// Returns an error naming every task that has already terminated.
    /// Terminated tasks are dropped from tracking.
    pub fn check_health(&mut self) -> Result<()> {
        let failed_tasks: Vec<String> = self
            .tasks
            .iter()
            .filter(|(_, handle)| handle.is_finished())
            .map(|(name, _)| name.clone())
            .collect();

        if failed_tasks.is_empty() {
            return Ok(());
        }

        for name in &failed_tasks {
            self.tasks.remove(name);
        }

        let error_msg = format!("Tasks terminated unexpectedly: {:?}", failed_tasks);
        error!("{}", error_msg);
        Err(Error::TaskFailed(error_msg))
    }

    /// Check health every `period` until a task has terminated, then return
    /// the failure.
    pub async fn watch(&mut self, period: Duration) -> Error {
        let mut ticker = interval(period);
        loop {
            ticker.tick().await;
            if let Err(e) = self.check_health() {
                return e;
            }
        }
    }

    pub fn active_task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Abort every task still running
    pub async fn shutdown_all(&mut self) {
        info!("Shutting down {} background tasks", self.tasks.len());

        for (name, handle) in self.tasks.drain() {
            handle.abort();
            // An aborted task resolves to a cancelled JoinError.
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    error!("Task {} failed during shutdown: {}", name, e);
                }
            }
            info!("Aborted task: {}", name);
        }
    }
}

impl Default for TaskSupervisor {
    fn default() -> Self {
        Self::new()
    }
}
