use std::future::Future;
use std::sync::Arc;
use tokio::sync::{AcquireError, Semaphore};
use tokio::task::{Id, JoinError, JoinSet};

/// Spawns futures onto the runtime while holding at most `max_concurrent`
/// of them in flight. Every spawned task is owned by an internal `JoinSet`:
/// dropping the spawner aborts whatever is still running.
pub struct LimitedSpawner<T> {
    semaphore: Arc<Semaphore>,
    tasks: JoinSet<T>,
}

impl<T: Send + 'static> LimitedSpawner<T> {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            tasks: JoinSet::new(),
        }
    }

    /// Waits for a free permit, then spawns `f`. The permit travels with the
    /// task and is released when the task finishes, fails or panics.
    pub async fn spawn<F>(&mut self, f: F) -> Result<Id, AcquireError>
    where
        F: Future<Output = T> + Send + 'static,
    {
        let permit = Arc::clone(&self.semaphore).acquire_owned().await?;
        let handle = self.tasks.spawn(async move {
            let _permit = permit;
            f.await
        });
        Ok(handle.id())
    }

    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Waits for every spawned task, in completion order.
    pub async fn join_all(mut self) -> Vec<(Id, Result<T, JoinError>)> {
        let mut results = Vec::with_capacity(self.tasks.len());
        while let Some(joined) = self.tasks.join_next_with_id().await {
            results.push(match joined {
                Ok((id, value)) => (id, Ok(value)),
                Err(err) => (err.id(), Err(err)),
            });
        }
        results
    }
}
