//! Model Pool — process-wide admission control for remote model calls.
//!
//! At most `capacity` calls run at once; further callers queue for a permit.
//! Each admitted call runs under a timeout and is dropped (cancelled) when it
//! expires. Created once at startup and shared through `AppState`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::llm_client::LlmError;

#[derive(Debug, Clone)]
pub struct ModelPool {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    call_timeout: Duration,
}

impl ModelPool {
    pub fn new(capacity: usize, call_timeout: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            call_timeout,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of calls currently holding a permit.
    pub fn in_flight(&self) -> usize {
        self.capacity
            .saturating_sub(self.semaphore.available_permits())
    }

    /// Runs `call` once a permit is free. The timeout covers the call only,
    /// not the wait for a permit.
    pub async fn run<F, T>(&self, call: F) -> Result<T, LlmError>
    where
        F: Future<Output = Result<T, LlmError>>,
    {
        if self.semaphore.available_permits() == 0 && !self.semaphore.is_closed() {
            warn!(
                "Model pool saturated ({} in flight), request queued",
                self.capacity
            );
        }

        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| LlmError::PoolClosed)?;

        debug!(
            "Model pool permit acquired ({}/{} in use)",
            self.in_flight(),
            self.capacity
        );

        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(self.call_timeout)),
        }
    }

    /// Waits up to `grace` for in-flight calls to finish, then closes the pool.
    /// Calls arriving after this return `LlmError::PoolClosed`.
    pub async fn drain(&self, grace: Duration) {
        let all = u32::try_from(self.capacity).unwrap_or(u32::MAX);
        match tokio::time::timeout(grace, self.semaphore.acquire_many(all)).await {
            Ok(Ok(_permits)) => info!("Model pool drained"),
            Ok(Err(_)) => debug!("Model pool already closed"),
            Err(_) => warn!(
                "Model pool drain timed out after {:?} with {} calls in flight",
                grace,
                self.in_flight()
            ),
        }
        self.semaphore.close();
    }
}
