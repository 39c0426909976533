//! Deadline-driven polling for job-based providers.

use crate::error::{Result, VidGenError};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Polling cadence and ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Wait between status checks.
    pub interval: Duration,
    /// Total time allowed before giving up.
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(300), // 5 minutes
        }
    }
}

/// Lifecycle of a polled job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Pending,
    Completed,
    Failed,
    TimedOut,
}

/// Tracks one job between submission and a terminal status.
#[derive(Debug)]
pub struct PollState {
    pub task_id: String,
    pub status: PollStatus,
    started: Instant,
}

impl PollState {
    /// Starts tracking a freshly submitted job.
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            status: PollStatus::Pending,
            started: Instant::now(),
        }
    }

    /// Time since submission.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// What a single status check observed.
#[derive(Debug)]
pub enum PollStep<T> {
    /// Not finished; carries the provider's raw status for logging.
    Pending(String),
    /// Finished successfully.
    Completed(T),
    /// The provider reports the job failed.
    Failed(String),
    /// The provider reports the job timed out.
    TimedOut,
}

/// Polls `check` every `config.interval` until the job reaches a terminal
/// status or `config.timeout` elapses.
///
/// The ceiling is a hard deadline measured from `state`'s start: the last
/// sleep is shortened to end at the deadline, no check starts at or after
/// it, and a check still in flight when it passes is abandoned.
/// Cancellation interrupts the sleep and the in-flight check.
pub async fn poll_until_done<T, F, Fut>(
    provider: &str,
    state: &mut PollState,
    config: PollConfig,
    cancel: &CancellationToken,
    mut check: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollStep<T>>>,
{
    let deadline = state.started + config.timeout;

    loop {
        let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
            break;
        };
        if remaining.is_zero() {
            break;
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(VidGenError::Cancelled),
            _ = tokio::time::sleep(config.interval.min(remaining)) => {}
        }

        // Re-check after waking; the sleep may have run up to the deadline.
        if Instant::now() >= deadline {
            break;
        }

        let step = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(VidGenError::Cancelled),
            res = tokio::time::timeout_at(deadline, check()) => res.ok(),
        };
        let Some(step) = step else {
            tracing::debug!(provider, task_id = %state.task_id, "status check outlived the deadline");
            break;
        };

        match step? {
            PollStep::Pending(status) => {
                tracing::debug!(
                    provider,
                    task_id = %state.task_id,
                    status = %status,
                    elapsed_secs = state.elapsed().as_secs(),
                    "polling video generation"
                );
            }
            PollStep::Completed(value) => {
                state.status = PollStatus::Completed;
                return Ok(value);
            }
            PollStep::Failed(reason) => {
                state.status = PollStatus::Failed;
                return Err(VidGenError::GenerationFailed {
                    provider: provider.to_string(),
                    reason,
                });
            }
            PollStep::TimedOut => {
                state.status = PollStatus::TimedOut;
                return Err(VidGenError::ProviderTimeout(provider.to_string()));
            }
        }
    }

    state.status = PollStatus::TimedOut;
    Err(VidGenError::ClientTimeout {
        provider: provider.to_string(),
        waited: config.timeout,
    })
}
