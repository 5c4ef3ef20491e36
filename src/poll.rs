//! Bounded polling with distinguishable retryable and fatal outcomes.
//!
//! An attempt closure reports one of three outcomes per call: keep waiting,
//! done, or give up. [`poll_until`] drives the closure on a fixed interval
//! until it is done, gives up, or the overall deadline passes.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// Result of a single poll attempt.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PollOutcome<T, E> {
    /// The condition is not met yet; the reason is kept for diagnostics.
    Pending(String),
    /// The condition is met.
    Ready(T),
    /// The attempt failed in a way that retrying cannot fix.
    Fatal(E),
}

/// Interval and overall deadline for a poll loop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PollSchedule {
    /// Pause between consecutive attempts.
    pub interval: Duration,
    /// Total time budget measured from the first attempt.
    pub timeout: Duration,
}

impl PollSchedule {
    /// Creates a schedule from an interval and a timeout.
    #[must_use]
    pub const fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

/// Errors raised by [`poll_until`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum PollError<E> {
    /// An attempt returned [`PollOutcome::Fatal`].
    #[error("{0}")]
    Fatal(E),
    /// The deadline passed while attempts were still pending.
    #[error("gave up after {attempts} attempts: {last_reason}")]
    TimedOut {
        /// Number of attempts made before giving up.
        attempts: u32,
        /// Reason reported by the final pending attempt.
        last_reason: String,
    },
}

/// Runs `attempt` until it is ready, fails fatally, or the schedule expires.
///
/// The first attempt always runs, even with a zero timeout. The last pause is
/// shortened so a final attempt lands on the deadline; no attempt starts
/// after it.
///
/// # Errors
///
/// Returns [`PollError::Fatal`] with the attempt's error as soon as one is
/// reported, or [`PollError::TimedOut`] when the deadline passes first.
pub async fn poll_until<T, E, F, Fut>(
    schedule: PollSchedule,
    mut attempt: F,
) -> Result<T, PollError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PollOutcome<T, E>>,
{
    // A timeout too large to represent is treated as no deadline at all.
    let deadline = Instant::now().checked_add(schedule.timeout);
    let mut attempts: u32 = 0;

    loop {
        attempts = attempts.saturating_add(1);
        let reason = match attempt().await {
            PollOutcome::Ready(value) => return Ok(value),
            PollOutcome::Fatal(err) => return Err(PollError::Fatal(err)),
            PollOutcome::Pending(reason) => reason,
        };
        debug!(attempt = attempts, %reason, "condition not met yet");

        let pause = match deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return Err(PollError::TimedOut {
                        attempts,
                        last_reason: reason,
                    });
                }
                schedule.interval.min(remaining)
            }
            None => schedule.interval,
        };
        sleep(pause).await;
    }
}
