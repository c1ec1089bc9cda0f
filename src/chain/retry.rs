// Retry with exponential backoff
//
// Transient RPC and indexing delays are retried under a doubling delay with
// a cap and a hard overall deadline. The delay sequence is computed without
// touching the clock, so it is testable as plain data.

use anyhow::Result;
use std::time::Duration;

/// Exponential backoff schedule with a total sleep budget
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    max_delay: Duration,
    deadline: Duration,
    elapsed: Duration,
}

impl Backoff {
    pub fn new(base: Duration, max_delay: Duration, deadline: Duration) -> Self {
        Self {
            next: base,
            max_delay,
            deadline,
            elapsed: Duration::ZERO,
        }
    }

    /// The next delay, or `None` once the deadline budget is spent.
    ///
    /// The final delay is truncated so the total never exceeds the deadline.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.elapsed >= self.deadline {
            return None;
        }
        let delay = self.next.min(self.max_delay).min(self.deadline - self.elapsed);
        if delay.is_zero() {
            return None;
        }
        self.elapsed += delay;
        self.next = (self.next * 2).min(self.max_delay);
        Some(delay)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(500),
            Duration::from_secs(8),
            Duration::from_secs(60),
        )
    }
}

/// Run `op` until it succeeds or the backoff budget is spent
pub async fn retry_with_backoff<T, F, Fut>(mut backoff: Backoff, what: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut attempt = 1u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => match backoff.next_delay() {
                Some(delay) => {
                    log::warn!(
                        "{what} failed (attempt {attempt}): {err:#}; retrying in {:?}",
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => {
                    return Err(err.context(format!("{what}: retry budget exhausted")));
                }
            },
        }
    }
}
