// ABOUTME: Bounded retry loop around the single health probe.
// ABOUTME: Supports fixed or capped exponential backoff and always terminates.

use serde::Deserialize;
use std::time::{Duration, Instant};

use super::{HealthStatus, ProbeUrl, probe_once};

/// Delay between probe attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backoff {
    /// Same delay after every attempt.
    Fixed(#[serde(with = "humantime_serde")] Duration),
    /// Doubling delay starting at `initial`, never above `max`.
    Exponential {
        #[serde(with = "humantime_serde")]
        initial: Duration,
        #[serde(with = "humantime_serde")]
        max: Duration,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::Fixed(Duration::from_secs(2))
    }
}

impl Backoff {
    /// Delay after the given (zero-based) attempt.
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            Backoff::Fixed(d) => d,
            Backoff::Exponential { initial, max } => {
                let factor = 2u32.saturating_pow(attempt.min(16));
                initial.saturating_mul(factor).min(max)
            }
        }
    }

}

/// Probe policy: per-attempt timeout, attempt count, backoff and overall deadline.
#[derive(Debug, Clone)]
pub struct HealthVerifier {
    timeout: Duration,
    max_attempts: u32,
    backoff: Backoff,
    deadline: Option<Duration>,
}

impl HealthVerifier {
    pub fn new(timeout: Duration, max_attempts: u32) -> Self {
        Self {
            timeout,
            max_attempts: max_attempts.max(1),
            backoff: Backoff::default(),
            deadline: None,
        }
    }

    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Cap on total wall-clock time, tighter than the computed bound.
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Worst-case wall-clock time of `probe`: `max_attempts * timeout`, or the
    /// deadline when tighter. Backoff sleeps come out of the same budget.
    pub fn total_bound(&self) -> Duration {
        let computed = self.timeout.saturating_mul(self.max_attempts);
        match self.deadline {
            Some(d) => d.min(computed),
            None => computed,
        }
    }

    /// Probe until healthy, attempts run out or the budget is spent. Returns
    /// the last status seen.
    pub async fn probe(&self, url: &ProbeUrl) -> HealthStatus {
        let budget = self.total_bound();
        let started = Instant::now();
        let mut last = HealthStatus::Unreachable;

        let attempts = async {
            for attempt in 0..self.max_attempts {
                let remaining = budget.saturating_sub(started.elapsed());
                if remaining.is_zero() {
                    break;
                }
                last = probe_once(url, self.timeout.min(remaining)).await;
                tracing::debug!(attempt, status = %last, "health probe of {}", url);
                if last.is_healthy() || attempt + 1 == self.max_attempts {
                    break;
                }

                let remaining = budget.saturating_sub(started.elapsed());
                let delay = self.backoff.delay(attempt);
                if delay >= remaining {
                    tracing::debug!("health probe of {} has no budget left for a retry", url);
                    break;
                }
                tokio::time::sleep(delay).await;
            }
        };

        if tokio::time::timeout(budget, attempts).await.is_err() {
            tracing::debug!("health probe of {} hit its deadline", url);
        }

        last
    }
}
