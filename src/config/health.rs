// ABOUTME: Health probe settings.
// ABOUTME: Defaults give a bounded probe of a few attempts with a short fixed backoff.

use serde::Deserialize;
use std::time::Duration;

use crate::health::{Backoff, HealthVerifier};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthConfig {
    /// Resource under the context to probe.
    #[serde(default = "default_index")]
    pub index: String,
    /// Per-attempt timeout.
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    #[serde(default)]
    pub backoff: Backoff,
    /// Overall deadline across all attempts.
    #[serde(default, with = "humantime_serde")]
    pub deadline: Option<Duration>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            index: default_index(),
            timeout: default_timeout(),
            attempts: default_attempts(),
            backoff: Backoff::default(),
            deadline: None,
        }
    }
}

impl HealthConfig {
    pub fn verifier(&self) -> HealthVerifier {
        let verifier = HealthVerifier::new(self.timeout, self.attempts).backoff(self.backoff);
        match self.deadline {
            Some(deadline) => verifier.deadline(deadline),
            None => verifier,
        }
    }
}

fn default_index() -> String {
    "index.html".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_attempts() -> u32 {
    5
}
