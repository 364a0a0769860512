// ABOUTME: Post-rollout health probing.
// ABOUTME: One header-only probe per call, plus a bounded retry loop with backoff.

mod probe;
mod status;
mod verifier;

pub use probe::{ProbeUrl, ProbeUrlError, probe_once};
pub use status::HealthStatus;
pub use verifier::{Backoff, HealthVerifier};
