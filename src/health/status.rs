// ABOUTME: Classified outcome of a health probe.
// ABOUTME: Maps onto the failure taxonomy for reporting.

use serde::Serialize;
use std::fmt;

use crate::rollout::FailureKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "code", rename_all = "snake_case")]
pub enum HealthStatus {
    /// 2xx response.
    Healthy,
    /// Connection refused, reset or timed out.
    Unreachable,
    /// Response with a non-2xx status code.
    UnexpectedStatus(u16),
}

impl HealthStatus {
    pub fn from_status_code(code: u16) -> Self {
        if (200..300).contains(&code) {
            HealthStatus::Healthy
        } else {
            HealthStatus::UnexpectedStatus(code)
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    /// Failure category, `None` when healthy.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            HealthStatus::Healthy => None,
            HealthStatus::Unreachable => Some(FailureKind::HealthUnreachable),
            HealthStatus::UnexpectedStatus(_) => Some(FailureKind::HealthUnexpectedStatus),
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Unreachable => write!(f, "unreachable"),
            HealthStatus::UnexpectedStatus(code) => write!(f, "unexpected status {}", code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_status_codes() {
        assert_eq!(HealthStatus::from_status_code(200), HealthStatus::Healthy);
        assert_eq!(HealthStatus::from_status_code(204), HealthStatus::Healthy);
        assert_eq!(
            HealthStatus::from_status_code(302),
            HealthStatus::UnexpectedStatus(302)
        );
        assert_eq!(
            HealthStatus::from_status_code(503),
            HealthStatus::UnexpectedStatus(503)
        );
    }

    #[test]
    fn failure_kinds() {
        assert_eq!(HealthStatus::Healthy.failure_kind(), None);
        assert_eq!(
            HealthStatus::Unreachable.failure_kind(),
            Some(FailureKind::HealthUnreachable)
        );
        assert_eq!(
            HealthStatus::UnexpectedStatus(404).failure_kind(),
            Some(FailureKind::HealthUnexpectedStatus)
        );
    }
}
