// ABOUTME: Diagnostics accumulator for non-fatal warnings during a rollout.
// ABOUTME: Collects problems that downgrade a success to a warning instead of failing it.

/// Collects non-fatal warnings during rollout operations.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!(kind = ?warning.kind, "{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Warning messages, in the order they were recorded.
    pub fn messages(&self) -> Vec<String> {
        self.warnings.iter().map(|w| w.message.clone()).collect()
    }
}

/// A non-fatal warning collected during a rollout.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// Undeploy of a previous version failed (usually: nothing was deployed).
    pub fn undeploy(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::Undeploy,
            message: message.into(),
        }
    }

    /// Stop command failed; treated as "already stopped".
    pub fn stop_tolerated(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::StopTolerated,
            message: message.into(),
        }
    }

    /// Removing an old exploded directory or stale archive failed.
    pub fn removal(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::Removal,
            message: message.into(),
        }
    }

    /// Create an SSH disconnect warning.
    pub fn ssh_disconnect(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::SshDisconnect,
            message: message.into(),
        }
    }

    /// A non-fatal hook failed.
    pub fn hook(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::Hook,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during a rollout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    Undeploy,
    StopTolerated,
    Removal,
    /// Failed to cleanly disconnect SSH session.
    SshDisconnect,
    Hook,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_starts_empty() {
        let diag = Diagnostics::default();
        assert!(!diag.has_warnings());
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn diagnostics_collects_warnings_in_order() {
        let mut diag = Diagnostics::default();

        diag.warn(Warning::undeploy("nothing deployed at /shop"));
        diag.warn(Warning::removal("permission denied"));

        assert!(diag.has_warnings());
        assert_eq!(
            diag.messages(),
            vec![
                "nothing deployed at /shop".to_string(),
                "permission denied".to_string()
            ]
        );
    }

    #[test]
    fn warning_constructors_set_correct_kind() {
        assert_eq!(Warning::undeploy("x").kind, WarningKind::Undeploy);
        assert_eq!(Warning::stop_tolerated("x").kind, WarningKind::StopTolerated);
        assert_eq!(Warning::removal("x").kind, WarningKind::Removal);
        assert_eq!(Warning::ssh_disconnect("x").kind, WarningKind::SshDisconnect);
        assert_eq!(Warning::hook("x").kind, WarningKind::Hook);
    }
}
