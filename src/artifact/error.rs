// ABOUTME: Artifact error types with SNAFU context selectors.
// ABOUTME: Every variant carries the artifact path so failures can be reported as-is.

use snafu::Snafu;
use std::path::PathBuf;

use crate::rollout::FailureKind;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ArtifactError {
    #[snafu(display("artifact not found at {}", path.display()))]
    Missing { path: PathBuf },

    #[snafu(display("artifact path is not a regular file: {}", path.display()))]
    NotAFile { path: PathBuf },

    #[snafu(display("artifact is empty: {}", path.display()))]
    Empty { path: PathBuf },

    #[snafu(display("failed to read artifact {}: {source}", path.display()))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("{} is not a readable archive: {source}", path.display()))]
    InvalidArchive {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    #[snafu(display("entry '{entry}' not found in {}", path.display()))]
    EntryNotFound { path: PathBuf, entry: String },
}

impl ArtifactError {
    /// Failure category for reporting.
    pub fn kind(&self) -> FailureKind {
        match self {
            ArtifactError::Missing { .. }
            | ArtifactError::NotAFile { .. }
            | ArtifactError::Empty { .. }
            | ArtifactError::Read { .. } => FailureKind::ArtifactMissing,
            ArtifactError::InvalidArchive { .. } => FailureKind::InvalidArchive,
            ArtifactError::EntryNotFound { .. } => FailureKind::EntryNotFound,
        }
    }
}
