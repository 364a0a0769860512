// ABOUTME: File and directory names a rollout touches inside a deploy directory.
// ABOUTME: Shared by the local and remote copy strategies.

use crate::artifact::Artifact;
use crate::types::ContextPath;

/// Names, relative to the deploy directory, for one artifact and context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployNames {
    /// Directory the container expands the archive into.
    pub exploded: String,
    /// Archive file the container serves the context from.
    pub archive: String,
    /// Versioned leftovers from copying the artifact under its own file name:
    /// `(archive file, exploded directory)`.
    pub stale: Option<(String, String)>,
}

impl DeployNames {
    pub fn new(artifact: &Artifact, context: &ContextPath) -> Self {
        let deploy_name = context.deploy_name();
        let archive = format!("{}.{}", deploy_name, artifact.extension());

        let stale = (artifact.file_name() != archive)
            .then(|| (artifact.file_name().to_string(), artifact.stem().to_string()));

        Self {
            exploded: deploy_name,
            archive,
            stale,
        }
    }

    /// Directories to remove before copying, in order.
    pub fn directories_to_remove(&self) -> Vec<&str> {
        let mut dirs = vec![self.exploded.as_str()];
        if let Some((_, dir)) = &self.stale {
            dirs.push(dir.as_str());
        }
        dirs
    }

    /// Files to remove before copying, in order.
    pub fn files_to_remove(&self) -> Vec<&str> {
        let mut files = vec![self.archive.as_str()];
        if let Some((file, _)) = &self.stale {
            files.push(file.as_str());
        }
        files
    }
}
