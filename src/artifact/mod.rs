// ABOUTME: Locates built artifacts and reads single archive entries for verification.
// ABOUTME: Read-only; never extracts or caches anything.

mod error;
mod locator;

pub use error::ArtifactError;
pub use locator::{Artifact, locate, peek_entry};
