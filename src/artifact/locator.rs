// ABOUTME: Artifact lookup and single-entry archive reads.
// ABOUTME: Derives logical name and version from the artifactId-version file naming convention.

use serde::Serialize;
use snafu::{ResultExt, ensure};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use super::error::{
    ArtifactError, EmptySnafu, EntryNotFoundSnafu, InvalidArchiveSnafu, MissingSnafu,
    NotAFileSnafu, ReadSnafu,
};

const DEFAULT_EXTENSION: &str = "war";

/// A built, deployable archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    path: PathBuf,
    file_name: String,
    name: String,
    version: Option<String>,
    size: u64,
}

impl Artifact {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name on disk, e.g. `shop-1.4.2.war`.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// File name without extension, e.g. `shop-1.4.2`.
    pub fn stem(&self) -> &str {
        self.file_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.file_name)
    }

    pub fn extension(&self) -> &str {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
            .unwrap_or(DEFAULT_EXTENSION)
    }

    /// Logical name, e.g. `shop`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version, e.g. `1.4.2-SNAPSHOT`, if the file name carries one.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Confirm a built artifact exists at `path` and is a non-empty regular file.
pub fn locate(path: impl AsRef<Path>) -> Result<Artifact, ArtifactError> {
    let path = path.as_ref();

    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return MissingSnafu { path }.fail();
        }
        Err(e) => return Err(e).context(ReadSnafu { path }),
    };

    ensure!(metadata.is_file(), NotAFileSnafu { path });
    ensure!(metadata.len() > 0, EmptySnafu { path });

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| NotAFileSnafu { path }.build())?;

    let stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(&file_name);
    let (name, version) = split_name_version(stem);

    Ok(Artifact {
        path: path.to_path_buf(),
        name,
        version,
        file_name,
        size: metadata.len(),
    })
}

/// Read one named entry of the artifact into memory.
///
/// The artifact is re-opened on every call; if it disappeared since `locate`,
/// this fails with `Missing` rather than returning stale data.
pub fn peek_entry(artifact: &Artifact, entry_name: &str) -> Result<Vec<u8>, ArtifactError> {
    let path = artifact.path();

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return MissingSnafu { path }.fail(),
        Err(e) => return Err(e).context(ReadSnafu { path }),
    };

    let mut archive = zip::ZipArchive::new(file).context(InvalidArchiveSnafu { path })?;

    let mut entry = match archive.by_name(entry_name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => {
            return EntryNotFoundSnafu {
                path,
                entry: entry_name,
            }
            .fail();
        }
        Err(e) => return Err(e).context(InvalidArchiveSnafu { path }),
    };

    // The header's size is untrusted; never reserve more than the archive itself.
    let hint = entry.size().min(artifact.size());
    let mut buf = Vec::with_capacity(usize::try_from(hint).unwrap_or(0));
    entry
        .read_to_end(&mut buf)
        .map_err(zip::result::ZipError::from)
        .context(InvalidArchiveSnafu { path })?;
    Ok(buf)
}

/// Split `shop-1.4.2-SNAPSHOT` into (`shop`, `1.4.2-SNAPSHOT`).
/// The version starts at the first hyphen followed by a digit.
fn split_name_version(stem: &str) -> (String, Option<String>) {
    let bytes = stem.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'-' && i > 0 && bytes.get(i + 1).is_some_and(|n| n.is_ascii_digit()) {
            return (stem[..i].to_string(), Some(stem[i + 1..].to_string()));
        }
    }
    (stem.to_string(), None)
}
