// ABOUTME: Integration tests for artifact lookup and single-entry reads.
// ABOUTME: Builds real zip archives in temp dirs and checks failure classification.

mod support;

use std::fs;
use tempfile::TempDir;
use warship::artifact::{ArtifactError, locate, peek_entry};
use warship::rollout::FailureKind;

#[test]
fn locate_derives_name_version_and_size() {
    let dir = TempDir::new().unwrap();
    let path = support::sample_war(dir.path(), "shop-1.4.2-SNAPSHOT.war");

    let artifact = locate(&path).unwrap();
    assert_eq!(artifact.file_name(), "shop-1.4.2-SNAPSHOT.war");
    assert_eq!(artifact.name(), "shop");
    assert_eq!(artifact.version(), Some("1.4.2-SNAPSHOT"));
    assert_eq!(artifact.extension(), "war");
    assert_eq!(artifact.size(), fs::metadata(&path).unwrap().len());
}

#[test]
fn missing_directory_and_empty_are_all_artifact_missing() {
    let dir = TempDir::new().unwrap();

    let missing = locate(dir.path().join("shop.war")).unwrap_err();
    assert_eq!(missing.kind(), FailureKind::ArtifactMissing);

    let as_dir = dir.path().join("exploded.war");
    fs::create_dir(&as_dir).unwrap();
    let not_file = locate(&as_dir).unwrap_err();
    assert!(matches!(not_file, ArtifactError::NotAFile { .. }));
    assert_eq!(not_file.kind(), FailureKind::ArtifactMissing);

    let empty = dir.path().join("empty.war");
    fs::write(&empty, b"").unwrap();
    let empty_err = locate(&empty).unwrap_err();
    assert!(matches!(empty_err, ArtifactError::Empty { .. }));
    assert_eq!(empty_err.kind(), FailureKind::ArtifactMissing);
}

#[test]
fn peek_entry_returns_exact_bytes() {
    let dir = TempDir::new().unwrap();
    let payload: &[u8] = b"<html><body>hello</body></html>\n";
    let path = support::build_war(
        dir.path(),
        "shop.war",
        &[("index", payload), ("WEB-INF/web.xml", b"<web-app/>")],
    );

    let artifact = locate(&path).unwrap();
    assert_eq!(peek_entry(&artifact, "index").unwrap(), payload);
    assert_eq!(
        peek_entry(&artifact, "WEB-INF/web.xml").unwrap(),
        b"<web-app/>"
    );
}

#[test]
fn absent_entry_is_entry_not_found() {
    let dir = TempDir::new().unwrap();
    let path = support::sample_war(dir.path(), "shop.war");
    let artifact = locate(&path).unwrap();

    let err = peek_entry(&artifact, "META-INF/missing.txt").unwrap_err();
    assert_eq!(err.kind(), FailureKind::EntryNotFound);
    assert!(err.to_string().contains("META-INF/missing.txt"));
}

#[test]
fn non_zip_file_is_invalid_archive() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shop.war");
    fs::write(&path, b"definitely not a zip file").unwrap();

    let artifact = locate(&path).unwrap();
    let err = peek_entry(&artifact, "index.html").unwrap_err();
    assert_eq!(err.kind(), FailureKind::InvalidArchive);
}

#[test]
fn vanished_artifact_is_missing_on_peek() {
    let dir = TempDir::new().unwrap();
    let path = support::sample_war(dir.path(), "shop.war");
    let artifact = locate(&path).unwrap();

    fs::remove_file(&path).unwrap();

    let err = peek_entry(&artifact, "index.html").unwrap_err();
    assert!(matches!(err, ArtifactError::Missing { .. }));
}

/// Overwrite every uncompressed-size field of a single-entry archive.
fn forge_uncompressed_size(path: &std::path::Path, size: u32) {
    let mut bytes = fs::read(path).unwrap();
    let patch = |bytes: &mut Vec<u8>, signature: &[u8], offset: usize| {
        let at = bytes
            .windows(4)
            .position(|w| w == signature)
            .expect("header signature");
        bytes[at + offset..at + offset + 4].copy_from_slice(&size.to_le_bytes());
    };
    patch(&mut bytes, b"PK\x03\x04", 22);
    patch(&mut bytes, b"PK\x01\x02", 24);
    fs::write(path, bytes).unwrap();
}

/// Single uncompressed `index.html` entry, so its bytes appear verbatim in the file.
fn stored_war(dir: &std::path::Path, data: &[u8]) -> std::path::PathBuf {
    use std::io::Write;

    let path = dir.join("shop.war");
    let mut writer = zip::ZipWriter::new(fs::File::create(&path).unwrap());
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    writer.start_file("index.html", options).unwrap();
    writer.write_all(data).unwrap();
    writer.finish().unwrap();
    path
}

#[test]
fn header_size_is_not_trusted_when_reading_an_entry() {
    let dir = TempDir::new().unwrap();
    let path = stored_war(dir.path(), b"<h1>shop</h1>");
    forge_uncompressed_size(&path, 0xFFFF_FFF0);

    let artifact = locate(&path).unwrap();
    match peek_entry(&artifact, "index.html") {
        Ok(bytes) => assert_eq!(bytes, b"<h1>shop</h1>"),
        Err(err) => assert_eq!(err.kind(), FailureKind::InvalidArchive, "{err}"),
    }
}

#[test]
fn corrupt_entry_data_is_invalid_archive() {
    let dir = TempDir::new().unwrap();
    let path = stored_war(dir.path(), b"<h1>shop</h1>");
    let mut bytes = fs::read(&path).unwrap();
    let at = bytes
        .windows(13)
        .position(|w| w == b"<h1>shop</h1>")
        .unwrap();
    bytes[at..at + 13].copy_from_slice(b"<h1>SHOP</h1>");
    fs::write(&path, bytes).unwrap();

    let artifact = locate(&path).unwrap();
    let err = peek_entry(&artifact, "index.html").unwrap_err();
    assert_eq!(err.kind(), FailureKind::InvalidArchive, "{err}");
}
