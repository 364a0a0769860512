// ABOUTME: Inspect command implementation.
// ABOUTME: Locates the artifact and prints one archive entry to stdout.

use std::io::Write;
use std::path::Path;

use warship::artifact;
use warship::error::Result;
use warship::output::{Output, OutputMode};

pub fn inspect(path: &Path, entry: &str, output: Output) -> Result<()> {
    let found = artifact::locate(path)?;
    let bytes = artifact::peek_entry(&found, entry)?;

    match output.mode() {
        OutputMode::Json => {
            let event = serde_json::json!({
                "event": "entry",
                "artifact": found,
                "entry": entry,
                "size": bytes.len(),
                "content": String::from_utf8_lossy(&bytes),
            });
            println!("{}", serde_json::to_string(&event)?);
        }
        OutputMode::Normal | OutputMode::Quiet => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
