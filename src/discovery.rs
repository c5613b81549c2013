//! Session log discovery
//!
//! Imaging software starts a new log file for every session. The snapshot
//! always follows the most recently modified one.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Newest regular file in `dir` whose extension is `extension`
///
/// Ties on modification time go to the lexically greatest name. Returns
/// `Ok(None)` when nothing matches.
pub fn latest_session_file(dir: &Path, extension: &str) -> Result<Option<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to list session directory {}", dir.display()))?;

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }

        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let mtime = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        let is_newer = match &newest {
            None => true,
            Some((best_time, best_path)) => (mtime, &path) > (*best_time, best_path),
        };
        if is_newer {
            newest = Some((mtime, path));
        }
    }

    tracing::debug!(
        dir = %dir.display(),
        found = ?newest.as_ref().map(|(_, p)| p),
        "session discovery"
    );
    Ok(newest.map(|(_, path)| path))
}
