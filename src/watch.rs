//! Snapshot passes over a session log source
//!
//! A pass resolves the current session log, clears the previous snapshot and
//! parses the log from the beginning. Re-parsing the whole file each time keeps
//! the snapshot a pure function of the file contents.

use crate::discovery::latest_session_file;
use crate::parser::{PassReport, SessionParser};
use crate::sink::LogSink;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::PathBuf;

/// Where each pass reads its session log from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSource {
    /// A fixed log file
    File(PathBuf),
    /// The newest file with `extension` in `dir`, re-resolved every pass
    Directory { dir: PathBuf, extension: String },
}

impl SessionSource {
    /// Log file for the current pass, `None` when there is none yet
    pub fn resolve(&self) -> Result<Option<PathBuf>> {
        match self {
            SessionSource::File(path) => Ok(path.is_file().then(|| path.clone())),
            SessionSource::Directory { dir, extension } => latest_session_file(dir, extension),
        }
    }
}

/// Outcome of one pass
#[derive(Debug, Clone)]
pub struct PassOutcome {
    /// Log that was parsed, `None` for an empty pass
    pub path: Option<PathBuf>,
    pub report: PassReport,
}

/// Reset the snapshot and parse the current session log into it
pub fn run_pass(
    parser: &mut SessionParser,
    source: &SessionSource,
    sink: &mut dyn LogSink,
) -> Result<PassOutcome> {
    parser.reset_snapshot();

    let Some(path) = source.resolve()? else {
        let report = parser.parse_session(None::<Vec<String>>, sink);
        return Ok(PassOutcome { path: None, report });
    };

    let file = match File::open(&path) {
        Ok(file) => file,
        // Rotated away between resolve and open
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let report = parser.parse_session(None::<Vec<String>>, sink);
            return Ok(PassOutcome { path: None, report });
        }
        Err(e) => {
            let context = format!("Failed to open {}", path.display());
            return Err(anyhow::Error::from(e).context(context));
        }
    };

    tracing::debug!(path = %path.display(), "parsing session log");
    let report = parser
        .parse_reader(BufReader::new(file), sink)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    Ok(PassOutcome {
        path: Some(path),
        report,
    })
}
