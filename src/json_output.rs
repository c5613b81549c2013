//! JSON output format for session snapshots
//!
//! Wraps a [`Snapshot`] in a small versioned envelope for upload/query
//! consumers. The snapshot itself round-trips through the envelope unchanged.

use crate::parser::PassReport;
use crate::snapshot::Snapshot;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Format name written into every envelope
pub const FORMAT_NAME: &str = "skysnap-json-v1";

/// Pass statistics carried alongside the snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonSummary {
    /// Lines read from the session log
    pub lines_read: usize,
    /// Records folded into the snapshot
    pub records: usize,
    /// Lines that failed to decode
    pub errors: usize,
}

impl From<&PassReport> for JsonSummary {
    fn from(report: &PassReport) -> Self {
        Self {
            lines_read: report.lines_read,
            records: report.records_decoded,
            errors: report.errors.len(),
        }
    }
}

/// Root JSON output structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOutput {
    /// Format version identifier
    pub version: String,
    /// Format name
    pub format: String,
    /// Local time the envelope was produced
    pub generated: String,
    /// Session log the snapshot came from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub summary: JsonSummary,
    pub snapshot: Snapshot,
}

impl JsonOutput {
    /// Create a new JSON output structure around a snapshot
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: FORMAT_NAME.to_string(),
            generated: chrono::Local::now().to_rfc3339(),
            source: None,
            summary: JsonSummary::default(),
            snapshot,
        }
    }

    pub fn with_source(mut self, source: impl AsRef<Path>) -> Self {
        self.source = Some(source.as_ref().display().to_string());
        self
    }

    pub fn with_report(mut self, report: &PassReport) -> Self {
        self.summary = JsonSummary::from(report);
        self
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse an envelope previously written by [`Self::to_json`]
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let output: JsonOutput =
            serde_json::from_str(json).context("Failed to parse snapshot JSON")?;
        if output.format != FORMAT_NAME {
            anyhow::bail!(
                "Unsupported snapshot format {:?} (expected {:?})",
                output.format,
                FORMAT_NAME
            );
        }
        Ok(output)
    }

    /// Write the envelope to `path`
    ///
    /// Written to a sibling temp file first and renamed into place, so a
    /// reader polling `path` never sees a half-written document.
    pub fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        let json = self.to_json()?;
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");

        fs::write(&tmp, json).with_context(|| {
            format!(
                "Failed to write snapshot to {}",
                Path::new(&tmp).display()
            )
        })?;
        fs::rename(&tmp, path)
            .with_context(|| format!("Failed to move snapshot into {}", path.display()))?;
        Ok(())
    }

    /// Read an envelope from `path`
    pub fn read_from(path: &Path) -> anyhow::Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        Self::from_json(&json)
    }
}
