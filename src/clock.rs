//! Session clock
//!
//! Session logs stamp every reading with seconds elapsed since the session
//! start. The clock holds that start instant and turns offsets back into
//! wall-clock timestamps.

use crate::error::ParseError;
use chrono::{Local, NaiveDateTime, TimeDelta};

/// Format of the `AnalyzeStartTime` payload (fractional seconds optional)
pub const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Format of every resolved record timestamp
pub const RECORD_TIME_FORMAT: &str = "%H:%M:%S %d-%m-%Y";

/// Absolute start instant of the session currently being parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClock {
    start: NaiveDateTime,
}

impl SessionClock {
    /// Clock anchored at an explicit instant
    pub fn new(start: NaiveDateTime) -> Self {
        Self { start }
    }

    /// Clock anchored at the current local time
    ///
    /// Used until the log declares its own start.
    pub fn now() -> Self {
        Self::new(Local::now().naive_local())
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Re-anchor the clock from a raw `YYYY-MM-DD HH:MM:SS.ffffff` string
    pub fn set_start(&mut self, raw: &str) -> Result<(), ParseError> {
        let raw = raw.trim();
        self.start = NaiveDateTime::parse_from_str(raw, START_TIME_FORMAT)
            .map_err(|_| ParseError::MalformedTimestamp(raw.to_string()))?;
        Ok(())
    }

    /// Absolute instant for an offset in seconds
    ///
    /// Offsets are kept to microsecond precision.
    pub fn instant_at(&self, offset: &str) -> Result<NaiveDateTime, ParseError> {
        let raw = offset.trim();
        let seconds: f64 = raw
            .parse()
            .map_err(|_| ParseError::MalformedOffset(raw.to_string()))?;
        if !seconds.is_finite() {
            return Err(ParseError::MalformedOffset(raw.to_string()));
        }

        let micros = (seconds * 1_000_000.0).round();
        if micros.abs() > i64::MAX as f64 {
            return Err(ParseError::MalformedOffset(raw.to_string()));
        }

        self.start
            .checked_add_signed(TimeDelta::microseconds(micros as i64))
            .ok_or_else(|| ParseError::MalformedOffset(raw.to_string()))
    }

    /// Offset resolved and formatted as `HH:MM:SS DD-MM-YYYY`
    pub fn resolve(&self, offset: &str) -> Result<String, ParseError> {
        Ok(format_instant(self.instant_at(offset)?))
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::now()
    }
}

/// Render an instant in the record timestamp format
pub fn format_instant(instant: NaiveDateTime) -> String {
    instant.format(RECORD_TIME_FORMAT).to_string()
}
