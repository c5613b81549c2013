//! Typed session log records
//!
//! Each line of a session log starts with a record-type tag. [`RecordTag`] is
//! the closed set of tags this crate understands; [`SensorRecord`] holds a
//! decoded reading together with its resolved wall-clock time.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Record-type tags recognized in a session log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordTag {
    AnalyzeStartTime,
    Temperature,
    Humidity,
    CaptureComplete,
    MountCoords,
    GuideStats,
}

impl RecordTag {
    /// Look up a tag by its exact (case-sensitive) spelling
    ///
    /// Returns `None` for tags written by newer loggers; callers skip those.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "AnalyzeStartTime" => Some(RecordTag::AnalyzeStartTime),
            "Temperature" => Some(RecordTag::Temperature),
            "Humidity" => Some(RecordTag::Humidity),
            "CaptureComplete" => Some(RecordTag::CaptureComplete),
            "MountCoords" => Some(RecordTag::MountCoords),
            "GuideStats" => Some(RecordTag::GuideStats),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordTag::AnalyzeStartTime => "AnalyzeStartTime",
            RecordTag::Temperature => "Temperature",
            RecordTag::Humidity => "Humidity",
            RecordTag::CaptureComplete => "CaptureComplete",
            RecordTag::MountCoords => "MountCoords",
            RecordTag::GuideStats => "GuideStats",
        }
    }
}

impl fmt::Display for RecordTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side of the pier the mount's optical tube is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PierSide {
    #[serde(rename = "W")]
    West,
    #[serde(rename = "E")]
    East,
}

impl PierSide {
    /// Derive the side from the logger's numeric flag
    ///
    /// Exactly zero is west; every other value, negative included, is east.
    pub fn from_flag(flag: f64) -> Self {
        if flag == 0.0 {
            PierSide::West
        } else {
            PierSide::East
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PierSide::West => "W",
            PierSide::East => "E",
        }
    }
}

impl fmt::Display for PierSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completed exposure quality metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureRecord {
    pub time: String,
    /// Star half-flux radius
    pub hfr: f64,
    pub eccentricity: f64,
}

/// Mount pointing, in the logger's units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MountRecord {
    pub time: String,
    pub ra: f64,
    pub dec: f64,
    pub azimuth: f64,
    pub altitude: f64,
    pub pier_side: PierSide,
}

/// Autoguiding error sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideRecord {
    pub time: String,
    pub ra_error: f64,
    pub dec_error: f64,
    pub total_error: f64,
}

impl GuideRecord {
    /// Build a guide sample, rounding each axis before combining them
    ///
    /// The total is the norm of the rounded components, rounded again.
    pub fn new(time: String, ra_error: f64, dec_error: f64) -> Self {
        let ra_error = round_to(ra_error, 2);
        let dec_error = round_to(dec_error, 2);
        let total_error = round_to(ra_error.hypot(dec_error), 2);
        Self {
            time,
            ra_error,
            dec_error,
            total_error,
        }
    }
}

/// Single-valued environmental reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarRecord {
    pub time: String,
    pub value: f64,
}

/// A decoded, timestamped sensor reading
#[derive(Debug, Clone, PartialEq)]
pub enum SensorRecord {
    Capture(CaptureRecord),
    Mount(MountRecord),
    Guiding(GuideRecord),
    Temperature(ScalarRecord),
    Humidity(ScalarRecord),
}

impl SensorRecord {
    pub fn time(&self) -> &str {
        match self {
            SensorRecord::Capture(r) => &r.time,
            SensorRecord::Mount(r) => &r.time,
            SensorRecord::Guiding(r) => &r.time,
            SensorRecord::Temperature(r) | SensorRecord::Humidity(r) => &r.time,
        }
    }
}

/// Round half away from zero to `places` decimal places
///
/// Rounding works on the binary value, so a decimal half that is not exactly
/// representable rounds by its nearest `f64`: `1.005` is stored just below
/// the half and becomes `1.0` at two places. Values too large to scale are
/// returned unchanged.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

/// Parse a finite numeric field, attributing failures to `field`
///
/// `NaN` and infinities are rejected; they cannot be written to JSON.
pub(crate) fn parse_number(field: &'static str, raw: Option<&str>) -> Result<f64, ParseError> {
    let raw = raw.ok_or_else(|| ParseError::missing(field))?;
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ParseError::MalformedField {
            field,
            value: raw.to_string(),
        }),
    }
}

impl fmt::Display for CaptureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HFR {:.2}, eccentricity {:.2} at {}",
            self.hfr, self.eccentricity, self.time
        )
    }
}

impl fmt::Display for MountRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RA {:.2}, Dec {:.2}, Az {:.2}, Alt {:.2}, pier {} at {}",
            self.ra, self.dec, self.azimuth, self.altitude, self.pier_side, self.time
        )
    }
}

impl fmt::Display for GuideRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RA {:.2}\", Dec {:.2}\", total {:.2}\" at {}",
            self.ra_error, self.dec_error, self.total_error, self.time
        )
    }
}

impl fmt::Display for ScalarRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} at {}", self.value, self.time)
    }
}
