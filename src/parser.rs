//! Session log parser and rolling aggregator
//!
//! [`SessionParser`] owns the session clock and the current [`Snapshot`].
//! A pass feeds every line of one session log through [`SessionParser::decode_line`]:
//!
//! ```text
//! raw line -> RecordTag -> typed decode -> clock.resolve(offset) -> Snapshot::insert
//! ```
//!
//! Decoding errors are local to a line. The pass records them and keeps
//! going so a single corrupt line never loses the rest of the session.
//!
//! # Example
//!
//! ```
//! use skysnap::parser::SessionParser;
//! use skysnap::sink::NullSink;
//!
//! let log = "AnalyzeStartTime,2024-01-05 20:00:00.000000\nGuideStats,12,0.3,0.4\n";
//! let mut parser = SessionParser::new();
//! let report = parser.parse_session(Some(log.lines()), &mut NullSink);
//!
//! assert_eq!(report.records_decoded, 1);
//! assert_eq!(parser.snapshot().guiding().last().unwrap().total_error, 0.5);
//! ```

use crate::clock::SessionClock;
use crate::error::ParseError;
use crate::record::{
    parse_number, round_to, CaptureRecord, GuideRecord, MountRecord, PierSide, RecordTag,
    ScalarRecord, SensorRecord,
};
use crate::sink::LogSink;
use crate::snapshot::{Category, Snapshot};
use crate::summary;
use std::borrow::Cow;
use std::io::BufRead;
use tracing::debug;

/// Notice emitted when a pass has nothing to read
pub const NO_SESSION_NOTICE: &str = "no session file found";

/// Field delimiter of the session log
const DELIMITER: char = ',';

/// Result of decoding a single line
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// The session clock was re-anchored
    StartTime,
    /// A sensor record was appended to the snapshot
    Record(SensorRecord),
    /// Unrecognized tag, nothing changed
    Ignored,
}

/// A line that failed to decode during a pass
#[derive(Debug, Clone, PartialEq)]
pub struct LineError {
    /// 1-based line number within the source
    pub line_number: usize,
    pub error: ParseError,
}

/// Counters for one parse pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassReport {
    pub lines_read: usize,
    pub records_decoded: usize,
    pub start_markers: usize,
    pub lines_ignored: usize,
    pub errors: Vec<LineError>,
}

impl PassReport {
    /// True when the pass had no lines at all
    pub fn is_empty_pass(&self) -> bool {
        self.lines_read == 0
    }
}

/// Session parser owning the clock and the rolling snapshot
#[derive(Debug, Clone)]
pub struct SessionParser {
    clock: SessionClock,
    snapshot: Snapshot,
    summary: bool,
}

impl SessionParser {
    /// Parser whose clock defaults to the current local time until a start line is seen
    pub fn new() -> Self {
        Self::with_clock(SessionClock::now())
    }

    pub fn with_clock(clock: SessionClock) -> Self {
        Self {
            clock,
            snapshot: Snapshot::new(),
            summary: true,
        }
    }

    /// Enable or disable the end-of-pass category summary
    pub fn with_summary(mut self, summary: bool) -> Self {
        self.summary = summary;
        self
    }

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    /// Re-anchor the session clock from an `AnalyzeStartTime` payload
    pub fn set_start_time(&mut self, raw: &str) -> Result<(), ParseError> {
        self.clock.set_start(raw)
    }

    /// Offset in seconds resolved against the session start, as `HH:MM:SS DD-MM-YYYY`
    pub fn resolve_time(&self, offset: &str) -> Result<String, ParseError> {
        self.clock.resolve(offset)
    }

    /// Decode one raw line and fold it into the snapshot
    pub fn decode_line(&mut self, raw: &str) -> Result<LineOutcome, ParseError> {
        let mut fields = raw.split(DELIMITER).map(str::trim);
        let Some(tag) = fields.next().and_then(RecordTag::parse) else {
            return Ok(LineOutcome::Ignored);
        };
        let fields: Vec<&str> = fields.collect();

        let record = match tag {
            RecordTag::AnalyzeStartTime => {
                let raw_start = fields.first().copied().unwrap_or_default();
                self.set_start_time(raw_start)?;
                debug!(start = %self.clock.start(), "session clock anchored");
                return Ok(LineOutcome::StartTime);
            }
            RecordTag::Temperature => {
                SensorRecord::Temperature(self.decode_scalar(&fields, "temperature")?)
            }
            RecordTag::Humidity => {
                SensorRecord::Humidity(self.decode_scalar(&fields, "humidity")?)
            }
            RecordTag::CaptureComplete => SensorRecord::Capture(self.decode_capture(&fields)?),
            RecordTag::MountCoords => SensorRecord::Mount(self.decode_mount(&fields)?),
            RecordTag::GuideStats => SensorRecord::Guiding(self.decode_guide(&fields)?),
        };

        debug!(%tag, category = %record.category(), time = record.time(), "record decoded");
        self.snapshot.insert(record.clone());
        Ok(LineOutcome::Record(record))
    }

    fn time_of(&self, fields: &[&str]) -> Result<String, ParseError> {
        let offset = fields
            .first()
            .ok_or_else(|| ParseError::MalformedOffset(String::new()))?;
        self.clock.resolve(offset)
    }

    /// `<offset>,<value>`
    fn decode_scalar(
        &self,
        fields: &[&str],
        field: &'static str,
    ) -> Result<ScalarRecord, ParseError> {
        let time = self.time_of(fields)?;
        let value = parse_number(field, fields.get(1).copied())?;
        Ok(ScalarRecord {
            time,
            value: round_to(value, 1),
        })
    }

    /// `<offset>,_,_,<hfr>,_,_,_,<ecc>`
    fn decode_capture(&self, fields: &[&str]) -> Result<CaptureRecord, ParseError> {
        let time = self.time_of(fields)?;
        let hfr = parse_number("hfr", fields.get(3).copied())?;
        let eccentricity = parse_number("eccentricity", fields.get(7).copied())?;
        Ok(CaptureRecord {
            time,
            hfr: round_to(hfr, 2),
            eccentricity: round_to(eccentricity, 2),
        })
    }

    /// `<offset>,<ra>,<dec>,<azi>,<alt>,<pierFlag>`
    fn decode_mount(&self, fields: &[&str]) -> Result<MountRecord, ParseError> {
        let time = self.time_of(fields)?;
        let ra = parse_number("ra", fields.get(1).copied())?;
        let dec = parse_number("dec", fields.get(2).copied())?;
        let azimuth = parse_number("azimuth", fields.get(3).copied())?;
        let altitude = parse_number("altitude", fields.get(4).copied())?;
        let pier_flag = parse_number("pier side", fields.get(5).copied())?;
        Ok(MountRecord {
            time,
            ra: round_to(ra, 2),
            dec: round_to(dec, 2),
            azimuth: round_to(azimuth, 2),
            altitude: round_to(altitude, 2),
            pier_side: PierSide::from_flag(pier_flag),
        })
    }

    /// `<offset>,<raErr>,<decErr>`
    fn decode_guide(&self, fields: &[&str]) -> Result<GuideRecord, ParseError> {
        let time = self.time_of(fields)?;
        let ra_error = parse_number("ra error", fields.get(1).copied())?;
        let dec_error = parse_number("dec error", fields.get(2).copied())?;
        let record = GuideRecord::new(time, ra_error, dec_error);
        if !record.total_error.is_finite() {
            return Err(ParseError::MalformedField {
                field: "total error",
                value: format!("{},{}", fields[1], fields[2]),
            });
        }
        Ok(record)
    }

    /// Run one pass over a line source
    ///
    /// Blank lines are skipped. A line that fails to decode is logged and
    /// recorded in the report; the pass continues with the next line. An
    /// absent or empty source produces a single [`NO_SESSION_NOTICE`].
    ///
    /// The snapshot is not reset here; call [`Self::reset_snapshot`] between passes.
    pub fn parse_session<I, S>(&mut self, lines: Option<I>, sink: &mut dyn LogSink) -> PassReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = PassReport::default();

        if let Some(lines) = lines {
            for line in lines {
                report.lines_read += 1;
                self.apply_line(line.as_ref(), report.lines_read, &mut report, sink);
            }
        }

        self.finish_pass(&report, sink);
        report
    }

    /// Run one pass over a buffered reader
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD, so a damaged
    /// line fails on its own and the pass continues. An I/O error ends the
    /// pass early and is returned; lines decoded before it stay in the snapshot.
    pub fn parse_reader<R: BufRead>(
        &mut self,
        mut reader: R,
        sink: &mut dyn LogSink,
    ) -> std::io::Result<PassReport> {
        let mut report = PassReport::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            report.lines_read += 1;

            let text = String::from_utf8_lossy(&buf);
            if let Cow::Owned(_) = text {
                debug!(line = report.lines_read, "invalid UTF-8 replaced");
            }
            let line = text.trim_end_matches(['\n', '\r']);
            self.apply_line(line, report.lines_read, &mut report, sink);
        }

        self.finish_pass(&report, sink);
        Ok(report)
    }

    fn apply_line(
        &mut self,
        line: &str,
        line_number: usize,
        report: &mut PassReport,
        sink: &mut dyn LogSink,
    ) {
        if line.trim().is_empty() {
            return;
        }

        match self.decode_line(line) {
            Ok(LineOutcome::Record(_)) => report.records_decoded += 1,
            Ok(LineOutcome::StartTime) => report.start_markers += 1,
            Ok(LineOutcome::Ignored) => report.lines_ignored += 1,
            Err(error) => {
                debug!(line = line_number, %error, "skipping malformed session line");
                sink.log(&format!("line {}: {}", line_number, error));
                report.errors.push(LineError { line_number, error });
            }
        }
    }

    fn finish_pass(&self, report: &PassReport, sink: &mut dyn LogSink) {
        if report.is_empty_pass() {
            sink.log(NO_SESSION_NOTICE);
            return;
        }

        debug!(
            lines = report.lines_read,
            records = report.records_decoded,
            errors = report.errors.len(),
            "session pass complete"
        );

        for category in Category::ALL {
            let stats = self.snapshot.stats(category);
            if stats.total_evicted > 0 {
                debug!(
                    %category,
                    evicted = stats.total_evicted,
                    eviction_rate = stats.eviction_rate(),
                    "retention applied"
                );
            }
        }

        if self.summary {
            for line in summary::summary_lines(&self.snapshot) {
                sink.log(&line);
            }
        }
    }

    /// Current aggregate; consistent at any point between line decodes
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Empty every category; the session clock is left as is
    pub fn reset_snapshot(&mut self) {
        self.snapshot.reset();
    }
}

impl Default for SessionParser {
    fn default() -> Self {
        Self::new()
    }
}
