//! CSV output format for session snapshots
//!
//! One row per record across every category, for spreadsheet analysis.
//! Columns not used by a category are left empty.

use crate::record::SensorRecord;
use crate::snapshot::{Category, Snapshot};

const HEADER: [&str; 13] = [
    "category",
    "time",
    "hfr",
    "eccentricity",
    "ra",
    "dec",
    "azimuth",
    "altitude",
    "pier_side",
    "ra_error",
    "dec_error",
    "total_error",
    "value",
];

/// CSV output formatter
#[derive(Debug)]
pub struct CsvOutput {
    records: Vec<SensorRecord>,
}

impl CsvOutput {
    /// Formatter pre-filled with every record of a snapshot, category by category
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut records = Vec::new();
        for category in Category::ALL {
            records.extend(snapshot.records(category));
        }
        Self { records }
    }

    /// Generate CSV header row
    fn header() -> String {
        HEADER.join(",")
    }

    /// Escape CSV field (handle commas, quotes, newlines)
    fn escape_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    /// Format a record as CSV row
    fn format_record(record: &SensorRecord) -> String {
        let mut fields = vec![String::new(); HEADER.len()];
        fields[0] = record.category().name().to_string();
        fields[1] = Self::escape_field(record.time());

        match record {
            SensorRecord::Capture(r) => {
                fields[2] = r.hfr.to_string();
                fields[3] = r.eccentricity.to_string();
            }
            SensorRecord::Mount(r) => {
                fields[4] = r.ra.to_string();
                fields[5] = r.dec.to_string();
                fields[6] = r.azimuth.to_string();
                fields[7] = r.altitude.to_string();
                fields[8] = r.pier_side.to_string();
            }
            SensorRecord::Guiding(r) => {
                fields[9] = r.ra_error.to_string();
                fields[10] = r.dec_error.to_string();
                fields[11] = r.total_error.to_string();
            }
            SensorRecord::Temperature(r) | SensorRecord::Humidity(r) => {
                fields[12] = r.value.to_string();
            }
        }

        fields.join(",")
    }

    /// Generate CSV output as string
    pub fn to_csv(&self) -> String {
        let mut output = String::new();

        output.push_str(&Self::header());
        output.push('\n');

        for record in &self.records {
            output.push_str(&Self::format_record(record));
            output.push('\n');
        }

        output
    }
}
