//! End-of-pass summaries
//!
//! One line per non-empty category describing its newest record.

use crate::record::SensorRecord;
use crate::snapshot::{Category, Snapshot};

/// Display label for a category
pub fn label(category: Category) -> &'static str {
    match category {
        Category::Capture => "Capture",
        Category::Mount => "Mount",
        Category::Guiding => "Guiding",
        Category::Temperature => "Temperature",
        Category::Humidity => "Humidity",
    }
}

/// `Label: <newest record>` for a single record
pub fn describe(record: &SensorRecord) -> String {
    let body = match record {
        SensorRecord::Capture(r) => r.to_string(),
        SensorRecord::Mount(r) => r.to_string(),
        SensorRecord::Guiding(r) => r.to_string(),
        SensorRecord::Temperature(r) => format!("{:.1} °C at {}", r.value, r.time),
        SensorRecord::Humidity(r) => format!("{:.1}% at {}", r.value, r.time),
    };
    format!("{}: {}", label(record.category()), body)
}

/// Summary lines in serialization order, skipping empty categories
pub fn summary_lines(snapshot: &Snapshot) -> Vec<String> {
    Category::ALL
        .iter()
        .filter_map(|c| snapshot.latest(*c))
        .map(|record| describe(&record))
        .collect()
}
