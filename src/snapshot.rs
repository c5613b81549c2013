//! Rolling per-category snapshot of the latest sensor readings
//!
//! A [`Snapshot`] is what a parse pass produces and what gets handed to
//! upload/query consumers. It serializes to
//! `{capture, mount, guiding, temperature, humidity}` arrays and
//! deserializes back with retention re-applied.

use crate::record::{CaptureRecord, GuideRecord, MountRecord, ScalarRecord, SensorRecord};
use crate::ring_buffer::{BufferStats, RingBuffer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Records kept for the mount category
pub const MOUNT_RETENTION: usize = 1;

/// Records kept for the guiding category
pub const GUIDING_RETENTION: usize = 200;

/// The five independently retained sensor categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Capture,
    Mount,
    Guiding,
    Temperature,
    Humidity,
}

impl Category {
    /// Serialization order
    pub const ALL: [Category; 5] = [
        Category::Capture,
        Category::Mount,
        Category::Guiding,
        Category::Temperature,
        Category::Humidity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Capture => "capture",
            Category::Mount => "mount",
            Category::Guiding => "guiding",
            Category::Temperature => "temperature",
            Category::Humidity => "humidity",
        }
    }

    /// Maximum records retained, `None` for unbounded
    pub fn retention(&self) -> Option<usize> {
        match self {
            Category::Mount => Some(MOUNT_RETENTION),
            Category::Guiding => Some(GUIDING_RETENTION),
            Category::Capture | Category::Temperature | Category::Humidity => None,
        }
    }

    fn buffer<T>(&self) -> RingBuffer<T> {
        match self.retention() {
            Some(capacity) => RingBuffer::bounded(capacity),
            None => RingBuffer::unbounded(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl SensorRecord {
    pub fn category(&self) -> Category {
        match self {
            SensorRecord::Capture(_) => Category::Capture,
            SensorRecord::Mount(_) => Category::Mount,
            SensorRecord::Guiding(_) => Category::Guiding,
            SensorRecord::Temperature(_) => Category::Temperature,
            SensorRecord::Humidity(_) => Category::Humidity,
        }
    }
}

/// Latest readings per category, oldest first within each
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SnapshotWire")]
pub struct Snapshot {
    capture: RingBuffer<CaptureRecord>,
    mount: RingBuffer<MountRecord>,
    guiding: RingBuffer<GuideRecord>,
    temperature: RingBuffer<ScalarRecord>,
    humidity: RingBuffer<ScalarRecord>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self {
            capture: Category::Capture.buffer(),
            mount: Category::Mount.buffer(),
            guiding: Category::Guiding.buffer(),
            temperature: Category::Temperature.buffer(),
            humidity: Category::Humidity.buffer(),
        }
    }

    /// Append a record to its category, evicting per the retention rule
    pub fn insert(&mut self, record: SensorRecord) {
        match record {
            SensorRecord::Capture(r) => {
                self.capture.push(r);
            }
            SensorRecord::Mount(r) => {
                self.mount.push(r);
            }
            SensorRecord::Guiding(r) => {
                self.guiding.push(r);
            }
            SensorRecord::Temperature(r) => {
                self.temperature.push(r);
            }
            SensorRecord::Humidity(r) => {
                self.humidity.push(r);
            }
        }
    }

    /// Empty every category
    pub fn reset(&mut self) {
        self.capture.clear();
        self.mount.clear();
        self.guiding.clear();
        self.temperature.clear();
        self.humidity.clear();
    }

    pub fn capture(&self) -> &RingBuffer<CaptureRecord> {
        &self.capture
    }

    pub fn mount(&self) -> &RingBuffer<MountRecord> {
        &self.mount
    }

    pub fn guiding(&self) -> &RingBuffer<GuideRecord> {
        &self.guiding
    }

    pub fn temperature(&self) -> &RingBuffer<ScalarRecord> {
        &self.temperature
    }

    pub fn humidity(&self) -> &RingBuffer<ScalarRecord> {
        &self.humidity
    }

    pub fn len(&self, category: Category) -> usize {
        self.stats(category).current_size
    }

    /// True when every category is empty
    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.len(*c) == 0)
    }

    pub fn stats(&self, category: Category) -> BufferStats {
        match category {
            Category::Capture => self.capture.stats(),
            Category::Mount => self.mount.stats(),
            Category::Guiding => self.guiding.stats(),
            Category::Temperature => self.temperature.stats(),
            Category::Humidity => self.humidity.stats(),
        }
    }

    /// Newest record of a category
    pub fn latest(&self, category: Category) -> Option<SensorRecord> {
        match category {
            Category::Capture => self.capture.last().cloned().map(SensorRecord::Capture),
            Category::Mount => self.mount.last().cloned().map(SensorRecord::Mount),
            Category::Guiding => self.guiding.last().cloned().map(SensorRecord::Guiding),
            Category::Temperature => self
                .temperature
                .last()
                .cloned()
                .map(SensorRecord::Temperature),
            Category::Humidity => self.humidity.last().cloned().map(SensorRecord::Humidity),
        }
    }

    /// All records of a category as tagged values, oldest first
    pub fn records(&self, category: Category) -> Vec<SensorRecord> {
        match category {
            Category::Capture => self.capture.iter().cloned().map(SensorRecord::Capture).collect(),
            Category::Mount => self.mount.iter().cloned().map(SensorRecord::Mount).collect(),
            Category::Guiding => self.guiding.iter().cloned().map(SensorRecord::Guiding).collect(),
            Category::Temperature => self
                .temperature
                .iter()
                .cloned()
                .map(SensorRecord::Temperature)
                .collect(),
            Category::Humidity => self
                .humidity
                .iter()
                .cloned()
                .map(SensorRecord::Humidity)
                .collect(),
        }
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// Deserialization form; missing categories read as empty
#[derive(Deserialize, Default)]
#[serde(default)]
struct SnapshotWire {
    capture: Vec<CaptureRecord>,
    mount: Vec<MountRecord>,
    guiding: Vec<GuideRecord>,
    temperature: Vec<ScalarRecord>,
    humidity: Vec<ScalarRecord>,
}

impl From<SnapshotWire> for Snapshot {
    fn from(wire: SnapshotWire) -> Self {
        let mut snapshot = Snapshot::new();
        snapshot.capture.extend(wire.capture);
        snapshot.mount.extend(wire.mount);
        snapshot.guiding.extend(wire.guiding);
        snapshot.temperature.extend(wire.temperature);
        snapshot.humidity.extend(wire.humidity);
        snapshot
    }
}
