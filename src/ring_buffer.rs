//! Bounded FIFO retention for sensor categories
//!
//! Categories such as guiding keep only the most recent N readings. The ring
//! buffer makes that bound part of the collection itself: once full, every
//! push evicts the oldest element in O(1).
//!
//! ```text
//! capacity 3:   [a b c]  push(d)  ->  [b c d]   (a evicted)
//! ```

use serde::{Serialize, Serializer};
use std::collections::vec_deque::{self, VecDeque};

/// FIFO collection with an optional capacity bound
///
/// # Example
///
/// ```
/// use skysnap::ring_buffer::RingBuffer;
///
/// let mut buffer = RingBuffer::bounded(2);
/// buffer.push(1);
/// buffer.push(2);
/// assert_eq!(buffer.push(3), Some(1));
/// assert_eq!(buffer.iter().copied().collect::<Vec<_>>(), vec![2, 3]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,

    /// `None` keeps every element
    capacity: Option<usize>,

    /// Metrics: total elements pushed
    total_pushed: u64,

    /// Metrics: total elements evicted to honor the bound
    total_evicted: u64,
}

impl<T> RingBuffer<T> {
    /// Create a buffer holding at most `capacity` elements
    ///
    /// # Panics
    ///
    /// Panics if capacity is 0.
    pub fn bounded(capacity: usize) -> Self {
        assert!(capacity > 0, "Ring buffer capacity must be > 0");
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity: Some(capacity),
            total_pushed: 0,
            total_evicted: 0,
        }
    }

    /// Create a buffer that never evicts
    pub fn unbounded() -> Self {
        Self {
            items: VecDeque::new(),
            capacity: None,
            total_pushed: 0,
            total_evicted: 0,
        }
    }

    /// Append `item`, returning the evicted oldest element if the bound was hit
    pub fn push(&mut self, item: T) -> Option<T> {
        self.total_pushed += 1;

        let evicted = match self.capacity {
            Some(capacity) if self.items.len() >= capacity => self.items.pop_front(),
            _ => None,
        };
        if evicted.is_some() {
            self.total_evicted += 1;
        }

        self.items.push_back(item);
        evicted
    }

    /// Drop every element and reset the counters
    pub fn clear(&mut self) {
        self.items.clear();
        self.total_pushed = 0;
        self.total_evicted = 0;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Most recently pushed element
    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }

    /// Oldest to newest
    pub fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.items.iter()
    }

    pub fn stats(&self) -> BufferStats {
        BufferStats {
            total_pushed: self.total_pushed,
            total_evicted: self.total_evicted,
            current_size: self.items.len(),
            capacity: self.capacity,
        }
    }
}

impl<'a, T> IntoIterator for &'a RingBuffer<T> {
    type Item = &'a T;
    type IntoIter = vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> Extend<T> for RingBuffer<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

/// Serialized as a plain array, oldest first
impl<T: Serialize> Serialize for RingBuffer<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items.iter())
    }
}

/// Ring buffer statistics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferStats {
    pub total_pushed: u64,
    pub total_evicted: u64,
    pub current_size: usize,
    pub capacity: Option<usize>,
}

impl BufferStats {
    /// Fraction of pushed elements that were later evicted (0.0 to 1.0)
    pub fn eviction_rate(&self) -> f64 {
        if self.total_pushed == 0 {
            0.0
        } else {
            self.total_evicted as f64 / self.total_pushed as f64
        }
    }
}
