//! # Heart Rate History Module
//!
//! Fixed-capacity record of the most recent BPM observations, one per
//! heart-rate poll tick. The trend graph reads the whole buffer every frame.
//!
//! ## Encoding
//! A tick without signal is stored as `0`, so the history keeps one slot per
//! tick even while the sensor is disconnected.

/// Number of poll ticks kept for the trend graph
pub const HISTORY_CAPACITY: usize = 50;

/// Upper clamp for reported BPM values
pub const MAX_BPM: u32 = 300;

/// A single heart-rate observation as delivered by the poller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartRateSample {
    pub value: u32,
    pub connected: bool,
}

impl HeartRateSample {
    pub fn new(value: u32, connected: bool) -> Self {
        Self { value, connected }
    }

    pub fn disconnected() -> Self {
        Self { value: 0, connected: false }
    }

    /// Build a sample from the raw server reading.
    ///
    /// The server reports `-1` when no device is attached; any non-positive
    /// reading is treated as "no signal". Values above `MAX_BPM` are clamped.
    pub fn from_reading(raw: i64) -> Self {
        if raw <= 0 {
            Self::disconnected()
        } else {
            Self::new((raw as u64).min(MAX_BPM as u64) as u32, true)
        }
    }

    /// BPM as seen by the renderer: 0 whenever there is no signal
    pub fn bpm(&self) -> u32 {
        if self.connected {
            self.value
        } else {
            0
        }
    }
}

pub trait BpmSliceExt {
    fn min_max_value(&self) -> Option<(u32, u32)>;
}

impl BpmSliceExt for &[u32] {
    fn min_max_value(&self) -> Option<(u32, u32)> {
        self.iter().fold(None, |acc, &value| match acc {
            None => Some((value, value)),
            Some((min, max)) => Some((min.min(value), max.max(value))),
        })
    }
}

/// Ordered BPM values, oldest first
#[derive(Debug, Clone)]
pub struct SampleHistory {
    values: Vec<u32>,
    capacity: usize,
}

impl SampleHistory {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: Vec::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn append(&mut self, sample: HeartRateSample) {
        self.values.push(sample.bpm());
        if self.values.len() > self.capacity {
            let excess = self.values.len() - self.capacity;
            self.values.drain(..excess);
        }
    }

    pub fn snapshot(&self) -> &[u32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for SampleHistory {
    fn default() -> Self {
        Self::new()
    }
}
