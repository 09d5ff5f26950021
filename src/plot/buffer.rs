/// Returned when a sample arrives after the buffer filled up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferFull {
    pub capacity: usize,
}

/// Bounded time series of throughput samples.
///
/// Samples past `capacity` are rejected; the series never wraps.
#[derive(Debug, Clone)]
pub struct PlotBuffer {
    times: Vec<f64>,
    values: Vec<f64>,
    capacity: usize,
    time_cursor: f64,
    low: Option<f64>,
    high: f64,
}

impl PlotBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            times: Vec::with_capacity(capacity.min(4096)),
            values: Vec::with_capacity(capacity.min(4096)),
            capacity,
            time_cursor: 0.0,
            low: None,
            high: 0.0,
        }
    }

    /// Append `value` at the current plot time, then advance the time by
    /// `interval`. Returns the index the sample was written to.
    pub fn push(&mut self, value: f64, interval: f64) -> Result<usize, BufferFull> {
        if self.values.len() >= self.capacity {
            return Err(BufferFull {
                capacity: self.capacity,
            });
        }

        if value > self.high {
            self.high = value;
        }
        if self.low.map_or(true, |low| value < low) {
            self.low = Some(value);
        }

        let index = self.values.len();
        self.times.push(self.time_cursor);
        self.values.push(value);
        self.time_cursor += interval;
        Ok(index)
    }

    /// Next write index
    pub fn cursor(&self) -> usize {
        self.values.len()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn time_cursor(&self) -> f64 {
        self.time_cursor
    }

    /// Smallest value seen, `None` until the first sample
    pub fn low(&self) -> Option<f64> {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }

    pub fn clear(&mut self) {
        self.times.clear();
        self.values.clear();
        self.time_cursor = 0.0;
        self.low = None;
        self.high = 0.0;
    }
}
