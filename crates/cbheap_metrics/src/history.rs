//! Rolling per-frame samples (bytes uploaded, microseconds spent, ...)

pub struct FrameHistory {
    samples: Vec<u64>,
    capacity: usize,
    index: usize,
}

impl FrameHistory {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "frame history needs at least one slot");
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
            index: 0,
        }
    }

    /// Record the sample for one finished frame, overwriting the oldest once full.
    pub fn push(&mut self, sample: u64) {
        if self.samples.len() < self.capacity {
            self.samples.push(sample);
        } else {
            self.samples[self.index] = sample;
        }
        self.index = (self.index + 1) % self.capacity;
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn average(&self) -> u64 {
        if self.samples.is_empty() {
            return 0;
        }
        self.samples.iter().sum::<u64>() / self.samples.len() as u64
    }

    pub fn peak(&self) -> u64 {
        self.samples.iter().copied().max().unwrap_or(0)
    }

    /// Most recently pushed sample.
    pub fn last(&self) -> Option<u64> {
        if self.samples.is_empty() {
            return None;
        }
        let idx = (self.index + self.capacity - 1) % self.capacity;
        self.samples.get(idx).copied()
    }
}
