use crate::core::error::{Error, ErrorKind, Result};

/// Neumaier-compensated f64 sum.
///
/// Difficulty totals are accumulated over the whole catalog, so plain
/// left-to-right addition would drift with dataset size.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    pub fn add(&mut self, value: f64) {
        let t = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - t) + value;
        } else {
            self.compensation += (value - t) + self.sum;
        }
        self.sum = t;
    }

    pub fn value(&self) -> f64 {
        self.sum + self.compensation
    }
}

/// Running total and count, the building block of both average paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningTotal {
    total: CompensatedSum,
    count: u64,
}

impl RunningTotal {
    /// Adds one observation.
    pub fn push(&mut self, value: f64) -> Result<()> {
        self.merge(value, 1)
    }

    /// Folds in a precomputed partial sum.
    pub fn merge(&mut self, total: f64, count: u64) -> Result<()> {
        self.count = self.count.checked_add(count).ok_or_else(|| {
            Error::new(ErrorKind::Internal, "song count overflowed a 64-bit accumulator")
        })?;
        self.total.add(total);
        Ok(())
    }

    pub fn total(&self) -> f64 {
        self.total.value()
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// `None` when nothing was accumulated.
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(self.total.value() / self.count as f64)
    }
}
