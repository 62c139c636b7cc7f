//! Counters describing how much data crossed shuffle boundaries.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// What a single shuffle map stage wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShuffleWriteMetrics {
    pub records_written: u64,
    pub bytes_written: u64,
}

/// Cumulative shuffle statistics of a context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShuffleMetrics {
    pub shuffles: u64,
    pub records_written: u64,
    pub bytes_written: u64,
}

impl ShuffleMetrics {
    /// Difference between this snapshot and an earlier one.
    pub fn since(&self, earlier: &ShuffleMetrics) -> ShuffleMetrics {
        ShuffleMetrics {
            shuffles: self.shuffles.saturating_sub(earlier.shuffles),
            records_written: self.records_written.saturating_sub(earlier.records_written),
            bytes_written: self.bytes_written.saturating_sub(earlier.bytes_written),
        }
    }
}

impl fmt::Display for ShuffleMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} shuffle(s), {} records, {} bytes",
            self.shuffles, self.records_written, self.bytes_written
        )
    }
}

#[derive(Debug, Default)]
pub struct ShuffleMetricsRecorder {
    shuffles: AtomicU64,
    records_written: AtomicU64,
    bytes_written: AtomicU64,
}

impl ShuffleMetricsRecorder {
    pub fn record(&self, write: &ShuffleWriteMetrics) {
        self.shuffles.fetch_add(1, Ordering::Relaxed);
        self.records_written
            .fetch_add(write.records_written, Ordering::Relaxed);
        self.bytes_written
            .fetch_add(write.bytes_written, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ShuffleMetrics {
        ShuffleMetrics {
            shuffles: self.shuffles.load(Ordering::Relaxed),
            records_written: self.records_written.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_accumulates() {
        let recorder = ShuffleMetricsRecorder::default();
        recorder.record(&ShuffleWriteMetrics {
            records_written: 10,
            bytes_written: 100,
        });
        let before = recorder.snapshot();
        recorder.record(&ShuffleWriteMetrics {
            records_written: 3,
            bytes_written: 30,
        });

        let after = recorder.snapshot();
        assert_eq!(after.shuffles, 2);
        assert_eq!(after.records_written, 13);
        assert_eq!(
            after.since(&before),
            ShuffleMetrics {
                shuffles: 1,
                records_written: 3,
                bytes_written: 30
            }
        );
        assert_eq!(after.since(&before).to_string(), "1 shuffle(s), 3 records, 30 bytes");
    }
}
