//! Sliding xrun-threshold tracker (§4.5): an xrun exceeding
//! `xrun_limit_usecs` within the sliding window is reported to the host;
//! isolated xruns below the threshold are absorbed silently.

#[derive(Debug, Clone)]
pub struct XrunTracker {
    limit_usecs: u64,
    accumulated_usecs: u64,
    count: u32,
}

impl XrunTracker {
    pub fn new(limit_usecs: u64) -> Self {
        Self { limit_usecs, accumulated_usecs: 0, count: 0 }
    }

    /// Record an xrun of `duration_usecs`. Returns `true` if the
    /// accumulated duration within this window now exceeds the configured
    /// limit and the host should be notified.
    pub fn record(&mut self, duration_usecs: u64) -> bool {
        self.accumulated_usecs += duration_usecs;
        self.count += 1;
        let crossed = self.accumulated_usecs > self.limit_usecs;
        if crossed {
            tracing::warn!(accumulated_usecs = self.accumulated_usecs, limit_usecs = self.limit_usecs, count = self.count, "xrun threshold crossed");
        } else {
            tracing::debug!(duration_usecs, accumulated_usecs = self.accumulated_usecs, "xrun absorbed under threshold");
        }
        crossed
    }

    pub fn reset(&mut self) {
        self.accumulated_usecs = 0;
        self.count = 0;
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_small_xrun_stays_under_threshold() {
        let mut tracker = XrunTracker::new(1000);
        assert!(!tracker.record(200));
    }

    #[test]
    fn accumulated_xruns_exceed_threshold() {
        let mut tracker = XrunTracker::new(1000);
        tracker.record(600);
        assert!(tracker.record(600));
    }

    #[test]
    fn reset_clears_accumulation() {
        let mut tracker = XrunTracker::new(1000);
        tracker.record(600);
        tracker.reset();
        assert!(!tracker.record(600));
    }
}
