/// Percentage reported when the body has been fully received and decoded.
pub const COMPLETE_PERCENT: u8 = 100;

/// Turns received byte counts into monotonic percentages.
///
/// With a known, non-zero length, each call to [`advance`](Self::advance)
/// yields the new percentage when it increased. Byte-derived percentages stop
/// at 99 so 100 is only emitted by [`finish`](Self::finish), after the last
/// chunk has been decoded. Without a length the tracker is indeterminate and
/// only `finish` reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressTracker {
    total: Option<u64>,
    received: u64,
    last: Option<u8>,
}

impl ProgressTracker {
    pub fn new(content_length: Option<u64>) -> Self {
        Self {
            total: content_length.filter(|&n| n > 0),
            received: 0,
            last: None,
        }
    }

    pub fn is_indeterminate(&self) -> bool {
        self.total.is_none()
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    pub fn last_reported(&self) -> Option<u8> {
        self.last
    }

    /// Records `bytes` more bytes and returns the percentage to report, if it
    /// moved forward.
    pub fn advance(&mut self, bytes: u64) -> Option<u8> {
        self.received = self.received.saturating_add(bytes);
        let total = self.total?;
        let pct = (u128::from(self.received) * 100 / u128::from(total)).min(99) as u8;
        self.report(pct)
    }

    /// Returns 100 unless it was already reported.
    pub fn finish(&mut self) -> Option<u8> {
        self.report(COMPLETE_PERCENT)
    }

    fn report(&mut self, pct: u8) -> Option<u8> {
        if self.last.is_some_and(|last| pct <= last) {
            return None;
        }
        self.last = Some(pct);
        Some(pct)
    }
}
