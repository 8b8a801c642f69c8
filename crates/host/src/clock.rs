use std::time::Duration;

/// Elapsed-time source for animation, measured from the first reading.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    start: Option<Duration>,
    last: f32,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the first call, given the host's monotonic `now`.
    /// A `now` earlier than the start reads as zero.
    pub fn elapsed(&mut self, now: Duration) -> f32 {
        let start = *self.start.get_or_insert(now);
        self.last = now.saturating_sub(start).as_secs_f32();
        self.last
    }

    /// Value returned by the most recent `elapsed` call.
    pub fn last(&self) -> f32 {
        self.last
    }
}
