/// What a single host tick did to the clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// First tick: only the reference timestamp was recorded.
    Primed,
    /// Enough time passed; carries the new total elapsed time in ms.
    Accepted(f64),
    /// Too soon since the last accepted frame.
    Dropped,
    /// Paused: the reference timestamp moved, elapsed time did not.
    Frozen,
}

/// Per-layer animation time.
///
/// `elapsed_ms` only advances on accepted frames and never while paused.
/// While paused the reference timestamp keeps following the host so that
/// resuming continues from the frozen time instead of jumping over the gap.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationClock {
    elapsed_ms: f64,
    last_frame_timestamp: Option<f64>,
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn last_frame_timestamp(&self) -> Option<f64> {
        self.last_frame_timestamp
    }

    /// Feed one host timestamp through the throttle.
    pub fn tick(&mut self, timestamp: f64, paused: bool, frame_interval_ms: f64) -> Tick {
        let Some(previous) = self.last_frame_timestamp else {
            self.last_frame_timestamp = Some(timestamp);
            return Tick::Primed;
        };

        let delta = timestamp - previous;
        if !paused && delta >= frame_interval_ms {
            self.elapsed_ms += delta;
            self.last_frame_timestamp = Some(timestamp);
            Tick::Accepted(self.elapsed_ms)
        } else if paused {
            self.last_frame_timestamp = Some(timestamp);
            Tick::Frozen
        } else {
            Tick::Dropped
        }
    }
}
