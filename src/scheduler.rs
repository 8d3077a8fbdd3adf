//! Drives a [`WaveAnimator`] from the host's animation-frame callback.
//!
//! The host is abstracted as [`FrameHost`]: something that can schedule one
//! callback for the next display refresh and cancel it again. The loop
//! reschedules itself on every tick until it is torn down.

use tracing::debug;

use crate::animator::WaveAnimator;
use crate::clock::{AnimationClock, Tick};
use crate::path::WavePath;

/// Handle for one scheduled animation-frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// The host's animation-frame primitive.
pub trait FrameHost {
    /// Ask for a callback on the next display refresh.
    fn request_frame(&mut self) -> FrameRequest;
    /// Withdraw a callback that has not fired yet.
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// Host whose refreshes are delivered by hand.
///
/// Used for headless rendering and tests: the caller decides the timestamps
/// and calls [`FrameLoop::on_host_tick`] for each pending request.
#[derive(Debug, Default)]
pub struct ManualHost {
    next_id: u64,
    pending: Vec<FrameRequest>,
    cancelled: Vec<FrameRequest>,
}

impl ManualHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that have been made and neither fired nor been cancelled.
    pub fn pending(&self) -> &[FrameRequest] {
        &self.pending
    }

    pub fn cancelled(&self) -> &[FrameRequest] {
        &self.cancelled
    }

    /// Fire every pending request, returning them.
    pub fn take_pending(&mut self) -> Vec<FrameRequest> {
        std::mem::take(&mut self.pending)
    }
}

impl FrameHost for ManualHost {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        let request = FrameRequest(self.next_id);
        self.pending.push(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.pending.retain(|pending| *pending != request);
        self.cancelled.push(request);
    }
}

/// A running animation loop for one wave layer.
///
/// Owns the layer's [`AnimationClock`]; dropping the loop tears it down.
#[derive(Debug)]
pub struct FrameLoop<H: FrameHost> {
    animator: WaveAnimator,
    clock: AnimationClock,
    host: H,
    pending: Option<FrameRequest>,
    running: bool,
}

impl<H: FrameHost> FrameLoop<H> {
    /// Schedule the first tick and start running.
    pub fn start(animator: WaveAnimator, mut host: H) -> Self {
        let pending = Some(host.request_frame());
        Self {
            animator,
            clock: AnimationClock::new(),
            host,
            pending,
            running: true,
        }
    }

    /// Handle one host refresh at `timestamp` milliseconds.
    ///
    /// Returns the freshly built path when the tick was an accepted frame.
    /// After [`FrameLoop::teardown`] this is a no-op.
    pub fn on_host_tick(&mut self, timestamp: f64) -> Option<&WavePath> {
        if !self.running {
            return None;
        }
        // The request that delivered this tick has fired.
        self.pending = None;

        let params = self.animator.params();
        let tick = self
            .clock
            .tick(timestamp, params.paused, params.frame_interval_ms());

        self.pending = Some(self.host.request_frame());

        match tick {
            Tick::Accepted(elapsed_ms) => Some(self.animator.on_frame(elapsed_ms)),
            Tick::Primed | Tick::Dropped | Tick::Frozen => None,
        }
    }

    /// Cancel the outstanding request. No frames are rendered afterwards.
    pub fn teardown(&mut self) {
        if !self.running {
            return;
        }
        if let Some(request) = self.pending.take() {
            self.host.cancel_frame(request);
        }
        self.running = false;
        debug!(elapsed_ms = self.clock.elapsed_ms(), "frame loop torn down");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    pub fn animator(&self) -> &WaveAnimator {
        &self.animator
    }

    pub fn animator_mut(&mut self) -> &mut WaveAnimator {
        &mut self.animator
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<H: FrameHost> Drop for FrameLoop<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}
