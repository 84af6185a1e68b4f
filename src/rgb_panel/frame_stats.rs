//! Frame counter and once-per-second frames-per-second sample.
//!
//! The scan-out loop and the sampling interrupt run in different execution
//! contexts. They share only the three atomics in [`FrameStats`]; each side writes
//! its own fields, and every cross-context hand-off is a release store paired
//! with an acquire load.

use portable_atomic::{AtomicU32, Ordering};

/// Frame statistics shared between the scan-out loop and the one-second timer.
///
/// - `frame_count` is written only by [`record_frame`](Self::record_frame).
/// - `fps` and `previous_sample` are written only by [`sample`](Self::sample).
pub struct FrameStats {
    frame_count: AtomicU32,
    previous_sample: AtomicU32,
    fps: AtomicU32,
}

impl FrameStats {
    /// Zeroed statistics, usable in a `static`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            frame_count: AtomicU32::new(0),
            previous_sample: AtomicU32::new(0),
            fps: AtomicU32::new(0),
        }
    }

    /// Count one completed scan-out pass.
    ///
    /// Single writer: only the scan-out loop calls this, so a load/store pair is
    /// enough and avoids a read-modify-write on cores without atomic CAS.
    pub fn record_frame(&self) {
        let frame_count = self.frame_count.load(Ordering::Relaxed);
        self.frame_count
            .store(frame_count.wrapping_add(1), Ordering::Release);
    }

    /// Timer body: publish the frames completed since the previous sample.
    ///
    /// Bounded time (one subtraction, two stores). Returns the published value.
    pub fn sample(&self) -> u32 {
        let frame_count = self.frame_count.load(Ordering::Acquire);
        let previous_sample = self.previous_sample.load(Ordering::Relaxed);
        let fps = frame_count.wrapping_sub(previous_sample);
        self.fps.store(fps, Ordering::Release);
        self.previous_sample.store(frame_count, Ordering::Relaxed);
        fps
    }

    /// Most recently published frames-per-second, `0` before the first sample.
    #[must_use]
    pub fn fps(&self) -> u32 {
        self.fps.load(Ordering::Acquire)
    }

    /// Completed scan-out passes since construction (wraps at `u32::MAX`).
    #[must_use]
    pub fn frame_count(&self) -> u32 {
        self.frame_count.load(Ordering::Acquire)
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}
