//! The periodic one-second timer that samples [`FrameStats`].
//!
//! See [`FpsTimer`] for the contract. On hardware, [`InterruptFpsTimer`] runs the
//! sampling task on an interrupt-priority executor so it preempts the busy
//! scan-out loop in thread mode.
#![cfg_attr(
    not(feature = "host"),
    allow(unsafe_code, reason = "interrupt handler binding for the executor")
)]

use crate::Result;
use crate::rgb_panel::frame_stats::FrameStats;

/// Sampling period of the frame statistics timer.
pub const FPS_SAMPLE_PERIOD_MS: u64 = 1_000;

/// A periodic timer that calls [`FrameStats::sample`] once per
/// [`FPS_SAMPLE_PERIOD_MS`], from a context that can preempt the scan-out loop.
///
/// The sampling callback must stay bounded in time; it does nothing except
/// [`FrameStats::sample`].
pub trait FpsTimer {
    /// Arm the timer and enable its interrupt.
    ///
    /// # Errors
    ///
    /// Implementations report failures to install the handler.
    fn start(&mut self, frame_stats: &'static FrameStats) -> Result<()>;
}

#[cfg(not(feature = "host"))]
pub use hardware::InterruptFpsTimer;

#[cfg(not(feature = "host"))]
mod hardware {
    use embassy_executor::InterruptExecutor;
    use embassy_rp::interrupt;
    use embassy_rp::interrupt::{InterruptExt, Priority};
    use embassy_time::{Duration, Ticker};
    use portable_atomic::{AtomicBool, Ordering};

    use super::{FPS_SAMPLE_PERIOD_MS, FpsTimer};
    use crate::rgb_panel::frame_stats::FrameStats;
    use crate::{Error, Result};

    static FPS_EXECUTOR: InterruptExecutor = InterruptExecutor::new();
    static FPS_EXECUTOR_STARTED: AtomicBool = AtomicBool::new(false);

    #[interrupt]
    unsafe fn SWI_IRQ_1() {
        // SAFETY: SWI_IRQ_1 is reserved for this executor and only unmasked by `start`.
        unsafe { FPS_EXECUTOR.on_interrupt() }
    }

    /// [`FpsTimer`] backed by an `embassy-time` ticker on an interrupt executor.
    ///
    /// The executor runs on the otherwise unused `SWI_IRQ_1` at [`Priority::P1`], so
    /// the sample fires even while thread mode is stuck in the scan-out loop.
    /// Only one may be started per program.
    #[derive(Default)]
    pub struct InterruptFpsTimer;

    impl InterruptFpsTimer {
        /// Create the timer. Nothing is armed until [`FpsTimer::start`].
        #[must_use]
        pub const fn new() -> Self {
            Self
        }
    }

    impl FpsTimer for InterruptFpsTimer {
        fn start(&mut self, frame_stats: &'static FrameStats) -> Result<()> {
            if FPS_EXECUTOR_STARTED.swap(true, Ordering::AcqRel) {
                return Err(Error::AlreadyStarted);
            }
            interrupt::SWI_IRQ_1.set_priority(Priority::P1);
            let spawner = FPS_EXECUTOR.start(interrupt::SWI_IRQ_1);
            let token = fps_sample_task(frame_stats);
            spawner.spawn(token).map_err(Error::TaskSpawn)?;
            info!("InterruptFpsTimer: sampling every {} ms", FPS_SAMPLE_PERIOD_MS);
            Ok(())
        }
    }

    #[embassy_executor::task]
    async fn fps_sample_task(frame_stats: &'static FrameStats) -> ! {
        let mut ticker = Ticker::every(Duration::from_millis(FPS_SAMPLE_PERIOD_MS));
        loop {
            ticker.next().await;
            frame_stats.sample();
        }
    }
}
