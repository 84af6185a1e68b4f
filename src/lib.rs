//! Driver for row-multiplexed HUB75 RGB LED matrix panels, as used for the output
//! end of a DMX / Art-Net / sACN lighting pipeline.
//!
//! Start with [`rgb_panel::RgbPanel`].
//!
//! # Glossary
//!
//! - **Half-row:** one of the `rows / 2` scan lines picked by the row-address
//!   lines. Each half-row lights one row in the top half and the matching row in
//!   the bottom half.
//! - **Frame:** one [`scan_out`](rgb_panel::RgbPanel::scan_out) call, a sweep over
//!   every half-row (shift, blank, latch, row select, unblank).
//! - **Port:** in [`set_data`](rgb_panel::RgbPanel::set_data), a run of
//!   consecutive pixels fed by one upstream universe.
//! - **Port word:** the 32-bit value of the GPIO port the panel hangs off; see
//!   [`panel_port::PanelPort`].
#![cfg_attr(not(feature = "host"), no_std)]

// Compile-time checks: a board and an architecture must be selected (unless testing with host feature)
#[cfg(all(not(feature = "pico1"), not(feature = "host")))]
compile_error!("Must enable the board feature 'pico1' (or 'host' for testing)");

#[cfg(all(not(feature = "arm"), not(feature = "host")))]
compile_error!("Must enable the architecture feature 'arm' (or 'host' for testing)");

// This mod MUST go first, so that the others see its macros.
mod fmt;

mod error;
pub mod fps_timer;
#[cfg(feature = "host")]
pub mod panel_host;
pub mod panel_port;
pub mod rgb_panel;
#[cfg(feature = "host")]
pub mod to_png;

// Re-export error types and result (used throughout)
pub use crate::error::{Error, Result};
