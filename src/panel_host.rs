#![cfg(feature = "host")]
//! Host stand-ins for the panel hardware: a simulated HUB75 panel behind a
//! [`PanelPort`] and a hand-cranked [`FpsTimer`].

use std::collections::VecDeque;

use smart_leds::RGB8;

use crate::fps_timer::FpsTimer;
use crate::panel_port::PanelPort;
use crate::rgb_panel::RgbPanelConfig;
use crate::rgb_panel::frame_stats::FrameStats;
use crate::rgb_panel::geometry::PanelGeometry;
use crate::rgb_panel::pin_map::{Line, PinMap};
use crate::{Error, Result};

/// A [`PanelPort`] that behaves like a HUB75 panel on the other end of the wire.
///
/// - A rising edge on CLK shifts the six colour bits into a `width`-long shift
///   register. After `width` clocks, the `i`-th clocked value sits at column `i`.
/// - A rising edge on LAT copies the shift register into the output latches.
/// - While OE is low, the latched data is lit on the half-row the address lines
///   select: top colours on row `h`, bottom colours on row `h + rows / 2`.
///
/// Everything written is recorded, and protocol mistakes are counted: latching or
/// changing the row address while the output is enabled, and any write that
/// changes a bit outside the [`PinMap`].
pub struct SimulatedPanel {
    geometry: PanelGeometry,
    pin_map: PinMap,
    value: u32,
    foreign_bits: u32,
    shift_register: VecDeque<u32>,
    latched: Vec<u32>,
    visible: Vec<RGB8>,
    writes: Vec<u32>,
    clock_pulses: usize,
    latch_pulses: usize,
    latches_while_enabled: usize,
    address_changes_while_enabled: usize,
    foreign_bit_changes: usize,
}

impl SimulatedPanel {
    /// A dark panel matching `config`, with every port bit low.
    ///
    /// # Errors
    ///
    /// Geometry errors from [`RgbPanelConfig::geometry`].
    pub fn new(config: RgbPanelConfig) -> Result<Self> {
        let geometry = config.geometry()?;
        let black = RGB8::new(0, 0, 0);
        Ok(Self {
            geometry,
            pin_map: config.pin_map(),
            value: 0,
            foreign_bits: 0,
            shift_register: VecDeque::with_capacity(geometry.width()),
            latched: vec![0; geometry.width()],
            visible: vec![black; geometry.width() * geometry.rows()],
            writes: Vec::new(),
            clock_pulses: 0,
            latch_pulses: 0,
            latches_while_enabled: 0,
            address_changes_while_enabled: 0,
            foreign_bit_changes: 0,
        })
    }

    /// Preload bits that belong to another peripheral on the same port.
    ///
    /// Bits inside the pin map are ignored. Any later write that changes one of
    /// the remaining bits is counted by [`foreign_bit_changes`](Self::foreign_bit_changes).
    #[must_use]
    pub fn with_foreign_bits(mut self, foreign_bits: u32) -> Self {
        self.foreign_bits = foreign_bits & !self.pin_map.owned_mask();
        self.value = (self.value & self.pin_map.owned_mask()) | self.foreign_bits;
        self
    }

    /// Every value written so far, oldest first.
    #[must_use]
    pub fn writes(&self) -> &[u32] {
        &self.writes
    }

    /// Forget the recorded writes; panel state is kept.
    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    /// Current port value.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// Colour currently lit at `(column, row)`; each channel is `0` or `255`.
    ///
    /// Out-of-panel coordinates read as black.
    #[must_use]
    pub fn visible_pixel(&self, column: usize, row: usize) -> RGB8 {
        if column >= self.geometry.width() || row >= self.geometry.rows() {
            return RGB8::new(0, 0, 0);
        }
        self.visible
            .get(row * self.geometry.width() + column)
            .copied()
            .unwrap_or_default()
    }

    /// Everything lit, row-major, `width * rows` pixels.
    #[must_use]
    pub fn visible_pixels(&self) -> &[RGB8] {
        &self.visible
    }

    /// Geometry the panel was built for.
    #[must_use]
    pub const fn geometry(&self) -> PanelGeometry {
        self.geometry
    }

    /// Rising edges seen on CLK.
    #[must_use]
    pub const fn clock_pulses(&self) -> usize {
        self.clock_pulses
    }

    /// Rising edges seen on LAT.
    #[must_use]
    pub const fn latch_pulses(&self) -> usize {
        self.latch_pulses
    }

    /// Latch edges that happened while the output was enabled.
    #[must_use]
    pub const fn latches_while_enabled(&self) -> usize {
        self.latches_while_enabled
    }

    /// Row-address changes that happened while the output was enabled.
    #[must_use]
    pub const fn address_changes_while_enabled(&self) -> usize {
        self.address_changes_while_enabled
    }

    /// Writes that changed a bit outside the pin map.
    #[must_use]
    pub const fn foreign_bit_changes(&self) -> usize {
        self.foreign_bit_changes
    }

    fn rising(&self, previous: u32, next: u32, line: Line) -> bool {
        let mask = self.pin_map.mask(line);
        previous & mask == 0 && next & mask != 0
    }

    fn output_enabled(&self, value: u32) -> bool {
        value & self.pin_map.mask(Line::OutputDisable) == 0
    }

    fn light_selected_row(&mut self) {
        let width = self.geometry.width();
        let half_rows = self.geometry.half_rows();
        let half_row = self
            .pin_map
            .decode_row_address(self.value, self.geometry.address_bits());
        if half_row >= half_rows {
            return;
        }
        for column in 0..width {
            let word = self.latched.get(column).copied().unwrap_or_default();
            let top = self.color(word, Line::RedTop, Line::GreenTop, Line::BlueTop);
            let bottom = self.color(word, Line::RedBottom, Line::GreenBottom, Line::BlueBottom);
            if let Some(pixel) = self.visible.get_mut(half_row * width + column) {
                *pixel = top;
            }
            if let Some(pixel) = self.visible.get_mut((half_row + half_rows) * width + column) {
                *pixel = bottom;
            }
        }
    }

    fn color(&self, word: u32, red: Line, green: Line, blue: Line) -> RGB8 {
        let level = |line: Line| {
            if word & self.pin_map.mask(line) == 0 {
                0
            } else {
                u8::MAX
            }
        };
        RGB8::new(level(red), level(green), level(blue))
    }
}

impl PanelPort for SimulatedPanel {
    fn read(&mut self) -> u32 {
        self.value
    }

    fn write(&mut self, value: u32) {
        let previous = self.value;
        self.writes.push(value);

        let foreign_mask = !self.pin_map.owned_mask();
        if value & foreign_mask != self.foreign_bits {
            self.foreign_bit_changes += 1;
        }

        let was_enabled = self.output_enabled(previous);
        let is_enabled = self.output_enabled(value);
        let address_mask = self.pin_map.address_mask(self.geometry.address_bits());

        if self.rising(previous, value, Line::Clock) {
            self.clock_pulses += 1;
            self.shift_register
                .push_back(value & self.pin_map.data_mask());
            if self.shift_register.len() > self.geometry.width() {
                self.shift_register.pop_front();
            }
        }

        if self.rising(previous, value, Line::Latch) {
            self.latch_pulses += 1;
            if is_enabled {
                self.latches_while_enabled += 1;
            }
            self.latched = self.shift_register.iter().copied().collect();
            self.latched.resize(self.geometry.width(), 0);
        }

        if was_enabled && is_enabled && (previous ^ value) & address_mask != 0 {
            self.address_changes_while_enabled += 1;
        }

        self.value = value;
        if is_enabled {
            self.light_selected_row();
        }
    }
}

/// An [`FpsTimer`] that fires only when told to, standing in for the hardware
/// one-second interrupt.
#[derive(Default)]
pub struct ManualFpsTimer {
    frame_stats: Option<&'static FrameStats>,
}

impl ManualFpsTimer {
    /// An unarmed timer.
    #[must_use]
    pub const fn new() -> Self {
        Self { frame_stats: None }
    }

    /// Run the interrupt body once. Returns the published sample, or `None` if
    /// the timer was never started.
    pub fn fire(&mut self) -> Option<u32> {
        self.frame_stats.map(FrameStats::sample)
    }

    /// `true` once started.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.frame_stats.is_some()
    }
}

impl FpsTimer for ManualFpsTimer {
    fn start(&mut self, frame_stats: &'static FrameStats) -> Result<()> {
        if self.frame_stats.is_some() {
            return Err(Error::AlreadyStarted);
        }
        self.frame_stats = Some(frame_stats);
        Ok(())
    }
}
