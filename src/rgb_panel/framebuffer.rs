//! One-bit-per-channel framebuffer stored as port-image words.

use heapless::Vec;
use smart_leds::RGB8;

use crate::rgb_panel::geometry::PanelGeometry;
use crate::rgb_panel::pin_map::{Half, Line, PinMap};
use crate::{Error, Result};

/// Channel values at or above this threshold light the LED.
pub const CHANNEL_THRESHOLD: u8 = 0x80;

/// `true` when `channel` has its top bit set.
#[must_use]
pub const fn channel_on(channel: u8) -> bool {
    channel & CHANNEL_THRESHOLD != 0
}

/// Framebuffer of `width * rows / 2` words, holding at most `N`.
///
/// Word `half_row * width + column` carries the top-half colour bits for logical
/// row `half_row` and the bottom-half bits for row `half_row + rows / 2`, at the
/// positions given by the [`PinMap`]. No other bit is ever set.
///
/// The length is fixed when the framebuffer is created and every word starts at zero.
pub struct Framebuffer<const N: usize> {
    words: Vec<u32, N>,
    geometry: PanelGeometry,
    pin_map: PinMap,
}

impl<const N: usize> Framebuffer<N> {
    /// Allocate a zeroed framebuffer for `geometry`.
    ///
    /// # Errors
    ///
    /// [`Error::FramebufferTooSmall`] if `N` cannot hold `geometry.word_count()` words.
    pub fn new(geometry: PanelGeometry, pin_map: PinMap) -> Result<Self> {
        let required = geometry.word_count();
        let mut words = Vec::new();
        words
            .resize(required, 0)
            .map_err(|()| Error::FramebufferTooSmall {
                required,
                capacity: N,
            })?;
        Ok(Self {
            words,
            geometry,
            pin_map,
        })
    }

    /// Resolve `(column, row)` into a word index and the half it belongs to.
    ///
    /// # Errors
    ///
    /// [`Error::ColumnOutOfRange`] or [`Error::RowOutOfRange`].
    pub const fn locate(&self, column: usize, row: usize) -> Result<(usize, Half)> {
        let width = self.geometry.width();
        let rows = self.geometry.rows();
        if column >= width {
            return Err(Error::ColumnOutOfRange { column, width });
        }
        if row >= rows {
            return Err(Error::RowOutOfRange { row, rows });
        }
        let half_rows = self.geometry.half_rows();
        if row < half_rows {
            Ok((row * width + column, Half::Top))
        } else {
            Ok(((row - half_rows) * width + column, Half::Bottom))
        }
    }

    /// Threshold `color` and store it at `(column, row)`.
    ///
    /// Only the three colour bits of the row's half change; the other half's bits
    /// in the same word are left as they were.
    ///
    /// # Errors
    ///
    /// [`Error::ColumnOutOfRange`] or [`Error::RowOutOfRange`]; nothing is written.
    pub fn set(&mut self, column: usize, row: usize, color: RGB8) -> Result<()> {
        let (index, half) = self.locate(column, row)?;
        self.store(index, half, color);
        Ok(())
    }

    /// Like [`set`](Self::set), but off-panel coordinates are dropped.
    ///
    /// Returns `true` if the pixel was on the panel.
    pub fn set_clipped(&mut self, column: usize, row: usize, color: RGB8) -> bool {
        if column >= self.geometry.width() || row >= self.geometry.rows() {
            return false;
        }
        let half_rows = self.geometry.half_rows();
        let (half_row, half) = if row < half_rows {
            (row, Half::Top)
        } else {
            (row - half_rows, Half::Bottom)
        };
        self.store(half_row * self.geometry.width() + column, half, color);
        true
    }

    /// Read back the thresholded colour at `(column, row)`; each channel is `0` or `255`.
    ///
    /// # Errors
    ///
    /// [`Error::ColumnOutOfRange`] or [`Error::RowOutOfRange`].
    pub fn get(&self, column: usize, row: usize) -> Result<RGB8> {
        let (index, half) = self.locate(column, row)?;
        let word = self.words.get(index).copied().unwrap_or_default();
        Ok(self.decode(half, word))
    }

    /// Clear every colour bit.
    pub fn clear(&mut self) {
        let clear_mask = !self.pin_map.data_mask();
        for word in &mut self.words {
            *word &= clear_mask;
        }
    }

    /// Words of one half-row, in shift order.
    #[must_use]
    pub fn half_row(&self, half_row: usize) -> &[u32] {
        let width = self.geometry.width();
        let start = half_row.saturating_mul(width);
        self.words
            .get(start..start.saturating_add(width))
            .unwrap_or(&[])
    }

    /// Every word, half-row major.
    #[must_use]
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Geometry the framebuffer was sized for.
    #[must_use]
    pub const fn geometry(&self) -> PanelGeometry {
        self.geometry
    }

    fn store(&mut self, index: usize, half: Half, color: RGB8) {
        let encoded = self.encode(half, color);
        let clear_mask = !self.pin_map.color_mask(half);
        if let Some(word) = self.words.get_mut(index) {
            *word = (*word & clear_mask) | encoded;
        }
    }

    const fn encode(&self, half: Half, color: RGB8) -> u32 {
        let (red, green, blue) = match half {
            Half::Top => (Line::RedTop, Line::GreenTop, Line::BlueTop),
            Half::Bottom => (Line::RedBottom, Line::GreenBottom, Line::BlueBottom),
        };
        let mut value = 0;
        if channel_on(color.r) {
            value |= self.pin_map.mask(red);
        }
        if channel_on(color.g) {
            value |= self.pin_map.mask(green);
        }
        if channel_on(color.b) {
            value |= self.pin_map.mask(blue);
        }
        value
    }

    const fn decode(&self, half: Half, word: u32) -> RGB8 {
        let (red, green, blue) = match half {
            Half::Top => (Line::RedTop, Line::GreenTop, Line::BlueTop),
            Half::Bottom => (Line::RedBottom, Line::GreenBottom, Line::BlueBottom),
        };
        RGB8 {
            r: channel_level(word & self.pin_map.mask(red) != 0),
            g: channel_level(word & self.pin_map.mask(green) != 0),
            b: channel_level(word & self.pin_map.mask(blue) != 0),
        }
    }
}

const fn channel_level(on: bool) -> u8 {
    if on { u8::MAX } else { 0 }
}
