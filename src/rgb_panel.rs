//! A device abstraction for row-multiplexed HUB75 RGB LED matrix panels.
//!
//! The panel has no memory of its own beyond one row of shift registers, so the
//! image has to be re-sent continuously: the host loop calls
//! [`RgbPanel::scan_out`] as often as it can, and each call sweeps every
//! half-row once (shift, blank, latch, row select, unblank). Upstream code
//! (Art-Net/sACN bridges, overlays) updates pixels with
//! [`RgbPanel::set_pixel`] and [`RgbPanel::set_data`] in between.
//!
//! Each colour channel is shown at one bit of intensity: a channel is on when its
//! top bit is set.
//!
//! A periodic timer started with [`RgbPanel::start`] samples the frame counter
//! once per second; [`RgbPanel::fps`] returns the last sample.
//!
//! # Example
//!
//! ```rust
//! use rgb_panel::panel_host::{ManualFpsTimer, SimulatedPanel};
//! use rgb_panel::rgb_panel::{RgbPanel, RgbPanelConfig, RgbPanelStatic};
//! use smart_leds::colors;
//!
//! # fn main() -> rgb_panel::Result<()> {
//! const CONFIG: RgbPanelConfig = RgbPanelConfig::new(32, 32);
//! static PANEL_STATIC: RgbPanelStatic = RgbPanel::<SimulatedPanel, 512>::new_static();
//!
//! let port = SimulatedPanel::new(CONFIG)?;
//! let mut panel = RgbPanel::<_, 512>::new(&PANEL_STATIC, port, CONFIG)?;
//!
//! panel.set_pixel(0, 0, colors::RED)?;     // top half, R1
//! panel.set_pixel(0, 16, colors::BLUE)?;   // bottom half, B2, same word
//!
//! let mut timer = ManualFpsTimer::new();
//! panel.start(&mut timer)?;
//!
//! for _ in 0..100 {
//!     panel.scan_out();
//! }
//! assert_eq!(panel.frame_count(), 100);
//! assert_eq!(panel.fps(), 0); // no timer tick yet
//!
//! timer.fire();
//! assert_eq!(panel.fps(), 100);
//! assert_eq!(panel.port().visible_pixel(0, 16), colors::BLUE);
//! # Ok(())
//! # }
//! ```

pub mod frame_stats;
pub mod framebuffer;
pub mod geometry;
pub mod pin_map;

use core::convert::Infallible;

use embedded_graphics::{pixelcolor::Rgb888, prelude::*};
use smart_leds::RGB8;

use crate::fps_timer::FpsTimer;
use crate::panel_port::PanelPort;
use crate::{Error, Result};
use frame_stats::FrameStats;
use framebuffer::Framebuffer;
use geometry::PanelGeometry;
use pin_map::{Line, PinMap};

/// Default columns per panel.
pub const COLUMNS_DEFAULT: usize = 32;

/// Default rows per panel.
pub const ROWS_DEFAULT: usize = 32;

/// Default number of chained panels.
pub const CHAIN_DEFAULT: usize = 1;

/// Default pixels per logical port for [`RgbPanel::set_data`] (one DMX universe of RGB).
pub const PIXELS_PER_PORT_DEFAULT: usize = 170;

/// Bytes per pixel in [`RgbPanel::set_data`] payloads.
const BYTES_PER_PIXEL: usize = 3;

/// Construction-time settings for [`RgbPanel`].
///
/// All settings have `const` builders so a configuration can live in a `const`.
///
/// ```rust
/// use rgb_panel::rgb_panel::{RgbPanelConfig, pin_map::PinMap};
///
/// const CONFIG: RgbPanelConfig = RgbPanelConfig::new(64, 32)
///     .with_chain(2)
///     .with_pixels_per_port(128)
///     .with_pin_map(PinMap::ORANGE_PI_ZERO);
///
/// assert_eq!(CONFIG.columns(), 64);
/// assert_eq!(CONFIG.chain(), 2);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RgbPanelConfig {
    columns: usize,
    rows: usize,
    chain: usize,
    pixels_per_port: usize,
    pin_map: PinMap,
}

impl RgbPanelConfig {
    /// A single `columns` x `rows` panel wired as [`PinMap::ORANGE_PI_ZERO`].
    #[must_use]
    pub const fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            chain: CHAIN_DEFAULT,
            pixels_per_port: PIXELS_PER_PORT_DEFAULT,
            pin_map: PinMap::ORANGE_PI_ZERO,
        }
    }

    /// Number of identical panels daisy-chained on the connector.
    #[must_use]
    pub const fn with_chain(self, chain: usize) -> Self {
        Self { chain, ..self }
    }

    /// Pixels each logical port covers in [`RgbPanel::set_data`].
    #[must_use]
    pub const fn with_pixels_per_port(self, pixels_per_port: usize) -> Self {
        Self {
            pixels_per_port,
            ..self
        }
    }

    /// Port bit assignment for the HUB75 lines.
    #[must_use]
    pub const fn with_pin_map(self, pin_map: PinMap) -> Self {
        Self { pin_map, ..self }
    }

    /// Columns per panel.
    #[must_use]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Rows per panel.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Chained panels.
    #[must_use]
    pub const fn chain(&self) -> usize {
        self.chain
    }

    /// Pixels per logical port.
    #[must_use]
    pub const fn pixels_per_port(&self) -> usize {
        self.pixels_per_port
    }

    /// Port bit assignment.
    #[must_use]
    pub const fn pin_map(&self) -> PinMap {
        self.pin_map
    }

    /// Validate the dimensions.
    ///
    /// # Errors
    ///
    /// See [`PanelGeometry::new`].
    pub const fn geometry(&self) -> Result<PanelGeometry> {
        PanelGeometry::new(self.columns, self.rows, self.chain)
    }
}

impl Default for RgbPanelConfig {
    fn default() -> Self {
        Self::new(COLUMNS_DEFAULT, ROWS_DEFAULT)
    }
}

/// Static resources for [`RgbPanel`]: the statistics shared with the timer interrupt.
pub struct RgbPanelStatic {
    frame_stats: FrameStats,
}

impl RgbPanelStatic {
    /// Zeroed statistics for use in a `static`.
    #[must_use]
    pub const fn new_static() -> Self {
        Self {
            frame_stats: FrameStats::new(),
        }
    }

    /// The shared statistics.
    #[must_use]
    pub const fn frame_stats(&self) -> &FrameStats {
        &self.frame_stats
    }
}

/// A device abstraction for a HUB75 RGB LED matrix driven by bit-banging a GPIO port.
///
/// `N` is the framebuffer capacity in words; it must be at least
/// `columns * chain * rows / 2`.
///
/// Coordinates: `(0, 0)` is the top-left pixel, columns grow to the right and rows
/// grow downward. Coordinates outside the panel are rejected with
/// [`Error::ColumnOutOfRange`] / [`Error::RowOutOfRange`].
///
/// See the [module documentation](mod@crate::rgb_panel) for an example.
pub struct RgbPanel<P, const N: usize> {
    port: P,
    framebuffer: Framebuffer<N>,
    geometry: PanelGeometry,
    pin_map: PinMap,
    pixels_per_port: usize,
    frame_stats: &'static FrameStats,
    started: bool,
}

impl<P: PanelPort, const N: usize> RgbPanel<P, N> {
    /// Create the static resources for an `RgbPanel`.
    #[must_use]
    pub const fn new_static() -> RgbPanelStatic {
        RgbPanelStatic::new_static()
    }

    /// Validate `config`, allocate a zeroed framebuffer and put the panel in a
    /// known idle state: clock and latch low, output disabled, row 0 selected,
    /// no colour.
    ///
    /// # Errors
    ///
    /// - Geometry errors from [`PanelGeometry::new`].
    /// - [`Error::FramebufferTooSmall`] if `N` is too small for the panel.
    pub fn new(
        rgb_panel_static: &'static RgbPanelStatic,
        mut port: P,
        config: RgbPanelConfig,
    ) -> Result<Self> {
        let geometry = config.geometry()?;
        let pin_map = config.pin_map();
        let framebuffer = Framebuffer::new(geometry, pin_map)?;

        port.clear_lines(pin_map.mask(Line::Clock) | pin_map.mask(Line::Latch));
        port.set_lines(pin_map.mask(Line::OutputDisable));
        port.clear_lines(pin_map.address_mask(geometry.address_bits()));
        port.clear_lines(pin_map.data_mask());

        info!(
            "RgbPanel: {}x{} (chain {}), {} half-rows, {} framebuffer words",
            geometry.columns(),
            geometry.rows(),
            geometry.chain(),
            geometry.half_rows(),
            geometry.word_count()
        );

        Ok(Self {
            port,
            framebuffer,
            geometry,
            pin_map,
            pixels_per_port: config.pixels_per_port(),
            frame_stats: &rgb_panel_static.frame_stats,
            started: false,
        })
    }

    /// Arm the one-second statistics timer.
    ///
    /// Call once, before the host loop starts calling [`scan_out`](Self::scan_out).
    /// Scanning out before `start` is allowed; [`fps`](Self::fps) simply stays `0`
    /// until the first tick.
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyStarted`] on a second call, or whatever the timer reports.
    pub fn start(&mut self, fps_timer: &mut impl FpsTimer) -> Result<()> {
        if self.started {
            return Err(Error::AlreadyStarted);
        }
        fps_timer.start(self.frame_stats)?;
        self.started = true;
        info!("RgbPanel: started");
        Ok(())
    }

    /// Set one pixel. Each channel is lit when its top bit is set (`>= 0x80`).
    ///
    /// Rows `0..rows/2` are the top half (R1/G1/B1); rows `rows/2..rows` are the
    /// bottom half (R2/G2/B2) of the same framebuffer word. Writing one half never
    /// changes the other. Repeating a call changes nothing.
    ///
    /// # Errors
    ///
    /// [`Error::ColumnOutOfRange`] or [`Error::RowOutOfRange`]; nothing is written.
    pub fn set_pixel(&mut self, column: usize, row: usize, color: RGB8) -> Result<()> {
        self.framebuffer.set(column, row, color)
    }

    /// Place a flat stream of RGB triplets for logical `port`.
    ///
    /// Triplet `i` goes to pixel `port * pixels_per_port + i`, counted row-major
    /// across the panel width. When `pixels_per_port` does not tile the width the
    /// pixels simply continue on the next row; that wrap is the placement
    /// contract. Pixels that would land below the last row are skipped and a
    /// trailing partial triplet is ignored.
    ///
    /// Returns the number of pixels written.
    pub fn set_data(&mut self, port: u8, data: &[u8]) -> usize {
        let width = self.geometry.width();
        let first_pixel = usize::from(port).saturating_mul(self.pixels_per_port);
        let mut written = 0;
        for (offset, triplet) in data.chunks_exact(BYTES_PER_PIXEL).enumerate() {
            let pixel_index = first_pixel.saturating_add(offset);
            let row = pixel_index / width;
            let column = pixel_index - row * width;
            let &[r, g, b] = triplet else { continue };
            match self.set_pixel(column, row, RGB8 { r, g, b }) {
                Ok(()) => written += 1,
                Err(_) => {
                    debug!(
                        "RgbPanel::set_data: port {} pixel {} is below the panel, skipped",
                        port, pixel_index
                    );
                }
            }
        }
        let leftover = data.len() % BYTES_PER_PIXEL;
        if leftover != 0 {
            warn!(
                "RgbPanel::set_data: port {} ignored {} trailing bytes",
                port, leftover
            );
        }
        trace!("RgbPanel::set_data: port {} wrote {} pixels", port, written);
        written
    }

    /// Thresholded colour stored at `(column, row)`; each channel is `0` or `255`.
    ///
    /// # Errors
    ///
    /// [`Error::ColumnOutOfRange`] or [`Error::RowOutOfRange`].
    pub fn pixel(&self, column: usize, row: usize) -> Result<RGB8> {
        self.framebuffer.get(column, row)
    }

    /// Turn every pixel off.
    pub fn clear(&mut self) {
        self.framebuffer.clear();
        debug!("RgbPanel: cleared");
    }

    /// Send one full frame to the panel.
    ///
    /// For every half-row: shift `width` words (clock high then low with the data
    /// held), blank, pulse latch while blanked, select the row, unblank. The port
    /// is read once; bits the driver does not own keep the value read. Each phase
    /// is its own port write. Adds exactly one to the frame counter.
    pub fn scan_out(&mut self) {
        let clock = self.pin_map.mask(Line::Clock);
        let latch = self.pin_map.mask(Line::Latch);
        let output_disable = self.pin_map.mask(Line::OutputDisable);
        let address_bits = self.geometry.address_bits();
        let address_mask = self.pin_map.address_mask(address_bits);

        let mut port_value = self.port.read() & !self.pin_map.data_mask();

        for half_row in 0..self.geometry.half_rows() {
            // Shift
            for &word in self.framebuffer.half_row(half_row) {
                self.port.write(port_value | clock | word);
                self.port.write(port_value | word);
            }

            // Blank
            self.port.write(port_value | output_disable);

            // Latch
            self.port.write(port_value | latch | output_disable);
            port_value |= output_disable;
            self.port.write(port_value);

            // Row select
            port_value =
                (port_value & !address_mask) | self.pin_map.row_address(half_row, address_bits);
            self.port.write(port_value);

            // Unblank
            port_value &= !output_disable;
            self.port.write(port_value);
        }

        self.frame_stats.record_frame();
    }

    /// Frames per second from the most recent timer tick; `0` before the first.
    #[must_use]
    pub fn fps(&self) -> u32 {
        self.frame_stats.fps()
    }

    /// Completed [`scan_out`](Self::scan_out) calls (wraps at `u32::MAX`).
    #[must_use]
    pub fn frame_count(&self) -> u32 {
        self.frame_stats.frame_count()
    }

    /// `true` once [`start`](Self::start) has succeeded.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.started
    }

    /// Validated panel geometry.
    #[must_use]
    pub const fn geometry(&self) -> PanelGeometry {
        self.geometry
    }

    /// Framebuffer words, half-row major.
    #[must_use]
    pub fn framebuffer_words(&self) -> &[u32] {
        self.framebuffer.words()
    }

    /// Log the framebuffer, one half-row per line.
    pub fn dump(&self) {
        for half_row in 0..self.geometry.half_rows() {
            info!(
                "RgbPanel half-row {}: {=[u32]:x}",
                half_row,
                self.framebuffer.half_row(half_row)
            );
        }
    }

    /// The bound port.
    #[must_use]
    pub const fn port(&self) -> &P {
        &self.port
    }

    /// The bound port, mutably.
    pub const fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }
}

impl<P: PanelPort, const N: usize> OriginDimensions for RgbPanel<P, N> {
    fn size(&self) -> Size {
        Size::new(
            u32::try_from(self.geometry.width()).unwrap_or(u32::MAX),
            u32::try_from(self.geometry.rows()).unwrap_or(u32::MAX),
        )
    }
}

impl<P: PanelPort, const N: usize> DrawTarget for RgbPanel<P, N> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> core::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            let (Ok(column), Ok(row)) = (usize::try_from(coord.x), usize::try_from(coord.y))
            else {
                continue;
            };
            let color = RGB8::new(color.r(), color.g(), color.b());
            // Off-panel pixels are clipped.
            self.framebuffer.set_clipped(column, row, color);
        }
        Ok(())
    }
}
