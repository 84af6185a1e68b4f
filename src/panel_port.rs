//! The bus the scan-out loop drives: one 32-bit port word, read and written whole.
//!
//! See [`PanelPort`] for the contract and [`GpioPort`] for a binding over
//! individual `embedded-hal` output pins.

use core::convert::Infallible;

use embedded_hal::digital::{OutputPin, PinState};

use crate::rgb_panel::pin_map::{Line, PinMap};

/// A 32-bit output port shared with other peripherals.
///
/// Bits the driver does not own may belong to something else on the same port
/// (a UART, a status LED). The driver reads the port once, keeps those bits as
/// read, and writes whole words. Every [`write`](Self::write) is one bus
/// transaction the panel observes; implementations must not merge or drop writes.
pub trait PanelPort {
    /// Current level of every bit on the port.
    fn read(&mut self) -> u32;

    /// Drive every bit on the port to `value`.
    fn write(&mut self, value: u32);

    /// Drive the bits in `mask` high, leaving the rest as read.
    fn set_lines(&mut self, mask: u32) {
        let value = self.read();
        self.write(value | mask);
    }

    /// Drive the bits in `mask` low, leaving the rest as read.
    fn clear_lines(&mut self, mask: u32) {
        let value = self.read();
        self.write(value & !mask);
    }

    /// `true` if any bit in `mask` is high.
    fn is_line_set(&mut self, mask: u32) -> bool {
        self.read() & mask != 0
    }
}

impl<T: PanelPort + ?Sized> PanelPort for &mut T {
    fn read(&mut self) -> u32 {
        (**self).read()
    }

    fn write(&mut self, value: u32) {
        (**self).write(value);
    }
}

/// [`PanelPort`] over fourteen individual output pins, one per [`Line`].
///
/// The port word uses the bit positions of the given [`PinMap`]; bits outside the
/// map always read as zero. Only pins whose bit changed are touched on a write,
/// and a rising CLK or LAT is driven after every other line of the same word.
///
/// # Example
///
/// ```rust,ignore
/// use embassy_rp::gpio::{Level, Output};
/// use rgb_panel::panel_port::GpioPort;
/// use rgb_panel::rgb_panel::pin_map::PinMap;
///
/// # fn example(p: embassy_rp::Peripherals) {
/// // A..E on GPIO 0..4, CLK 5, LAT 6, OE 7, R1 G1 B1 8..10, R2 G2 B2 11..13.
/// const PICO_MAP: PinMap = PinMap::new([0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13]);
/// let port = GpioPort::new(
///     [
///         Output::new(p.PIN_0, Level::Low),
///         Output::new(p.PIN_1, Level::Low),
///         Output::new(p.PIN_2, Level::Low),
///         Output::new(p.PIN_3, Level::Low),
///         Output::new(p.PIN_4, Level::Low),
///         Output::new(p.PIN_5, Level::Low),
///         Output::new(p.PIN_6, Level::Low),
///         Output::new(p.PIN_7, Level::Low),
///         Output::new(p.PIN_8, Level::Low),
///         Output::new(p.PIN_9, Level::Low),
///         Output::new(p.PIN_10, Level::Low),
///         Output::new(p.PIN_11, Level::Low),
///         Output::new(p.PIN_12, Level::Low),
///         Output::new(p.PIN_13, Level::Low),
///     ],
///     PICO_MAP,
/// );
/// # let _ = port;
/// # }
/// ```
pub struct GpioPort<P> {
    pins: [P; Line::COUNT],
    pin_map: PinMap,
    value: u32,
}

impl<P> GpioPort<P>
where
    P: OutputPin<Error = Infallible>,
{
    /// Take ownership of `pins` (in [`Line::ALL`] order) and put the panel in a
    /// blanked state: OE high, every other line low.
    #[must_use]
    pub fn new(pins: [P; Line::COUNT], pin_map: PinMap) -> Self {
        let mut port = Self {
            pins,
            pin_map,
            value: pin_map.mask(Line::OutputDisable),
        };
        for (line, pin) in Line::ALL.iter().zip(port.pins.iter_mut()) {
            let Ok(()) = pin.set_state(PinState::from(*line == Line::OutputDisable));
        }
        port
    }

    /// Release the pins.
    #[must_use]
    pub fn into_pins(self) -> [P; Line::COUNT] {
        self.pins
    }

    fn drive(&mut self, lines: u32, value: u32) {
        if lines == 0 {
            return;
        }
        for (line, pin) in Line::ALL.iter().zip(self.pins.iter_mut()) {
            let mask = self.pin_map.mask(*line);
            if lines & mask != 0 {
                let Ok(()) = pin.set_state(PinState::from(value & mask != 0));
            }
        }
    }
}

impl<P> PanelPort for GpioPort<P>
where
    P: OutputPin<Error = Infallible>,
{
    fn read(&mut self) -> u32 {
        self.value
    }

    fn write(&mut self, value: u32) {
        let changed = (self.value ^ value) & self.pin_map.owned_mask();
        if changed == 0 {
            return;
        }
        // The panel samples data on the rising edge of CLK and LAT, so strobes
        // fall before the other lines move and rise only after they have settled.
        let strobes = self.pin_map.mask(Line::Clock) | self.pin_map.mask(Line::Latch);
        self.drive(changed & strobes & !value, value);
        self.drive(changed & !strobes, value);
        self.drive(changed & strobes & value, value);
        self.value = value & self.pin_map.owned_mask();
    }
}
