//! Logical HUB75 lines and where they live in the 32-bit port word.
//!
//! Framebuffer words are raw port images: the colour bits of a stored word sit at
//! exactly the bit positions the panel's R1/G1/B1/R2/G2/B2 lines occupy on the
//! port, so the scan-out loop can OR a word straight into the port value.
//!
//! See [`PinMap`] for the wiring description and [`PinMap::ORANGE_PI_ZERO`] for the
//! reference board.

/// Number of row-address lines (`A` to `E`).
pub const ROW_ADDRESS_LINES: usize = 5;

/// One physical HUB75 signal.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Line {
    /// Row address bit 0.
    A,
    /// Row address bit 1.
    B,
    /// Row address bit 2.
    C,
    /// Row address bit 3.
    D,
    /// Row address bit 4 (64-row panels).
    E,
    /// Shift-register clock.
    Clock,
    /// Latch (LAT / STB).
    Latch,
    /// Output disable (OE, active high blanks the panel).
    OutputDisable,
    /// Red, top half.
    RedTop,
    /// Green, top half.
    GreenTop,
    /// Blue, top half.
    BlueTop,
    /// Red, bottom half.
    RedBottom,
    /// Green, bottom half.
    GreenBottom,
    /// Blue, bottom half.
    BlueBottom,
}

impl Line {
    /// Number of lines a HUB75 connector carries.
    pub const COUNT: usize = 14;

    /// Every line, in port-binding order.
    ///
    /// [`GpioPort`](crate::panel_port::GpioPort) expects its pins in this order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::A,
        Self::B,
        Self::C,
        Self::D,
        Self::E,
        Self::Clock,
        Self::Latch,
        Self::OutputDisable,
        Self::RedTop,
        Self::GreenTop,
        Self::BlueTop,
        Self::RedBottom,
        Self::GreenBottom,
        Self::BlueBottom,
    ];

    /// Row-address lines, least significant first.
    pub const ROW_ADDRESS: [Self; ROW_ADDRESS_LINES] = [Self::A, Self::B, Self::C, Self::D, Self::E];
}

/// Which half of the panel a logical row belongs to.
///
/// The top half is driven by R1/G1/B1, the bottom half by R2/G2/B2. Both halves are
/// shifted out together, so they share one framebuffer word per (half-row, column).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Half {
    /// Rows `0..rows/2`.
    Top,
    /// Rows `rows/2..rows`.
    Bottom,
}

/// Bit position of every [`Line`] within the port word.
///
/// Positions are checked when the map is built: each must be below 32 and no two
/// lines may share a bit. Building a bad map in a `const` is a compile error.
///
/// ```rust
/// use rgb_panel::rgb_panel::pin_map::{Line, PinMap};
///
/// // Consecutive GPIOs 0..=13, in `Line::ALL` order.
/// const CONSECUTIVE: PinMap = PinMap::new([0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13]);
/// assert_eq!(CONSECUTIVE.mask(Line::Clock), 1 << 5);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PinMap {
    bits: [u8; Line::COUNT],
}

impl PinMap {
    /// Orange Pi Zero (Allwinner H3) wiring on GPIO port A.
    ///
    /// `E` is not wired on that board; it is assigned PA20 here so 64-row panels
    /// have somewhere to go. PA4/PA5 carry UART0 and are never touched.
    pub const ORANGE_PI_ZERO: Self = Self::new([0, 1, 2, 3, 20, 10, 6, 7, 13, 14, 15, 16, 18, 19]);

    /// Build a map from bit positions listed in [`Line::ALL`] order.
    #[must_use]
    pub const fn new(bits: [u8; Line::COUNT]) -> Self {
        let mut i = 0;
        while i < Line::COUNT {
            assert!(bits[i] < 32, "pin bit positions must be below 32");
            let mut j = i + 1;
            while j < Line::COUNT {
                assert!(bits[i] != bits[j], "two lines share one port bit");
                j += 1;
            }
            i += 1;
        }
        Self { bits }
    }

    /// Bit position of `line`.
    #[must_use]
    pub const fn bit(&self, line: Line) -> u8 {
        self.bits[line as usize]
    }

    /// Single-bit mask of `line`.
    #[must_use]
    pub const fn mask(&self, line: Line) -> u32 {
        1 << self.bit(line)
    }

    /// Mask of the three colour lines owned by `half`.
    #[must_use]
    pub const fn color_mask(&self, half: Half) -> u32 {
        match half {
            Half::Top => {
                self.mask(Line::RedTop) | self.mask(Line::GreenTop) | self.mask(Line::BlueTop)
            }
            Half::Bottom => {
                self.mask(Line::RedBottom)
                    | self.mask(Line::GreenBottom)
                    | self.mask(Line::BlueBottom)
            }
        }
    }

    /// Mask of all six colour lines.
    #[must_use]
    pub const fn data_mask(&self) -> u32 {
        self.color_mask(Half::Top) | self.color_mask(Half::Bottom)
    }

    /// Mask of the first `address_bits` row-address lines.
    #[must_use]
    pub const fn address_mask(&self, address_bits: u32) -> u32 {
        let mut mask = 0;
        let mut i = 0;
        while i < address_bits as usize && i < ROW_ADDRESS_LINES {
            mask |= self.mask(Line::ROW_ADDRESS[i]);
            i += 1;
        }
        mask
    }

    /// Every bit the driver may drive.
    #[must_use]
    pub const fn owned_mask(&self) -> u32 {
        let mut mask = 0;
        let mut i = 0;
        while i < Line::COUNT {
            mask |= 1 << self.bits[i];
            i += 1;
        }
        mask
    }

    /// Spread `half_row` over the first `address_bits` row-address lines.
    #[must_use]
    pub const fn row_address(&self, half_row: usize, address_bits: u32) -> u32 {
        let mut value = 0;
        let mut i = 0;
        while i < address_bits as usize && i < ROW_ADDRESS_LINES {
            if half_row & (1 << i) != 0 {
                value |= self.mask(Line::ROW_ADDRESS[i]);
            }
            i += 1;
        }
        value
    }

    /// Inverse of [`row_address`](Self::row_address): read the half-row index back out of a port value.
    #[must_use]
    pub const fn decode_row_address(&self, port_value: u32, address_bits: u32) -> usize {
        let mut half_row = 0;
        let mut i = 0;
        while i < address_bits as usize && i < ROW_ADDRESS_LINES {
            if port_value & self.mask(Line::ROW_ADDRESS[i]) != 0 {
                half_row |= 1 << i;
            }
            i += 1;
        }
        half_row
    }
}

impl Default for PinMap {
    fn default() -> Self {
        Self::ORANGE_PI_ZERO
    }
}
