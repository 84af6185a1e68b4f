//! Validated panel dimensions.

use crate::rgb_panel::pin_map::ROW_ADDRESS_LINES;
use crate::{Error, Result};

/// Columns, rows and chain length of a HUB75 panel, checked once at construction.
///
/// The panel is scanned as two mirrored halves: half-row `h` drives logical row `h`
/// through R1/G1/B1 and logical row `h + rows / 2` through R2/G2/B2. `width` is the
/// number of pixels shifted per half-row, `columns * chain`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PanelGeometry {
    columns: usize,
    rows: usize,
    chain: usize,
    address_bits: u32,
}

impl PanelGeometry {
    /// Validate and build a geometry.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidColumns`] if `columns` is zero.
    /// - [`Error::InvalidChain`] if `chain` is zero.
    /// - [`Error::InvalidRows`] if `rows` is zero, odd, or needs more than five
    ///   row-address lines (`rows / 2 > 32`).
    pub const fn new(columns: usize, rows: usize, chain: usize) -> Result<Self> {
        if columns == 0 {
            return Err(Error::InvalidColumns { columns });
        }
        if chain == 0 {
            return Err(Error::InvalidChain { chain });
        }
        if rows == 0 || rows % 2 != 0 || rows / 2 > 1 << ROW_ADDRESS_LINES {
            return Err(Error::InvalidRows { rows });
        }
        let half_rows = rows / 2;
        let Some(width) = columns.checked_mul(chain) else {
            return Err(Error::InvalidChain { chain });
        };
        if width.checked_mul(half_rows).is_none() {
            return Err(Error::InvalidColumns { columns });
        }
        let address_bits = usize::BITS - (half_rows - 1).leading_zeros();
        Ok(Self {
            columns,
            rows,
            chain,
            address_bits,
        })
    }

    /// Columns of a single panel.
    #[must_use]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Logical rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Panels on the chain.
    #[must_use]
    pub const fn chain(&self) -> usize {
        self.chain
    }

    /// Pixels shifted per half-row (`columns * chain`).
    #[must_use]
    pub const fn width(&self) -> usize {
        self.columns * self.chain
    }

    /// Scan lines per frame (`rows / 2`).
    #[must_use]
    pub const fn half_rows(&self) -> usize {
        self.rows / 2
    }

    /// Row-address lines actually driven (`ceil(log2(rows / 2))`).
    #[must_use]
    pub const fn address_bits(&self) -> u32 {
        self.address_bits
    }

    /// Framebuffer words needed (`width * rows / 2`).
    #[must_use]
    pub const fn word_count(&self) -> usize {
        self.width() * self.half_rows()
    }
}
