//! Error type shared by every part of the crate.

use derive_more::{Display, Error};

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors reported by the RGB panel driver.
#[derive(Debug, Display, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Panels must be at least one column wide.
    #[display("panel must have at least one column (got {columns})")]
    InvalidColumns {
        /// Requested column count.
        columns: usize,
    },

    /// At least one panel must be on the chain.
    #[display("chain must contain at least one panel (got {chain})")]
    InvalidChain {
        /// Requested chain length.
        chain: usize,
    },

    /// Row count must be even, non-zero, and addressable by the five row-select lines.
    #[display("row count {rows} is not a supported scan geometry")]
    InvalidRows {
        /// Requested row count.
        rows: usize,
    },

    /// The framebuffer capacity chosen at compile time cannot hold the panel.
    #[display("framebuffer needs {required} words but only {capacity} are available")]
    FramebufferTooSmall {
        /// Words needed for `columns * chain * rows / 2`.
        required: usize,
        /// Words the framebuffer can hold.
        capacity: usize,
    },

    /// Column outside `0..width`.
    #[display("column {column} is outside the {width}-column panel")]
    ColumnOutOfRange {
        /// Offending column.
        column: usize,
        /// Panel width (columns times chain).
        width: usize,
    },

    /// Row outside `0..rows`.
    #[display("row {row} is outside the {rows}-row panel")]
    RowOutOfRange {
        /// Offending row.
        row: usize,
        /// Panel height.
        rows: usize,
    },

    /// `start` was called a second time.
    #[display("frame statistics timer already started")]
    AlreadyStarted,

    /// The interrupt executor could not spawn the sampling task.
    #[cfg(not(feature = "host"))]
    #[display("failed to spawn frame statistics task")]
    TaskSpawn(#[error(not(source))] embassy_executor::SpawnError),
}
