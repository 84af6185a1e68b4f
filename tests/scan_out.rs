#![cfg(feature = "host")]
#![allow(missing_docs)]
//! Host-level tests for the scan-out waveform, checked against a simulated panel.

use rgb_panel::panel_host::SimulatedPanel;
use rgb_panel::rgb_panel::pin_map::{Line, PinMap};
use rgb_panel::rgb_panel::{RgbPanel, RgbPanelConfig, RgbPanelStatic};
use rgb_panel::Result;
use smart_leds::{RGB8, colors};

const CONFIG: RgbPanelConfig = RgbPanelConfig::new(32, 32);
const PINS: PinMap = PinMap::ORANGE_PI_ZERO;

fn panel_32x32(rgb_panel_static: &'static RgbPanelStatic) -> Result<RgbPanel<SimulatedPanel, 512>> {
    RgbPanel::new(rgb_panel_static, SimulatedPanel::new(CONFIG)?, CONFIG)
}

#[test]
fn new_leaves_the_panel_blanked_and_idle() -> Result<()> {
    static PANEL_STATIC: RgbPanelStatic = RgbPanelStatic::new_static();
    let panel = panel_32x32(&PANEL_STATIC)?;

    assert_eq!(panel.port().value(), PINS.mask(Line::OutputDisable));
    assert_eq!(panel.frame_count(), 0);
    assert!(!panel.is_started());
    Ok(())
}

#[test]
fn each_scan_out_counts_one_frame() -> Result<()> {
    static PANEL_STATIC: RgbPanelStatic = RgbPanelStatic::new_static();
    let mut panel = panel_32x32(&PANEL_STATIC)?;

    panel.scan_out();
    assert_eq!(panel.frame_count(), 1);
    for _ in 0..9 {
        panel.scan_out();
    }
    assert_eq!(panel.frame_count(), 10);
    Ok(())
}

#[test]
fn single_half_row_waveform_is_shift_blank_latch_select_unblank() -> Result<()> {
    const TINY: RgbPanelConfig = RgbPanelConfig::new(1, 2);
    static PANEL_STATIC: RgbPanelStatic = RgbPanelStatic::new_static();
    let mut panel = RgbPanel::<_, 1>::new(&PANEL_STATIC, SimulatedPanel::new(TINY)?, TINY)?;
    panel.set_pixel(0, 0, colors::RED)?;
    panel.port_mut().clear_writes();

    let clock = PINS.mask(Line::Clock);
    let latch = PINS.mask(Line::Latch);
    let blank = PINS.mask(Line::OutputDisable);
    let red = PINS.mask(Line::RedTop);

    panel.scan_out();
    assert_eq!(
        panel.port().writes(),
        &[
            blank | clock | red, // shift: clock high with data
            blank | red,         // shift: clock low, data held
            blank,               // blank
            blank | latch,       // latch pulse while blanked
            blank,               // latch released
            blank,               // row select (one half-row, no address lines)
            0,                   // unblank
        ]
    );
    assert_eq!(panel.port().visible_pixel(0, 0), colors::RED);
    Ok(())
}

#[test]
fn write_count_is_fixed_per_frame() -> Result<()> {
    static PANEL_STATIC: RgbPanelStatic = RgbPanelStatic::new_static();
    let mut panel = panel_32x32(&PANEL_STATIC)?;
    panel.port_mut().clear_writes();

    panel.scan_out();
    assert_eq!(panel.port().writes().len(), 16 * (2 * 32 + 5));
    assert_eq!(panel.port().clock_pulses(), 16 * 32);
    assert_eq!(panel.port().latch_pulses(), 16);
    Ok(())
}

#[test]
fn latch_and_row_address_change_only_while_blanked() -> Result<()> {
    static PANEL_STATIC: RgbPanelStatic = RgbPanelStatic::new_static();
    let mut panel = panel_32x32(&PANEL_STATIC)?;
    panel.set_pixel(4, 4, colors::WHITE)?;

    for _ in 0..3 {
        panel.scan_out();
    }
    assert_eq!(panel.port().latches_while_enabled(), 0);
    assert_eq!(panel.port().address_changes_while_enabled(), 0);
    Ok(())
}

#[test]
fn bits_outside_the_pin_map_are_preserved() -> Result<()> {
    // Bits 4 and 5 belong to UART0 on the Orange Pi Zero.
    const UART0: u32 = 0b11 << 4;
    static PANEL_STATIC: RgbPanelStatic = RgbPanelStatic::new_static();
    let port = SimulatedPanel::new(CONFIG)?.with_foreign_bits(UART0);
    let mut panel = RgbPanel::<_, 512>::new(&PANEL_STATIC, port, CONFIG)?;
    panel.set_pixel(0, 0, colors::WHITE)?;
    panel.set_pixel(31, 31, colors::WHITE)?;

    panel.scan_out();
    panel.scan_out();
    assert_eq!(panel.port().foreign_bit_changes(), 0);
    assert_eq!(panel.port().value() & UART0, UART0);
    assert!(panel.port().writes().iter().all(|&value| value & UART0 == UART0));
    Ok(())
}

#[test]
fn panel_shows_the_framebuffer_after_one_frame() -> Result<()> {
    static PANEL_STATIC: RgbPanelStatic = RgbPanelStatic::new_static();
    let mut panel = panel_32x32(&PANEL_STATIC)?;
    for index in 0..32 {
        panel.set_pixel(index, index, colors::RED)?;
        panel.set_pixel(31 - index, index, colors::BLUE)?;
    }
    panel.set_pixel(5, 0, colors::YELLOW)?;
    panel.set_pixel(5, 16, colors::CYAN)?;

    panel.scan_out();
    for row in 0..32 {
        for column in 0..32 {
            assert_eq!(
                panel.port().visible_pixel(column, row),
                panel.pixel(column, row)?,
                "mismatch at ({column}, {row})"
            );
        }
    }
    assert_eq!(panel.port().visible_pixel(5, 0), RGB8::new(255, 255, 0));
    Ok(())
}

#[test]
fn updates_show_up_on_the_next_frame() -> Result<()> {
    static PANEL_STATIC: RgbPanelStatic = RgbPanelStatic::new_static();
    let mut panel = panel_32x32(&PANEL_STATIC)?;

    panel.set_pixel(8, 9, colors::WHITE)?;
    panel.scan_out();
    assert_eq!(panel.port().visible_pixel(8, 9), colors::WHITE);

    panel.clear();
    panel.scan_out();
    assert_eq!(panel.port().visible_pixel(8, 9), colors::BLACK);
    Ok(())
}

#[test]
fn sixty_four_row_panel_drives_the_e_line() -> Result<()> {
    const TALL: RgbPanelConfig = RgbPanelConfig::new(32, 64);
    static PANEL_STATIC: RgbPanelStatic = RgbPanelStatic::new_static();
    let mut panel = RgbPanel::<_, 1024>::new(&PANEL_STATIC, SimulatedPanel::new(TALL)?, TALL)?;
    assert_eq!(panel.geometry().address_bits(), 5);

    panel.set_pixel(0, 31, colors::RED)?;
    panel.set_pixel(0, 63, colors::BLUE)?;
    panel.port_mut().clear_writes();
    panel.scan_out();

    let e_line = PINS.mask(Line::E);
    assert!(panel.port().writes().iter().any(|&value| value & e_line != 0));
    assert_eq!(panel.port().visible_pixel(0, 31), colors::RED);
    assert_eq!(panel.port().visible_pixel(0, 63), colors::BLUE);
    assert_eq!(panel.port().address_changes_while_enabled(), 0);
    Ok(())
}

#[test]
fn thirty_two_row_panel_leaves_the_e_line_alone() -> Result<()> {
    static PANEL_STATIC: RgbPanelStatic = RgbPanelStatic::new_static();
    let mut panel = panel_32x32(&PANEL_STATIC)?;
    panel.port_mut().clear_writes();

    panel.scan_out();
    let e_line = PINS.mask(Line::E);
    assert!(panel.port().writes().iter().all(|&value| value & e_line == 0));
    Ok(())
}

#[test]
fn row_address_round_trips_through_the_pin_map() {
    for half_row in 0..32 {
        let value = PINS.row_address(half_row, 5);
        assert_eq!(value & !PINS.address_mask(5), 0);
        assert_eq!(PINS.decode_row_address(value, 5), half_row);
    }
    assert_eq!(PINS.row_address(1, 4), PINS.mask(Line::A));
    assert_eq!(PINS.row_address(16, 5), PINS.mask(Line::E));
}
