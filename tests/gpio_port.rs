#![cfg(feature = "host")]
#![allow(missing_docs)]
//! Host-level tests for binding the panel port to individual output pins.

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, OutputPin};
use rgb_panel::panel_port::{GpioPort, PanelPort};
use rgb_panel::rgb_panel::pin_map::{Line, PinMap};
use rgb_panel::rgb_panel::{RgbPanel, RgbPanelConfig, RgbPanelStatic};
use rgb_panel::Result;
use smart_leds::colors;

// A..E on 0..4, CLK 5, LAT 6, OE 7, R1 G1 B1 8..10, R2 G2 B2 11..13.
const PICO_MAP: PinMap = PinMap::new([0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13]);

#[derive(Clone, Default)]
struct RecordingPin {
    high: Rc<Cell<bool>>,
    changes: Rc<Cell<usize>>,
}

impl RecordingPin {
    fn set(&mut self, high: bool) {
        if self.high.get() != high {
            self.changes.set(self.changes.get() + 1);
        }
        self.high.set(high);
    }
}

impl ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(true);
        Ok(())
    }
}

fn recording_port() -> ([RecordingPin; Line::COUNT], GpioPort<RecordingPin>) {
    let pins: [RecordingPin; Line::COUNT] = std::array::from_fn(|_| RecordingPin::default());
    let port = GpioPort::new(pins.clone(), PICO_MAP);
    (pins, port)
}

fn pin<'a>(pins: &'a [RecordingPin; Line::COUNT], line: Line) -> &'a RecordingPin {
    &pins[line as usize]
}

#[test]
fn new_starts_blanked() {
    let (pins, mut port) = recording_port();
    for line in Line::ALL {
        assert_eq!(
            pin(&pins, line).high.get(),
            line == Line::OutputDisable,
            "{line:?}"
        );
    }
    assert_eq!(port.read(), PICO_MAP.mask(Line::OutputDisable));
}

#[test]
fn writes_reach_the_mapped_pins() {
    let (pins, mut port) = recording_port();

    port.write(PICO_MAP.mask(Line::Clock) | PICO_MAP.mask(Line::BlueBottom));
    assert!(pin(&pins, Line::Clock).high.get());
    assert!(pin(&pins, Line::BlueBottom).high.get());
    assert!(!pin(&pins, Line::Latch).high.get());
    assert_eq!(port.read(), PICO_MAP.mask(Line::Clock) | PICO_MAP.mask(Line::BlueBottom));
}

#[test]
fn only_changed_pins_are_touched() {
    let (pins, mut port) = recording_port();
    let clock = PICO_MAP.mask(Line::Clock);

    port.write(clock);
    port.write(clock);
    port.write(0);
    assert_eq!(pin(&pins, Line::Clock).changes.get(), 2);
    assert_eq!(pin(&pins, Line::RedTop).changes.get(), 0);
}

#[test]
fn bits_outside_the_map_are_dropped() {
    let (_pins, mut port) = recording_port();
    port.write(1 << 31 | PICO_MAP.mask(Line::A));
    assert_eq!(port.read(), PICO_MAP.mask(Line::A));
}

#[test]
fn scan_out_ends_unblanked_on_the_last_half_row() -> Result<()> {
    const CONFIG: RgbPanelConfig = RgbPanelConfig::new(16, 8).with_pin_map(PICO_MAP);
    static PANEL_STATIC: RgbPanelStatic = RgbPanelStatic::new_static();
    let (pins, port) = recording_port();
    let mut panel = RgbPanel::<_, 64>::new(&PANEL_STATIC, port, CONFIG)?;
    assert!(pin(&pins, Line::OutputDisable).high.get());

    panel.set_pixel(15, 3, colors::WHITE)?;
    panel.scan_out();

    // Last half-row is 3 (A and B high); its last shifted word is the white pixel.
    assert!(!pin(&pins, Line::OutputDisable).high.get());
    assert!(pin(&pins, Line::A).high.get());
    assert!(pin(&pins, Line::B).high.get());
    assert!(!pin(&pins, Line::C).high.get());
    assert!(!pin(&pins, Line::Latch).high.get());
    assert!(!pin(&pins, Line::Clock).high.get());
    assert_eq!(pin(&pins, Line::Latch).changes.get(), 2 * 4);
    Ok(())
}

/// All fourteen lines on one wire, as the panel sees them. Colour lines are
/// sampled on every CLK rising edge and the output state on every LAT rising edge.
#[derive(Default)]
struct Wire {
    high: [bool; Line::COUNT],
    clocked: Vec<u32>,
    latched_while_enabled: usize,
}

impl Wire {
    fn color_word(&self) -> u32 {
        [
            Line::RedTop,
            Line::GreenTop,
            Line::BlueTop,
            Line::RedBottom,
            Line::GreenBottom,
            Line::BlueBottom,
        ]
        .into_iter()
        .filter(|&line| self.high[line as usize])
        .fold(0, |word, line| word | PICO_MAP.mask(line))
    }
}

struct WirePin {
    wire: Rc<RefCell<Wire>>,
    line: Line,
}

impl WirePin {
    fn drive(&mut self, high: bool) {
        let mut wire = self.wire.borrow_mut();
        let rising = high && !wire.high[self.line as usize];
        wire.high[self.line as usize] = high;
        if !rising {
            return;
        }
        match self.line {
            Line::Clock => {
                let word = wire.color_word();
                wire.clocked.push(word);
            }
            Line::Latch if !wire.high[Line::OutputDisable as usize] => {
                wire.latched_while_enabled += 1;
            }
            _ => {}
        }
    }
}

impl ErrorType for WirePin {
    type Error = Infallible;
}

impl OutputPin for WirePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }
}

fn wire_port() -> (Rc<RefCell<Wire>>, GpioPort<WirePin>) {
    let wire = Rc::new(RefCell::new(Wire::default()));
    let pins = Line::ALL.map(|line| WirePin {
        wire: Rc::clone(&wire),
        line,
    });
    (wire, GpioPort::new(pins, PICO_MAP))
}

#[test]
fn clock_edge_sees_the_column_being_shifted() -> Result<()> {
    const CONFIG: RgbPanelConfig = RgbPanelConfig::new(4, 2).with_pin_map(PICO_MAP);
    static PANEL_STATIC: RgbPanelStatic = RgbPanelStatic::new_static();
    let (wire, port) = wire_port();
    let mut panel = RgbPanel::<_, 4>::new(&PANEL_STATIC, port, CONFIG)?;

    panel.set_pixel(0, 0, colors::RED)?;
    panel.scan_out();

    let red = PICO_MAP.mask(Line::RedTop);
    let clocked_red: Vec<bool> = wire
        .borrow()
        .clocked
        .iter()
        .map(|&word| word & red != 0)
        .collect();
    assert_eq!(clocked_red, [true, false, false, false]);
    Ok(())
}

#[test]
fn shifted_columns_match_the_framebuffer() -> Result<()> {
    const CONFIG: RgbPanelConfig = RgbPanelConfig::new(8, 8).with_pin_map(PICO_MAP);
    static PANEL_STATIC: RgbPanelStatic = RgbPanelStatic::new_static();
    let (wire, port) = wire_port();
    let mut panel = RgbPanel::<_, 32>::new(&PANEL_STATIC, port, CONFIG)?;

    for index in 0..8 {
        panel.set_pixel(index, index, colors::WHITE)?;
        panel.set_pixel(7 - index, index, colors::BLUE)?;
    }
    panel.set_pixel(7, 0, colors::RED)?;
    panel.scan_out();
    panel.scan_out();

    let wire = wire.borrow();
    let frame = panel.framebuffer_words();
    assert_eq!(wire.clocked.len(), 2 * frame.len());
    assert_eq!(&wire.clocked[..frame.len()], frame);
    assert_eq!(&wire.clocked[frame.len()..], frame);
    assert_eq!(wire.latched_while_enabled, 0);
    Ok(())
}
