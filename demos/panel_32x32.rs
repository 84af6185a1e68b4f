#![no_std]
#![no_main]
#![cfg(not(feature = "host"))]

use core::{convert::Infallible, panic};

use defmt::info;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_time::{Duration, Instant};
use rgb_panel::{
    Result,
    fps_timer::InterruptFpsTimer,
    panel_port::GpioPort,
    rgb_panel::{RgbPanel, RgbPanelConfig, RgbPanelStatic, pin_map::PinMap},
};
use smart_leds::colors;
use {defmt_rtt as _, panic_probe as _};

// A..E on GPIO 0..4, CLK 5, LAT 6, OE 7, R1 G1 B1 8..10, R2 G2 B2 11..13.
const PICO_MAP: PinMap = PinMap::new([0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13]);
const CONFIG: RgbPanelConfig = RgbPanelConfig::new(32, 32).with_pin_map(PICO_MAP);
const REPORT_EVERY: Duration = Duration::from_secs(5);

type Panel32x32 = RgbPanel<GpioPort<Output<'static>>, 512>;
static PANEL32X32_STATIC: RgbPanelStatic = Panel32x32::new_static();

#[embassy_executor::main]
async fn main(_spawner: Spawner) -> ! {
    let err = inner_main().unwrap_err();
    panic!("{err}");
}

fn inner_main() -> Result<Infallible> {
    let p = embassy_rp::init(Default::default());

    let port = GpioPort::new(
        [
            Output::new(p.PIN_0, Level::Low),
            Output::new(p.PIN_1, Level::Low),
            Output::new(p.PIN_2, Level::Low),
            Output::new(p.PIN_3, Level::Low),
            Output::new(p.PIN_4, Level::Low),
            Output::new(p.PIN_5, Level::Low),
            Output::new(p.PIN_6, Level::Low),
            Output::new(p.PIN_7, Level::Low),
            Output::new(p.PIN_8, Level::Low),
            Output::new(p.PIN_9, Level::Low),
            Output::new(p.PIN_10, Level::Low),
            Output::new(p.PIN_11, Level::Low),
            Output::new(p.PIN_12, Level::Low),
            Output::new(p.PIN_13, Level::Low),
        ],
        PICO_MAP,
    );
    let mut panel32x32 = Panel32x32::new(&PANEL32X32_STATIC, port, CONFIG)?;

    // Red diagonal on top, blue on the bottom, one Art-Net-style run of white.
    for index in 0..16 {
        panel32x32.set_pixel(index, index, colors::RED)?;
        panel32x32.set_pixel(31 - index, 16 + index, colors::BLUE)?;
    }
    panel32x32.set_data(1, &[0xFF; 3 * 12]);
    panel32x32.dump();

    panel32x32.start(&mut InterruptFpsTimer::new())?;

    // Scan-out never yields; the FPS sample runs on the interrupt executor.
    let mut next_report = Instant::now() + REPORT_EVERY;
    loop {
        panel32x32.scan_out();
        if Instant::now() >= next_report {
            info!(
                "frames: {}, fps: {}",
                panel32x32.frame_count(),
                panel32x32.fps()
            );
            next_report += REPORT_EVERY;
        }
    }
}
