#![cfg(feature = "host")]
//! PNG previews of what a [`SimulatedPanel`] is showing.

use png::{BitDepth, ColorType, Encoder, ScaledFloat};
use smart_leds::RGB8;
use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::panel_host::SimulatedPanel;

const PREVIEW_INVERSE_GAMMA: f32 = 2.2;

/// Render the lit pixels of `panel` into a PNG no larger than `target_max_dimension`.
///
/// # Errors
///
/// I/O and PNG encoding errors.
pub fn write_panel_png(
    panel: &SimulatedPanel,
    output_path: impl AsRef<Path>,
    target_max_dimension: u32,
) -> Result<(), Box<dyn Error>> {
    let geometry = panel.geometry();
    write_pixels_png(
        panel.visible_pixels(),
        u32::try_from(geometry.width())?,
        u32::try_from(geometry.rows())?,
        output_path,
        target_max_dimension,
    )
}

/// Render a row-major `width * height` pixel grid as round LEDs on black.
///
/// # Errors
///
/// I/O and PNG encoding errors.
pub fn write_pixels_png(
    pixels: &[RGB8],
    width: u32,
    height: u32,
    output_path: impl AsRef<Path>,
    target_max_dimension: u32,
) -> Result<(), Box<dyn Error>> {
    assert_eq!(
        pixels.len(),
        (width as usize) * (height as usize),
        "pixel count must equal width * height"
    );
    let output_path = output_path.as_ref();
    let cell_size = select_cell_size(width, height, target_max_dimension);
    let led_margin = (cell_size / 8).max(1);
    let (image_width, image_height, bytes) =
        render_leds(pixels, width, height, cell_size, led_margin);

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(output_path)?;
    let mut encoder = Encoder::new(BufWriter::new(file), image_width, image_height);
    encoder.set_color(ColorType::Rgb);
    encoder.set_depth(BitDepth::Sixteen);
    encoder.set_source_gamma(ScaledFloat::new(1.0));
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&bytes)?;
    writer.finish()?;
    Ok(())
}

fn select_cell_size(panel_width: u32, panel_height: u32, target_max_dimension: u32) -> u32 {
    assert!(target_max_dimension > 0, "target_max_dimension must be positive");
    let mut cell_size = target_max_dimension;
    while cell_size > 4 {
        let led_margin = (cell_size / 8).max(1);
        let led_radius = (cell_size - (led_margin * 2)) / 2;
        let image_width = panel_width * cell_size + led_radius * 2;
        let image_height = panel_height * cell_size + led_radius * 2;
        if image_width.max(image_height) <= target_max_dimension {
            break;
        }
        cell_size -= 1;
    }
    cell_size
}

fn render_leds(
    pixels: &[RGB8],
    width: u32,
    height: u32,
    cell_size: u32,
    led_margin: u32,
) -> (u32, u32, Vec<u8>) {
    let led_radius = ((cell_size - (led_margin * 2)) / 2).max(1);
    let fade_width = (led_radius / 3).max(1);
    let border = led_radius;
    let image_width = width * cell_size + border * 2;
    let image_height = height * cell_size + border * 2;
    let mut bytes = vec![0u8; (image_width * image_height * 3 * 2) as usize];
    let center = (cell_size - 1) as i32 / 2;
    let outer_radius = led_radius as f32;
    let inner_radius = led_radius.saturating_sub(fade_width) as f32;
    let radius_sq = (led_radius as i32) * (led_radius as i32);

    for (pixel_index, pixel) in pixels.iter().enumerate() {
        let column = pixel_index as u32 % width;
        let row = pixel_index as u32 / width;
        let origin_x = border + column * cell_size;
        let origin_y = border + row * cell_size;

        for local_y in 0..cell_size {
            let delta_y = local_y as i32 - center;
            for local_x in 0..cell_size {
                let delta_x = local_x as i32 - center;
                let distance_sq = delta_x * delta_x + delta_y * delta_y;
                if distance_sq > radius_sq {
                    continue;
                }
                let distance = (distance_sq as f32).sqrt();
                let intensity = if distance <= inner_radius {
                    1.0
                } else {
                    (1.0 - (distance - inner_radius) / (outer_radius - inner_radius)).max(0.0)
                };
                let x = origin_x + local_x;
                let y = origin_y + local_y;
                let offset = ((y * image_width + x) * 3 * 2) as usize;
                for (channel_index, channel) in [pixel.r, pixel.g, pixel.b].into_iter().enumerate()
                {
                    let level = linear_to_u16(channel_to_linear(channel) * intensity);
                    let [high, low] = level.to_be_bytes();
                    if let Some(slot) = bytes.get_mut(offset + channel_index * 2..offset + channel_index * 2 + 2) {
                        slot.copy_from_slice(&[high, low]);
                    }
                }
            }
        }
    }

    (image_width, image_height, bytes)
}

fn channel_to_linear(channel: u8) -> f32 {
    (f32::from(channel) / 255.0).powf(PREVIEW_INVERSE_GAMMA)
}

fn linear_to_u16(value: f32) -> u16 {
    (value.clamp(0.0, 1.0) * 65535.0).round() as u16
}
