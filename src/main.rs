// What you SEE:
// • A dark translucent panel with the configured controls on it.
// • Drag a control with the left mouse button to move it.
// • Double-click (double-tap) cycles how opaque the controls are.
// • H hides/shows the controls. Esc or the Down arrow closes the panel.

use std::io::Cursor;

use clap::Parser;
use image::{ImageFormat, Rgba, RgbaImage};
use log::info;

use touch_overlay::config::{Args, OverlayConfig};
use touch_overlay::draw::Drawer;
use touch_overlay::error::Error;
use touch_overlay::gesture::{AlphaCycler, TapEngine};
use touch_overlay::surface::{MemoryContext, MemoryPixmap};
use touch_overlay::types::{Point, Size};
use touch_overlay::{LabelSet, OverlayController, OverlayLabel, decoder};

fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::parse();
    let config = OverlayConfig::from(&args);

    let mut ctx = MemoryContext::new();
    let mut labels = LabelSet::new();
    for spec in &args.labels {
        labels.push(OverlayLabel::new(
            &mut ctx,
            spec.position,
            spec.size,
            spec.image.as_deref(),
            config.label_alpha,
        ));
    }
    if labels.is_empty() {
        // Nothing configured: put up a d-pad and two buttons to play with.
        for (x, y, w, h, rgb) in [
            (40, 300, 120, 120, [0xe0, 0xe0, 0xe0]),
            (460, 320, 56, 56, [0xd0, 0x40, 0x40]),
            (530, 280, 56, 56, [0x40, 0x60, 0xd0]),
        ] {
            let (position, size) = (Point::new(x, y), Size::new(w, h));
            labels.push(swatch_label(&mut ctx, position, size, rgb, config.label_alpha)?);
        }
    }
    info!("{} controls loaded", labels.len());

    let mut drawer = Drawer::new("Touch Overlay - Configure Controls", &config)?;
    let mut panel = OverlayController::new(config, TapEngine::new(), AlphaCycler);

    while panel.step(&mut drawer, &mut labels) {
        if drawer.h_pressed_once() {
            panel.set_hidden(!panel.is_hidden());
        }
    }

    Ok(())
}

/// A filled disc with a soft edge, encoded to PNG and decoded like any
/// file-backed label.
fn swatch_label(
    ctx: &mut MemoryContext,
    position: Point,
    size: Size,
    rgb: [u8; 3],
    alpha_ceiling: u8,
) -> Result<OverlayLabel<MemoryPixmap>, Error> {
    let (cx, cy) = (size.width as f32 / 2.0, size.height as f32 / 2.0);
    let radius = cx.min(cy);
    let img = RgbaImage::from_fn(size.width, size.height, |x, y| {
        let d = ((x as f32 + 0.5 - cx).powi(2) + (y as f32 + 0.5 - cy).powi(2)).sqrt();
        let a = ((radius - d) * 64.0).clamp(0.0, 255.0) as u8;
        Rgba([rgb[0], rgb[1], rgb[2], a])
    });

    let mut png = Cursor::new(Vec::new());
    img.write_to(&mut png, ImageFormat::Png)?;
    png.set_position(0);

    let image = decoder::decode(png, ctx, alpha_ceiling)?;
    Ok(OverlayLabel::with_image(position, size, Some(image)))
}
