// Blends label pixmaps onto the panel frame.
// Mixing happens in linear light through two lookup tables, so soft label
// edges don't darken against the grey panel.

use std::sync::OnceLock;

use crate::surface::BufferView;
use crate::types::{FrameSurface, Point};

// 12-bit fixed point linear light.
const LINEAR_MAX: u32 = 4095;

/// sRGB byte <-> 12-bit linear intensity.
struct LightTables {
    expand: [u16; 256],
    compress: [u8; LINEAR_MAX as usize + 1],
}

fn tables() -> &'static LightTables {
    static TABLES: OnceLock<LightTables> = OnceLock::new();
    TABLES.get_or_init(|| {
        let expand = std::array::from_fn(|v| {
            let c = v as f64 / 255.0;
            let lin = if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) };
            (lin * LINEAR_MAX as f64).round() as u16
        });
        let compress = std::array::from_fn(|i| {
            let lin = i as f64 / LINEAR_MAX as f64;
            let c = if lin <= 0.003_130_8 {
                12.92 * lin
            } else {
                1.055 * lin.powf(1.0 / 2.4) - 0.055
            };
            (c * 255.0).round().clamp(0.0, 255.0) as u8
        });
        LightTables { expand, compress }
    })
}

/// Mix one colour channel, `alpha` parts `src` over `255 - alpha` parts `dst`.
fn mix_channel(light: &LightTables, src: u8, dst: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    let s = light.expand[src as usize] as u32;
    let d = light.expand[dst as usize] as u32;
    let lin = (s * a + d * (255 - a) + 127) / 255;
    light.compress[lin.min(LINEAR_MAX) as usize]
}

/// Source-over blit of a BGRA `src` (`width` x `height`) onto `dst` at
/// `origin`, clipped to the frame. Destination alpha keeps the larger of
/// the two.
pub fn blit_over(
    dst: &mut FrameSurface,
    src: &BufferView<'_>,
    width: usize,
    height: usize,
    origin: Point,
) {
    let light = tables();

    for sy in 0..height {
        let dy = origin.y + sy as i32;
        if dy < 0 || dy >= dst.height as i32 {
            continue;
        }
        for sx in 0..width {
            let dx = origin.x + sx as i32;
            if dx < 0 || dx >= dst.width as i32 {
                continue;
            }
            let si = sy * src.stride + sx * 4;
            let di = dy as usize * dst.stride + dx as usize * 4;
            let s = &src.pixels[si..si + 4];
            let d = &mut dst.pixels[di..di + 4];

            match s[3] {
                0 => {}
                0xff => d.copy_from_slice(s),
                a => {
                    for c in 0..3 {
                        d[c] = mix_channel(light, s[c], d[c], a);
                    }
                    d[3] = d[3].max(a);
                }
            }
        }
    }
}
