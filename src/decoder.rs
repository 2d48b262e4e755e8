// PNG to native pixmap pipeline for label images.
// The decoded buffer is always 8-bit B, G, R, A whatever the source
// encoding. The pixmap is filled using its own stride and may be
// alpha-clamped afterwards; the decoded buffer keeps the original alpha.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek};
use std::path::Path;

use image::codecs::png::PngDecoder;
use image::{ColorType, ImageDecoder, ImageError, Limits};
use log::{debug, warn};

use crate::error::{DecodeError, SurfaceError};
use crate::surface::{BufferView, PixelFormat, Pixmap, RenderBuffer, ScreenContext, Usage};
use crate::types::{PixelImage, Size};

/// `adjust_alpha` leaves pixels at or below this alpha alone.
pub const ADJUST_ALPHA_FLOOR: u8 = 0x10;

const CHANNELS: usize = 4;

/// A configured pixmap holding one uploaded image.
pub struct NativeSurface<P: Pixmap> {
    pixmap: P,
}

impl<P: Pixmap> NativeSurface<P> {
    /// Create and configure a pixmap. On error the half-built pixmap is
    /// dropped (and so released) before returning.
    fn allocate<C>(ctx: &mut C, size: Size) -> Result<Self, SurfaceError>
    where
        C: ScreenContext<Pixmap = P>,
    {
        let mut pixmap = ctx.create_pixmap()?;
        pixmap.set_format(PixelFormat::Rgba8888)?;
        pixmap.set_buffer_size(size)?;
        pixmap.set_usage(Usage::NATIVE | Usage::READ | Usage::WRITE)?;
        pixmap.create_buffer()?;
        Ok(Self { pixmap })
    }

    fn upload(&mut self, image: &PixelImage) -> Result<(), SurfaceError> {
        let RenderBuffer { pixels, stride } = self.pixmap.render_buffer()?;
        let row_len = image.width as usize * CHANNELS;
        for y in 0..image.height as usize {
            let dst = &mut pixels[y * stride..y * stride + row_len];
            dst.copy_from_slice(image.row(y));
        }
        Ok(())
    }

    /// Run `f` over every alpha byte of the pixmap.
    fn for_each_alpha(&mut self, mut f: impl FnMut(&mut u8)) -> Result<(), SurfaceError> {
        let size = self.pixmap.size();
        let RenderBuffer { pixels, stride } = self.pixmap.render_buffer()?;
        let row_len = size.width as usize * CHANNELS;
        for y in 0..size.height as usize {
            let row = &mut pixels[y * stride..y * stride + row_len];
            for px in row.chunks_exact_mut(CHANNELS) {
                f(&mut px[3]);
            }
        }
        Ok(())
    }

    pub fn view(&self) -> Result<BufferView<'_>, SurfaceError> {
        self.pixmap.view()
    }

    pub fn pixmap(&self) -> &P {
        &self.pixmap
    }
}

/// A decoded label image and the pixmap it was uploaded into.
///
/// Fields drop in declaration order: the decoded buffer goes first, the
/// pixmap (which owns its render buffer) last.
pub struct DecodedImage<P: Pixmap> {
    image: PixelImage,
    surface: NativeSurface<P>,
    alpha_ceiling: u8,
}

impl<P: Pixmap> DecodedImage<P> {
    pub fn image(&self) -> &PixelImage {
        &self.image
    }

    pub fn surface(&self) -> &NativeSurface<P> {
        &self.surface
    }

    pub fn width(&self) -> u32 {
        self.image.width
    }

    pub fn height(&self) -> u32 {
        self.image.height
    }

    pub fn alpha_ceiling(&self) -> u8 {
        self.alpha_ceiling
    }

    /// Re-clamp the pixmap: every alpha above `ADJUST_ALPHA_FLOOR` becomes
    /// `ceiling`. Zero leaves everything as is. Returns the ceiling now in
    /// effect.
    pub fn adjust_alpha(&mut self, ceiling: u8) -> u8 {
        if ceiling == 0 {
            return self.alpha_ceiling;
        }
        let applied = self.surface.for_each_alpha(|a| {
            if *a > ADJUST_ALPHA_FLOOR {
                *a = ceiling;
            }
        });
        match applied {
            Ok(()) => self.alpha_ceiling = ceiling,
            Err(err) => warn!("adjust_alpha({ceiling:#04x}) skipped: {err}"),
        }
        self.alpha_ceiling
    }
}

/// Open `path` and decode it; see [`decode`].
pub fn decode_file<C: ScreenContext>(
    path: &Path,
    ctx: &mut C,
    alpha_ceiling: u8,
) -> Result<DecodedImage<C::Pixmap>, DecodeError> {
    let file = File::open(path)?;
    decode(BufReader::new(file), ctx, alpha_ceiling)
}

/// Decode a PNG stream and upload it into a fresh pixmap from `ctx`.
///
/// `alpha_ceiling` of 0 means no clamp; otherwise every pixmap alpha
/// above it is lowered to it.
pub fn decode<R, C>(
    reader: R,
    ctx: &mut C,
    alpha_ceiling: u8,
) -> Result<DecodedImage<C::Pixmap>, DecodeError>
where
    R: BufRead + Seek,
    C: ScreenContext,
{
    let image = read_png(reader)?;
    debug!("decoded {}x{} PNG, stride {}", image.width, image.height, image.stride);

    let size = Size::new(image.width, image.height);
    let mut surface = NativeSurface::allocate(ctx, size)?;
    surface.upload(&image)?;

    if alpha_ceiling > 0 {
        surface.for_each_alpha(|a| {
            if *a > alpha_ceiling {
                *a = alpha_ceiling;
            }
        })?;
    }

    Ok(DecodedImage { image, surface, alpha_ceiling })
}

/// Decode to a tightly packed BGRA buffer.
fn read_png<R: BufRead + Seek>(reader: R) -> Result<PixelImage, DecodeError> {
    let invalid = |e: ImageError| DecodeError::InvalidHeader(e.to_string());
    let mut limits = Limits::default();
    let decoder = PngDecoder::with_limits(reader, limits.clone()).map_err(invalid)?;
    let (width, height) = decoder.dimensions();
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidDimensions { width, height });
    }

    // The header's size is untrusted until it fits the allocation limit.
    limits.reserve(decoder.total_bytes()).map_err(invalid)?;

    // The PNG decoder already expands palette, tRNS and sub-byte gray.
    let color = decoder.color_type();
    let total = usize::try_from(decoder.total_bytes())
        .map_err(|_| DecodeError::InvalidDimensions { width, height })?;
    let mut raw = vec![0u8; total];
    decoder.read_image(&mut raw).map_err(invalid)?;

    let stride = width as usize * CHANNELS;
    let mut pixels = Vec::with_capacity(stride * height as usize);
    normalize(color, &raw, &mut pixels)?;

    Ok(PixelImage { width, height, stride, pixels })
}

/// Expand one decoded buffer into B, G, R, A bytes.
/// 16-bit samples keep their high byte; missing alpha becomes 0xFF.
fn normalize(color: ColorType, raw: &[u8], out: &mut Vec<u8>) -> Result<(), DecodeError> {
    let hi = |s: &[u8], i: usize| (u16::from_ne_bytes([s[2 * i], s[2 * i + 1]]) >> 8) as u8;

    match color {
        ColorType::L8 => raw.iter().for_each(|&l| out.extend_from_slice(&[l, l, l, 0xff])),
        ColorType::La8 => {
            for px in raw.chunks_exact(2) {
                out.extend_from_slice(&[px[0], px[0], px[0], px[1]]);
            }
        }
        ColorType::Rgb8 => {
            for px in raw.chunks_exact(3) {
                out.extend_from_slice(&[px[2], px[1], px[0], 0xff]);
            }
        }
        ColorType::Rgba8 => {
            for px in raw.chunks_exact(4) {
                out.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
            }
        }
        ColorType::L16 => {
            for px in raw.chunks_exact(2) {
                let l = hi(px, 0);
                out.extend_from_slice(&[l, l, l, 0xff]);
            }
        }
        ColorType::La16 => {
            for px in raw.chunks_exact(4) {
                let l = hi(px, 0);
                out.extend_from_slice(&[l, l, l, hi(px, 1)]);
            }
        }
        ColorType::Rgb16 => {
            for px in raw.chunks_exact(6) {
                out.extend_from_slice(&[hi(px, 2), hi(px, 1), hi(px, 0), 0xff]);
            }
        }
        ColorType::Rgba16 => {
            for px in raw.chunks_exact(8) {
                out.extend_from_slice(&[hi(px, 2), hi(px, 1), hi(px, 0), hi(px, 3)]);
            }
        }
        other => {
            return Err(DecodeError::InvalidHeader(format!("unsupported PNG layout {other:?}")));
        }
    }
    Ok(())
}
