// On-screen labels: a rectangle on the panel, optionally backed by a PNG.

use std::path::Path;

use log::{debug, warn};

use crate::blend::blit_over;
use crate::decoder::{self, DecodedImage};
use crate::surface::{Pixmap, ScreenContext};
use crate::types::{FrameSurface, Point, Size};

/// Alpha ceiling labels are decoded with.
pub const LABEL_ALPHA: u8 = 0x3F;

/// Where a label's pixmap is shown on the panel, and whether it is shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LabelWindow {
    position: Point,
    size: Size,
    visible: bool,
}

impl LabelWindow {
    fn new(position: Point, size: Size) -> Self {
        Self { position, size, visible: true }
    }

    fn move_to(&mut self, position: Point) {
        self.position = position;
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

pub struct OverlayLabel<P: Pixmap> {
    position: Point,
    size: Size,
    alpha: u8, // 0 until the first adjust
    window: Option<LabelWindow>,
    image: Option<DecodedImage<P>>,
}

impl<P: Pixmap> OverlayLabel<P> {
    /// Build a label, decoding `image_path` (clamped to `alpha_ceiling`) if
    /// one is given. A missing or broken image leaves a blank label that
    /// still takes part in layout and hit-testing.
    pub fn new<C>(
        ctx: &mut C,
        position: Point,
        size: Size,
        image_path: Option<&Path>,
        alpha_ceiling: u8,
    ) -> Self
    where
        C: ScreenContext<Pixmap = P>,
    {
        let image = image_path.and_then(|path| {
            decoder::decode_file(path, ctx, alpha_ceiling)
                .inspect_err(|err| warn!("label image {} not loaded: {err}", path.display()))
                .ok()
        });
        Self::with_image(position, size, image)
    }

    pub fn with_image(position: Point, size: Size, image: Option<DecodedImage<P>>) -> Self {
        let window = image.as_ref().map(|_| LabelWindow::new(position, size));
        Self { position, size, alpha: 0, window, image }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn alpha(&self) -> u8 {
        self.alpha
    }

    pub fn image(&self) -> Option<&DecodedImage<P>> {
        self.image.as_ref()
    }

    pub fn window(&self) -> Option<&LabelWindow> {
        self.window.as_ref()
    }

    pub fn contains(&self, point: Point) -> bool {
        let rel = point - self.position;
        rel.x >= 0
            && rel.y >= 0
            && (rel.x as u32) < self.size.width
            && (rel.y as u32) < self.size.height
    }

    pub fn translate(&mut self, delta: Point) {
        self.set_position(self.position + delta);
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
        if let Some(window) = self.window.as_mut() {
            window.move_to(position);
        }
    }

    pub fn hide(&mut self, hidden: bool) {
        if let Some(window) = self.window.as_mut() {
            window.set_visible(!hidden);
        }
    }

    /// Re-clamp the label's pixmap to `alpha`. Skipped for blank labels and
    /// when the value is already in effect.
    pub fn adjust_alpha(&mut self, alpha: u8) {
        let Some(image) = self.image.as_mut() else { return };
        if self.window.is_none() || alpha == self.alpha {
            return;
        }
        self.alpha = image.adjust_alpha(alpha);
        debug!("label at {:?} alpha now {:#04x}", self.position, self.alpha);
    }

    /// Blend the label onto `frame`, shifted by `offset`.
    pub fn draw(&self, frame: &mut FrameSurface, offset: Point) {
        let (Some(window), Some(image)) = (self.window.as_ref(), self.image.as_ref()) else {
            return;
        };
        if !window.is_visible() {
            return;
        }
        let view = match image.surface().view() {
            Ok(view) => view,
            Err(err) => {
                warn!("label pixmap unreadable: {err}");
                return;
            }
        };
        let width = image.width().min(window.size().width) as usize;
        let height = image.height().min(window.size().height) as usize;
        blit_over(frame, &view, width, height, window.position() + offset);
    }
}
