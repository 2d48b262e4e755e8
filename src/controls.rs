// The editable set of on-screen controls, one label each.

use log::debug;

use crate::controller::{ControlContainer, ControlId};
use crate::label::OverlayLabel;
use crate::surface::Pixmap;
use crate::types::{FrameSurface, Point, Size};

pub struct LabelSet<P: Pixmap> {
    labels: Vec<OverlayLabel<P>>,
}

impl<P: Pixmap> Default for LabelSet<P> {
    fn default() -> Self {
        Self { labels: Vec::new() }
    }
}

impl<P: Pixmap> LabelSet<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: OverlayLabel<P>) -> ControlId {
        self.labels.push(label);
        self.labels.len() - 1
    }

    pub fn get(&self, id: ControlId) -> Option<&OverlayLabel<P>> {
        self.labels.get(id)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        for label in &mut self.labels {
            label.hide(hidden);
        }
    }
}

/// Keep `pos` so that a `size` box stays inside `bounds`.
fn clamp_into(pos: Point, size: Size, bounds: Size) -> Point {
    let max_x = (bounds.width as i32 - size.width as i32).max(0);
    let max_y = (bounds.height as i32 - size.height as i32).max(0);
    Point::new(pos.x.clamp(0, max_x), pos.y.clamp(0, max_y))
}

impl<P: Pixmap> ControlContainer for LabelSet<P> {
    /// Topmost (last added) label under `point`.
    fn control_at(&self, point: Point) -> Option<ControlId> {
        self.labels.iter().rposition(|label| label.contains(point))
    }

    fn move_control(&mut self, id: ControlId, delta: Point, bounds: Size) {
        let Some(label) = self.labels.get_mut(id) else { return };
        let target = clamp_into(label.position() + delta, label.size(), bounds);
        label.set_position(target);
        debug!("control {id} moved to {target:?}");
    }

    fn draw_controls(&self, frame: &mut FrameSurface) {
        for label in &self.labels {
            label.draw(frame, Point::default());
        }
    }

    fn adjust_alpha(&mut self, alpha: u8) {
        for label in &mut self.labels {
            label.adjust_alpha(alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::{self, tests::rgba_png};
    use crate::surface::{MemoryContext, MemoryPixmap};
    use std::io::Cursor;

    fn blank(x: i32, y: i32, w: u32, h: u32) -> OverlayLabel<MemoryPixmap> {
        OverlayLabel::with_image(Point::new(x, y), Size::new(w, h), None)
    }

    #[test]
    fn hit_test_prefers_topmost() {
        let mut set = LabelSet::new();
        set.push(blank(0, 0, 20, 20));
        let top = set.push(blank(10, 10, 20, 20));
        assert_eq!(set.control_at(Point::new(15, 15)), Some(top));
        assert_eq!(set.control_at(Point::new(2, 2)), Some(0));
        assert_eq!(set.control_at(Point::new(50, 50)), None);
    }

    #[test]
    fn moves_are_clamped_to_the_panel() {
        let mut set = LabelSet::new();
        let id = set.push(blank(0, 0, 10, 10));
        let bounds = Size::new(40, 30);

        set.move_control(id, Point::new(5, 2), bounds);
        assert_eq!(set.get(id).unwrap().position(), Point::new(5, 2));

        set.move_control(id, Point::new(100, -50), bounds);
        assert_eq!(set.get(id).unwrap().position(), Point::new(30, 0));
    }

    #[test]
    fn alpha_reaches_every_image_label() {
        let mut ctx = MemoryContext::new();
        let mut set = LabelSet::new();
        for x in [0, 8] {
            let png = rgba_png(2, 2, &[0xffu8; 16]);
            let image = decoder::decode(Cursor::new(png), &mut ctx, 0x3f).unwrap();
            set.push(OverlayLabel::with_image(Point::new(x, 0), Size::new(2, 2), Some(image)));
        }
        set.push(blank(20, 0, 2, 2));

        set.adjust_alpha(0xbf);
        assert_eq!(set.get(0).unwrap().alpha(), 0xbf);
        assert_eq!(set.get(1).unwrap().alpha(), 0xbf);
        assert_eq!(set.get(2).unwrap().alpha(), 0);
    }

    #[test]
    fn hidden_labels_draw_nothing() {
        let mut ctx = MemoryContext::new();
        let mut set = LabelSet::new();
        let png = rgba_png(1, 1, &[1, 2, 3, 0xff]);
        let image = decoder::decode(Cursor::new(png), &mut ctx, 0).unwrap();
        set.push(OverlayLabel::with_image(Point::new(0, 0), Size::new(1, 1), Some(image)));

        let mut frame = FrameSurface::new(1, 1);
        set.draw_controls(&mut frame);
        assert_eq!(frame.pixel(0, 0), [3, 2, 1, 0xff]);

        set.set_hidden(true);
        let mut frame = FrameSurface::new(1, 1);
        set.draw_controls(&mut frame);
        assert_eq!(frame.pixel(0, 0), [0, 0, 0, 0]);
    }
}
