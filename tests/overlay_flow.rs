use std::collections::VecDeque;
use std::io::Write;
use std::time::Duration;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use tempfile::NamedTempFile;

use touch_overlay::config::OverlayConfig;
use touch_overlay::controller::{Display, EventSource, NavEvent, PANEL_COLOR, PlatformEvent};
use touch_overlay::error::Error;
use touch_overlay::gesture::{AlphaCycler, PRIMARY_CONTACT, TapEngine, TouchKind, TouchSample};
use touch_overlay::label::LABEL_ALPHA;
use touch_overlay::surface::MemoryContext;
use touch_overlay::types::{FrameSurface, Point, Size};
use touch_overlay::{LabelSet, OverlayController, OverlayLabel};

/// Plays back one batch of events per frame and keeps the last frame.
struct Playback {
    frames: VecDeque<Vec<PlatformEvent>>,
    current: VecDeque<PlatformEvent>,
    last: Option<FrameSurface>,
}

impl Playback {
    fn new(frames: Vec<Vec<PlatformEvent>>) -> Self {
        let mut frames: VecDeque<_> = frames.into();
        let current = frames.pop_front().unwrap_or_default().into();
        Self { frames, current, last: None }
    }
}

impl EventSource for Playback {
    fn poll(&mut self) -> Option<PlatformEvent> {
        self.current.pop_front()
    }
}

impl Display for Playback {
    fn post(&mut self, frame: &FrameSurface) -> Result<(), Error> {
        self.last = Some(frame.clone());
        self.current = self.frames.pop_front().unwrap_or_default().into();
        Ok(())
    }
}

fn touch(kind: TouchKind, x: i32, y: i32, ms: u64) -> PlatformEvent {
    let time = Duration::from_millis(ms);
    PlatformEvent::touch(TouchSample::new(kind, PRIMARY_CONTACT, Point::new(x, y), time))
}

fn opaque_png_file(w: u32, h: u32, rgba: [u8; 4]) -> NamedTempFile {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(&rgba.repeat((w * h) as usize), w, h, ExtendedColorType::Rgba8)
        .unwrap();
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();
    file
}

fn panel() -> OverlayController<TapEngine, AlphaCycler> {
    let config = OverlayConfig { size: Size::new(32, 24), ..OverlayConfig::default() };
    OverlayController::new(config, TapEngine::new(), AlphaCycler)
}

#[test]
fn dragging_a_png_label_moves_it_on_the_panel() {
    let png = opaque_png_file(4, 4, [0xff, 0x00, 0x00, 0xff]);
    let mut ctx = MemoryContext::new();
    let mut labels = LabelSet::new();
    let label = OverlayLabel::new(
        &mut ctx,
        Point::new(0, 0),
        Size::new(4, 4),
        Some(png.path()),
        LABEL_ALPHA,
    );
    let id = labels.push(label);
    let mut ctl = panel();

    let mut playback = Playback::new(vec![
        vec![touch(TouchKind::Touch, 1, 1, 0)],
        vec![touch(TouchKind::Move, 6, 3, 40)],
        vec![touch(TouchKind::Release, 6, 3, 80)],
        vec![PlatformEvent::Navigation(NavEvent::SwipeDown)],
    ]);
    ctl.run(&mut playback, &mut labels);

    assert_eq!(labels.get(id).unwrap().position(), Point::new(5, 2));
    assert_eq!(ctl.selected(), None);

    let frame = playback.last.unwrap();
    assert_eq!(frame.pixel(0, 0), PANEL_COLOR);
    // Red at the new spot, clamped to the 0x3F label ceiling: B, G, R mix
    // toward red but the panel alpha stays the larger of the two.
    let moved = frame.pixel(5, 2);
    assert!(moved[2] > 0x30);
    assert_eq!(moved[3], 0xa0);
}

#[test]
fn double_tap_reclamps_every_label_pixmap() {
    let png = opaque_png_file(2, 2, [0x00, 0xff, 0x00, 0xff]);
    let mut ctx = MemoryContext::new();
    let mut labels = LabelSet::new();
    let label = OverlayLabel::new(
        &mut ctx,
        Point::new(20, 10),
        Size::new(2, 2),
        Some(png.path()),
        LABEL_ALPHA,
    );
    labels.push(label);
    labels.push(OverlayLabel::new(&mut ctx, Point::new(0, 0), Size::new(2, 2), None, LABEL_ALPHA));
    let mut ctl = panel();

    let mut playback = Playback::new(vec![
        vec![touch(TouchKind::Touch, 10, 10, 0), touch(TouchKind::Release, 10, 10, 60)],
        vec![touch(TouchKind::Touch, 11, 10, 160)],
        vec![touch(TouchKind::Release, 11, 10, 220), PlatformEvent::Navigation(NavEvent::Exit)],
    ]);
    ctl.run(&mut playback, &mut labels);

    assert_eq!(ctl.alpha(), 0xbf);
    let label = labels.get(0).unwrap();
    assert_eq!(label.alpha(), 0xbf);
    let view = label.image().unwrap().surface().view().unwrap();
    assert_eq!(view.pixels[3], 0xbf);
    assert_eq!(labels.get(1).unwrap().alpha(), 0);
}

#[test]
fn broken_image_label_is_blank_but_draggable() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"\x89PNG but not really").unwrap();
    let mut ctx = MemoryContext::new();
    let mut labels = LabelSet::new();
    let label = OverlayLabel::new(
        &mut ctx,
        Point::new(0, 0),
        Size::new(8, 8),
        Some(file.path()),
        LABEL_ALPHA,
    );
    let id = labels.push(label);
    assert!(labels.get(id).unwrap().image().is_none());
    assert_eq!(ctx.live_pixmaps(), 0);

    let mut ctl = panel();
    let mut playback = Playback::new(vec![
        vec![touch(TouchKind::Touch, 2, 2, 0)],
        vec![touch(TouchKind::Move, 5, 7, 30)],
        vec![PlatformEvent::Navigation(NavEvent::Exit)],
    ]);
    ctl.run(&mut playback, &mut labels);

    assert_eq!(labels.get(id).unwrap().position(), Point::new(3, 5));
    let frame = playback.last.unwrap();
    assert!(frame.pixels.chunks_exact(4).all(|p| p == PANEL_COLOR));
}
