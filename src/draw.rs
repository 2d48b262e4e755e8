// Desktop stand-in for the device screen, built on minifb.
// What it provides to the panel:
// 1) A window that shows the composited panel over a dark backdrop.
// 2) Left mouse acts as touch contact 0 (press / drag / release).
// 3) Esc or closing the window exits; the Down arrow is the swipe-down.

use std::collections::VecDeque;
use std::time::Instant;

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::config::OverlayConfig;
use crate::controller::{Display, EventSource, NavEvent, PlatformEvent};
use crate::error::Error;
use crate::gesture::{PRIMARY_CONTACT, TouchKind, TouchSample};
use crate::types::{FrameBuffer, FrameSurface, Point};

/// Stand-in for the emulator picture under the panel.
const BACKDROP: u32 = 0x00_10_14_18;

pub struct Drawer {
    window: Window, // the on-screen window you see
    screen: FrameBuffer,
    pending: VecDeque<PlatformEvent>,
    touch_sensitive: bool,
    was_down: bool,
    last_pos: Point,
    started: Instant,
}

impl Drawer {
    /// Create a window sized to the panel.
    pub fn new(title: &str, config: &OverlayConfig) -> Result<Self, Error> {
        let (width, height) = (config.size.width as usize, config.size.height as usize);
        let options = WindowOptions { topmost: config.z_order > 0, ..WindowOptions::default() };
        let window = Window::new(title, width, height, options)
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        Ok(Self {
            window,
            screen: FrameBuffer { width, height, pixels: vec![BACKDROP; width * height] },
            pending: VecDeque::new(),
            touch_sensitive: config.touch_sensitive,
            was_down: false,
            last_pos: Point::default(),
            started: Instant::now(),
        })
    }

    // toggles whether the panel draws its controls
    pub fn h_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::H, KeyRepeat::No)
    }

    /// Current mouse position in window pixel coordinates (clamped to the window).
    fn mouse_pos(&self) -> Option<Point> {
        self.window
            .get_mouse_pos(MouseMode::Clamp)
            .map(|(x, y)| Point::new(x.max(0.0) as i32, y.max(0.0) as i32))
    }

    /// Turn this frame's window state into queued platform events.
    fn collect_input(&mut self) {
        if !self.window.is_open() || self.window.is_key_down(Key::Escape) {
            self.pending.push_back(PlatformEvent::Navigation(NavEvent::Exit));
        }
        if self.window.is_key_pressed(Key::Down, KeyRepeat::No) {
            self.pending.push_back(PlatformEvent::Navigation(NavEvent::SwipeDown));
        }
        if !self.touch_sensitive {
            return;
        }

        let down = self.window.get_mouse_down(MouseButton::Left);
        if let Some(pos) = self.mouse_pos() {
            self.last_pos = pos;
        }
        let kind = match (self.was_down, down) {
            (false, true) => TouchKind::Touch,
            (true, true) => TouchKind::Move,
            (true, false) => TouchKind::Release,
            (false, false) => return,
        };
        self.was_down = down;

        let sample = TouchSample::new(kind, PRIMARY_CONTACT, self.last_pos, self.started.elapsed());
        self.pending.push_back(PlatformEvent::touch(sample));
    }
}

impl EventSource for Drawer {
    fn poll(&mut self) -> Option<PlatformEvent> {
        self.pending.pop_front()
    }
}

impl Display for Drawer {
    /// Blend the BGRA panel over the backdrop and push it to the window.
    fn post(&mut self, frame: &FrameSurface) -> Result<(), Error> {
        present_over(&mut self.screen, frame, BACKDROP);
        self.window
            .update_with_buffer(&self.screen.pixels, self.screen.width, self.screen.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        self.collect_input();
        Ok(())
    }
}

/// Flatten a BGRA frame onto a solid 0x00RRGGBB backdrop.
pub fn present_over(out: &mut FrameBuffer, frame: &FrameSurface, backdrop: u32) {
    let width = out.width.min(frame.width);
    let height = out.height.min(frame.height);
    let channel = |shift: u32| ((backdrop >> shift) & 0xff) as u16;
    let bg = [channel(0), channel(8), channel(16)];

    for y in 0..height {
        for x in 0..width {
            let px = frame.pixel(x, y);
            let a = px[3] as u16;
            let mix = |c: usize| ((px[c] as u16 * a + bg[c] * (255 - a)) / 255) as u32;
            out.pixels[y * out.width + x] = (mix(2) << 16) | (mix(1) << 8) | mix(0);
        }
    }
}
