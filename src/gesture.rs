// Touch samples, gesture recognition and the drag state machine.
// Every sample goes to a `GestureEngine` first. Samples it claims become a
// `GestureEvent` for the `GestureHandler`; the rest drive `TouchState`,
// which tracks contact 0 for dragging.

use std::time::Duration;

use log::{debug, info, warn};

use crate::types::Point;

/// The only contact that drives dragging and recognition.
pub const PRIMARY_CONTACT: i32 = 0;

/// Added to the overlay alpha on every double-tap (wrapping at 8 bits).
pub const DOUBLE_TAP_ALPHA_STEP: u8 = 0x40;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchKind {
    Touch,
    Move,
    Release,
}

/// One raw touch sample, stamped with the time it was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TouchSample {
    pub kind: TouchKind,
    pub contact_id: i32,
    pub position: Point,
    pub time: Duration,
}

impl TouchSample {
    pub fn new(kind: TouchKind, contact_id: i32, position: Point, time: Duration) -> Self {
        Self { kind, contact_id, position, time }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureEvent {
    DoubleTap { x: i32, y: i32 },
    LongPress { x: i32, y: i32 },
    Unrecognized,
}

/// Turns raw samples into gestures. `None` means the sample was not part
/// of a recognised gesture and should be handled as plain touch input.
pub trait GestureEngine {
    fn classify(&mut self, sample: &TouchSample) -> Option<GestureEvent>;
}

/// State a gesture handler may change.
pub struct GestureContext<'a> {
    pub alpha: &'a mut u8,
}

pub trait GestureHandler {
    fn on_gesture(&mut self, event: GestureEvent, ctx: &mut GestureContext<'_>);
}

/// Double-tap steps the overlay alpha up by `DOUBLE_TAP_ALPHA_STEP`,
/// wrapping back to the low end past 0xFF; long-press is only logged.
#[derive(Default)]
pub struct AlphaCycler;

impl GestureHandler for AlphaCycler {
    fn on_gesture(&mut self, event: GestureEvent, ctx: &mut GestureContext<'_>) {
        match event {
            GestureEvent::DoubleTap { x, y } => {
                *ctx.alpha = ctx.alpha.wrapping_add(DOUBLE_TAP_ALPHA_STEP);
                info!("double tap x:{x} y:{y}, alpha {:#04x}", *ctx.alpha);
            }
            GestureEvent::LongPress { x, y } => {
                info!("long press x:{x} y:{y}");
            }
            GestureEvent::Unrecognized => {
                debug!("unknown gesture");
            }
        }
    }
}

/// Tap-family recogniser registering double-tap and long-press.
pub struct TapEngine {
    long_press: Duration,
    tap_max: Duration,
    double_tap_gap: Duration,
    slop: i32,
    double_tap_slop: i32,
    down: Option<(Point, Duration)>,
    moved: bool,
    long_press_fired: bool,
    last_tap: Option<(Point, Duration)>,
}

impl TapEngine {
    pub fn new() -> Self {
        Self {
            long_press: Duration::from_millis(600),
            tap_max: Duration::from_millis(300),
            double_tap_gap: Duration::from_millis(300),
            slop: 20,
            double_tap_slop: 30,
            down: None,
            moved: false,
            long_press_fired: false,
            last_tap: None,
        }
    }

    fn near(a: Point, b: Point, slop: i32) -> bool {
        let d = a - b;
        d.x.abs() <= slop && d.y.abs() <= slop
    }
}

impl Default for TapEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureEngine for TapEngine {
    fn classify(&mut self, sample: &TouchSample) -> Option<GestureEvent> {
        if sample.contact_id != PRIMARY_CONTACT {
            return None;
        }
        let at = sample.position;

        match sample.kind {
            TouchKind::Touch => {
                if let Some((tap_at, tap_time)) = self.last_tap.take() {
                    if sample.time.saturating_sub(tap_time) <= self.double_tap_gap
                        && Self::near(at, tap_at, self.double_tap_slop)
                    {
                        self.down = None;
                        return Some(GestureEvent::DoubleTap { x: at.x, y: at.y });
                    }
                }
                self.down = Some((at, sample.time));
                self.moved = false;
                self.long_press_fired = false;
                None
            }
            TouchKind::Move => {
                let (start, since) = self.down?;
                if !Self::near(at, start, self.slop) {
                    self.moved = true;
                }
                if !self.moved
                    && !self.long_press_fired
                    && sample.time.saturating_sub(since) >= self.long_press
                {
                    self.long_press_fired = true;
                    return Some(GestureEvent::LongPress { x: start.x, y: start.y });
                }
                None
            }
            TouchKind::Release => {
                let (start, since) = self.down.take()?;
                let quick = sample.time.saturating_sub(since) <= self.tap_max;
                if quick && !self.moved && Self::near(at, start, self.slop) {
                    self.last_tap = Some((start, sample.time));
                }
                None
            }
        }
    }
}

/// Drag tracking for the primary contact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TouchState {
    pub touching: bool,
    pub released_this_round: bool,
    pub start: Point,
    pub last: Point,
}

impl TouchState {
    /// Called at the top of every loop iteration.
    pub fn begin_round(&mut self) {
        self.released_this_round = false;
    }

    pub fn apply(&mut self, sample: &TouchSample) {
        if sample.contact_id != PRIMARY_CONTACT {
            return;
        }
        match sample.kind {
            TouchKind::Touch => {
                if !self.touching && !self.released_this_round {
                    self.touching = true;
                    self.start = sample.position;
                    self.last = sample.position;
                }
            }
            TouchKind::Move => {
                if self.touching {
                    self.last = sample.position;
                }
            }
            TouchKind::Release => {
                if self.touching {
                    self.touching = false;
                    self.released_this_round = true;
                    self.last = sample.position;
                }
            }
        }
    }
}

/// Routes samples either to the gesture handler or to the touch state.
pub struct GestureTracker<E, H> {
    engine: E,
    handler: H,
    state: TouchState,
}

impl<E: GestureEngine, H: GestureHandler> GestureTracker<E, H> {
    pub fn new(engine: E, handler: H) -> Self {
        Self { engine, handler, state: TouchState::default() }
    }

    pub fn state(&self) -> &TouchState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut TouchState {
        &mut self.state
    }

    /// Feed one sample. `classifiable` is false when the platform could not
    /// hand over the sample for recognition; it then goes straight to the
    /// touch state. Returns true if a gesture consumed the sample.
    pub fn process(&mut self, sample: &TouchSample, classifiable: bool, alpha: &mut u8) -> bool {
        if !classifiable {
            warn!("failed to get touch sample for gesture recognition");
        } else if let Some(event) = self.engine.classify(sample) {
            let mut ctx = GestureContext { alpha };
            self.handler.on_gesture(event, &mut ctx);
            return true;
        }
        self.state.apply(sample);
        false
    }
}
