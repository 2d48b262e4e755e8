// The configuration panel's frame loop.
// Each iteration drains pending platform events without blocking, turns
// the primary contact's drag into incremental moves of the selected
// control, then repaints and posts the panel.

use log::{debug, info, warn};

use crate::config::OverlayConfig;
use crate::error::Error;
use crate::gesture::{GestureEngine, GestureHandler, GestureTracker, TouchSample, TouchState};
use crate::types::{FrameSurface, Point, Size};

/// Panel background, B, G, R, A.
pub const PANEL_COLOR: [u8; 4] = [0x30, 0x30, 0x30, 0xa0];

/// Overlay alpha before any double-tap.
pub const INITIAL_ALPHA: u8 = 0x7f;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavEvent {
    Exit,
    SwipeDown,
    Other,
}

/// A touch sample as delivered by the platform. `classifiable` is false
/// when the sample could not be handed to gesture recognition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointerEvent {
    pub sample: TouchSample,
    pub classifiable: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlatformEvent {
    Navigation(NavEvent),
    Pointer(PointerEvent),
}

impl PlatformEvent {
    pub fn touch(sample: TouchSample) -> Self {
        PlatformEvent::Pointer(PointerEvent { sample, classifiable: true })
    }
}

/// Non-blocking event queue: `None` means nothing is pending right now.
pub trait EventSource {
    fn poll(&mut self) -> Option<PlatformEvent>;
}

/// Where finished frames go.
pub trait Display {
    fn post(&mut self, frame: &FrameSurface) -> Result<(), Error>;
}

/// Index of a control inside its container.
pub type ControlId = usize;

/// The set of on-screen controls the panel edits.
pub trait ControlContainer {
    fn control_at(&self, point: Point) -> Option<ControlId>;
    fn move_control(&mut self, id: ControlId, delta: Point, bounds: Size);
    fn draw_controls(&self, frame: &mut FrameSurface);
    fn adjust_alpha(&mut self, alpha: u8);
}

pub struct OverlayController<E, H> {
    config: OverlayConfig,
    frame: FrameSurface,
    tracker: GestureTracker<E, H>,
    selected: Option<ControlId>,
    alpha: u8,
    hidden: bool,
    running: bool,
}

impl<E: GestureEngine, H: GestureHandler> OverlayController<E, H> {
    pub fn new(config: OverlayConfig, engine: E, handler: H) -> Self {
        let frame = FrameSurface::new(config.size.width as usize, config.size.height as usize);
        Self {
            config,
            frame,
            tracker: GestureTracker::new(engine, handler),
            selected: None,
            alpha: INITIAL_ALPHA,
            hidden: false,
            running: true,
        }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn alpha(&self) -> u8 {
        self.alpha
    }

    pub fn selected(&self) -> Option<ControlId> {
        self.selected
    }

    pub fn touch(&self) -> &TouchState {
        self.tracker.state()
    }

    pub fn frame(&self) -> &FrameSurface {
        &self.frame
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Hidden panels keep their background but draw no controls.
    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    /// Loop until the platform asks the panel to go away.
    pub fn run<P, C>(&mut self, platform: &mut P, controls: &mut C)
    where
        P: EventSource + Display,
        C: ControlContainer,
    {
        info!(
            "config panel up: {}x{} z-order {}",
            self.config.size.width, self.config.size.height, self.config.z_order
        );
        while self.running {
            self.step(platform, controls);
        }
        info!("config panel closed");
    }

    /// One loop iteration. Returns whether the loop should keep going.
    pub fn step<P, C>(&mut self, platform: &mut P, controls: &mut C) -> bool
    where
        P: EventSource + Display,
        C: ControlContainer,
    {
        self.tracker.state_mut().begin_round();

        while self.running {
            let Some(event) = platform.poll() else { break };
            self.handle_event(event, controls);
        }

        self.update_selection(controls);
        self.draw(controls);

        if let Err(err) = platform.post(&self.frame) {
            warn!("posting panel frame failed: {err}");
        }
        self.running
    }

    fn handle_event<C: ControlContainer>(&mut self, event: PlatformEvent, controls: &mut C) {
        match event {
            PlatformEvent::Navigation(NavEvent::Exit | NavEvent::SwipeDown) => {
                debug!("navigation {event:?}, leaving config panel");
                self.running = false;
            }
            PlatformEvent::Navigation(NavEvent::Other) => {}
            PlatformEvent::Pointer(PointerEvent { sample, classifiable }) => {
                let before = self.alpha;
                let consumed = self.tracker.process(&sample, classifiable, &mut self.alpha);
                if consumed && self.alpha != before {
                    controls.adjust_alpha(self.alpha);
                }
            }
        }
    }

    fn update_selection<C: ControlContainer>(&mut self, controls: &mut C) {
        let state = *self.tracker.state();
        if state.released_this_round {
            self.selected = None;
            return;
        }
        if !state.touching {
            return;
        }
        if self.selected.is_none() {
            self.selected = controls.control_at(state.start);
            if let Some(id) = self.selected {
                debug!("selected control {id} at {:?}", state.start);
            }
        }
        if let Some(id) = self.selected {
            if state.last != state.start {
                controls.move_control(id, state.last - state.start, self.frame.size());
                self.tracker.state_mut().start = state.last;
            }
        }
    }

    fn draw<C: ControlContainer>(&mut self, controls: &C) {
        self.frame.fill(PANEL_COLOR);
        if !self.hidden {
            controls.draw_controls(&mut self.frame);
        }
    }
}
