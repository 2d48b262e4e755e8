// Touch-driven configuration overlay: PNG labels uploaded into native
// pixmaps, a translucent panel, and drag / double-tap / long-press
// handling to rearrange the on-screen controls.

pub mod blend;
pub mod config;
pub mod controller;
pub mod controls;
pub mod decoder;
pub mod draw;
pub mod error;
pub mod gesture;
pub mod label;
pub mod surface;
pub mod types;

pub use controller::OverlayController;
pub use controls::LabelSet;
pub use error::{DecodeError, Error, SurfaceError};
pub use label::OverlayLabel;
