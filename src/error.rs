// Error types for the overlay.
// Every variant states *where* things went wrong.
use thiserror::Error;

/// Why a label image could not be turned into a pixmap.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("not a decodable PNG: {0}")]
    InvalidHeader(String),
    #[error("invalid PNG dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("native surface allocation failed: {0}")]
    SurfaceAllocationFailed(#[from] SurfaceError),
    #[error("opening image file: {0}")]
    Io(#[from] std::io::Error),
}

/// One failed step of the native pixmap setup sequence.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("create pixmap")]
    CreatePixmap,
    #[error("set pixmap property {0}")]
    SetProperty(&'static str),
    #[error("create pixmap buffer")]
    CreateBuffer,
    #[error("query render buffer")]
    RenderBuffer,
}

/// Errors surfaced by the desktop binary.
#[derive(Debug, Error)]
pub enum Error {
    #[error("window init error: {0}")]
    WindowInit(String), // Creating the window failed
    #[error("window update error: {0}")]
    WindowUpdate(String), // Pushing the frame to the window failed
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("encoding built-in label: {0}")]
    Encode(#[from] image::ImageError), // Building a demo label PNG failed
}
