// Native pixmap seam.
// Pixmaps come out of a screen context, get configured property by
// property, then hand out their render buffer. `MemoryContext` does the
// same on the heap.

use std::cell::Cell;
use std::rc::Rc;

use crate::error::SurfaceError;
use crate::types::Size;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Rgba8888,
}

bitflags::bitflags! {
    /// Pixmap usage flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Usage: u32 {
        const NATIVE = 1 << 0;
        const READ = 1 << 1;
        const WRITE = 1 << 2;
    }
}

/// Writable view of a pixmap's render buffer.
pub struct RenderBuffer<'a> {
    pub pixels: &'a mut [u8],
    pub stride: usize,
}

/// Read-only view of a pixmap's render buffer.
pub struct BufferView<'a> {
    pub pixels: &'a [u8],
    pub stride: usize,
}

/// A platform pixmap. Dropping it releases the pixmap and its buffer.
pub trait Pixmap {
    fn set_format(&mut self, format: PixelFormat) -> Result<(), SurfaceError>;
    fn set_buffer_size(&mut self, size: Size) -> Result<(), SurfaceError>;
    fn set_usage(&mut self, usage: Usage) -> Result<(), SurfaceError>;
    fn create_buffer(&mut self) -> Result<(), SurfaceError>;
    fn render_buffer(&mut self) -> Result<RenderBuffer<'_>, SurfaceError>;
    fn view(&self) -> Result<BufferView<'_>, SurfaceError>;
    fn size(&self) -> Size;
}

/// Source of native pixmaps.
pub trait ScreenContext {
    type Pixmap: Pixmap;
    fn create_pixmap(&mut self) -> Result<Self::Pixmap, SurfaceError>;
}

/// Setup steps `MemoryContext` can be told to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetupStep {
    CreatePixmap,
    Format,
    BufferSize,
    Usage,
    CreateBuffer,
    RenderBuffer,
}

/// Heap-backed screen context. Rows are padded to 64 bytes so callers
/// can't get away with assuming the buffer stride is `width * 4`.
#[derive(Default)]
pub struct MemoryContext {
    fail_at: Option<SetupStep>,
    live: Rc<Cell<usize>>,
}

impl MemoryContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every pixmap created from now on fails at `step`.
    pub fn failing_at(step: SetupStep) -> Self {
        Self { fail_at: Some(step), ..Self::default() }
    }

    /// Number of pixmaps that have been created and not yet released.
    pub fn live_pixmaps(&self) -> usize {
        self.live.get()
    }
}

impl ScreenContext for MemoryContext {
    type Pixmap = MemoryPixmap;

    fn create_pixmap(&mut self) -> Result<MemoryPixmap, SurfaceError> {
        if self.fail_at == Some(SetupStep::CreatePixmap) {
            return Err(SurfaceError::CreatePixmap);
        }
        self.live.set(self.live.get() + 1);
        Ok(MemoryPixmap {
            format: None,
            size: Size::default(),
            usage: Usage::default(),
            buffer: None,
            stride: 0,
            fail_at: self.fail_at,
            live: Rc::clone(&self.live),
        })
    }
}

pub struct MemoryPixmap {
    format: Option<PixelFormat>,
    size: Size,
    usage: Usage,
    buffer: Option<Vec<u8>>,
    stride: usize,
    fail_at: Option<SetupStep>,
    live: Rc<Cell<usize>>,
}

impl MemoryPixmap {
    fn check(&self, step: SetupStep, err: SurfaceError) -> Result<(), SurfaceError> {
        if self.fail_at == Some(step) { Err(err) } else { Ok(()) }
    }

    pub fn usage(&self) -> Usage {
        self.usage
    }
}

impl Pixmap for MemoryPixmap {
    fn set_format(&mut self, format: PixelFormat) -> Result<(), SurfaceError> {
        self.check(SetupStep::Format, SurfaceError::SetProperty("format"))?;
        self.format = Some(format);
        Ok(())
    }

    fn set_buffer_size(&mut self, size: Size) -> Result<(), SurfaceError> {
        self.check(SetupStep::BufferSize, SurfaceError::SetProperty("buffer size"))?;
        self.size = size;
        Ok(())
    }

    fn set_usage(&mut self, usage: Usage) -> Result<(), SurfaceError> {
        self.check(SetupStep::Usage, SurfaceError::SetProperty("usage"))?;
        self.usage = usage;
        Ok(())
    }

    fn create_buffer(&mut self) -> Result<(), SurfaceError> {
        self.check(SetupStep::CreateBuffer, SurfaceError::CreateBuffer)?;
        if self.format.is_none() || self.size.width == 0 || self.size.height == 0 {
            return Err(SurfaceError::CreateBuffer);
        }
        self.stride = (self.size.width as usize * 4 + 63) & !63;
        self.buffer = Some(vec![0u8; self.stride * self.size.height as usize]);
        Ok(())
    }

    fn render_buffer(&mut self) -> Result<RenderBuffer<'_>, SurfaceError> {
        self.check(SetupStep::RenderBuffer, SurfaceError::RenderBuffer)?;
        let stride = self.stride;
        let pixels = self.buffer.as_deref_mut().ok_or(SurfaceError::RenderBuffer)?;
        Ok(RenderBuffer { pixels, stride })
    }

    fn view(&self) -> Result<BufferView<'_>, SurfaceError> {
        let pixels = self.buffer.as_deref().ok_or(SurfaceError::RenderBuffer)?;
        Ok(BufferView { pixels, stride: self.stride })
    }

    fn size(&self) -> Size {
        self.size
    }
}

impl Drop for MemoryPixmap {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}
