//! Render context.
//!
//! Rendering draws frames of an environment onto a [`Surface`] owned by a
//! [`RenderContext`]. The context is created by the caller and passed to
//! [`Env::render`](crate::Env::render), so there is no process-wide display state.
//! The surface is created lazily on the first request and recreated whenever the
//! requested size changes.
#[cfg(feature = "window")]
mod window;
use crate::error::SurrealError;
use anyhow::Result;
use log::debug;
use ndarray::Array3;
use std::path::Path;

/// Options of a render request.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderOptions {
    /// Width of the frame in pixels.
    pub width: usize,

    /// Height of the frame in pixels.
    pub height: usize,

    /// Camera of the physics backend.
    pub camera_id: i32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 480,
            height: 480,
            camera_id: 1,
        }
    }
}

/// A target frames are drawn onto.
pub trait Surface {
    /// Size of the surface, `(width, height)`.
    fn size(&self) -> (usize, usize);

    /// Draws a `(height, width, 3)` RGB frame.
    fn present(&mut self, frame: &Array3<u8>) -> Result<()>;

    /// The last frame drawn, if the surface keeps it.
    fn last_frame(&self) -> Option<&Array3<u8>> {
        None
    }
}

/// Checks that `frame` fits a surface of the given size.
fn check_frame(frame: &Array3<u8>, width: usize, height: usize) -> Result<()> {
    if frame.shape() != [height, width, 3] {
        return Err(SurrealError::ShapeInvariant(format!(
            "frame of shape {:?} does not fit a {}x{} surface",
            frame.shape(),
            width,
            height
        ))
        .into());
    }
    Ok(())
}

/// An off-screen surface keeping the last frame.
pub struct FrameBuffer {
    width: usize,
    height: usize,
    last: Option<Array3<u8>>,
}

impl FrameBuffer {
    /// Constructs an empty frame buffer.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            last: None,
        }
    }

    /// Saves the last frame as a PNG image.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let frame = self
            .last
            .as_ref()
            .ok_or_else(|| SurrealError::Backend("no frame has been rendered".to_string()))?;
        save_png(frame, path)
    }
}

impl Surface for FrameBuffer {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn present(&mut self, frame: &Array3<u8>) -> Result<()> {
        check_frame(frame, self.width, self.height)?;
        self.last = Some(frame.clone());
        Ok(())
    }

    fn last_frame(&self) -> Option<&Array3<u8>> {
        self.last.as_ref()
    }
}

/// Saves a `(height, width, 3)` RGB frame as a PNG image.
pub fn save_png(frame: &Array3<u8>, path: impl AsRef<Path>) -> Result<()> {
    let (h, w) = (frame.shape()[0], frame.shape()[1]);
    let data = frame.as_standard_layout().iter().cloned().collect::<Vec<_>>();
    let img = image::RgbImage::from_raw(w as u32, h as u32, data)
        .ok_or_else(|| SurrealError::ShapeInvariant("frame is not RGB".to_string()))?;
    img.save(path)?;
    Ok(())
}

enum Backend {
    Headless,
    #[cfg(feature = "window")]
    Window(String),
}

/// Owns the surface an environment renders onto.
pub struct RenderContext {
    backend: Backend,
    surface: Option<Box<dyn Surface>>,
    n_created: usize,
}

impl RenderContext {
    /// A context rendering into an off-screen [`FrameBuffer`].
    pub fn headless() -> Self {
        Self {
            backend: Backend::Headless,
            surface: None,
            n_created: 0,
        }
    }

    /// A context rendering into a window with the given title.
    #[cfg(feature = "window")]
    pub fn window(title: impl Into<String>) -> Self {
        Self {
            backend: Backend::Window(title.into()),
            surface: None,
            n_created: 0,
        }
    }

    fn create(&self, width: usize, height: usize) -> Result<Box<dyn Surface>> {
        match &self.backend {
            Backend::Headless => Ok(Box::new(FrameBuffer::new(width, height))),
            #[cfg(feature = "window")]
            Backend::Window(title) => Ok(Box::new(window::WindowSurface::new(
                title, width, height,
            )?)),
        }
    }

    /// Returns a surface of the requested size.
    ///
    /// The current surface is reused if it has the same size, otherwise a new one
    /// replaces it.
    pub fn surface(&mut self, width: usize, height: usize) -> Result<&mut dyn Surface> {
        let surface = match self.surface.take() {
            Some(s) if s.size() == (width, height) => s,
            _ => {
                debug!("Create render surface of size {}x{}", width, height);
                let s = self.create(width, height)?;
                self.n_created += 1;
                s
            }
        };
        Ok(self.surface.insert(surface).as_mut())
    }

    /// The last frame drawn on the current surface.
    pub fn last_frame(&self) -> Option<&Array3<u8>> {
        self.surface.as_ref().and_then(|s| s.last_frame())
    }

    /// Number of surfaces created so far.
    pub fn n_surfaces_created(&self) -> usize {
        self.n_created
    }

    /// Tears down the current surface.
    pub fn close(&mut self) {
        self.surface = None;
    }
}
