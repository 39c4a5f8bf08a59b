use super::{check_frame, Surface};
use crate::error::SurrealError;
use anyhow::Result;
use minifb::{Window, WindowOptions};
use ndarray::Array3;

/// A window on the desktop showing rendered frames.
pub(super) struct WindowSurface {
    window: Window,
    width: usize,
    height: usize,
    buffer: Vec<u32>,
}

impl WindowSurface {
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| SurrealError::Backend(e.to_string()))?;

        Ok(Self {
            window,
            width,
            height,
            buffer: vec![0; width * height],
        })
    }
}

impl Surface for WindowSurface {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn present(&mut self, frame: &Array3<u8>) -> Result<()> {
        if !self.window.is_open() {
            return Err(SurrealError::WindowClosed.into());
        }
        check_frame(frame, self.width, self.height)?;

        let w = self.width;
        for (i, px) in self.buffer.iter_mut().enumerate() {
            let (y, x) = (i / w, i % w);
            let (r, g, b) = (frame[[y, x, 0]], frame[[y, x, 1]], frame[[y, x, 2]]);
            *px = (r as u32) << 16 | (g as u32) << 8 | b as u32;
        }
        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)
            .map_err(|e| SurrealError::Backend(e.to_string()))?;
        Ok(())
    }
}

