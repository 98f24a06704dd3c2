//! Demo renderer: the "app" is a window that gets repainted.

use dpiguard_core::{RenderEntry, RenderError};
use tracing::info;
use winit::window::Window;

pub struct RedrawRenderer {
    window: &'static Window,
    renders: u64,
}

impl RedrawRenderer {
    pub fn new(window: &'static Window) -> Self {
        Self { window, renders: 0 }
    }
}

impl RenderEntry for RedrawRenderer {
    fn render(&mut self) -> Result<(), RenderError> {
        // A minimized window has no surface to paint into.
        let size = self.window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Err(RenderError::MissingContainer);
        }
        self.renders += 1;
        info!(renders = self.renders, width = size.width, height = size.height, "rendering app");
        self.window.request_redraw();
        Ok(())
    }
}
