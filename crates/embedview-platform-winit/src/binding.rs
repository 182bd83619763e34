use std::sync::Arc;

use embedview_core::services::WindowBindingHandler;
use embedview_core::{PhysicalWindowBounds, Rect, RenderTarget};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::window::Window;

/// [`WindowBindingHandler`] over a winit window.
pub struct WinitWindowBinding {
    window: Arc<Window>,
    pixel_ratio_override: Option<f64>,
}

impl WinitWindowBinding {
    #[inline]
    pub fn new(window: Arc<Window>, pixel_ratio_override: Option<f64>) -> Self {
        Self {
            window,
            pixel_ratio_override,
        }
    }
}

impl WindowBindingHandler for WinitWindowBinding {
    fn physical_window_bounds(&self) -> PhysicalWindowBounds {
        let size = self.window.inner_size();
        PhysicalWindowBounds {
            width: size.width,
            height: size.height,
        }
    }

    fn dpi_scale(&self) -> f64 {
        self.pixel_ratio_override
            .unwrap_or_else(|| self.window.scale_factor())
    }

    fn render_target(&self) -> RenderTarget {
        RenderTarget(u64::from(self.window.id()))
    }

    fn on_window_resized(&self) {
        self.window.request_redraw();
    }

    fn update_cursor_rect(&self, rect: Rect) {
        self.window.set_ime_cursor_area(
            PhysicalPosition::new(rect.x, rect.y),
            PhysicalSize::new(rect.width, rect.height),
        );
    }
}
