#![allow(dead_code)]

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use embedview_core::pointer::PointerEvent;
use embedview_core::services::{EngineSink, SurfaceManager, WindowBindingHandler};
use embedview_core::{
    PhysicalWindowBounds, Rect, RenderTarget, ResizeState, SurfaceError, SurfaceResult, View,
    WindowMetrics,
};

#[derive(Debug, Default)]
pub struct SurfaceCalls {
    pub creates: Vec<(u32, u32)>,
    pub resizes: Vec<(u32, u32)>,
    pub swaps: usize,
    pub make_current: usize,
    pub destroys: usize,
    pub dimension_queries: usize,
    pub dims: (u32, u32),
    /// Number of upcoming `resize_surface` calls that fail.
    pub failing_resizes: usize,
}

#[derive(Clone, Default)]
pub struct RecordingSurface {
    pub calls: Arc<Mutex<SurfaceCalls>>,
}

impl SurfaceManager for RecordingSurface {
    fn create_surface(&mut self, _target: RenderTarget, width: u32, height: u32) -> SurfaceResult<()> {
        let mut c = self.calls.lock();
        c.creates.push((width, height));
        c.dims = (width, height);
        Ok(())
    }

    fn resize_surface(&mut self, _target: RenderTarget, width: u32, height: u32) -> SurfaceResult<()> {
        let mut c = self.calls.lock();
        if c.failing_resizes > 0 {
            c.failing_resizes -= 1;
            return Err(SurfaceError::ResizeFailed {
                width,
                height,
                reason: "device lost".to_string(),
            });
        }
        c.resizes.push((width, height));
        c.dims = (width, height);
        Ok(())
    }

    fn make_current(&mut self) -> bool {
        self.calls.lock().make_current += 1;
        true
    }

    fn make_resource_current(&mut self) -> bool {
        true
    }

    fn clear_context(&mut self) -> bool {
        true
    }

    fn swap_buffers(&mut self) -> bool {
        self.calls.lock().swaps += 1;
        true
    }

    fn surface_dimensions(&self) -> (u32, u32) {
        let mut c = self.calls.lock();
        c.dimension_queries += 1;
        c.dims
    }

    fn destroy_surface(&mut self) {
        self.calls.lock().destroys += 1;
    }
}

#[derive(Default)]
pub struct RecordingBinding {
    pub bounds: Mutex<PhysicalWindowBounds>,
    pub resized_notifications: Mutex<usize>,
    pub cursor_rects: Mutex<Vec<Rect>>,
}

impl WindowBindingHandler for RecordingBinding {
    fn physical_window_bounds(&self) -> PhysicalWindowBounds {
        *self.bounds.lock()
    }

    fn dpi_scale(&self) -> f64 {
        1.25
    }

    fn render_target(&self) -> RenderTarget {
        RenderTarget(1)
    }

    fn on_window_resized(&self) {
        *self.resized_notifications.lock() += 1;
    }

    fn update_cursor_rect(&self, rect: Rect) {
        self.cursor_rects.lock().push(rect);
    }
}

#[derive(Default)]
pub struct RecordingEngine {
    pub metrics: Mutex<Vec<WindowMetrics>>,
    pub pointer: Mutex<Vec<PointerEvent>>,
}

impl EngineSink for RecordingEngine {
    fn send_window_metrics(&self, metrics: WindowMetrics) {
        self.metrics.lock().push(metrics);
    }

    fn send_pointer_event(&self, event: PointerEvent) {
        self.pointer.lock().push(event);
    }
}

pub struct Harness {
    pub view: View,
    pub surface: RecordingSurface,
    pub binding: Arc<RecordingBinding>,
    pub engine: Arc<RecordingEngine>,
}

/// View with a live 800x600 surface.
pub fn harness() -> Harness {
    let surface = RecordingSurface::default();
    let binding = Arc::new(RecordingBinding::default());
    *binding.bounds.lock() = PhysicalWindowBounds {
        width: 800,
        height: 600,
    };
    let engine = Arc::new(RecordingEngine::default());

    let view = View::new(binding.clone(), Box::new(surface.clone()), engine.clone());
    view.create_render_surface().expect("create surface");

    Harness {
        view,
        surface,
        binding,
        engine,
    }
}

pub fn wait_for_state(view: &View, expected: ResizeState) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let state = view.resize_state();
        if state == expected {
            return;
        }
        assert!(
            Instant::now() < deadline,
            "timed out waiting for {:?}, still {:?}",
            expected,
            state
        );
        thread::sleep(Duration::from_millis(1));
    }
}
