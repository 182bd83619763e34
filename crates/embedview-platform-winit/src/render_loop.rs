use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use embedview_core::pointer::PointerEvent;
use embedview_core::{Bus, EngineEvent, PhysicalWindowBounds, ShutdownToken, View, ViewError, ViewResult};

/// Stand-in for the render engine's raster thread.
///
/// Consumes the engine bus, keeps the size the engine was last told about, and
/// acquires/presents one frame at that size per tick. That is enough to drive the
/// view's resize handshake the way a real engine would.
pub struct RenderThread {
    stop: ShutdownToken,
    handle: Option<JoinHandle<u64>>,
}

impl RenderThread {
    pub fn spawn(
        view: Arc<View>,
        bus: Bus<EngineEvent>,
        frame_interval: Duration,
        initial: PhysicalWindowBounds,
    ) -> ViewResult<Self> {
        let stop = ShutdownToken::new();
        let token = stop.clone();

        let handle = thread::Builder::new()
            .name("embedview-render".to_string())
            .spawn(move || run(&view, &bus, frame_interval, initial, &token))
            .map_err(|e| ViewError::platform(format!("render thread spawn failed: {e}")))?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Stops and joins the thread. Returns the number of frames presented.
    pub fn stop(&mut self) -> u64 {
        self.stop.request();
        let Some(handle) = self.handle.take() else {
            return 0;
        };
        match handle.join() {
            Ok(frames) => frames,
            Err(_) => {
                log::error!("render: thread panicked");
                0
            }
        }
    }
}

impl Drop for RenderThread {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(
    view: &View,
    bus: &Bus<EngineEvent>,
    frame_interval: Duration,
    initial: PhysicalWindowBounds,
    stop: &ShutdownToken,
) -> u64 {
    let mut size = (initial.width, initial.height);
    let mut frames = 0u64;

    if !view.make_current() {
        log::warn!("render: could not make the context current");
    }
    log::info!("render: started at {}x{}", size.0, size.1);

    while !stop.is_requested() {
        if let Some(ev) = bus.recv_timeout(frame_interval) {
            apply(ev, &mut size);
        }
        bus.drain(|ev| apply(ev, &mut size));

        if size.0 == 0 || size.1 == 0 {
            continue;
        }

        let _fbo = view.frame_buffer_id(size.0, size.1);
        if view.swap_buffers() {
            frames += 1;
        }
    }

    view.clear_context();
    log::info!("render: stopped after {} frames", frames);
    frames
}

fn apply(ev: EngineEvent, size: &mut (u32, u32)) {
    match ev {
        EngineEvent::WindowMetrics(m) => {
            log::debug!("render: metrics {}x{} @{}", m.width, m.height, m.pixel_ratio);
            *size = (m.width, m.height);
        }
        EngineEvent::Pointer(p) => trace_pointer(&p),
    }
}

#[inline]
fn trace_pointer(p: &PointerEvent) {
    log::trace!(
        "render: pointer {:?} at ({:.1}, {:.1}) buttons={:?}",
        p.phase,
        p.x,
        p.y,
        p.buttons
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    use embedview_core::services::WindowBindingHandler;
    use embedview_core::{RenderTarget, SurfaceDimensions};
    use parking_lot::Mutex;

    use crate::headless::HeadlessSurfaceManager;

    struct Binding {
        bounds: Mutex<PhysicalWindowBounds>,
    }

    impl WindowBindingHandler for Binding {
        fn physical_window_bounds(&self) -> PhysicalWindowBounds {
            *self.bounds.lock()
        }

        fn dpi_scale(&self) -> f64 {
            2.0
        }

        fn render_target(&self) -> RenderTarget {
            RenderTarget(11)
        }

        fn on_window_resized(&self) {}
    }

    #[test]
    fn resize_completes_against_a_live_render_thread() {
        let binding = Arc::new(Binding {
            bounds: Mutex::new(PhysicalWindowBounds {
                width: 400,
                height: 300,
            }),
        });
        let surface = HeadlessSurfaceManager::new();
        let stats = surface.stats_handle();
        let bus: Bus<EngineEvent> = Bus::unbounded();
        let view = Arc::new(View::new(
            binding.clone(),
            Box::new(surface),
            Arc::new(bus.producer()),
        ));
        view.create_render_surface().unwrap();

        let mut render = RenderThread::spawn(
            view.clone(),
            bus,
            Duration::from_millis(2),
            binding.physical_window_bounds(),
        )
        .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while stats.lock().frames_presented == 0 {
            assert!(Instant::now() < deadline, "no frame presented");
            thread::sleep(Duration::from_millis(1));
        }

        // Returns only once a 640x480 frame is on screen.
        view.on_window_size_changed(640, 480);
        assert_eq!(
            view.surface_dimensions(),
            SurfaceDimensions {
                width: 640,
                height: 480
            }
        );
        assert_eq!(stats.lock().resizes, 1);

        let frames = render.stop();
        assert!(frames >= 2);
        assert_eq!(render.stop(), 0);

        view.destroy_render_surface();
    }
}
