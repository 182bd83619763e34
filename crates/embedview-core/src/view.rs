use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::ViewResult;
use crate::host_events::{FrameBufferId, Rect};
use crate::pointer::{MouseButtons, PointerEventNormalizer, PointerState, RawPointerEvent};
use crate::resize::{ResizeCoordinator, ResizeState};
use crate::services::{EngineSink, KeyEvent, KeyboardHookHandler, SurfaceManager, WindowBindingHandler};
use crate::surface::{RenderSurfaceLifecycle, SurfaceDimensions};

/// Platform view hosting an embedded render engine.
///
/// Entry points are split by thread:
/// - platform thread: `on_*` handlers (window size, pointer, keyboard/text, IME),
/// - render thread: `frame_buffer_id`, `swap_buffers` and the context calls.
///
/// Share it as `Arc<View>` between the two.
pub struct View {
    binding: Arc<dyn WindowBindingHandler>,
    engine: Arc<dyn EngineSink>,
    resize: ResizeCoordinator,
    pointer: Mutex<PointerEventNormalizer>,
    keyboard_hooks: Mutex<Vec<Box<dyn KeyboardHookHandler>>>,
}

impl View {
    pub fn new(
        binding: Arc<dyn WindowBindingHandler>,
        surface_manager: Box<dyn SurfaceManager>,
        engine: Arc<dyn EngineSink>,
    ) -> Self {
        let surface = RenderSurfaceLifecycle::new(surface_manager, binding.render_target());
        let resize = ResizeCoordinator::new(surface, binding.clone(), engine.clone());

        Self {
            binding,
            engine,
            resize,
            pointer: Mutex::new(PointerEventNormalizer::new()),
            keyboard_hooks: Mutex::new(Vec::new()),
        }
    }

    pub fn add_keyboard_hook_handler(&self, handler: Box<dyn KeyboardHookHandler>) {
        self.keyboard_hooks.lock().push(handler);
    }

    /// Tells the engine the window's current size, e.g. right after it is attached.
    pub fn send_initial_bounds(&self) {
        self.resize
            .send_bounds_metrics(self.binding.physical_window_bounds());
    }

    pub fn create_render_surface(&self) -> ViewResult<()> {
        let bounds = self.binding.physical_window_bounds();
        self.resize.with_surface(|s| s.create(bounds))?;
        Ok(())
    }

    /// Idempotent. Call only once the render thread has stopped.
    pub fn destroy_render_surface(&self) {
        self.resize.with_surface(|s| s.destroy());
    }

    #[inline]
    pub fn resize_state(&self) -> ResizeState {
        self.resize.state()
    }

    #[inline]
    pub fn surface_dimensions(&self) -> SurfaceDimensions {
        self.resize.surface_dimensions()
    }

    #[inline]
    pub fn pointer_state(&self) -> PointerState {
        self.pointer.lock().state()
    }

    // ---- platform thread -------------------------------------------------

    /// Blocks until the render thread presents a frame at the new size (see [`ResizeCoordinator`]).
    pub fn on_window_size_changed(&self, width: u32, height: u32) {
        self.resize.request_resize(width, height);
    }

    pub fn on_pointer_move(&self, x: f64, y: f64) {
        self.dispatch_pointer(RawPointerEvent::Move { x, y });
    }

    pub fn on_pointer_down(&self, x: f64, y: f64, button: MouseButtons) {
        self.dispatch_pointer(RawPointerEvent::Down { x, y, button });
    }

    pub fn on_pointer_up(&self, x: f64, y: f64, button: MouseButtons) {
        self.dispatch_pointer(RawPointerEvent::Up { x, y, button });
    }

    pub fn on_pointer_leave(&self) {
        self.dispatch_pointer(RawPointerEvent::Leave);
    }

    pub fn on_scroll(&self, x: f64, y: f64, delta_x: f64, delta_y: f64, multiplier: i32) {
        self.dispatch_pointer(RawPointerEvent::Scroll {
            x,
            y,
            delta_x,
            delta_y,
            multiplier,
        });
    }

    pub fn on_cursor_rect_updated(&self, rect: Rect) {
        self.binding.update_cursor_rect(rect);
    }

    /// Returns `true` if a handler consumed the key.
    pub fn on_key(&self, event: &KeyEvent) -> bool {
        self.with_hooks(|hooks| hooks.iter_mut().any(|h| h.keyboard_hook(event)))
    }

    pub fn on_text(&self, text: &str) {
        self.with_hooks(|hooks| hooks.iter_mut().for_each(|h| h.text_hook(text)));
    }

    pub fn on_compose_begin(&self) {
        self.with_hooks(|hooks| hooks.iter_mut().for_each(|h| h.compose_begin_hook()));
    }

    pub fn on_compose_end(&self) {
        self.with_hooks(|hooks| hooks.iter_mut().for_each(|h| h.compose_end_hook()));
    }

    pub fn on_compose_change(&self, text: &str, cursor_pos: usize) {
        self.with_hooks(|hooks| {
            hooks
                .iter_mut()
                .for_each(|h| h.compose_change_hook(text, cursor_pos))
        });
    }

    // ---- render thread ---------------------------------------------------

    pub fn frame_buffer_id(&self, width: u32, height: u32) -> FrameBufferId {
        self.resize.acquire_frame_buffer(width, height)
    }

    pub fn swap_buffers(&self) -> bool {
        self.resize.swap_buffers()
    }

    pub fn make_current(&self) -> bool {
        self.resize.with_surface(|s| s.make_current())
    }

    pub fn make_resource_current(&self) -> bool {
        self.resize.with_surface(|s| s.make_resource_current())
    }

    pub fn clear_context(&self) -> bool {
        self.resize.with_surface(|s| s.clear_current())
    }

    /// Runs `f` over the hook chain with the lock released, so hooks may register
    /// further hooks. Those join the chain after the current dispatch.
    fn with_hooks<R>(&self, f: impl FnOnce(&mut [Box<dyn KeyboardHookHandler>]) -> R) -> R {
        let mut hooks = std::mem::take(&mut *self.keyboard_hooks.lock());
        let result = f(&mut hooks);

        let mut slot = self.keyboard_hooks.lock();
        let added = std::mem::replace(&mut *slot, hooks);
        slot.extend(added);
        result
    }

    fn dispatch_pointer(&self, raw: RawPointerEvent) {
        let events = self.pointer.lock().dispatch(raw);
        for ev in events {
            self.engine.send_pointer_event(ev);
        }
    }
}
