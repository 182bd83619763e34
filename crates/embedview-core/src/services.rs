use crate::error::SurfaceResult;
use crate::host_events::{PhysicalWindowBounds, Rect, RenderTarget, WindowMetrics};
use crate::pointer::PointerEvent;

/// GPU surface manager (EGL/ANGLE/whatever the platform has).
///
/// Owned by [`crate::surface::RenderSurfaceLifecycle`] and only touched from the render
/// thread, except for teardown once the render thread is idle.
pub trait SurfaceManager: Send {
    fn create_surface(&mut self, target: RenderTarget, width: u32, height: u32) -> SurfaceResult<()>;

    fn resize_surface(&mut self, target: RenderTarget, width: u32, height: u32) -> SurfaceResult<()>;

    fn make_current(&mut self) -> bool;

    fn make_resource_current(&mut self) -> bool;

    fn clear_context(&mut self) -> bool;

    fn swap_buffers(&mut self) -> bool;

    fn surface_dimensions(&self) -> (u32, u32);

    fn destroy_surface(&mut self);
}

/// Render engine boundary. The wire format behind it is not our concern.
///
/// Implementations must not block: the platform thread calls this right before it
/// parks on a resize.
pub trait EngineSink: Send + Sync {
    fn send_window_metrics(&self, metrics: WindowMetrics);

    fn send_pointer_event(&self, event: PointerEvent);
}

/// Host window the view is bound to.
pub trait WindowBindingHandler: Send + Sync {
    fn physical_window_bounds(&self) -> PhysicalWindowBounds;

    fn dpi_scale(&self) -> f64;

    fn render_target(&self) -> RenderTarget;

    /// Called from the render thread after the post-resize frame has been presented.
    fn on_window_resized(&self);

    fn update_cursor_rect(&self, _rect: Rect) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    Release,
    Repeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: u32,
    pub scancode: u32,
    pub action: KeyAction,
    pub character: Option<char>,
    pub extended: bool,
}

/// Keyboard/text handler chain member. Key events stop at the first handler that
/// returns `true`; text and composition updates go to every handler.
///
/// Keyboard entry points are platform-thread only. A hook may call
/// [`crate::View::add_keyboard_hook_handler`]; the new hook joins the chain once the
/// current dispatch returns. Re-entering a keyboard entry point from a hook sees an
/// empty chain.
pub trait KeyboardHookHandler: Send {
    fn keyboard_hook(&mut self, event: &KeyEvent) -> bool;

    fn text_hook(&mut self, text: &str);

    fn compose_begin_hook(&mut self) {}

    fn compose_end_hook(&mut self) {}

    fn compose_change_hook(&mut self, _text: &str, _cursor_pos: usize) {}
}
