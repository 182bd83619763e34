use crate::pointer::PointerEvent;

/// Physical (device pixel) size of the host window client area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhysicalWindowBounds {
    pub width: u32,
    pub height: u32,
}

/// Size + scale the render engine lays out against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowMetrics {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f64,
}

/// Rectangle in physical pixels (used for IME cursor placement).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Opaque handle of the native drawable a surface is created for.
///
/// Platform crates mint it from their window id; the core never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTarget(pub u64);

/// Frame buffer the render thread draws into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameBufferId(pub u32);

impl FrameBufferId {
    /// The window surface's default framebuffer. Stable across resizes.
    pub const WINDOW: FrameBufferId = FrameBufferId(0);
}

/// Events crossing from the view into the render engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    WindowMetrics(WindowMetrics),
    Pointer(PointerEvent),
}
