//! winit host for `embedview-core`.
//!
//! The platform crate owns the event loop and turns window events into view calls.
//! Frames are produced by [`RenderThread`] on its own thread.

mod app;
mod binding;
pub mod events;
mod headless;
mod render_loop;

pub use app::{run_winit_app, WinitHost};
pub use binding::WinitWindowBinding;
pub use events::{ImeComposer, WindowEventTranslator};
pub use headless::{HeadlessStats, HeadlessSurfaceManager};
pub use render_loop::RenderThread;
