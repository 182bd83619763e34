pub mod bus;
pub mod config;
pub mod error;
pub mod host_events;
pub mod pointer;
pub mod resize;
pub mod services;
pub mod surface;
pub mod sync;
pub mod view;

pub use crate::bus::{Bus, BusProducer};
pub use crate::config::{LogConfig, RenderConfig, ViewerConfig};
pub use crate::error::{SurfaceError, SurfaceResult, ViewError, ViewResult};
pub use crate::host_events::{EngineEvent, FrameBufferId, PhysicalWindowBounds, Rect, RenderTarget, WindowMetrics};
pub use crate::resize::{ResizeCoordinator, ResizeState};
pub use crate::surface::{RenderSurfaceLifecycle, SurfaceDimensions};
pub use crate::sync::ShutdownToken;
pub use crate::view::View;
