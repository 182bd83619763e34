//! Platform/render thread resize handshake.
//!
//! ```text
//!   platform thread                     render thread
//!   ---------------                     -------------
//!   request_resize(w, h)
//!     Idle -> Requested{w, h}
//!     send metrics
//!     park ...........................  acquire_frame_buffer(w', h')   (w', h') != (w, h): no-op
//!                                       acquire_frame_buffer(w, h)
//!                                         resize surface, make current
//!                                         Requested -> FrameReady
//!                                       swap_buffers()
//!                                         real swap
//!     <-- wake ------------------------   FrameReady -> Idle
//!   return to the OS resize loop
//! ```
//!
//! A swap while `Requested` is refused so a wrong-size frame never reaches the window.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::host_events::{FrameBufferId, PhysicalWindowBounds, WindowMetrics};
use crate::services::{EngineSink, WindowBindingHandler};
use crate::surface::{RenderSurfaceLifecycle, SurfaceDimensions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeState {
    Idle,
    Requested { target_width: u32, target_height: u32 },
    FrameReady,
}

struct Shared {
    state: ResizeState,
    surface: RenderSurfaceLifecycle,
    /// Episodes started. A retarget of an outstanding episode does not bump it.
    started: u64,
    /// Episodes presented.
    presented: u64,
}

pub struct ResizeCoordinator {
    shared: Mutex<Shared>,
    presented_cv: Condvar,
    binding: Arc<dyn WindowBindingHandler>,
    engine: Arc<dyn EngineSink>,
}

impl ResizeCoordinator {
    pub fn new(
        surface: RenderSurfaceLifecycle,
        binding: Arc<dyn WindowBindingHandler>,
        engine: Arc<dyn EngineSink>,
    ) -> Self {
        Self {
            shared: Mutex::new(Shared {
                state: ResizeState::Idle,
                surface,
                started: 0,
                presented: 0,
            }),
            presented_cv: Condvar::new(),
            binding,
            engine,
        }
    }

    #[inline]
    pub fn state(&self) -> ResizeState {
        self.shared.lock().state
    }

    #[inline]
    pub fn surface_dimensions(&self) -> SurfaceDimensions {
        self.shared.lock().surface.dimensions()
    }

    /// Runs `f` against the surface under the coordinator lock.
    ///
    /// Keep `f` short: the platform thread contends on the same lock.
    pub fn with_surface<R>(&self, f: impl FnOnce(&mut RenderSurfaceLifecycle) -> R) -> R {
        let mut shared = self.shared.lock();
        f(&mut shared.surface)
    }

    /// Platform thread only. Blocks until a frame at `width`x`height` has been presented,
    /// unless the size is degenerate or already current.
    pub fn request_resize(&self, width: u32, height: u32) {
        let mut shared = self.shared.lock();

        let Some(episode) = Self::begin_episode(&mut shared, width, height) else {
            drop(shared);
            self.send_metrics(width, height);
            return;
        };

        // Metrics go out unlocked so the render thread can keep acquiring while the
        // engine digests them.
        MutexGuard::unlocked(&mut shared, || self.send_metrics(width, height));

        log::debug!("resize: waiting for a {}x{} frame (episode {})", width, height, episode);
        self.presented_cv
            .wait_while(&mut shared, |s| s.presented < episode);
        log::debug!("resize: episode {} presented", episode);
    }

    /// Render thread. May perform the actual surface resize; never wakes the platform thread.
    pub fn acquire_frame_buffer(&self, width: u32, height: u32) -> FrameBufferId {
        let mut shared = self.shared.lock();

        let ResizeState::Requested {
            target_width,
            target_height,
        } = shared.state
        else {
            return FrameBufferId::WINDOW;
        };

        if (width, height) != (target_width, target_height) {
            // Engine still draws at a previous size. Expected during a drag.
            log::trace!(
                "resize: acquire at {}x{} while waiting for {}x{}",
                width,
                height,
                target_width,
                target_height
            );
            return FrameBufferId::WINDOW;
        }

        match shared.surface.resize_to(width, height) {
            Ok(()) => {
                shared.surface.make_current();
                shared.state = ResizeState::FrameReady;
                log::debug!("resize: surface now {}x{}, frame pending swap", width, height);
            }
            Err(e) => {
                // Stay in Requested; the next matching acquire retries.
                log::warn!("resize: surface resize to {}x{} failed: {}", width, height, e);
            }
        }

        FrameBufferId::WINDOW
    }

    /// Render thread. Returns `false` when the swap was refused or failed.
    pub fn swap_buffers(&self) -> bool {
        let mut shared = self.shared.lock();

        match shared.state {
            ResizeState::Requested { .. } => false,
            ResizeState::Idle => shared.surface.swap_buffers(),
            ResizeState::FrameReady => {
                let swapped = shared.surface.swap_buffers();
                shared.state = ResizeState::Idle;
                shared.presented = shared.started;
                drop(shared);

                self.presented_cv.notify_all();
                self.binding.on_window_resized();

                if !swapped {
                    log::warn!("resize: post-resize swap reported failure");
                }
                swapped
            }
        }
    }

    /// Returns the episode to wait for, or `None` when no blocking resize is needed.
    fn begin_episode(shared: &mut Shared, width: u32, height: u32) -> Option<u64> {
        if width == 0 || height == 0 {
            log::debug!("resize: degenerate {}x{} ignored", width, height);
            return None;
        }

        let outstanding = shared.state != ResizeState::Idle;
        let dims = shared.surface.dimensions();
        // An outstanding episode is always retargeted, even back to the current size,
        // so its waiter is released by the next matching frame.
        if !outstanding && dims == (SurfaceDimensions { width, height }) {
            return None;
        }

        if outstanding {
            log::debug!("resize: retargeting outstanding episode {} to {}x{}", shared.started, width, height);
        } else {
            shared.started += 1;
        }

        shared.state = ResizeState::Requested {
            target_width: width,
            target_height: height,
        };
        Some(shared.started)
    }

    fn send_metrics(&self, width: u32, height: u32) {
        self.engine.send_window_metrics(WindowMetrics {
            width,
            height,
            pixel_ratio: self.binding.dpi_scale(),
        });
    }

    pub(crate) fn send_bounds_metrics(&self, bounds: PhysicalWindowBounds) {
        self.send_metrics(bounds.width, bounds.height);
    }
}
