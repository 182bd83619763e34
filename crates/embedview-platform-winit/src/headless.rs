use std::sync::Arc;

use embedview_core::error::{SurfaceError, SurfaceResult};
use embedview_core::services::SurfaceManager;
use embedview_core::RenderTarget;
use parking_lot::Mutex;

/// Counters shared with whoever wants to observe the headless surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeadlessStats {
    pub frames_presented: u64,
    pub resizes: u64,
    pub width: u32,
    pub height: u32,
}

/// Surface manager without a GPU behind it.
///
/// Tracks size, current-ness and presented frames so the host runs end to end on
/// machines without a GL driver.
pub struct HeadlessSurfaceManager {
    target: Option<RenderTarget>,
    current: bool,
    stats: Arc<Mutex<HeadlessStats>>,
}

impl HeadlessSurfaceManager {
    #[inline]
    pub fn new() -> Self {
        Self {
            target: None,
            current: false,
            stats: Arc::new(Mutex::new(HeadlessStats::default())),
        }
    }

    #[inline]
    pub fn stats_handle(&self) -> Arc<Mutex<HeadlessStats>> {
        self.stats.clone()
    }

    fn check_target(&self, target: RenderTarget) -> SurfaceResult<()> {
        match self.target {
            Some(t) if t == target => Ok(()),
            _ => Err(SurfaceError::Missing),
        }
    }
}

impl Default for HeadlessSurfaceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceManager for HeadlessSurfaceManager {
    fn create_surface(&mut self, target: RenderTarget, width: u32, height: u32) -> SurfaceResult<()> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::CreateFailed(format!(
                "zero-sized target {}x{}",
                width, height
            )));
        }
        self.target = Some(target);
        self.current = false;

        let mut s = self.stats.lock();
        s.width = width;
        s.height = height;
        Ok(())
    }

    fn resize_surface(&mut self, target: RenderTarget, width: u32, height: u32) -> SurfaceResult<()> {
        self.check_target(target)?;
        if width == 0 || height == 0 {
            return Err(SurfaceError::ResizeFailed {
                width,
                height,
                reason: "zero-sized".to_string(),
            });
        }

        let mut s = self.stats.lock();
        s.width = width;
        s.height = height;
        s.resizes += 1;
        Ok(())
    }

    fn make_current(&mut self) -> bool {
        self.current = self.target.is_some();
        self.current
    }

    fn make_resource_current(&mut self) -> bool {
        self.target.is_some()
    }

    fn clear_context(&mut self) -> bool {
        self.current = false;
        true
    }

    fn swap_buffers(&mut self) -> bool {
        if !self.current {
            log::trace!("headless: swap without a current context");
            return false;
        }
        self.stats.lock().frames_presented += 1;
        true
    }

    fn surface_dimensions(&self) -> (u32, u32) {
        let s = self.stats.lock();
        (s.width, s.height)
    }

    fn destroy_surface(&mut self) {
        let s = *self.stats.lock();
        log::debug!(
            "headless: destroying {:?} after {} frames, {} resizes",
            self.target,
            s.frames_presented,
            s.resizes
        );
        self.target = None;
        self.current = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_needs_current_context() {
        let mut m = HeadlessSurfaceManager::new();
        m.create_surface(RenderTarget(7), 100, 50).unwrap();

        assert!(!m.swap_buffers());
        assert!(m.make_current());
        assert!(m.swap_buffers());
        assert!(m.clear_context());
        assert!(!m.swap_buffers());
        assert_eq!(m.stats_handle().lock().frames_presented, 1);
    }

    #[test]
    fn resize_checks_target_and_size() {
        let mut m = HeadlessSurfaceManager::new();
        assert_eq!(m.resize_surface(RenderTarget(1), 10, 10), Err(SurfaceError::Missing));

        m.create_surface(RenderTarget(1), 100, 50).unwrap();
        assert_eq!(m.resize_surface(RenderTarget(2), 10, 10), Err(SurfaceError::Missing));
        assert!(m.resize_surface(RenderTarget(1), 0, 10).is_err());

        m.resize_surface(RenderTarget(1), 640, 480).unwrap();
        assert_eq!(m.surface_dimensions(), (640, 480));
    }

    #[test]
    fn zero_sized_create_fails() {
        let mut m = HeadlessSurfaceManager::new();
        assert!(matches!(
            m.create_surface(RenderTarget(1), 0, 480),
            Err(SurfaceError::CreateFailed(_))
        ));
    }
}
