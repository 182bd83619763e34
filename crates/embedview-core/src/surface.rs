use crate::error::{SurfaceError, SurfaceResult};
use crate::host_events::{PhysicalWindowBounds, RenderTarget};
use crate::services::SurfaceManager;

/// Last known size of the live backing surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceDimensions {
    pub width: u32,
    pub height: u32,
}

/// Single owner of the surface manager.
///
/// Sequencing only: the GL/EGL work happens behind [`SurfaceManager`]. Dimensions are written
/// by `create` and by `resize_to`, and `resize_to` is reachable only from the resize
/// coordinator's frame-acquire transition.
pub struct RenderSurfaceLifecycle {
    manager: Box<dyn SurfaceManager>,
    target: RenderTarget,
    dimensions: SurfaceDimensions,
    live: bool,
    destroyed: bool,
}

impl RenderSurfaceLifecycle {
    pub fn new(manager: Box<dyn SurfaceManager>, target: RenderTarget) -> Self {
        Self {
            manager,
            target,
            dimensions: SurfaceDimensions::default(),
            live: false,
            destroyed: false,
        }
    }

    #[inline]
    pub fn dimensions(&self) -> SurfaceDimensions {
        self.dimensions
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn create(&mut self, bounds: PhysicalWindowBounds) -> SurfaceResult<()> {
        self.manager
            .create_surface(self.target, bounds.width, bounds.height)?;

        let (width, height) = self.manager.surface_dimensions();
        self.dimensions = SurfaceDimensions { width, height };
        self.live = true;
        self.destroyed = false;

        log::info!("surface: created {}x{} for {:?}", width, height, self.target);
        Ok(())
    }

    /// Tears the surface down. Repeated calls (including the one from `Drop`) are no-ops.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.manager.destroy_surface();
        self.destroyed = true;
        self.live = false;
        self.dimensions = SurfaceDimensions::default();

        log::info!("surface: destroyed {:?}", self.target);
    }

    #[inline]
    pub fn make_current(&mut self) -> bool {
        self.manager.make_current()
    }

    #[inline]
    pub fn make_resource_current(&mut self) -> bool {
        self.manager.make_resource_current()
    }

    #[inline]
    pub fn clear_current(&mut self) -> bool {
        self.manager.clear_context()
    }

    #[inline]
    pub(crate) fn swap_buffers(&mut self) -> bool {
        self.manager.swap_buffers()
    }

    pub(crate) fn resize_to(&mut self, width: u32, height: u32) -> SurfaceResult<()> {
        if !self.live {
            return Err(SurfaceError::Missing);
        }
        self.manager.resize_surface(self.target, width, height)?;
        self.dimensions = SurfaceDimensions { width, height };
        Ok(())
    }
}

impl Drop for RenderSurfaceLifecycle {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parking_lot::Mutex;

    #[derive(Default)]
    struct Calls {
        creates: usize,
        resizes: Vec<(u32, u32)>,
        destroys: usize,
        dims: (u32, u32),
    }

    struct FakeManager(Arc<Mutex<Calls>>);

    impl SurfaceManager for FakeManager {
        fn create_surface(&mut self, _t: RenderTarget, w: u32, h: u32) -> SurfaceResult<()> {
            let mut c = self.0.lock();
            c.creates += 1;
            c.dims = (w, h);
            Ok(())
        }

        fn resize_surface(&mut self, _t: RenderTarget, w: u32, h: u32) -> SurfaceResult<()> {
            let mut c = self.0.lock();
            c.resizes.push((w, h));
            c.dims = (w, h);
            Ok(())
        }

        fn make_current(&mut self) -> bool {
            true
        }

        fn make_resource_current(&mut self) -> bool {
            true
        }

        fn clear_context(&mut self) -> bool {
            true
        }

        fn swap_buffers(&mut self) -> bool {
            true
        }

        fn surface_dimensions(&self) -> (u32, u32) {
            self.0.lock().dims
        }

        fn destroy_surface(&mut self) {
            self.0.lock().destroys += 1;
        }
    }

    fn lifecycle() -> (RenderSurfaceLifecycle, Arc<Mutex<Calls>>) {
        let calls = Arc::new(Mutex::new(Calls::default()));
        let lc = RenderSurfaceLifecycle::new(Box::new(FakeManager(calls.clone())), RenderTarget(7));
        (lc, calls)
    }

    #[test]
    fn create_records_dimensions() {
        let (mut lc, calls) = lifecycle();
        lc.create(PhysicalWindowBounds { width: 800, height: 600 }).unwrap();

        assert!(lc.is_live());
        assert_eq!(lc.dimensions(), SurfaceDimensions { width: 800, height: 600 });
        assert_eq!(calls.lock().creates, 1);
    }

    #[test]
    fn destroy_runs_once_across_resizes_and_drop() {
        let (mut lc, calls) = lifecycle();
        lc.create(PhysicalWindowBounds { width: 10, height: 10 }).unwrap();
        lc.resize_to(20, 20).unwrap();
        lc.resize_to(30, 30).unwrap();

        lc.destroy();
        lc.destroy();
        drop(lc);

        let c = calls.lock();
        assert_eq!(c.resizes, vec![(20, 20), (30, 30)]);
        assert_eq!(c.destroys, 1);
    }

    #[test]
    fn drop_destroys_even_without_explicit_teardown() {
        let (lc, calls) = lifecycle();
        drop(lc);
        assert_eq!(calls.lock().destroys, 1);
    }

    #[test]
    fn resize_without_surface_is_rejected() {
        let (mut lc, calls) = lifecycle();
        assert_eq!(lc.resize_to(5, 5), Err(SurfaceError::Missing));
        assert!(calls.lock().resizes.is_empty());
        assert_eq!(lc.dimensions(), SurfaceDimensions::default());
    }
}
