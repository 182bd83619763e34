use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{ViewError, ViewResult};

/// Cooperative shutdown token.
///
/// The platform host sets it on window close or Ctrl+C; the render loop polls it between frames.
#[derive(Clone, Default)]
pub struct ShutdownToken {
    flag: Arc<AtomicBool>,
}

impl ShutdownToken {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn request(&self) {
        self.flag.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Routes Ctrl+C into this token. Only one handler per process can be installed.
    pub fn install_ctrlc(&self) -> ViewResult<()> {
        let token = self.clone();
        ctrlc::set_handler(move || token.request()).map_err(|e| ViewError::Collaborator {
            collaborator: "ctrlc",
            source: anyhow::Error::new(e),
        })
    }
}
