use std::sync::Arc;
use std::time::{Duration, Instant};

use embedview_core::services::{KeyboardHookHandler, WindowBindingHandler};
use embedview_core::{Bus, EngineEvent, ShutdownToken, View, ViewError, ViewResult, ViewerConfig};

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::binding::WinitWindowBinding;
use crate::events::WindowEventTranslator;
use crate::headless::HeadlessSurfaceManager;
use crate::render_loop::RenderThread;

/// How often the idle event loop wakes to check the shutdown token.
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

struct Session {
    window: Arc<Window>,
    view: Arc<View>,
    render: RenderThread,
    input: WindowEventTranslator,
}

impl Session {
    /// Render thread first: the surface must not go away under it.
    fn close(mut self) {
        let frames = self.render.stop();
        self.view.destroy_render_surface();
        log::info!("host: window {:?} closed after {} frames", self.window.id(), frames);
    }
}

struct App {
    config: ViewerConfig,
    shutdown: ShutdownToken,
    hooks: Vec<Box<dyn KeyboardHookHandler>>,
    session: Option<Session>,
    error: Option<ViewError>,
}

impl App {
    #[inline]
    fn new(config: ViewerConfig, shutdown: ShutdownToken, hooks: Vec<Box<dyn KeyboardHookHandler>>) -> Self {
        Self {
            config,
            shutdown,
            hooks,
            session: None,
            error: None,
        }
    }

    fn start_session(&mut self, event_loop: &ActiveEventLoop) -> ViewResult<Session> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|e| ViewError::platform(format!("window create failed: {e}")))?,
        );
        window.set_ime_allowed(true);

        let binding = Arc::new(WinitWindowBinding::new(
            window.clone(),
            self.config.pixel_ratio,
        ));
        let bus: Bus<EngineEvent> = Bus::unbounded();
        let view = Arc::new(View::new(
            binding.clone(),
            Box::new(HeadlessSurfaceManager::new()),
            Arc::new(bus.producer()),
        ));
        for hook in std::mem::take(&mut self.hooks) {
            view.add_keyboard_hook_handler(hook);
        }

        view.create_render_surface()?;
        view.send_initial_bounds();

        let render = RenderThread::spawn(
            view.clone(),
            bus,
            self.config.render.frame_interval(),
            binding.physical_window_bounds(),
        )?;

        log::info!(
            "host: window {:?} '{}' ready",
            window.id(),
            self.config.title
        );

        Ok(Session {
            window,
            view,
            render,
            input: WindowEventTranslator::new(),
        })
    }

    #[inline]
    fn exit(&mut self, event_loop: &ActiveEventLoop) {
        self.shutdown.request();
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_some() {
            return;
        }
        match self.start_session(event_loop) {
            Ok(session) => self.session = Some(session),
            Err(e) => {
                log::error!("host: startup failed: {}", e);
                self.error = Some(e);
                self.exit(event_loop);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.window.id() != id {
            return;
        }

        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => self.exit(event_loop),
            // Frames come from the render thread.
            WindowEvent::RedrawRequested => {}
            other => {
                session.input.forward(&session.view, &other);
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.shutdown.is_requested() {
            self.exit(event_loop);
            return;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + SHUTDOWN_POLL));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(session) = self.session.take() {
            session.close();
        }
    }
}

/// winit host for a [`View`] with the headless surface and the stand-in render thread.
pub struct WinitHost {
    config: ViewerConfig,
    shutdown: ShutdownToken,
    hooks: Vec<Box<dyn KeyboardHookHandler>>,
}

impl WinitHost {
    #[inline]
    pub fn new(config: ViewerConfig, shutdown: ShutdownToken) -> Self {
        Self {
            config,
            shutdown,
            hooks: Vec::new(),
        }
    }

    /// Hooks are installed in registration order.
    pub fn with_keyboard_hook(mut self, hook: Box<dyn KeyboardHookHandler>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Runs the event loop until the window closes or shutdown is requested.
    pub fn run(self) -> ViewResult<()> {
        let event_loop = EventLoop::new().map_err(|e| ViewError::platform(e.to_string()))?;
        let mut app = App::new(self.config, self.shutdown, self.hooks);

        event_loop
            .run_app(&mut app)
            .map_err(|e| ViewError::platform(e.to_string()))?;

        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Run the winit host with no keyboard hooks.
pub fn run_winit_app(config: ViewerConfig, shutdown: ShutdownToken) -> ViewResult<()> {
    WinitHost::new(config, shutdown).run()
}
