use anyhow::Context;

use embedview_core::services::{KeyAction, KeyEvent, KeyboardHookHandler};
use embedview_core::{ShutdownToken, ViewerConfig};
use embedview_platform_winit::WinitHost;

const CONFIG_PATH: &str = "viewer.toml";

/// Virtual-key code of Escape.
const VK_ESCAPE: u32 = 0x1B;

/// Escape closes the viewer.
struct EscapeToQuit {
    shutdown: ShutdownToken,
}

impl KeyboardHookHandler for EscapeToQuit {
    fn keyboard_hook(&mut self, event: &KeyEvent) -> bool {
        if event.key == VK_ESCAPE && event.action == KeyAction::Press {
            log::info!("viewer: escape pressed, shutting down");
            self.shutdown.request();
            return true;
        }
        false
    }

    fn text_hook(&mut self, _text: &str) {}
}

/// Logs committed text and composition, standing in for a text input client.
struct TextEcho;

impl KeyboardHookHandler for TextEcho {
    fn keyboard_hook(&mut self, _event: &KeyEvent) -> bool {
        false
    }

    fn text_hook(&mut self, text: &str) {
        log::debug!(target: "text", "commit {:?}", text);
    }

    fn compose_begin_hook(&mut self) {
        log::debug!(target: "text", "compose begin");
    }

    fn compose_end_hook(&mut self) {
        log::debug!(target: "text", "compose end");
    }

    fn compose_change_hook(&mut self, text: &str, cursor_pos: usize) {
        log::debug!(target: "text", "compose {:?} cursor={}", text, cursor_pos);
    }
}

fn main() -> anyhow::Result<()> {
    let config = ViewerConfig::load_or_default(CONFIG_PATH)
        .with_context(|| format!("loading {CONFIG_PATH}"))?;

    let _ = embedview_modules_logging::init(&config.log);
    log::info!(
        "viewer: {}x{} '{}', frame interval {:?}",
        config.width,
        config.height,
        config.title,
        config.render.frame_interval()
    );

    let shutdown = ShutdownToken::new();
    shutdown
        .install_ctrlc()
        .context("installing Ctrl+C handler")?;

    WinitHost::new(config, shutdown.clone())
        .with_keyboard_hook(Box::new(EscapeToQuit { shutdown }))
        .with_keyboard_hook(Box::new(TextEcho))
        .run()
        .context("viewer host")?;

    Ok(())
}
