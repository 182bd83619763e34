use embedview_core::pointer::MouseButtons;
use embedview_core::services::{KeyAction, KeyEvent};
use embedview_core::View;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, Ime, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Pixels scrolled per wheel line.
pub const LINE_SCROLL_MULTIPLIER: i32 = 20;

/// Feeds winit window events into a [`View`].
///
/// winit reports buttons and wheel deltas without a position, so the last cursor
/// position is tracked here.
#[derive(Debug, Default)]
pub struct WindowEventTranslator {
    cursor: PhysicalPosition<f64>,
    ime: ImeComposer,
}

impl WindowEventTranslator {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the view consumed the event.
    ///
    /// `Resized` blocks until the render thread has presented a frame at the new size.
    pub fn forward(&mut self, view: &View, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::Resized(size) => {
                view.on_window_size_changed(size.width, size.height);
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = *position;
                view.on_pointer_move(position.x, position.y);
                true
            }
            WindowEvent::CursorLeft { .. } => {
                view.on_pointer_leave();
                true
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let Some(button) = map_button(*button) else {
                    return false;
                };
                let (x, y) = (self.cursor.x, self.cursor.y);
                match state {
                    ElementState::Pressed => view.on_pointer_down(x, y, button),
                    ElementState::Released => view.on_pointer_up(x, y, button),
                }
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let (dx, dy, multiplier) = scroll_delta(*delta);
                view.on_scroll(self.cursor.x, self.cursor.y, dx, dy, multiplier);
                true
            }
            WindowEvent::KeyboardInput {
                event,
                is_synthetic,
                ..
            } => {
                if *is_synthetic {
                    return false;
                }
                let key = KeyEvent {
                    key: virtual_key(event.physical_key),
                    // Not exposed portably by winit.
                    scancode: 0,
                    action: key_action(event.state, event.repeat),
                    character: event.text.as_ref().and_then(|t| t.chars().next()),
                    extended: is_extended(event.physical_key),
                };

                if view.on_key(&key) {
                    return true;
                }
                if event.state == ElementState::Pressed && !self.ime.composing {
                    if let Some(text) = &event.text {
                        view.on_text(text);
                    }
                }
                false
            }
            WindowEvent::Ime(ime) => {
                self.ime.apply(view, ime);
                true
            }
            _ => false,
        }
    }
}

/// Turns winit's preedit/commit stream into begin/change/end calls.
#[derive(Debug, Default)]
pub struct ImeComposer {
    composing: bool,
}

impl ImeComposer {
    #[inline]
    pub fn is_composing(&self) -> bool {
        self.composing
    }

    pub fn apply(&mut self, view: &View, ime: &Ime) {
        match ime {
            Ime::Enabled => {}
            Ime::Preedit(text, cursor) => {
                if text.is_empty() {
                    if self.composing {
                        view.on_compose_change("", 0);
                    }
                    return;
                }
                if !self.composing {
                    self.composing = true;
                    view.on_compose_begin();
                }
                let pos = cursor.map(|(start, _)| start).unwrap_or(text.len());
                view.on_compose_change(text, pos);
            }
            Ime::Commit(text) => {
                self.end(view);
                view.on_text(text);
            }
            Ime::Disabled => self.end(view),
        }
    }

    fn end(&mut self, view: &View) {
        if self.composing {
            self.composing = false;
            view.on_compose_end();
        }
    }
}

pub fn map_button(button: MouseButton) -> Option<MouseButtons> {
    match button {
        MouseButton::Left => Some(MouseButtons::PRIMARY),
        MouseButton::Right => Some(MouseButtons::SECONDARY),
        MouseButton::Middle => Some(MouseButtons::MIDDLE),
        MouseButton::Back => Some(MouseButtons::BACK),
        MouseButton::Forward => Some(MouseButtons::FORWARD),
        MouseButton::Other(_) => None,
    }
}

/// winit reports "wheel away from the user" as positive y; the engine scrolls down on positive.
pub fn scroll_delta(delta: MouseScrollDelta) -> (f64, f64, i32) {
    match delta {
        MouseScrollDelta::LineDelta(x, y) => (-f64::from(x), -f64::from(y), LINE_SCROLL_MULTIPLIER),
        MouseScrollDelta::PixelDelta(p) => (-p.x, -p.y, 1),
    }
}

pub fn key_action(state: ElementState, repeat: bool) -> KeyAction {
    match (state, repeat) {
        (ElementState::Pressed, true) => KeyAction::Repeat,
        (ElementState::Pressed, false) => KeyAction::Press,
        (ElementState::Released, _) => KeyAction::Release,
    }
}

const LETTERS: [KeyCode; 26] = [
    KeyCode::KeyA,
    KeyCode::KeyB,
    KeyCode::KeyC,
    KeyCode::KeyD,
    KeyCode::KeyE,
    KeyCode::KeyF,
    KeyCode::KeyG,
    KeyCode::KeyH,
    KeyCode::KeyI,
    KeyCode::KeyJ,
    KeyCode::KeyK,
    KeyCode::KeyL,
    KeyCode::KeyM,
    KeyCode::KeyN,
    KeyCode::KeyO,
    KeyCode::KeyP,
    KeyCode::KeyQ,
    KeyCode::KeyR,
    KeyCode::KeyS,
    KeyCode::KeyT,
    KeyCode::KeyU,
    KeyCode::KeyV,
    KeyCode::KeyW,
    KeyCode::KeyX,
    KeyCode::KeyY,
    KeyCode::KeyZ,
];

const DIGITS: [KeyCode; 10] = [
    KeyCode::Digit0,
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

const FUNCTION_KEYS: [KeyCode; 12] = [
    KeyCode::F1,
    KeyCode::F2,
    KeyCode::F3,
    KeyCode::F4,
    KeyCode::F5,
    KeyCode::F6,
    KeyCode::F7,
    KeyCode::F8,
    KeyCode::F9,
    KeyCode::F10,
    KeyCode::F11,
    KeyCode::F12,
];

/// Virtual-key code the engine's key maps expect. Unmapped keys are `0`.
pub fn virtual_key(key: PhysicalKey) -> u32 {
    let PhysicalKey::Code(code) = key else {
        return 0;
    };

    let offset = |table: &[KeyCode], base: u32| {
        table
            .iter()
            .position(|k| *k == code)
            .map(|i| base + i as u32)
    };
    if let Some(vk) = offset(&LETTERS, 0x41)
        .or_else(|| offset(&DIGITS, 0x30))
        .or_else(|| offset(&FUNCTION_KEYS, 0x70))
    {
        return vk;
    }

    match code {
        KeyCode::Backspace => 0x08,
        KeyCode::Tab => 0x09,
        KeyCode::Enter | KeyCode::NumpadEnter => 0x0D,
        KeyCode::ShiftLeft | KeyCode::ShiftRight => 0x10,
        KeyCode::ControlLeft | KeyCode::ControlRight => 0x11,
        KeyCode::AltLeft | KeyCode::AltRight => 0x12,
        KeyCode::Escape => 0x1B,
        KeyCode::Space => 0x20,
        KeyCode::PageUp => 0x21,
        KeyCode::PageDown => 0x22,
        KeyCode::End => 0x23,
        KeyCode::Home => 0x24,
        KeyCode::ArrowLeft => 0x25,
        KeyCode::ArrowUp => 0x26,
        KeyCode::ArrowRight => 0x27,
        KeyCode::ArrowDown => 0x28,
        KeyCode::Insert => 0x2D,
        KeyCode::Delete => 0x2E,
        _ => 0,
    }
}

/// Keys a PC keyboard reports with the extended prefix.
fn is_extended(key: PhysicalKey) -> bool {
    matches!(
        key,
        PhysicalKey::Code(
            KeyCode::ControlRight
                | KeyCode::AltRight
                | KeyCode::NumpadEnter
                | KeyCode::Insert
                | KeyCode::Delete
                | KeyCode::Home
                | KeyCode::End
                | KeyCode::PageUp
                | KeyCode::PageDown
                | KeyCode::ArrowLeft
                | KeyCode::ArrowUp
                | KeyCode::ArrowRight
                | KeyCode::ArrowDown
        )
    )
}
